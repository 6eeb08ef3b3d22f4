use crate::error::PredictError;
use crate::features::FeatureVector;
use crate::training::trainer::TrainedModel;

/// Owns the loaded model and its normalization stats for a session.
///
/// An empty predictor refuses to predict until a model is installed.
#[derive(Debug, Clone, Default)]
pub struct Predictor {
    model: Option<TrainedModel>,
}

impl Predictor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(model: TrainedModel) -> Self {
        Self { model: Some(model) }
    }

    pub fn install(&mut self, model: TrainedModel) {
        self.model = Some(model);
    }

    pub fn is_ready(&self) -> bool {
        self.model.is_some()
    }

    pub fn model(&self) -> Option<&TrainedModel> {
        self.model.as_ref()
    }

    /// Probability of rain tomorrow for raw readings in feature order.
    ///
    /// Readiness is checked before the input, and invalid input never
    /// reaches the network.
    pub fn predict(&self, raw: &[f64]) -> Result<f64, PredictError> {
        let Some(model) = &self.model else {
            tracing::error!("Model or normalization not ready");
            return Err(PredictError::ModelNotReady);
        };
        let features = FeatureVector::try_from_slice(raw).map_err(|e| {
            tracing::error!(error = %e, ?raw, "Invalid feature values");
            PredictError::InvalidInput(e)
        })?;
        Ok(Self::forward(model, &features))
    }

    /// Same as [`Predictor::predict`] for an already validated vector.
    pub fn predict_features(&self, features: &FeatureVector) -> Result<f64, PredictError> {
        let model = self.model.as_ref().ok_or(PredictError::ModelNotReady)?;
        Ok(Self::forward(model, features))
    }

    fn forward(model: &TrainedModel, features: &FeatureVector) -> f64 {
        let normalized = model.stats.apply(features);
        model.network.predict_one(&normalized)
    }
}
