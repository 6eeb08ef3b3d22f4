//! One prediction cycle: fetch conditions, predict, explain, remember.

use chrono::Utc;
use serde::Serialize;
use std::path::PathBuf;

use crate::error::{CycleError, HistoryError, PredictError, UpstreamError};
use crate::explain::{explain, Reason};
use crate::features::{FeatureVector, Observation, FEATURE_COUNT};
use crate::history::PredictionHistory;
use crate::predictor::Predictor;
use crate::risk::RiskBand;

/// Supplies current conditions for a named location.
pub trait WeatherSource {
    fn fetch(&mut self, location: &str) -> Result<Observation, UpstreamError>;
}

/// Everything the rendering layer needs from one cycle.
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub location: String,
    pub observation: Observation,
    pub probability: f64,
    pub risk: RiskBand,
    pub reasons: Vec<Reason>,
    /// Readings scaled into [0, 1] for a radar chart.
    pub radar: [f64; FEATURE_COUNT],
}

impl CycleReport {
    pub fn percentage(&self) -> f64 {
        self.probability * 100.0
    }
}

pub struct Dashboard<W> {
    source: W,
    predictor: Predictor,
    history: PredictionHistory,
    history_path: Option<PathBuf>,
}

impl<W: WeatherSource> Dashboard<W> {
    pub fn new(source: W, predictor: Predictor) -> Self {
        Self {
            source,
            predictor,
            history: PredictionHistory::new(),
            history_path: None,
        }
    }

    /// Loads history from `path` and saves it there after every cycle.
    pub fn with_history_file(mut self, path: impl Into<PathBuf>) -> Result<Self, HistoryError> {
        let path = path.into();
        self.history = PredictionHistory::load(&path)?;
        self.history_path = Some(path);
        Ok(self)
    }

    pub fn history(&self) -> &PredictionHistory {
        &self.history
    }

    pub fn source_mut(&mut self) -> &mut W {
        &mut self.source
    }

    pub fn predictor(&self) -> &Predictor {
        &self.predictor
    }

    /// Runs a full cycle for `location`.
    ///
    /// A failed fetch never reaches the predictor, and a failed prediction
    /// leaves the history untouched.
    pub fn run_cycle(&mut self, location: &str) -> Result<CycleReport, CycleError> {
        let location = location.trim();
        if location.is_empty() {
            return Err(CycleError::EmptyLocation);
        }

        tracing::info!(location, "Fetching weather");
        let observation = self.source.fetch(location)?;

        if !self.predictor.is_ready() {
            return Err(PredictError::ModelNotReady.into());
        }
        let features =
            FeatureVector::try_from_slice(&observation.features()).map_err(PredictError::from)?;
        let probability = self.predictor.predict_features(&features)?;
        let risk = RiskBand::from_probability(probability);
        tracing::info!(location, probability, %risk, "Prediction complete");

        let report = CycleReport {
            location: location.to_string(),
            probability,
            risk,
            reasons: explain(&features),
            radar: features.radar(),
            observation,
        };

        self.history.record(location, probability, Utc::now());
        self.persist_history();

        Ok(report)
    }

    /// Re-runs the cycle for the location of a history entry.
    pub fn restore(&mut self, index: usize) -> Result<CycleReport, CycleError> {
        let location = self
            .history
            .get(index)
            .map(|r| r.location.clone())
            .ok_or(HistoryError::NoSuchEntry(index))?;
        self.run_cycle(&location)
    }

    pub fn clear_history(&mut self) -> Result<(), HistoryError> {
        match &self.history_path {
            Some(path) => self.history.clear_persisted(path),
            None => {
                self.history.clear();
                Ok(())
            }
        }
    }

    fn persist_history(&self) {
        let Some(path) = &self.history_path else {
            return;
        };
        if let Err(e) = self.history.save(path) {
            tracing::warn!(error = %e, "Failed to save prediction history");
        }
    }
}
