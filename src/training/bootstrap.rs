use std::path::Path;

use crate::data::dataset::{load_training_set, DatasetOptions, LoadReport};
use crate::error::TrainingError;
use crate::model::store::ModelStore;
use crate::training::history::TrainingHistory;
use crate::training::trainer::{train_model, TrainedModel, TrainingOptions};

/// Where the model in a [`Bootstrap`] came from.
#[derive(Debug, Clone)]
pub enum ModelOrigin {
    Loaded,
    Trained {
        history: TrainingHistory,
        report: LoadReport,
    },
}

#[derive(Debug, Clone)]
pub struct Bootstrap {
    pub model: TrainedModel,
    pub origin: ModelOrigin,
}

/// Loads the stored model, or trains one from the dataset when nothing
/// usable is stored.
///
/// A stored artifact that fails validation is discarded and replaced; it
/// is never partially used.
pub fn load_or_train<S: ModelStore + ?Sized>(
    store: &S,
    dataset_path: &Path,
    dataset: &DatasetOptions,
    training: &TrainingOptions,
) -> Result<Bootstrap, TrainingError> {
    match store.load() {
        Ok(Some(model)) => {
            return Ok(Bootstrap {
                model,
                origin: ModelOrigin::Loaded,
            })
        }
        Ok(None) => tracing::info!("No saved model found"),
        Err(e) => {
            tracing::warn!(error = %e, "Saved model is unusable, discarding it");
            if let Err(e) = store.discard() {
                tracing::warn!(error = %e, "Failed to discard saved model");
            }
        }
    }

    tracing::info!("Training new model");
    let set = load_training_set(dataset_path, dataset)?;
    let (model, history) = train_model(&set, training)?;

    if let Some(last) = history.last() {
        tracing::info!(loss = last.loss, accuracy = last.accuracy, "Model training complete");
    }
    if let Err(e) = store.save(&model) {
        tracing::warn!(error = %e, "Failed to save trained model; it will be retrained next run");
    }

    Ok(Bootstrap {
        model,
        origin: ModelOrigin::Trained {
            history,
            report: set.report,
        },
    })
}
