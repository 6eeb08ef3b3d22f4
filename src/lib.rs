//! Next-day rain probability from five current weather readings.
//!
//! The pipeline is: [`data::load_training_set`] reads and class-balances a
//! historical dataset, [`NormalizationStats`] standardizes features,
//! [`RainNetwork`] (5 -> 16 -> 8 -> 1) is trained with Adam on binary
//! cross-entropy, and the network is persisted together with its stats as
//! a single [`model::ModelArtifact`]. At inference time a [`Predictor`]
//! turns raw readings into a probability, [`RiskBand`] labels it and
//! [`explain`] lists rule-based reasons.

pub mod config;
pub mod dashboard;
pub mod data;
pub mod error;
pub mod explain;
pub mod features;
pub mod history;
pub mod model;
pub mod predictor;
pub mod risk;
pub mod training;
pub mod utils;

pub use config::Config;
pub use dashboard::{CycleReport, Dashboard, WeatherSource};
pub use data::{DatasetOptions, LabelPolicy, NormalizationStats, TrainingSet};
pub use error::{
    ArtifactError, ConfigError, CycleError, DatasetError, Error, FeatureError, HistoryError,
    PredictError, TrainingError, UpstreamError,
};
pub use explain::{explain, explain_messages, Reason};
pub use features::{Feature, FeatureVector, Observation, FEATURE_COUNT};
pub use history::{PredictionHistory, PredictionRecord};
pub use model::{FileModelStore, ModelStore, RainNetwork};
pub use predictor::Predictor;
pub use risk::RiskBand;
pub use training::{load_or_train, ModelOrigin, TrainedModel, TrainingOptions};

/// Installs the global `tracing` subscriber, honouring `RUST_LOG` (default `info`).
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();
}
