//! Error types for the rain predictor.
//!
//! Each concern gets its own enum so callers can tell "not ready" apart from
//! "bad input" apart from "corrupt artifact". [`Error`] gathers them for
//! code that only needs to report.

use crate::features::Feature;
use thiserror::Error;

/// Top-level error type.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Prediction error: {0}")]
    Predict(#[from] PredictError),

    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),

    #[error("Training error: {0}")]
    Training(#[from] TrainingError),

    #[error("Model artifact error: {0}")]
    Artifact(#[from] ArtifactError),

    #[error("History error: {0}")]
    History(#[from] HistoryError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Prediction cycle failed: {0}")]
    Cycle(#[from] CycleError),
}

impl Error {
    /// Returns a short message suitable for showing to the user.
    pub fn user_message(&self) -> &'static str {
        match self {
            Error::Predict(e) => e.user_message(),
            Error::Dataset(_) => "The training dataset could not be read.",
            Error::Training(_) => "The rain model could not be trained.",
            Error::Artifact(_) => "The saved rain model could not be used.",
            Error::History(_) => "Prediction history could not be saved.",
            Error::Config(_) => "The configuration file is invalid.",
            Error::Cycle(e) => e.user_message(),
        }
    }
}

/// A raw feature slice that cannot become a [`crate::FeatureVector`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FeatureError {
    #[error("expected {expected} feature values, got {actual}")]
    WrongLength { expected: usize, actual: usize },

    #[error("{feature} is not a finite number ({value})")]
    NonFinite { feature: Feature, value: f64 },
}

/// Why the predictor produced no probability.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictError {
    #[error("model and normalization stats are not loaded")]
    ModelNotReady,

    #[error("invalid input: {0}")]
    InvalidInput(#[from] FeatureError),
}

impl PredictError {
    pub fn user_message(&self) -> &'static str {
        match self {
            PredictError::ModelNotReady => "Model loading...",
            PredictError::InvalidInput(_) => "Invalid weather data received.",
        }
    }
}

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to open dataset: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("dataset is missing required column `{0}`")]
    MissingColumn(&'static str),
}

#[derive(Debug, Error)]
pub enum TrainingError {
    #[error("training set is empty")]
    EmptyTrainingSet,

    #[error("feature matrix has {actual} columns, expected {expected}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("feature matrix has {rows} rows but {labels} labels")]
    LabelCountMismatch { rows: usize, labels: usize },

    #[error("training produced a non-finite loss at epoch {epoch}")]
    Diverged { epoch: usize },

    #[error(transparent)]
    Dataset(#[from] DatasetError),
}

/// Failure to read or write the persisted model artifact.
///
/// Every variant other than `Io` on save means the stored artifact must not
/// be trusted, in full.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("artifact I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("artifact could not be decoded: {0}")]
    Decode(String),

    #[error("artifact could not be encoded: {0}")]
    Encode(String),

    #[error("not a rain predictor artifact (tag `{0}`)")]
    BadMagic(String),

    #[error("unsupported artifact version {found}, expected {expected}")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("artifact is corrupt: {0}")]
    Corrupt(String),
}

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("history could not be serialized: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no history entry at position {0}")]
    NoSuchEntry(usize),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Failure reported by a [`crate::dashboard::WeatherSource`].
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("location not found: {0}")]
    NotFound(String),

    #[error("weather provider unavailable: {0}")]
    Unavailable(String),
}

/// Why a dashboard cycle ended without a report.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error("no location given")]
    EmptyLocation,

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error(transparent)]
    Predict(#[from] PredictError),

    #[error(transparent)]
    History(#[from] HistoryError),
}

impl CycleError {
    pub fn user_message(&self) -> &'static str {
        match self {
            CycleError::EmptyLocation => "Please enter a location.",
            CycleError::Upstream(UpstreamError::NotFound(_)) => "Location not found.",
            CycleError::Upstream(UpstreamError::Unavailable(_)) => {
                "Weather data is unavailable right now. Please try again."
            }
            CycleError::Predict(e) => e.user_message(),
            CycleError::History(_) => "Prediction history could not be updated.",
        }
    }
}
