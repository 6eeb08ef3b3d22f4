use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::data::dataset::DatasetOptions;
use crate::error::ConfigError;
use crate::training::trainer::TrainingOptions;

/// Environment variable naming a config file when none is passed explicitly.
pub const CONFIG_ENV: &str = "RAIN_PREDICTOR_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Historical observations used for training.
    pub dataset_path: PathBuf,

    /// Trained network plus normalization stats.
    pub model_path: PathBuf,

    /// Recent predictions.
    pub history_path: PathBuf,

    pub dataset: DatasetOptions,
    pub training: TrainingOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from("data/weatherAUS.csv"),
            model_path: PathBuf::from("rain_model.bin"),
            history_path: PathBuf::from("prediction_history.json"),
            dataset: DatasetOptions::default(),
            training: TrainingOptions::default(),
        }
    }
}

impl Config {
    /// Loads from `path`, else from `$RAIN_PREDICTOR_CONFIG`, else defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));

        let config = match path {
            Some(path) => {
                let contents =
                    std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
                        path: path.display().to_string(),
                        source,
                    })?;
                tracing::info!(path = %path.display(), "Loaded configuration");
                Self::from_toml(&contents)?
            }
            None => Self::default(),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dataset.class_cap == 0 {
            return Err(ConfigError::Invalid(
                "dataset.class_cap must be greater than 0".to_string(),
            ));
        }
        if self.training.epochs == 0 {
            return Err(ConfigError::Invalid(
                "training.epochs must be greater than 0".to_string(),
            ));
        }
        if self.training.batch_size == 0 {
            return Err(ConfigError::Invalid(
                "training.batch_size must be greater than 0".to_string(),
            ));
        }
        let lr = self.training.learning_rate;
        if !lr.is_finite() || lr <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "training.learning_rate must be a positive number, got {lr}"
            )));
        }
        Ok(())
    }
}
