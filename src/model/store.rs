//! Persistence of the trained network and its normalization stats as one
//! versioned artifact.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::path::{Path, PathBuf};

use crate::error::ArtifactError;
use crate::training::trainer::TrainedModel;
use crate::utils::io;

pub const ARTIFACT_MAGIC: &str = "rain-predictor";
pub const ARTIFACT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub magic: String,
    pub format_version: u32,
    pub trained_at: DateTime<Utc>,
    pub model: TrainedModel,
}

impl ModelArtifact {
    pub fn new(model: TrainedModel) -> Self {
        Self {
            magic: ARTIFACT_MAGIC.to_string(),
            format_version: ARTIFACT_VERSION,
            trained_at: Utc::now(),
            model,
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, ArtifactError> {
        io::encode(self)
    }

    /// Decodes and validates an artifact. Either the network and stats are
    /// both usable or the whole artifact is rejected.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ArtifactError> {
        let artifact: ModelArtifact = io::decode(bytes)?;
        artifact.validate()?;
        Ok(artifact)
    }

    pub fn validate(&self) -> Result<(), ArtifactError> {
        if self.magic != ARTIFACT_MAGIC {
            return Err(ArtifactError::BadMagic(self.magic.clone()));
        }
        if self.format_version != ARTIFACT_VERSION {
            return Err(ArtifactError::UnsupportedVersion {
                found: self.format_version,
                expected: ARTIFACT_VERSION,
            });
        }
        self.model
            .network
            .check_architecture()
            .map_err(ArtifactError::Corrupt)?;
        if !self.model.stats.is_valid() {
            return Err(ArtifactError::Corrupt(
                "normalization stats are non-finite or have non-positive std".to_string(),
            ));
        }
        Ok(())
    }
}

/// Durable storage for the model artifact.
///
/// `load` returns `Ok(None)` when nothing has been stored yet; any stored
/// artifact that cannot be fully trusted is an `Err`.
pub trait ModelStore {
    fn load(&self) -> Result<Option<TrainedModel>, ArtifactError>;
    fn save(&self, model: &TrainedModel) -> Result<(), ArtifactError>;
    fn discard(&self) -> Result<(), ArtifactError>;
}

#[derive(Debug, Clone)]
pub struct FileModelStore {
    path: PathBuf,
}

impl FileModelStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the stats as `{"mean": [...], "std": [...]}` next to the artifact.
    pub fn export_stats_json(&self, model: &TrainedModel) -> Result<PathBuf, ArtifactError> {
        let path = self.path.with_extension("stats.json");
        let json = serde_json::to_vec_pretty(&model.stats)
            .map_err(|e| ArtifactError::Encode(e.to_string()))?;
        io::write_atomic(&path, &json)?;
        Ok(path)
    }
}

impl ModelStore for FileModelStore {
    fn load(&self) -> Result<Option<TrainedModel>, ArtifactError> {
        let Some(bytes) = io::read_if_exists(&self.path)? else {
            return Ok(None);
        };
        let artifact = ModelArtifact::from_bytes(&bytes)?;
        tracing::info!(
            path = %self.path.display(),
            trained_at = %artifact.trained_at,
            "Model and normalization stats loaded"
        );
        Ok(Some(artifact.model))
    }

    fn save(&self, model: &TrainedModel) -> Result<(), ArtifactError> {
        let bytes = ModelArtifact::new(model.clone()).to_bytes()?;
        io::write_atomic(&self.path, &bytes)?;
        tracing::info!(path = %self.path.display(), bytes = bytes.len(), "Model saved");
        Ok(())
    }

    fn discard(&self) -> Result<(), ArtifactError> {
        io::remove_if_exists(&self.path)?;
        Ok(())
    }
}

/// Keeps the encoded artifact in memory; useful for embedding and tests.
#[derive(Debug, Default)]
pub struct MemoryModelStore {
    bytes: RefCell<Option<Vec<u8>>>,
}

impl MemoryModelStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store with raw bytes, valid or not.
    pub fn with_bytes(bytes: Vec<u8>) -> Self {
        Self {
            bytes: RefCell::new(Some(bytes)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.borrow().is_none()
    }
}

impl ModelStore for MemoryModelStore {
    fn load(&self) -> Result<Option<TrainedModel>, ArtifactError> {
        match self.bytes.borrow().as_deref() {
            None => Ok(None),
            Some(bytes) => ModelArtifact::from_bytes(bytes).map(|a| Some(a.model)),
        }
    }

    fn save(&self, model: &TrainedModel) -> Result<(), ArtifactError> {
        let bytes = ModelArtifact::new(model.clone()).to_bytes()?;
        *self.bytes.borrow_mut() = Some(bytes);
        Ok(())
    }

    fn discard(&self) -> Result<(), ArtifactError> {
        *self.bytes.borrow_mut() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::preprocessing::NormalizationStats;
    use crate::model::network::RainNetwork;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn model() -> TrainedModel {
        TrainedModel {
            network: RainNetwork::new(&mut StdRng::seed_from_u64(11)),
            stats: NormalizationStats {
                mean: [17.0, 70.0, 1017.0, 14.0, 4.4],
                std: [6.4, 19.0, 7.1, 8.9, 2.9],
            },
        }
    }

    #[test]
    fn file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileModelStore::new(dir.path().join("rain_model.bin"));
        assert!(store.load().unwrap().is_none());

        store.save(&model()).unwrap();
        assert_eq!(store.load().unwrap(), Some(model()));

        store.discard().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn truncated_artifact_is_rejected() {
        let bytes = ModelArtifact::new(model()).to_bytes().unwrap();
        let store = MemoryModelStore::with_bytes(bytes[..bytes.len() / 2].to_vec());
        assert!(matches!(store.load(), Err(ArtifactError::Decode(_))));
    }

    #[test]
    fn wrong_version_is_rejected() {
        let mut artifact = ModelArtifact::new(model());
        artifact.format_version = 99;
        let store = MemoryModelStore::with_bytes(io::encode(&artifact).unwrap());
        assert!(matches!(
            store.load(),
            Err(ArtifactError::UnsupportedVersion { found: 99, .. })
        ));
    }

    #[test]
    fn foreign_magic_is_rejected() {
        let mut artifact = ModelArtifact::new(model());
        artifact.magic = "something-else".to_string();
        assert!(matches!(
            artifact.validate(),
            Err(ArtifactError::BadMagic(_))
        ));
    }

    #[test]
    fn stats_with_zero_std_reject_the_whole_artifact() {
        let mut artifact = ModelArtifact::new(model());
        artifact.model.stats.std[1] = 0.0;
        let store = MemoryModelStore::with_bytes(io::encode(&artifact).unwrap());
        assert!(matches!(store.load(), Err(ArtifactError::Corrupt(_))));
    }

    #[test]
    fn mismatched_layer_shape_is_rejected() {
        let mut artifact = ModelArtifact::new(model());
        artifact.model.network.weights1 = ndarray::Array2::zeros((4, 16));
        assert!(matches!(
            artifact.validate(),
            Err(ArtifactError::Corrupt(_))
        ));
    }

    #[test]
    fn exports_stats_json() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileModelStore::new(dir.path().join("rain_model.bin"));
        let path = store.export_stats_json(&model()).unwrap();
        let parsed: NormalizationStats =
            serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap();
        assert_eq!(parsed, model().stats);
    }
}
