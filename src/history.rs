//! Most-recent-first list of past predictions, persisted as JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::Path;

use crate::error::HistoryError;
use crate::risk::RiskBand;
use crate::utils::io;

pub const HISTORY_CAPACITY: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub location: String,
    pub probability: f64,
    pub timestamp: DateTime<Utc>,
}

impl PredictionRecord {
    pub fn risk(&self) -> RiskBand {
        RiskBand::from_probability(self.probability)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PredictionHistory {
    entries: VecDeque<PredictionRecord>,
}

impl PredictionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a record at the front, dropping the oldest beyond capacity.
    pub fn record(&mut self, location: impl Into<String>, probability: f64, timestamp: DateTime<Utc>) {
        self.entries.push_front(PredictionRecord {
            location: location.into(),
            probability,
            timestamp,
        });
        self.entries.truncate(HISTORY_CAPACITY);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn get(&self, index: usize) -> Option<&PredictionRecord> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PredictionRecord> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Loads a saved history. A missing file is an empty history; so is a
    /// corrupt one, after a warning.
    pub fn load(path: &Path) -> Result<Self, HistoryError> {
        let Some(bytes) = io::read_if_exists(path)? else {
            return Ok(Self::new());
        };
        match serde_json::from_slice::<Self>(&bytes) {
            Ok(mut history) => {
                history.entries.truncate(HISTORY_CAPACITY);
                Ok(history)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring corrupt prediction history");
                Ok(Self::new())
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), HistoryError> {
        let json = serde_json::to_vec_pretty(self)?;
        io::write_atomic(path, &json)?;
        Ok(())
    }

    /// Clears the history and removes its file.
    pub fn clear_persisted(&mut self, path: &Path) -> Result<(), HistoryError> {
        self.clear();
        io::remove_if_exists(path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 9, minute, 0).unwrap()
    }

    #[test]
    fn keeps_newest_five_first() {
        let mut history = PredictionHistory::new();
        for (i, city) in ["Perth", "Sydney", "Hobart", "Darwin", "Cairns", "Albany"]
            .iter()
            .enumerate()
        {
            history.record(*city, 0.1 * i as f64, at(i as u32));
        }

        let cities: Vec<&str> = history.iter().map(|r| r.location.as_str()).collect();
        assert_eq!(cities, vec!["Albany", "Cairns", "Darwin", "Hobart", "Sydney"]);
    }

    #[test]
    fn risk_uses_shared_banding() {
        let mut history = PredictionHistory::new();
        history.record("Perth", 0.6, at(0));
        assert_eq!(history.get(0).map(PredictionRecord::risk), Some(RiskBand::High));
    }

    #[test]
    fn persists_as_json_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");

        let mut history = PredictionHistory::new();
        history.record("Perth", 0.25, at(1));
        history.record("Sydney", 0.75, at(2));
        history.save(&path).unwrap();

        let json: serde_json::Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(json[0]["location"], "Sydney");
        assert_eq!(json[1]["probability"], 0.25);

        assert_eq!(PredictionHistory::load(&path).unwrap(), history);
    }

    #[test]
    fn missing_or_corrupt_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        assert!(PredictionHistory::load(&path).unwrap().is_empty());

        std::fs::write(&path, b"{not json").unwrap();
        assert!(PredictionHistory::load(&path).unwrap().is_empty());
    }

    #[test]
    fn clear_persisted_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        let mut history = PredictionHistory::new();
        history.record("Perth", 0.4, at(3));
        history.save(&path).unwrap();

        history.clear_persisted(&path).unwrap();
        assert!(history.is_empty());
        assert!(!path.exists());
    }
}
