use serde::{Deserialize, Serialize};
use std::fmt;

/// Probability at or above which risk is at least moderate.
pub const MODERATE_THRESHOLD: f64 = 0.30;
/// Probability at or above which risk is high.
pub const HIGH_THRESHOLD: f64 = 0.60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskBand {
    Low,
    Moderate,
    High,
}

impl RiskBand {
    /// Bands are closed on their lower bound: 0.30 is Moderate, 0.60 is High.
    pub fn from_probability(probability: f64) -> Self {
        if probability < MODERATE_THRESHOLD {
            RiskBand::Low
        } else if probability < HIGH_THRESHOLD {
            RiskBand::Moderate
        } else {
            RiskBand::High
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskBand::Low => "Low Risk",
            RiskBand::Moderate => "Moderate Risk",
            RiskBand::High => "High Risk",
        }
    }
}

impl fmt::Display for RiskBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn boundaries_belong_to_upper_band() {
        assert_eq!(RiskBand::from_probability(0.0), RiskBand::Low);
        assert_eq!(RiskBand::from_probability(0.2999), RiskBand::Low);
        assert_eq!(RiskBand::from_probability(0.30), RiskBand::Moderate);
        assert_eq!(RiskBand::from_probability(0.5999), RiskBand::Moderate);
        assert_eq!(RiskBand::from_probability(0.60), RiskBand::High);
        assert_eq!(RiskBand::from_probability(1.0), RiskBand::High);
    }

    #[test]
    fn labels() {
        assert_eq!(RiskBand::Low.to_string(), "Low Risk");
        assert_eq!(RiskBand::Moderate.label(), "Moderate Risk");
        assert_eq!(RiskBand::High.label(), "High Risk");
    }

    proptest! {
        #[test]
        fn every_probability_lands_in_exactly_one_band(p in 0.0f64..=1.0) {
            let band = RiskBand::from_probability(p);
            let matches = [
                p < MODERATE_THRESHOLD,
                (MODERATE_THRESHOLD..HIGH_THRESHOLD).contains(&p),
                p >= HIGH_THRESHOLD,
            ];
            prop_assert_eq!(matches.iter().filter(|m| **m).count(), 1);
            let expected = match matches.iter().position(|m| *m) {
                Some(0) => RiskBand::Low,
                Some(1) => RiskBand::Moderate,
                _ => RiskBand::High,
            };
            prop_assert_eq!(band, expected);
            prop_assert_eq!(band, RiskBand::from_probability(p));
        }
    }
}
