//! Rule-based reasons for a rain-risk reading.
//!
//! The rules look only at the raw readings, never at the network's weights,
//! so they stay stable and auditable but do not track what the model learned.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::features::FeatureVector;

pub const HIGH_HUMIDITY: f64 = 75.0;
pub const LOW_PRESSURE: f64 = 1010.0;
pub const HIGH_PRESSURE: f64 = 1020.0;
pub const HEAVY_CLOUD: f64 = 60.0;
pub const STRONG_WIND: f64 = 15.0;
pub const COLD_TEMPERATURE: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    HighHumidity,
    LowPressure,
    HighPressure,
    CloudCover,
    StrongWind,
    ColdTemperature,
    Stable,
}

impl Reason {
    pub fn message(self) -> &'static str {
        match self {
            Reason::HighHumidity => "High humidity increases the likelihood of rain.",
            Reason::LowPressure => "Low atmospheric pressure often precedes rainfall.",
            Reason::HighPressure => "High atmospheric pressure generally reduces rain risk.",
            Reason::CloudCover => "Significant cloud cover suggests unstable conditions.",
            Reason::StrongWind => "Stronger winds may indicate approaching weather systems.",
            Reason::ColdTemperature => "Cold temperatures may result in snow instead of rain.",
            Reason::Stable => "Weather conditions appear stable with no strong rain indicators.",
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Every matching rule in declaration order, or just [`Reason::Stable`].
pub fn explain(features: &FeatureVector) -> Vec<Reason> {
    let rules = [
        (features.humidity() >= HIGH_HUMIDITY, Reason::HighHumidity),
        (features.pressure() <= LOW_PRESSURE, Reason::LowPressure),
        (features.pressure() >= HIGH_PRESSURE, Reason::HighPressure),
        (features.cloud_cover() >= HEAVY_CLOUD, Reason::CloudCover),
        (features.wind_speed() >= STRONG_WIND, Reason::StrongWind),
        (features.temperature() < COLD_TEMPERATURE, Reason::ColdTemperature),
    ];

    let reasons: Vec<Reason> = rules
        .into_iter()
        .filter_map(|(fired, reason)| fired.then_some(reason))
        .collect();

    if reasons.is_empty() {
        vec![Reason::Stable]
    } else {
        reasons
    }
}

/// [`explain`] rendered as display strings.
pub fn explain_messages(features: &FeatureVector) -> Vec<&'static str> {
    explain(features).into_iter().map(Reason::message).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn v(temperature: f64, humidity: f64, pressure: f64, wind: f64, cloud: f64) -> FeatureVector {
        FeatureVector::new(temperature, humidity, pressure, wind, cloud).unwrap()
    }

    #[test]
    fn stormy_reading_fires_four_rules_in_order() {
        let reasons = explain(&v(10.0, 80.0, 1005.0, 20.0, 70.0));
        assert_eq!(
            reasons,
            vec![
                Reason::HighHumidity,
                Reason::LowPressure,
                Reason::CloudCover,
                Reason::StrongWind
            ]
        );
    }

    #[test]
    fn calm_reading_is_stable() {
        assert_eq!(
            explain_messages(&v(20.0, 50.0, 1015.0, 5.0, 20.0)),
            vec!["Weather conditions appear stable with no strong rain indicators."]
        );
    }

    #[test]
    fn thresholds_are_inclusive_except_cold() {
        assert_eq!(
            explain(&v(5.0, 75.0, 1010.0, 15.0, 60.0)),
            vec![
                Reason::HighHumidity,
                Reason::LowPressure,
                Reason::CloudCover,
                Reason::StrongWind
            ]
        );
        assert_eq!(explain(&v(4.9, 50.0, 1020.0, 5.0, 20.0)), vec![
            Reason::HighPressure,
            Reason::ColdTemperature
        ]);
    }

    #[test]
    fn pressure_rules_never_both_fire() {
        for pressure in [990.0, 1010.0, 1015.0, 1020.0, 1040.0] {
            let reasons = explain(&v(20.0, 50.0, pressure, 5.0, 20.0));
            assert!(
                !(reasons.contains(&Reason::LowPressure) && reasons.contains(&Reason::HighPressure))
            );
        }
    }

    #[test]
    fn is_deterministic() {
        let reading = v(-2.0, 90.0, 1000.0, 30.0, 100.0);
        assert_eq!(explain(&reading), explain(&reading));
        assert_eq!(explain(&reading).len(), 5);
    }
}
