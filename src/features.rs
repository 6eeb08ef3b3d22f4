//! The five-reading feature vector every other module indexes positionally.

use crate::error::FeatureError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of input features.
pub const FEATURE_COUNT: usize = 5;

/// Feature positions, in the order the network, normalizer and explainer
/// expect them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Temperature,
    Humidity,
    Pressure,
    WindSpeed,
    CloudCover,
}

impl Feature {
    pub const ALL: [Feature; FEATURE_COUNT] = [
        Feature::Temperature,
        Feature::Humidity,
        Feature::Pressure,
        Feature::WindSpeed,
        Feature::CloudCover,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Column holding this feature in the historical dataset.
    pub fn column(self) -> &'static str {
        match self {
            Feature::Temperature => "Temp9am",
            Feature::Humidity => "Humidity9am",
            Feature::Pressure => "Pressure9am",
            Feature::WindSpeed => "WindSpeed9am",
            Feature::CloudCover => "Cloud9am",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Feature::Temperature => "°C",
            Feature::Humidity => "%",
            Feature::Pressure => "hPa",
            Feature::WindSpeed => "m/s",
            Feature::CloudCover => "%",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Feature::Temperature => "temperature",
            Feature::Humidity => "humidity",
            Feature::Pressure => "pressure",
            Feature::WindSpeed => "wind speed",
            Feature::CloudCover => "cloud cover",
        };
        f.write_str(name)
    }
}

/// Validated raw readings: `[temperature, humidity, pressure, wind speed, cloud cover]`.
///
/// All components are finite. Construct from untrusted data with
/// [`FeatureVector::try_from_slice`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    /// Builds a vector from named readings, validating finiteness.
    pub fn new(
        temperature: f64,
        humidity: f64,
        pressure: f64,
        wind_speed: f64,
        cloud_cover: f64,
    ) -> Result<Self, FeatureError> {
        Self::try_from_slice(&[temperature, humidity, pressure, wind_speed, cloud_cover])
    }

    pub fn try_from_slice(values: &[f64]) -> Result<Self, FeatureError> {
        if values.len() != FEATURE_COUNT {
            return Err(FeatureError::WrongLength {
                expected: FEATURE_COUNT,
                actual: values.len(),
            });
        }

        let mut out = [0.0; FEATURE_COUNT];
        for (feature, (slot, &value)) in Feature::ALL.iter().zip(out.iter_mut().zip(values)) {
            if !value.is_finite() {
                return Err(FeatureError::NonFinite {
                    feature: *feature,
                    value,
                });
            }
            *slot = value;
        }
        Ok(Self(out))
    }

    pub fn get(&self, feature: Feature) -> f64 {
        self.0[feature.index()]
    }

    pub fn as_array(&self) -> &[f64; FEATURE_COUNT] {
        &self.0
    }

    pub fn temperature(&self) -> f64 {
        self.get(Feature::Temperature)
    }

    pub fn humidity(&self) -> f64 {
        self.get(Feature::Humidity)
    }

    pub fn pressure(&self) -> f64 {
        self.get(Feature::Pressure)
    }

    pub fn wind_speed(&self) -> f64 {
        self.get(Feature::WindSpeed)
    }

    pub fn cloud_cover(&self) -> f64 {
        self.get(Feature::CloudCover)
    }

    /// Scales each reading into [0, 1] for a radar chart.
    pub fn radar(&self) -> [f64; FEATURE_COUNT] {
        let scaled = [
            self.temperature() / 40.0,
            self.humidity() / 100.0,
            (self.pressure() - 950.0) / 100.0,
            self.wind_speed() / 50.0,
            self.cloud_cover() / 100.0,
        ];
        scaled.map(|v| v.clamp(0.0, 1.0))
    }
}

impl TryFrom<&[f64]> for FeatureVector {
    type Error = FeatureError;

    fn try_from(values: &[f64]) -> Result<Self, Self::Error> {
        Self::try_from_slice(values)
    }
}

/// Current conditions as delivered by a weather provider.
///
/// Readings are kept raw; validation happens when the predictor consumes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub temperature: f64,
    pub humidity: f64,
    pub pressure: f64,
    pub wind_speed: f64,
    pub cloud_cover: f64,
    #[serde(default)]
    pub location_name: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Observation {
    pub fn from_readings(
        temperature: f64,
        humidity: f64,
        pressure: f64,
        wind_speed: f64,
        cloud_cover: f64,
    ) -> Self {
        Self {
            temperature,
            humidity,
            pressure,
            wind_speed,
            cloud_cover,
            location_name: None,
            latitude: None,
            longitude: None,
            description: None,
        }
    }

    /// Raw readings in feature order.
    pub fn features(&self) -> [f64; FEATURE_COUNT] {
        [
            self.temperature,
            self.humidity,
            self.pressure,
            self.wind_speed,
            self.cloud_cover,
        ]
    }
}
