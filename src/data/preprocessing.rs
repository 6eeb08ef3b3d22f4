use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

use crate::error::TrainingError;
use crate::features::{FeatureVector, FEATURE_COUNT};

/// Floor added to every standard deviation so constant columns never divide by zero.
pub const STD_EPSILON: f64 = 1e-6;

/// Per-feature mean and standard deviation computed from a training set.
///
/// Serializes as `{"mean": [..5], "std": [..5]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizationStats {
    pub mean: [f64; FEATURE_COUNT],
    pub std: [f64; FEATURE_COUNT],
}

impl NormalizationStats {
    /// Column-wise mean and population standard deviation plus [`STD_EPSILON`].
    pub fn fit(x: &Array2<f64>) -> Result<Self, TrainingError> {
        if x.ncols() != FEATURE_COUNT {
            return Err(TrainingError::ShapeMismatch {
                expected: FEATURE_COUNT,
                actual: x.ncols(),
            });
        }
        let mean = x
            .mean_axis(Axis(0))
            .ok_or(TrainingError::EmptyTrainingSet)?;
        let std = x.std_axis(Axis(0), 0.0) + STD_EPSILON;

        Ok(Self {
            mean: to_fixed(mean.view()),
            std: to_fixed(std.view()),
        })
    }

    /// Normalizes a single vector.
    pub fn apply(&self, v: &FeatureVector) -> [f64; FEATURE_COUNT] {
        let mut out = *v.as_array();
        for (i, x) in out.iter_mut().enumerate() {
            *x = (*x - self.mean[i]) / self.std[i];
        }
        out
    }

    /// Normalizes every row of an `N x 5` matrix.
    pub fn apply_batch(&self, x: &Array2<f64>) -> Array2<f64> {
        let mean = Array1::from(self.mean.to_vec()).insert_axis(Axis(0));
        let std = Array1::from(self.std.to_vec()).insert_axis(Axis(0));
        (x - &mean) / &std
    }

    /// True when every value is finite and every std is positive.
    pub fn is_valid(&self) -> bool {
        self.mean.iter().all(|m| m.is_finite())
            && self.std.iter().all(|s| s.is_finite() && *s > 0.0)
    }
}

fn to_fixed(values: ArrayView1<'_, f64>) -> [f64; FEATURE_COUNT] {
    let mut out = [0.0; FEATURE_COUNT];
    for (slot, v) in out.iter_mut().zip(values.iter()) {
        *slot = *v;
    }
    out
}
