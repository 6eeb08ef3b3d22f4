use ndarray::Array2;

/// Probabilities are clipped into `[EPSILON, 1 - EPSILON]` before taking logs.
pub const EPSILON: f64 = 1e-7;

pub fn relu(x: &Array2<f64>) -> Array2<f64> {
    x.mapv(|v| if v > 0.0 { v } else { 0.0 })
}

pub fn relu_derivative(x: &Array2<f64>) -> Array2<f64> {
    x.mapv(|v| if v > 0.0 { 1.0 } else { 0.0 })
}

pub fn sigmoid(x: &Array2<f64>) -> Array2<f64> {
    x.mapv(|v| {
        if v >= 0.0 {
            1.0 / (1.0 + (-v).exp())
        } else {
            let e = v.exp();
            e / (1.0 + e)
        }
    })
}

/// Mean binary cross-entropy between predictions and `{0, 1}` targets.
pub fn binary_cross_entropy(y_true: &Array2<f64>, y_pred: &Array2<f64>) -> f64 {
    let n = y_true.len().max(1) as f64;
    let total: f64 = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(&y, &p)| {
            let p = p.clamp(EPSILON, 1.0 - EPSILON);
            -(y * p.ln() + (1.0 - y) * (1.0 - p).ln())
        })
        .sum();
    total / n
}

/// Number of predictions on the right side of 0.5.
pub fn correct_count(y_true: &Array2<f64>, y_pred: &Array2<f64>) -> usize {
    y_true
        .iter()
        .zip(y_pred.iter())
        .filter(|&(&y, &p)| (p >= 0.5) == (y >= 0.5))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn relu_zeroes_negatives() {
        let x = array![[-1.0, 0.0, 2.5]];
        assert_eq!(relu(&x), array![[0.0, 0.0, 2.5]]);
        assert_eq!(relu_derivative(&x), array![[0.0, 0.0, 1.0]]);
    }

    #[test]
    fn sigmoid_is_stable_at_extremes() {
        let s = sigmoid(&array![[-1000.0, 0.0, 1000.0]]);
        assert_abs_diff_eq!(s[[0, 0]], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(s[[0, 1]], 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(s[[0, 2]], 1.0, epsilon = 1e-12);
        assert!(s.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn bce_matches_hand_computed_value() {
        let y = array![[1.0], [0.0]];
        let p = array![[0.8], [0.4]];
        let expected = -((0.8f64).ln() + (0.6f64).ln()) / 2.0;
        assert_abs_diff_eq!(binary_cross_entropy(&y, &p), expected, epsilon = 1e-12);
    }

    #[test]
    fn bce_stays_finite_for_saturated_predictions() {
        let y = array![[1.0], [0.0]];
        let p = array![[0.0], [1.0]];
        assert!(binary_cross_entropy(&y, &p).is_finite());
    }

    #[test]
    fn counts_correct_at_half_threshold() {
        let y = array![[1.0], [0.0], [1.0], [0.0]];
        let p = array![[0.9], [0.2], [0.3], [0.5]];
        assert_eq!(correct_count(&y, &p), 2);
    }
}
