use ndarray::{arr2, Array1, Array2, Axis};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::features::FEATURE_COUNT;
use crate::model::layers::{relu, relu_derivative, sigmoid};

pub const INPUT_SIZE: usize = FEATURE_COUNT;
pub const HIDDEN_SIZE1: usize = 16;
pub const HIDDEN_SIZE2: usize = 8;
pub const OUTPUT_SIZE: usize = 1;

/// Number of parameter tensors (a weight matrix and a bias row per layer).
pub const PARAM_COUNT: usize = 6;

/// 5 -> 16 (ReLU) -> 8 (ReLU) -> 1 (sigmoid) binary classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RainNetwork {
    pub weights1: Array2<f64>,
    pub bias1: Array2<f64>,
    pub weights2: Array2<f64>,
    pub bias2: Array2<f64>,
    pub weights3: Array2<f64>,
    pub bias3: Array2<f64>,
}

/// Activations kept from a forward pass for backpropagation.
pub struct ForwardPass {
    pub hidden_output1: Array2<f64>,
    pub hidden_output2: Array2<f64>,
    /// `N x 1` probabilities.
    pub output: Array2<f64>,
}

/// Gradients in the same order as [`RainNetwork::parameters_mut`].
pub type Gradients = [Array2<f64>; PARAM_COUNT];

impl RainNetwork {
    /// He-uniform weights, zero biases.
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let he_init = |size: usize| (2.0 / size as f64).sqrt();
        let layer = |rng: &mut R, fan_in: usize, fan_out: usize| {
            let limit = he_init(fan_in);
            Array2::random_using((fan_in, fan_out), Uniform::new(-limit, limit), rng)
        };

        RainNetwork {
            weights1: layer(&mut *rng, INPUT_SIZE, HIDDEN_SIZE1),
            bias1: Array2::zeros((1, HIDDEN_SIZE1)),
            weights2: layer(&mut *rng, HIDDEN_SIZE1, HIDDEN_SIZE2),
            bias2: Array2::zeros((1, HIDDEN_SIZE2)),
            weights3: layer(&mut *rng, HIDDEN_SIZE2, OUTPUT_SIZE),
            bias3: Array2::zeros((1, OUTPUT_SIZE)),
        }
    }

    pub fn forward(&self, x: &Array2<f64>) -> ForwardPass {
        let hidden_input1 = x.dot(&self.weights1) + &self.bias1;
        let hidden_output1 = relu(&hidden_input1);

        let hidden_input2 = hidden_output1.dot(&self.weights2) + &self.bias2;
        let hidden_output2 = relu(&hidden_input2);

        let output_input = hidden_output2.dot(&self.weights3) + &self.bias3;
        let output = sigmoid(&output_input);

        ForwardPass {
            hidden_output1,
            hidden_output2,
            output,
        }
    }

    /// Mean binary cross-entropy gradients for one batch, plus the batch predictions.
    pub fn backward(&self, x: &Array2<f64>, y: &Array2<f64>) -> (Gradients, Array2<f64>) {
        let pass = self.forward(x);
        let n = x.nrows().max(1) as f64;

        // sigmoid + BCE collapse to (p - y) at the output pre-activation
        let output_delta = (&pass.output - y) / n;

        let hidden_error2 = output_delta.dot(&self.weights3.t());
        let hidden_delta2 = hidden_error2 * relu_derivative(&pass.hidden_output2);

        let hidden_error1 = hidden_delta2.dot(&self.weights2.t());
        let hidden_delta1 = hidden_error1 * relu_derivative(&pass.hidden_output1);

        let grads = [
            x.t().dot(&hidden_delta1),
            hidden_delta1.sum_axis(Axis(0)).insert_axis(Axis(0)),
            pass.hidden_output1.t().dot(&hidden_delta2),
            hidden_delta2.sum_axis(Axis(0)).insert_axis(Axis(0)),
            pass.hidden_output2.t().dot(&output_delta),
            output_delta.sum_axis(Axis(0)).insert_axis(Axis(0)),
        ];
        (grads, pass.output)
    }

    pub fn parameters_mut(&mut self) -> [&mut Array2<f64>; PARAM_COUNT] {
        [
            &mut self.weights1,
            &mut self.bias1,
            &mut self.weights2,
            &mut self.bias2,
            &mut self.weights3,
            &mut self.bias3,
        ]
    }

    pub fn parameters(&self) -> [&Array2<f64>; PARAM_COUNT] {
        [
            &self.weights1,
            &self.bias1,
            &self.weights2,
            &self.bias2,
            &self.weights3,
            &self.bias3,
        ]
    }

    /// Probability of rain for each (already normalized) row.
    pub fn predict_proba(&self, x: &Array2<f64>) -> Array1<f64> {
        self.forward(x).output.column(0).to_owned()
    }

    /// Probability of rain for one normalized vector.
    pub fn predict_one(&self, normalized: &[f64; INPUT_SIZE]) -> f64 {
        let input = arr2(&[*normalized]);
        self.forward(&input).output[[0, 0]]
    }

    /// Checks layer shapes and that every parameter is finite.
    pub fn check_architecture(&self) -> Result<(), String> {
        let expected = [
            (INPUT_SIZE, HIDDEN_SIZE1),
            (1, HIDDEN_SIZE1),
            (HIDDEN_SIZE1, HIDDEN_SIZE2),
            (1, HIDDEN_SIZE2),
            (HIDDEN_SIZE2, OUTPUT_SIZE),
            (1, OUTPUT_SIZE),
        ];
        for (i, (param, shape)) in self.parameters().iter().zip(expected).enumerate() {
            if param.dim() != shape {
                return Err(format!(
                    "parameter {i} has shape {:?}, expected {:?}",
                    param.dim(),
                    shape
                ));
            }
            if !param.iter().all(|v| v.is_finite()) {
                return Err(format!("parameter {i} contains non-finite values"));
            }
        }
        Ok(())
    }
}
