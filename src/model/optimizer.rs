//! Adam (Kingma & Ba, 2015) over dense `ndarray` parameters.
//!
//! ```text
//! m_t = β₁ * m_{t-1} + (1 - β₁) * grad
//! v_t = β₂ * v_{t-1} + (1 - β₂) * grad²
//! m̂_t = m_t / (1 - β₁ᵗ)
//! v̂_t = v_t / (1 - β₂ᵗ)
//! param = param - lr * m̂_t / (√v̂_t + ε)
//! ```

use ndarray::{Array2, Zip};

#[derive(Debug, Clone)]
pub struct Adam {
    lr: f64,
    beta1: f64,
    beta2: f64,
    eps: f64,
    /// First and second moment estimates, one pair per parameter.
    moments: Vec<(Array2<f64>, Array2<f64>)>,
    t: i32,
}

impl Adam {
    /// β₁=0.9, β₂=0.999, ε=1e-7.
    pub fn new(lr: f64) -> Self {
        Self {
            lr,
            beta1: 0.9,
            beta2: 0.999,
            eps: 1e-7,
            moments: Vec::new(),
            t: 0,
        }
    }

    pub fn lr(&self) -> f64 {
        self.lr
    }

    pub fn steps(&self) -> i32 {
        self.t
    }

    /// Applies one update. `params` and `grads` must line up and keep the
    /// same shapes across calls.
    pub fn step(&mut self, params: &mut [&mut Array2<f64>], grads: &[Array2<f64>]) {
        if self.moments.len() != params.len() {
            self.moments = params
                .iter()
                .map(|p| (Array2::zeros(p.raw_dim()), Array2::zeros(p.raw_dim())))
                .collect();
        }

        self.t += 1;
        let bias_correction1 = 1.0 - self.beta1.powi(self.t);
        let bias_correction2 = 1.0 - self.beta2.powi(self.t);
        let (lr, beta1, beta2, eps) = (self.lr, self.beta1, self.beta2, self.eps);

        for ((param, grad), (m, v)) in params.iter_mut().zip(grads).zip(&mut self.moments) {
            Zip::from(&mut **param)
                .and(grad)
                .and(m)
                .and(v)
                .for_each(|p, &g, m, v| {
                    *m = beta1 * *m + (1.0 - beta1) * g;
                    *v = beta2 * *v + (1.0 - beta2) * g * g;
                    let m_hat = *m / bias_correction1;
                    let v_hat = *v / bias_correction2;
                    *p -= lr * m_hat / (v_hat.sqrt() + eps);
                });
        }
    }
}
