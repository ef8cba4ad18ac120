// src/solver/loss.rs
//! Delta-clipped terminal loss
//!
//! ```text
//! ℓ(δ) = δ²                 if |δ| < δ_c
//!      = 2 δ_c |δ| - δ_c²   otherwise,          δ = Y_N - g(X_N)
//! ```
//! Quadratic near zero and linear in the tails. `ℓ` and its derivative are
//! continuous at `|δ| = δ_c`. With `a = |δ|` and `m = min(a, δ_c)` both
//! branches read `m² + 2 δ_c (a - m)`, which is how the loss is evaluated.

use crate::error::{validation::*, BsdeResult};
use burn::tensor::{backend::Backend, Tensor};

#[derive(Debug, Clone, Copy)]
pub struct LossEvaluator {
    delta_clip: f64,
}

impl LossEvaluator {
    pub fn new(delta_clip: f64) -> BsdeResult<Self> {
        validate_positive("delta_clip", delta_clip)?;
        Ok(Self { delta_clip })
    }

    /// Batch mean of the clipped loss, a one-element tensor
    pub fn compute<B: Backend>(&self, y_sim: Tensor<B, 1>, target: Tensor<B, 1>) -> Tensor<B, 1> {
        let c = self.delta_clip;
        let abs = (y_sim - target).abs();
        let inner = abs.clone().clamp_max(c);
        let tail = (abs - inner.clone()).mul_scalar(2.0 * c);
        (inner.clone() * inner + tail).mean()
    }
}
