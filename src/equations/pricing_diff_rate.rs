// src/equations/pricing_diff_rate.rs
//! European option pricing with different borrowing and lending rates
//!
//! # Model
//!
//! The `d` underlyings follow independent geometric Brownian motions,
//! stepped with the exact solution
//! ```text
//! X_{n+1} = X_n * exp((μ - σ²/2) Δt + σ ΔW_n)
//! ```
//! The hedging portfolio borrows at `R_b` and lends at `R_l`, which makes
//! the pricing equation nonlinear:
//! ```text
//! f(t, x, y, z) = -R_l y - (μ - R_l) S + (R_b - R_l) max(S - y, 0),   S = Σ_k z_k / σ
//! ```
//! The payoff is a call spread on the best performer:
//! `g(x) = max(max_k x_k - 120, 0) - 2 max(max_k x_k - 150, 0)`.

use super::equation::{Equation, TimeGrid};
use crate::error::{validation::*, BsdeResult};
use crate::math_utils::tensor_row_sums;
use burn::tensor::{backend::Backend, Tensor};
use ndarray::{Array1, Array2, ArrayView2, Axis};

/// Benchmark price for `d = 100`, `T = 0.5`
const REFERENCE_Y0: f64 = 21.299;

#[derive(Debug, Clone, Copy)]
pub struct DiffRateParams {
    pub x0: f64,
    pub sigma: f64,
    pub mu_bar: f64,
    pub rate_lend: f64,
    pub rate_borrow: f64,
}

impl Default for DiffRateParams {
    fn default() -> Self {
        DiffRateParams {
            x0: 100.0,
            sigma: 0.2,
            mu_bar: 0.06,
            rate_lend: 0.04,
            rate_borrow: 0.06,
        }
    }
}

pub struct PricingDiffRate {
    grid: TimeGrid,
    params: DiffRateParams,
    reference: Option<f64>,
}

impl PricingDiffRate {
    pub fn new(dim: usize, total_time: f64, num_time_interval: usize) -> BsdeResult<Self> {
        Self::with_params(dim, total_time, num_time_interval, DiffRateParams::default())
    }

    pub fn with_params(
        dim: usize,
        total_time: f64,
        num_time_interval: usize,
        params: DiffRateParams,
    ) -> BsdeResult<Self> {
        let grid = TimeGrid::new(dim, total_time, num_time_interval)?;
        validate_positive("x0", params.x0)?;
        validate_positive("sigma", params.sigma)?;
        validate_finite("mu_bar", params.mu_bar)?;
        validate_finite("rate_lend", params.rate_lend)?;
        validate_finite("rate_borrow", params.rate_borrow)?;

        let benchmark = dim == 100 && (total_time - 0.5).abs() < 1e-12;
        Ok(PricingDiffRate {
            grid,
            params,
            reference: benchmark.then_some(REFERENCE_Y0),
        })
    }

}

impl Equation for PricingDiffRate {
    fn name(&self) -> &'static str {
        "PricingDiffRate"
    }

    fn grid(&self) -> &TimeGrid {
        &self.grid
    }

    fn x_init(&self) -> Array1<f64> {
        Array1::from_elem(self.grid.dim, self.params.x0)
    }

    fn step_with_dw(
        &self,
        x: ArrayView2<f64>,
        _t: f64,
        dt: f64,
        dw: ArrayView2<f64>,
    ) -> Array2<f64> {
        let p = &self.params;
        let factor = ((p.mu_bar - 0.5 * p.sigma * p.sigma) * dt).exp();
        &x * &dw.mapv(|w| factor * (p.sigma * w).exp())
    }

    fn terminal_condition(&self, x: ArrayView2<f64>) -> Array1<f64> {
        x.map_axis(Axis(1), |row| {
            let best = row.fold(f64::NEG_INFINITY, |acc, &v| acc.max(v));
            (best - 120.0).max(0.0) - 2.0 * (best - 150.0).max(0.0)
        })
    }

    fn nonlinear_driver<B: Backend>(
        &self,
        _t: f64,
        _x: Tensor<B, 2>,
        y: Tensor<B, 1>,
        z: Tensor<B, 2>,
    ) -> Tensor<B, 1> {
        let p = &self.params;
        let hedge = tensor_row_sums(z).div_scalar(p.sigma);
        let borrowed = (hedge.clone() - y.clone()).clamp_min(0.0);
        y.mul_scalar(-p.rate_lend)
            - hedge.mul_scalar(p.mu_bar - p.rate_lend)
            + borrowed.mul_scalar(p.rate_borrow - p.rate_lend)
    }

    fn y_init(&self) -> Option<f64> {
        self.reference
    }
}
