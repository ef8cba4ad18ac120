// src/equations/allen_cahn.rs
//! Allen-Cahn equation
//!
//! ```text
//! ∂u/∂t + Δu + u - u³ = 0,      u(T, x) = 1 / (2 + 0.4 |x|²)
//! ```
//! with `X_t = X_0 + √2 W_t` and driver `f(y) = y - y³`.

use super::equation::{Equation, TimeGrid};
use crate::error::BsdeResult;
use crate::math_utils::row_sq_norms;
use burn::tensor::{backend::Backend, Tensor};
use ndarray::{Array1, Array2, ArrayView2};
use std::f64::consts::SQRT_2;

/// Benchmark value of `u(0, 0)` for `d = 100`, `T = 0.3`
const REFERENCE_Y0: f64 = 0.052802;

pub struct AllenCahn {
    grid: TimeGrid,
    sigma: f64,
    reference: Option<f64>,
}

impl AllenCahn {
    pub fn new(dim: usize, total_time: f64, num_time_interval: usize) -> BsdeResult<Self> {
        let grid = TimeGrid::new(dim, total_time, num_time_interval)?;
        let reference = (dim == 100 && (total_time - 0.3).abs() < 1e-12).then_some(REFERENCE_Y0);
        Ok(AllenCahn {
            grid,
            sigma: SQRT_2,
            reference,
        })
    }
}

impl Equation for AllenCahn {
    fn name(&self) -> &'static str {
        "AllenCahn"
    }

    fn grid(&self) -> &TimeGrid {
        &self.grid
    }

    fn x_init(&self) -> Array1<f64> {
        Array1::zeros(self.grid.dim)
    }

    fn step_with_dw(
        &self,
        x: ArrayView2<f64>,
        _t: f64,
        _dt: f64,
        dw: ArrayView2<f64>,
    ) -> Array2<f64> {
        &x + &(&dw * self.sigma)
    }

    fn terminal_condition(&self, x: ArrayView2<f64>) -> Array1<f64> {
        row_sq_norms(x).mapv(|sq| 0.5 / (1.0 + 0.2 * sq))
    }

    fn nonlinear_driver<B: Backend>(
        &self,
        _t: f64,
        _x: Tensor<B, 2>,
        y: Tensor<B, 1>,
        _z: Tensor<B, 2>,
    ) -> Tensor<B, 1> {
        let cube = y.clone() * y.clone() * y.clone();
        y - cube
    }

    fn y_init(&self) -> Option<f64> {
        self.reference
    }
}
