// src/equations/burgers_type.rs
//! Multidimensional Burgers-type equation with an explicit solution
//!
//! ```text
//! f(t, x, y, z) = (y - (2 + d)/(2d)) Σ_k z_k
//! ```
//! The forward process is `X_t = σ W_t` with `σ = d/√2`, the terminal
//! condition `g(x) = 1 - 1/(1 + exp(T + Σx/d))`, and the exact solution
//! `u(t, x) = 1 - 1/(1 + exp(t + Σx/d))` gives `u(0, 0) = 1/2`.

use super::equation::{Equation, TimeGrid};
use crate::error::BsdeResult;
use crate::math_utils::{row_sums, tensor_row_sums};
use burn::tensor::{backend::Backend, Tensor};
use ndarray::{Array1, Array2, ArrayView2};
use std::f64::consts::SQRT_2;

pub struct BurgersType {
    grid: TimeGrid,
    sigma: f64,
}

impl BurgersType {
    pub fn new(dim: usize, total_time: f64, num_time_interval: usize) -> BsdeResult<Self> {
        let grid = TimeGrid::new(dim, total_time, num_time_interval)?;
        Ok(BurgersType {
            grid,
            sigma: dim as f64 / SQRT_2,
        })
    }

    fn shift(&self) -> f64 {
        let d = self.grid.dim as f64;
        (2.0 + d) / (2.0 * d)
    }
}

impl Equation for BurgersType {
    fn name(&self) -> &'static str {
        "BurgersType"
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
        let d = self.grid.dim as f64;
        let t = self.grid.total_time;
        row_sums(x).mapv(|s| 1.0 - 1.0 / (1.0 + (t + s / d).exp()))
    }

    fn nonlinear_driver<B: Backend>(
        &self,
        _t: f64,
        _x: Tensor<B, 2>,
        y: Tensor<B, 1>,
        z: Tensor<B, 2>,
    ) -> Tensor<B, 1> {
        y.sub_scalar(self.shift()) * tensor_row_sums(z)
    }

    fn y_init(&self) -> Option<f64> {
        Some(0.5)
    }
}
