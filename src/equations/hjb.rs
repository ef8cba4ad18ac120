// src/equations/hjb.rs
//! Hamilton-Jacobi-Bellman equation of a linear-quadratic control problem
//!
//! ```text
//! ∂u/∂t + Δu - λ |∇u|² = 0,      u(T, x) = ln((1 + |x|²) / 2)
//! ```
//! With `σ = √2` the gradient enters through `Z = √2 ∇u`, so the driver is
//! `f(z) = -λ |z|² / 2`.

use super::equation::{Equation, TimeGrid};
use crate::error::{validation::*, BsdeResult};
use crate::math_utils::{row_sq_norms, tensor_row_sums};
use burn::tensor::{backend::Backend, Tensor};
use ndarray::{Array1, Array2, ArrayView2};
use std::f64::consts::SQRT_2;

/// Benchmark value of `u(0, 0)` for `d = 100`, `T = 1`, `λ = 1`
const REFERENCE_Y0: f64 = 4.5901;

pub struct Hjb {
    grid: TimeGrid,
    sigma: f64,
    lambda: f64,
    reference: Option<f64>,
}

impl Hjb {
    pub fn new(dim: usize, total_time: f64, num_time_interval: usize) -> BsdeResult<Self> {
        Self::with_lambda(dim, total_time, num_time_interval, 1.0)
    }

    pub fn with_lambda(
        dim: usize,
        total_time: f64,
        num_time_interval: usize,
        lambda: f64,
    ) -> BsdeResult<Self> {
        let grid = TimeGrid::new(dim, total_time, num_time_interval)?;
        validate_positive("lambda", lambda)?;
        let benchmark = dim == 100 && (total_time - 1.0).abs() < 1e-12 && lambda == 1.0;
        Ok(Hjb {
            grid,
            sigma: SQRT_2,
            lambda,
            reference: benchmark.then_some(REFERENCE_Y0),
        })
    }
}

impl Equation for Hjb {
    fn name(&self) -> &'static str {
        "HJB"
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
        row_sq_norms(x).mapv(|sq| ((1.0 + sq) / 2.0).ln())
    }

    fn nonlinear_driver<B: Backend>(
        &self,
        _t: f64,
        _x: Tensor<B, 2>,
        _y: Tensor<B, 1>,
        z: Tensor<B, 2>,
    ) -> Tensor<B, 1> {
        tensor_row_sums(z.clone() * z).mul_scalar(-0.5 * self.lambda)
    }

    fn y_init(&self) -> Option<f64> {
        self.reference
    }
}
