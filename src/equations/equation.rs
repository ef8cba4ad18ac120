// src/equations/equation.rs
//! Equation capability set
//!
//! # Mathematical Framework
//!
//! A semilinear parabolic PDE with terminal condition `u(T, x) = g(x)` is
//! tied to the forward-backward system
//! ```text
//! dX_t = μ(t, X_t) dt + σ(t, X_t) dW_t
//! dY_t = -f(t, X_t, Y_t, Z_t) dt + Z_t · dW_t,      Y_T = g(X_T)
//! ```
//! where `Y_t = u(t, X_t)` and `Z_t = σᵀ ∇u(t, X_t)`.
//!
//! Each concrete problem fixes the forward dynamics (through
//! [`Equation::step_with_dw`]), the driver `f` and the terminal condition `g`.
//! Sampling and `g` work on `ndarray` batches. The driver works on burn
//! tensors of any backend, so gradients flow through it on the autodiff
//! backend.
//!
//! # Array layout
//!
//! Batches are time-major: increments have shape `[N, batch, d]` and states
//! `[N + 1, batch, d]`, so the state at time step `i` is a contiguous
//! `[batch, d]` matrix.

use crate::error::{validation::*, BsdeError, BsdeResult};
use crate::rng::{self, RngFactory};
use burn::tensor::{backend::Backend, Tensor};
use ndarray::{Array1, Array2, Array3, ArrayView2, Axis};
use rand::RngCore;
use rayon::prelude::*;

/// Uniform time discretization shared by every equation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeGrid {
    pub dim: usize,
    pub total_time: f64,
    pub num_time_interval: usize,
}

impl TimeGrid {
    pub fn new(dim: usize, total_time: f64, num_time_interval: usize) -> BsdeResult<Self> {
        validate_count("dim", dim)?;
        validate_positive("total_time", total_time)?;
        validate_steps(num_time_interval)?;
        Ok(Self {
            dim,
            total_time,
            num_time_interval,
        })
    }

    pub fn delta_t(&self) -> f64 {
        self.total_time / self.num_time_interval as f64
    }

    pub fn sqrt_delta_t(&self) -> f64 {
        self.delta_t().sqrt()
    }

    /// Time stamp `t_i = i Δt`
    pub fn time(&self, i: usize) -> f64 {
        i as f64 * self.delta_t()
    }
}

/// One sampled batch of Brownian increments and the forward paths they drive
#[derive(Debug, Clone)]
pub struct SampleBatch {
    dw: Array3<f64>,
    x: Array3<f64>,
}

impl SampleBatch {
    /// Assemble a batch from increments `[N, batch, d]` and states `[N + 1, batch, d]`
    pub fn new(dw: Array3<f64>, x: Array3<f64>) -> BsdeResult<Self> {
        let (n, batch, dim) = dw.dim();
        if x.dim() != (n + 1, batch, dim) {
            return Err(BsdeError::ShapeMismatch {
                context: "sample batch states".to_string(),
                expected: format!("{:?}", (n + 1, batch, dim)),
                found: format!("{:?}", x.dim()),
            });
        }
        validate_count("num_samples", batch)?;
        Ok(Self { dw, x })
    }

    pub fn num_samples(&self) -> usize {
        self.dw.len_of(Axis(1))
    }

    pub fn num_steps(&self) -> usize {
        self.dw.len_of(Axis(0))
    }

    pub fn dim(&self) -> usize {
        self.dw.len_of(Axis(2))
    }

    /// Increments `ΔW_i`, shape `[batch, d]`
    pub fn dw_at(&self, i: usize) -> ArrayView2<'_, f64> {
        self.dw.index_axis(Axis(0), i)
    }

    /// States `X_i`, shape `[batch, d]`
    pub fn x_at(&self, i: usize) -> ArrayView2<'_, f64> {
        self.x.index_axis(Axis(0), i)
    }

    pub fn terminal_state(&self) -> ArrayView2<'_, f64> {
        self.x_at(self.num_steps())
    }
}

/// Capability set of one PDE/BSDE problem instance
pub trait Equation: Send + Sync {
    fn name(&self) -> &'static str;

    fn grid(&self) -> &TimeGrid;

    /// Starting point `X_0`
    fn x_init(&self) -> Array1<f64>;

    /// Advance a batch of states by one step given its increments
    fn step_with_dw(
        &self,
        x: ArrayView2<f64>,
        t: f64,
        dt: f64,
        dw: ArrayView2<f64>,
    ) -> Array2<f64>;

    /// `g(X_T)` for every sample
    fn terminal_condition(&self, x: ArrayView2<f64>) -> Array1<f64>;

    /// `f(t, x, y, z)` for every sample; `x` is `[batch, d]`, `y` is `[batch]`
    fn nonlinear_driver<B: Backend>(
        &self,
        t: f64,
        x: Tensor<B, 2>,
        y: Tensor<B, 1>,
        z: Tensor<B, 2>,
    ) -> Tensor<B, 1>;

    /// Reference value of `u(0, X_0)`, only used for reporting
    fn y_init(&self) -> Option<f64> {
        None
    }

    fn dim(&self) -> usize {
        self.grid().dim
    }

    fn num_time_interval(&self) -> usize {
        self.grid().num_time_interval
    }

    fn delta_t(&self) -> f64 {
        self.grid().delta_t()
    }

    /// Draw `num_samples` independent paths
    fn sample(&self, num_samples: usize, rng: &mut dyn RngCore) -> BsdeResult<SampleBatch> {
        validate_count("num_samples", num_samples)?;
        let dw = brownian_increments(self.grid(), num_samples, RngFactory::from_master(rng))?;
        let x = forward_paths(self, &dw);
        SampleBatch::new(dw, x)
    }
}

/// I.i.d. `N(0, Δt)` increments, shape `[N, num_samples, d]`
///
/// Each path draws from its own generator, so the result does not depend on
/// how rayon splits the batch.
pub fn brownian_increments(
    grid: &TimeGrid,
    num_samples: usize,
    factory: RngFactory,
) -> BsdeResult<Array3<f64>> {
    let n = grid.num_time_interval;
    let d = grid.dim;
    let sqrt_dt = grid.sqrt_delta_t();

    let per_path: Vec<Vec<f64>> = (0..num_samples)
        .into_par_iter()
        .map(|path| {
            let mut rng = factory.create_std_rng(path as u64);
            (0..n * d)
                .map(|_| rng::get_normal_draw(&mut rng) * sqrt_dt)
                .collect()
        })
        .collect();

    let path_major = Array3::from_shape_vec((num_samples, n, d), per_path.concat()).map_err(
        |e| BsdeError::ShapeMismatch {
            context: "brownian increments".to_string(),
            expected: format!("{:?}", (num_samples, n, d)),
            found: e.to_string(),
        },
    )?;
    Ok(path_major
        .permuted_axes([1, 0, 2])
        .as_standard_layout()
        .into_owned())
}

/// Run the forward recursion of `equation` over the given increments
pub fn forward_paths<E: Equation + ?Sized>(equation: &E, dw: &Array3<f64>) -> Array3<f64> {
    let (n, batch, d) = dw.dim();
    let dt = equation.delta_t();
    let mut x = Array3::zeros((n + 1, batch, d));
    x.index_axis_mut(Axis(0), 0).assign(&equation.x_init());

    for i in 0..n {
        let next = equation.step_with_dw(
            x.index_axis(Axis(0), i),
            equation.grid().time(i),
            dt,
            dw.index_axis(Axis(0), i),
        );
        x.index_axis_mut(Axis(0), i + 1).assign(&next);
    }
    x
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    #[test]
    fn test_time_grid() {
        let grid = TimeGrid::new(3, 1.0, 4).unwrap();
        assert_eq!(grid.delta_t(), 0.25);
        assert_eq!(grid.sqrt_delta_t(), 0.5);
        assert_eq!(grid.time(4), 1.0);
        assert!(TimeGrid::new(0, 1.0, 4).is_err());
        assert!(TimeGrid::new(3, 0.0, 4).is_err());
        assert!(TimeGrid::new(3, 1.0, 0).is_err());
    }

    #[test]
    fn test_sample_batch_shape_check() {
        let dw = Array3::<f64>::zeros((2, 4, 3));
        assert!(SampleBatch::new(dw.clone(), Array3::zeros((3, 4, 3))).is_ok());
        assert!(SampleBatch::new(dw.clone(), Array3::zeros((2, 4, 3))).is_err());
        assert!(SampleBatch::new(Array3::zeros((2, 0, 3)), Array3::zeros((3, 0, 3))).is_err());
    }

    #[test]
    fn test_brownian_increment_moments() {
        let grid = TimeGrid::new(4, 1.0, 10).unwrap();
        let dw = brownian_increments(&grid, 2000, RngFactory::new(11)).unwrap();
        assert_eq!(dw.dim(), (10, 2000, 4));

        let count = dw.len() as f64;
        let mean = dw.sum() / count;
        let variance = dw.mapv(|w| (w - mean).powi(2)).sum() / count;
        assert!(mean.abs() < 0.01, "mean {}", mean);
        assert!((variance - grid.delta_t()).abs() < 0.005, "variance {}", variance);
    }

    #[test]
    fn test_brownian_increments_reproducible() {
        let grid = TimeGrid::new(2, 0.5, 5).unwrap();
        let a = brownian_increments(&grid, 33, RngFactory::new(3)).unwrap();
        let b = brownian_increments(&grid, 33, RngFactory::new(3)).unwrap();
        let c = brownian_increments(&grid, 33, RngFactory::new(4)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
