// src/solver/path_simulator.rs
//! Forward simulation of the backward process
//!
//! # Scheme
//!
//! Starting from the trainable time-0 values, the value process is pushed
//! forward along each sampled path:
//! ```text
//! Y_{i+1} = Y_i - Δt f(t_i, X_i, Y_i, Z_i) + Z_i · ΔW_i
//! Z_{i+1} = Subnet_i(X_{i+1}) / d                      for i < N - 1
//! ```
//! `Y_N` is then compared against `g(X_N)`.
//!
//! The recursion is written once over burn tensors. On an autodiff backend it
//! records the graph that `backward` differentiates and runs the step
//! approximators in training mode; on the inner backend it is plain
//! inference.

use super::model::BsdeModel;
use crate::equations::{Equation, SampleBatch};
use crate::error::{BsdeError, BsdeResult};
use crate::math_utils::{tensor_from_array2, tensor_row_sums};
use burn::tensor::{backend::Backend, Tensor};

pub struct PathSimulator<'a, E: Equation> {
    equation: &'a E,
}

impl<'a, E: Equation> PathSimulator<'a, E> {
    pub fn new(equation: &'a E) -> Self {
        Self { equation }
    }

    fn check_shapes<B: Backend>(
        &self,
        model: &BsdeModel<B>,
        batch: &SampleBatch,
    ) -> BsdeResult<()> {
        let n = self.equation.num_time_interval();
        let d = self.equation.dim();
        if batch.num_steps() != n || batch.dim() != d {
            return Err(BsdeError::ShapeMismatch {
                context: "sample batch".to_string(),
                expected: format!("{} steps in dimension {}", n, d),
                found: format!("{} steps in dimension {}", batch.num_steps(), batch.dim()),
            });
        }
        if model.num_subnets() != n - 1 || model.dim() != d {
            return Err(BsdeError::ShapeMismatch {
                context: "model".to_string(),
                expected: format!("{} step approximators in dimension {}", n - 1, d),
                found: format!(
                    "{} step approximators in dimension {}",
                    model.num_subnets(),
                    model.dim()
                ),
            });
        }
        Ok(())
    }

    /// Simulated `Y_N` for every sample of `batch`
    pub fn simulate<B: Backend>(
        &self,
        model: &BsdeModel<B>,
        batch: &SampleBatch,
        device: &B::Device,
    ) -> BsdeResult<Tensor<B, 1>> {
        self.check_shapes(model, batch)?;
        let grid = self.equation.grid();
        let n = grid.num_time_interval;
        let dt = grid.delta_t();
        let dim = grid.dim;
        let num_samples = batch.num_samples();

        // broadcast the time-0 parameters over the batch
        let ones = Tensor::<B, 2>::ones([num_samples, 1], device);
        let mut y = ones
            .clone()
            .matmul(model.y_init().reshape([1, 1]))
            .reshape([num_samples]);
        let mut z = ones.matmul(model.z_init().reshape([1, dim]));

        for i in 0..n {
            let x = tensor_from_array2(batch.x_at(i), device);
            let dw = tensor_from_array2(batch.dw_at(i), device);
            let driver = self
                .equation
                .nonlinear_driver(grid.time(i), x, y.clone(), z.clone());
            y = y - driver.mul_scalar(dt) + tensor_row_sums(z * dw);

            if i + 1 == n {
                break;
            }
            let x_next = tensor_from_array2(batch.x_at(i + 1), device);
            z = model.subnets()[i].forward(x_next).div_scalar(dim as f64);
        }
        Ok(y)
    }
}
