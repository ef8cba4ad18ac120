// src/solver/trainer.rs
//! Training loop
//!
//! ```text
//! for step in 0..=num_iterations:
//!     if step % logging_frequency == 0 or step == num_iterations:
//!         sample validation batch → record (step, loss, y_init, elapsed)
//!     if step < num_iterations:
//!         sample batch → simulate → loss → backward → Adam update
//! ```
//!
//! Training runs on [`TrainBackend`], so batch normalization uses batch
//! statistics and the loss can be differentiated. Validation runs on the
//! inner backend through [`AutodiffModule::valid`] with running statistics
//! only. Parameters change only inside the optimizer step. A non-finite
//! loss, in training or validation, aborts the run with
//! [`BsdeError::NumericalDivergence`].

use super::loss::LossEvaluator;
use super::model::BsdeModel;
use super::path_simulator::PathSimulator;
use crate::config::{Config, LearningRateSchedule};
use crate::equations::{Equation, SampleBatch};
use crate::error::{BsdeError, BsdeResult};
use crate::math_utils::{tensor_from_array1, tensor_scalar, Timer};
use crate::rng;
use burn::{
    backend::{Autodiff, NdArray},
    module::{AutodiffModule, Module},
    optim::{AdamConfig, GradientsParams, Optimizer},
    tensor::{backend::Backend, Tensor},
};
use rand::rngs::StdRng;
use serde::Serialize;
use tracing::{debug, error, info};

/// Backend the model is trained on
pub type TrainBackend = Autodiff<NdArray<f64>>;

/// Adam with `β₁ = 0.9`, `β₂ = 0.999`, `ε = 1e-8`
pub fn adam() -> impl Optimizer<BsdeModel<TrainBackend>, TrainBackend> {
    AdamConfig::new()
        .with_beta_1(0.9)
        .with_beta_2(0.999)
        .with_epsilon(1e-8)
        .init()
}

/// One validation checkpoint
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrainingRecord {
    pub step: usize,
    pub loss: f64,
    /// Estimate of `u(0, X_0)` at this checkpoint
    pub y0: f64,
    /// Seconds since the loop was created
    pub elapsed_time: f64,
}

/// Append-only list of checkpoints, ordered by step
#[derive(Debug, Clone, Default, Serialize)]
pub struct TrainingHistory {
    records: Vec<TrainingRecord>,
}

impl TrainingHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, record: TrainingRecord) {
        debug_assert!(self.records.last().map_or(true, |last| last.step <= record.step));
        self.records.push(record);
    }

    pub fn records(&self) -> &[TrainingRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last(&self) -> Option<&TrainingRecord> {
        self.records.last()
    }

    /// `|y0 - reference| / |reference|` at the last checkpoint
    pub fn relative_error(&self, reference: f64) -> Option<f64> {
        self.last()
            .map(|record| ((record.y0 - reference) / reference).abs())
    }
}

pub struct TrainingLoop<'a, E: Equation> {
    config: Config,
    equation: &'a E,
    simulator: PathSimulator<'a, E>,
    model: BsdeModel<TrainBackend>,
    schedule: LearningRateSchedule,
    loss: LossEvaluator,
    rng: StdRng,
    device: <TrainBackend as Backend>::Device,
    applied_updates: usize,
    timer: Timer,
}

impl<'a, E: Equation> TrainingLoop<'a, E> {
    /// Validate `config` against `equation` and initialize every parameter
    pub fn new(config: &Config, equation: &'a E) -> BsdeResult<Self> {
        config.validate()?;
        let grid = equation.grid();
        if grid.dim != config.dim
            || grid.num_time_interval != config.num_time_interval
            || grid.total_time != config.total_time
        {
            return Err(BsdeError::ShapeMismatch {
                context: format!("equation {}", equation.name()),
                expected: format!(
                    "d = {}, T = {}, N = {}",
                    config.dim, config.total_time, config.num_time_interval
                ),
                found: format!(
                    "d = {}, T = {}, N = {}",
                    grid.dim, grid.total_time, grid.num_time_interval
                ),
            });
        }

        let schedule = config.lr_schedule()?;
        let loss = LossEvaluator::new(config.delta_clip)?;
        let device = Default::default();
        let mut rng = rng::master_rng(config.seed);
        let model = BsdeModel::new(config, &mut rng, &device);
        debug!(
            equation = equation.name(),
            parameters = model.num_params(),
            subnets = model.num_subnets(),
            "Initialized model"
        );

        Ok(Self {
            config: config.clone(),
            equation,
            simulator: PathSimulator::new(equation),
            model,
            schedule,
            loss,
            rng,
            device,
            applied_updates: 0,
            timer: Timer::new(),
        })
    }

    pub fn model(&self) -> &BsdeModel<TrainBackend> {
        &self.model
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run every iteration and return the validation history
    pub fn train(&mut self) -> BsdeResult<TrainingHistory> {
        let num_iterations = self.config.num_iterations;
        let frequency = self.config.logging_frequency;
        let mut optimizer = adam();
        let mut history = TrainingHistory::new();

        for step in 0..=num_iterations {
            if step % frequency == 0 || step == num_iterations {
                let valid_batch = self.equation.sample(self.config.valid_size, &mut self.rng)?;
                let loss = self.evaluate(&valid_batch)?;
                if !loss.is_finite() {
                    error!(step, loss, "Non-finite validation loss");
                    return Err(BsdeError::NumericalDivergence {
                        step,
                        phase: "validation".to_string(),
                        loss,
                    });
                }
                let record = TrainingRecord {
                    step,
                    loss,
                    y0: self.model.y0(),
                    elapsed_time: self.timer.elapsed_secs(),
                };
                if self.config.verbose {
                    info!(
                        step,
                        loss = %format!("{:.4e}", loss),
                        y0 = %format!("{:.4e}", record.y0),
                        elapsed = %format!("{:.0}s", record.elapsed_time),
                        "Validation checkpoint"
                    );
                } else {
                    debug!(step, loss, y0 = record.y0, "Validation checkpoint");
                }
                history.push(record);
            }
            if step < num_iterations {
                self.train_step(step, &mut optimizer)?;
            }
        }
        Ok(history)
    }

    /// Mean clipped loss of `model` on `batch`
    fn batch_loss<B: Backend>(
        &self,
        model: &BsdeModel<B>,
        batch: &SampleBatch,
        device: &B::Device,
    ) -> BsdeResult<Tensor<B, 1>> {
        let y_terminal = self.simulator.simulate(model, batch, device)?;
        let target = self.equation.terminal_condition(batch.terminal_state());
        Ok(self
            .loss
            .compute(y_terminal, tensor_from_array1(target.view(), device)))
    }

    /// Validation-mode loss on `batch`, possibly non-finite; the model is untouched
    pub fn evaluate(&self, batch: &SampleBatch) -> BsdeResult<f64> {
        let model = self.model.valid();
        let loss = self.batch_loss(&model, batch, &self.device)?;
        Ok(tensor_scalar(loss))
    }

    /// One optimizer update on a fresh batch; returns the batch loss
    pub fn train_step<O>(&mut self, step: usize, optimizer: &mut O) -> BsdeResult<f64>
    where
        O: Optimizer<BsdeModel<TrainBackend>, TrainBackend>,
    {
        let batch = self.equation.sample(self.config.batch_size, &mut self.rng)?;
        let loss = self.batch_loss(&self.model, &batch, &self.device)?;
        let value = tensor_scalar(loss.clone());
        if !value.is_finite() {
            error!(step, loss = value, "Non-finite training loss");
            return Err(BsdeError::NumericalDivergence {
                step,
                phase: "training".to_string(),
                loss: value,
            });
        }

        let applied = self.applied_updates;
        let learning_rate = self.schedule.value_at(applied);
        if applied > 0 && learning_rate != self.schedule.value_at(applied - 1) {
            debug!(step, learning_rate, "Learning rate changed");
        }
        let grads = GradientsParams::from_grads(loss.backward(), &self.model);
        self.model = optimizer.step(learning_rate, self.model.clone(), grads);
        self.applied_updates += 1;
        Ok(value)
    }
}
