//! # deep-bsde: neural solver for high-dimensional semilinear parabolic PDEs
//!
//! A PDE of the form
//! ```text
//! ∂u/∂t + ½ Tr(σσᵀ Hess u) + μ·∇u + f(t, x, u, σᵀ∇u) = 0,     u(T, x) = g(x)
//! ```
//! is recast as a backward stochastic differential equation along a sampled
//! forward diffusion. The unknown value `u(0, X_0)`, the initial gradient and
//! one small network per intermediate time step are trained so that the
//! simulated value process hits `g(X_T)` at the horizon.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use deep_bsde::config::{Config, Problem};
//! use deep_bsde::equations::equation_for_config;
//! use deep_bsde::solver::TrainingLoop;
//!
//! let config = Config {
//!     num_iterations: 200,
//!     seed: Some(1),
//!     ..Config::for_problem(Problem::Hjb)
//! };
//! let equation = equation_for_config(Problem::Hjb, &config).expect("valid grid");
//! let history = TrainingLoop::new(&config, &equation)
//!     .and_then(|mut training| training.train())
//!     .expect("training converged");
//! println!("u(0, X_0) ≈ {:.4}", history.last().map_or(f64::NAN, |r| r.y0));
//! ```
//!
//! ## Modules
//!
//! - [`equations`]: the problem capability set and the built-in problems
//! - [`network`]: batch-normalized step approximators as burn modules
//! - [`solver`]: path simulation on burn tensors, clipped loss and the Adam training loop
//! - [`runner`] and [`output`]: artifacts written by the command-line entry point

pub mod config;
pub mod equations;
pub mod error;
pub mod math_utils;
pub mod network;
pub mod output;
pub mod rng;
pub mod runner;
pub mod solver;

pub use config::{Config, LearningRateSchedule, Problem};
pub use equations::{get_equation, BuiltinEquation, Equation};
pub use error::{BsdeError, BsdeResult};
pub use solver::{TrainingHistory, TrainingLoop, TrainingRecord};
