//! Function approximators used by the solver

pub mod step_approximator;

pub use step_approximator::StepApproximator;
