pub mod allen_cahn;
pub mod burgers_type;
pub mod equation;
pub mod hjb;
pub mod pricing_default_risk;
pub mod pricing_diff_rate;

pub use allen_cahn::AllenCahn;
pub use burgers_type::BurgersType;
pub use equation::{Equation, SampleBatch, TimeGrid};
pub use hjb::Hjb;
pub use pricing_default_risk::PricingDefaultRisk;
pub use pricing_diff_rate::PricingDiffRate;

use crate::config::{Config, Problem};
use crate::error::BsdeResult;
use burn::tensor::{backend::Backend, Tensor};
use ndarray::{Array1, Array2, ArrayView2};

/// One of the built-in problems, selected at runtime by name
pub enum BuiltinEquation {
    AllenCahn(AllenCahn),
    Hjb(Hjb),
    PricingDiffRate(PricingDiffRate),
    PricingDefaultRisk(PricingDefaultRisk),
    BurgersType(BurgersType),
}

macro_rules! dispatch {
    ($self:ident, $eq:ident => $body:expr) => {
        match $self {
            BuiltinEquation::AllenCahn($eq) => $body,
            BuiltinEquation::Hjb($eq) => $body,
            BuiltinEquation::PricingDiffRate($eq) => $body,
            BuiltinEquation::PricingDefaultRisk($eq) => $body,
            BuiltinEquation::BurgersType($eq) => $body,
        }
    };
}

impl Equation for BuiltinEquation {
    fn name(&self) -> &'static str {
        dispatch!(self, eq => eq.name())
    }

    fn grid(&self) -> &TimeGrid {
        dispatch!(self, eq => eq.grid())
    }

    fn x_init(&self) -> Array1<f64> {
        dispatch!(self, eq => eq.x_init())
    }

    fn step_with_dw(
        &self,
        x: ArrayView2<f64>,
        t: f64,
        dt: f64,
        dw: ArrayView2<f64>,
    ) -> Array2<f64> {
        dispatch!(self, eq => eq.step_with_dw(x, t, dt, dw))
    }

    fn terminal_condition(&self, x: ArrayView2<f64>) -> Array1<f64> {
        dispatch!(self, eq => eq.terminal_condition(x))
    }

    fn nonlinear_driver<B: Backend>(
        &self,
        t: f64,
        x: Tensor<B, 2>,
        y: Tensor<B, 1>,
        z: Tensor<B, 2>,
    ) -> Tensor<B, 1> {
        dispatch!(self, eq => eq.nonlinear_driver(t, x, y, z))
    }

    fn y_init(&self) -> Option<f64> {
        dispatch!(self, eq => eq.y_init())
    }
}

/// Build the equation behind `problem` on the given grid
pub fn get_equation(
    problem: Problem,
    dim: usize,
    total_time: f64,
    num_time_interval: usize,
) -> BsdeResult<BuiltinEquation> {
    let equation = match problem {
        Problem::AllenCahn => {
            BuiltinEquation::AllenCahn(AllenCahn::new(dim, total_time, num_time_interval)?)
        }
        Problem::Hjb => BuiltinEquation::Hjb(Hjb::new(dim, total_time, num_time_interval)?),
        Problem::PricingDiffRate => BuiltinEquation::PricingDiffRate(PricingDiffRate::new(
            dim,
            total_time,
            num_time_interval,
        )?),
        Problem::PricingDefaultRisk => BuiltinEquation::PricingDefaultRisk(
            PricingDefaultRisk::new(dim, total_time, num_time_interval)?,
        ),
        Problem::BurgersType => {
            BuiltinEquation::BurgersType(BurgersType::new(dim, total_time, num_time_interval)?)
        }
    };
    Ok(equation)
}

/// Build the equation behind `problem` on the grid described by `config`
pub fn equation_for_config(problem: Problem, config: &Config) -> BsdeResult<BuiltinEquation> {
    get_equation(
        problem,
        config.dim,
        config.total_time,
        config.num_time_interval,
    )
}
