// src/solver/model.rs
//! Trainable parameters of the solver
//!
//! - `y_init`: value `u(0, X_0)`, one scalar broadcast over the batch
//! - `z_init`: gradient estimate at time 0, one vector broadcast over the batch
//! - one [`StepApproximator`] per intermediate time step `t_1 .. t_{N-1}`

use crate::config::Config;
use crate::math_utils::{tensor_from_array1, tensor_scalar};
use crate::network::StepApproximator;
use crate::rng;
use burn::{
    module::{Module, Param},
    tensor::{backend::Backend, Tensor},
};
use ndarray::Array1;
use rand::Rng;

#[derive(Module, Debug)]
pub struct BsdeModel<B: Backend> {
    y_init: Param<Tensor<B, 1>>,
    z_init: Param<Tensor<B, 1>>,
    subnets: Vec<StepApproximator<B>>,
}

impl<B: Backend> BsdeModel<B> {
    /// Random initialization following `config`, every draw taken from `rng`
    pub fn new<R: Rng + ?Sized>(config: &Config, rng: &mut R, device: &B::Device) -> Self {
        let [low, high] = config.y_init_range;
        let y_init = rng::get_uniform_draw(rng, low, high);
        let z_init =
            Array1::from_shape_simple_fn(config.dim, || rng::get_uniform_draw(rng, -0.1, 0.1));
        let widths = config.hidden_widths();
        let subnets = (0..config.num_subnets())
            .map(|_| StepApproximator::new(config.dim, &widths, rng, device))
            .collect();
        Self::with_initial_values(y_init, z_init, subnets, device)
    }

    /// Model with fixed time-0 parameters
    pub fn with_initial_values(
        y_init: f64,
        z_init: Array1<f64>,
        subnets: Vec<StepApproximator<B>>,
        device: &B::Device,
    ) -> Self {
        let y_init = Array1::from_elem(1, y_init);
        BsdeModel {
            y_init: Param::from_tensor(tensor_from_array1(y_init.view(), device)),
            z_init: Param::from_tensor(tensor_from_array1(z_init.view(), device)),
            subnets,
        }
    }

    /// `y_init` as a one-element tensor
    pub fn y_init(&self) -> Tensor<B, 1> {
        self.y_init.val()
    }

    pub fn z_init(&self) -> Tensor<B, 1> {
        self.z_init.val()
    }

    /// Current estimate of `u(0, X_0)`
    pub fn y0(&self) -> f64 {
        tensor_scalar(self.y_init())
    }

    pub fn subnets(&self) -> &[StepApproximator<B>] {
        &self.subnets
    }

    pub fn num_subnets(&self) -> usize {
        self.subnets.len()
    }

    pub fn dim(&self) -> usize {
        let [dim] = self.z_init.val().dims();
        dim
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Problem;
    use crate::math_utils::tensor_to_array1;
    use crate::rng::seed_rng_from_u64;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f64>;

    fn small_config() -> Config {
        Config {
            dim: 3,
            num_time_interval: 6,
            width_multiplier: 1,
            ..Config::for_problem(Problem::AllenCahn)
        }
    }

    fn model(config: &Config, seed: u64) -> BsdeModel<TestBackend> {
        BsdeModel::new(config, &mut seed_rng_from_u64(seed), &Default::default())
    }

    #[test]
    fn test_one_approximator_per_intermediate_step() {
        let config = small_config();
        let model = model(&config, 1);
        assert_eq!(model.num_subnets(), config.num_time_interval - 1);
        assert_eq!(model.dim(), 3);
        assert!(model.subnets().iter().all(|s| s.num_hidden_layers() == 2));
    }

    #[test]
    fn test_initial_values_within_ranges() {
        let model = model(&small_config(), 2);
        assert!((0.3..0.6).contains(&model.y0()));
        assert!(tensor_to_array1(model.z_init())
            .iter()
            .all(|z| (-0.1..0.1).contains(z)));
    }

    #[test]
    fn test_single_step_grid_has_no_approximators() {
        let config = Config {
            num_time_interval: 1,
            ..small_config()
        };
        let model = model(&config, 3);
        assert_eq!(model.num_subnets(), 0);
        assert_eq!(model.num_params(), 1 + 3);
    }

    #[test]
    fn test_seeded_models_match() {
        let config = small_config();
        let (a, b) = (model(&config, 4), model(&config, 4));
        assert_eq!(a.y0(), b.y0());
        assert_eq!(tensor_to_array1(a.z_init()), tensor_to_array1(b.z_init()));
        assert_ne!(a.y0(), model(&config, 5).y0());
    }
}
