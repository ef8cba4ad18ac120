// src/network/step_approximator.rs
//! Per-time-step feed-forward network
//!
//! # Architecture
//!
//! ```text
//! x ─► BN ─► [Linear ─► BN ─► ReLU] × hidden ─► Linear ─► BN ─► ∇u estimate
//! ```
//!
//! The network maps a state in `R^d` to a vector in `R^d`. Linear layers
//! carry no bias and there is no output nonlinearity. The solver owns one
//! independent instance per intermediate time step.
//!
//! Batch normalization follows the backend: on an autodiff backend it
//! normalizes with batch statistics and folds them into the running
//! averages, on the inner backend it uses the running averages only.

use crate::math_utils::{tensor_from_array1, tensor_from_array2};
use crate::rng;
use burn::{
    module::{Module, Param},
    nn::{BatchNorm, BatchNormConfig, Initializer, Linear, LinearConfig, Relu},
    tensor::{backend::Backend, Tensor},
};
use ndarray::{Array1, Array2};
use rand::Rng;

pub const BN_EPSILON: f64 = 1e-6;
/// Weight of the newest batch in the running statistics
pub const BN_MOMENTUM: f64 = 0.01;

#[derive(Module, Debug)]
pub struct HiddenLayer<B: Backend> {
    linear: Linear<B>,
    norm: BatchNorm<B, 0>,
}

#[derive(Module, Debug)]
pub struct StepApproximator<B: Backend> {
    input_norm: BatchNorm<B, 0>,
    hidden: Vec<HiddenLayer<B>>,
    output: Linear<B>,
    output_norm: BatchNorm<B, 0>,
    activation: Relu,
}

/// Bias-free linear layer with `W ~ N(0, (5 / √(in + out))²)`
fn linear<B: Backend, R: Rng + ?Sized>(
    d_input: usize,
    d_output: usize,
    rng: &mut R,
    device: &B::Device,
) -> Linear<B> {
    let mut layer = LinearConfig::new(d_input, d_output)
        .with_bias(false)
        .with_initializer(Initializer::Zeros)
        .init(device);
    let std = 5.0 / ((d_input + d_output) as f64).sqrt();
    let weight = Array2::from_shape_simple_fn((d_input, d_output), || {
        std * rng::get_normal_draw(rng)
    });
    layer.weight = Param::from_tensor(tensor_from_array2(weight.view(), device));
    layer
}

/// Batch norm with `γ ~ U(0.1, 0.5)`, `β ~ N(0, 0.1²)`, running statistics at `(0, 1)`
fn batch_norm<B: Backend, R: Rng + ?Sized>(
    width: usize,
    rng: &mut R,
    device: &B::Device,
) -> BatchNorm<B, 0> {
    let mut norm = BatchNormConfig::new(width)
        .with_epsilon(BN_EPSILON)
        .with_momentum(BN_MOMENTUM)
        .init(device);
    let gamma = Array1::from_shape_simple_fn(width, || rng::get_uniform_draw(rng, 0.1, 0.5));
    let beta = Array1::from_shape_simple_fn(width, || 0.1 * rng::get_normal_draw(rng));
    norm.gamma = Param::from_tensor(tensor_from_array1(gamma.view(), device));
    norm.beta = Param::from_tensor(tensor_from_array1(beta.view(), device));
    norm
}

impl<B: Backend> StepApproximator<B> {
    /// Every parameter is drawn from `rng`, so seeded models are reproducible
    pub fn new<R: Rng + ?Sized>(
        dim: usize,
        hidden_widths: &[usize],
        rng: &mut R,
        device: &B::Device,
    ) -> Self {
        let input_norm = batch_norm(dim, rng, device);
        let mut hidden = Vec::with_capacity(hidden_widths.len());
        let mut width = dim;
        for &next in hidden_widths {
            hidden.push(HiddenLayer {
                linear: linear(width, next, rng, device),
                norm: batch_norm(next, rng, device),
            });
            width = next;
        }
        StepApproximator {
            input_norm,
            hidden,
            output: linear(width, dim, rng, device),
            output_norm: batch_norm(dim, rng, device),
            activation: Relu::new(),
        }
    }

    pub fn num_hidden_layers(&self) -> usize {
        self.hidden.len()
    }

    /// Gradient estimate for a `[batch, d]` tensor of states
    pub fn forward(&self, x: Tensor<B, 2>) -> Tensor<B, 2> {
        let mut h = self.input_norm.forward(x);
        for layer in &self.hidden {
            h = self
                .activation
                .forward(layer.norm.forward(layer.linear.forward(h)));
        }
        self.output_norm.forward(self.output.forward(h))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math_utils::{tensor_to_array1, tensor_to_array2};
    use crate::rng::seed_rng_from_u64;
    use burn::backend::{Autodiff, NdArray};
    use burn::module::AutodiffModule;

    type TestBackend = NdArray<f64>;
    type TrainBackend = Autodiff<NdArray<f64>>;

    fn batch() -> Array2<f64> {
        Array2::from_shape_fn((6, 3), |(i, j)| ((i * 3 + j) as f64 * 0.37).sin())
    }

    fn seeded<B: Backend>(widths: &[usize], seed: u64) -> StepApproximator<B> {
        StepApproximator::new(3, widths, &mut seed_rng_from_u64(seed), &Default::default())
    }

    #[test]
    fn test_shapes_and_parameter_count() {
        let device = Default::default();
        let net = seeded::<TestBackend>(&[5, 4], 1);
        assert_eq!(net.num_hidden_layers(), 2);
        // norms: 2*(3 + 5 + 4 + 3), weights: 15 + 20 + 12
        assert_eq!(net.num_params(), 30 + 47);
        let out = net.forward(tensor_from_array2(batch().view(), &device));
        assert_eq!(out.dims(), [6, 3]);
    }

    #[test]
    fn test_inference_is_deterministic() {
        let device = Default::default();
        let net = seeded::<TestBackend>(&[4], 2);
        let x = || tensor_from_array2::<TestBackend>(batch().view(), &device);
        assert_eq!(
            tensor_to_array2(net.forward(x())),
            tensor_to_array2(net.forward(x()))
        );
    }

    #[test]
    fn test_seeded_construction_is_reproducible() {
        let device = Default::default();
        let a = seeded::<TestBackend>(&[4], 7);
        let b = seeded::<TestBackend>(&[4], 7);
        let x = || tensor_from_array2::<TestBackend>(batch().view(), &device);
        assert_eq!(tensor_to_array2(a.forward(x())), tensor_to_array2(b.forward(x())));
    }

    #[test]
    fn test_instances_do_not_share_parameters() {
        let device = Default::default();
        let mut rng = seed_rng_from_u64(3);
        let a = StepApproximator::<TestBackend>::new(3, &[4], &mut rng, &device);
        let b = StepApproximator::<TestBackend>::new(3, &[4], &mut rng, &device);
        let x = || tensor_from_array2::<TestBackend>(batch().view(), &device);
        assert_ne!(tensor_to_array2(a.forward(x())), tensor_to_array2(b.forward(x())));
    }

    #[test]
    fn test_training_forward_moves_running_statistics() {
        let device = Default::default();
        let net = seeded::<TrainBackend>(&[4], 4);
        let x = || tensor_from_array2::<TestBackend>(batch().view(), &device);
        let before = tensor_to_array2(net.valid().forward(x()));

        // training mode normalizes with batch statistics and updates the running ones
        let _ = net.forward(tensor_from_array2(batch().view(), &device));
        let after = tensor_to_array2(net.valid().forward(x()));
        assert_ne!(before, after);
    }

    #[test]
    fn test_training_batch_output_is_normalized() {
        let device = Default::default();
        let net = seeded::<TrainBackend>(&[4], 5);
        let out = tensor_to_array2(net.forward(tensor_from_array2(batch().view(), &device)));
        // the last batch norm centers every column on its β
        let beta = tensor_to_array1(net.output_norm.beta.val());
        for (column, &b) in out.columns().into_iter().zip(beta.iter()) {
            let mean = column.mean().unwrap_or(f64::NAN);
            assert!((mean - b).abs() < 1e-9, "{} vs {}", mean, b);
        }
    }
}
