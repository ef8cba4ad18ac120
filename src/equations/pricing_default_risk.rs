// src/equations/pricing_default_risk.rs
//! Option pricing with default risk
//!
//! The issuer defaults with an intensity `Q(y)` that depends on the current
//! value: `γ_h` below `v_h`, `γ_l` above `v_l`, linear in between.
//! ```text
//! f(t, x, y, z) = -(1 - δ) Q(y) y - R y
//! g(x)          = min_k x_k
//! ```
//! The underlyings are stepped with Euler-Maruyama on a geometric Brownian
//! motion with drift `μ̄` and volatility `σ`.

use super::equation::{Equation, TimeGrid};
use crate::error::{validation::*, BsdeResult};
use burn::tensor::{backend::Backend, Tensor};
use ndarray::{Array1, Array2, ArrayView2, Axis};

/// Benchmark price for `d = 100`, `T = 1`
const REFERENCE_Y0: f64 = 57.300;

#[derive(Debug, Clone, Copy)]
pub struct DefaultRiskParams {
    pub x0: f64,
    pub sigma: f64,
    pub rate: f64,
    /// Recovery fraction `δ`
    pub recovery: f64,
    pub gamma_high: f64,
    pub gamma_low: f64,
    pub mu_bar: f64,
    pub v_high: f64,
    pub v_low: f64,
}

impl Default for DefaultRiskParams {
    fn default() -> Self {
        DefaultRiskParams {
            x0: 100.0,
            sigma: 0.2,
            rate: 0.02,
            recovery: 2.0 / 3.0,
            gamma_high: 0.2,
            gamma_low: 0.02,
            mu_bar: 0.02,
            v_high: 50.0,
            v_low: 70.0,
        }
    }
}

impl DefaultRiskParams {
    fn slope(&self) -> f64 {
        (self.gamma_high - self.gamma_low) / (self.v_high - self.v_low)
    }

    /// Default intensity `Q(y)`, clamped to `[γ_l, γ_h]`
    fn intensity<B: Backend>(&self, y: Tensor<B, 1>) -> Tensor<B, 1> {
        y.sub_scalar(self.v_high)
            .mul_scalar(self.slope())
            .add_scalar(self.gamma_high)
            .clamp(self.gamma_low, self.gamma_high)
    }
}

pub struct PricingDefaultRisk {
    grid: TimeGrid,
    params: DefaultRiskParams,
    reference: Option<f64>,
}

impl PricingDefaultRisk {
    pub fn new(dim: usize, total_time: f64, num_time_interval: usize) -> BsdeResult<Self> {
        Self::with_params(dim, total_time, num_time_interval, DefaultRiskParams::default())
    }

    pub fn with_params(
        dim: usize,
        total_time: f64,
        num_time_interval: usize,
        params: DefaultRiskParams,
    ) -> BsdeResult<Self> {
        let grid = TimeGrid::new(dim, total_time, num_time_interval)?;
        validate_positive("x0", params.x0)?;
        validate_positive("sigma", params.sigma)?;
        validate_range("recovery", params.recovery, 0.0, 1.0)?;
        validate_positive("gamma_high", params.gamma_high)?;
        validate_positive("gamma_low", params.gamma_low)?;
        validate_range("gamma_low", params.gamma_low, 0.0, params.gamma_high)?;
        validate_finite("slope", params.slope())?;

        let benchmark = dim == 100 && (total_time - 1.0).abs() < 1e-12;
        Ok(PricingDefaultRisk {
            grid,
            params,
            reference: benchmark.then_some(REFERENCE_Y0),
        })
    }
}

impl Equation for PricingDefaultRisk {
    fn name(&self) -> &'static str {
        "PricingDefaultRisk"
    }

    fn grid(&self) -> &TimeGrid {
        &self.grid
    }

    fn x_init(&self) -> Array1<f64> {
        Array1::from_elem(self.grid.dim, self.params.x0)
    }

    fn step_with_dw(
        &self,
        x: ArrayView2<f64>,
        _t: f64,
        dt: f64,
        dw: ArrayView2<f64>,
    ) -> Array2<f64> {
        let p = &self.params;
        &x * &dw.mapv(|w| 1.0 + p.mu_bar * dt + p.sigma * w)
    }

    fn terminal_condition(&self, x: ArrayView2<f64>) -> Array1<f64> {
        x.map_axis(Axis(1), |row| row.fold(f64::INFINITY, |acc, &v| acc.min(v)))
    }

    fn nonlinear_driver<B: Backend>(
        &self,
        _t: f64,
        _x: Tensor<B, 2>,
        y: Tensor<B, 1>,
        _z: Tensor<B, 2>,
    ) -> Tensor<B, 1> {
        let p = &self.params;
        let rate = p
            .intensity(y.clone())
            .mul_scalar(-(1.0 - p.recovery))
            .sub_scalar(p.rate);
        rate * y
    }

    fn y_init(&self) -> Option<f64> {
        self.reference
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math_utils::{tensor_from_array1, tensor_from_array2, tensor_to_array1};
    use burn::backend::{Autodiff, NdArray};
    use ndarray::array;

    type TestBackend = Autodiff<NdArray<f64>>;

    #[test]
    fn test_intensity_regimes() {
        let p = DefaultRiskParams::default();
        let device = Default::default();
        let y = tensor_from_array1::<TestBackend>(array![40.0, 60.0, 80.0].view(), &device);
        let q = tensor_to_array1(p.intensity(y));
        assert!((q[0] - 0.2).abs() < 1e-12);
        assert!((q[1] - 0.11).abs() < 1e-12);
        assert!((q[2] - 0.02).abs() < 1e-12);
    }

    #[test]
    fn test_terminal_condition_is_worst_of() {
        let eq = PricingDefaultRisk::new(3, 1.0, 10).unwrap();
        let g = eq.terminal_condition(array![[100.0, 95.0, 120.0]].view());
        assert_eq!(g, array![95.0]);
    }

    #[test]
    fn test_driver_slope_in_linear_regime() {
        let eq = PricingDefaultRisk::new(1, 1.0, 10).unwrap();
        let device = Default::default();
        let x = tensor_from_array2::<TestBackend>(array![[100.0]].view(), &device);
        let z = tensor_from_array2::<TestBackend>(array![[0.0]].view(), &device);
        let y = tensor_from_array1::<TestBackend>(array![60.0].view(), &device).require_grad();

        let f = eq.nonlinear_driver(0.0, x, y.clone(), z);
        let value = tensor_to_array1(f.clone())[0];
        assert!((value - (-0.11 / 3.0 - 0.02) * 60.0).abs() < 1e-9);

        // ∂f/∂y = -(1 - δ)(Q + Q' y) - R
        let grads = f.sum().backward();
        let slope = tensor_to_array1(y.grad(&grads).unwrap())[0];
        let expected = -(0.11 - 0.009 * 60.0) / 3.0 - 0.02;
        assert!((slope - expected).abs() < 1e-9, "{} vs {}", slope, expected);
    }

    #[test]
    fn test_rejects_invalid_recovery() {
        let params = DefaultRiskParams {
            recovery: 1.5,
            ..Default::default()
        };
        assert!(PricingDefaultRisk::with_params(2, 1.0, 10, params).is_err());
    }

    #[test]
    fn test_rejects_inverted_intensity_bounds() {
        let params = DefaultRiskParams {
            gamma_low: 0.3,
            ..Default::default()
        };
        assert!(PricingDefaultRisk::with_params(2, 1.0, 10, params).is_err());
    }
}
