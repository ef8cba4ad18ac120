// src/config.rs
//! Solver configuration and per-problem presets
//!
//! A [`Config`] is built once per problem, validated, and then only read.
//! Every field is serialized into the run's config snapshot, so the struct
//! derives `Serialize`/`Deserialize` and is compared field by field after a
//! reload.

use crate::error::{validation::*, BsdeError, BsdeResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Problems with a built-in equation and config preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Problem {
    AllenCahn,
    Hjb,
    PricingDiffRate,
    PricingDefaultRisk,
    BurgersType,
}

impl Problem {
    pub const ALL: [Problem; 5] = [
        Problem::AllenCahn,
        Problem::Hjb,
        Problem::PricingDiffRate,
        Problem::PricingDefaultRisk,
        Problem::BurgersType,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Problem::AllenCahn => "AllenCahn",
            Problem::Hjb => "HJB",
            Problem::PricingDiffRate => "PricingDiffRate",
            Problem::PricingDefaultRisk => "PricingDefaultRisk",
            Problem::BurgersType => "BurgersType",
        }
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Problem {
    type Err = BsdeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Problem::ALL
            .iter()
            .copied()
            .find(|p| p.name() == s)
            .ok_or_else(|| BsdeError::UnknownEquation {
                name: s.to_string(),
            })
    }
}

/// Hyperparameters of one solver run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Spatial dimension `d`
    pub dim: usize,
    /// Horizon `T`
    pub total_time: f64,
    /// Number of time steps `N`
    pub num_time_interval: usize,
    pub batch_size: usize,
    pub valid_size: usize,
    pub num_iterations: usize,
    /// Validation checkpoint interval
    pub logging_frequency: usize,
    /// Update counts at which the learning rate switches to the next value
    pub lr_boundaries: Vec<usize>,
    /// One more entry than `lr_boundaries`
    pub lr_values: Vec<f64>,
    /// Hidden width of every step approximator is `width_multiplier * (d + 10)`
    pub width_multiplier: usize,
    pub num_hidden_layers: usize,
    /// Interval the trainable `y_init` is drawn from
    pub y_init_range: [f64; 2],
    /// Huber threshold `δ` of the loss
    pub delta_clip: f64,
    pub verbose: bool,
    /// Master seed; `None` draws from OS entropy
    pub seed: Option<u64>,
}

impl Config {
    /// Shared defaults, widths scaled to the dimension
    fn base(dim: usize, total_time: f64, num_time_interval: usize) -> Self {
        Config {
            dim,
            total_time,
            num_time_interval,
            batch_size: 64,
            valid_size: 256,
            num_iterations: 6000,
            logging_frequency: 100,
            lr_boundaries: vec![2000, 4000],
            lr_values: vec![1e-2, 1e-3, 1e-4],
            width_multiplier: 4,
            num_hidden_layers: 2,
            y_init_range: [0.0, 1.0],
            delta_clip: 50.0,
            verbose: true,
            seed: None,
        }
    }

    /// Preset for a built-in problem
    pub fn for_problem(problem: Problem) -> Self {
        match problem {
            Problem::AllenCahn => Config {
                num_iterations: 4000,
                lr_boundaries: vec![2000],
                lr_values: vec![5e-4, 5e-4],
                y_init_range: [0.3, 0.6],
                ..Config::base(100, 0.3, 20)
            },
            Problem::Hjb => Config {
                num_iterations: 2000,
                lr_boundaries: vec![400],
                lr_values: vec![1e-2, 1e-2],
                y_init_range: [0.0, 1.0],
                ..Config::base(100, 1.0, 20)
            },
            Problem::PricingDiffRate => Config {
                num_iterations: 4000,
                lr_boundaries: vec![2000],
                lr_values: vec![5e-3, 5e-3],
                y_init_range: [15.0, 18.0],
                ..Config::base(100, 0.5, 20)
            },
            Problem::PricingDefaultRisk => Config {
                num_iterations: 6000,
                lr_boundaries: vec![3000],
                lr_values: vec![8e-3, 8e-3],
                y_init_range: [40.0, 50.0],
                ..Config::base(100, 1.0, 40)
            },
            Problem::BurgersType => Config {
                num_iterations: 30000,
                lr_boundaries: vec![15000, 25000],
                lr_values: vec![1e-2, 1e-3, 1e-4],
                y_init_range: [2.0, 4.0],
                ..Config::base(50, 0.2, 30)
            },
        }
    }

    /// Preset looked up by problem name
    pub fn for_name(name: &str) -> BsdeResult<Self> {
        Ok(Self::for_problem(name.parse()?))
    }

    pub fn delta_t(&self) -> f64 {
        self.total_time / self.num_time_interval as f64
    }

    /// Width of every hidden layer of a step approximator
    pub fn hidden_widths(&self) -> Vec<usize> {
        vec![self.width_multiplier * (self.dim + 10); self.num_hidden_layers]
    }

    /// Number of step approximators, one per intermediate time step
    pub fn num_subnets(&self) -> usize {
        self.num_time_interval.saturating_sub(1)
    }

    /// Number of validation records a full run produces
    pub fn expected_records(&self) -> usize {
        let freq = self.logging_frequency.max(1);
        self.num_iterations.div_ceil(freq) + 1
    }

    /// Check every field; called before any solver state is built
    pub fn validate(&self) -> BsdeResult<()> {
        validate_count("dim", self.dim)?;
        validate_positive("total_time", self.total_time)?;
        validate_steps(self.num_time_interval)?;
        validate_count("batch_size", self.batch_size)?;
        validate_count("valid_size", self.valid_size)?;
        validate_count("logging_frequency", self.logging_frequency)?;
        validate_positive("delta_clip", self.delta_clip)?;

        validate_count("width_multiplier", self.width_multiplier)?;
        validate_count("num_hidden_layers", self.num_hidden_layers)?;

        let [low, high] = self.y_init_range;
        validate_finite("y_init_range[0]", low)?;
        validate_finite("y_init_range[1]", high)?;
        if low > high {
            return Err(BsdeError::InvalidConfiguration {
                field: "y_init_range".to_string(),
                reason: format!("lower bound {} exceeds upper bound {}", low, high),
            });
        }

        LearningRateSchedule::new(self.lr_boundaries.clone(), self.lr_values.clone())?;
        Ok(())
    }

    pub fn lr_schedule(&self) -> BsdeResult<LearningRateSchedule> {
        LearningRateSchedule::new(self.lr_boundaries.clone(), self.lr_values.clone())
    }
}

/// Piecewise-constant learning rate keyed by the number of applied updates
///
/// With boundaries `[b0, b1]` and values `[v0, v1, v2]` the rate is `v0` for
/// `step <= b0`, `v1` for `b0 < step <= b1` and `v2` afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct LearningRateSchedule {
    boundaries: Vec<usize>,
    values: Vec<f64>,
}

impl LearningRateSchedule {
    pub fn new(boundaries: Vec<usize>, values: Vec<f64>) -> BsdeResult<Self> {
        if values.len() != boundaries.len() + 1 {
            return Err(BsdeError::InvalidConfiguration {
                field: "lr_values".to_string(),
                reason: format!(
                    "expected {} values for {} boundaries, found {}",
                    boundaries.len() + 1,
                    boundaries.len(),
                    values.len()
                ),
            });
        }
        if boundaries.windows(2).any(|w| w[0] >= w[1]) {
            return Err(BsdeError::InvalidConfiguration {
                field: "lr_boundaries".to_string(),
                reason: "must be strictly increasing".to_string(),
            });
        }
        for &value in &values {
            validate_positive("lr_values", value)?;
        }
        Ok(Self { boundaries, values })
    }

    pub fn value_at(&self, step: usize) -> f64 {
        let idx = self.boundaries.iter().take_while(|&&b| step > b).count();
        self.values[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_problem_names_round_trip() {
        for problem in Problem::ALL {
            assert_eq!(problem.name().parse::<Problem>().ok(), Some(problem));
        }
    }

    #[test]
    fn test_unknown_problem_name() {
        let err = Config::for_name("NavierStokes").unwrap_err();
        assert!(matches!(err, BsdeError::UnknownEquation { ref name } if name == "NavierStokes"));
        assert!(err.to_string().contains("Unknown equation"));
    }

    #[test]
    fn test_presets_are_valid() {
        for problem in Problem::ALL {
            let config = Config::for_problem(problem);
            assert!(config.validate().is_ok(), "{} preset invalid", problem);
            assert_eq!(config.num_subnets(), config.num_time_interval - 1);
        }
    }

    #[test]
    fn test_allen_cahn_preset() {
        let config = Config::for_problem(Problem::AllenCahn);
        assert_eq!(config.dim, 100);
        assert_eq!(config.num_time_interval, 20);
        assert_eq!(config.hidden_widths(), vec![440, 440]);
        assert!((config.delta_t() - 0.015).abs() < 1e-15);
    }

    #[test]
    fn test_hidden_widths_follow_multiplier() {
        let config = Config {
            dim: 3,
            width_multiplier: 1,
            num_hidden_layers: 3,
            ..Config::for_problem(Problem::Hjb)
        };
        assert_eq!(config.hidden_widths(), vec![13, 13, 13]);
    }

    #[test]
    fn test_validate_rejects_bad_counts() {
        let mut config = Config::for_problem(Problem::Hjb);
        config.batch_size = 0;
        assert!(config.validate().is_err());

        let mut config = Config::for_problem(Problem::Hjb);
        config.num_time_interval = 0;
        assert!(config.validate().is_err());

        let mut config = Config::for_problem(Problem::Hjb);
        config.y_init_range = [1.0, 0.0];
        assert!(config.validate().is_err());

        let mut config = Config::for_problem(Problem::Hjb);
        config.width_multiplier = 0;
        assert!(config.validate().is_err());

        let mut config = Config::for_problem(Problem::Hjb);
        config.num_hidden_layers = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_schedule() {
        assert!(LearningRateSchedule::new(vec![100], vec![1e-2]).is_err());
        assert!(LearningRateSchedule::new(vec![200, 100], vec![1e-2, 1e-3, 1e-4]).is_err());
        assert!(LearningRateSchedule::new(vec![100], vec![1e-2, -1e-3]).is_err());
    }

    #[test]
    fn test_schedule_boundaries() {
        let schedule = LearningRateSchedule::new(vec![10, 20], vec![1.0, 0.5, 0.25]).unwrap();
        assert_eq!(schedule.value_at(0), 1.0);
        assert_eq!(schedule.value_at(10), 1.0);
        assert_eq!(schedule.value_at(11), 0.5);
        assert_eq!(schedule.value_at(20), 0.5);
        assert_eq!(schedule.value_at(21), 0.25);
        assert_eq!(schedule.value_at(10_000), 0.25);
    }

    #[test]
    fn test_expected_records() {
        let mut config = Config::for_problem(Problem::Hjb);
        config.num_iterations = 5;
        config.logging_frequency = 2;
        assert_eq!(config.expected_records(), 4);
        config.num_iterations = 0;
        assert_eq!(config.expected_records(), 1);
    }

    #[test]
    fn test_json_round_trip() {
        let mut config = Config::for_problem(Problem::PricingDefaultRisk);
        config.total_time = 0.1 + 0.2;
        config.lr_values = vec![1.0 / 3.0, 2.0f64.sqrt() * 1e-5];
        config.seed = Some(u64::MAX);

        let json = serde_json::to_string_pretty(&config).unwrap();
        let reloaded: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(reloaded, config);
        assert_eq!(reloaded.total_time.to_bits(), config.total_time.to_bits());
    }
}
