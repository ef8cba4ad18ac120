// src/error.rs
use thiserror::Error;

/// Error types for the deep-bsde solver
#[derive(Debug, Error)]
pub enum BsdeError {
    /// Invalid parameter values
    #[error("Invalid parameter '{parameter}' = {value}: {constraint}")]
    InvalidParameters {
        parameter: String,
        value: f64,
        constraint: String,
    },

    /// Invalid configuration
    #[error("Invalid configuration for '{field}': {reason}")]
    InvalidConfiguration { field: String, reason: String },

    /// Problem name that has no equation behind it
    #[error("Unknown equation '{name}'")]
    UnknownEquation { name: String },

    /// Array shapes that do not line up
    #[error("Shape mismatch in {context}: expected {expected}, found {found}")]
    ShapeMismatch {
        context: String,
        expected: String,
        found: String,
    },

    /// Loss turned NaN or infinite
    #[error("Numerical divergence at step {step} during {phase}: loss = {loss}")]
    NumericalDivergence {
        step: usize,
        phase: String,
        loss: f64,
    },

    /// Filesystem error while writing run artifacts
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Config (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for deep-bsde operations
pub type BsdeResult<T> = Result<T, BsdeError>;

/// Validation utilities
pub mod validation {
    use super::{BsdeError, BsdeResult};

    /// Validate that a parameter is positive
    pub fn validate_positive(name: &str, value: f64) -> BsdeResult<()> {
        if value > 0.0 && value.is_finite() {
            Ok(())
        } else {
            Err(BsdeError::InvalidParameters {
                parameter: name.to_string(),
                value,
                constraint: "must be positive and finite (> 0)".to_string(),
            })
        }
    }

    /// Validate that a value is finite and not NaN
    pub fn validate_finite(name: &str, value: f64) -> BsdeResult<()> {
        if !value.is_finite() {
            Err(BsdeError::InvalidParameters {
                parameter: name.to_string(),
                value,
                constraint: "must be finite (not NaN or infinite)".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate that a parameter is within a range
    pub fn validate_range(name: &str, value: f64, min: f64, max: f64) -> BsdeResult<()> {
        if !(min..=max).contains(&value) {
            Err(BsdeError::InvalidParameters {
                parameter: name.to_string(),
                value,
                constraint: format!("must be in range [{}, {}]", min, max),
            })
        } else {
            Ok(())
        }
    }

    /// Validate a sample or layer count
    pub fn validate_count(field: &str, count: usize) -> BsdeResult<()> {
        if count == 0 {
            Err(BsdeError::InvalidConfiguration {
                field: field.to_string(),
                reason: "must be greater than 0".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate time step count
    pub fn validate_steps(steps: usize) -> BsdeResult<()> {
        if steps == 0 {
            Err(BsdeError::InvalidConfiguration {
                field: "num_time_interval".to_string(),
                reason: "must be greater than 0".to_string(),
            })
        } else if steps > 100_000 {
            Err(BsdeError::InvalidConfiguration {
                field: "num_time_interval".to_string(),
                reason: "exceeds maximum allowed (100,000)".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::validation::*;
    use super::*;

    #[test]
    fn test_validate_positive() {
        assert!(validate_positive("total_time", 0.3).is_ok());
        assert!(validate_positive("total_time", 0.0).is_err());
        assert!(validate_positive("total_time", -1.0).is_err());
        assert!(validate_positive("total_time", f64::INFINITY).is_err());
    }

    #[test]
    fn test_validate_finite() {
        assert!(validate_finite("value", 1.0).is_ok());
        assert!(validate_finite("value", f64::NAN).is_err());
        assert!(validate_finite("value", f64::INFINITY).is_err());
        assert!(validate_finite("value", f64::NEG_INFINITY).is_err());
    }

    #[test]
    fn test_validate_counts() {
        assert!(validate_count("batch_size", 64).is_ok());
        assert!(validate_count("batch_size", 0).is_err());
        assert!(validate_steps(20).is_ok());
        assert!(validate_steps(0).is_err());
        assert!(validate_steps(100_001).is_err());
    }

    #[test]
    fn test_error_display() {
        let error = BsdeError::InvalidParameters {
            parameter: "delta_clip".to_string(),
            value: -0.5,
            constraint: "must be positive".to_string(),
        };

        let display = format!("{}", error);
        assert!(display.contains("delta_clip"));
        assert!(display.contains("-0.5"));
        assert!(display.contains("positive"));
    }

    #[test]
    fn test_divergence_display() {
        let error = BsdeError::NumericalDivergence {
            step: 17,
            phase: "training".to_string(),
            loss: f64::NAN,
        };

        let display = format!("{}", error);
        assert!(display.contains("step 17"));
        assert!(display.contains("training"));
        assert!(display.contains("NaN"));
    }
}
