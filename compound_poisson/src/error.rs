//! Error taxonomy for the simulation core
//!
//! Every variant is raised before the first random draw of a run, except
//! `Distribution`, which wraps sampler construction failures.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    /// A parameter failed validation (non-positive, non-finite, out of range)
    #[error("invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: String,
    },

    /// The request would need more random draws than the configured limit
    #[error("run rejected: {expected_draws:.3e} expected draws exceeds limit of {limit:.3e}")]
    ExcessiveCost { expected_draws: f64, limit: f64 },

    #[error("distribution construction failed: {0}")]
    Distribution(String),

    #[error("cannot summarize an empty sample")]
    EmptySample,

    #[error("failed to build thread pool: {0}")]
    ThreadPool(String),
}

impl SimulationError {
    pub(crate) fn invalid(name: &'static str, value: f64, reason: impl Into<String>) -> Self {
        SimulationError::InvalidParameter {
            name,
            value,
            reason: reason.into(),
        }
    }
}

/// Reject anything that is not a finite, strictly positive real
pub(crate) fn require_positive(name: &'static str, value: f64) -> Result<f64, SimulationError> {
    if !value.is_finite() {
        return Err(SimulationError::invalid(name, value, "must be finite"));
    }
    if value <= 0.0 {
        return Err(SimulationError::invalid(name, value, "must be > 0"));
    }
    Ok(value)
}
