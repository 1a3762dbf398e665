//! Closed-form compound Poisson reference values
//!
//! For S(t) = X_1 + ... + X_N(t) with N(t) ~ Poisson(λt), X_i ~ Exp(μ):
//! - E[S(t)] = E[N(t)]·E[X] = λt/μ
//! - Var[S(t)] = E[N(t)]·E[X²] = λt·2/μ²
//! - P(S(t) = 0) = P(N(t) = 0) = exp(-λt)

use crate::error::require_positive;
use crate::{ProcessParameters, SimulationError, TheoreticalMoments};

/// Theoretical mean and variance of S(t)
pub fn theoretical_moments(
    time_horizon: f64,
    lambda: f64,
    mu: f64,
) -> Result<TheoreticalMoments, SimulationError> {
    require_positive("time_horizon", time_horizon)?;
    let params = ProcessParameters::new(lambda, mu)?;
    Ok(moments_for(time_horizon, &params))
}

/// Moments for already-validated parameters
pub fn moments_for(time_horizon: f64, params: &ProcessParameters) -> TheoreticalMoments {
    let expected_claims = params.lambda * time_horizon;
    TheoreticalMoments {
        mean: expected_claims / params.mu,
        variance: 2.0 * expected_claims / (params.mu * params.mu),
    }
}

/// Expected number of claims by time t
pub fn expected_claim_count(time_horizon: f64, lambda: f64) -> f64 {
    lambda * time_horizon
}

/// Probability that no claim arrives by time t
pub fn theoretical_zero_probability(time_horizon: f64, lambda: f64) -> f64 {
    (-expected_claim_count(time_horizon, lambda)).exp()
}
