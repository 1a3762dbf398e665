//! Compound Poisson Aggregate Claims Explorer
//!
//! Monte Carlo estimation of the aggregate claims distribution S(t) where:
//! - Claim arrivals follow a Poisson process with rate λ
//! - Individual claim sizes are Exponential with rate μ (mean 1/μ)
//!
//! Simulated distributions at fixed horizons are compared against the
//! closed-form compound Poisson moments:
//! - E[S(t)] = λt/μ
//! - Var[S(t)] = 2λt/μ²
//! - P(S(t) = 0) = exp(-λt)
//!
//! Modules:
//! - engine: per-trial sampling of S(t), sequential and chunk-parallel
//! - moments: closed-form reference values
//! - stats: empirical summaries of a sample
//! - histogram: display-only trimmed binning
//! - run / sweep: orchestration across horizons and parameter values
//! - report / output: terminal rendering and CSV/JSON export

pub mod config;
pub mod engine;
pub mod error;
pub mod histogram;
pub mod logging;
pub mod moments;
pub mod output;
pub mod parallel;
pub mod report;
pub mod run;
pub mod stats;
pub mod sweep;

pub use engine::{simulate, simulate_parallel, simulate_seeded, AggregateClaimSimulator};
pub use error::SimulationError;
pub use moments::theoretical_moments;
pub use stats::summarize;

use error::require_positive;
use serde::{Deserialize, Serialize};

/// Reference horizons at which S(t) is examined
pub const REFERENCE_HORIZONS: [f64; 4] = [10.0, 100.0, 1000.0, 10000.0];

/// Covers the full control surface (λ = 5, t = 10000, n = 50000) with headroom
pub const DEFAULT_MAX_EXPECTED_DRAWS: f64 = 3.0e9;

/// Poisson process rate and exponential claim-size rate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessParameters {
    pub lambda: f64, // λ - claim arrival rate
    pub mu: f64,     // μ - claim size rate (mean claim = 1/μ)
}

impl ProcessParameters {
    pub fn new(lambda: f64, mu: f64) -> Result<Self, SimulationError> {
        let params = ProcessParameters { lambda, mu };
        params.validate()?;
        Ok(params)
    }

    /// Both rates must be finite and strictly positive
    pub fn validate(&self) -> Result<(), SimulationError> {
        require_positive("lambda", self.lambda)?;
        require_positive("mu", self.mu)?;
        Ok(())
    }

    /// Mean claim size 1/μ
    pub fn mean_claim(&self) -> f64 {
        1.0 / self.mu
    }
}

impl Default for ProcessParameters {
    fn default() -> Self {
        let controls = config::ControlSurface::standard();
        ProcessParameters {
            lambda: controls.lambda.default,
            mu: controls.mu.default,
        }
    }
}

/// How the total of k claim sizes is drawn once the claim count is known
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeverityMethod {
    /// Draw k Exponential(μ) claims and add them up
    #[default]
    SumOfExponentials,
    /// Draw the total directly from Gamma(k, 1/μ), identical in distribution
    GammaShortcut,
}

impl SeverityMethod {
    /// Expected random draws per trial (count draw plus severity draws)
    pub fn draws_per_trial(&self, expected_claims: f64) -> f64 {
        match self {
            SeverityMethod::SumOfExponentials => 1.0 + expected_claims,
            SeverityMethod::GammaShortcut => 2.0,
        }
    }
}

/// One request to the simulation engine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationRequest {
    pub time_horizon: f64,
    pub parameters: ProcessParameters,
    pub sample_count: usize,
}

impl SimulationRequest {
    pub fn new(
        time_horizon: f64,
        parameters: ProcessParameters,
        sample_count: usize,
    ) -> Result<Self, SimulationError> {
        let request = SimulationRequest {
            time_horizon,
            parameters,
            sample_count,
        };
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        require_positive("time_horizon", self.time_horizon)?;
        self.parameters.validate()?;
        if self.sample_count < 1 {
            return Err(SimulationError::invalid(
                "sample_count",
                self.sample_count as f64,
                "must be >= 1",
            ));
        }
        Ok(())
    }

    /// Mean of the Poisson claim count, λt
    pub fn expected_claims(&self) -> f64 {
        self.parameters.lambda * self.time_horizon
    }

    /// Expected total number of random draws to serve this request
    pub fn expected_draws(&self, method: SeverityMethod) -> f64 {
        self.sample_count as f64 * method.draws_per_trial(self.expected_claims())
    }

    /// Validate and reject requests whose expected cost exceeds `limit`
    pub fn check_cost(&self, method: SeverityMethod, limit: f64) -> Result<(), SimulationError> {
        self.validate()?;
        let expected_draws = self.expected_draws(method);
        if expected_draws > limit {
            return Err(SimulationError::ExcessiveCost {
                expected_draws,
                limit,
            });
        }
        Ok(())
    }
}

/// Closed-form moments of S(t)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TheoreticalMoments {
    pub mean: f64,
    pub variance: f64,
}

impl TheoreticalMoments {
    pub fn std_dev(&self) -> f64 {
        self.variance.sqrt()
    }
}

/// Theoretical vs simulated statistics for one horizon
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryStatistics {
    pub theoretical_mean: f64,
    pub simulated_mean: f64,
    pub theoretical_variance: f64,
    /// Unbiased (n-1) estimator; NaN for a single-value sample
    pub simulated_variance: f64,
    /// Fraction of samples exactly equal to zero
    pub zero_probability: f64,
    pub sample_count: usize,
}

impl SummaryStatistics {
    /// Relative error of the simulated mean against theory
    pub fn mean_relative_error(&self) -> f64 {
        if self.theoretical_mean.abs() < 1e-12 {
            return self.simulated_mean.abs();
        }
        (self.simulated_mean - self.theoretical_mean).abs() / self.theoretical_mean
    }

    /// Relative error of the simulated variance against theory
    pub fn variance_relative_error(&self) -> f64 {
        if self.theoretical_variance.abs() < 1e-12 {
            return self.simulated_variance.abs();
        }
        (self.simulated_variance - self.theoretical_variance).abs() / self.theoretical_variance
    }
}
