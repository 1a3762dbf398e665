//! Aggregate claims simulation engine
//!
//! Each trial draws S(t):
//! 1. Claim count N ~ Poisson(λt)
//! 2. N = 0 gives exactly 0.0 (the point mass at zero)
//! 3. Otherwise the sum of N Exponential(μ) claim sizes
//!
//! Trials are independent. The sequential and chunk-parallel paths share
//! the same `TrialSampler`.

use crate::{
    ProcessParameters, SeverityMethod, SimulationError, SimulationRequest,
    DEFAULT_MAX_EXPECTED_DRAWS,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Exp, Gamma, Poisson};
use tracing::{debug, trace};

pub use crate::parallel::{simulate_parallel, ParallelSimulation};

/// Distributions for one (t, λ, μ) combination, shareable across threads
pub(crate) struct TrialSampler {
    /// `None` when λt underflows to zero: every trial then has no claims
    claim_count: Option<Poisson<f64>>,
    claim_size: Exp<f64>,
    claim_scale: f64,
    method: SeverityMethod,
}

impl TrialSampler {
    pub(crate) fn new(
        request: &SimulationRequest,
        method: SeverityMethod,
    ) -> Result<Self, SimulationError> {
        let mean_claims = request.expected_claims();
        if !mean_claims.is_finite() {
            return Err(SimulationError::Distribution(format!(
                "Poisson mean λt overflowed: {mean_claims}"
            )));
        }
        let claim_count = if mean_claims > 0.0 {
            Some(Poisson::new(mean_claims).map_err(|e| {
                SimulationError::Distribution(format!("Poisson(mean = {mean_claims}): {e}"))
            })?)
        } else {
            None
        };

        // Exp is parameterised by rate, so mean claim = 1/μ
        let mu = request.parameters.mu;
        let claim_size = Exp::new(mu)
            .map_err(|e| SimulationError::Distribution(format!("Exp(rate = {mu}): {e}")))?;

        Ok(TrialSampler {
            claim_count,
            claim_size,
            claim_scale: 1.0 / mu,
            method,
        })
    }

    /// Draw one S(t), returning (aggregate, claim count)
    pub(crate) fn sample_trial<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<(f64, u64), SimulationError> {
        let claims = match &self.claim_count {
            Some(poisson) => {
                let count: f64 = poisson.sample(rng);
                count as u64
            }
            None => 0,
        };
        if claims == 0 {
            return Ok((0.0, 0));
        }

        let total = match self.method {
            SeverityMethod::SumOfExponentials => {
                (0..claims).map(|_| self.claim_size.sample(rng)).sum()
            }
            SeverityMethod::GammaShortcut => {
                let gamma = Gamma::new(claims as f64, self.claim_scale).map_err(|e| {
                    SimulationError::Distribution(format!(
                        "Gamma(shape = {claims}, scale = {}): {e}",
                        self.claim_scale
                    ))
                })?;
                gamma.sample(rng)
            }
        };

        Ok((total, claims))
    }

    /// Fill `len` trials from `rng`
    pub(crate) fn sample_many<R: Rng + ?Sized>(
        &self,
        len: usize,
        rng: &mut R,
    ) -> Result<Vec<f64>, SimulationError> {
        (0..len)
            .map(|_| self.sample_trial(rng).map(|(value, _)| value))
            .collect()
    }
}

/// Seeded simulator that tracks what it has drawn
///
/// Draws are reproducible for a given seed: two simulators built with
/// the same seed and parameters yield identical samples.
pub struct AggregateClaimSimulator {
    params: ProcessParameters,
    method: SeverityMethod,
    rng: StdRng,
    max_expected_draws: f64,
    total_trials: usize,
    total_claims_drawn: u64,
    zero_trials: usize,
}

impl AggregateClaimSimulator {
    pub fn new(params: ProcessParameters, seed: u64) -> Result<Self, SimulationError> {
        params.validate()?;
        debug!(lambda = params.lambda, mu = params.mu, seed, "creating simulator");
        Ok(AggregateClaimSimulator {
            params,
            method: SeverityMethod::default(),
            rng: StdRng::seed_from_u64(seed),
            max_expected_draws: DEFAULT_MAX_EXPECTED_DRAWS,
            total_trials: 0,
            total_claims_drawn: 0,
            zero_trials: 0,
        })
    }

    pub fn with_method(mut self, method: SeverityMethod) -> Self {
        self.method = method;
        self
    }

    /// Reject any call whose expected draws exceed `limit`
    pub fn with_max_expected_draws(mut self, limit: f64) -> Self {
        self.max_expected_draws = limit;
        self
    }

    /// Draw `sample_count` independent realizations of S(time_horizon)
    pub fn simulate(
        &mut self,
        time_horizon: f64,
        sample_count: usize,
    ) -> Result<Vec<f64>, SimulationError> {
        let request = SimulationRequest::new(time_horizon, self.params, sample_count)?;
        request.check_cost(self.method, self.max_expected_draws)?;
        let sampler = TrialSampler::new(&request, self.method)?;

        let mut values = Vec::with_capacity(sample_count);
        for _ in 0..sample_count {
            let (value, claims) = sampler.sample_trial(&mut self.rng)?;
            self.total_trials += 1;
            self.total_claims_drawn += claims;
            if claims == 0 {
                self.zero_trials += 1;
            }
            values.push(value);
        }

        trace!(
            time_horizon,
            sample_count,
            total_trials = self.total_trials,
            "simulated horizon"
        );
        Ok(values)
    }

    pub fn total_trials(&self) -> usize {
        self.total_trials
    }

    pub fn total_claims_drawn(&self) -> u64 {
        self.total_claims_drawn
    }

    pub fn zero_trials(&self) -> usize {
        self.zero_trials
    }
}

/// Simulate with any RNG, rejecting requests above `max_expected_draws`
pub fn simulate_with_rng<R: Rng + ?Sized>(
    request: &SimulationRequest,
    method: SeverityMethod,
    max_expected_draws: f64,
    rng: &mut R,
) -> Result<Vec<f64>, SimulationError> {
    request.check_cost(method, max_expected_draws)?;
    let sampler = TrialSampler::new(request, method)?;
    sampler.sample_many(request.sample_count, rng)
}

/// Reproducible simulation from a fixed seed under the default cost limit
pub fn simulate_seeded(
    request: &SimulationRequest,
    method: SeverityMethod,
    seed: u64,
) -> Result<Vec<f64>, SimulationError> {
    simulate_seeded_within(request, method, seed, DEFAULT_MAX_EXPECTED_DRAWS)
}

pub fn simulate_seeded_within(
    request: &SimulationRequest,
    method: SeverityMethod,
    seed: u64,
    max_expected_draws: f64,
) -> Result<Vec<f64>, SimulationError> {
    let mut rng = StdRng::seed_from_u64(seed);
    simulate_with_rng(request, method, max_expected_draws, &mut rng)
}

/// Unseeded simulation: every call draws fresh entropy
pub fn simulate(
    time_horizon: f64,
    lambda: f64,
    mu: f64,
    sample_count: usize,
) -> Result<Vec<f64>, SimulationError> {
    let params = ProcessParameters::new(lambda, mu)?;
    let request = SimulationRequest::new(time_horizon, params, sample_count)?;
    let mut rng = rand::rng();
    simulate_with_rng(
        &request,
        SeverityMethod::default(),
        DEFAULT_MAX_EXPECTED_DRAWS,
        &mut rng,
    )
}
