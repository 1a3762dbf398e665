//! One explicit "run": every configured horizon, simulated in order
//!
//! The whole configuration is validated first, so a run either returns a
//! complete report or an error. Nothing partial is ever produced.

use crate::config::RunConfig;
use crate::engine::{simulate_seeded_within, ParallelSimulation};
use crate::histogram::Histogram;
use crate::moments::{moments_for, theoretical_zero_probability};
use crate::stats::{standard_error, summarize};
use crate::{
    ProcessParameters, SeverityMethod, SimulationError, SimulationRequest, SummaryStatistics,
    TheoreticalMoments,
};
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, info, trace};

/// Horizon `i` is seeded with `base + (i << 32)`, keeping its chunk seeds
/// clear of every other horizon's.
pub fn horizon_seed(base_seed: u64, index: usize) -> u64 {
    base_seed.wrapping_add((index as u64) << 32)
}

#[derive(Debug, Clone, Serialize)]
pub struct HorizonReport {
    pub time_horizon: f64,
    pub seed: u64,
    pub moments: TheoreticalMoments,
    pub theoretical_zero_probability: f64,
    pub summary: SummaryStatistics,
    pub standard_error: f64,
    pub histogram: Histogram,
    #[serde(skip)]
    pub samples: Vec<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub parameters: ProcessParameters,
    pub sample_count: usize,
    pub method: SeverityMethod,
    pub base_seed: u64,
    pub horizons: Vec<HorizonReport>,
}

impl RunReport {
    pub fn summaries(&self) -> impl Iterator<Item = (f64, &SummaryStatistics)> {
        self.horizons.iter().map(|h| (h.time_horizon, &h.summary))
    }
}

fn sample_horizon(
    config: &RunConfig,
    request: &SimulationRequest,
    seed: u64,
) -> Result<Vec<f64>, SimulationError> {
    let settings = &config.simulation;
    let limit = config.limits.max_expected_draws;
    if !settings.parallel {
        return simulate_seeded_within(request, settings.method, seed, limit);
    }

    let time_horizon = request.time_horizon;
    let mut builder = ParallelSimulation::new(*request, seed)
        .method(settings.method)
        .chunk_size(settings.chunk_size)
        .max_expected_draws(limit)
        .progress(move |done, total| {
            trace!(time_horizon, done, total, "chunk complete");
        });
    if let Some(threads) = settings.threads {
        builder = builder.num_threads(threads);
    }
    builder.run()
}

/// Execute a validated run across all configured horizons
pub fn execute(config: &RunConfig) -> Result<RunReport, SimulationError> {
    config.validate()?;

    let base_seed = config.simulation.seed.unwrap_or_else(rand::random);
    let requests = config.requests()?;
    info!(
        lambda = config.process.lambda,
        mu = config.process.mu,
        sample_count = config.simulation.sample_count,
        horizons = requests.len(),
        base_seed,
        "starting run"
    );

    let mut horizons = Vec::with_capacity(requests.len());
    for (index, request) in requests.iter().enumerate() {
        let started = Instant::now();
        let seed = horizon_seed(base_seed, index);
        let samples = sample_horizon(config, request, seed)?;

        let moments = moments_for(request.time_horizon, &config.process);
        let summary = summarize(&samples, &moments)?;
        let histogram = Histogram::from_sample(
            &samples,
            config.display.bins,
            config.display.trim_quantile,
            moments.mean,
        )?;

        debug!(
            time_horizon = request.time_horizon,
            simulated_mean = summary.simulated_mean,
            theoretical_mean = moments.mean,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "horizon complete"
        );

        horizons.push(HorizonReport {
            time_horizon: request.time_horizon,
            seed,
            moments,
            theoretical_zero_probability: theoretical_zero_probability(
                request.time_horizon,
                config.process.lambda,
            ),
            standard_error: standard_error(&samples),
            summary,
            histogram,
            samples,
        });
    }

    info!(horizons = horizons.len(), "run complete");
    Ok(RunReport {
        parameters: config.process,
        sample_count: config.simulation.sample_count,
        method: config.simulation.method,
        base_seed,
        horizons,
    })
}
