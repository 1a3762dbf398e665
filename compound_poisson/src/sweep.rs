//! Parameter sweeps: one full run per value of λ or μ
//!
//! Shows how each rate moves the distribution of S(t). λ scales the mean
//! and variance linearly. μ divides the mean by μ and the variance by μ².

use crate::config::{ConfigError, ControlSurface, Limits, RunConfig, SimulationSettings};
use crate::run::{execute, RunReport};
use crate::{ProcessParameters, SeverityMethod, SimulationError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SweepParameter {
    Lambda,
    Mu,
}

impl SweepParameter {
    pub fn name(&self) -> &'static str {
        match self {
            SweepParameter::Lambda => "lambda",
            SweepParameter::Mu => "mu",
        }
    }

    pub fn apply(&self, params: &mut ProcessParameters, value: f64) {
        match self {
            SweepParameter::Lambda => params.lambda = value,
            SweepParameter::Mu => params.mu = value,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExperimentMetadata {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub base_seed: u64,
    #[serde(default = "default_sample_count")]
    pub sample_count: usize,
    #[serde(default = "default_horizons")]
    pub horizons: Vec<f64>,
    #[serde(default)]
    pub method: SeverityMethod,
    #[serde(default)]
    pub parallel: bool,
}

fn default_sample_count() -> usize {
    SimulationSettings::default().sample_count
}

fn default_horizons() -> Vec<f64> {
    SimulationSettings::default().horizons
}

#[derive(Debug, Clone, Deserialize)]
pub struct SweepConfig {
    pub parameter: SweepParameter,
    /// Defaults to every stepped value of the parameter's control range
    pub values: Option<Vec<f64>>,
}

/// Top-level experiment file
#[derive(Debug, Clone, Deserialize)]
pub struct ExperimentConfig {
    pub experiment: ExperimentMetadata,
    #[serde(default)]
    pub process: ProcessParameters,
    pub sweep: SweepConfig,
    #[serde(default)]
    pub limits: Limits,
}

impl ExperimentConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn sweep_values(&self) -> Vec<f64> {
        match &self.sweep.values {
            Some(values) => values.clone(),
            None => {
                let controls = ControlSurface::standard();
                match self.sweep.parameter {
                    SweepParameter::Lambda => controls.lambda.grid(),
                    SweepParameter::Mu => controls.mu.grid(),
                }
            }
        }
    }

    /// Run configuration for the `index`-th sweep value
    pub fn run_config_for(&self, index: usize, value: f64) -> RunConfig {
        let mut process = self.process;
        self.sweep.parameter.apply(&mut process, value);

        let meta = &self.experiment;
        RunConfig {
            process,
            simulation: SimulationSettings {
                sample_count: meta.sample_count,
                horizons: meta.horizons.clone(),
                seed: Some(meta.base_seed.wrapping_add((index as u64) << 48)),
                method: meta.method,
                parallel: meta.parallel,
                ..SimulationSettings::default()
            },
            limits: self.limits.clone(),
            ..RunConfig::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct SweepPoint {
    pub value: f64,
    pub report: RunReport,
}

/// One CSV row per (sweep value, horizon)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepRow {
    pub parameter: &'static str,
    pub value: f64,
    #[serde(rename = "Time")]
    pub time: f64,
    #[serde(rename = "Theoretical_Mean")]
    pub theoretical_mean: f64,
    #[serde(rename = "Simulated_Mean")]
    pub simulated_mean: f64,
    #[serde(rename = "Theoretical_Variance")]
    pub theoretical_variance: f64,
    #[serde(rename = "Simulated_Variance")]
    pub simulated_variance: f64,
    #[serde(rename = "P(S(t)=0)")]
    pub zero_probability: f64,
}

/// Validate every sweep point, then run them in order
pub fn run_sweep(experiment: &ExperimentConfig) -> Result<Vec<SweepPoint>, SimulationError> {
    let values = experiment.sweep_values();
    if values.is_empty() {
        return Err(SimulationError::invalid(
            "sweep.values",
            0.0,
            "at least one sweep value is required",
        ));
    }

    let configs: Vec<RunConfig> = values
        .iter()
        .enumerate()
        .map(|(i, &v)| experiment.run_config_for(i, v))
        .collect();
    for config in &configs {
        config.validate()?;
    }

    let mut points = Vec::with_capacity(configs.len());
    for (i, (value, config)) in values.iter().zip(configs.iter()).enumerate() {
        info!(
            parameter = experiment.sweep.parameter.name(),
            value,
            point = i + 1,
            total = configs.len(),
            "sweep point"
        );
        points.push(SweepPoint {
            value: *value,
            report: execute(config)?,
        });
    }
    Ok(points)
}

pub fn sweep_rows(parameter: SweepParameter, points: &[SweepPoint]) -> Vec<SweepRow> {
    points
        .iter()
        .flat_map(|point| {
            point.report.summaries().map(move |(time, s)| SweepRow {
                parameter: parameter.name(),
                value: point.value,
                time,
                theoretical_mean: s.theoretical_mean,
                simulated_mean: s.simulated_mean,
                theoretical_variance: s.theoretical_variance,
                simulated_variance: s.simulated_variance,
                zero_probability: s.zero_probability,
            })
        })
        .collect()
}
