//! Run configuration and the logical control surface
//!
//! A `RunConfig` is built from defaults, optionally overlaid with a TOML
//! file, then overlaid again with command-line values. Validation happens
//! once, before any simulation starts.
//!
//! ```toml
//! [process]
//! lambda = 1.5
//! mu = 0.5
//!
//! [simulation]
//! sample_count = 20000
//! horizons = [10.0, 100.0, 1000.0, 10000.0]
//! seed = 42
//! method = "sum_of_exponentials"
//!
//! [limits]
//! max_expected_draws = 3.0e9
//! enforce_controls = true
//!
//! [display]
//! bins = 40
//! ```

use crate::histogram::{DEFAULT_BAR_WIDTH, DEFAULT_BINS, DEFAULT_TRIM_QUANTILE};
use crate::parallel::DEFAULT_CHUNK_SIZE;
pub use crate::DEFAULT_MAX_EXPECTED_DRAWS;
use crate::{
    ProcessParameters, SeverityMethod, SimulationError, SimulationRequest, REFERENCE_HORIZONS,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;


#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    Invalid(#[from] SimulationError),
}

/// One user-facing control: bounds, step and default
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ControlRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub default: f64,
}

impl ControlRange {
    pub const fn new(min: f64, max: f64, step: f64, default: f64) -> Self {
        ControlRange {
            min,
            max,
            step,
            default,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Reject values outside the control bounds (never clamps)
    pub fn check(&self, name: &'static str, value: f64) -> Result<f64, SimulationError> {
        if !self.contains(value) {
            return Err(SimulationError::invalid(
                name,
                value,
                format!("outside control range [{}, {}]", self.min, self.max),
            ));
        }
        Ok(value)
    }

    /// Every stepped value from min to max inclusive
    pub fn grid(&self) -> Vec<f64> {
        let steps = ((self.max - self.min) / self.step).round() as usize;
        let decimals = (-self.step.log10()).ceil().max(0.0) as i32;
        let scale = 10f64.powi(decimals);
        (0..=steps)
            .map(|i| ((self.min + i as f64 * self.step) * scale).round() / scale)
            .collect()
    }
}

/// Ranges of the three inputs a user can adjust before triggering a run
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ControlSurface {
    pub lambda: ControlRange,
    pub mu: ControlRange,
    pub sample_count: ControlRange,
}

impl ControlSurface {
    pub const fn standard() -> Self {
        ControlSurface {
            lambda: ControlRange::new(0.1, 5.0, 0.1, 1.0),
            mu: ControlRange::new(0.1, 5.0, 0.1, 1.0),
            sample_count: ControlRange::new(1000.0, 50000.0, 1000.0, 10000.0),
        }
    }

    pub fn check(
        &self,
        params: &ProcessParameters,
        sample_count: usize,
    ) -> Result<(), SimulationError> {
        self.lambda.check("lambda", params.lambda)?;
        self.mu.check("mu", params.mu)?;
        self.sample_count
            .check("sample_count", sample_count as f64)?;
        Ok(())
    }
}

impl Default for ControlSurface {
    fn default() -> Self {
        ControlSurface::standard()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    pub sample_count: usize,
    pub horizons: Vec<f64>,
    /// Base seed for the run; drawn from entropy if absent
    pub seed: Option<u64>,
    pub method: SeverityMethod,
    pub parallel: bool,
    pub threads: Option<usize>,
    pub chunk_size: usize,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        SimulationSettings {
            sample_count: ControlSurface::standard().sample_count.default as usize,
            horizons: REFERENCE_HORIZONS.to_vec(),
            seed: None,
            method: SeverityMethod::default(),
            parallel: false,
            threads: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub max_expected_draws: f64,
    /// Hold λ, μ and sample_count to the control surface ranges
    pub enforce_controls: bool,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_expected_draws: DEFAULT_MAX_EXPECTED_DRAWS,
            enforce_controls: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    pub bins: usize,
    pub trim_quantile: f64,
    pub bar_width: usize,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        DisplaySettings {
            bins: DEFAULT_BINS,
            trim_quantile: DEFAULT_TRIM_QUANTILE,
            bar_width: DEFAULT_BAR_WIDTH,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub process: ProcessParameters,
    pub simulation: SimulationSettings,
    pub limits: Limits,
    pub display: DisplaySettings,
}

impl RunConfig {
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

    /// One engine request per configured horizon, in order
    pub fn requests(&self) -> Result<Vec<SimulationRequest>, SimulationError> {
        self.simulation
            .horizons
            .iter()
            .map(|&t| SimulationRequest::new(t, self.process, self.simulation.sample_count))
            .collect()
    }

    /// Check everything a run needs before the first draw
    pub fn validate(&self) -> Result<(), SimulationError> {
        self.process.validate()?;

        if self.simulation.horizons.is_empty() {
            return Err(SimulationError::invalid(
                "horizons",
                0.0,
                "at least one time horizon is required",
            ));
        }
        if let Some(threads) = self.simulation.threads {
            if threads == 0 {
                return Err(SimulationError::invalid("threads", 0.0, "must be >= 1"));
            }
        }
        if self.display.bins == 0 {
            return Err(SimulationError::invalid("bins", 0.0, "must be >= 1"));
        }
        let q = self.display.trim_quantile;
        if !(q > 0.0 && q <= 1.0) {
            return Err(SimulationError::invalid(
                "trim_quantile",
                q,
                "must lie in (0, 1]",
            ));
        }

        if self.limits.enforce_controls {
            ControlSurface::standard().check(&self.process, self.simulation.sample_count)?;
        }

        for request in self.requests()? {
            request.check_cost(self.simulation.method, self.limits.max_expected_draws)?;
        }
        Ok(())
    }
}
