//! Compound Poisson Aggregate Claims Explorer - interactive run
//!
//! One invocation is one "run": simulate S(t) at each horizon, then print
//! the theoretical results, parameter notes, histograms and the
//! statistics table.

use clap::{Parser, ValueEnum};
use compound_poisson::config::RunConfig;
use compound_poisson::output::RunOutput;
use compound_poisson::{logging, report, run, SeverityMethod};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum MethodArg {
    /// Sum k exponential claim sizes per trial
    Exact,
    /// Draw the k-claim total from Gamma(k, 1/μ)
    Gamma,
}

impl From<MethodArg> for SeverityMethod {
    fn from(arg: MethodArg) -> Self {
        match arg {
            MethodArg::Exact => SeverityMethod::SumOfExponentials,
            MethodArg::Gamma => SeverityMethod::GammaShortcut,
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "compound_poisson",
    version,
    about = "Monte Carlo explorer for compound Poisson aggregate claims"
)]
struct Cli {
    /// TOML configuration file (command-line values override it)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Claim arrival rate λ
    #[arg(short, long)]
    lambda: Option<f64>,

    /// Claim size rate μ (mean claim 1/μ)
    #[arg(short, long)]
    mu: Option<f64>,

    /// Number of simulations per horizon
    #[arg(short = 'n', long)]
    simulations: Option<usize>,

    /// Comma-separated time horizons
    #[arg(long, value_delimiter = ',')]
    horizons: Option<Vec<f64>>,

    /// Base seed for reproducible runs
    #[arg(short, long)]
    seed: Option<u64>,

    #[arg(long, value_enum)]
    method: Option<MethodArg>,

    /// Split trials across a rayon thread pool
    #[arg(long)]
    parallel: bool,

    #[arg(long)]
    threads: Option<usize>,

    /// Histogram bins per horizon
    #[arg(long)]
    bins: Option<usize>,

    /// Write statistics.csv and summary.json here
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Also write every simulated value to samples.csv
    #[arg(long, requires = "output_dir")]
    save_samples: bool,

    /// Allow values outside the standard control ranges
    #[arg(long)]
    unbounded: bool,

    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn apply(&self, config: &mut RunConfig) {
        if let Some(lambda) = self.lambda {
            config.process.lambda = lambda;
        }
        if let Some(mu) = self.mu {
            config.process.mu = mu;
        }
        if let Some(n) = self.simulations {
            config.simulation.sample_count = n;
        }
        if let Some(horizons) = &self.horizons {
            config.simulation.horizons = horizons.clone();
        }
        if self.seed.is_some() {
            config.simulation.seed = self.seed;
        }
        if let Some(method) = self.method {
            config.simulation.method = method.into();
        }
        if self.parallel || self.threads.is_some() {
            config.simulation.parallel = true;
        }
        if self.threads.is_some() {
            config.simulation.threads = self.threads;
        }
        if let Some(bins) = self.bins {
            config.display.bins = bins;
        }
        if self.unbounded {
            config.limits.enforce_controls = false;
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => match RunConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                error!("{e}");
                eprintln!("Error: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => RunConfig::default(),
    };
    cli.apply(&mut config);

    let report = match run::execute(&config) {
        Ok(report) => report,
        Err(e) => {
            error!("{e}");
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    println!("=== Compound Poisson Aggregate Claims ===\n");
    println!("{}", report::render(&report, config.display.bar_width));
    println!("Base seed: {}", report.base_seed);

    if let Some(dir) = &cli.output_dir {
        let output = RunOutput::from_report(&report);
        if let Err(e) = output.write_all(&report, dir, cli.save_samples) {
            eprintln!("Error writing output to {}: {e}", dir.display());
            return ExitCode::FAILURE;
        }
        info!(dir = %dir.display(), "wrote run output");
        println!("Results written to {}", dir.display());
    }

    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::parse_from([
            "compound_poisson",
            "--lambda",
            "2.5",
            "-n",
            "20000",
            "--horizons",
            "1,2,3",
            "--method",
            "gamma",
            "--threads",
            "3",
            "--unbounded",
        ]);
        let mut config = RunConfig::default();
        cli.apply(&mut config);

        assert_eq!(config.process.lambda, 2.5);
        assert_eq!(config.process.mu, 1.0);
        assert_eq!(config.simulation.sample_count, 20000);
        assert_eq!(config.simulation.horizons, vec![1.0, 2.0, 3.0]);
        assert_eq!(config.simulation.method, SeverityMethod::GammaShortcut);
        assert!(config.simulation.parallel);
        assert_eq!(config.simulation.threads, Some(3));
        assert!(!config.limits.enforce_controls);
    }

    #[test]
    fn test_no_flags_keeps_defaults() {
        let cli = Cli::parse_from(["compound_poisson"]);
        let mut config = RunConfig::default();
        cli.apply(&mut config);
        assert_eq!(config, RunConfig::default());
    }

    #[test]
    fn test_save_samples_requires_output_dir() {
        assert!(Cli::try_parse_from(["compound_poisson", "--save-samples"]).is_err());
    }
}
