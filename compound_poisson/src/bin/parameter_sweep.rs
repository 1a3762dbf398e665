//! Parameter Sweep Runner
//!
//! Runs one full set of horizons per value of λ or μ, as described by a
//! TOML experiment file, and writes a combined table.
//!
//! Usage:
//!   cargo run --release --bin parameter_sweep -- experiments/mu_sweep.toml

use clap::Parser;
use compound_poisson::logging;
use compound_poisson::output::write_sweep_csv;
use compound_poisson::sweep::{run_sweep, sweep_rows, ExperimentConfig, SweepRow};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

#[derive(Debug, Parser)]
#[command(name = "parameter_sweep", version, about = "Sweep λ or μ across full runs")]
struct Args {
    /// Experiment TOML file
    experiment: PathBuf,

    /// Base directory for results
    #[arg(long, default_value = "results")]
    results_dir: PathBuf,

    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn write_results(dir: &Path, rows: &[SweepRow]) -> Result<(), Box<dyn std::error::Error>> {
    fs::create_dir_all(dir)?;
    write_sweep_csv(rows, dir.join("sweep_summary.csv"))
}

fn main() -> ExitCode {
    let args = Args::parse();
    logging::init(args.verbose.max(1), false);

    println!("=== Compound Poisson Parameter Sweep ===\n");
    println!("Loading experiment config: {}\n", args.experiment.display());

    let experiment = match ExperimentConfig::load(&args.experiment) {
        Ok(experiment) => experiment,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let values = experiment.sweep_values();
    println!("Experiment: {}", experiment.experiment.name);
    if !experiment.experiment.description.is_empty() {
        println!("Description: {}", experiment.experiment.description);
    }
    println!(
        "Sweeping {} over {} values × {} horizons, {} simulations each\n",
        experiment.sweep.parameter.name(),
        values.len(),
        experiment.experiment.horizons.len(),
        experiment.experiment.sample_count
    );

    let start = Instant::now();
    let points = match run_sweep(&experiment) {
        Ok(points) => points,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };
    let rows = sweep_rows(experiment.sweep.parameter, &points);

    let output_dir = args.results_dir.join(&experiment.experiment.name);
    if let Err(e) = write_results(&output_dir, &rows) {
        eprintln!("Error writing results: {e}");
        return ExitCode::FAILURE;
    }

    println!(
        "{:>10} {:>10} {:>16} {:>16} {:>16} {:>16}",
        experiment.sweep.parameter.name(),
        "Time",
        "Theo_Mean",
        "Sim_Mean",
        "Theo_Var",
        "Sim_Var"
    );
    for row in &rows {
        println!(
            "{:>10.2} {:>10} {:>16.4} {:>16.4} {:>16.4} {:>16.4}",
            row.value,
            row.time,
            row.theoretical_mean,
            row.simulated_mean,
            row.theoretical_variance,
            row.simulated_variance
        );
    }

    println!(
        "\nCompleted {} runs in {:.1}s",
        points.len(),
        start.elapsed().as_secs_f64()
    );
    println!("Results written to {}", output_dir.display());
    ExitCode::SUCCESS
}
