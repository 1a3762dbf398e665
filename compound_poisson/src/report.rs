//! Terminal rendering of a run report

use crate::run::RunReport;
use std::fmt::Write;

/// How λ and μ move the distribution of S(t)
pub const PARAMETER_IMPACT: &str = "\
Parameter impact:
  λ (claim arrival rate): more claims per unit time. The mean λt/μ and the
    variance 2λt/μ² both grow linearly in λ, and the mass at zero, exp(-λt),
    vanishes quickly.
  μ (claim size rate): claims average 1/μ. Raising μ divides the mean by μ
    and the variance by μ², so the distribution tightens faster than it
    shifts.
  Number of simulations: more trials shrink the Monte Carlo error of the
    simulated moments roughly as 1/sqrt(n).";

const TABLE_HEADERS: [&str; 6] = [
    "Time",
    "Theoretical_Mean",
    "Simulated_Mean",
    "Theoretical_Variance",
    "Simulated_Variance",
    "P(S(t)=0)",
];

/// Theoretical mean and variance per horizon
pub fn theoretical_results_text(report: &RunReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Theoretical results (λ = {}, μ = {}):",
        report.parameters.lambda, report.parameters.mu
    );
    for h in &report.horizons {
        let _ = writeln!(
            out,
            "  t = {:<8} E[S(t)] = {:<14.4} Var[S(t)] = {:.4}",
            h.time_horizon, h.moments.mean, h.moments.variance
        );
    }
    out
}

/// One histogram per horizon, 99th-percentile trimmed
pub fn histograms_text(report: &RunReport, bar_width: usize) -> String {
    let mut out = String::new();
    for h in &report.horizons {
        let _ = writeln!(
            out,
            "\nDistribution of S(t) at t = {} (λ = {}, μ = {}, n = {})",
            h.time_horizon, report.parameters.lambda, report.parameters.mu, report.sample_count
        );
        out.push_str(&h.histogram.render(bar_width));
    }
    out
}

/// Statistics table, one row per horizon
pub fn statistics_table(report: &RunReport) -> String {
    let mut out = String::new();
    let header: Vec<String> = TABLE_HEADERS.iter().map(|h| format!("{h:>20}")).collect();
    let _ = writeln!(out, "{}", header.join(""));

    for h in &report.horizons {
        let s = &h.summary;
        let _ = writeln!(
            out,
            "{:>20}{:>20.4}{:>20.4}{:>20.4}{:>20.4}{:>20.4}",
            h.time_horizon,
            s.theoretical_mean,
            s.simulated_mean,
            s.theoretical_variance,
            s.simulated_variance,
            s.zero_probability
        );
    }
    out
}

/// Everything a run displays, in reading order
pub fn render(report: &RunReport, bar_width: usize) -> String {
    let mut out = String::new();
    out.push_str(&theoretical_results_text(report));
    out.push('\n');
    out.push_str(PARAMETER_IMPACT);
    out.push('\n');
    out.push_str(&histograms_text(report, bar_width));
    out.push_str("\nSimulation statistics:\n");
    out.push_str(&statistics_table(report));
    out
}
