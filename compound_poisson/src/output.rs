//! Export of run results to CSV and JSON
//!
//! - statistics.csv: one row per horizon, columns as shown on screen
//! - summary.json: run metadata, the statistics table and histograms
//! - samples.csv (optional): every simulated value in long format

use crate::histogram::Histogram;
use crate::run::{HorizonReport, RunReport};
use crate::sweep::SweepRow;
use crate::{ProcessParameters, SeverityMethod};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Statistics table row with the on-screen column names
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
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

impl From<&HorizonReport> for SummaryRow {
    fn from(h: &HorizonReport) -> Self {
        SummaryRow {
            time: h.time_horizon,
            theoretical_mean: h.summary.theoretical_mean,
            simulated_mean: h.summary.simulated_mean,
            theoretical_variance: h.summary.theoretical_variance,
            simulated_variance: h.summary.simulated_variance,
            zero_probability: h.summary.zero_probability,
        }
    }
}

/// Metadata for reproducibility
#[derive(Debug, Clone, Serialize)]
pub struct RunMetadata {
    pub parameters: ProcessParameters,
    pub sample_count: usize,
    pub method: SeverityMethod,
    pub base_seed: u64,
    pub horizons: Vec<f64>,
    pub timestamp: String,
    pub version: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct HorizonDetail {
    pub time: f64,
    pub seed: u64,
    pub theoretical_zero_probability: f64,
    pub standard_error: f64,
    pub histogram: Histogram,
}

/// Top-level container for a run's exported output
#[derive(Debug, Clone, Serialize)]
pub struct RunOutput {
    pub metadata: RunMetadata,
    pub statistics: Vec<SummaryRow>,
    pub horizons: Vec<HorizonDetail>,
}

impl RunOutput {
    pub fn from_report(report: &RunReport) -> Self {
        let metadata = RunMetadata {
            parameters: report.parameters,
            sample_count: report.sample_count,
            method: report.method,
            base_seed: report.base_seed,
            horizons: report.horizons.iter().map(|h| h.time_horizon).collect(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION"),
        };

        RunOutput {
            metadata,
            statistics: report.horizons.iter().map(SummaryRow::from).collect(),
            horizons: report
                .horizons
                .iter()
                .map(|h| HorizonDetail {
                    time: h.time_horizon,
                    seed: h.seed,
                    theoretical_zero_probability: h.theoretical_zero_probability,
                    standard_error: h.standard_error,
                    histogram: h.histogram.clone(),
                })
                .collect(),
        }
    }

    /// Statistics table as CSV bytes
    pub fn statistics_csv(&self) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        for row in &self.statistics {
            wtr.serialize(row)?;
        }
        Ok(wtr.into_inner()?)
    }

    /// Summary JSON with metadata, statistics and histograms
    pub fn summary_json(&self) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    /// Write all outputs to a directory
    ///
    /// Creates:
    /// - statistics.csv
    /// - summary.json
    /// - samples.csv (only when `save_samples` is set)
    ///
    /// Everything is serialized before the first file is written. If a
    /// write fails, files already written by this call are removed.
    pub fn write_all<P: AsRef<Path>>(
        &self,
        report: &RunReport,
        dir: P,
        save_samples: bool,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let mut files = vec![
            ("statistics.csv", self.statistics_csv()?),
            ("summary.json", self.summary_json()?),
        ];
        if save_samples {
            files.push(("samples.csv", samples_csv(report)?));
        }

        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let mut written = Vec::with_capacity(files.len());
        for (name, contents) in &files {
            let path = dir.join(name);
            if let Err(e) = fs::write(&path, contents) {
                for done in &written {
                    let _ = fs::remove_file(done);
                }
                return Err(e.into());
            }
            written.push(path);
        }
        Ok(())
    }
}

/// Every simulated value as `time,trial,value`
pub fn samples_csv(report: &RunReport) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(["time", "trial", "value"])?;
    for h in &report.horizons {
        for (trial, value) in h.samples.iter().enumerate() {
            wtr.write_record(&[
                h.time_horizon.to_string(),
                trial.to_string(),
                value.to_string(),
            ])?;
        }
    }
    Ok(wtr.into_inner()?)
}

/// Write sweep results, one row per (value, horizon)
pub fn write_sweep_csv<P: AsRef<Path>>(
    rows: &[SweepRow],
    path: P,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut wtr = csv::Writer::from_path(path)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunConfig;
    use crate::run::execute;
    use std::path::PathBuf;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "compound_poisson_{}_{}",
            name,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    fn small_report() -> RunReport {
        let mut config = RunConfig::default();
        config.simulation.sample_count = 1000;
        config.simulation.horizons = vec![1.0, 2.0];
        config.simulation.seed = Some(5);
        config.display.bins = 5;
        execute(&config).unwrap()
    }

    #[test]
    fn test_statistics_csv_headers() {
        let report = small_report();
        let dir = scratch_dir("headers");
        RunOutput::from_report(&report)
            .write_all(&report, &dir, false)
            .unwrap();

        let csv = fs::read_to_string(dir.join("statistics.csv")).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Time,Theoretical_Mean,Simulated_Mean,Theoretical_Variance,Simulated_Variance,P(S(t)=0)"
        );
        assert_eq!(lines.count(), 2);
        assert!(!dir.join("samples.csv").exists());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_samples_csv_is_long_format() {
        let report = small_report();
        let dir = scratch_dir("samples");
        RunOutput::from_report(&report)
            .write_all(&report, &dir, true)
            .unwrap();

        let csv = fs::read_to_string(dir.join("samples.csv")).unwrap();
        // header + 2 horizons × 1000 trials
        assert_eq!(csv.lines().count(), 2001);
        assert!(csv.starts_with("time,trial,value"));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_failed_write_leaves_no_partial_output() {
        let report = small_report();
        let dir = scratch_dir("partial");
        // A directory where summary.json should go makes the second write fail
        fs::create_dir_all(dir.join("summary.json")).unwrap();

        let result = RunOutput::from_report(&report).write_all(&report, &dir, true);

        assert!(result.is_err());
        assert!(!dir.join("statistics.csv").exists());
        assert!(!dir.join("samples.csv").exists());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_summary_json_contains_metadata() {
        let report = small_report();
        let output = RunOutput::from_report(&report);
        let json: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&output).unwrap()).unwrap();

        assert_eq!(json["metadata"]["base_seed"], 5);
        assert_eq!(json["metadata"]["method"], "sum_of_exponentials");
        assert_eq!(json["statistics"].as_array().unwrap().len(), 2);
        assert_eq!(json["statistics"][0]["Time"], 1.0);
        assert!(json["horizons"][0]["histogram"]["bins"].is_array());
    }

    #[test]
    fn test_summary_row_from_report() {
        let report = small_report();
        let row = SummaryRow::from(&report.horizons[1]);
        assert_eq!(row.time, 2.0);
        assert_eq!(row.theoretical_mean, 2.0);
        assert_eq!(row.theoretical_variance, 4.0);
    }
}
