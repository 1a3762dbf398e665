//! Display histograms of a simulated sample
//!
//! Values above the 99th percentile are dropped before binning so the tail
//! does not flatten the plot. This is a presentation transform only:
//! summary statistics are always computed from the full sample.

use crate::stats::percentile;
use crate::SimulationError;
use serde::Serialize;
use std::fmt::Write;

/// Display quantile above which values are trimmed
pub const DEFAULT_TRIM_QUANTILE: f64 = 0.99;

pub const DEFAULT_BINS: usize = 40;

/// Width in characters of the longest bar
pub const DEFAULT_BAR_WIDTH: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub bins: Vec<HistogramBin>,
    /// Sample quantile used as the display cut-off
    pub trim_threshold: f64,
    pub retained: usize,
    pub trimmed: usize,
    /// Vertical marker, usually the theoretical mean
    pub marker: f64,
}

impl Histogram {
    /// Trim at `trim_quantile` then bin into `bins` equal-width bins
    pub fn from_sample(
        sample: &[f64],
        bins: usize,
        trim_quantile: f64,
        marker: f64,
    ) -> Result<Self, SimulationError> {
        if bins == 0 {
            return Err(SimulationError::invalid("bins", 0.0, "must be >= 1"));
        }
        if !(trim_quantile > 0.0 && trim_quantile <= 1.0) {
            return Err(SimulationError::invalid(
                "trim_quantile",
                trim_quantile,
                "must lie in (0, 1]",
            ));
        }

        let trim_threshold = percentile(sample, trim_quantile)?;
        let kept: Vec<f64> = sample
            .iter()
            .copied()
            .filter(|v| v.is_finite() && *v <= trim_threshold)
            .collect();

        let min = kept.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = kept.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

        // Degenerate sample (e.g. every trial had zero claims)
        if max - min <= 0.0 {
            return Ok(Histogram {
                bins: vec![HistogramBin {
                    lower: min,
                    upper: max,
                    count: kept.len(),
                }],
                trim_threshold,
                retained: kept.len(),
                trimmed: sample.len() - kept.len(),
                marker,
            });
        }

        let width = (max - min) / bins as f64;
        let mut counts = vec![0usize; bins];
        for v in &kept {
            let idx = (((v - min) / width) as usize).min(bins - 1);
            counts[idx] += 1;
        }

        let bins = counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| HistogramBin {
                lower: min + i as f64 * width,
                upper: min + (i + 1) as f64 * width,
                count,
            })
            .collect();

        Ok(Histogram {
            bins,
            trim_threshold,
            retained: kept.len(),
            trimmed: sample.len() - kept.len(),
            marker,
        })
    }

    /// Index of the bin containing the marker, if it falls in range
    pub fn marker_bin(&self) -> Option<usize> {
        let last = self.bins.len().checked_sub(1)?;
        if let Some(i) = self
            .bins
            .iter()
            .position(|bin| self.marker >= bin.lower && self.marker < bin.upper)
        {
            return Some(i);
        }

        // Top bin is closed on the right
        let top = &self.bins[last];
        (self.marker >= top.lower && self.marker <= top.upper).then_some(last)
    }

    pub fn max_count(&self) -> usize {
        self.bins.iter().map(|b| b.count).max().unwrap_or(0)
    }

    /// Horizontal ASCII bars, flagging the bin that holds the marker
    pub fn render(&self, bar_width: usize) -> String {
        let mut out = String::new();
        let max_count = self.max_count().max(1);
        let marker_bin = self.marker_bin();

        for (i, bin) in self.bins.iter().enumerate() {
            let len = (bin.count * bar_width).div_ceil(max_count);
            let bar = "#".repeat(len);
            let flag = if marker_bin == Some(i) { "  <- E[S(t)]" } else { "" };
            let _ = writeln!(
                out,
                "{:>12.2} .. {:<12.2} |{:<width$} {:>7}{}",
                bin.lower,
                bin.upper,
                bar,
                bin.count,
                flag,
                width = bar_width
            );
        }

        if marker_bin.is_none() {
            let _ = writeln!(
                out,
                "  (E[S(t)] = {:.2} lies outside the displayed range)",
                self.marker
            );
        }
        let _ = writeln!(
            out,
            "  {} shown, {} above the {:.2} display cut-off",
            self.retained, self.trimmed, self.trim_threshold
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear_sample(n: usize) -> Vec<f64> {
        (0..n).map(|i| i as f64).collect()
    }

    #[test]
    fn test_trims_above_99th_percentile() {
        let sample = linear_sample(1000); // 0..=999
        let hist = Histogram::from_sample(&sample, 10, 0.99, 500.0).unwrap();

        // 99th percentile = 0.99 * 999 = 989.01
        assert!((hist.trim_threshold - 989.01).abs() < 1e-9);
        assert_eq!(hist.retained, 990);
        assert_eq!(hist.trimmed, 10);

        let total: usize = hist.bins.iter().map(|b| b.count).sum();
        assert_eq!(total, hist.retained);
    }

    #[test]
    fn test_bins_cover_retained_range() {
        let sample = linear_sample(100);
        let hist = Histogram::from_sample(&sample, 4, 1.0, 50.0).unwrap();

        assert_eq!(hist.bins.len(), 4);
        assert_eq!(hist.bins[0].lower, 0.0);
        assert!((hist.bins[3].upper - 99.0).abs() < 1e-9);
        assert_eq!(hist.trimmed, 0);
    }

    #[test]
    fn test_marker_bin() {
        let sample = linear_sample(100);
        let hist = Histogram::from_sample(&sample, 4, 1.0, 50.0).unwrap();
        // width 24.75: 50 falls in [49.5, 74.25)
        assert_eq!(hist.marker_bin(), Some(2));

        let outside = Histogram::from_sample(&sample, 4, 1.0, 500.0).unwrap();
        assert_eq!(outside.marker_bin(), None);

        let at_top = Histogram::from_sample(&sample, 4, 1.0, 99.0).unwrap();
        assert_eq!(at_top.marker_bin(), Some(3));
    }

    #[test]
    fn test_all_zero_sample_is_single_bin() {
        let sample = vec![0.0; 50];
        let hist = Histogram::from_sample(&sample, 20, 0.99, 0.001).unwrap();

        assert_eq!(hist.bins.len(), 1);
        assert_eq!(hist.bins[0].count, 50);
        assert_eq!(hist.trimmed, 0);
    }

    #[test]
    fn test_rejects_zero_bins_and_bad_quantile() {
        let sample = linear_sample(10);
        assert!(Histogram::from_sample(&sample, 0, 0.99, 1.0).is_err());
        assert!(Histogram::from_sample(&sample, 5, 0.0, 1.0).is_err());
        assert!(Histogram::from_sample(&sample, 5, 1.5, 1.0).is_err());
    }

    #[test]
    fn test_rejection_names_the_parameter() {
        let err = Histogram::from_sample(&linear_sample(10), 0, 0.99, 1.0).unwrap_err();
        assert_eq!(err.to_string(), "invalid parameter `bins` = 0: must be >= 1");
    }

    #[test]
    fn test_empty_sample_is_error() {
        assert_eq!(
            Histogram::from_sample(&[], 5, 0.99, 1.0),
            Err(SimulationError::EmptySample)
        );
    }

    #[test]
    fn test_render_flags_marker() {
        let sample = linear_sample(100);
        let hist = Histogram::from_sample(&sample, 4, 1.0, 50.0).unwrap();
        let text = hist.render(20);

        assert_eq!(text.matches("<- E[S(t)]").count(), 1);
        assert!(text.contains("100 shown, 0 above"));
    }

    #[test]
    fn test_render_notes_marker_outside_range() {
        let sample = linear_sample(100);
        let hist = Histogram::from_sample(&sample, 4, 1.0, 1000.0).unwrap();
        assert!(hist.render(20).contains("outside the displayed range"));
    }
}
