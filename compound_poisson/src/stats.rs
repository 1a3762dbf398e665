//! Empirical statistics over a simulated sample

use crate::{SimulationError, SummaryStatistics, TheoreticalMoments};

/// Arithmetic mean of a series
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Unbiased sample variance (divides by n-1)
///
/// Undefined for fewer than two values, reported as NaN.
pub fn sample_variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let sum_sq = values.iter().map(|v| (v - m).powi(2)).sum::<f64>();
    sum_sq / (values.len() - 1) as f64
}

/// Monte Carlo standard error of the mean, sqrt(s²/n)
pub fn standard_error(values: &[f64]) -> f64 {
    (sample_variance(values) / values.len() as f64).sqrt()
}

/// Fraction of values exactly equal to zero
pub fn zero_fraction(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().filter(|&&v| v == 0.0).count() as f64 / values.len() as f64
}

/// Quantile `q` in [0, 1] with linear interpolation between closest ranks
pub fn percentile(values: &[f64], q: f64) -> Result<f64, SimulationError> {
    if values.is_empty() {
        return Err(SimulationError::EmptySample);
    }
    if !(0.0..=1.0).contains(&q) {
        return Err(SimulationError::invalid("quantile", q, "must lie in [0, 1]"));
    }

    let mut sorted: Vec<f64> = values.iter().filter(|x| x.is_finite()).copied().collect();
    if sorted.is_empty() {
        return Err(SimulationError::EmptySample);
    }
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let rank = q * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f64;
    Ok(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
}

/// Compare a simulated sample with its theoretical moments
pub fn summarize(
    sample: &[f64],
    moments: &TheoreticalMoments,
) -> Result<SummaryStatistics, SimulationError> {
    if sample.is_empty() {
        return Err(SimulationError::EmptySample);
    }

    Ok(SummaryStatistics {
        theoretical_mean: moments.mean,
        simulated_mean: mean(sample),
        theoretical_variance: moments.variance,
        simulated_variance: sample_variance(sample),
        zero_probability: zero_fraction(sample),
        sample_count: sample.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn mean_basic() {
        assert_relative_eq!(mean(&[1.0, 2.0, 3.0, 4.0]), 2.5);
        assert_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn sample_variance_uses_n_minus_one() {
        let values = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        // Sum of squared deviations = 32, n - 1 = 7
        assert_relative_eq!(sample_variance(&values), 32.0 / 7.0);
    }

    #[test]
    fn sample_variance_single_value_is_nan() {
        assert!(sample_variance(&[3.0]).is_nan());
    }

    #[test]
    fn zero_fraction_counts_exact_zeros_only() {
        let values = vec![0.0, 0.0, 1e-300, 2.0];
        assert_relative_eq!(zero_fraction(&values), 0.5);
    }

    #[test]
    fn percentile_interpolates() {
        let values = vec![5.0, 1.0, 3.0, 2.0, 4.0];
        assert_relative_eq!(percentile(&values, 0.0).unwrap(), 1.0);
        assert_relative_eq!(percentile(&values, 0.5).unwrap(), 3.0);
        assert_relative_eq!(percentile(&values, 1.0).unwrap(), 5.0);
        // rank = 0.99 * 4 = 3.96 → 4 + 0.96 * (5 - 4)
        assert_relative_eq!(percentile(&values, 0.99).unwrap(), 4.96, epsilon = 1e-12);
    }

    #[test]
    fn percentile_rejects_bad_input() {
        assert_eq!(percentile(&[], 0.5), Err(SimulationError::EmptySample));
        assert!(percentile(&[1.0], 1.5).is_err());
    }

    #[test]
    fn summarize_combines_theory_and_sample() {
        let moments = TheoreticalMoments {
            mean: 1.0,
            variance: 2.0,
        };
        let summary = summarize(&[0.0, 0.0, 2.0, 2.0], &moments).unwrap();

        assert_eq!(summary.theoretical_mean, 1.0);
        assert_eq!(summary.theoretical_variance, 2.0);
        assert_relative_eq!(summary.simulated_mean, 1.0);
        assert_relative_eq!(summary.simulated_variance, 4.0 / 3.0);
        assert_relative_eq!(summary.zero_probability, 0.5);
        assert_eq!(summary.sample_count, 4);
    }

    #[test]
    fn summarize_empty_is_error() {
        let moments = TheoreticalMoments {
            mean: 1.0,
            variance: 2.0,
        };
        assert_eq!(summarize(&[], &moments), Err(SimulationError::EmptySample));
    }

    #[test]
    fn standard_error_basic() {
        let values = vec![1.0, 3.0];
        // s² = 2, n = 2 → sqrt(1) = 1
        assert_relative_eq!(standard_error(&values), 1.0);
    }
}
