// Property-based checks over the valid parameter space

use compound_poisson::config::RunConfig;
use compound_poisson::engine::simulate_seeded;
use compound_poisson::histogram::Histogram;
use compound_poisson::{
    summarize, theoretical_moments, ProcessParameters, SeverityMethod, SimulationError,
    SimulationRequest,
};
use proptest::prelude::*;

fn rate() -> impl Strategy<Value = f64> {
    0.1f64..5.0
}

fn horizon() -> impl Strategy<Value = f64> {
    0.1f64..20.0
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn variance_is_twice_mean_over_mu(t in horizon(), lambda in rate(), mu in rate()) {
        let m = theoretical_moments(t, lambda, mu).unwrap();
        prop_assert!((m.variance - 2.0 * m.mean / mu).abs() <= 1e-9 * m.variance.max(1.0));
    }

    #[test]
    fn moments_scale_linearly_in_time(t in horizon(), lambda in rate(), mu in rate()) {
        let one = theoretical_moments(t, lambda, mu).unwrap();
        let two = theoretical_moments(2.0 * t, lambda, mu).unwrap();
        prop_assert!((two.mean - 2.0 * one.mean).abs() <= 1e-9 * two.mean.max(1.0));
        prop_assert!((two.variance - 2.0 * one.variance).abs() <= 1e-9 * two.variance.max(1.0));
    }

    #[test]
    fn simulate_returns_n_non_negative_finite_values(
        t in horizon(),
        lambda in rate(),
        mu in rate(),
        n in 1usize..200,
        seed in any::<u64>(),
    ) {
        let params = ProcessParameters::new(lambda, mu).unwrap();
        let request = SimulationRequest::new(t, params, n).unwrap();
        for method in [SeverityMethod::SumOfExponentials, SeverityMethod::GammaShortcut] {
            let samples = simulate_seeded(&request, method, seed).unwrap();
            prop_assert_eq!(samples.len(), n);
            prop_assert!(samples.iter().all(|s| s.is_finite() && *s >= 0.0));
        }
    }

    #[test]
    fn non_positive_rates_are_rejected(bad in -10.0f64..=0.0, good in rate()) {
        let lambda_err = ProcessParameters::new(bad, good).unwrap_err();
        let mu_err = ProcessParameters::new(good, bad).unwrap_err();
        let lambda_is_invalid = matches!(
            lambda_err,
            SimulationError::InvalidParameter { name: "lambda", .. }
        );
        let mu_is_invalid = matches!(mu_err, SimulationError::InvalidParameter { name: "mu", .. });
        prop_assert!(lambda_is_invalid);
        prop_assert!(mu_is_invalid);
    }

    #[test]
    fn histogram_counts_never_exceed_sample(
        lambda in rate(),
        mu in rate(),
        bins in 1usize..60,
        seed in any::<u64>(),
    ) {
        let params = ProcessParameters::new(lambda, mu).unwrap();
        let request = SimulationRequest::new(10.0, params, 500).unwrap();
        let samples = simulate_seeded(&request, SeverityMethod::default(), seed).unwrap();
        let moments = theoretical_moments(10.0, lambda, mu).unwrap();

        let hist = Histogram::from_sample(&samples, bins, 0.99, moments.mean).unwrap();
        let binned: usize = hist.bins.iter().map(|b| b.count).sum();
        prop_assert_eq!(binned, hist.retained);
        prop_assert_eq!(hist.retained + hist.trimmed, samples.len());

        // Statistics ignore the display trim
        let summary = summarize(&samples, &moments).unwrap();
        prop_assert_eq!(summary.sample_count, samples.len());
    }

    #[test]
    fn controls_inside_surface_validate(
        lambda_step in 1u32..=50,
        mu_step in 1u32..=50,
        n_step in 1usize..=50,
    ) {
        let mut config = RunConfig::default();
        config.process = ProcessParameters {
            lambda: lambda_step as f64 / 10.0,
            mu: mu_step as f64 / 10.0,
        };
        config.simulation.sample_count = n_step * 1000;
        config.simulation.method = SeverityMethod::GammaShortcut;
        prop_assert!(config.validate().is_ok());
    }
}
