//! Property-based tests for the forecasting invariants
//!
//! These hold for any seed, any anchoring mode and any plausible inputs:
//! - bands contain the point forecast at every step
//! - simulated percentiles are ordered
//! - deterministic band width never shrinks with the horizon, both in the
//!   interval builder and in the published inflation and unemployment paths
//! - the January SMIC increase never drops below the legal minimum

use chrono::{DateTime, Utc};
use labor_forecast::simulation::{self, SimulationParams};
use labor_forecast::{AnchoringMode, ForecastConfig, ForecastPath, ForecastPipeline, RunContext};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::{json, Value};
use series_math::IntervalBuilder;

fn run_context() -> RunContext {
    let generated_at = DateTime::parse_from_rfc3339("2026-03-02T08:00:00Z")
        .unwrap()
        .with_timezone(&Utc);
    RunContext::at(generated_at)
}

fn mode_strategy() -> impl Strategy<Value = AnchoringMode> {
    prop_oneof![
        Just(AnchoringMode::MonteCarlo),
        Just(AnchoringMode::InstitutionalInterpolation),
        Just(AnchoringMode::Freeform),
    ]
}

fn deterministic_mode_strategy() -> impl Strategy<Value = AnchoringMode> {
    prop_oneof![
        Just(AnchoringMode::InstitutionalInterpolation),
        Just(AnchoringMode::Freeform),
    ]
}

fn dataset_strategy() -> impl Strategy<Value = Value> {
    (
        -0.5f64..6.0,  // current inflation
        0.5f64..4.0,   // institutional inflation
        5.0f64..11.0,  // current unemployment
        80.0f64..115.0, // business climate
        1.3f64..2.1,   // diesel price
    )
        .prop_map(|(inflation, target, unemployment, climate, diesel)| {
            json!({
                "indicateurs_cles": {
                    "inflation_annuelle": inflation,
                    "taux_chomage_actuel": unemployment,
                    "climat_affaires": climate,
                    "prix_gazole": diesel
                },
                "smic": { "montant_brut": 1823.03 },
                "previsions": {
                    "banque_de_france": {
                        "inflation_ipch": { "2026": target, "2027": target },
                        "taux_chomage": { "2026": unemployment, "2027": unemployment }
                    }
                }
            })
        })
}

fn band_widths(path: &ForecastPath) -> Vec<f64> {
    path.upper_bound
        .iter()
        .zip(&path.lower_bound)
        .map(|(upper, lower)| upper - lower)
        .collect()
}

fn assert_band_contains_point(path: &ForecastPath) {
    for i in 0..path.horizon() {
        assert!(path.lower_bound[i] <= path.p25[i], "step {}: {:?}", i, path);
        assert!(path.p25[i] <= path.predictions[i], "step {}: {:?}", i, path);
        assert!(path.predictions[i] <= path.p75[i], "step {}: {:?}", i, path);
        assert!(path.p75[i] <= path.upper_bound[i], "step {}: {:?}", i, path);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_bands_contain_point_forecast(
        mode in mode_strategy(),
        dataset in dataset_strategy(),
        seed in any::<u64>(),
    ) {
        let pipeline = ForecastPipeline::new(ForecastConfig::with_mode(mode)).unwrap();
        let bundle = pipeline.run(&dataset, &run_context().with_seed(seed)).unwrap();

        assert_band_contains_point(&bundle.inflation.monthly);
        assert_band_contains_point(&bundle.chomage.quarterly);
        assert_band_contains_point(&bundle.salaires.monthly);

        prop_assert!(bundle.chomage.quarterly.lower_bound.iter().all(|&v| v >= 0.0));
        prop_assert!(bundle.salaires.monthly.lower_bound.iter().all(|&v| v >= -5.0));
    }

    #[test]
    fn prop_probabilities_are_percentages(
        mode in mode_strategy(),
        dataset in dataset_strategy(),
        seed in any::<u64>(),
    ) {
        let pipeline = ForecastPipeline::new(ForecastConfig::with_mode(mode)).unwrap();
        let bundle = pipeline.run(&dataset, &run_context().with_seed(seed)).unwrap();

        let p = &bundle.inflation.probabilities;
        for value in [p.below_2pct, p.at_ecb_target, p.above_3pct] {
            prop_assert!((0.0..=100.0).contains(&value));
        }
        let q = &bundle.chomage.probabilities;
        for value in [q.below_7pct, q.above_8pct] {
            prop_assert!((0.0..=100.0).contains(&value));
        }
        for event in &bundle.smic.events {
            prop_assert!((0.0..=1.0).contains(&event.probability));
        }
    }

    #[test]
    fn prop_january_increase_respects_minimum(
        mode in mode_strategy(),
        dataset in dataset_strategy(),
        seed in any::<u64>(),
    ) {
        let pipeline = ForecastPipeline::new(ForecastConfig::with_mode(mode)).unwrap();
        let bundle = pipeline.run(&dataset, &run_context().with_seed(seed)).unwrap();

        let january = bundle.smic.january().unwrap();
        prop_assert!(january.increase_pct >= 1.0);
        prop_assert!(january.gross > 1823.03);
        prop_assert!(january.net < january.gross);
    }

    #[test]
    fn prop_simulated_percentiles_are_ordered(
        current in -1.0f64..8.0,
        target in 0.0f64..4.0,
        volatility in 0.0f64..1.5,
        seed in any::<u64>(),
    ) {
        let params = SimulationParams::new(current, vec![target; 12], volatility)
            .unwrap()
            .with_simulations(200)
            .unwrap();
        let mut rng = StdRng::seed_from_u64(seed);
        let summary = simulation::run(&params, &mut rng).unwrap();

        for step in 0..12 {
            prop_assert!(summary.p10[step] <= summary.p25[step]);
            prop_assert!(summary.p25[step] <= summary.p50[step]);
            prop_assert!(summary.p50[step] <= summary.p75[step]);
            prop_assert!(summary.p75[step] <= summary.p90[step]);
        }
        prop_assert_eq!(summary.terminal.len(), 200);
    }

    #[test]
    fn prop_band_width_never_shrinks(
        point in 0.0f64..5.0,
        volatility in 0.0f64..2.0,
        periods_per_year in prop_oneof![Just(4u32), Just(12u32)],
    ) {
        let builder = IntervalBuilder::new(volatility, periods_per_year).unwrap();
        let points = vec![point; 24];
        let (_, upper) = builder.build(&points);

        for pair in upper.windows(2) {
            prop_assert!(pair[1] >= pair[0]);
        }
    }

    #[test]
    fn prop_published_band_width_never_shrinks(
        mode in deterministic_mode_strategy(),
        dataset in dataset_strategy(),
    ) {
        let pipeline = ForecastPipeline::new(ForecastConfig::with_mode(mode)).unwrap();
        let bundle = pipeline.run(&dataset, &run_context()).unwrap();

        for path in [&bundle.inflation.monthly, &bundle.chomage.quarterly] {
            let widths = band_widths(path);
            prop_assert_eq!(widths.len(), path.horizon());
            for (i, pair) in widths.windows(2).enumerate() {
                prop_assert!(
                    pair[1] >= pair[0] - 1e-9,
                    "band narrows after step {}: {:?}",
                    i,
                    widths
                );
            }
        }
    }
}
