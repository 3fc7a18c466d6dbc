use chart_overlay::core::{LogicalTimeInterpolation, logical_index_from_time, time_from_logical_index};
use proptest::prelude::*;

proptest! {
    #[test]
    fn logical_index_round_trips_through_time(
        origin in -1_000_000.0f64..1_000_000.0,
        interval in 1.0f64..86_400.0,
        logical in -10_000.0f64..10_000.0
    ) {
        let model = LogicalTimeInterpolation::from_samples(origin, origin + interval).expect("model");
        let time = model.time_from_logical_index(logical).expect("time");
        let back = model.logical_index_from_time(time).expect("logical");
        prop_assert!((back - logical).abs() <= 1e-6 * logical.abs().max(1.0));
    }

    #[test]
    fn extrapolation_ignores_samples_past_the_second(
        origin in -1_000.0f64..1_000.0,
        interval in 1.0f64..600.0,
        tail in prop::collection::vec(-1_000.0f64..1_000.0, 0..8),
        logical in -500.0f64..500.0
    ) {
        let mut times = vec![origin, origin + interval];
        times.extend(tail);
        let from_series = time_from_logical_index(&times, logical).expect("series time");
        let expected = origin + logical * interval;
        prop_assert!((from_series - expected).abs() <= 1e-9 * expected.abs().max(1.0));
    }

    #[test]
    fn degenerate_interval_never_maps(time in -1_000.0f64..1_000.0, origin in -1_000.0f64..1_000.0) {
        prop_assert!(logical_index_from_time(&[origin, origin], time).is_none());
        prop_assert!(time_from_logical_index(&[origin], 1.0).is_none());
    }
}
