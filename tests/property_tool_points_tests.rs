use chart_overlay::api::{OverlayConfig, OverlayEngine};
use chart_overlay::core::{Point, Viewport};
use chart_overlay::host::SeriesHost;
use chart_overlay::OverlayError;
use proptest::prelude::*;

fn engine() -> OverlayEngine<SeriesHost> {
    let times = (0..200).map(|index| f64::from(index) * 60.0).collect();
    let host = SeriesHost::new(Viewport::new(800, 600), times, 0.0, 600.0).expect("host init");
    OverlayEngine::new(host, OverlayConfig::default()).expect("engine init")
}

fn bounded_kind() -> impl Strategy<Value = (&'static str, usize)> {
    prop::sample::select(vec![
        ("TrendLine", 2),
        ("Ray", 2),
        ("ExtendedLine", 2),
        ("Arrow", 2),
        ("HorizontalLine", 1),
        ("HorizontalRay", 1),
        ("VerticalLine", 1),
        ("CrossLine", 1),
        ("Rectangle", 2),
        ("Triangle", 3),
        ("ParallelChannel", 3),
        ("FibRetracement", 2),
        ("Text", 1),
    ])
}

fn points(count: usize) -> Vec<Point> {
    (0..count)
        .map(|index| Point::new(index as f64 * 60.0, 100.0 + index as f64))
        .collect()
}

proptest! {
    #[test]
    fn bounded_kinds_accept_exactly_their_point_quota(
        (kind, quota) in bounded_kind(),
        given in 0usize..6
    ) {
        let mut engine = engine();
        let result = engine.add_tool(kind, points(given), None);
        if given == quota {
            let id = result.expect("complete tool accepted");
            let exported = engine.get_by_id(&id).expect("exported");
            prop_assert_eq!(exported.points.len(), quota);
            prop_assert!(engine.tool(&id).expect("tool").is_finished());
        } else if given == 0 {
            let id = result.expect("empty tool starts creation");
            prop_assert_eq!(engine.creating_tool_id(), Some(id.as_str()));
        } else {
            prop_assert!(matches!(result, Err(OverlayError::InvalidData(_))));
            prop_assert_eq!(engine.tool_count(), 0);
        }
    }

    #[test]
    fn unbounded_kinds_keep_every_point(kind in prop::sample::select(vec!["Path", "Brush"]), given in 1usize..40) {
        let mut engine = engine();
        let id = engine.add_tool(kind, points(given), None).expect("path accepted");
        prop_assert_eq!(engine.get_by_id(&id).expect("exported").points.len(), given);
        prop_assert!(engine.tool(&id).expect("tool").is_finished());
    }
}
