use chart_overlay::telemetry::{init_default_tracing, init_tracing_with_filter};

#[test]
fn tracing_setup_is_opt_in_and_installs_once() {
    let first = init_default_tracing();
    assert_eq!(first, cfg!(feature = "telemetry"));

    // Either the feature is off or a global subscriber now exists.
    assert!(!init_tracing_with_filter("chart_overlay::interaction=trace"));
}
