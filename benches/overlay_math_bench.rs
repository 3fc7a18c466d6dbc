use chart_overlay::api::{OverlayConfig, OverlayEngine};
use chart_overlay::core::{BoxBounds, Point, ScreenPoint, Viewport, ViewportBounds, clip_polygon, distance_to_polyline};
use chart_overlay::culling::{CullingOptions, CullingSegment, ExtendOptions, culling_state};
use chart_overlay::host::SeriesHost;
use chart_overlay::labels::{LabelRegistration, LabelStackingManager};
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

fn bench_culling_10k_rays(c: &mut Criterion) {
    let bounds = ViewportBounds::new(10_000.0, 20_000.0, 100.0, 200.0);
    let ray = CullingOptions::default().with_extend(ExtendOptions::new(false, true));
    let segments: Vec<[Point; 2]> = (0..10_000)
        .map(|i| {
            let t = f64::from(i);
            [
                Point::new(t, 50.0 + (t * 0.37).sin() * 200.0),
                Point::new(t + 120.0, 60.0 + (t * 0.11).cos() * 200.0),
            ]
        })
        .collect();

    c.bench_function("culling_10k_rays", |b| {
        b.iter(|| {
            let visible = segments
                .iter()
                .filter(|points| culling_state(black_box(points.as_slice()), bounds, &ray).is_visible())
                .count();
            black_box(visible);
        })
    });
}

fn bench_culling_polyline_sub_segments(c: &mut Criterion) {
    let bounds = ViewportBounds::new(0.0, 1_000.0, 0.0, 100.0);
    let points: Vec<Point> = (0..2_000)
        .map(|i| {
            let t = f64::from(i) * 3.0;
            Point::new(t, 150.0 + (t * 0.01).sin() * 40.0)
        })
        .collect();
    let segments = points
        .windows(2)
        .map(|pair| CullingSegment::new(pair[0], pair[1], ExtendOptions::default()))
        .collect();
    let options = CullingOptions::default().with_sub_segments(segments);

    c.bench_function("culling_polyline_2k_sub_segments", |b| {
        b.iter(|| black_box(culling_state(black_box(&points), bounds, &options)))
    });
}

fn bench_label_stacking_1k(c: &mut Criterion) {
    let mut manager = LabelStackingManager::new();
    for i in 0..1_000 {
        let desired = (f64::from(i) * 7.3) % 900.0;
        manager.register(LabelRegistration::new(format!("tool-{i}:price:0"), format!("tool-{i}"), desired, 20.0));
    }

    c.bench_function("label_stacking_1k", |b| {
        b.iter(|| black_box(black_box(&manager).update_stacking()))
    });
}

fn bench_polyline_geometry(c: &mut Criterion) {
    let polyline: Vec<ScreenPoint> = (0..5_000)
        .map(|i| {
            let x = f64::from(i) * 0.4;
            ScreenPoint::new(x, 300.0 + (x * 0.05).sin() * 120.0)
        })
        .collect();
    let pane = BoxBounds::from_size(1_600.0, 900.0);
    let polygon: Vec<ScreenPoint> = (0..256)
        .map(|i| {
            let angle = f64::from(i) / 256.0 * std::f64::consts::TAU;
            ScreenPoint::new(800.0 + angle.cos() * 1_000.0, 450.0 + angle.sin() * 600.0)
        })
        .collect();

    c.bench_function("distance_to_polyline_5k", |b| {
        b.iter(|| black_box(distance_to_polyline(black_box(ScreenPoint::new(977.0, 412.0)), &polyline)))
    });
    c.bench_function("clip_polygon_256", |b| {
        b.iter(|| black_box(clip_polygon(black_box(&polygon), pane)))
    });
}

fn bench_engine_hover_and_views_500_tools(c: &mut Criterion) {
    let times = (0..2_000).map(|i| f64::from(i) * 60.0).collect();
    let host = SeriesHost::new(Viewport::new(1_600, 900), times, 0.0, 900.0).expect("host init");
    let mut engine = OverlayEngine::new(host, OverlayConfig::default()).expect("engine init");
    for i in 0..500 {
        let t = f64::from(i) * 120.0;
        engine
            .add_tool(
                "TrendLine",
                vec![Point::new(t, 100.0 + f64::from(i % 50) * 10.0), Point::new(t + 600.0, 150.0)],
                None,
            )
            .expect("add tool");
    }

    c.bench_function("engine_hover_500_tools", |b| {
        b.iter(|| engine.pointer_move(black_box(733.0), black_box(421.0)))
    });
    c.bench_function("engine_update_views_500_tools", |b| {
        b.iter(|| black_box(engine.update_views()))
    });
}

criterion_group!(
    benches,
    bench_culling_10k_rays,
    bench_culling_polyline_sub_segments,
    bench_label_stacking_1k,
    bench_polyline_geometry,
    bench_engine_hover_and_views_500_tools
);
criterion_main!(benches);
