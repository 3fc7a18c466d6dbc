use std::cell::RefCell;
use std::rc::Rc;

use approx::assert_relative_eq;
use chart_overlay::api::{AfterEditStage, OverlayConfig, OverlayEngine};
use chart_overlay::core::{Point, Viewport};
use chart_overlay::culling::CullingState;
use chart_overlay::host::{CursorStyle, SeriesHost};
use chart_overlay::interaction::{InteractionMode, KeyCode};
use chart_overlay::OverlayError;
use serde_json::json;

// 10 px per bar, one bar per minute: screen x maps to `x * 6` seconds and
// screen y to `600 - y` in price.
fn engine() -> OverlayEngine<SeriesHost> {
    let _ = chart_overlay::telemetry::init_default_tracing();
    let times = (0..200).map(|index| f64::from(index) * 60.0).collect();
    let host = SeriesHost::new(Viewport::new(800, 600), times, 0.0, 600.0).expect("host init");
    OverlayEngine::new(host, OverlayConfig::default()).expect("engine init")
}

fn line_points() -> Vec<Point> {
    vec![Point::new(600.0, 300.0), Point::new(1_200.0, 350.0)]
}

#[test]
fn rectangle_click_drag_creation_finishes_and_selects() {
    let mut engine = engine();
    let stages = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&stages);
    engine.subscribe_after_edit(move |event| sink.borrow_mut().push(event.stage));

    let id = engine.add_tool("Rectangle", Vec::new(), None).expect("add rectangle");
    assert_eq!(engine.creating_tool_id(), Some(id.as_str()));
    assert_eq!(engine.interaction_mode(), InteractionMode::Idle);
    assert_eq!(engine.host().cursor(), CursorStyle::Crosshair);

    engine.pointer_down(100.0, 100.0);
    assert_eq!(engine.interaction_mode(), InteractionMode::Creation);
    assert!(!engine.host().pan_enabled());
    engine.pointer_move(150.0, 150.0);
    engine.pointer_move(200.0, 200.0);
    engine.pointer_up(200.0, 200.0);

    let tool = engine.get_by_id(&id).expect("rectangle exported");
    assert_eq!(tool.points, vec![Point::new(600.0, 500.0), Point::new(1_200.0, 400.0)]);
    assert_eq!(engine.creating_tool_id(), None);
    assert_eq!(engine.selected_tool_id(), Some(id.as_str()));
    assert!(engine.host().pan_enabled());
    assert_eq!(*stages.borrow(), vec![AfterEditStage::Finished]);
}

#[test]
fn click_click_line_creation_reports_finished_once() {
    let mut engine = engine();
    let finished = Rc::new(RefCell::new(0));
    let sink = Rc::clone(&finished);
    engine.subscribe_after_edit(move |event| {
        if event.stage == AfterEditStage::Finished {
            *sink.borrow_mut() += 1;
        }
    });

    let id = engine.add_tool("TrendLine", Vec::new(), None).expect("add line");
    engine.pointer_down(100.0, 300.0);
    engine.pointer_up(100.0, 300.0);
    engine.pointer_move(200.0, 250.0);
    assert_eq!(engine.export_all().len(), 0);

    engine.pointer_down(200.0, 250.0);
    engine.pointer_up(200.0, 250.0);

    assert_eq!(engine.get_by_id(&id).expect("line").points, line_points());
    assert_eq!(*finished.borrow(), 1);
}

#[test]
fn removing_tool_mid_drag_returns_to_idle_and_restores_pan() {
    let mut engine = engine();
    let id = engine.add_tool("TrendLine", line_points(), None).expect("add line");

    engine.pointer_down(200.0, 250.0);
    engine.pointer_move(240.0, 230.0);
    assert_eq!(engine.interaction_mode(), InteractionMode::Edit);
    assert!(!engine.host().pan_enabled());

    assert_eq!(engine.remove_tools_by_id(&[id.as_str()]), 1);
    assert_eq!(engine.interaction_mode(), InteractionMode::Idle);
    assert!(engine.host().pan_enabled());
    assert_eq!(engine.selected_tool_id(), None);

    // Trailing input of the aborted gesture is harmless.
    engine.pointer_move(260.0, 220.0);
    engine.pointer_up(260.0, 220.0);
    assert_eq!(engine.tool_count(), 0);
}

#[test]
fn anchor_drag_reports_edited_with_new_points() {
    let mut engine = engine();
    let id = engine.add_tool("TrendLine", line_points(), None).expect("add line");
    let edited = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&edited);
    engine.subscribe_after_edit(move |event| sink.borrow_mut().push((event.stage, event.tool.points.clone())));

    engine.pointer_down(200.0, 250.0);
    engine.pointer_move(250.0, 200.0);
    engine.pointer_up(250.0, 200.0);

    let expected = vec![Point::new(600.0, 300.0), Point::new(1_500.0, 400.0)];
    assert_eq!(engine.get_by_id(&id).expect("line").points, expected);
    assert_eq!(*edited.borrow(), vec![(AfterEditStage::Edited, expected)]);
}

#[test]
fn escape_cancels_and_removes_creation_target() {
    let mut engine = engine();
    let id = engine.add_tool("Triangle", Vec::new(), None).expect("add triangle");
    engine.pointer_down(100.0, 100.0);
    engine.pointer_up(100.0, 100.0);

    engine.key_down(KeyCode::Escape);

    assert!(engine.tool(&id).is_none());
    assert_eq!(engine.creating_tool_id(), None);
    assert!(engine.host().pan_enabled());
}

#[test]
fn new_creation_discards_unfinished_previous_tool() {
    let mut engine = engine();
    let first = engine.add_tool("TrendLine", Vec::new(), None).expect("first");
    engine.pointer_down(100.0, 300.0);
    engine.pointer_up(100.0, 300.0);

    let second = engine.add_tool("Rectangle", Vec::new(), None).expect("second");

    assert!(engine.tool(&first).is_none());
    assert_eq!(engine.creating_tool_id(), Some(second.as_str()));
    assert_eq!(engine.tool_count(), 1);
}

#[test]
fn path_double_click_emits_path_finished_then_finished() {
    let mut engine = engine();
    let stages = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&stages);
    engine.subscribe_after_edit(move |event| sink.borrow_mut().push(event.stage));

    let id = engine.add_tool("Path", Vec::new(), None).expect("add path");
    for (x, y) in [(100.0, 100.0), (200.0, 150.0), (300.0, 120.0)] {
        engine.pointer_down(x, y);
        engine.pointer_up(x, y);
    }
    // The second press of a double click lands one more point on top of the last.
    engine.pointer_down(300.0, 120.0);
    engine.pointer_up(300.0, 120.0);
    engine.double_click(300.0, 120.0);

    let path = engine.get_by_id(&id).expect("path");
    assert_eq!(path.points.len(), 3);
    assert_eq!(
        *stages.borrow(),
        vec![AfterEditStage::PathFinished, AfterEditStage::Finished]
    );
    assert_eq!(engine.creating_tool_id(), None);
}

#[test]
fn double_click_on_settled_tool_notifies_subscribers() {
    let mut engine = engine();
    let id = engine.add_tool("TrendLine", line_points(), None).expect("add line");
    let clicked = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&clicked);
    engine.subscribe_double_click(move |event| sink.borrow_mut().push(event.tool.id.clone()));

    engine.double_click(150.0, 275.0);
    engine.double_click(600.0, 50.0);

    assert_eq!(*clicked.borrow(), vec![id]);
}

#[test]
fn double_click_reaches_settled_tool_while_another_is_being_created() {
    let mut engine = engine();
    let id = engine.add_tool("TrendLine", line_points(), None).expect("add line");
    let creating = engine.add_tool("Rectangle", Vec::new(), None).expect("creating");
    let clicked = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&clicked);
    engine.subscribe_double_click(move |event| sink.borrow_mut().push(event.tool.id.clone()));

    engine.double_click(150.0, 275.0);

    assert_eq!(*clicked.borrow(), vec![id]);
    assert_eq!(engine.creating_tool_id(), Some(creating.as_str()));
}

#[test]
fn selection_changes_reach_subscribers_until_unsubscribed() {
    let mut engine = engine();
    let id = engine.add_tool("TrendLine", line_points(), None).expect("add line");
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let subscription =
        engine.subscribe_selection_changed(move |event| sink.borrow_mut().push(event.selected.as_ref().map(|tool| tool.id.clone())));

    engine.pointer_down(150.0, 275.0);
    engine.pointer_up(150.0, 275.0);
    engine.pointer_down(600.0, 50.0);
    engine.pointer_up(600.0, 50.0);
    assert_eq!(*seen.borrow(), vec![Some(id.clone()), None]);

    assert!(engine.unsubscribe(subscription));
    assert!(!engine.unsubscribe(subscription));
    engine.pointer_down(150.0, 275.0);
    engine.pointer_up(150.0, 275.0);
    assert_eq!(seen.borrow().len(), 2);
    assert_eq!(engine.get_selected().map(|tool| tool.id), Some(id));
}

#[test]
fn programmatic_selection_rejects_unknown_and_creating_tools() {
    let mut engine = engine();
    let id = engine.add_tool("TrendLine", line_points(), None).expect("add line");
    let creating = engine.add_tool("Rectangle", Vec::new(), None).expect("creating");

    engine.select_tool(Some(id.as_str())).expect("select settled tool");
    assert_eq!(engine.selected_tool_id(), Some(id.as_str()));
    assert!(engine.tool(&id).expect("line").is_selected());

    let missing = engine.select_tool(Some("missing")).expect_err("unknown id");
    assert!(matches!(missing, OverlayError::ToolNotFound { id } if id == "missing"));
    assert!(matches!(
        engine.select_tool(Some(creating.as_str())),
        Err(OverlayError::ToolNotFound { .. })
    ));
    assert_eq!(engine.selected_tool_id(), Some(id.as_str()));

    engine.select_tool(None).expect("clear selection");
    assert_eq!(engine.selected_tool_id(), None);
}

#[test]
fn hover_over_tool_sets_pointer_cursor_and_leave_resets_it() {
    let mut engine = engine();
    let id = engine.add_tool("TrendLine", line_points(), None).expect("add line");

    engine.pointer_move(150.0, 275.0);
    assert_eq!(engine.host().cursor(), CursorStyle::Pointer);
    assert!(engine.tool(&id).expect("line").is_hovered());

    engine.pointer_leave();
    assert_eq!(engine.host().cursor(), CursorStyle::Default);
    assert!(!engine.tool(&id).expect("line").is_hovered());
}

#[test]
fn add_tool_rejects_bad_input_without_side_effects() {
    let mut engine = engine();

    let unknown = engine.add_tool("Pitchfork", Vec::new(), None).expect_err("unknown kind");
    assert!(matches!(unknown, OverlayError::UnregisteredTool { .. }));

    let partial = engine
        .add_tool("Triangle", vec![Point::new(0.0, 1.0)], None)
        .expect_err("partial triangle");
    assert!(matches!(partial, OverlayError::InvalidData(_)));

    let too_many = engine
        .add_tool("Text", vec![Point::new(0.0, 1.0), Point::new(1.0, 2.0)], None)
        .expect_err("two text anchors");
    assert!(matches!(too_many, OverlayError::InvalidData(_)));

    let non_finite = engine
        .add_tool("HorizontalLine", vec![Point::new(f64::NAN, 1.0)], None)
        .expect_err("nan point");
    assert!(matches!(non_finite, OverlayError::InvalidData(_)));

    let bad_options = engine
        .add_tool("HorizontalLine", vec![Point::new(0.0, 1.0)], Some(&json!({ "visible": "yes" })))
        .expect_err("mistyped option");
    assert!(matches!(bad_options, OverlayError::InvalidOptions(_)));

    assert_eq!(engine.tool_count(), 0);
    assert_eq!(engine.creating_tool_id(), None);
}

#[test]
fn pattern_removal_and_lookup_share_wildcard_rules() {
    let mut engine = engine();
    for id in ["trend-1", "trend-2", "note-1"] {
        let kind = if id.starts_with("note") { "Text" } else { "TrendLine" };
        let points = if kind == "Text" { vec![Point::new(600.0, 300.0)] } else { line_points() };
        engine.create_or_update_tool(kind, points, None, id).expect("create");
    }

    assert_eq!(engine.get_by_id_pattern("trend-*").len(), 2);
    assert_eq!(engine.get_by_id_pattern("note-?").len(), 1);
    assert_eq!(engine.get_by_id_pattern("-1").len(), 2);

    assert_eq!(engine.remove_tools_by_id_pattern("trend-*"), 2);
    assert_eq!(engine.tools().ids(), vec!["note-1".to_owned()]);
    assert_eq!(engine.remove_tools_by_id(&["missing"]), 0);
    assert_eq!(engine.remove_all(), 1);
    assert_eq!(engine.tool_count(), 0);
}

#[test]
fn remove_selected_only_removes_the_selection() {
    let mut engine = engine();
    let id = engine.add_tool("TrendLine", line_points(), None).expect("add line");
    assert!(!engine.remove_selected());

    engine.pointer_down(150.0, 275.0);
    engine.pointer_up(150.0, 275.0);
    assert!(engine.remove_selected());
    assert!(engine.tool(&id).is_none());
}

#[test]
fn apply_options_merges_options_and_replaces_points() {
    let mut engine = engine();
    let id = engine.add_tool("TrendLine", line_points(), None).expect("add line");

    let applied = engine
        .apply_options(&json!({
            "id": id,
            "options": { "extend_right": true, "style": { "color": "#ff0000" } },
            "points": [
                { "timestamp": 0.0, "price": 10.0 },
                { "timestamp": 60.0, "price": 20.0 }
            ]
        }))
        .expect("apply options");
    assert!(applied);

    let tool = engine.get_by_id(&id).expect("line");
    assert!(tool.options.extend_right);
    assert!(!tool.options.extend_left);
    assert_eq!(tool.options.style.get("color"), Some(&json!("#ff0000")));
    assert_eq!(tool.points, vec![Point::new(0.0, 10.0), Point::new(60.0, 20.0)]);

    let unknown = engine
        .apply_options(&json!({ "id": "missing", "options": {} }))
        .expect("unknown id is not an error");
    assert!(!unknown);

    let bad_count = engine.apply_options(&json!({
        "id": id,
        "points": [{ "timestamp": 0.0, "price": 10.0 }]
    }));
    assert!(matches!(bad_count, Err(OverlayError::InvalidData(_))));
    assert!(engine.apply_options(&json!({ "options": {} })).is_err());
}

#[test]
fn apply_options_leaves_tool_untouched_when_points_are_rejected() {
    let mut engine = engine();
    let id = engine.add_tool("TrendLine", line_points(), None).expect("add line");

    let result = engine.apply_options(&json!({
        "id": id,
        "options": { "visible": false, "extend_left": true },
        "points": [{ "timestamp": 0.0, "price": 10.0 }]
    }));

    assert!(matches!(result, Err(OverlayError::InvalidData(_))));
    let tool = engine.get_by_id(&id).expect("line");
    assert!(tool.options.visible);
    assert!(!tool.options.extend_left);
    assert_eq!(tool.points, line_points());
}

#[test]
fn apply_options_rejects_points_for_a_tool_being_created() {
    let mut engine = engine();
    let id = engine.add_tool("Rectangle", Vec::new(), None).expect("creating");

    let result = engine.apply_options(&json!({
        "id": id,
        "options": { "visible": false },
        "points": [
            { "timestamp": 0.0, "price": 10.0 },
            { "timestamp": 60.0, "price": 20.0 }
        ]
    }));

    assert!(matches!(result, Err(OverlayError::InvalidData(_))));
    assert_eq!(engine.creating_tool_id(), Some(id.as_str()));
    let tool = engine.tool(&id).expect("rectangle");
    assert!(tool.points().is_empty());
    assert!(tool.options().visible);

    let options_only = engine
        .apply_options(&json!({ "id": id, "options": { "visible": false } }))
        .expect("options apply while creating");
    assert!(options_only);
    assert!(!engine.tool(&id).expect("rectangle").options().visible);
}

#[test]
fn update_views_culls_against_the_visible_window() {
    let mut engine = engine();
    let inside = engine
        .add_tool("HorizontalLine", vec![Point::new(600.0, 105.0)], None)
        .expect("inside");
    let above = engine
        .add_tool("HorizontalLine", vec![Point::new(600.0, 700.0)], None)
        .expect("above");
    // Beyond the last visible bar but extending across the whole pane.
    let far_right = engine
        .add_tool("HorizontalLine", vec![Point::new(9_000.0, 200.0)], None)
        .expect("far right");
    let ray = engine
        .add_tool("HorizontalRay", vec![Point::new(9_000.0, 200.0)], None)
        .expect("ray");

    let frame = engine.update_views();

    let bounds = frame.viewport_bounds.expect("bounds");
    assert_relative_eq!(bounds.min_time, 0.0);
    assert_relative_eq!(bounds.max_time, 4_800.0);
    assert_relative_eq!(bounds.min_price, 0.0);
    assert_relative_eq!(bounds.max_price, 600.0);

    assert_eq!(frame.tool(&inside).expect("view").culling, CullingState::Visible);
    assert_eq!(frame.tool(&above).expect("view").culling, CullingState::OffScreenTop);
    assert_eq!(frame.tool(&far_right).expect("view").culling, CullingState::Visible);
    assert_eq!(frame.tool(&ray).expect("view").culling, CullingState::OffScreenRight);
    assert_eq!(frame.visible_tools().count(), 2);

    let inside_view = frame.tool(&inside).expect("view");
    assert_relative_eq!(inside_view.points_screen[0].x, 100.0);
    assert_relative_eq!(inside_view.points_screen[0].y, 495.0);
}

#[test]
fn update_views_stacks_price_labels_of_visible_tools() {
    let mut engine = engine();
    let upper = engine
        .add_tool("HorizontalLine", vec![Point::new(600.0, 105.0)], None)
        .expect("upper");
    let lower = engine
        .add_tool("HorizontalLine", vec![Point::new(600.0, 101.0)], None)
        .expect("lower");
    let hidden = engine
        .add_tool("HorizontalLine", vec![Point::new(600.0, 900.0)], None)
        .expect("off screen");

    let frame = engine.update_views();
    let label = |owner: &str| {
        frame
            .labels
            .price_labels
            .iter()
            .find(|label| label.owner_tool_id == owner)
            .cloned()
    };

    let upper_label = label(&upper).expect("upper label");
    let lower_label = label(&lower).expect("lower label");
    assert_relative_eq!(upper_label.top(), 485.0);
    assert_eq!(upper_label.resolved_top, None);
    assert_relative_eq!(lower_label.desired_top, 489.0);
    assert_relative_eq!(lower_label.top(), 505.0);
    assert_eq!(lower_label.text, "101.00");
    assert!(label(&hidden).is_none());
    // Horizontal lines carry no time label.
    assert!(frame.labels.time_labels.is_empty());

    engine.remove_tools_by_id(&[upper.as_str()]);
    let frame = engine.update_views();
    let lower_label = frame
        .labels
        .price_labels
        .iter()
        .find(|label| label.owner_tool_id == lower)
        .expect("lower label");
    assert_eq!(lower_label.resolved_top, None);
}

#[test]
fn set_config_validates_before_applying() {
    let mut engine = engine();
    let invalid = OverlayConfig::default().with_drag_threshold(-1.0);
    assert!(matches!(engine.set_config(invalid), Err(OverlayError::InvalidConfig(_))));
    assert_relative_eq!(engine.config().drag_threshold_px, 3.0);

    engine
        .set_config(OverlayConfig::default().with_drag_threshold(10.0))
        .expect("valid config");
    assert_relative_eq!(engine.interaction().config().drag_threshold_px, 10.0);
}

#[test]
fn crosshair_passes_through_to_host() {
    let mut engine = engine();
    engine.set_crosshair_at(120.0, 80.0, true);
    assert_eq!(engine.host().crosshair(), Some((120.0, 80.0, true)));
    engine.clear_crosshair();
    assert_eq!(engine.host().crosshair(), None);
}
