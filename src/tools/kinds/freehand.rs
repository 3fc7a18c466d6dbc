use smallvec::SmallVec;

use crate::core::{Point, ScreenPoint};
use crate::culling::{CullingOptions, CullingSegment, ExtendOptions};
use crate::tools::behavior::{CullingGeometry, HitTestContext, ShiftConstrainable, ToolBehavior};
use crate::tools::hit_test::{anchor_hit, near_polyline, neighbour_index, snap_axis_aligned};
use crate::tools::options::ToolOptions;
use crate::tools::types::{
    ConstrainedPoint, ConstraintPhase, FinalizationMethod, HitTestResult, HitTestType, PointsCount,
    ToolCapabilities, ToolType,
};

fn polyline_culling(points: &[Point]) -> CullingGeometry {
    let options = if points.len() >= 3 {
        CullingOptions::default().with_sub_segments(
            points
                .windows(2)
                .map(|pair| CullingSegment::new(pair[0], pair[1], ExtendOptions::default()))
                .collect(),
        )
    } else {
        CullingOptions::default()
    };
    CullingGeometry {
        points: points.to_vec(),
        options,
    }
}

/// Click-by-click polyline finished with a double click.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathTool;

impl ToolBehavior for PathTool {
    fn tool_type(&self) -> ToolType {
        ToolType::Path
    }

    fn points_count(&self) -> PointsCount {
        PointsCount::Unbounded
    }

    fn capabilities(&self) -> ToolCapabilities {
        ToolCapabilities {
            shift_constraint_on_click_click: true,
            finalization: FinalizationMethod::DoubleClick,
            discards_rogue_point_on_double_click: true,
            ..ToolCapabilities::default()
        }
    }

    fn shift_constraint(&self) -> Option<&dyn ShiftConstrainable> {
        Some(self)
    }

    fn hit_test(&self, context: &HitTestContext<'_>) -> Option<HitTestResult> {
        if let Some(hit) = anchor_hit(context) {
            return Some(hit);
        }
        near_polyline(context, context.points).then(|| HitTestResult::body(HitTestType::Regular, None))
    }

    fn culling_geometry(&self, points: &[Point], _options: &ToolOptions) -> CullingGeometry {
        polyline_culling(points)
    }
}

impl ShiftConstrainable for PathTool {
    /// Snaps each segment level or vertical relative to the previous vertex.
    fn constrain(
        &self,
        anchor_index: usize,
        raw: ScreenPoint,
        _phase: ConstraintPhase,
        _original: Option<ScreenPoint>,
        references: &[ScreenPoint],
    ) -> ConstrainedPoint {
        match neighbour_index(anchor_index, references.len()) {
            Some(index) => snap_axis_aligned(raw, references[index], index),
            None => ConstrainedPoint::unconstrained(raw),
        }
    }
}

/// Freehand stroke sampled while dragging; releasing the button finishes it.
///
/// The stroke has a single handle on its first sample, and dragging that
/// handle moves the whole stroke.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrushTool;

impl ToolBehavior for BrushTool {
    fn tool_type(&self) -> ToolType {
        ToolType::Brush
    }

    fn points_count(&self) -> PointsCount {
        PointsCount::Unbounded
    }

    fn capabilities(&self) -> ToolCapabilities {
        ToolCapabilities {
            click_click_creation: false,
            click_drag_creation: true,
            finalization: FinalizationMethod::ReleaseOnDrag,
            max_anchor_index: Some(0),
            anchor0_triggers_translation: true,
            ..ToolCapabilities::default()
        }
    }

    fn default_options(&self) -> ToolOptions {
        ToolOptions::default().with_axis_labels(false, false)
    }

    fn anchors(&self, points: &[Point]) -> SmallVec<[Point; 4]> {
        points.iter().take(1).copied().collect()
    }

    fn hit_test(&self, context: &HitTestContext<'_>) -> Option<HitTestResult> {
        if let Some(hit) = anchor_hit(context) {
            return Some(hit);
        }
        near_polyline(context, context.points).then(|| HitTestResult::body(HitTestType::Regular, None))
    }

    fn culling_geometry(&self, points: &[Point], _options: &ToolOptions) -> CullingGeometry {
        polyline_culling(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ViewportBounds;
    use crate::culling::{CullingState, culling_state};

    #[test]
    fn brush_exposes_only_first_anchor() {
        let points = [Point::new(0.0, 1.0), Point::new(1.0, 2.0), Point::new(2.0, 3.0)];
        assert_eq!(BrushTool.anchors(&points).as_slice(), &points[..1]);
        assert!(BrushTool.capabilities().anchor0_triggers_translation);
    }

    #[test]
    fn thin_stroke_is_not_culled_by_its_hull() {
        // A V-shaped stroke whose hull covers the viewport but no segment does.
        let points = [Point::new(0.0, 0.0), Point::new(50.0, 100.0), Point::new(100.0, 0.0)];
        let geometry = PathTool.culling_geometry(&points, &ToolOptions::default());
        let bounds = ViewportBounds::new(45.0, 55.0, 10.0, 20.0);
        assert_eq!(
            culling_state(&geometry.points, bounds, &geometry.options),
            CullingState::FullyOffScreen
        );
    }

    #[test]
    fn path_finishes_on_double_click_and_drops_rogue_points() {
        let capabilities = PathTool.capabilities();
        assert_eq!(capabilities.finalization, FinalizationMethod::DoubleClick);
        assert!(capabilities.discards_rogue_point_on_double_click);
    }
}
