use crate::core::Point;
use crate::culling::{CullingOptions, SinglePointOrientation};
use crate::host::CursorStyle;
use crate::tools::behavior::{CullingGeometry, HitTestContext, ToolBehavior};
use crate::tools::hit_test::anchor_hit;
use crate::tools::options::ToolOptions;
use crate::tools::types::{HitTestResult, HitTestType, PointsCount, ToolCapabilities, ToolType};

/// One-anchor lines spanning the pane along an axis.
#[derive(Debug, Clone, Copy)]
pub struct AxisLineTool {
    tool_type: ToolType,
}

impl AxisLineTool {
    #[must_use]
    pub fn new(tool_type: ToolType) -> Self {
        Self { tool_type }
    }

    fn orientation(self) -> SinglePointOrientation {
        match self.tool_type {
            ToolType::HorizontalRay => SinglePointOrientation::horizontal(false, true),
            ToolType::VerticalLine => SinglePointOrientation::vertical(true, true),
            ToolType::CrossLine => SinglePointOrientation::cross(),
            _ => SinglePointOrientation::horizontal(true, true),
        }
    }
}

impl ToolBehavior for AxisLineTool {
    fn tool_type(&self) -> ToolType {
        self.tool_type
    }

    fn points_count(&self) -> PointsCount {
        PointsCount::Fixed(1)
    }

    fn capabilities(&self) -> ToolCapabilities {
        ToolCapabilities::default()
    }

    fn default_options(&self) -> ToolOptions {
        let options = ToolOptions::default();
        match self.tool_type {
            ToolType::HorizontalLine | ToolType::HorizontalRay => options.with_axis_labels(true, false),
            ToolType::VerticalLine => options.with_axis_labels(false, true),
            _ => options,
        }
    }

    fn hit_test(&self, context: &HitTestContext<'_>) -> Option<HitTestResult> {
        if let Some(hit) = anchor_hit(context) {
            return Some(hit);
        }
        let anchor = context.points.first()?;
        let pointer = context.pointer;
        let tolerance = context.tolerance_px;
        let orientation = self.orientation();

        let on_horizontal = orientation.horizontal.is_some_and(|extend| {
            (pointer.y - anchor.y).abs() <= tolerance
                && (extend.left || pointer.x >= anchor.x - tolerance)
                && (extend.right || pointer.x <= anchor.x + tolerance)
        });
        let on_vertical = orientation.vertical.is_some_and(|extend| {
            (pointer.x - anchor.x).abs() <= tolerance
                && (extend.up || pointer.y >= anchor.y - tolerance)
                && (extend.down || pointer.y <= anchor.y + tolerance)
        });

        let cursor = match (on_horizontal, on_vertical) {
            (true, true) => CursorStyle::Move,
            (true, false) => CursorStyle::NsResize,
            (false, true) => CursorStyle::EwResize,
            (false, false) => return None,
        };
        Some(HitTestResult::body(HitTestType::Regular, Some(cursor)))
    }

    fn culling_geometry(&self, points: &[Point], _options: &ToolOptions) -> CullingGeometry {
        CullingGeometry {
            points: points.to_vec(),
            options: CullingOptions::default().with_single_point(self.orientation()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ScreenPoint;

    fn hit(tool_type: ToolType, pointer: ScreenPoint) -> Option<HitTestResult> {
        let options = ToolOptions::default();
        let points = [ScreenPoint::new(400.0, 300.0)];
        let context = HitTestContext {
            points: &points,
            anchors: &points,
            options: &options,
            pointer,
            tolerance_px: 4.0,
            anchor_radius_px: 6.0,
            pane_width: 800.0,
            pane_height: 600.0,
        };
        AxisLineTool::new(tool_type).hit_test(&context)
    }

    #[test]
    fn horizontal_line_spans_the_pane() {
        assert!(hit(ToolType::HorizontalLine, ScreenPoint::new(10.0, 302.0)).is_some());
        assert!(hit(ToolType::HorizontalLine, ScreenPoint::new(10.0, 320.0)).is_none());
    }

    #[test]
    fn horizontal_ray_only_extends_right() {
        assert!(hit(ToolType::HorizontalRay, ScreenPoint::new(790.0, 300.0)).is_some());
        assert!(hit(ToolType::HorizontalRay, ScreenPoint::new(10.0, 300.0)).is_none());
    }

    #[test]
    fn cross_line_hits_both_axes() {
        assert!(hit(ToolType::CrossLine, ScreenPoint::new(400.0, 10.0)).is_some());
        assert!(hit(ToolType::CrossLine, ScreenPoint::new(10.0, 300.0)).is_some());
        let anchor = hit(ToolType::CrossLine, ScreenPoint::new(401.0, 301.0)).expect("anchor");
        assert_eq!(anchor.anchor_index(), Some(0));
    }

    #[test]
    fn vertical_line_shows_only_time_label() {
        let options = AxisLineTool::new(ToolType::VerticalLine).default_options();
        assert!(!options.show_price_axis_labels);
        assert!(options.show_time_axis_labels);
    }
}
