use smallvec::{SmallVec, smallvec};

use crate::core::{BoxBounds, Point, ScreenPoint};
use crate::tools::behavior::{HitTestContext, ShiftConstrainable, ToolBehavior};
use crate::tools::hit_test::{anchor_hit, box_hit, polygon_hit};
use crate::tools::types::{
    ConstrainedPoint, ConstraintPhase, HitTestResult, PointsCount, ToolCapabilities, ToolType,
};

/// Axis-aligned box stored as two opposite corners.
///
/// Anchors 2 and 3 are the virtual corners `(t0, p1)` and `(t1, p0)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RectangleTool;

impl RectangleTool {
    /// Anchor diagonally opposite `anchor_index`.
    fn opposite(anchor_index: usize) -> usize {
        match anchor_index {
            0 => 1,
            1 => 0,
            2 => 3,
            _ => 2,
        }
    }
}

impl ToolBehavior for RectangleTool {
    fn tool_type(&self) -> ToolType {
        ToolType::Rectangle
    }

    fn points_count(&self) -> PointsCount {
        PointsCount::Fixed(2)
    }

    fn capabilities(&self) -> ToolCapabilities {
        ToolCapabilities {
            click_click_creation: true,
            click_drag_creation: true,
            shift_constraint_on_click_click: true,
            shift_constraint_on_click_drag: true,
            max_anchor_index: Some(3),
            ..ToolCapabilities::default()
        }
    }

    fn shift_constraint(&self) -> Option<&dyn ShiftConstrainable> {
        Some(self)
    }

    fn anchors(&self, points: &[Point]) -> SmallVec<[Point; 4]> {
        match points {
            [p0, p1] => smallvec![
                *p0,
                *p1,
                Point::new(p0.timestamp, p1.price),
                Point::new(p1.timestamp, p0.price),
            ],
            _ => SmallVec::from_slice(points),
        }
    }

    fn move_anchor(&self, points: &mut Vec<Point>, _original: &[Point], anchor_index: usize, target: Point) -> bool {
        if points.len() != 2 {
            return match points.get_mut(anchor_index) {
                Some(point) => {
                    *point = target;
                    true
                }
                None => false,
            };
        }
        let (head, tail) = points.split_at_mut(1);
        let (p0, p1) = (&mut head[0], &mut tail[0]);
        match anchor_index {
            0 => *p0 = target,
            1 => *p1 = target,
            2 => {
                p0.timestamp = target.timestamp;
                p1.price = target.price;
            }
            3 => {
                p1.timestamp = target.timestamp;
                p0.price = target.price;
            }
            _ => return false,
        }
        true
    }

    fn hit_test(&self, context: &HitTestContext<'_>) -> Option<HitTestResult> {
        if let Some(hit) = anchor_hit(context) {
            return Some(hit);
        }
        let [a, b] = context.points else {
            return None;
        };
        box_hit(context, BoxBounds::new(*a, *b))
    }
}

impl ShiftConstrainable for RectangleTool {
    /// Squares the box in pixels around the opposite corner.
    fn constrain(
        &self,
        anchor_index: usize,
        raw: ScreenPoint,
        _phase: ConstraintPhase,
        _original: Option<ScreenPoint>,
        references: &[ScreenPoint],
    ) -> ConstrainedPoint {
        let Some(opposite) = references.get(Self::opposite(anchor_index)) else {
            return ConstrainedPoint::unconstrained(raw);
        };
        let delta = raw - *opposite;
        let side = delta.x.abs().max(delta.y.abs());
        let squared = ScreenPoint::new(
            opposite.x + side.copysign(delta.x),
            opposite.y + side.copysign(delta.y),
        );
        ConstrainedPoint::unconstrained(squared)
    }
}

/// Three-vertex polygon.
#[derive(Debug, Clone, Copy, Default)]
pub struct TriangleTool;

impl ToolBehavior for TriangleTool {
    fn tool_type(&self) -> ToolType {
        ToolType::Triangle
    }

    fn points_count(&self) -> PointsCount {
        PointsCount::Fixed(3)
    }

    fn capabilities(&self) -> ToolCapabilities {
        ToolCapabilities::default()
    }

    fn hit_test(&self, context: &HitTestContext<'_>) -> Option<HitTestResult> {
        if let Some(hit) = anchor_hit(context) {
            return Some(hit);
        }
        if context.points.len() < 2 {
            return None;
        }
        polygon_hit(context, context.points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::types::HitTestType;

    #[test]
    fn virtual_corner_moves_both_stored_points() {
        let tool = RectangleTool;
        let mut points = vec![Point::new(0.0, 10.0), Point::new(100.0, 20.0)];
        let original = points.clone();
        assert!(tool.move_anchor(&mut points, &original, 2, Point::new(5.0, 25.0)));
        assert_eq!(points, vec![Point::new(5.0, 10.0), Point::new(100.0, 25.0)]);
        assert!(tool.move_anchor(&mut points, &original, 3, Point::new(90.0, 8.0)));
        assert_eq!(points, vec![Point::new(5.0, 8.0), Point::new(90.0, 25.0)]);
        assert!(!tool.move_anchor(&mut points, &original, 4, Point::new(0.0, 0.0)));
    }

    #[test]
    fn anchors_expose_four_corners() {
        let anchors = RectangleTool.anchors(&[Point::new(0.0, 10.0), Point::new(100.0, 20.0)]);
        assert_eq!(anchors.len(), 4);
        assert_eq!(anchors[2], Point::new(0.0, 20.0));
        assert_eq!(anchors[3], Point::new(100.0, 10.0));
    }

    #[test]
    fn shift_makes_a_square_in_pixels() {
        let constrained = RectangleTool.constrain(
            1,
            ScreenPoint::new(160.0, 130.0),
            ConstraintPhase::ClickDrag,
            None,
            &[ScreenPoint::new(100.0, 100.0)],
        );
        assert_eq!(constrained.screen, ScreenPoint::new(160.0, 160.0));
        let upward = RectangleTool.constrain(
            1,
            ScreenPoint::new(120.0, 40.0),
            ConstraintPhase::ClickDrag,
            None,
            &[ScreenPoint::new(100.0, 100.0)],
        );
        assert_eq!(upward.screen, ScreenPoint::new(160.0, 40.0));
    }

    #[test]
    fn triangle_interior_is_background() {
        let options = crate::tools::options::ToolOptions::default();
        let points = [
            ScreenPoint::new(0.0, 0.0),
            ScreenPoint::new(200.0, 0.0),
            ScreenPoint::new(100.0, 200.0),
        ];
        let context = HitTestContext {
            points: &points,
            anchors: &points,
            options: &options,
            pointer: ScreenPoint::new(100.0, 50.0),
            tolerance_px: 4.0,
            anchor_radius_px: 6.0,
            pane_width: 800.0,
            pane_height: 600.0,
        };
        let hit = TriangleTool.hit_test(&context).expect("inside");
        assert_eq!(hit.hit_type, HitTestType::MovePointBackground);
    }
}
