use crate::core::{Point, ScreenPoint};
use crate::culling::{CullingOptions, CullingSegment, ExtendOptions};
use crate::tools::behavior::{CullingGeometry, HitTestContext, ShiftConstrainable, ToolBehavior};
use crate::tools::hit_test::{anchor_hit, near_line, neighbour_index, snap_axis_aligned};
use crate::tools::options::ToolOptions;
use crate::tools::types::{
    ConstrainedPoint, ConstraintPhase, HitTestResult, HitTestType, PointsCount, ToolCapabilities,
    ToolType,
};

pub const FIB_LEVELS: [f64; 7] = [0.0, 0.236, 0.382, 0.5, 0.618, 0.786, 1.0];

/// Price of a retracement level; level 0 sits on the second anchor, level 1 on the first.
#[must_use]
pub fn fib_level_price(p0: Point, p1: Point, level: f64) -> f64 {
    p1.price + (p0.price - p1.price) * level
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FibRetracementTool;

impl ToolBehavior for FibRetracementTool {
    fn tool_type(&self) -> ToolType {
        ToolType::FibRetracement
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
        let [p0, p1] = context.points else {
            return None;
        };
        if near_line(context, *p0, *p1, false, false) {
            return Some(HitTestResult::body(HitTestType::Regular, None));
        }
        let (left, right) = (p0.x.min(p1.x), p0.x.max(p1.x));
        let on_level = FIB_LEVELS.iter().any(|level| {
            let y = p1.y + (p0.y - p1.y) * level;
            near_line(
                context,
                ScreenPoint::new(left, y),
                ScreenPoint::new(right, y),
                context.options.extend_left,
                context.options.extend_right,
            )
        });
        on_level.then(|| HitTestResult::body(HitTestType::Regular, None))
    }

    fn culling_geometry(&self, points: &[Point], options: &ToolOptions) -> CullingGeometry {
        let [p0, p1] = points else {
            return CullingGeometry {
                points: points.to_vec(),
                options: CullingOptions::default(),
            };
        };
        let extend = ExtendOptions::new(options.extend_left, options.extend_right);
        let mut segments: Vec<CullingSegment> = FIB_LEVELS
            .iter()
            .map(|level| {
                let price = fib_level_price(*p0, *p1, *level);
                CullingSegment::new(
                    Point::new(p0.timestamp, price),
                    Point::new(p1.timestamp, price),
                    extend,
                )
            })
            .collect();
        segments.push(CullingSegment::new(*p0, *p1, ExtendOptions::default()));
        CullingGeometry {
            points: vec![
                *p0,
                Point::new(p1.timestamp, p0.price),
                *p1,
                Point::new(p0.timestamp, p1.price),
            ],
            options: CullingOptions::default().with_sub_segments(segments),
        }
    }
}

impl ShiftConstrainable for FibRetracementTool {
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
