use smallvec::{SmallVec, smallvec};

use crate::core::{Point, ScreenPoint};
use crate::culling::{CullingOptions, CullingSegment, ExtendOptions};
use crate::host::CursorStyle;
use crate::tools::behavior::{CullingGeometry, HitTestContext, ShiftConstrainable, ToolBehavior};
use crate::tools::hit_test::{anchor_hit, near_line, neighbour_index, polygon_hit, snap_axis_aligned};
use crate::tools::options::ToolOptions;
use crate::tools::types::{
    ConstrainedPoint, ConstraintPhase, HitTestResult, HitTestType, PointsCount, ToolCapabilities,
    ToolType,
};

/// Base line `p0 -> p1` plus a parallel copy offset by the third point.
///
/// Once normalized, `p2` sits at `(t0, p0 + h)`; anchor 3 is the virtual end
/// of the parallel line at `(t1, p1 + h)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParallelChannelTool;

/// Price of the base line at `time`.
fn base_price_at(p0: Point, p1: Point, time: f64) -> f64 {
    let span = p1.timestamp - p0.timestamp;
    if span.abs() < f64::EPSILON {
        return p0.price;
    }
    p0.price + (p1.price - p0.price) * (time - p0.timestamp) / span
}

/// Vertical offset of the parallel line.
fn channel_height(p0: Point, p1: Point, p2: Point) -> f64 {
    p2.price - base_price_at(p0, p1, p2.timestamp)
}

impl ToolBehavior for ParallelChannelTool {
    fn tool_type(&self) -> ToolType {
        ToolType::ParallelChannel
    }

    fn points_count(&self) -> PointsCount {
        PointsCount::Fixed(3)
    }

    fn capabilities(&self) -> ToolCapabilities {
        ToolCapabilities {
            shift_constraint_on_click_click: true,
            max_anchor_index: Some(3),
            ..ToolCapabilities::default()
        }
    }

    fn shift_constraint(&self) -> Option<&dyn ShiftConstrainable> {
        Some(self)
    }

    fn anchors(&self, points: &[Point]) -> SmallVec<[Point; 4]> {
        match points {
            [p0, p1, p2] => {
                let height = channel_height(*p0, *p1, *p2);
                smallvec![
                    *p0,
                    *p1,
                    Point::new(p0.timestamp, p0.price + height),
                    Point::new(p1.timestamp, p1.price + height),
                ]
            }
            _ => SmallVec::from_slice(points),
        }
    }

    fn move_anchor(&self, points: &mut Vec<Point>, original: &[Point], anchor_index: usize, target: Point) -> bool {
        let [o0, o1, o2] = original else {
            return match points.get_mut(anchor_index) {
                Some(point) => {
                    *point = target;
                    true
                }
                None => false,
            };
        };
        let height = channel_height(*o0, *o1, *o2);
        let (mut p0, mut p1) = (*o0, *o1);
        let height = match anchor_index {
            0 => {
                p0 = target;
                height
            }
            1 => {
                p1 = target;
                height
            }
            2 | 3 => target.price - base_price_at(p0, p1, target.timestamp),
            _ => return false,
        };
        *points = vec![p0, p1, Point::new(p0.timestamp, p0.price + height)];
        true
    }

    fn hit_test(&self, context: &HitTestContext<'_>) -> Option<HitTestResult> {
        if let Some(mut hit) = anchor_hit(context) {
            if hit.data.point_index.is_some_and(|index| index >= 2) {
                hit.hit_type = HitTestType::ChangePoint;
                hit.data.suggested_cursor = Some(CursorStyle::NsResize);
            }
            return Some(hit);
        }
        let extend = (context.options.extend_left, context.options.extend_right);
        match context.anchors {
            [a0, a1, a2, a3] => {
                if near_line(context, *a0, *a1, extend.0, extend.1)
                    || near_line(context, *a2, *a3, extend.0, extend.1)
                {
                    return Some(HitTestResult::body(
                        HitTestType::Regular,
                        None,
                    ));
                }
                polygon_hit(context, &[*a0, *a1, *a3, *a2])
            }
            [a0, a1] => near_line(context, *a0, *a1, extend.0, extend.1).then(|| {
                HitTestResult::body(HitTestType::Regular, None)
            }),
            _ => None,
        }
    }

    fn culling_geometry(&self, points: &[Point], options: &ToolOptions) -> CullingGeometry {
        let extend = ExtendOptions::new(options.extend_left, options.extend_right);
        let anchors = self.anchors(points);
        let culling = match anchors.as_slice() {
            [p0, p1, p2, p3] => CullingOptions::default().with_sub_segments(vec![
                CullingSegment::new(*p0, *p1, extend),
                CullingSegment::new(*p2, *p3, extend),
            ]),
            _ if extend.any() => CullingOptions::default().with_extend(extend),
            _ => CullingOptions::default(),
        };
        CullingGeometry {
            points: anchors.to_vec(),
            options: culling,
        }
    }

    fn normalize(&self, points: &mut Vec<Point>) {
        if let [p0, p1, p2] = points.as_mut_slice() {
            let height = channel_height(*p0, *p1, *p2);
            *p2 = Point::new(p0.timestamp, p0.price + height);
        }
    }
}

impl ShiftConstrainable for ParallelChannelTool {
    /// Base-line anchors snap level or vertical; width anchors are free.
    fn constrain(
        &self,
        anchor_index: usize,
        raw: ScreenPoint,
        _phase: ConstraintPhase,
        _original: Option<ScreenPoint>,
        references: &[ScreenPoint],
    ) -> ConstrainedPoint {
        if anchor_index > 1 {
            return ConstrainedPoint::unconstrained(raw);
        }
        match neighbour_index(anchor_index, references.len().min(2)) {
            Some(index) => snap_axis_aligned(raw, references[index], index),
            None => ConstrainedPoint::unconstrained(raw),
        }
    }
}
