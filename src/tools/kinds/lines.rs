use crate::core::{Point, ScreenPoint};
use crate::culling::{CullingOptions, ExtendOptions};
use crate::tools::behavior::{CullingGeometry, HitTestContext, ShiftConstrainable, ToolBehavior};
use crate::tools::hit_test::{anchor_hit, near_line, neighbour_index, snap_axis_aligned};
use crate::tools::options::ToolOptions;
use crate::tools::types::{
    ConstrainedPoint, ConstraintPhase, HitTestResult, HitTestType, PointsCount, ToolCapabilities,
    ToolType,
};

/// Two-anchor straight lines: trend line, ray, extended line and arrow.
#[derive(Debug, Clone, Copy)]
pub struct LineTool {
    tool_type: ToolType,
}

impl LineTool {
    #[must_use]
    pub fn new(tool_type: ToolType) -> Self {
        Self { tool_type }
    }
}

impl ToolBehavior for LineTool {
    fn tool_type(&self) -> ToolType {
        self.tool_type
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

    fn default_options(&self) -> ToolOptions {
        let options = ToolOptions::default();
        match self.tool_type {
            ToolType::Ray => options.with_extend(false, true),
            ToolType::ExtendedLine => options.with_extend(true, true),
            _ => options,
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
        near_line(
            context,
            *p0,
            *p1,
            context.options.extend_left,
            context.options.extend_right,
        )
        .then(|| HitTestResult::body(HitTestType::Regular, None))
    }

    fn culling_geometry(&self, points: &[Point], options: &ToolOptions) -> CullingGeometry {
        let extend = ExtendOptions::new(options.extend_left, options.extend_right);
        let culling = if extend.any() {
            CullingOptions::default().with_extend(extend)
        } else {
            CullingOptions::default()
        };
        CullingGeometry {
            points: points.to_vec(),
            options: culling,
        }
    }
}

impl ShiftConstrainable for LineTool {
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
