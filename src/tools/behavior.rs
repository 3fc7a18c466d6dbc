use std::fmt;

use smallvec::SmallVec;

use crate::core::{Point, ScreenPoint};
use crate::culling::CullingOptions;
use crate::tools::options::ToolOptions;
use crate::tools::types::{
    ConstrainedPoint, ConstraintPhase, HitTestResult, PointsCount, ToolCapabilities, ToolType,
};

/// Screen-space inputs for one hit test.
#[derive(Debug, Clone, Copy)]
pub struct HitTestContext<'a> {
    /// Permanent points in pixels, in point order.
    pub points: &'a [ScreenPoint],
    /// Interactive anchors in pixels, virtual anchors included.
    pub anchors: &'a [ScreenPoint],
    pub options: &'a ToolOptions,
    pub pointer: ScreenPoint,
    pub tolerance_px: f64,
    pub anchor_radius_px: f64,
    pub pane_width: f64,
    pub pane_height: f64,
}

/// Logical points plus culling options handed to the culling engine.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CullingGeometry {
    pub points: Vec<Point>,
    pub options: CullingOptions,
}

/// Per-kind geometry and capabilities.
///
/// One implementation per tool kind; instances hold a boxed behavior next to
/// their point and option state.
pub trait ToolBehavior: fmt::Debug {
    fn tool_type(&self) -> ToolType;

    fn points_count(&self) -> PointsCount;

    fn capabilities(&self) -> ToolCapabilities;

    fn default_options(&self) -> ToolOptions {
        ToolOptions::default()
    }

    fn shift_constraint(&self) -> Option<&dyn ShiftConstrainable> {
        None
    }

    /// Interactive anchors; kinds with virtual handles append them after the points.
    fn anchors(&self, points: &[Point]) -> SmallVec<[Point; 4]> {
        SmallVec::from_slice(points)
    }

    /// Moves one anchor to `target`. `original` is the point set at gesture start.
    ///
    /// Returns `false` when the anchor does not exist.
    fn move_anchor(&self, points: &mut Vec<Point>, _original: &[Point], anchor_index: usize, target: Point) -> bool {
        match points.get_mut(anchor_index) {
            Some(point) => {
                *point = target;
                true
            }
            None => false,
        }
    }

    fn hit_test(&self, context: &HitTestContext<'_>) -> Option<HitTestResult>;

    fn culling_geometry(&self, points: &[Point], _options: &ToolOptions) -> CullingGeometry {
        CullingGeometry {
            points: points.to_vec(),
            options: CullingOptions::default(),
        }
    }

    /// Post-creation cleanup of the kind's own points.
    fn normalize(&self, _points: &mut Vec<Point>) {}
}

/// Capability of kinds that support shift-key geometric constraints.
pub trait ShiftConstrainable {
    /// Constrains the raw pointer for `anchor_index`.
    ///
    /// `references` are the other anchors in pixels (the points placed so far
    /// during creation, the gesture-start anchors during edits). `original`
    /// is the dragged anchor's own position at gesture start, when editing.
    fn constrain(
        &self,
        anchor_index: usize,
        raw: ScreenPoint,
        phase: ConstraintPhase,
        original: Option<ScreenPoint>,
        references: &[ScreenPoint],
    ) -> ConstrainedPoint;
}
