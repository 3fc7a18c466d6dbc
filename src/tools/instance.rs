use serde_json::Value;
use smallvec::SmallVec;
use tracing::{debug, trace, warn};

use crate::core::{CoordinateConverter, Point, ScreenPoint, ViewportBounds};
use crate::culling::{CullingState, culling_state};
use crate::error::OverlayResult;
use crate::host::ChartHost;
use crate::tools::behavior::{HitTestContext, ShiftConstrainable, ToolBehavior};
use crate::tools::options::ToolOptions;
use crate::tools::types::{HitTestResult, PointsCount, ToolCapabilities, ToolExport, ToolType};

/// One placed (or being placed) annotation.
///
/// Lifecycle: `creating` until the point quota is met (or an explicit path
/// completion for unbounded kinds), then `selected`/`editing`/`hovered` flags
/// toggle under the interaction manager until `destroy`.
#[derive(Debug)]
pub struct ToolInstance {
    id: String,
    kind: String,
    behavior: Box<dyn ToolBehavior>,
    capabilities: ToolCapabilities,
    points: Vec<Point>,
    ghost: Option<Point>,
    options: ToolOptions,
    selected: bool,
    hovered: bool,
    editing: bool,
    creating: bool,
    path_complete: bool,
    destroyed: bool,
}

impl ToolInstance {
    pub(crate) fn new(
        id: String,
        kind: String,
        behavior: Box<dyn ToolBehavior>,
        capabilities: ToolCapabilities,
    ) -> Self {
        let options = behavior.default_options();
        Self {
            id,
            kind,
            behavior,
            capabilities,
            points: Vec::new(),
            ghost: None,
            options,
            selected: false,
            hovered: false,
            editing: false,
            creating: false,
            path_complete: false,
            destroyed: false,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    #[must_use]
    pub fn tool_type(&self) -> ToolType {
        self.behavior.tool_type()
    }

    #[must_use]
    pub fn points_count(&self) -> PointsCount {
        self.behavior.points_count()
    }

    #[must_use]
    pub fn capabilities(&self) -> ToolCapabilities {
        self.capabilities
    }

    #[must_use]
    pub fn shift_constraint(&self) -> Option<&dyn ShiftConstrainable> {
        self.behavior.shift_constraint()
    }

    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    #[must_use]
    pub fn point(&self, index: usize) -> Option<Point> {
        self.points.get(index).copied()
    }

    #[must_use]
    pub fn ghost_point(&self) -> Option<Point> {
        self.ghost
    }

    /// Permanent points followed by the ghost point, if any.
    #[must_use]
    pub fn points_with_ghost(&self) -> SmallVec<[Point; 4]> {
        let mut points: SmallVec<[Point; 4]> = SmallVec::from_slice(&self.points);
        if let Some(ghost) = self.ghost {
            points.push(ghost);
        }
        points
    }

    #[must_use]
    pub fn options(&self) -> &ToolOptions {
        &self.options
    }

    #[must_use]
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    #[must_use]
    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    #[must_use]
    pub fn is_editing(&self) -> bool {
        self.editing
    }

    #[must_use]
    pub fn is_creating(&self) -> bool {
        self.creating
    }

    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub(crate) fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    pub(crate) fn set_hovered(&mut self, hovered: bool) {
        self.hovered = hovered;
    }

    pub(crate) fn set_editing(&mut self, editing: bool) {
        self.editing = editing;
    }

    pub(crate) fn begin_creation(&mut self) {
        self.creating = true;
        self.path_complete = false;
    }

    /// Appends a permanent point. Returns `false` when the quota is already met.
    pub fn add_point(&mut self, point: Point) -> bool {
        if self.destroyed {
            warn!(tool_id = %self.id, "add_point on destroyed tool ignored");
            return false;
        }
        if !point.is_finite() {
            trace!(tool_id = %self.id, "non-finite point skipped");
            return false;
        }
        if !self.points_count().has_room_for(self.points.len()) {
            debug!(tool_id = %self.id, "point quota reached, add_point ignored");
            return false;
        }
        self.points.push(point);
        true
    }

    pub fn set_point(&mut self, index: usize, point: Point) -> bool {
        if !point.is_finite() {
            return false;
        }
        match self.points.get_mut(index) {
            Some(slot) => {
                *slot = point;
                true
            }
            None => {
                debug!(tool_id = %self.id, index, "set_point out of range ignored");
                false
            }
        }
    }

    /// Bulk replacement used for whole-tool translation and restores.
    ///
    /// Extra points beyond a fixed quota are dropped.
    pub fn set_points(&mut self, mut points: Vec<Point>) {
        if let Some(limit) = self.points_count().limit() {
            if points.len() > limit {
                debug!(tool_id = %self.id, limit, given = points.len(), "truncating points to quota");
                points.truncate(limit);
            }
        }
        points.retain(|point| point.is_finite());
        self.points = points;
    }

    pub(crate) fn remove_last_point(&mut self) -> Option<Point> {
        self.points.pop()
    }

    /// Sets or clears the transient ghost point.
    pub fn set_last_point(&mut self, ghost: Option<Point>) {
        self.ghost = ghost.filter(|point| point.is_finite());
    }

    pub fn apply_options(&mut self, partial: &Value) -> OverlayResult<()> {
        self.options.merge_json(partial)
    }

    /// Wholesale replacement, used when restoring exported state.
    pub(crate) fn set_options(&mut self, options: ToolOptions) {
        self.options = options;
    }

    /// Marks an unbounded path as complete, making it eligible to finish.
    pub(crate) fn complete_path(&mut self) {
        self.path_complete = true;
    }

    /// Ghost points never count towards completion.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        match self.points_count() {
            PointsCount::Fixed(count) => self.points.len() == count,
            PointsCount::Unbounded => self.path_complete && !self.points.is_empty(),
        }
    }

    /// Leaves the creating state if the tool is finished. Idempotent.
    pub fn try_finish(&mut self) -> bool {
        if !self.creating || !self.is_finished() {
            return false;
        }
        self.creating = false;
        self.ghost = None;
        debug!(tool_id = %self.id, kind = %self.kind, "tool finished");
        true
    }

    #[must_use]
    pub fn export_data(&self) -> ToolExport {
        ToolExport {
            id: self.id.clone(),
            kind: self.kind.clone(),
            points: self.points.clone(),
            options: self.options.clone(),
        }
    }

    /// Clears all state. Safe to call repeatedly; returns `true` on the first call.
    pub fn destroy(&mut self) -> bool {
        if self.destroyed {
            return false;
        }
        self.destroyed = true;
        self.points.clear();
        self.ghost = None;
        self.selected = false;
        self.hovered = false;
        self.editing = false;
        self.creating = false;
        debug!(tool_id = %self.id, "tool destroyed");
        true
    }

    #[must_use]
    pub fn anchors(&self) -> SmallVec<[Point; 4]> {
        self.behavior.anchors(&self.points)
    }

    #[must_use]
    pub fn max_anchor_index(&self) -> Option<usize> {
        self.capabilities
            .max_anchor_index
            .or_else(|| self.anchors().len().checked_sub(1))
    }

    pub(crate) fn move_anchor(&mut self, anchor_index: usize, target: Point, original: &[Point]) -> bool {
        if !target.is_finite() {
            return false;
        }
        self.behavior
            .move_anchor(&mut self.points, original, anchor_index, target)
    }

    pub(crate) fn normalize(&mut self) {
        self.behavior.normalize(&mut self.points);
    }

    #[must_use]
    pub fn culling_state(&self, bounds: ViewportBounds) -> CullingState {
        let points = self.points_with_ghost();
        let geometry = self.behavior.culling_geometry(&points, &self.options);
        culling_state(&geometry.points, bounds, &geometry.options)
    }

    /// Geometry-aware hit test at `pointer`; `None` on a miss or failed conversion.
    #[must_use]
    pub fn hit_test<H: ChartHost + ?Sized>(
        &self,
        converter: &CoordinateConverter<'_, H>,
        pointer: ScreenPoint,
        tolerance_px: f64,
        anchor_radius_px: f64,
        pane_size: (f64, f64),
    ) -> Option<HitTestResult> {
        if self.destroyed || !self.options.visible || self.points.is_empty() {
            return None;
        }
        let points = converter.points_to_screen(&self.points)?;
        let anchors = converter.points_to_screen(&self.anchors())?;
        let context = HitTestContext {
            points: &points,
            anchors: &anchors,
            options: &self.options,
            pointer,
            tolerance_px,
            anchor_radius_px,
            pane_width: pane_size.0,
            pane_height: pane_size.1,
        };
        self.behavior.hit_test(&context)
    }
}
