use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::core::Point;
use crate::error::{OverlayError, OverlayResult};
use crate::host::ChartHost;
use crate::tools::{PointsCount, ToolBehavior, ToolExport, ToolInstance, id_matches_pattern};

use super::OverlayEngine;

impl<H: ChartHost> OverlayEngine<H> {
    /// Registers (or replaces) a tool kind.
    pub fn register_tool<F>(&mut self, kind: &str, constructor: F)
    where
        F: Fn() -> Box<dyn ToolBehavior> + 'static,
    {
        self.registry.register(kind, constructor);
    }

    /// Adds a tool of `kind` under a generated id.
    ///
    /// Empty `points` start interactive creation. A bounded kind given some
    /// but not all of its points is rejected, and on any error nothing is
    /// added.
    pub fn add_tool(&mut self, kind: &str, points: Vec<Point>, options: Option<&Value>) -> OverlayResult<String> {
        let id = Uuid::new_v4().to_string();
        let tool = self.build_tool(&id, kind, points, options)?;
        self.place_tool(tool);
        Ok(id)
    }

    /// Upserts a tool under an explicit id, used to restore saved state.
    ///
    /// An existing tool of the same kind keeps its z-order and interaction
    /// state; a tool of a different kind is replaced.
    pub fn create_or_update_tool(
        &mut self,
        kind: &str,
        points: Vec<Point>,
        options: Option<&Value>,
        id: &str,
    ) -> OverlayResult<()> {
        if id.is_empty() {
            return Err(OverlayError::InvalidData("tool id must not be empty".to_owned()));
        }
        let tool = self.build_tool(id, kind, points, options)?;
        self.upsert_tool(tool);
        self.dispatch_events();
        Ok(())
    }

    /// Removes the given ids; unknown ids are ignored. Returns how many were removed.
    pub fn remove_tools_by_id<S: AsRef<str>>(&mut self, ids: &[S]) -> usize {
        let mut removed = 0;
        for id in ids {
            if self.detach_tool(id.as_ref()) {
                removed += 1;
            }
        }
        self.dispatch_events();
        removed
    }

    /// Removes every tool whose id matches a `*`/`?` wildcard pattern
    /// (substring match when the pattern has no wildcard).
    pub fn remove_tools_by_id_pattern(&mut self, pattern: &str) -> usize {
        let ids = self.tools.ids_matching(pattern);
        self.remove_tools_by_id(&ids)
    }

    pub fn remove_selected(&mut self) -> bool {
        let Some(id) = self.interaction.selected_tool_id().map(str::to_owned) else {
            return false;
        };
        self.remove_tools_by_id(&[id]) == 1
    }

    pub fn remove_all(&mut self) -> usize {
        let ids = self.tools.ids();
        let removed = self.remove_tools_by_id(&ids);
        self.labels.clear(&mut self.stacking);
        removed
    }

    /// Programmatic selection; `None` clears it. Tools still being created
    /// cannot be selected.
    pub fn select_tool(&mut self, id: Option<&str>) -> OverlayResult<()> {
        if let Some(id) = id {
            let selectable = self.tools.get(id).is_some_and(|tool| !tool.is_creating());
            if !selectable {
                return Err(OverlayError::ToolNotFound { id: id.to_owned() });
            }
        }
        self.interact(|manager, ctx| manager.select(id.map(str::to_owned), ctx));
        self.dispatch_events();
        Ok(())
    }

    #[must_use]
    pub fn get_selected(&self) -> Option<ToolExport> {
        self.interaction
            .selected_tool_id()
            .and_then(|id| self.tools.get(id))
            .map(ToolInstance::export_data)
    }

    #[must_use]
    pub fn get_by_id(&self, id: &str) -> Option<ToolExport> {
        self.tools.get(id).map(ToolInstance::export_data)
    }

    #[must_use]
    pub fn get_by_id_pattern(&self, pattern: &str) -> Vec<ToolExport> {
        self.tools
            .iter()
            .filter(|tool| id_matches_pattern(pattern, tool.id()))
            .map(ToolInstance::export_data)
            .collect()
    }

    /// Applies exported tool data (`{ "id", "options", "points"? }`) to an existing tool.
    ///
    /// Returns `Ok(false)` when the id is unknown. Options are deep-merged;
    /// points, when present, replace the current ones. Every check runs before
    /// the tool is touched, and a tool still being created takes no points.
    pub fn apply_options(&mut self, data: &Value) -> OverlayResult<bool> {
        let id = data
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| OverlayError::InvalidData("tool data requires a string `id`".to_owned()))?;
        let points = match data.get("points") {
            Some(raw) => Some(parse_points(raw)?),
            None => None,
        };
        let Some(tool) = self.tools.get_mut(id) else {
            warn!(tool_id = id, "apply_options on unknown tool ignored");
            return Ok(false);
        };
        if let Some(points) = &points {
            if tool.is_creating() {
                return Err(OverlayError::InvalidData(format!(
                    "tool `{id}` is being created; its points come from input"
                )));
            }
            validate_point_count(tool.points_count(), points.len(), false)?;
        }
        let mut options = tool.options().clone();
        if let Some(partial) = data.get("options") {
            options.merge_json(partial)?;
        }

        tool.set_options(options);
        if let Some(points) = points {
            tool.set_points(points);
        }
        self.host.request_redraw();
        Ok(true)
    }

    /// Builds a detached, validated tool. Nothing is touched on error.
    pub(super) fn build_tool(
        &self,
        id: &str,
        kind: &str,
        points: Vec<Point>,
        options: Option<&Value>,
    ) -> OverlayResult<ToolInstance> {
        let entry = self.registry.get(kind)?;
        if let Some(point) = points.iter().find(|point| !point.is_finite()) {
            return Err(OverlayError::InvalidData(format!(
                "tool point ({}, {}) is not finite",
                point.timestamp, point.price
            )));
        }
        let mut tool = entry.instantiate(id.to_owned(), kind);
        if let Some(options) = options {
            tool.apply_options(options)?;
        }
        validate_point_count(tool.points_count(), points.len(), true)?;
        if !points.is_empty() {
            tool.set_points(points);
            if tool.points_count().is_unbounded() {
                tool.complete_path();
            }
        }
        Ok(tool)
    }

    /// Inserts a new tool on top, starting creation when it has no points.
    pub(super) fn place_tool(&mut self, tool: ToolInstance) {
        let id = tool.id().to_owned();
        let starts_creation = tool.points().is_empty();
        debug!(tool_id = %id, kind = tool.kind(), starts_creation, "tool added");
        self.tools.insert(tool);
        if starts_creation {
            self.interact(|manager, ctx| manager.begin_creation(&id, ctx));
        }
        self.host.request_redraw();
        self.dispatch_events();
    }

    /// Replaces points and options of a same-kind tool in place, otherwise
    /// swaps the tool out.
    pub(super) fn upsert_tool(&mut self, tool: ToolInstance) {
        let id = tool.id().to_owned();
        let reusable = self
            .tools
            .get(&id)
            .is_some_and(|existing| existing.kind() == tool.kind() && !existing.is_creating());
        if reusable && !tool.points().is_empty() {
            if let Some(existing) = self.tools.get_mut(&id) {
                existing.set_options(tool.options().clone());
                existing.set_points(tool.points().to_vec());
                if existing.points_count().is_unbounded() {
                    existing.complete_path();
                }
                debug!(tool_id = %id, "tool updated in place");
            }
            self.host.request_redraw();
            return;
        }
        self.detach_tool(&id);
        self.place_tool(tool);
    }
}

/// Bounded kinds take either no points (interactive creation) or all of them.
fn validate_point_count(count: PointsCount, given: usize, allow_empty: bool) -> OverlayResult<()> {
    match count {
        PointsCount::Fixed(expected) if given > expected => Err(OverlayError::InvalidData(format!(
            "expected at most {expected} points, got {given}"
        ))),
        PointsCount::Fixed(expected) if given < expected && !(allow_empty && given == 0) => {
            Err(OverlayError::InvalidData(format!(
                "expected {expected} points, got {given}"
            )))
        }
        PointsCount::Unbounded if given == 0 && !allow_empty => Err(OverlayError::InvalidData(
            "unbounded tool requires at least one point".to_owned(),
        )),
        _ => Ok(()),
    }
}

fn parse_points(raw: &Value) -> OverlayResult<Vec<Point>> {
    let points: Vec<Point> = serde_json::from_value(raw.clone())
        .map_err(|e| OverlayError::InvalidData(format!("failed to parse tool points: {e}")))?;
    if points.iter().any(|point| !point.is_finite()) {
        return Err(OverlayError::InvalidData("tool points must be finite".to_owned()));
    }
    Ok(points)
}
