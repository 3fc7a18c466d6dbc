use std::mem;

use tracing::{debug, trace, warn};

use crate::core::{CoordinateConverter, Point, ScreenPoint};
use crate::host::{ChartHost, CursorStyle};
use crate::interaction::gesture::{CreationGesture, EditGesture, Gesture};
use crate::interaction::{InputState, InteractionConfig, InteractionEvent, InteractionMode, KeyCode};
use crate::tools::{
    ConstrainedPoint, ConstraintPhase, FinalizationMethod, HitTestResult, PointsCount, SnapAxis,
    ToolCollection, ToolInstance,
};

/// Mutable collaborators of one input call.
pub struct InteractionContext<'a, H: ChartHost + ?Sized> {
    pub tools: &'a mut ToolCollection,
    pub host: &'a mut H,
    pub events: &'a mut Vec<InteractionEvent>,
}

impl<'a, H: ChartHost + ?Sized> InteractionContext<'a, H> {
    pub fn new(
        tools: &'a mut ToolCollection,
        host: &'a mut H,
        events: &'a mut Vec<InteractionEvent>,
    ) -> Self {
        Self {
            tools,
            host,
            events,
        }
    }
}

/// Anchors a shift constraint may snap onto, in pixels and in logical space.
#[derive(Clone, Copy)]
struct SnapReferences<'r> {
    screen: &'r [ScreenPoint],
    logical: &'r [Point],
}

enum DragStep {
    Commit(Point, Point),
    SetPoint(usize, Point),
    Ghost,
    Skip,
}

enum EditStep {
    Anchor(usize, Point),
    Translate(Vec<Point>),
}

/// Gesture state machine over `Idle`, creation and edit gestures.
///
/// Owns the creating, selected and hovered slots; nothing else writes them.
#[derive(Debug, Default)]
pub struct InteractionManager {
    config: InteractionConfig,
    input: InputState,
    gesture: Gesture,
    creating: Option<String>,
    selected: Option<String>,
    hovered: Option<String>,
    down_at: Option<ScreenPoint>,
    is_drag: bool,
}

impl InteractionManager {
    #[must_use]
    pub fn new(config: InteractionConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn config(&self) -> InteractionConfig {
        self.config
    }

    pub fn set_config(&mut self, config: InteractionConfig) {
        self.config = config;
    }

    #[must_use]
    pub fn input(&self) -> InputState {
        self.input
    }

    #[must_use]
    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    #[must_use]
    pub fn mode(&self) -> InteractionMode {
        match self.gesture {
            Gesture::Idle => InteractionMode::Idle,
            Gesture::Creation(_) => InteractionMode::Creation,
            Gesture::Edit(_) => InteractionMode::Edit,
        }
    }

    #[must_use]
    pub fn creating_tool_id(&self) -> Option<&str> {
        self.creating.as_deref()
    }

    #[must_use]
    pub fn selected_tool_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    #[must_use]
    pub fn hovered_tool_id(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    pub fn set_shift(&mut self, held: bool) {
        self.input.shift_held = held;
    }

    /// Makes `tool_id` the single creation target.
    ///
    /// A previous unfinished target is reported as cancelled.
    pub fn begin_creation<H: ChartHost + ?Sized>(
        &mut self,
        tool_id: &str,
        ctx: &mut InteractionContext<'_, H>,
    ) {
        if let Some(previous) = self.creating.take() {
            if previous != tool_id {
                debug!(tool_id = %previous, "unfinished creation target replaced");
                if self.gesture.tool_id() == Some(previous.as_str()) {
                    self.gesture = Gesture::Idle;
                }
                ctx.events
                    .push(InteractionEvent::CreationCancelled { tool_id: previous });
            }
        }
        self.select(None, ctx);
        let Some(tool) = ctx.tools.get_mut(tool_id) else {
            warn!(tool_id, "begin_creation on unknown tool ignored");
            return;
        };
        tool.begin_creation();
        self.creating = Some(tool_id.to_owned());
        ctx.host.set_cursor(CursorStyle::Crosshair);
        debug!(tool_id, "creation started");
    }

    pub fn pointer_down<H: ChartHost + ?Sized>(
        &mut self,
        position: ScreenPoint,
        ctx: &mut InteractionContext<'_, H>,
    ) {
        if !position.is_finite() {
            return;
        }
        self.input.pressed = true;
        self.input.last_pointer = Some(position);
        self.down_at = Some(position);
        self.is_drag = false;

        if let Some(tool_id) = self.creating.clone() {
            if ctx.tools.contains(&tool_id) {
                trace!(tool_id = %tool_id, "creation gesture started");
                self.gesture = Gesture::Creation(CreationGesture::new(tool_id, position));
                ctx.host.set_pan_enabled(false);
                return;
            }
            warn!(tool_id = %tool_id, "creation target vanished, clearing slot");
            self.creating = None;
        }

        let Some((tool_id, hit)) = self.hit_test(position, ctx.tools, &*ctx.host) else {
            return;
        };
        self.select(Some(tool_id.clone()), ctx);
        let Some(edit) = self.edit_gesture(&tool_id, hit, position, ctx) else {
            return;
        };
        trace!(tool_id = %tool_id, anchor = ?edit.anchor_index, "edit gesture started");
        ctx.host.set_pan_enabled(false);
        ctx.host.set_cursor(edit.cursor);
        self.gesture = Gesture::Edit(edit);
    }

    /// Drag step while pressed, hover otherwise.
    pub fn pointer_move<H: ChartHost + ?Sized>(
        &mut self,
        position: ScreenPoint,
        ctx: &mut InteractionContext<'_, H>,
    ) {
        if !position.is_finite() {
            return;
        }
        self.input.last_pointer = Some(position);
        if !self.input.pressed {
            self.hover(position, ctx);
            return;
        }

        if !self.is_drag {
            if let Some(down) = self.down_at {
                if down.distance_to(position) > self.config.drag_threshold_px {
                    self.is_drag = true;
                    trace!("drag threshold crossed");
                }
            }
        }

        let mut gesture = mem::take(&mut self.gesture);
        let keep = match &mut gesture {
            Gesture::Creation(creation) => self.creation_move(creation, position, ctx),
            Gesture::Edit(edit) if self.is_drag => self.edit_move(edit, position, ctx),
            Gesture::Edit(_) | Gesture::Idle => true,
        };
        if keep {
            self.gesture = gesture;
        } else {
            warn!("gesture target vanished mid-drag, returning to idle");
            ctx.host.set_pan_enabled(true);
        }
    }

    pub fn pointer_up<H: ChartHost + ?Sized>(
        &mut self,
        position: ScreenPoint,
        ctx: &mut InteractionContext<'_, H>,
    ) {
        let was_pressed = self.input.pressed;
        let was_drag = self.is_drag;
        let position = if position.is_finite() {
            position
        } else {
            self.input.last_pointer.or(self.down_at).unwrap_or_default()
        };
        self.input.pressed = false;
        self.input.last_pointer = Some(position);
        self.down_at = None;
        self.is_drag = false;

        match mem::take(&mut self.gesture) {
            Gesture::Creation(creation) => self.creation_release(creation, position, was_drag, ctx),
            Gesture::Edit(edit) => self.edit_release(edit, ctx),
            Gesture::Idle => {
                // A drag over empty space was a pan and leaves selection alone.
                if was_pressed && !was_drag {
                    let hit = self
                        .hit_test(position, ctx.tools, &*ctx.host)
                        .map(|(tool_id, _)| tool_id);
                    self.select(hit, ctx);
                }
            }
        }
        ctx.host.set_pan_enabled(true);
        ctx.host.request_redraw();
    }

    pub fn double_click<H: ChartHost + ?Sized>(
        &mut self,
        position: ScreenPoint,
        ctx: &mut InteractionContext<'_, H>,
    ) {
        if let Some(tool_id) = self.creating.clone() {
            match ctx.tools.get(&tool_id).map(ToolInstance::capabilities) {
                Some(capabilities) if capabilities.finalization == FinalizationMethod::DoubleClick => {
                    if capabilities.discards_rogue_point_on_double_click {
                        self.discard_rogue_point(&tool_id, ctx);
                    }
                    self.finalize(&tool_id, ctx);
                    return;
                }
                Some(_) => {}
                None => self.creating = None,
            }
        }

        if !position.is_finite() {
            return;
        }
        if let Some((tool_id, _)) = self.hit_test(position, ctx.tools, &*ctx.host) {
            debug!(tool_id = %tool_id, "tool double-clicked");
            ctx.events.push(InteractionEvent::DoubleClicked { tool_id });
        }
    }

    pub fn key_down<H: ChartHost + ?Sized>(&mut self, key: KeyCode, ctx: &mut InteractionContext<'_, H>) {
        match key {
            KeyCode::Shift => self.input.shift_held = true,
            KeyCode::Escape => {
                self.cancel_creation(ctx);
            }
            KeyCode::Other => {}
        }
    }

    pub fn key_up(&mut self, key: KeyCode) {
        if key == KeyCode::Shift {
            self.input.shift_held = false;
        }
    }

    /// Clears hover and the creation ghost when the pointer leaves the pane.
    pub fn pointer_leave<H: ChartHost + ?Sized>(&mut self, ctx: &mut InteractionContext<'_, H>) {
        self.input.last_pointer = None;
        self.set_hovered(None, ctx);
        if let Some(tool_id) = self.creating.as_deref() {
            if let Some(tool) = ctx.tools.get_mut(tool_id) {
                if tool.ghost_point().is_some() {
                    tool.set_last_point(None);
                    ctx.host.request_redraw();
                }
            }
        }
        ctx.host.set_cursor(CursorStyle::Default);
    }

    /// Abandons the creation target, if any, and reports it for removal.
    pub fn cancel_creation<H: ChartHost + ?Sized>(
        &mut self,
        ctx: &mut InteractionContext<'_, H>,
    ) -> Option<String> {
        let tool_id = self.creating.take()?;
        if self.gesture.tool_id() == Some(tool_id.as_str()) {
            self.gesture = Gesture::Idle;
        }
        ctx.host.set_pan_enabled(true);
        ctx.host.set_cursor(CursorStyle::Default);
        debug!(tool_id = %tool_id, "creation cancelled");
        ctx.events.push(InteractionEvent::CreationCancelled {
            tool_id: tool_id.clone(),
        });
        Some(tool_id)
    }

    /// Drops every reference to a tool that is being removed.
    ///
    /// If the tool was mid-gesture the manager returns to idle and the host's
    /// own panning is restored.
    pub fn forget_tool<H: ChartHost + ?Sized>(
        &mut self,
        tool_id: &str,
        ctx: &mut InteractionContext<'_, H>,
    ) {
        let mut released = false;
        if self.creating.as_deref() == Some(tool_id) {
            self.creating = None;
            released = true;
        }
        if self.hovered.as_deref() == Some(tool_id) {
            self.hovered = None;
            released = true;
        }
        if self.gesture.tool_id() == Some(tool_id) {
            self.gesture = Gesture::Idle;
            self.input.pressed = false;
            self.down_at = None;
            self.is_drag = false;
            released = true;
        }
        if self.selected.as_deref() == Some(tool_id) {
            self.selected = None;
            ctx.events
                .push(InteractionEvent::SelectionChanged { tool_id: None });
        }
        if released {
            ctx.host.set_pan_enabled(true);
            ctx.host.set_cursor(CursorStyle::Default);
            debug!(tool_id, "interaction references released");
        }
    }

    /// Selects one tool (or none), deselecting the previous one.
    pub fn select<H: ChartHost + ?Sized>(
        &mut self,
        tool_id: Option<String>,
        ctx: &mut InteractionContext<'_, H>,
    ) {
        let tool_id = tool_id.filter(|id| ctx.tools.contains(id));
        if self.selected == tool_id {
            return;
        }
        if let Some(previous) = self.selected.take() {
            if let Some(tool) = ctx.tools.get_mut(&previous) {
                tool.set_selected(false);
            }
        }
        if let Some(id) = tool_id.as_deref() {
            if let Some(tool) = ctx.tools.get_mut(id) {
                tool.set_selected(true);
            }
        }
        self.selected = tool_id.clone();
        ctx.events
            .push(InteractionEvent::SelectionChanged { tool_id });
        ctx.host.request_redraw();
    }

    /// Topmost visible, settled tool under `position`.
    #[must_use]
    pub fn hit_test<H: ChartHost + ?Sized>(
        &self,
        position: ScreenPoint,
        tools: &ToolCollection,
        host: &H,
    ) -> Option<(String, HitTestResult)> {
        let converter = CoordinateConverter::new(host);
        let viewport = host.viewport();
        let pane = (f64::from(viewport.width), f64::from(viewport.height));
        tools
            .iter_topmost_first()
            .filter(|tool| tool.options().visible && !tool.is_creating() && !tool.is_destroyed())
            .find_map(|tool| {
                tool.hit_test(
                    &converter,
                    position,
                    self.config.hit_tolerance_px,
                    self.config.anchor_radius_px,
                    pane,
                )
                .map(|hit| (tool.id().to_owned(), hit))
            })
    }

    fn edit_gesture<H: ChartHost + ?Sized>(
        &self,
        tool_id: &str,
        hit: HitTestResult,
        position: ScreenPoint,
        ctx: &InteractionContext<'_, H>,
    ) -> Option<EditGesture> {
        let tool = ctx.tools.get(tool_id)?;
        let options = tool.options();
        if !options.editable {
            return None;
        }
        let capabilities = tool.capabilities();
        let max_anchor = tool.max_anchor_index();
        let translates_on_anchor0 =
            tool.points_count().is_unbounded() && capabilities.anchor0_triggers_translation;
        let anchor_index = hit
            .anchor_index()
            .filter(|index| max_anchor.is_some_and(|max| *index <= max))
            .filter(|index| !(*index == 0 && translates_on_anchor0));

        let configured = if anchor_index.is_some() {
            options.default_anchor_drag_cursor
        } else {
            options.default_drag_cursor
        };
        let cursor = hit
            .data
            .suggested_cursor
            .or(configured)
            .unwrap_or(CursorStyle::Grabbing);

        let original_anchors: smallvec::SmallVec<[Point; 4]> = tool
            .anchors()
            .into_iter()
            .take(max_anchor.map_or(0, |max| max + 1))
            .collect();
        let converter = CoordinateConverter::new(&*ctx.host);
        let original_anchors_screen = converter.points_to_screen(&original_anchors);

        Some(EditGesture {
            tool_id: tool_id.to_owned(),
            anchor_index,
            cursor,
            down_screen: position,
            original_points: tool.points().to_vec(),
            original_anchors,
            original_anchors_screen,
            moved: false,
        })
    }

    fn creation_move<H: ChartHost + ?Sized>(
        &self,
        creation: &mut CreationGesture,
        position: ScreenPoint,
        ctx: &mut InteractionContext<'_, H>,
    ) -> bool {
        let Some(tool) = ctx.tools.get(&creation.tool_id) else {
            return false;
        };
        let capabilities = tool.capabilities();
        if !self.is_drag || !capabilities.click_drag_creation {
            if capabilities.click_click_creation {
                self.update_ghost(&creation.tool_id, position, ctx);
            }
            return true;
        }
        match tool.points_count() {
            PointsCount::Unbounded => self.sample_freehand(creation, position, ctx),
            PointsCount::Fixed(_) => self.drag_bounded(creation, position, ctx),
        }
        ctx.host.request_redraw();
        true
    }

    /// Bounded drag-creation: commits the press location and the live
    /// location on first detection, then keeps moving the last point.
    fn drag_bounded<H: ChartHost + ?Sized>(
        &self,
        creation: &mut CreationGesture,
        position: ScreenPoint,
        ctx: &mut InteractionContext<'_, H>,
    ) {
        let step = {
            let Some(tool) = ctx.tools.get(&creation.tool_id) else {
                return;
            };
            let converter = CoordinateConverter::new(&*ctx.host);
            let points = tool.points();
            if creation.drag_committed {
                let last = points.len().saturating_sub(1);
                let placed = &points[..last];
                let placed_screen = converter.points_to_screen(placed).unwrap_or_default();
                let references = SnapReferences {
                    screen: &placed_screen,
                    logical: placed,
                };
                self.resolve_point(tool, last, position, ConstraintPhase::ClickDrag, None, references, &converter)
                    .map_or(DragStep::Skip, |live| DragStep::SetPoint(last, live))
            } else if points.is_empty() {
                match converter.screen_to_point(creation.down_screen) {
                    Some(first) => {
                        let references = SnapReferences {
                            screen: &[creation.down_screen],
                            logical: &[first],
                        };
                        self.resolve_point(tool, 1, position, ConstraintPhase::ClickDrag, None, references, &converter)
                            .map_or(DragStep::Skip, |live| DragStep::Commit(first, live))
                    }
                    None => DragStep::Skip,
                }
            } else {
                // Drag after earlier clicks: follow with the ghost, commit on release.
                DragStep::Ghost
            }
        };

        match step {
            DragStep::Commit(first, live) => {
                if let Some(tool) = ctx.tools.get_mut(&creation.tool_id) {
                    tool.set_last_point(None);
                    if tool.add_point(first) {
                        tool.add_point(live);
                        creation.drag_committed = true;
                    }
                }
            }
            DragStep::SetPoint(index, live) => {
                if let Some(tool) = ctx.tools.get_mut(&creation.tool_id) {
                    tool.set_point(index, live);
                }
            }
            DragStep::Ghost => self.update_ghost(&creation.tool_id, position, ctx),
            DragStep::Skip => trace!("creation drag step skipped, conversion failed"),
        }
    }

    fn sample_freehand<H: ChartHost + ?Sized>(
        &self,
        creation: &mut CreationGesture,
        position: ScreenPoint,
        ctx: &mut InteractionContext<'_, H>,
    ) {
        let (first, sample) = {
            let converter = CoordinateConverter::new(&*ctx.host);
            let needs_first = ctx
                .tools
                .get(&creation.tool_id)
                .is_some_and(|tool| tool.points().is_empty());
            let first = if needs_first {
                converter.screen_to_point(creation.down_screen)
            } else {
                None
            };
            (first, converter.screen_to_point(position))
        };
        let Some(tool) = ctx.tools.get_mut(&creation.tool_id) else {
            return;
        };
        if let Some(first) = first {
            if tool.add_point(first) {
                creation.last_sample = Some(creation.down_screen);
            }
        }
        let far_enough = creation
            .last_sample
            .is_none_or(|last| last.distance_to(position) >= self.config.freehand_min_step_px);
        if !far_enough {
            return;
        }
        match sample {
            Some(point) if tool.add_point(point) => {
                creation.last_sample = Some(position);
                creation.drag_committed = true;
            }
            Some(_) => {}
            None => trace!("freehand sample skipped, conversion failed"),
        }
    }

    fn edit_move<H: ChartHost + ?Sized>(
        &self,
        edit: &mut EditGesture,
        position: ScreenPoint,
        ctx: &mut InteractionContext<'_, H>,
    ) -> bool {
        let delta = position - edit.down_screen;
        let step = {
            let Some(tool) = ctx.tools.get(&edit.tool_id) else {
                return false;
            };
            let converter = CoordinateConverter::new(&*ctx.host);
            match edit.anchor_index {
                Some(index) => edit.original_anchors_screen.as_ref().and_then(|anchors_screen| {
                    let origin = anchors_screen.get(index).copied()?;
                    let references = SnapReferences {
                        screen: anchors_screen,
                        logical: &edit.original_anchors,
                    };
                    self.resolve_point(
                        tool,
                        index,
                        origin + delta,
                        ConstraintPhase::Edit,
                        Some(origin),
                        references,
                        &converter,
                    )
                    .map(|target| EditStep::Anchor(index, target))
                }),
                None => translated_points(&edit.original_points, delta, self.input.shift_held, &converter)
                    .map(EditStep::Translate),
            }
        };

        let Some(step) = step else {
            trace!(tool_id = %edit.tool_id, "edit step skipped, conversion failed");
            return true;
        };
        let Some(tool) = ctx.tools.get_mut(&edit.tool_id) else {
            return false;
        };
        let applied = match step {
            EditStep::Anchor(index, target) => tool.move_anchor(index, target, &edit.original_points),
            EditStep::Translate(points) => {
                tool.set_points(points);
                true
            }
        };
        if applied {
            tool.set_editing(true);
            edit.moved = true;
            ctx.host.request_redraw();
        }
        true
    }

    fn creation_release<H: ChartHost + ?Sized>(
        &mut self,
        mut creation: CreationGesture,
        position: ScreenPoint,
        was_drag: bool,
        ctx: &mut InteractionContext<'_, H>,
    ) {
        let tool_id = creation.tool_id.clone();
        let Some(tool) = ctx.tools.get(&tool_id) else {
            return;
        };
        let capabilities = tool.capabilities();
        let bounded = !tool.points_count().is_unbounded();
        // Below-threshold movement counts as a click at the press location.
        let click_at = if was_drag { position } else { creation.down_screen };

        match capabilities.finalization {
            FinalizationMethod::PointCount => {
                if creation.drag_committed {
                    if bounded {
                        self.drag_bounded(&mut creation, position, ctx);
                    }
                } else {
                    self.add_click_point(&tool_id, click_at, ctx);
                }
                let finished = ctx.tools.get(&tool_id).is_some_and(ToolInstance::is_finished);
                if finished {
                    self.finalize(&tool_id, ctx);
                } else {
                    self.update_ghost(&tool_id, position, ctx);
                }
            }
            FinalizationMethod::ReleaseOnDrag => {
                if !creation.drag_committed {
                    self.add_click_point(&tool_id, creation.down_screen, ctx);
                }
                let has_points = ctx
                    .tools
                    .get(&tool_id)
                    .is_some_and(|tool| !tool.points().is_empty());
                if has_points {
                    self.finalize(&tool_id, ctx);
                }
            }
            FinalizationMethod::DoubleClick => {
                if !creation.drag_committed {
                    self.add_click_point(&tool_id, click_at, ctx);
                }
                self.update_ghost(&tool_id, position, ctx);
            }
        }
    }

    fn edit_release<H: ChartHost + ?Sized>(
        &mut self,
        edit: EditGesture,
        ctx: &mut InteractionContext<'_, H>,
    ) {
        let Some(tool) = ctx.tools.get_mut(&edit.tool_id) else {
            return;
        };
        tool.set_editing(false);
        if edit.moved {
            debug!(tool_id = %edit.tool_id, "tool edited");
            ctx.events.push(InteractionEvent::Edited {
                tool_id: edit.tool_id,
            });
        }
        ctx.host.set_cursor(CursorStyle::Default);
    }

    /// Adds a discrete-click point, shift-constrained against the points placed so far.
    fn add_click_point<H: ChartHost + ?Sized>(
        &self,
        tool_id: &str,
        at: ScreenPoint,
        ctx: &mut InteractionContext<'_, H>,
    ) -> bool {
        let point = {
            let Some(tool) = ctx.tools.get(tool_id) else {
                return false;
            };
            let converter = CoordinateConverter::new(&*ctx.host);
            let placed = tool.points();
            let placed_screen = converter.points_to_screen(placed).unwrap_or_default();
            let references = SnapReferences {
                screen: &placed_screen,
                logical: placed,
            };
            self.resolve_point(tool, placed.len(), at, ConstraintPhase::ClickClick, None, references, &converter)
        };
        let Some(point) = point else {
            debug!(tool_id, "click point skipped, conversion failed");
            return false;
        };
        ctx.tools
            .get_mut(tool_id)
            .is_some_and(|tool| tool.add_point(point))
    }

    fn update_ghost<H: ChartHost + ?Sized>(
        &self,
        tool_id: &str,
        position: ScreenPoint,
        ctx: &mut InteractionContext<'_, H>,
    ) {
        let ghost = {
            let Some(tool) = ctx.tools.get(tool_id) else {
                return;
            };
            let placed = tool.points();
            if !tool.points_count().has_room_for(placed.len()) {
                return;
            }
            let converter = CoordinateConverter::new(&*ctx.host);
            let placed_screen = converter.points_to_screen(placed).unwrap_or_default();
            let references = SnapReferences {
                screen: &placed_screen,
                logical: placed,
            };
            self.resolve_point(tool, placed.len(), position, ConstraintPhase::ClickClick, None, references, &converter)
        };
        match ghost {
            Some(ghost) => {
                if let Some(tool) = ctx.tools.get_mut(tool_id) {
                    tool.set_last_point(Some(ghost));
                    ctx.host.request_redraw();
                }
            }
            None => trace!(tool_id, "ghost update skipped, conversion failed"),
        }
    }

    fn discard_rogue_point<H: ChartHost + ?Sized>(
        &self,
        tool_id: &str,
        ctx: &mut InteractionContext<'_, H>,
    ) {
        let rogue = {
            let Some(tool) = ctx.tools.get(tool_id) else {
                return;
            };
            let [.., previous, last] = tool.points() else {
                return;
            };
            let converter = CoordinateConverter::new(&*ctx.host);
            match (converter.point_to_screen(*previous), converter.point_to_screen(*last)) {
                (Some(a), Some(b)) => a.distance_to(b) <= self.config.double_click_rogue_point_px,
                _ => previous == last,
            }
        };
        if rogue {
            if let Some(tool) = ctx.tools.get_mut(tool_id) {
                tool.remove_last_point();
                debug!(tool_id, "trailing double-click point discarded");
            }
        }
    }

    fn finalize<H: ChartHost + ?Sized>(&mut self, tool_id: &str, ctx: &mut InteractionContext<'_, H>) {
        let Some(tool) = ctx.tools.get_mut(tool_id) else {
            return;
        };
        tool.set_last_point(None);
        let unbounded = tool.points_count().is_unbounded();
        if unbounded {
            tool.complete_path();
        }
        if !tool.try_finish() {
            debug!(tool_id, "finalize requested before the tool was complete");
            return;
        }
        tool.normalize();

        self.creating = None;
        if self.gesture.tool_id() == Some(tool_id) {
            self.gesture = Gesture::Idle;
        }
        self.select(Some(tool_id.to_owned()), ctx);
        if unbounded {
            ctx.events.push(InteractionEvent::PathFinished {
                tool_id: tool_id.to_owned(),
            });
        }
        ctx.events.push(InteractionEvent::Finished {
            tool_id: tool_id.to_owned(),
        });
        ctx.host.set_cursor(CursorStyle::Default);
        ctx.host.set_pan_enabled(true);
        ctx.host.request_redraw();
    }

    fn hover<H: ChartHost + ?Sized>(&mut self, position: ScreenPoint, ctx: &mut InteractionContext<'_, H>) {
        if let Some(tool_id) = self.creating.clone() {
            let ghosts = ctx
                .tools
                .get(&tool_id)
                .is_some_and(|tool| tool.capabilities().click_click_creation);
            if ghosts {
                self.update_ghost(&tool_id, position, ctx);
            }
            self.set_hovered(None, ctx);
            ctx.host.set_cursor(CursorStyle::Crosshair);
            return;
        }

        let hit = self.hit_test(position, ctx.tools, &*ctx.host);
        let cursor = hit
            .as_ref()
            .map_or(CursorStyle::Default, |(tool_id, hit)| {
                hover_cursor(ctx.tools.get(tool_id), *hit)
            });
        self.set_hovered(hit.map(|(tool_id, _)| tool_id), ctx);
        ctx.host.set_cursor(cursor);
    }

    fn set_hovered<H: ChartHost + ?Sized>(
        &mut self,
        tool_id: Option<String>,
        ctx: &mut InteractionContext<'_, H>,
    ) {
        if self.hovered == tool_id {
            return;
        }
        if let Some(previous) = self.hovered.take() {
            if let Some(tool) = ctx.tools.get_mut(&previous) {
                tool.set_hovered(false);
            }
        }
        if let Some(id) = tool_id.as_deref() {
            if let Some(tool) = ctx.tools.get_mut(id) {
                tool.set_hovered(true);
            }
        }
        self.hovered = tool_id;
        ctx.host.request_redraw();
    }

    /// Screen-space shift constraint followed by the logical snap.
    ///
    /// Snapping the converted point onto the reference's exact time or price
    /// keeps constrained points from drifting through pixel rounding.
    fn resolve_point<H: ChartHost + ?Sized>(
        &self,
        tool: &ToolInstance,
        anchor_index: usize,
        raw: ScreenPoint,
        phase: ConstraintPhase,
        original: Option<ScreenPoint>,
        references: SnapReferences<'_>,
        converter: &CoordinateConverter<'_, H>,
    ) -> Option<Point> {
        let capabilities = tool.capabilities();
        let enabled = self.input.shift_held
            && match phase {
                ConstraintPhase::ClickClick => capabilities.shift_constraint_on_click_click,
                ConstraintPhase::ClickDrag => capabilities.shift_constraint_on_click_drag,
                ConstraintPhase::Edit => true,
            };
        let constrained = match tool.shift_constraint().filter(|_| enabled) {
            Some(constraint) => constraint.constrain(anchor_index, raw, phase, original, references.screen),
            None => ConstrainedPoint::unconstrained(raw),
        };
        let mut point = converter.screen_to_point(constrained.screen)?;
        if let Some(hint) = constrained.snap {
            if let Some(reference) = references.logical.get(hint.reference_index) {
                match hint.axis {
                    SnapAxis::Time => point.timestamp = reference.timestamp,
                    SnapAxis::Price => point.price = reference.price,
                }
            }
        }
        Some(point)
    }
}

/// Whole-tool translation from the gesture-start points.
///
/// The pixel delta is applied to the first original point on screen and the
/// resulting logical delta is applied to every original point.
fn translated_points<H: ChartHost + ?Sized>(
    original: &[Point],
    mut delta: ScreenPoint,
    shift_held: bool,
    converter: &CoordinateConverter<'_, H>,
) -> Option<Vec<Point>> {
    if shift_held {
        if delta.x.abs() >= delta.y.abs() {
            delta.y = 0.0;
        } else {
            delta.x = 0.0;
        }
    }
    let origin = *original.first()?;
    let origin_screen = converter.point_to_screen(origin)?;
    let moved = converter.screen_to_point(origin_screen + delta)?;
    let (delta_time, delta_price) = (moved.timestamp - origin.timestamp, moved.price - origin.price);
    Some(
        original
            .iter()
            .map(|point| point.offset(delta_time, delta_price))
            .collect(),
    )
}

fn hover_cursor(tool: Option<&ToolInstance>, hit: HitTestResult) -> CursorStyle {
    if let Some(cursor) = hit.data.suggested_cursor {
        return cursor;
    }
    match tool {
        Some(tool) if hit.anchor_index().is_some() => tool.options().default_anchor_hover_cursor,
        Some(tool) => tool.options().default_hover_cursor,
        None => CursorStyle::Default,
    }
}
