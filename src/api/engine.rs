use std::mem;

use tracing::{debug, trace};

use crate::error::OverlayResult;
use crate::host::ChartHost;
use crate::interaction::{InteractionContext, InteractionEvent, InteractionManager, InteractionMode};
use crate::labels::{AxisLabelView, LabelStackingManager};
use crate::tools::{ToolCollection, ToolInstance, ToolRegistry};

use super::events::{
    AfterEditEvent, AfterEditHandler, AfterEditStage, DoubleClickEvent, DoubleClickHandler,
    SelectionChangedEvent, SelectionChangedHandler, SubscriptionId, Subscriptions,
};
use super::OverlayConfig;

/// Drawing-tool overlay attached to one chart surface.
///
/// `OverlayEngine` owns the tool collection and coordinates the registry,
/// the interaction state machine, label stacking and subscriber dispatch.
/// All work happens synchronously inside the calling input or update method.
pub struct OverlayEngine<H: ChartHost> {
    pub(super) host: H,
    pub(super) config: OverlayConfig,
    pub(super) registry: ToolRegistry,
    pub(super) tools: ToolCollection,
    pub(super) interaction: InteractionManager,
    pub(super) stacking: LabelStackingManager,
    pub(super) labels: AxisLabelView,
    pub(super) subscriptions: Subscriptions,
    pub(super) pending_events: Vec<InteractionEvent>,
}

impl<H: ChartHost> OverlayEngine<H> {
    /// Creates an engine with every built-in tool kind registered.
    pub fn new(host: H, config: OverlayConfig) -> OverlayResult<Self> {
        Self::with_registry(host, config, ToolRegistry::with_builtin_kinds())
    }

    pub fn with_registry(host: H, config: OverlayConfig, registry: ToolRegistry) -> OverlayResult<Self> {
        config.validate()?;
        debug!(kinds = registry.kinds().count(), "overlay engine created");
        Ok(Self {
            host,
            interaction: InteractionManager::new(config.interaction_config()),
            labels: AxisLabelView::new(config.axis_label_config()),
            config,
            registry,
            tools: ToolCollection::new(),
            stacking: LabelStackingManager::new(),
            subscriptions: Subscriptions::default(),
            pending_events: Vec::new(),
        })
    }

    #[must_use]
    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: OverlayConfig) -> OverlayResult<()> {
        config.validate()?;
        self.interaction.set_config(config.interaction_config());
        self.labels.set_config(config.axis_label_config());
        self.config = config;
        self.host.request_redraw();
        Ok(())
    }

    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable host access, e.g. to scroll or resize the surface.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    #[must_use]
    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    #[must_use]
    pub fn tools(&self) -> &ToolCollection {
        &self.tools
    }

    #[must_use]
    pub fn tool(&self, id: &str) -> Option<&ToolInstance> {
        self.tools.get(id)
    }

    #[must_use]
    pub fn tool_count(&self) -> usize {
        self.tools.len()
    }

    #[must_use]
    pub fn interaction_mode(&self) -> InteractionMode {
        self.interaction.mode()
    }

    #[must_use]
    pub fn interaction(&self) -> &InteractionManager {
        &self.interaction
    }

    #[must_use]
    pub fn selected_tool_id(&self) -> Option<&str> {
        self.interaction.selected_tool_id()
    }

    #[must_use]
    pub fn creating_tool_id(&self) -> Option<&str> {
        self.interaction.creating_tool_id()
    }

    pub fn subscribe_double_click(&mut self, handler: impl FnMut(&DoubleClickEvent) + 'static) -> SubscriptionId {
        let handler: DoubleClickHandler = Box::new(handler);
        self.subscriptions.add_double_click(handler)
    }

    pub fn subscribe_after_edit(&mut self, handler: impl FnMut(&AfterEditEvent) + 'static) -> SubscriptionId {
        let handler: AfterEditHandler = Box::new(handler);
        self.subscriptions.add_after_edit(handler)
    }

    pub fn subscribe_selection_changed(
        &mut self,
        handler: impl FnMut(&SelectionChangedEvent) + 'static,
    ) -> SubscriptionId {
        let handler: SelectionChangedHandler = Box::new(handler);
        self.subscriptions.add_selection_changed(handler)
    }

    /// Returns `true` when the subscription existed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscriptions.remove(id)
    }

    pub fn set_crosshair_at(&mut self, x: f64, y: f64, visible: bool) {
        self.host.set_crosshair(x, y, visible);
    }

    pub fn clear_crosshair(&mut self) {
        self.host.clear_crosshair();
    }

    #[must_use]
    pub fn into_host(self) -> H {
        self.host
    }

    /// Runs `f` against the interaction manager without dispatching its events.
    pub(super) fn interact<T>(
        &mut self,
        f: impl FnOnce(&mut InteractionManager, &mut InteractionContext<'_, H>) -> T,
    ) -> T {
        let mut ctx = InteractionContext::new(&mut self.tools, &mut self.host, &mut self.pending_events);
        f(&mut self.interaction, &mut ctx)
    }

    /// Removes a tool and every reference to it. Events are left pending.
    pub(super) fn detach_tool(&mut self, id: &str) -> bool {
        if !self.tools.contains(id) {
            debug!(tool_id = id, "remove of unknown tool ignored");
            return false;
        }
        self.interact(|manager, ctx| manager.forget_tool(id, ctx));
        self.labels.forget_tool(id, &mut self.stacking);
        if let Some(mut tool) = self.tools.remove(id) {
            tool.destroy();
        }
        self.host.request_redraw();
        debug!(tool_id = id, "tool removed");
        true
    }

    /// Drains manager events into subscriber notifications.
    ///
    /// Cancelled creation targets are removed here; removal may raise further
    /// events, so draining repeats until the outbox stays empty.
    pub(super) fn dispatch_events(&mut self) {
        while !self.pending_events.is_empty() {
            for event in mem::take(&mut self.pending_events) {
                self.dispatch_event(event);
            }
        }
    }

    fn dispatch_event(&mut self, event: InteractionEvent) {
        trace!(?event, "dispatching interaction event");
        match event {
            InteractionEvent::CreationCancelled { tool_id } => {
                self.detach_tool(&tool_id);
            }
            InteractionEvent::SelectionChanged { tool_id } => {
                let selected = tool_id
                    .as_deref()
                    .and_then(|id| self.tools.get(id))
                    .map(ToolInstance::export_data);
                self.subscriptions
                    .notify_selection_changed(&SelectionChangedEvent { selected });
            }
            InteractionEvent::DoubleClicked { tool_id } => {
                if let Some(tool) = self.tools.get(&tool_id) {
                    let event = DoubleClickEvent {
                        tool: tool.export_data(),
                    };
                    self.subscriptions.notify_double_click(&event);
                }
            }
            InteractionEvent::Edited { tool_id } => self.notify_after_edit(&tool_id, AfterEditStage::Edited),
            InteractionEvent::PathFinished { tool_id } => {
                self.notify_after_edit(&tool_id, AfterEditStage::PathFinished);
            }
            InteractionEvent::Finished { tool_id } => self.notify_after_edit(&tool_id, AfterEditStage::Finished),
        }
    }

    fn notify_after_edit(&mut self, tool_id: &str, stage: AfterEditStage) {
        let Some(tool) = self.tools.get(tool_id) else {
            debug!(tool_id, ?stage, "after-edit event for removed tool dropped");
            return;
        };
        let event = AfterEditEvent {
            stage,
            tool: tool.export_data(),
        };
        self.subscriptions.notify_after_edit(&event);
    }
}
