use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::tools::ToolExport;

/// Stage reported to after-edit subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AfterEditStage {
    /// An existing tool was reshaped or moved.
    Edited,
    /// An unbounded tool closed its path; `Finished` follows.
    PathFinished,
    /// Interactive creation completed.
    Finished,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AfterEditEvent {
    pub stage: AfterEditStage,
    pub tool: ToolExport,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoubleClickEvent {
    pub tool: ToolExport,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionChangedEvent {
    /// `None` when the selection was cleared.
    pub selected: Option<ToolExport>,
}

/// Handle returned by the `subscribe_*` calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

pub type DoubleClickHandler = Box<dyn FnMut(&DoubleClickEvent)>;
pub type AfterEditHandler = Box<dyn FnMut(&AfterEditEvent)>;
pub type SelectionChangedHandler = Box<dyn FnMut(&SelectionChangedEvent)>;

/// Subscriber lists, notified in subscription order.
#[derive(Default)]
pub(crate) struct Subscriptions {
    next_id: u64,
    double_click: IndexMap<SubscriptionId, DoubleClickHandler>,
    after_edit: IndexMap<SubscriptionId, AfterEditHandler>,
    selection_changed: IndexMap<SubscriptionId, SelectionChangedHandler>,
}

impl Subscriptions {
    fn next_id(&mut self) -> SubscriptionId {
        self.next_id += 1;
        SubscriptionId(self.next_id)
    }

    pub(crate) fn add_double_click(&mut self, handler: DoubleClickHandler) -> SubscriptionId {
        let id = self.next_id();
        self.double_click.insert(id, handler);
        id
    }

    pub(crate) fn add_after_edit(&mut self, handler: AfterEditHandler) -> SubscriptionId {
        let id = self.next_id();
        self.after_edit.insert(id, handler);
        id
    }

    pub(crate) fn add_selection_changed(
        &mut self,
        handler: SelectionChangedHandler,
    ) -> SubscriptionId {
        let id = self.next_id();
        self.selection_changed.insert(id, handler);
        id
    }

    pub(crate) fn remove(&mut self, id: SubscriptionId) -> bool {
        self.double_click.shift_remove(&id).is_some()
            || self.after_edit.shift_remove(&id).is_some()
            || self.selection_changed.shift_remove(&id).is_some()
    }

    pub(crate) fn len(&self) -> usize {
        self.double_click.len() + self.after_edit.len() + self.selection_changed.len()
    }

    pub(crate) fn notify_double_click(&mut self, event: &DoubleClickEvent) {
        trace!(tool_id = %event.tool.id, subscribers = self.double_click.len(), "double click dispatched");
        for handler in self.double_click.values_mut() {
            handler(event);
        }
    }

    pub(crate) fn notify_after_edit(&mut self, event: &AfterEditEvent) {
        trace!(tool_id = %event.tool.id, stage = ?event.stage, "after edit dispatched");
        for handler in self.after_edit.values_mut() {
            handler(event);
        }
    }

    pub(crate) fn notify_selection_changed(&mut self, event: &SelectionChangedEvent) {
        for handler in self.selection_changed.values_mut() {
            handler(event);
        }
    }
}
