use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// One price-axis label competing for vertical space.
///
/// `desired_coordinate` is the label's top edge in pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelRegistration {
    pub id: String,
    pub owner_tool_id: String,
    pub desired_coordinate: f64,
    pub height: f64,
    pub visible: bool,
}

impl LabelRegistration {
    #[must_use]
    pub fn new(id: impl Into<String>, owner_tool_id: impl Into<String>, desired_coordinate: f64, height: f64) -> Self {
        Self {
            id: id.into(),
            owner_tool_id: owner_tool_id.into(),
            desired_coordinate,
            height,
            visible: true,
        }
    }

    #[must_use]
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    fn is_placeable(&self) -> bool {
        self.visible && self.desired_coordinate.is_finite() && self.height.is_finite()
    }
}

/// Resolved label positions keyed by label id.
///
/// `Some(top)` moves a label to `top`; `None` leaves it at its natural
/// position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StackingResolution {
    positions: IndexMap<String, Option<f64>>,
}

impl StackingResolution {
    /// Override for `id`, `None` when absent or left at its natural position.
    #[must_use]
    pub fn coordinate(&self, id: &str) -> Option<f64> {
        self.positions.get(id).copied().flatten()
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.positions.contains_key(id)
    }

    /// Final top edge for a label whose natural top is `desired`.
    #[must_use]
    pub fn final_coordinate(&self, id: &str, desired: f64) -> f64 {
        self.coordinate(id).unwrap_or(desired)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<f64>)> {
        self.positions.iter().map(|(id, position)| (id.as_str(), *position))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Resolves vertical overlap between price-axis labels.
#[derive(Debug, Clone, Default)]
pub struct LabelStackingManager {
    entries: IndexMap<String, LabelRegistration>,
}

impl LabelStackingManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the entry with the same id.
    pub fn register(&mut self, entry: LabelRegistration) {
        trace!(label_id = %entry.id, desired = entry.desired_coordinate, "label registered");
        self.entries.insert(entry.id.clone(), entry);
    }

    pub fn unregister(&mut self, id: &str) -> bool {
        self.entries.shift_remove(id).is_some()
    }

    /// Drops every label owned by `owner_tool_id`, returning how many went.
    pub fn unregister_owner(&mut self, owner_tool_id: &str) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| entry.owner_tool_id != owner_tool_id);
        let removed = before - self.entries.len();
        if removed > 0 {
            debug!(owner_tool_id, removed, "labels unregistered with their tool");
        }
        removed
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&LabelRegistration> {
        self.entries.get(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Sweeps visible labels top to bottom, pushing each overlapping label
    /// flush beneath the previous one.
    ///
    /// Ties on the desired coordinate are broken by id so the layout does not
    /// depend on registration order. Hidden or non-finite entries resolve to
    /// their natural position.
    #[must_use]
    pub fn update_stacking(&self) -> StackingResolution {
        let mut placeable: Vec<&LabelRegistration> = self
            .entries
            .values()
            .filter(|entry| entry.is_placeable())
            .collect();
        placeable.sort_by(|left, right| {
            OrderedFloat(left.desired_coordinate)
                .cmp(&OrderedFloat(right.desired_coordinate))
                .then_with(|| left.id.cmp(&right.id))
        });

        let mut positions: IndexMap<String, Option<f64>> = IndexMap::with_capacity(self.entries.len());
        let mut last_bottom = f64::NEG_INFINITY;
        for entry in placeable {
            let top = if entry.desired_coordinate < last_bottom {
                last_bottom
            } else {
                entry.desired_coordinate
            };
            last_bottom = top + entry.height.max(0.0);
            let resolved = (top != entry.desired_coordinate).then_some(top);
            positions.insert(entry.id.clone(), resolved);
        }
        for entry in self.entries.values() {
            positions.entry(entry.id.clone()).or_insert(None);
        }

        trace!(labels = positions.len(), "label stacking resolved");
        StackingResolution { positions }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn overlapping_labels_are_pushed_flush() {
        let mut manager = LabelStackingManager::new();
        manager.register(LabelRegistration::new("b", "tool-1", 104.0, 20.0));
        manager.register(LabelRegistration::new("a", "tool-1", 100.0, 20.0));
        let resolution = manager.update_stacking();
        assert_eq!(resolution.coordinate("a"), None);
        assert_relative_eq!(resolution.coordinate("b").expect("pushed"), 120.0);
    }

    #[test]
    fn push_accumulates_down_the_stack() {
        let mut manager = LabelStackingManager::new();
        for (id, desired) in [("a", 100.0), ("b", 101.0), ("c", 102.0)] {
            manager.register(LabelRegistration::new(id, "tool", desired, 20.0));
        }
        let resolution = manager.update_stacking();
        assert_relative_eq!(resolution.final_coordinate("c", 102.0), 140.0);
    }

    #[test]
    fn touching_labels_stay_put() {
        let mut manager = LabelStackingManager::new();
        manager.register(LabelRegistration::new("a", "t", 100.0, 20.0));
        manager.register(LabelRegistration::new("b", "t", 120.0, 20.0));
        assert_eq!(manager.update_stacking().coordinate("b"), None);
    }

    #[test]
    fn hidden_labels_neither_move_nor_block() {
        let mut manager = LabelStackingManager::new();
        manager.register(LabelRegistration::new("a", "t", 100.0, 20.0).with_visible(false));
        manager.register(LabelRegistration::new("b", "t", 105.0, 20.0));
        let resolution = manager.update_stacking();
        assert!(resolution.contains("a"));
        assert_eq!(resolution.coordinate("a"), None);
        assert_eq!(resolution.coordinate("b"), None);
    }

    #[test]
    fn register_upserts_by_id() {
        let mut manager = LabelStackingManager::new();
        manager.register(LabelRegistration::new("a", "t", 100.0, 20.0));
        manager.register(LabelRegistration::new("a", "t", 300.0, 20.0));
        assert_eq!(manager.len(), 1);
        assert_relative_eq!(manager.get("a").expect("entry").desired_coordinate, 300.0);
    }

    #[test]
    fn unregister_owner_drops_only_that_tool() {
        let mut manager = LabelStackingManager::new();
        manager.register(LabelRegistration::new("x:price:0", "x", 1.0, 20.0));
        manager.register(LabelRegistration::new("x:price:1", "x", 50.0, 20.0));
        manager.register(LabelRegistration::new("y:price:0", "y", 10.0, 20.0));
        assert_eq!(manager.unregister_owner("x"), 2);
        assert_eq!(manager.ids().collect::<Vec<_>>(), vec!["y:price:0"]);
        assert!(!manager.unregister("x:price:0"));
    }
}
