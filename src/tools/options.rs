use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{OverlayError, OverlayResult};
use crate::host::CursorStyle;

/// Per-tool options record.
///
/// Styling (colors, widths, fonts) is opaque to the engine and travels in
/// `style` untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolOptions {
    pub visible: bool,
    pub editable: bool,
    pub default_hover_cursor: CursorStyle,
    pub default_drag_cursor: Option<CursorStyle>,
    pub default_anchor_hover_cursor: CursorStyle,
    pub default_anchor_drag_cursor: Option<CursorStyle>,
    pub show_price_axis_labels: bool,
    pub show_time_axis_labels: bool,
    pub price_precision: u32,
    pub extend_left: bool,
    pub extend_right: bool,
    pub text: Option<String>,
    pub style: Map<String, Value>,
}

impl Default for ToolOptions {
    fn default() -> Self {
        Self {
            visible: true,
            editable: true,
            default_hover_cursor: CursorStyle::Pointer,
            default_drag_cursor: None,
            default_anchor_hover_cursor: CursorStyle::Pointer,
            default_anchor_drag_cursor: None,
            show_price_axis_labels: true,
            show_time_axis_labels: true,
            price_precision: 2,
            extend_left: false,
            extend_right: false,
            text: None,
            style: Map::new(),
        }
    }
}

impl ToolOptions {
    /// Deep-merges a partial JSON object into these options.
    ///
    /// The merge is all-or-nothing: on a type mismatch the options are left
    /// untouched and an error is returned.
    pub fn merge_json(&mut self, partial: &Value) -> OverlayResult<()> {
        if !partial.is_object() {
            return Err(OverlayError::InvalidOptions(
                "options patch must be a JSON object".to_owned(),
            ));
        }
        let mut merged = serde_json::to_value(&*self)
            .map_err(|e| OverlayError::InvalidOptions(format!("failed to serialize options: {e}")))?;
        deep_merge(&mut merged, partial);
        let updated: Self = serde_json::from_value(merged)
            .map_err(|e| OverlayError::InvalidOptions(format!("failed to apply options: {e}")))?;
        if updated.price_precision > 12 {
            return Err(OverlayError::InvalidOptions(
                "price_precision must be <= 12".to_owned(),
            ));
        }
        *self = updated;
        Ok(())
    }

    #[must_use]
    pub fn with_extend(mut self, left: bool, right: bool) -> Self {
        self.extend_left = left;
        self.extend_right = right;
        self
    }

    #[must_use]
    pub fn with_axis_labels(mut self, price: bool, time: bool) -> Self {
        self.show_price_axis_labels = price;
        self.show_time_axis_labels = time;
        self
    }
}

/// Recursively merges `patch` into `target`; non-object values replace.
pub fn deep_merge(target: &mut Value, patch: &Value) {
    match (target, patch) {
        (Value::Object(target_map), Value::Object(patch_map)) => {
            for (key, patch_value) in patch_map {
                match target_map.get_mut(key) {
                    Some(existing) => deep_merge(existing, patch_value),
                    None => {
                        target_map.insert(key.clone(), patch_value.clone());
                    }
                }
            }
        }
        (target, patch) => *target = patch.clone(),
    }
}
