//! Pointer/keyboard gesture handling for drawing tools.

mod gesture;
mod manager;

pub use gesture::{CreationGesture, EditGesture, Gesture};
pub use manager::{InteractionContext, InteractionManager};

use serde::{Deserialize, Serialize};

use crate::core::ScreenPoint;
use crate::error::{OverlayError, OverlayResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InteractionMode {
    Idle,
    Creation,
    Edit,
}

/// Keys the overlay reacts to; everything else is `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    Shift,
    Escape,
    Other,
}

/// Input state that persists across events.
///
/// The shift flag is sampled from here on every gesture step rather than
/// read from individual events, so a key change between events is never
/// missed.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct InputState {
    pub shift_held: bool,
    pub pressed: bool,
    pub last_pointer: Option<ScreenPoint>,
}

/// Pixel tolerances of the gesture state machine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Pointer travel that turns a press into a drag.
    pub drag_threshold_px: f64,
    pub hit_tolerance_px: f64,
    pub anchor_radius_px: f64,
    /// Minimum spacing between freehand samples.
    pub freehand_min_step_px: f64,
    /// Trailing points closer than this on double click are dropped.
    pub double_click_rogue_point_px: f64,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            drag_threshold_px: 3.0,
            hit_tolerance_px: 4.0,
            anchor_radius_px: 6.0,
            freehand_min_step_px: 1.0,
            double_click_rogue_point_px: 4.0,
        }
    }
}

impl InteractionConfig {
    pub fn validate(self) -> OverlayResult<Self> {
        let fields = [
            ("drag_threshold_px", self.drag_threshold_px),
            ("hit_tolerance_px", self.hit_tolerance_px),
            ("anchor_radius_px", self.anchor_radius_px),
            ("freehand_min_step_px", self.freehand_min_step_px),
            ("double_click_rogue_point_px", self.double_click_rogue_point_px),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(OverlayError::InvalidConfig(format!(
                    "{name} must be finite and >= 0"
                )));
            }
        }
        Ok(self)
    }
}

/// Notifications raised by the manager, drained by the facade after each input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InteractionEvent {
    SelectionChanged { tool_id: Option<String> },
    DoubleClicked { tool_id: String },
    Edited { tool_id: String },
    /// An unbounded tool's path was closed; always followed by `Finished`.
    PathFinished { tool_id: String },
    Finished { tool_id: String },
    /// The creation target was abandoned and should be removed.
    CreationCancelled { tool_id: String },
}
