use serde::{Deserialize, Serialize};

use crate::core::{ScreenPoint, ViewportBounds};
use crate::culling::CullingState;
use crate::labels::AxisLabelLayout;
use crate::tools::ToolType;

/// Per-tool output of one view-update pass.
///
/// Screen vectors are empty when any point failed to convert; the tool then
/// simply is not drawn this frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolView {
    pub id: String,
    pub kind: String,
    pub tool_type: ToolType,
    pub culling: CullingState,
    /// Permanent points followed by the ghost point, if any.
    pub points_screen: Vec<ScreenPoint>,
    pub anchors_screen: Vec<ScreenPoint>,
    pub selected: bool,
    pub hovered: bool,
    pub editing: bool,
    pub creating: bool,
}

impl ToolView {
    /// Anchors are drawn for the tools the user is interacting with.
    #[must_use]
    pub fn shows_anchors(&self) -> bool {
        self.selected || self.hovered || self.editing || self.creating
    }
}

/// Everything a renderer needs for one redraw, in z-order (bottom first).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverlayFrame {
    /// `None` when the host cannot resolve its visible range yet.
    pub viewport_bounds: Option<ViewportBounds>,
    pub tools: Vec<ToolView>,
    pub labels: AxisLabelLayout,
}

impl OverlayFrame {
    pub fn visible_tools(&self) -> impl Iterator<Item = &ToolView> {
        self.tools.iter().filter(|view| view.culling.is_visible())
    }

    #[must_use]
    pub fn tool(&self, id: &str) -> Option<&ToolView> {
        self.tools.iter().find(|view| view.id == id)
    }
}
