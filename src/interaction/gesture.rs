use smallvec::SmallVec;

use crate::core::{Point, ScreenPoint};
use crate::host::CursorStyle;

/// Active gesture of the interaction manager.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Gesture {
    #[default]
    Idle,
    Creation(CreationGesture),
    Edit(EditGesture),
}

impl Gesture {
    /// Tool the gesture is operating on.
    #[must_use]
    pub fn tool_id(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::Creation(gesture) => Some(&gesture.tool_id),
            Self::Edit(gesture) => Some(&gesture.tool_id),
        }
    }
}

/// Press on the chart while a creation target exists.
#[derive(Debug, Clone, PartialEq)]
pub struct CreationGesture {
    pub tool_id: String,
    pub down_screen: ScreenPoint,
    /// Points were committed by dragging rather than by discrete clicks.
    pub drag_committed: bool,
    /// Last freehand sample, for spacing new samples.
    pub last_sample: Option<ScreenPoint>,
}

impl CreationGesture {
    #[must_use]
    pub fn new(tool_id: String, down_screen: ScreenPoint) -> Self {
        Self {
            tool_id,
            down_screen,
            drag_committed: false,
            last_sample: None,
        }
    }
}

/// Press on an existing tool: anchor drag (`anchor_index` set) or body translation.
#[derive(Debug, Clone, PartialEq)]
pub struct EditGesture {
    pub tool_id: String,
    pub anchor_index: Option<usize>,
    pub cursor: CursorStyle,
    pub down_screen: ScreenPoint,
    /// Permanent points at gesture start; all translation is relative to these.
    pub original_points: Vec<Point>,
    /// Interactive anchors at gesture start.
    pub original_anchors: SmallVec<[Point; 4]>,
    /// `original_anchors` in pixels, `None` when any failed to convert.
    pub original_anchors_screen: Option<SmallVec<[ScreenPoint; 4]>>,
    pub moved: bool,
}
