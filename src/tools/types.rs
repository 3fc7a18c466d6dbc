use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::{Point, ScreenPoint};
use crate::error::OverlayError;
use crate::host::CursorStyle;
use crate::tools::options::ToolOptions;

/// Geometry class of a tool kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolType {
    TrendLine,
    Ray,
    ExtendedLine,
    Arrow,
    HorizontalLine,
    HorizontalRay,
    VerticalLine,
    CrossLine,
    Rectangle,
    Triangle,
    ParallelChannel,
    FibRetracement,
    Text,
    Path,
    Brush,
}

impl ToolType {
    pub const ALL: [Self; 15] = [
        Self::TrendLine,
        Self::Ray,
        Self::ExtendedLine,
        Self::Arrow,
        Self::HorizontalLine,
        Self::HorizontalRay,
        Self::VerticalLine,
        Self::CrossLine,
        Self::Rectangle,
        Self::Triangle,
        Self::ParallelChannel,
        Self::FibRetracement,
        Self::Text,
        Self::Path,
        Self::Brush,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TrendLine => "TrendLine",
            Self::Ray => "Ray",
            Self::ExtendedLine => "ExtendedLine",
            Self::Arrow => "Arrow",
            Self::HorizontalLine => "HorizontalLine",
            Self::HorizontalRay => "HorizontalRay",
            Self::VerticalLine => "VerticalLine",
            Self::CrossLine => "CrossLine",
            Self::Rectangle => "Rectangle",
            Self::Triangle => "Triangle",
            Self::ParallelChannel => "ParallelChannel",
            Self::FibRetracement => "FibRetracement",
            Self::Text => "Text",
            Self::Path => "Path",
            Self::Brush => "Brush",
        }
    }
}

impl fmt::Display for ToolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolType {
    type Err = OverlayError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tool_type| tool_type.as_str() == value)
            .ok_or_else(|| OverlayError::UnregisteredTool {
                kind: value.to_owned(),
            })
    }
}

/// How many permanent points a tool holds once finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointsCount {
    Fixed(usize),
    Unbounded,
}

impl PointsCount {
    #[must_use]
    pub fn limit(self) -> Option<usize> {
        match self {
            Self::Fixed(count) => Some(count),
            Self::Unbounded => None,
        }
    }

    #[must_use]
    pub fn is_unbounded(self) -> bool {
        matches!(self, Self::Unbounded)
    }

    /// Whether one more point still fits.
    #[must_use]
    pub fn has_room_for(self, current: usize) -> bool {
        self.limit().is_none_or(|limit| current < limit)
    }
}

/// User action that ends the creation phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinalizationMethod {
    PointCount,
    ReleaseOnDrag,
    DoubleClick,
}

/// Interaction capabilities of a tool kind, resolved once at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCapabilities {
    pub click_click_creation: bool,
    pub click_drag_creation: bool,
    pub shift_constraint_on_click_click: bool,
    pub shift_constraint_on_click_drag: bool,
    pub finalization: FinalizationMethod,
    /// Highest interactive anchor index; `None` means one anchor per point.
    pub max_anchor_index: Option<usize>,
    pub anchor0_triggers_translation: bool,
    pub discards_rogue_point_on_double_click: bool,
}

impl Default for ToolCapabilities {
    fn default() -> Self {
        Self {
            click_click_creation: true,
            click_drag_creation: false,
            shift_constraint_on_click_click: false,
            shift_constraint_on_click_drag: false,
            finalization: FinalizationMethod::PointCount,
            max_anchor_index: None,
            anchor0_triggers_translation: false,
            discards_rogue_point_on_double_click: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitTestType {
    /// Tool body, drags translate the whole tool.
    Regular,
    /// Anchor handle, drags reshape the tool.
    MovePoint,
    /// Filled background of the tool, drags translate.
    MovePointBackground,
    /// Anchor handle that edits a derived property.
    ChangePoint,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HitTestData {
    pub point_index: Option<usize>,
    pub suggested_cursor: Option<CursorStyle>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitTestResult {
    pub hit_type: HitTestType,
    pub data: HitTestData,
}

impl HitTestResult {
    #[must_use]
    pub fn body(hit_type: HitTestType, suggested_cursor: Option<CursorStyle>) -> Self {
        Self {
            hit_type,
            data: HitTestData {
                point_index: None,
                suggested_cursor,
            },
        }
    }

    #[must_use]
    pub fn anchor(point_index: usize, suggested_cursor: Option<CursorStyle>) -> Self {
        Self {
            hit_type: HitTestType::MovePoint,
            data: HitTestData {
                point_index: Some(point_index),
                suggested_cursor,
            },
        }
    }

    /// Anchor index for reshaping hits, `None` for body hits.
    #[must_use]
    pub fn anchor_index(self) -> Option<usize> {
        match self.hit_type {
            HitTestType::MovePoint | HitTestType::ChangePoint => self.data.point_index,
            HitTestType::Regular | HitTestType::MovePointBackground | HitTestType::Custom => None,
        }
    }
}

/// Axis a shift-constrained point was snapped onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnapAxis {
    /// Same timestamp as the reference anchor (vertical alignment).
    Time,
    /// Same price as the reference anchor (horizontal alignment).
    Price,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapHint {
    pub axis: SnapAxis,
    pub reference_index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintPhase {
    ClickClick,
    ClickDrag,
    Edit,
}

/// Screen-space result of a shift constraint plus the logical snap to apply.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstrainedPoint {
    pub screen: ScreenPoint,
    pub snap: Option<SnapHint>,
}

impl ConstrainedPoint {
    #[must_use]
    pub fn unconstrained(screen: ScreenPoint) -> Self {
        Self { screen, snap: None }
    }
}

/// Serializable snapshot of one tool; the only durable artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolExport {
    pub id: String,
    pub kind: String,
    pub points: Vec<Point>,
    pub options: ToolOptions,
}
