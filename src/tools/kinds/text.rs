use crate::core::{BoxBounds, ScreenPoint};
use crate::host::CursorStyle;
use crate::tools::behavior::{HitTestContext, ToolBehavior};
use crate::tools::hit_test::anchor_hit;
use crate::tools::options::ToolOptions;
use crate::tools::types::{HitTestResult, HitTestType, PointsCount, ToolCapabilities, ToolType};

const CHAR_WIDTH_PX: f64 = 7.0;
const LINE_HEIGHT_PX: f64 = 18.0;
const PADDING_PX: f64 = 4.0;

/// Text note anchored at its bottom-left corner.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextTool;

/// Approximate pixel box of the text, laid out to the right of and above `anchor`.
#[must_use]
pub fn text_bounds(anchor: ScreenPoint, text: &str) -> BoxBounds {
    let lines: Vec<&str> = if text.is_empty() { vec![""] } else { text.lines().collect() };
    let widest = lines.iter().map(|line| line.chars().count()).max().unwrap_or(0);
    let width = widest.max(1) as f64 * CHAR_WIDTH_PX + PADDING_PX * 2.0;
    let height = lines.len().max(1) as f64 * LINE_HEIGHT_PX + PADDING_PX * 2.0;
    BoxBounds::new(anchor, ScreenPoint::new(anchor.x + width, anchor.y - height))
}

impl ToolBehavior for TextTool {
    fn tool_type(&self) -> ToolType {
        ToolType::Text
    }

    fn points_count(&self) -> PointsCount {
        PointsCount::Fixed(1)
    }

    fn capabilities(&self) -> ToolCapabilities {
        ToolCapabilities::default()
    }

    fn default_options(&self) -> ToolOptions {
        ToolOptions {
            text: Some("Text".to_owned()),
            default_hover_cursor: CursorStyle::Move,
            ..ToolOptions::default()
        }
        .with_axis_labels(false, false)
    }

    fn hit_test(&self, context: &HitTestContext<'_>) -> Option<HitTestResult> {
        if let Some(hit) = anchor_hit(context) {
            return Some(hit);
        }
        let anchor = context.points.first()?;
        let text = context.options.text.as_deref().unwrap_or_default();
        text_bounds(*anchor, text)
            .expanded(context.tolerance_px)
            .contains(context.pointer)
            .then(|| {
                HitTestResult::body(
                    HitTestType::MovePointBackground,
                    None,
                )
            })
    }
}
