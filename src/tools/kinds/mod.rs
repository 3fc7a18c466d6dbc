//! Built-in tool kinds.

mod axis_lines;
mod channel;
mod fib;
mod freehand;
mod lines;
mod shapes;
mod text;

pub use axis_lines::AxisLineTool;
pub use channel::ParallelChannelTool;
pub use fib::{FIB_LEVELS, FibRetracementTool, fib_level_price};
pub use freehand::{BrushTool, PathTool};
pub use lines::LineTool;
pub use shapes::{RectangleTool, TriangleTool};
pub use text::TextTool;

use crate::tools::behavior::ToolBehavior;
use crate::tools::types::ToolType;

/// Fresh behavior for a built-in tool type.
#[must_use]
pub fn builtin_behavior(tool_type: ToolType) -> Box<dyn ToolBehavior> {
    match tool_type {
        ToolType::TrendLine | ToolType::Ray | ToolType::ExtendedLine | ToolType::Arrow => {
            Box::new(LineTool::new(tool_type))
        }
        ToolType::HorizontalLine
        | ToolType::HorizontalRay
        | ToolType::VerticalLine
        | ToolType::CrossLine => Box::new(AxisLineTool::new(tool_type)),
        ToolType::Rectangle => Box::new(RectangleTool),
        ToolType::Triangle => Box::new(TriangleTool),
        ToolType::ParallelChannel => Box::new(ParallelChannelTool),
        ToolType::FibRetracement => Box::new(FibRetracementTool),
        ToolType::Text => Box::new(TextTool),
        ToolType::Path => Box::new(PathTool),
        ToolType::Brush => Box::new(BrushTool),
    }
}
