//! Tool kinds, instances and the kind registry.

pub mod behavior;
pub mod collection;
pub mod instance;
pub mod kinds;
pub mod options;
pub mod registry;
pub mod types;

pub use behavior::{CullingGeometry, HitTestContext, ShiftConstrainable, ToolBehavior};
pub use collection::{ToolCollection, id_matches_pattern};
pub use instance::ToolInstance;
pub use options::ToolOptions;
pub use registry::{RegisteredTool, ToolConstructor, ToolRegistry};
pub use types::{
    ConstrainedPoint, ConstraintPhase, FinalizationMethod, HitTestData, HitTestResult, HitTestType,
    PointsCount, SnapAxis, SnapHint, ToolCapabilities, ToolExport, ToolType,
};
