//! Public facade over tools, interaction and label placement.

mod config;
mod engine;
mod events;
mod frame;
mod input_controller;
mod snapshot_controller;
mod tool_controller;
mod view_coordinator;

pub use config::OverlayConfig;
pub use engine::OverlayEngine;
pub use events::{
    AfterEditEvent, AfterEditHandler, AfterEditStage, DoubleClickEvent, DoubleClickHandler,
    SelectionChangedEvent, SelectionChangedHandler, SubscriptionId,
};
pub use frame::{OverlayFrame, ToolView};
pub use snapshot_controller::{TOOLS_SNAPSHOT_JSON_SCHEMA_V1, ToolsSnapshotJsonContractV1};
