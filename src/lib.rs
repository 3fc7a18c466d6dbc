//! chart-overlay-rs: interactive drawing-tool overlay for time-series charts.
//!
//! Tools are anchored in logical (time, price) space and projected onto a
//! host chart surface through the [`host::ChartHost`] contract. The crate
//! owns tool state, the pointer gesture state machine, viewport culling and
//! price-axis label stacking; drawing pixels stays with the host.

pub mod api;
pub mod core;
pub mod culling;
pub mod error;
pub mod host;
pub mod interaction;
pub mod labels;
pub mod telemetry;
pub mod tools;

pub use api::{OverlayConfig, OverlayEngine, OverlayFrame};
pub use error::{OverlayError, OverlayResult};
