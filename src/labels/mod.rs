//! Axis labels for tool anchors and their vertical stacking.

pub mod axis_labels;
pub mod format;
pub mod stacking;

pub use axis_labels::{
    AxisLabelConfig, AxisLabelLayout, AxisLabelView, PriceAxisLabel, TimeAxisLabel, price_label_id,
    time_label_id,
};
pub use format::{DEFAULT_TIME_LABEL_PATTERN, format_price_label, format_time_label};
pub use stacking::{LabelRegistration, LabelStackingManager, StackingResolution};
