use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::CoordinateConverter;
use crate::error::{OverlayError, OverlayResult};
use crate::host::ChartHost;
use crate::labels::format::{
    DEFAULT_TIME_LABEL_PATTERN, format_price_label, format_time_label, validate_time_pattern,
};
use crate::labels::stacking::{LabelRegistration, LabelStackingManager};
use crate::tools::ToolInstance;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxisLabelConfig {
    pub price_label_height_px: f64,
    pub time_label_pattern: String,
}

impl Default for AxisLabelConfig {
    fn default() -> Self {
        Self {
            price_label_height_px: 20.0,
            time_label_pattern: DEFAULT_TIME_LABEL_PATTERN.to_owned(),
        }
    }
}

impl AxisLabelConfig {
    pub fn validate(&self) -> OverlayResult<()> {
        if !self.price_label_height_px.is_finite() || self.price_label_height_px <= 0.0 {
            return Err(OverlayError::InvalidConfig(
                "price_label_height_px must be finite and > 0".to_owned(),
            ));
        }
        validate_time_pattern(&self.time_label_pattern)
    }
}

/// Price-axis label of one tool anchor, after stacking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceAxisLabel {
    pub id: String,
    pub owner_tool_id: String,
    pub anchor_index: usize,
    pub price: f64,
    pub text: String,
    /// Pixel y of the anchor itself.
    pub anchor_y: f64,
    pub desired_top: f64,
    pub height: f64,
    /// Stacked top edge, `None` when the label sits at `desired_top`.
    pub resolved_top: Option<f64>,
}

impl PriceAxisLabel {
    #[must_use]
    pub fn top(&self) -> f64 {
        self.resolved_top.unwrap_or(self.desired_top)
    }
}

/// Time-axis label of one tool anchor. Time labels are not stacked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeAxisLabel {
    pub id: String,
    pub owner_tool_id: String,
    pub anchor_index: usize,
    pub timestamp: f64,
    pub text: String,
    pub x: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AxisLabelLayout {
    pub price_labels: Vec<PriceAxisLabel>,
    pub time_labels: Vec<TimeAxisLabel>,
}

#[must_use]
pub fn price_label_id(tool_id: &str, anchor_index: usize) -> String {
    format!("{tool_id}:price:{anchor_index}")
}

#[must_use]
pub fn time_label_id(tool_id: &str, anchor_index: usize) -> String {
    format!("{tool_id}:time:{anchor_index}")
}

/// Per-pass glue between tools and the stacking manager.
///
/// Each pass registers the labels of the tools it is handed, unregisters
/// labels that disappeared since the previous pass, resolves stacking and
/// returns labels already carrying their final positions.
#[derive(Debug, Default)]
pub struct AxisLabelView {
    config: AxisLabelConfig,
    registered: IndexSet<String>,
}

impl AxisLabelView {
    #[must_use]
    pub fn new(config: AxisLabelConfig) -> Self {
        Self {
            config,
            registered: IndexSet::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &AxisLabelConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: AxisLabelConfig) {
        self.config = config;
    }

    /// Labels of one tool, before stacking. Anchors that fail to convert are skipped.
    #[must_use]
    pub fn tool_labels<H: ChartHost + ?Sized>(
        &self,
        tool: &ToolInstance,
        converter: &CoordinateConverter<'_, H>,
    ) -> AxisLabelLayout {
        let mut layout = AxisLabelLayout::default();
        let options = tool.options();
        let height = self.config.price_label_height_px;
        for (anchor_index, point) in tool.points_with_ghost().iter().enumerate() {
            if options.show_price_axis_labels {
                if let Some(anchor_y) = converter.price_to_y(point.price) {
                    layout.price_labels.push(PriceAxisLabel {
                        id: price_label_id(tool.id(), anchor_index),
                        owner_tool_id: tool.id().to_owned(),
                        anchor_index,
                        price: point.price,
                        text: format_price_label(point.price, options.price_precision),
                        anchor_y,
                        desired_top: anchor_y - height / 2.0,
                        height,
                        resolved_top: None,
                    });
                }
            }
            if options.show_time_axis_labels {
                if let Some(x) = converter.time_to_x(point.timestamp) {
                    layout.time_labels.push(TimeAxisLabel {
                        id: time_label_id(tool.id(), anchor_index),
                        owner_tool_id: tool.id().to_owned(),
                        anchor_index,
                        timestamp: point.timestamp,
                        text: format_time_label(point.timestamp, &self.config.time_label_pattern),
                        x,
                    });
                }
            }
        }
        layout
    }

    /// Registers this pass's labels, resolves stacking and writes the result back.
    ///
    /// Labels whose anchor lies outside `[0, pane_height]` are registered
    /// hidden so they neither move nor push other labels.
    pub fn resolve(
        &mut self,
        mut layout: AxisLabelLayout,
        pane_height: f64,
        stacking: &mut LabelStackingManager,
    ) -> AxisLabelLayout {
        let current: IndexSet<String> = layout
            .price_labels
            .iter()
            .map(|label| label.id.clone())
            .collect();
        for stale in self.registered.difference(&current) {
            stacking.unregister(stale);
        }

        for label in &layout.price_labels {
            let visible = (0.0..=pane_height).contains(&label.anchor_y);
            stacking.register(
                LabelRegistration::new(
                    label.id.clone(),
                    label.owner_tool_id.clone(),
                    label.desired_top,
                    label.height,
                )
                .with_visible(visible),
            );
        }
        self.registered = current;

        let resolution = stacking.update_stacking();
        for label in &mut layout.price_labels {
            label.resolved_top = resolution.coordinate(&label.id);
        }
        trace!(
            price_labels = layout.price_labels.len(),
            time_labels = layout.time_labels.len(),
            "axis labels resolved"
        );
        layout
    }

    /// Drops every registration of `tool_id`, used when a tool is destroyed.
    pub fn forget_tool(&mut self, tool_id: &str, stacking: &mut LabelStackingManager) {
        stacking.unregister_owner(tool_id);
        let prefix = format!("{tool_id}:");
        self.registered.retain(|id| !id.starts_with(&prefix));
    }

    pub fn clear(&mut self, stacking: &mut LabelStackingManager) {
        for id in self.registered.drain(..) {
            stacking.unregister(&id);
        }
    }
}
