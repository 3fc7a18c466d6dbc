use serde::{Deserialize, Serialize};

use crate::error::OverlayResult;
use crate::interaction::InteractionConfig;
use crate::labels::{AxisLabelConfig, DEFAULT_TIME_LABEL_PATTERN};

/// Public overlay configuration.
///
/// Serializable so host applications can persist it next to the tool
/// snapshot. Missing fields fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub drag_threshold_px: f64,
    pub hit_tolerance_px: f64,
    pub anchor_radius_px: f64,
    pub freehand_min_step_px: f64,
    pub double_click_rogue_point_px: f64,
    pub price_label_height_px: f64,
    /// `chrono` strftime pattern for time-axis label text.
    pub time_label_pattern: String,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        let interaction = InteractionConfig::default();
        Self {
            drag_threshold_px: interaction.drag_threshold_px,
            hit_tolerance_px: interaction.hit_tolerance_px,
            anchor_radius_px: interaction.anchor_radius_px,
            freehand_min_step_px: interaction.freehand_min_step_px,
            double_click_rogue_point_px: interaction.double_click_rogue_point_px,
            price_label_height_px: 20.0,
            time_label_pattern: DEFAULT_TIME_LABEL_PATTERN.to_owned(),
        }
    }
}

impl OverlayConfig {
    #[must_use]
    pub fn with_drag_threshold(mut self, drag_threshold_px: f64) -> Self {
        self.drag_threshold_px = drag_threshold_px;
        self
    }

    #[must_use]
    pub fn with_hit_tolerance(mut self, hit_tolerance_px: f64) -> Self {
        self.hit_tolerance_px = hit_tolerance_px;
        self
    }

    #[must_use]
    pub fn with_time_label_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.time_label_pattern = pattern.into();
        self
    }

    #[must_use]
    pub fn interaction_config(&self) -> InteractionConfig {
        InteractionConfig {
            drag_threshold_px: self.drag_threshold_px,
            hit_tolerance_px: self.hit_tolerance_px,
            anchor_radius_px: self.anchor_radius_px,
            freehand_min_step_px: self.freehand_min_step_px,
            double_click_rogue_point_px: self.double_click_rogue_point_px,
        }
    }

    #[must_use]
    pub fn axis_label_config(&self) -> AxisLabelConfig {
        AxisLabelConfig {
            price_label_height_px: self.price_label_height_px,
            time_label_pattern: self.time_label_pattern.clone(),
        }
    }

    pub fn validate(&self) -> OverlayResult<()> {
        self.interaction_config().validate()?;
        self.axis_label_config().validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OverlayError;

    #[test]
    fn defaults_are_valid() {
        assert!(OverlayConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_json_uses_defaults() {
        let config: OverlayConfig =
            serde_json::from_str(r#"{"hit_tolerance_px": 8.0}"#).expect("config json");
        assert_eq!(config.hit_tolerance_px, 8.0);
        assert_eq!(config.drag_threshold_px, 3.0);
        assert_eq!(config.time_label_pattern, DEFAULT_TIME_LABEL_PATTERN);
    }

    #[test]
    fn invalid_values_are_config_errors() {
        let negative = OverlayConfig::default().with_drag_threshold(-2.0);
        assert!(matches!(negative.validate(), Err(OverlayError::InvalidConfig(_))));

        let bad_pattern = OverlayConfig::default().with_time_label_pattern("%Q");
        assert!(matches!(bad_pattern.validate(), Err(OverlayError::InvalidConfig(_))));
    }
}
