use std::fmt::Write as _;

use chrono::format::{Item, StrftimeItems};

use crate::core::primitives::{round_price, unix_seconds_to_datetime};
use crate::error::{OverlayError, OverlayResult};

pub const DEFAULT_TIME_LABEL_PATTERN: &str = "%Y-%m-%d %H:%M";

/// Rejects strftime patterns chrono cannot render.
pub fn validate_time_pattern(pattern: &str) -> OverlayResult<()> {
    if pattern.is_empty() {
        return Err(OverlayError::InvalidConfig(
            "time label pattern must not be empty".to_owned(),
        ));
    }
    if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
        return Err(OverlayError::InvalidConfig(format!(
            "time label pattern `{pattern}` is not a valid strftime pattern"
        )));
    }
    Ok(())
}

/// UTC date-time text for a unix-seconds timestamp.
///
/// Falls back to the raw value when it is outside chrono's range.
#[must_use]
pub fn format_time_label(timestamp: f64, pattern: &str) -> String {
    if !timestamp.is_finite() {
        return "nan".to_owned();
    }
    let Some(time) = unix_seconds_to_datetime(timestamp) else {
        return format!("{timestamp:.2}");
    };
    let mut text = String::new();
    if write!(text, "{}", time.format(pattern)).is_err() {
        return format!("{timestamp:.2}");
    }
    text
}

#[must_use]
pub fn format_price_label(price: f64, precision: u32) -> String {
    let digits = precision as usize;
    match round_price(price, precision) {
        Some(decimal) => format!("{decimal:.digits$}"),
        None if price.is_finite() => format!("{price:.digits$}"),
        None => "nan".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_text_is_padded_to_precision() {
        assert_eq!(format_price_label(105.0, 2), "105.00");
        assert_eq!(format_price_label(0.1 + 0.2, 2), "0.30");
        assert_eq!(format_price_label(1.23456, 0), "1");
        assert_eq!(format_price_label(f64::NAN, 2), "nan");
    }

    #[test]
    fn time_text_uses_utc_pattern() {
        assert_eq!(
            format_time_label(1_700_000_000.0, DEFAULT_TIME_LABEL_PATTERN),
            "2023-11-14 22:13"
        );
        assert_eq!(format_time_label(f64::INFINITY, DEFAULT_TIME_LABEL_PATTERN), "nan");
    }

    #[test]
    fn broken_patterns_are_config_errors() {
        assert!(validate_time_pattern("%Y-%m-%d").is_ok());
        assert!(validate_time_pattern("%Q").is_err());
        assert!(validate_time_pattern("").is_err());
    }
}
