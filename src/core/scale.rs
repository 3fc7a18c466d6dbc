use crate::error::{OverlayError, OverlayResult};

/// Linear mapping between a value domain and a pixel extent starting at zero.
///
/// A reversed domain (`domain_start > domain_end`) produces an inverted axis,
/// which is how price scales grow upwards on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain_start: f64,
    domain_end: f64,
}

impl LinearScale {
    pub fn new(domain_start: f64, domain_end: f64) -> OverlayResult<Self> {
        if !domain_start.is_finite() || !domain_end.is_finite() || domain_start == domain_end {
            return Err(OverlayError::InvalidData(
                "scale domain must be finite and non-zero".to_owned(),
            ));
        }

        Ok(Self {
            domain_start,
            domain_end,
        })
    }

    #[must_use]
    pub fn domain(self) -> (f64, f64) {
        (self.domain_start, self.domain_end)
    }

    #[must_use]
    pub fn domain_to_pixel(self, value: f64, extent_px: f64) -> Option<f64> {
        if !value.is_finite() || !extent_px.is_finite() || extent_px <= 0.0 {
            return None;
        }
        let span = self.domain_end - self.domain_start;
        let normalized = (value - self.domain_start) / span;
        Some(normalized * extent_px)
    }

    #[must_use]
    pub fn pixel_to_domain(self, pixel: f64, extent_px: f64) -> Option<f64> {
        if !pixel.is_finite() || !extent_px.is_finite() || extent_px <= 0.0 {
            return None;
        }
        let span = self.domain_end - self.domain_start;
        let normalized = pixel / extent_px;
        Some(self.domain_start + normalized * span)
    }
}
