use tracing::trace;

use crate::core::{LinearScale, Viewport};
use crate::error::{OverlayError, OverlayResult};

use super::{ChartHost, CursorStyle};

/// In-memory chart surface used by tests and headless embedding.
///
/// Bars sit at integer logical indices spaced `bar_spacing_px` apart, with
/// `scroll_logical` at the left edge of the pane. Native time conversion only
/// succeeds for logical positions that land on an existing bar, mirroring a
/// real surface that cannot resolve blank space on its own.
#[derive(Debug, Clone)]
pub struct SeriesHost {
    viewport: Viewport,
    times: Vec<f64>,
    bar_spacing_px: f64,
    scroll_logical: f64,
    price_scale: LinearScale,
    redraw_requests: usize,
    pan_enabled: bool,
    cursor: CursorStyle,
    crosshair: Option<(f64, f64, bool)>,
}

impl SeriesHost {
    /// Creates a host with sorted bar `times` and a `(price_min, price_max)` visible band.
    pub fn new(viewport: Viewport, times: Vec<f64>, price_min: f64, price_max: f64) -> OverlayResult<Self> {
        if !viewport.is_valid() {
            return Err(OverlayError::InvalidData(format!(
                "invalid viewport size: width={}, height={}",
                viewport.width, viewport.height
            )));
        }
        validate_times(&times)?;
        // Screen y grows downwards, so the domain runs from max to min.
        let price_scale = LinearScale::new(price_max, price_min)?;

        Ok(Self {
            viewport,
            times,
            bar_spacing_px: 10.0,
            scroll_logical: 0.0,
            price_scale,
            redraw_requests: 0,
            pan_enabled: true,
            cursor: CursorStyle::Default,
            crosshair: None,
        })
    }

    pub fn with_bar_spacing(mut self, bar_spacing_px: f64) -> OverlayResult<Self> {
        if !bar_spacing_px.is_finite() || bar_spacing_px <= 0.0 {
            return Err(OverlayError::InvalidData(
                "bar spacing must be finite and > 0".to_owned(),
            ));
        }
        self.bar_spacing_px = bar_spacing_px;
        Ok(self)
    }

    /// Scrolls so that `logical` sits at the left edge of the pane.
    pub fn scroll_to_logical(&mut self, logical: f64) -> OverlayResult<()> {
        if !logical.is_finite() {
            return Err(OverlayError::InvalidData(
                "scroll position must be finite".to_owned(),
            ));
        }
        self.scroll_logical = logical;
        Ok(())
    }

    pub fn set_price_range(&mut self, price_min: f64, price_max: f64) -> OverlayResult<()> {
        self.price_scale = LinearScale::new(price_max, price_min)?;
        Ok(())
    }

    pub fn set_times(&mut self, times: Vec<f64>) -> OverlayResult<()> {
        validate_times(&times)?;
        self.times = times;
        Ok(())
    }

    #[must_use]
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    #[must_use]
    pub fn bar_spacing_px(&self) -> f64 {
        self.bar_spacing_px
    }

    #[must_use]
    pub fn redraw_requests(&self) -> usize {
        self.redraw_requests
    }

    #[must_use]
    pub fn pan_enabled(&self) -> bool {
        self.pan_enabled
    }

    #[must_use]
    pub fn cursor(&self) -> CursorStyle {
        self.cursor
    }

    #[must_use]
    pub fn crosshair(&self) -> Option<(f64, f64, bool)> {
        self.crosshair
    }

    fn bar_index_at(&self, logical: f64) -> Option<usize> {
        let rounded = logical.round();
        if (logical - rounded).abs() > 1e-9 || rounded < 0.0 {
            return None;
        }
        let index = rounded as usize;
        (index < self.times.len()).then_some(index)
    }
}

fn validate_times(times: &[f64]) -> OverlayResult<()> {
    if times.iter().any(|time| !time.is_finite()) {
        return Err(OverlayError::InvalidData(
            "series times must be finite".to_owned(),
        ));
    }
    if times.windows(2).any(|pair| pair[1] <= pair[0]) {
        return Err(OverlayError::InvalidData(
            "series times must be strictly increasing".to_owned(),
        ));
    }
    Ok(())
}

impl ChartHost for SeriesHost {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn coordinate_to_logical(&self, x: f64) -> Option<f64> {
        if !x.is_finite() {
            return None;
        }
        Some(self.scroll_logical + x / self.bar_spacing_px)
    }

    fn logical_to_coordinate(&self, logical: f64) -> Option<f64> {
        if !logical.is_finite() {
            return None;
        }
        Some((logical - self.scroll_logical) * self.bar_spacing_px)
    }

    fn time_to_coordinate(&self, time: f64) -> Option<f64> {
        let index = self
            .times
            .binary_search_by(|sample| sample.total_cmp(&time))
            .ok()?;
        self.logical_to_coordinate(index as f64)
    }

    fn coordinate_to_time(&self, x: f64) -> Option<f64> {
        let logical = self.coordinate_to_logical(x)?;
        let index = self.bar_index_at(logical)?;
        self.times.get(index).copied()
    }

    fn price_to_coordinate(&self, price: f64) -> Option<f64> {
        self.price_scale
            .domain_to_pixel(price, f64::from(self.viewport.height))
    }

    fn coordinate_to_price(&self, y: f64) -> Option<f64> {
        self.price_scale
            .pixel_to_domain(y, f64::from(self.viewport.height))
    }

    fn visible_logical_range(&self) -> Option<(f64, f64)> {
        let from = self.scroll_logical;
        let to = from + f64::from(self.viewport.width) / self.bar_spacing_px;
        Some((from, to))
    }

    fn series_time(&self, index: usize) -> Option<f64> {
        self.times.get(index).copied()
    }

    fn request_redraw(&mut self) {
        self.redraw_requests += 1;
        trace!(requests = self.redraw_requests, "redraw requested");
    }

    fn set_pan_enabled(&mut self, enabled: bool) {
        self.pan_enabled = enabled;
    }

    fn set_cursor(&mut self, cursor: CursorStyle) {
        self.cursor = cursor;
    }

    fn set_crosshair(&mut self, x: f64, y: f64, visible: bool) {
        self.crosshair = Some((x, y, visible));
    }

    fn clear_crosshair(&mut self) {
        self.crosshair = None;
    }
}
