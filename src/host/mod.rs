//! Boundary to the charting surface the overlay is drawn on.
//!
//! The host owns the pixel grid, the data series and the render loop. The
//! overlay only consumes its coordinate conversions and drives a handful of
//! side effects (redraw requests, pan gating, cursor, crosshair).

mod series_host;

pub use series_host::SeriesHost;

use serde::{Deserialize, Serialize};

use crate::core::Viewport;

/// Pointer cursor requested from the host surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CursorStyle {
    #[default]
    Default,
    Pointer,
    Crosshair,
    Grab,
    Grabbing,
    Move,
    Text,
    EwResize,
    NsResize,
    NwseResize,
    NeswResize,
    NotAllowed,
}

/// Contract implemented by any chart surface hosting the overlay.
///
/// Every conversion may fail with `None`; callers treat that as "no valid
/// point" for the current step and keep going.
pub trait ChartHost {
    /// Pane size in device-independent pixels.
    fn viewport(&self) -> Viewport;

    fn coordinate_to_logical(&self, x: f64) -> Option<f64>;
    fn logical_to_coordinate(&self, logical: f64) -> Option<f64>;

    /// Native time conversion; allowed to fail for times without a bar.
    fn time_to_coordinate(&self, time: f64) -> Option<f64>;
    /// Native inverse conversion; allowed to fail in blank space.
    fn coordinate_to_time(&self, x: f64) -> Option<f64>;

    fn price_to_coordinate(&self, price: f64) -> Option<f64>;
    fn coordinate_to_price(&self, y: f64) -> Option<f64>;

    /// Visible logical index window `(from, to)`.
    fn visible_logical_range(&self) -> Option<(f64, f64)>;

    /// Time of the series sample at `index`.
    fn series_time(&self, index: usize) -> Option<f64>;

    fn request_redraw(&mut self);

    /// Enables or disables the surface's own drag-to-pan and wheel scroll.
    fn set_pan_enabled(&mut self, enabled: bool);

    fn set_cursor(&mut self, cursor: CursorStyle);

    fn set_crosshair(&mut self, x: f64, y: f64, visible: bool);

    fn clear_crosshair(&mut self);
}
