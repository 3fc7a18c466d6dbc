use smallvec::SmallVec;

use crate::core::interpolation::LogicalTimeInterpolation;
use crate::core::types::{Point, ScreenPoint, ViewportBounds};
use crate::host::ChartHost;

/// Point <-> pixel conversion over a host surface.
///
/// The host's native time conversion is tried first; when it fails (blank
/// space past the data, or a time between bars) the conversion goes through
/// the logical index using the extrapolated interval of the series.
pub struct CoordinateConverter<'a, H: ChartHost + ?Sized> {
    host: &'a H,
    interpolation: Option<LogicalTimeInterpolation>,
}

impl<'a, H: ChartHost + ?Sized> CoordinateConverter<'a, H> {
    #[must_use]
    pub fn new(host: &'a H) -> Self {
        let interpolation = match (host.series_time(0), host.series_time(1)) {
            (Some(first), Some(second)) => LogicalTimeInterpolation::from_samples(first, second),
            _ => None,
        };
        Self {
            host,
            interpolation,
        }
    }

    #[must_use]
    pub fn interpolation(&self) -> Option<LogicalTimeInterpolation> {
        self.interpolation
    }

    #[must_use]
    pub fn time_from_logical_index(&self, logical: f64) -> Option<f64> {
        self.interpolation?.time_from_logical_index(logical)
    }

    #[must_use]
    pub fn logical_index_from_time(&self, time: f64) -> Option<f64> {
        self.interpolation?.logical_index_from_time(time)
    }

    #[must_use]
    pub fn time_to_x(&self, time: f64) -> Option<f64> {
        if let Some(x) = self.host.time_to_coordinate(time) {
            return Some(x);
        }
        let logical = self.logical_index_from_time(time)?;
        self.host.logical_to_coordinate(logical)
    }

    #[must_use]
    pub fn x_to_time(&self, x: f64) -> Option<f64> {
        if let Some(time) = self.host.coordinate_to_time(x) {
            return Some(time);
        }
        let logical = self.host.coordinate_to_logical(x)?;
        self.time_from_logical_index(logical)
    }

    #[must_use]
    pub fn price_to_y(&self, price: f64) -> Option<f64> {
        self.host.price_to_coordinate(price)
    }

    #[must_use]
    pub fn y_to_price(&self, y: f64) -> Option<f64> {
        self.host.coordinate_to_price(y)
    }

    #[must_use]
    pub fn point_to_screen(&self, point: Point) -> Option<ScreenPoint> {
        let x = self.time_to_x(point.timestamp)?;
        let y = self.price_to_y(point.price)?;
        let screen = ScreenPoint::new(x, y);
        screen.is_finite().then_some(screen)
    }

    #[must_use]
    pub fn screen_to_point(&self, screen: ScreenPoint) -> Option<Point> {
        let timestamp = self.x_to_time(screen.x)?;
        let price = self.y_to_price(screen.y)?;
        let point = Point::new(timestamp, price);
        point.is_finite().then_some(point)
    }

    /// Converts every point, failing as a whole if any single conversion fails.
    #[must_use]
    pub fn points_to_screen(&self, points: &[Point]) -> Option<SmallVec<[ScreenPoint; 4]>> {
        points
            .iter()
            .map(|point| self.point_to_screen(*point))
            .collect()
    }

    /// Visible window in logical space for the culling pass.
    #[must_use]
    pub fn viewport_bounds(&self) -> Option<ViewportBounds> {
        let (from, to) = self.host.visible_logical_range()?;
        let min_time = self.time_from_logical_index(from)?;
        let max_time = self.time_from_logical_index(to)?;
        let height = f64::from(self.host.viewport().height);
        let top_price = self.y_to_price(0.0)?;
        let bottom_price = self.y_to_price(height)?;
        Some(ViewportBounds::new(min_time, max_time, top_price, bottom_price))
    }
}
