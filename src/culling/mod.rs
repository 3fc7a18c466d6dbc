//! Viewport culling for tools in logical (time, price) space.
//!
//! Finite shapes are bounding-boxed. Rays and infinite lines are clipped
//! parametrically because their box can sit fully outside the viewport while
//! the extension still crosses it. Multi-segment shapes are checked segment by
//! segment so a thin diagonal is never culled by its hull.

use serde::{Deserialize, Serialize};

use crate::core::geometry::clip_slab;
use crate::core::{Point, ViewportBounds};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CullingState {
    Visible,
    OffScreenTop,
    OffScreenBottom,
    OffScreenLeft,
    OffScreenRight,
    FullyOffScreen,
}

impl CullingState {
    #[must_use]
    pub fn is_visible(self) -> bool {
        self == Self::Visible
    }
}

/// Infinite extension of a two-point line, in time order.
///
/// `left` extends towards earlier times, `right` towards later times,
/// regardless of the order the points were drawn in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExtendOptions {
    pub left: bool,
    pub right: bool,
}

impl ExtendOptions {
    #[must_use]
    pub const fn new(left: bool, right: bool) -> Self {
        Self { left, right }
    }

    #[must_use]
    pub const fn any(self) -> bool {
        self.left || self.right
    }
}

/// Vertical extension of a single-point marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VerticalExtend {
    pub up: bool,
    pub down: bool,
}

/// Line orientation of a one-point tool (horizontal/vertical/cross lines).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SinglePointOrientation {
    pub horizontal: Option<ExtendOptions>,
    pub vertical: Option<VerticalExtend>,
}

impl SinglePointOrientation {
    #[must_use]
    pub fn horizontal(left: bool, right: bool) -> Self {
        Self {
            horizontal: Some(ExtendOptions::new(left, right)),
            vertical: None,
        }
    }

    #[must_use]
    pub fn vertical(up: bool, down: bool) -> Self {
        Self {
            horizontal: None,
            vertical: Some(VerticalExtend { up, down }),
        }
    }

    #[must_use]
    pub fn cross() -> Self {
        Self {
            horizontal: Some(ExtendOptions::new(true, true)),
            vertical: Some(VerticalExtend {
                up: true,
                down: true,
            }),
        }
    }

    fn is_active(self) -> bool {
        self.horizontal.is_some() || self.vertical.is_some()
    }
}

/// One critical segment of a multi-point shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CullingSegment {
    pub start: Point,
    pub end: Point,
    pub extend: ExtendOptions,
}

impl CullingSegment {
    #[must_use]
    pub fn new(start: Point, end: Point, extend: ExtendOptions) -> Self {
        Self { start, end, extend }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CullingOptions {
    pub extend: Option<ExtendOptions>,
    pub single_point: Option<SinglePointOrientation>,
    pub sub_segments: Vec<CullingSegment>,
}

impl CullingOptions {
    #[must_use]
    pub fn with_extend(mut self, extend: ExtendOptions) -> Self {
        self.extend = Some(extend);
        self
    }

    #[must_use]
    pub fn with_single_point(mut self, orientation: SinglePointOrientation) -> Self {
        self.single_point = Some(orientation);
        self
    }

    #[must_use]
    pub fn with_sub_segments(mut self, segments: Vec<CullingSegment>) -> Self {
        self.sub_segments = segments;
        self
    }
}

/// Decides whether a tool with `points` is visible inside `bounds`.
#[must_use]
pub fn culling_state(points: &[Point], bounds: ViewportBounds, options: &CullingOptions) -> CullingState {
    if points.iter().any(|point| !point.is_finite()) {
        return CullingState::FullyOffScreen;
    }

    match points {
        [] => CullingState::FullyOffScreen,
        [point] => match options.single_point.filter(|orientation| orientation.is_active()) {
            Some(orientation) => single_point_with_orientation(*point, bounds, orientation),
            None => single_point_state(*point, bounds),
        },
        [first, second] => {
            let extend = options.extend.unwrap_or_default();
            two_point_state(*first, *second, bounds, extend)
        }
        _ => {
            if !options.sub_segments.is_empty() {
                let any_visible = options
                    .sub_segments
                    .iter()
                    .any(|segment| segment_visible(segment, bounds));
                if any_visible {
                    return CullingState::Visible;
                }
                return bounding_box_direction(points, bounds);
            }
            bounding_box_state(points, bounds)
        }
    }
}

fn single_point_state(point: Point, bounds: ViewportBounds) -> CullingState {
    if bounds.contains(point) {
        return CullingState::Visible;
    }
    point_direction(point, bounds)
}

/// Fixed priority: price above, price below, time before, time after.
fn point_direction(point: Point, bounds: ViewportBounds) -> CullingState {
    if point.price > bounds.max_price {
        CullingState::OffScreenTop
    } else if point.price < bounds.min_price {
        CullingState::OffScreenBottom
    } else if point.timestamp < bounds.min_time {
        CullingState::OffScreenLeft
    } else if point.timestamp > bounds.max_time {
        CullingState::OffScreenRight
    } else {
        CullingState::FullyOffScreen
    }
}

fn single_point_with_orientation(
    point: Point,
    bounds: ViewportBounds,
    orientation: SinglePointOrientation,
) -> CullingState {
    let horizontal_visible = orientation.horizontal.is_some_and(|extend| {
        if !bounds.contains_price(point.price) {
            return false;
        }
        bounds.contains_time(point.timestamp)
            || (extend.left && point.timestamp >= bounds.min_time)
            || (extend.right && point.timestamp <= bounds.max_time)
    });
    let vertical_visible = orientation.vertical.is_some_and(|extend| {
        if !bounds.contains_time(point.timestamp) {
            return false;
        }
        bounds.contains_price(point.price)
            || (extend.up && point.price <= bounds.max_price)
            || (extend.down && point.price >= bounds.min_price)
    });

    if horizontal_visible || vertical_visible {
        CullingState::Visible
    } else {
        point_direction(point, bounds)
    }
}

fn two_point_state(first: Point, second: Point, bounds: ViewportBounds, extend: ExtendOptions) -> CullingState {
    if !extend.any() {
        return bounding_box_state(&[first, second], bounds);
    }

    let (start, end) = time_ordered(first, second);
    if line_window_intersects(start, end, bounds, extend) {
        CullingState::Visible
    } else {
        bounding_box_direction(&[first, second], bounds)
    }
}

/// Sub-segments always take the parametric path, even without extension,
/// so a diagonal whose box overlaps a corner is not reported as visible.
fn segment_visible(segment: &CullingSegment, bounds: ViewportBounds) -> bool {
    let (start, end) = time_ordered(segment.start, segment.end);
    line_window_intersects(start, end, bounds, segment.extend)
}

// Order by time so the flags mean "earlier"/"later" however the line was drawn.
fn time_ordered(first: Point, second: Point) -> (Point, Point) {
    if second.timestamp < first.timestamp {
        (second, first)
    } else {
        (first, second)
    }
}

/// Slab-clips the infinite line on time then price and intersects the result
/// with the parametric range the extension flags allow.
fn line_window_intersects(start: Point, end: Point, bounds: ViewportBounds, extend: ExtendOptions) -> bool {
    let delta_time = end.timestamp - start.timestamp;
    let delta_price = end.price - start.price;
    if delta_time == 0.0 && delta_price == 0.0 {
        return bounds.contains(start);
    }

    let mut t_enter = f64::NEG_INFINITY;
    let mut t_exit = f64::INFINITY;
    if !clip_slab(
        start.timestamp,
        delta_time,
        bounds.min_time,
        bounds.max_time,
        &mut t_enter,
        &mut t_exit,
    ) {
        return false;
    }
    if !clip_slab(
        start.price,
        delta_price,
        bounds.min_price,
        bounds.max_price,
        &mut t_enter,
        &mut t_exit,
    ) {
        return false;
    }

    let valid_start = if extend.left { f64::NEG_INFINITY } else { 0.0 };
    let valid_end = if extend.right { f64::INFINITY } else { 1.0 };
    t_enter.max(valid_start) <= t_exit.min(valid_end)
}

fn bounding_box_state(points: &[Point], bounds: ViewportBounds) -> CullingState {
    let Some(hull) = PointBounds::enclosing(points) else {
        return CullingState::FullyOffScreen;
    };
    if hull.overlaps(bounds) {
        CullingState::Visible
    } else {
        hull.direction(bounds)
    }
}

fn bounding_box_direction(points: &[Point], bounds: ViewportBounds) -> CullingState {
    PointBounds::enclosing(points).map_or(CullingState::FullyOffScreen, |hull| hull.direction(bounds))
}

#[derive(Debug, Clone, Copy)]
struct PointBounds {
    min_time: f64,
    max_time: f64,
    min_price: f64,
    max_price: f64,
}

impl PointBounds {
    fn enclosing(points: &[Point]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut hull = Self {
            min_time: first.timestamp,
            max_time: first.timestamp,
            min_price: first.price,
            max_price: first.price,
        };
        for point in rest {
            hull.min_time = hull.min_time.min(point.timestamp);
            hull.max_time = hull.max_time.max(point.timestamp);
            hull.min_price = hull.min_price.min(point.price);
            hull.max_price = hull.max_price.max(point.price);
        }
        Some(hull)
    }

    fn overlaps(self, bounds: ViewportBounds) -> bool {
        self.min_time <= bounds.max_time
            && self.max_time >= bounds.min_time
            && self.min_price <= bounds.max_price
            && self.max_price >= bounds.min_price
    }

    fn direction(self, bounds: ViewportBounds) -> CullingState {
        if self.min_price > bounds.max_price {
            CullingState::OffScreenTop
        } else if self.max_price < bounds.min_price {
            CullingState::OffScreenBottom
        } else if self.max_time < bounds.min_time {
            CullingState::OffScreenLeft
        } else if self.min_time > bounds.max_time {
            CullingState::OffScreenRight
        } else {
            CullingState::FullyOffScreen
        }
    }
}
