use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::primitives::{datetime_to_unix_seconds, decimal_to_f64};
use crate::error::{OverlayError, OverlayResult};

/// Pane size in device-independent pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Logical chart coordinate every tool anchor is stored in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub timestamp: f64,
    pub price: f64,
}

impl Point {
    #[must_use]
    pub const fn new(timestamp: f64, price: f64) -> Self {
        Self { timestamp, price }
    }

    pub fn from_decimal_time(time: DateTime<Utc>, price: Decimal) -> OverlayResult<Self> {
        Ok(Self {
            timestamp: datetime_to_unix_seconds(time),
            price: decimal_to_f64(price, "price")?,
        })
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.timestamp.is_finite() && self.price.is_finite()
    }

    pub fn validate(self) -> OverlayResult<Self> {
        if !self.is_finite() {
            return Err(OverlayError::InvalidData(
                "point timestamp and price must be finite".to_owned(),
            ));
        }
        Ok(self)
    }

    /// Shifts the point by a logical delta.
    #[must_use]
    pub fn offset(self, delta_time: f64, delta_price: f64) -> Self {
        Self::new(self.timestamp + delta_time, self.price + delta_price)
    }
}

/// Pixel-space vector, also used as a 2D point.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Z component of the 3D cross product.
    #[must_use]
    pub fn cross(self, other: Self) -> f64 {
        self.x * other.y - self.y * other.x
    }

    #[must_use]
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    #[must_use]
    pub fn distance_to(self, other: Self) -> f64 {
        (self - other).length()
    }

    /// Unit vector in the same direction; the zero vector stays zero.
    #[must_use]
    pub fn normalized(self) -> Self {
        let length = self.length();
        if length == 0.0 {
            return self;
        }
        self / length
    }

    /// Perpendicular vector rotated 90 degrees counter-clockwise.
    #[must_use]
    pub fn transpose(self) -> Self {
        Self::new(-self.y, self.x)
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for ScreenPoint {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for ScreenPoint {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for ScreenPoint {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for ScreenPoint {
    fn sub_assign(&mut self, rhs: Self) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Mul<f64> for ScreenPoint {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f64> for ScreenPoint {
    type Output = Self;

    fn div(self, rhs: f64) -> Self {
        Self::new(self.x / rhs, self.y / rhs)
    }
}

impl Neg for ScreenPoint {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

/// Visible chart window in logical space, recomputed every redraw.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportBounds {
    pub min_time: f64,
    pub max_time: f64,
    pub min_price: f64,
    pub max_price: f64,
}

impl ViewportBounds {
    /// Builds bounds from possibly reversed ranges.
    #[must_use]
    pub fn new(time_a: f64, time_b: f64, price_a: f64, price_b: f64) -> Self {
        Self {
            min_time: time_a.min(time_b),
            max_time: time_a.max(time_b),
            min_price: price_a.min(price_b),
            max_price: price_a.max(price_b),
        }
    }

    #[must_use]
    pub fn contains(self, point: Point) -> bool {
        point.timestamp >= self.min_time
            && point.timestamp <= self.max_time
            && point.price >= self.min_price
            && point.price <= self.max_price
    }

    #[must_use]
    pub fn contains_time(self, time: f64) -> bool {
        time >= self.min_time && time <= self.max_time
    }

    #[must_use]
    pub fn contains_price(self, price: f64) -> bool {
        price >= self.min_price && price <= self.max_price
    }
}
