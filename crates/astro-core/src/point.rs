//! Point types used to address pixels and samples.
//!
//! - [`Point`] - plain `(x, y)` pair, integer or floating
//! - [`ImagePoint`] - integer `(x, y, channel)` addressing one sample
//! - [`ImagePointF`] - fractional `(x, y, channel)` for interpolation
//!
//! `x` is the column and `y` the row throughout the workspace.

use std::ops::{Add, Sub};

/// A 2D point with value semantics.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point<T> {
    /// Column coordinate.
    pub x: T,
    /// Row coordinate.
    pub y: T,
}

impl<T> Point<T> {
    /// Creates a new point.
    #[inline]
    pub const fn new(x: T, y: T) -> Self {
        Self { x, y }
    }
}

impl<T: Add<Output = T>> Add for Point<T> {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl<T: Sub<Output = T>> Sub for Point<T> {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Point<f64> {
    /// Euclidean distance to another point.
    #[inline]
    pub fn distance(&self, other: &Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Integer sample address: column, row and channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ImagePoint {
    /// Column.
    pub x: u32,
    /// Row.
    pub y: u32,
    /// Channel plane.
    pub channel: u32,
}

impl ImagePoint {
    /// Creates a new sample address.
    #[inline]
    pub const fn new(x: u32, y: u32, channel: u32) -> Self {
        Self { x, y, channel }
    }
}

impl From<Point<u32>> for ImagePoint {
    /// Addresses channel 0 of the given pixel.
    #[inline]
    fn from(p: Point<u32>) -> Self {
        Self::new(p.x, p.y, 0)
    }
}

/// Fractional sample address used by the interpolator.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ImagePointF {
    /// Fractional column.
    pub x: f64,
    /// Fractional row.
    pub y: f64,
    /// Channel plane.
    pub channel: u32,
}

impl ImagePointF {
    /// Creates a new fractional sample address.
    #[inline]
    pub const fn new(x: f64, y: f64, channel: u32) -> Self {
        Self { x, y, channel }
    }

    /// Position without the channel.
    #[inline]
    pub fn position(&self) -> Point<f64> {
        Point::new(self.x, self.y)
    }

    /// Nearest integer position, rounding half away from zero.
    #[inline]
    pub fn rounded(&self) -> Point<i64> {
        Point::new(self.x.round() as i64, self.y.round() as i64)
    }
}

impl From<ImagePoint> for ImagePointF {
    #[inline]
    fn from(p: ImagePoint) -> Self {
        Self::new(p.x as f64, p.y as f64, p.channel)
    }
}
