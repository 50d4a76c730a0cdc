//! Three-component color value and luminance weights.
//!
//! [`Color`] is the argument/return vocabulary for per-pixel RGB access on
//! an [`Image`](crate::Image). It carries no color-space marker: buffers
//! are treated as linear RGB with sRGB primaries.

use crate::Sample;

/// CIE luminance weight for red (linear sRGB primaries, D65).
pub const LUMA_R: f32 = 0.2126;

/// CIE luminance weight for green.
pub const LUMA_G: f32 = 0.7152;

/// CIE luminance weight for blue.
pub const LUMA_B: f32 = 0.0722;

/// Luminance weights as `[R, G, B]`.
pub const LUMA: [f32; 3] = [LUMA_R, LUMA_G, LUMA_B];

/// CIE luminance `Y = 0.2126 R + 0.7152 G + 0.0722 B` of normalized RGB.
///
/// ```
/// use astro_core::color::luminance;
/// let y = luminance([0.5, 0.3, 0.2]);
/// assert!((y - 0.3353).abs() < 1e-4);
/// ```
#[inline]
pub fn luminance(rgb: [f32; 3]) -> f32 {
    rgb[0] * LUMA_R + rgb[1] * LUMA_G + rgb[2] * LUMA_B
}

/// An ordered (red, green, blue) triple of same-typed samples.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Color<T: Sample> {
    /// Red sample.
    pub red: T,
    /// Green sample.
    pub green: T,
    /// Blue sample.
    pub blue: T,
}

impl<T: Sample> Color<T> {
    /// Creates a color from three samples.
    #[inline]
    pub const fn new(red: T, green: T, blue: T) -> Self {
        Self { red, green, blue }
    }

    /// Creates a gray (luminance or mask) color with equal components.
    #[inline]
    pub const fn gray(v: T) -> Self {
        Self::new(v, v, v)
    }

    /// Components as `[R, G, B]`.
    #[inline]
    pub fn to_array(self) -> [T; 3] {
        [self.red, self.green, self.blue]
    }

    /// Normalized float components.
    #[inline]
    pub fn to_f32_array(self) -> [f32; 3] {
        [self.red.to_f32(), self.green.to_f32(), self.blue.to_f32()]
    }

    /// Builds a color from normalized float components.
    #[inline]
    pub fn from_f32_array(rgb: [f32; 3]) -> Self {
        Self::new(T::from_f32(rgb[0]), T::from_f32(rgb[1]), T::from_f32(rgb[2]))
    }

    /// Converts every component to another sample type.
    #[inline]
    pub fn convert<U: Sample>(self) -> Color<U> {
        Color::new(self.red.convert(), self.green.convert(), self.blue.convert())
    }

    /// Normalized CIE luminance.
    #[inline]
    pub fn luminance(self) -> f32 {
        luminance(self.to_f32_array())
    }
}

impl<T: Sample> From<[T; 3]> for Color<T> {
    #[inline]
    fn from(rgb: [T; 3]) -> Self {
        Self::new(rgb[0], rgb[1], rgb[2])
    }
}
