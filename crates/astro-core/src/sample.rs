//! Pixel sample types and the conversion law between them.
//!
//! Three scalar representations are supported:
//!
//! - `u8` - 8-bit unsigned, [0, 255]
//! - `u16` - 16-bit unsigned, [0, 65535]
//! - `f32` - normalized float, [0.0, 1.0]
//!
//! Every cross-depth read or write in the workspace goes through
//! [`Sample::to_f32`] / [`Sample::from_f32`]:
//!
//! ```text
//! to_f32(u8)       = u8 / 255
//! to_f32(u16)      = u16 / 65535
//! from_f32(f, u8)  = round(f * 255)
//! from_f32(f, u16) = round(f * 65535)
//! f32 <-> f32      = identity
//! ```
//!
//! # Example
//!
//! ```
//! use astro_core::Sample;
//!
//! let byte: u8 = 128;
//! assert_eq!(byte.convert::<u16>(), 32896);
//! assert_eq!(u8::from_f32(0.5), 128);
//! ```
//!
//! # Used By
//!
//! - [`crate::image::Image`] - element type of every buffer
//! - `astro-stats` - histogram bin mapping
//! - `astro-ops` - interpolation in normalized float

use crate::format::SampleType;
use std::fmt;

/// Trait for the three sample representations an [`Image`](crate::Image) can hold.
///
/// The trait is sealed by convention: it carries a [`SampleType`] tag, and
/// only `u8`, `u16` and `f32` implement it. Generic code bounded by
/// `T: Sample` is therefore instantiated exactly three times.
///
/// # Constants
///
/// - [`TYPE`](Sample::TYPE) - runtime tag matching the concrete type
/// - [`HISTOGRAM_RESOLUTION`](Sample::HISTOGRAM_RESOLUTION) - bin count used
///   for statistics (floats are quantized to 16-bit resolution)
pub trait Sample:
    Copy + Clone + Default + Send + Sync + PartialOrd + PartialEq + fmt::Debug + 'static
{
    /// Runtime tag of this sample type.
    const TYPE: SampleType;

    /// Number of bits per sample.
    const BITS: u32;

    /// Whether this is a floating-point type.
    const IS_FLOAT: bool;

    /// Number of histogram bins for this type (256 or 65536).
    const HISTOGRAM_RESOLUTION: usize;

    /// Minimum sentinel (always zero).
    fn min_value() -> Self;

    /// Maximum sentinel (255, 65535 or 1.0).
    fn max_value() -> Self;

    /// Zero sample.
    #[inline]
    fn zero() -> Self {
        Self::min_value()
    }

    /// Normalizes to [0.0, 1.0] for integers; identity for floats.
    fn to_f32(self) -> f32;

    /// Converts from normalized float, clamping and rounding for integers.
    fn from_f32(v: f32) -> Self;

    /// Histogram bin of this sample, in `0..HISTOGRAM_RESOLUTION`.
    fn histogram_index(self) -> usize;

    /// Converts a histogram bin position back to this type's native scale.
    ///
    /// Integers report bins verbatim; floats map bin `65535` to `1.0`.
    #[inline]
    fn bin_to_native(bin: f64) -> f64 {
        if Self::IS_FLOAT {
            bin / (Self::HISTOGRAM_RESOLUTION - 1) as f64
        } else {
            bin
        }
    }

    /// Value of this sample in its native scale as `f64`.
    fn to_native(self) -> f64;

    /// Converts to another sample type via the normalized float law.
    #[inline]
    fn convert<U: Sample>(self) -> U {
        U::from_f32(self.to_f32())
    }

    /// Whether this sample sits exactly on one of the two sentinels.
    #[inline]
    fn is_sentinel(self) -> bool {
        self == Self::min_value() || self == Self::max_value()
    }
}

impl Sample for u8 {
    const TYPE: SampleType = SampleType::U8;
    const BITS: u32 = 8;
    const IS_FLOAT: bool = false;
    const HISTOGRAM_RESOLUTION: usize = 256;

    #[inline]
    fn min_value() -> Self {
        0
    }

    #[inline]
    fn max_value() -> Self {
        u8::MAX
    }

    #[inline]
    fn to_f32(self) -> f32 {
        self as f32 / 255.0
    }

    #[inline]
    fn from_f32(v: f32) -> Self {
        (v.clamp(0.0, 1.0) * 255.0).round() as u8
    }

    #[inline]
    fn histogram_index(self) -> usize {
        self as usize
    }

    #[inline]
    fn to_native(self) -> f64 {
        self as f64
    }
}

impl Sample for u16 {
    const TYPE: SampleType = SampleType::U16;
    const BITS: u32 = 16;
    const IS_FLOAT: bool = false;
    const HISTOGRAM_RESOLUTION: usize = 65536;

    #[inline]
    fn min_value() -> Self {
        0
    }

    #[inline]
    fn max_value() -> Self {
        u16::MAX
    }

    #[inline]
    fn to_f32(self) -> f32 {
        self as f32 / 65535.0
    }

    #[inline]
    fn from_f32(v: f32) -> Self {
        (v.clamp(0.0, 1.0) * 65535.0).round() as u16
    }

    #[inline]
    fn histogram_index(self) -> usize {
        self as usize
    }

    #[inline]
    fn to_native(self) -> f64 {
        self as f64
    }
}

impl Sample for f32 {
    const TYPE: SampleType = SampleType::F32;
    const BITS: u32 = 32;
    const IS_FLOAT: bool = true;
    const HISTOGRAM_RESOLUTION: usize = 65536;

    #[inline]
    fn min_value() -> Self {
        0.0
    }

    #[inline]
    fn max_value() -> Self {
        1.0
    }

    #[inline]
    fn to_f32(self) -> f32 {
        self
    }

    #[inline]
    fn from_f32(v: f32) -> Self {
        v
    }

    #[inline]
    fn histogram_index(self) -> usize {
        (self.clamp(0.0, 1.0) * 65535.0).round() as usize
    }

    #[inline]
    fn to_native(self) -> f64 {
        self as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u8_round_trip_exact() {
        for v in 0..=255u8 {
            assert_eq!(u8::from_f32(v.to_f32()), v);
        }
    }

    #[test]
    fn test_u16_round_trip_exact() {
        for v in 0..=u16::MAX {
            assert_eq!(u16::from_f32(v.to_f32()), v);
        }
    }

    #[test]
    fn test_conversion_law() {
        assert_eq!(255u8.to_f32(), 1.0);
        assert_eq!(65535u16.to_f32(), 1.0);
        assert_eq!(u8::from_f32(0.5), 128);
        assert_eq!(u16::from_f32(0.5), 32768);
        assert_eq!(f32::from_f32(0.25), 0.25);
        // widening is exact-scaled, narrowing rounds
        assert_eq!(255u8.convert::<u16>(), 65535);
        assert_eq!(1u8.convert::<u16>(), 257);
        assert_eq!(257u16.convert::<u8>(), 1);
        assert_eq!(128u16.convert::<u8>(), 0);
        assert_eq!(129u16.convert::<u8>(), 1);
    }

    #[test]
    fn test_from_f32_clamps_integers() {
        assert_eq!(u8::from_f32(-0.5), 0);
        assert_eq!(u8::from_f32(1.5), 255);
        assert_eq!(u16::from_f32(2.0), 65535);
        // floats are not clamped
        assert_eq!(f32::from_f32(1.5), 1.5);
    }

    #[test]
    fn test_sentinels() {
        assert_eq!(u8::max_value(), 255);
        assert_eq!(u16::max_value(), 65535);
        assert_eq!(f32::max_value(), 1.0);
        assert!(0u8.is_sentinel());
        assert!(255u8.is_sentinel());
        assert!(!254u8.is_sentinel());
        assert!(!0.999f32.is_sentinel());
    }

    #[test]
    fn test_histogram_index() {
        assert_eq!(200u8.histogram_index(), 200);
        assert_eq!(1000u16.histogram_index(), 1000);
        assert_eq!(1.0f32.histogram_index(), 65535);
        assert_eq!(0.5f32.histogram_index(), 32768);
        assert_eq!(f32::bin_to_native(65535.0), 1.0);
        assert_eq!(u8::bin_to_native(128.0), 128.0);
    }
}
