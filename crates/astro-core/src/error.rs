//! Error types for astro-core operations.
//!
//! Hot-path accessors (element access, in-place arithmetic) do not return
//! errors; callers guard them with the shape predicates on
//! [`Image`](crate::Image). The variants here are produced by the checked
//! constructors and combinators that sit in front of the hot path.
//!
//! # Usage
//!
//! ```rust
//! use astro_core::{Error, Image};
//!
//! let err = Image::<u8>::new(4, 4, 2).unwrap_err();
//! assert!(matches!(err, Error::InvalidChannels(2)));
//! ```
//!
//! # Dependencies
//!
//! - [`thiserror`] - derive macro for the error enum

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported by image construction and checked combinators.
///
/// # Categories
///
/// - **Shape errors**: [`InvalidChannels`](Error::InvalidChannels),
///   [`InvalidDimensions`](Error::InvalidDimensions),
///   [`ShapeMismatch`](Error::ShapeMismatch),
///   [`ChannelOutOfRange`](Error::ChannelOutOfRange)
/// - **Type errors**: [`UnknownSampleType`](Error::UnknownSampleType),
///   [`SampleTypeMismatch`](Error::SampleTypeMismatch)
/// - **Data errors**: [`InvalidData`](Error::InvalidData)
#[derive(Debug, Error)]
pub enum Error {
    /// Channel count is not 1 or 3.
    #[error("unsupported channel count {0}: expected 1 or 3")]
    InvalidChannels(u32),

    /// Dimensions overflow the sample index. Zero rows or columns are
    /// valid and give an empty image.
    #[error("invalid dimensions {rows}x{cols}: {reason}")]
    InvalidDimensions {
        /// Requested row count
        rows: u32,
        /// Requested column count
        cols: u32,
        /// Why the dimensions were rejected
        reason: String,
    },

    /// Two images that must share a shape do not.
    ///
    /// This is the "incompatible image sizes" error surfaced to users.
    #[error("incompatible image sizes: {left:?} vs {right:?}")]
    ShapeMismatch {
        /// (rows, cols, channels) of the left operand
        left: (u32, u32, u32),
        /// (rows, cols, channels) of the right operand
        right: (u32, u32, u32),
    },

    /// Channel index outside the image's channel range.
    #[error("channel {channel} out of range for {channels}-channel image")]
    ChannelOutOfRange {
        /// Requested channel
        channel: u32,
        /// Image channel count
        channels: u32,
    },

    /// A sample-type tag that maps to none of u8, u16 or f32.
    #[error("unknown sample type: {0}")]
    UnknownSampleType(String),

    /// A type-erased image holds a different sample type than requested.
    #[error("sample type mismatch: expected {expected}, found {found}")]
    SampleTypeMismatch {
        /// Sample type the caller asked for
        expected: crate::SampleType,
        /// Sample type actually stored
        found: crate::SampleType,
    },

    /// Raw sample data does not match the declared shape.
    #[error("invalid sample data: {0}")]
    InvalidData(String),
}

impl Error {
    /// Creates an [`InvalidDimensions`](Error::InvalidDimensions) error.
    pub fn invalid_dimensions(rows: u32, cols: u32, reason: impl Into<String>) -> Self {
        Self::InvalidDimensions {
            rows,
            cols,
            reason: reason.into(),
        }
    }

    /// Creates a [`ShapeMismatch`](Error::ShapeMismatch) error.
    pub fn shape_mismatch(left: (u32, u32, u32), right: (u32, u32, u32)) -> Self {
        Self::ShapeMismatch { left, right }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::shape_mismatch((4, 4, 3), (4, 5, 3));
        assert!(err.to_string().contains("incompatible image sizes"));

        let err = Error::invalid_dimensions(0, 10, "zero rows");
        assert!(err.to_string().contains("0x10"));
    }
}
