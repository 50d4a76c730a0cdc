//! Runtime sample-type tag.
//!
//! [`SampleType`] names one of the three concrete [`Sample`](crate::Sample)
//! types when the element type is erased, e.g. inside a
//! [`DynImage`](crate::DynImage) or when a decoder reports what it produced.
//!
//! Unrecognised tags can only appear at the parse boundary
//! ([`SampleType::from_bitpix`], [`FromStr`](std::str::FromStr),
//! [`TryFrom<u32>`]), where they are rejected with
//! [`Error::UnknownSampleType`]. Past that point the enum is closed.
//!
//! ```rust
//! use astro_core::SampleType;
//!
//! assert_eq!(SampleType::from_bitpix(16).unwrap(), SampleType::U16);
//! assert_eq!("f32".parse::<SampleType>().unwrap(), SampleType::F32);
//! assert!(SampleType::from_bitpix(64).is_err());
//! ```

use crate::{Error, Result};
use std::str::FromStr;

/// Runtime tag for the sample type of an image buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SampleType {
    /// 8-bit unsigned integer, [0, 255].
    U8,
    /// 16-bit unsigned integer, [0, 65535].
    #[default]
    U16,
    /// 32-bit normalized float, [0.0, 1.0].
    F32,
}

impl SampleType {
    /// All supported sample types.
    pub const ALL: [SampleType; 3] = [SampleType::U8, SampleType::U16, SampleType::F32];

    /// Number of bits per sample.
    #[inline]
    pub const fn bits(&self) -> u32 {
        match self {
            Self::U8 => 8,
            Self::U16 => 16,
            Self::F32 => 32,
        }
    }

    /// Number of bytes per sample.
    #[inline]
    pub const fn bytes(&self) -> usize {
        match self {
            Self::U8 => 1,
            Self::U16 => 2,
            Self::F32 => 4,
        }
    }

    /// Whether this is a floating-point type.
    #[inline]
    pub const fn is_float(&self) -> bool {
        matches!(self, Self::F32)
    }

    /// Maximum sentinel in native units.
    #[inline]
    pub const fn max_value(&self) -> f64 {
        match self {
            Self::U8 => 255.0,
            Self::U16 => 65535.0,
            Self::F32 => 1.0,
        }
    }

    /// Short name for display.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::F32 => "f32",
        }
    }

    /// Maps a FITS `BITPIX` value to a sample type.
    ///
    /// `8`, `16` and `-32` are supported. Signed 32-bit integers and doubles
    /// are left to the decoder, which should convert them before handing the
    /// buffer over.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownSampleType`] for any other value.
    pub fn from_bitpix(bitpix: i32) -> Result<Self> {
        match bitpix {
            8 => Ok(Self::U8),
            16 => Ok(Self::U16),
            -32 => Ok(Self::F32),
            other => Err(Error::UnknownSampleType(format!("BITPIX {other}"))),
        }
    }

    /// FITS `BITPIX` value of this sample type.
    pub const fn bitpix(&self) -> i32 {
        match self {
            Self::U8 => 8,
            Self::U16 => 16,
            Self::F32 => -32,
        }
    }
}

impl std::fmt::Display for SampleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for SampleType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "u8" | "8" | "8-bit" | "byte" => Ok(Self::U8),
            "u16" | "16" | "16-bit" | "ushort" => Ok(Self::U16),
            "f32" | "32f" | "float" | "float32" => Ok(Self::F32),
            _ => Err(Error::UnknownSampleType(s.to_string())),
        }
    }
}

impl TryFrom<u32> for SampleType {
    type Error = Error;

    /// Converts a bit count (8, 16, 32) to a sample type.
    fn try_from(bits: u32) -> Result<Self> {
        match bits {
            8 => Ok(Self::U8),
            16 => Ok(Self::U16),
            32 => Ok(Self::F32),
            other => Err(Error::UnknownSampleType(format!("{other} bits"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Sample;

    #[test]
    fn test_tags_match_trait() {
        assert_eq!(<u8 as Sample>::TYPE, SampleType::U8);
        assert_eq!(<u16 as Sample>::TYPE, SampleType::U16);
        assert_eq!(<f32 as Sample>::TYPE, SampleType::F32);
        for t in SampleType::ALL {
            assert_eq!(SampleType::try_from(t.bits()).unwrap(), t);
        }
    }

    #[test]
    fn test_bitpix() {
        for t in SampleType::ALL {
            assert_eq!(SampleType::from_bitpix(t.bitpix()).unwrap(), t);
        }
        assert!(matches!(
            SampleType::from_bitpix(-64),
            Err(Error::UnknownSampleType(_))
        ));
    }

    #[test]
    fn test_parse() {
        assert_eq!("U8".parse::<SampleType>().unwrap(), SampleType::U8);
        assert_eq!("float".parse::<SampleType>().unwrap(), SampleType::F32);
        assert!("f16".parse::<SampleType>().is_err());
        assert!(SampleType::try_from(24).is_err());
    }
}
