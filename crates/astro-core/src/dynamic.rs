//! Type-erased images and dispatch by sample type.
//!
//! Generic code is written once over `Image<T: Sample>`. When the sample
//! type is only known at runtime (read from a file header, chosen in a
//! dialog), the image travels as a [`DynImage`] and generic code is reached
//! through a visitor:
//!
//! ```rust
//! use astro_core::{DynImage, Image, ImageVisitor, Sample, SampleType};
//!
//! struct MaxSample;
//!
//! impl ImageVisitor for MaxSample {
//!     type Output = f32;
//!     fn visit<T: Sample>(self, image: &Image<T>) -> f32 {
//!         image.data().iter().map(|v| v.to_f32()).fold(0.0, f32::max)
//!     }
//! }
//!
//! let img = DynImage::new(SampleType::U16, 2, 2, 1).unwrap();
//! assert_eq!(img.visit(MaxSample), 0.0);
//! ```
//!
//! The match inside [`DynImage::visit`] is exhaustive over the three
//! variants, and each visitor method is monomorphized for `u8`, `u16` and
//! `f32`. A sample type without an instantiation is a compile error, and a
//! buffer can never be read as a different sample type than it holds.

use crate::{Error, Image, Result, Sample, SampleType};

/// An image whose sample type is selected at runtime.
#[derive(Clone, PartialEq)]
pub enum DynImage {
    /// 8-bit samples.
    U8(Image<u8>),
    /// 16-bit samples.
    U16(Image<u16>),
    /// Normalized float samples.
    F32(Image<f32>),
}

/// A single sample whose type is selected at runtime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DynSample {
    /// 8-bit sample.
    U8(u8),
    /// 16-bit sample.
    U16(u16),
    /// Normalized float sample.
    F32(f32),
}

impl DynSample {
    /// Wraps a concrete sample.
    #[inline]
    pub fn from_sample<T: Sample>(v: T) -> Self {
        match T::TYPE {
            SampleType::U8 => DynSample::U8(v.convert()),
            SampleType::U16 => DynSample::U16(v.convert()),
            SampleType::F32 => DynSample::F32(v.convert()),
        }
    }

    /// Sample type of the wrapped value.
    #[inline]
    pub fn sample_type(&self) -> SampleType {
        match self {
            DynSample::U8(_) => SampleType::U8,
            DynSample::U16(_) => SampleType::U16,
            DynSample::F32(_) => SampleType::F32,
        }
    }

    /// Normalized float value.
    #[inline]
    pub fn to_f32(&self) -> f32 {
        match *self {
            DynSample::U8(v) => v.to_f32(),
            DynSample::U16(v) => v.to_f32(),
            DynSample::F32(v) => v,
        }
    }
}

/// Read-only generic operation over an image of any sample type.
pub trait ImageVisitor {
    /// Result of the visit.
    type Output;

    /// Called with the concrete image.
    fn visit<T: Sample>(self, image: &Image<T>) -> Self::Output;
}

/// Mutating generic operation over an image of any sample type.
pub trait ImageVisitorMut {
    /// Result of the visit.
    type Output;

    /// Called with the concrete image.
    fn visit_mut<T: Sample>(self, image: &mut Image<T>) -> Self::Output;
}

impl DynImage {
    /// Allocates a zero-filled image of the given sample type.
    pub fn new(sample_type: SampleType, rows: u32, cols: u32, channels: u32) -> Result<Self> {
        Ok(match sample_type {
            SampleType::U8 => DynImage::U8(Image::new(rows, cols, channels)?),
            SampleType::U16 => DynImage::U16(Image::new(rows, cols, channels)?),
            SampleType::F32 => DynImage::F32(Image::new(rows, cols, channels)?),
        })
    }

    /// Runtime sample-type tag.
    #[inline]
    pub fn sample_type(&self) -> SampleType {
        match self {
            DynImage::U8(_) => SampleType::U8,
            DynImage::U16(_) => SampleType::U16,
            DynImage::F32(_) => SampleType::F32,
        }
    }

    /// Dispatches a read-only visitor to the concrete image.
    #[inline]
    pub fn visit<V: ImageVisitor>(&self, visitor: V) -> V::Output {
        match self {
            DynImage::U8(img) => visitor.visit(img),
            DynImage::U16(img) => visitor.visit(img),
            DynImage::F32(img) => visitor.visit(img),
        }
    }

    /// Dispatches a mutating visitor to the concrete image.
    #[inline]
    pub fn visit_mut<V: ImageVisitorMut>(&mut self, visitor: V) -> V::Output {
        match self {
            DynImage::U8(img) => visitor.visit_mut(img),
            DynImage::U16(img) => visitor.visit_mut(img),
            DynImage::F32(img) => visitor.visit_mut(img),
        }
    }

    /// `(rows, cols, channels)`.
    pub fn shape(&self) -> (u32, u32, u32) {
        match self {
            DynImage::U8(img) => img.shape(),
            DynImage::U16(img) => img.shape(),
            DynImage::F32(img) => img.shape(),
        }
    }

    /// Whether rows, cols and channels match `other`, whatever its sample type.
    pub fn is_same_shape(&self, other: &DynImage) -> bool {
        self.shape() == other.shape()
    }

    /// Bounds-checked sample read.
    pub fn at(&self, x: i64, y: i64, channel: u32) -> DynSample {
        match self {
            DynImage::U8(img) => DynSample::U8(img.at(x, y, channel)),
            DynImage::U16(img) => DynSample::U16(img.at(x, y, channel)),
            DynImage::F32(img) => DynSample::F32(img.at(x, y, channel)),
        }
    }

    /// Converts into a new buffer of `target` sample type.
    pub fn convert_to(&self, target: SampleType) -> DynImage {
        struct Convert(SampleType);

        impl ImageVisitor for Convert {
            type Output = DynImage;
            fn visit<T: Sample>(self, image: &Image<T>) -> DynImage {
                match self.0 {
                    SampleType::U8 => DynImage::U8(image.convert()),
                    SampleType::U16 => DynImage::U16(image.convert()),
                    SampleType::F32 => DynImage::F32(image.convert()),
                }
            }
        }

        self.visit(Convert(target))
    }

    /// Converts RGB to luminance, reshaping to one channel.
    pub fn rgb_to_gray(&mut self) {
        match self {
            DynImage::U8(img) => img.rgb_to_gray(),
            DynImage::U16(img) => img.rgb_to_gray(),
            DynImage::F32(img) => img.rgb_to_gray(),
        }
    }

    /// Borrows the concrete image if it holds `T` samples.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SampleTypeMismatch`] when the stored type differs.
    pub fn downcast_ref<T: Sample>(&self) -> Result<&Image<T>> {
        let any: &dyn std::any::Any = match self {
            DynImage::U8(img) => img,
            DynImage::U16(img) => img,
            DynImage::F32(img) => img,
        };
        any.downcast_ref::<Image<T>>().ok_or(Error::SampleTypeMismatch {
            expected: T::TYPE,
            found: self.sample_type(),
        })
    }

    /// Mutably borrows the concrete image if it holds `T` samples.
    pub fn downcast_mut<T: Sample>(&mut self) -> Result<&mut Image<T>> {
        let found = self.sample_type();
        let any: &mut dyn std::any::Any = match self {
            DynImage::U8(img) => img,
            DynImage::U16(img) => img,
            DynImage::F32(img) => img,
        };
        any.downcast_mut::<Image<T>>().ok_or(Error::SampleTypeMismatch {
            expected: T::TYPE,
            found,
        })
    }
}

impl std::fmt::Debug for DynImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DynImage::U8(img) => std::fmt::Debug::fmt(img, f),
            DynImage::U16(img) => std::fmt::Debug::fmt(img, f),
            DynImage::F32(img) => std::fmt::Debug::fmt(img, f),
        }
    }
}

impl From<Image<u8>> for DynImage {
    fn from(img: Image<u8>) -> Self {
        DynImage::U8(img)
    }
}

impl From<Image<u16>> for DynImage {
    fn from(img: Image<u16>) -> Self {
        DynImage::U16(img)
    }
}

impl From<Image<f32>> for DynImage {
    fn from(img: Image<f32>) -> Self {
        DynImage::F32(img)
    }
}
