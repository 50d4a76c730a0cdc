//! # astro-core
//!
//! Core types for astronomical image processing.
//!
//! This crate provides the foundational types used throughout the workspace:
//!
//! - [`Sample`] - `u8`, `u16` and `f32` samples with one conversion law
//! - [`SampleType`] - runtime tag for the sample type
//! - [`Image`] - planar 1- or 3-channel buffer with bounds-checked and
//!   mirrored reads
//! - [`DynImage`] - an image whose sample type is chosen at runtime, with
//!   visitor dispatch into generic code
//! - [`Color`], [`Point`], [`ImagePoint`], [`ImagePointF`] - value types
//! - [`ParallelConfig`] - explicit threading for elementwise transforms
//!
//! ## Crate Structure
//!
//! ```text
//! astro-core (this crate)
//!    ^
//!    |
//!    +-- astro-stats (histograms, robust statistics)
//!    +-- astro-ops   (interpolation, resampling, blending, processes)
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` - serialization for value and configuration types

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod color;
pub mod colorspace;
pub mod dynamic;
pub mod error;
pub mod format;
pub mod image;
pub mod parallel;
pub mod point;
pub mod sample;

pub use color::{luminance, Color, LUMA, LUMA_B, LUMA_G, LUMA_R};
pub use colorspace::{lab_to_rgb, rgb_to_lab};
pub use dynamic::{DynImage, DynSample, ImageVisitor, ImageVisitorMut};
pub use error::{Error, Result};
pub use format::SampleType;
pub use image::{ArithOp, Image};
pub use parallel::{ParallelConfig, DEFAULT_THREADS};
pub use point::{ImagePoint, ImagePointF, Point};
pub use sample::Sample;

/// Prelude module for convenient imports.
///
/// ```
/// use astro_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::color::Color;
    pub use crate::dynamic::{DynImage, ImageVisitor, ImageVisitorMut};
    pub use crate::error::{Error, Result};
    pub use crate::format::SampleType;
    pub use crate::image::{ArithOp, Image};
    pub use crate::parallel::ParallelConfig;
    pub use crate::point::{ImagePoint, ImagePointF, Point};
    pub use crate::sample::Sample;
}
