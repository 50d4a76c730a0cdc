//! # astro-ops
//!
//! Image operations on [`astro_core::Image`] buffers of any sample type.
//!
//! # Modules
//!
//! - [`interpolate`] - seven-kernel fractional sample lookup
//! - [`transform`] - resize, rotate and affine warp built on the interpolator
//! - [`blend`] - mask-weighted blending and masked process application
//! - [`process`] - per-sample maps, generic processes, runtime dispatch
//!
//! # Example
//!
//! ```rust
//! use astro_core::{Image, ImagePointF, ParallelConfig};
//! use astro_ops::{InterpolationKind, Interpolator};
//! use astro_ops::process::{apply_map, Binarize};
//!
//! let mut img = Image::<u8>::filled(8, 8, 1, 140).unwrap();
//! let v = Interpolator::new(InterpolationKind::CatmullRom)
//!     .interpolate_pixel(&img, ImagePointF::new(3.5, 3.5, 0));
//! assert_eq!(v, 140);
//!
//! apply_map(&mut img, &Binarize::new(0.5), &ParallelConfig::default());
//! assert_eq!(img.get(0, 0, 0), 255);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` - serialization for [`Interpolator`], [`InterpolationKind`]
//!   and the built-in sample maps

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod blend;
pub mod error;
pub mod interpolate;
pub mod process;
pub mod transform;

pub use blend::{apply_masked, apply_masked_dyn, blend, blend_into, blend_sample};
pub use error::{OpsError, OpsResult};
pub use interpolate::{InterpolationKind, Interpolator};
pub use process::{apply_map, apply_process, Process, SampleMap};
pub use transform::{resize, rotate, rotate_centered, warp_affine};
