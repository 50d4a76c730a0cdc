//! # astro-stats
//!
//! Histogram and order-statistics engine for astronomical images.
//!
//! - [`Histogram`] - count-per-value histogram, MAD histogram, resampling
//! - [`ImageStatistics`] - mean, median, std-dev, MAD, average deviation,
//!   min/max, nMAD and BWMV per channel of any [`Image`](astro_core::Image)
//! - [`ChannelStatistics`] - fixed-shape per-channel record for display
//!
//! All queries accept a `clip` flag that leaves out samples sitting exactly
//! on the type's minimum or maximum, the usual convention for excluding
//! saturated pixels.
//!
//! ## Feature Flags
//!
//! - `serde` - serialization for [`ChannelStatistics`] and [`StatisticsOptions`]

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod histogram;
pub mod stats;

pub use histogram::Histogram;
pub use stats::{ChannelStatistics, ImageStatistics, StatisticsOptions, MAD_TO_SIGMA};
