//! Per-channel statistics on [`Image`] buffers.
//!
//! [`ImageStatistics`] adds the statistics accessors to every `Image<T>`.
//! Each takes a channel and a `clip` flag; with `clip` set, samples equal to
//! exactly the type's minimum or maximum sentinel are left out.
//!
//! Mean, standard deviation, average deviation and min/max read the samples
//! directly. Median and MAD are order statistics and go through a
//! [`Histogram`], so float channels resolve them at 16-bit precision. Both
//! paths select the same samples: the histogram is tallied from the
//! exact-sentinel-free selection rather than clipped by bin, so a float
//! sample such as `1e-6` counts everywhere or nowhere.
//!
//! ```rust
//! use astro_core::Image;
//! use astro_stats::ImageStatistics;
//!
//! let img = Image::<u16>::from_data(1, 4, 1, vec![0, 100, 300, 65535]).unwrap();
//! assert_eq!(img.compute_mean(0, true), 200.0);
//! assert_eq!(img.compute_median(0, true), 200.0);
//! ```

use crate::Histogram;
use astro_core::{DynImage, Image, ImageVisitor, Result, Sample};
use tracing::debug;

/// Consistency constant making MAD an estimator of the Gaussian sigma.
pub const MAD_TO_SIGMA: f64 = 1.4826;

/// Statistics accessors for one channel of an image.
///
/// All results are in the native scale of the sample type. An empty
/// selection (no samples, or all clipped) yields 0.
///
/// # Panics
///
/// Every method panics if `channel >= channels()`. Use
/// [`ChannelStatistics::compute`] for a checked call.
pub trait ImageStatistics {
    /// Arithmetic mean.
    fn compute_mean(&self, channel: u32, clip: bool) -> f64;

    /// Median via the cumulative histogram walk.
    fn compute_median(&self, channel: u32, clip: bool) -> f64;

    /// Population standard deviation.
    fn compute_std_dev(&self, channel: u32, clip: bool) -> f64;

    /// Median absolute deviation from the median.
    fn compute_mad(&self, channel: u32, clip: bool) -> f64;

    /// Mean absolute deviation from the median.
    fn compute_avg_dev(&self, channel: u32, clip: bool) -> f64;

    /// Smallest and largest sample.
    fn compute_min_max(&self, channel: u32, clip: bool) -> (f64, f64);

    /// Normalized MAD, `1.4826 * MAD`.
    fn n_mad(&self, channel: u32, clip: bool) -> f64 {
        MAD_TO_SIGMA * self.compute_mad(channel, clip)
    }

    /// Biweight midvariance, a robust variance estimate.
    fn bwmv(&self, channel: u32, clip: bool) -> f64;
}

/// Native values of the selected samples of one channel.
fn selected<T: Sample>(image: &Image<T>, channel: u32, clip: bool) -> impl Iterator<Item = f64> + '_ {
    image
        .channel_iter(channel)
        .filter(move |v| !(clip && v.is_sentinel()))
        .map(Sample::to_native)
}

fn mean_of(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0u64), |(s, n), v| (s + v, n + 1));
    if n == 0 { 0.0 } else { sum / n as f64 }
}

impl<T: Sample> ImageStatistics for Image<T> {
    fn compute_mean(&self, channel: u32, clip: bool) -> f64 {
        mean_of(selected(self, channel, clip))
    }

    fn compute_median(&self, channel: u32, clip: bool) -> f64 {
        Histogram::from_channel_selected(self, channel, clip).median(false)
    }

    fn compute_std_dev(&self, channel: u32, clip: bool) -> f64 {
        let mean = self.compute_mean(channel, clip);
        mean_of(selected(self, channel, clip).map(|v| (v - mean) * (v - mean))).sqrt()
    }

    fn compute_mad(&self, channel: u32, clip: bool) -> f64 {
        let median = self.compute_median(channel, clip);
        Histogram::mad_histogram(self, channel, median, clip).median(false)
    }

    fn compute_avg_dev(&self, channel: u32, clip: bool) -> f64 {
        let median = self.compute_median(channel, clip);
        mean_of(selected(self, channel, clip).map(|v| (v - median).abs()))
    }

    fn compute_min_max(&self, channel: u32, clip: bool) -> (f64, f64) {
        selected(self, channel, clip)
            .fold(None, |acc: Option<(f64, f64)>, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
            .unwrap_or((0.0, 0.0))
    }

    fn bwmv(&self, channel: u32, clip: bool) -> f64 {
        let median = self.compute_median(channel, clip);
        let mad = self.compute_mad(channel, clip);
        if mad == 0.0 {
            return 0.0;
        }
        let scale = 9.0 * mad;
        let mut n = 0u64;
        let mut num = 0.0;
        let mut den = 0.0;
        for v in selected(self, channel, clip) {
            n += 1;
            let d = v - median;
            let u = d / scale;
            let u2 = u * u;
            if u2 < 1.0 {
                let w = 1.0 - u2;
                num += d * d * w.powi(4);
                den += w * (1.0 - 5.0 * u2);
            }
        }
        if den == 0.0 {
            0.0
        } else {
            n as f64 * num / (den * den)
        }
    }
}

/// Options for record-producing statistics calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatisticsOptions {
    /// Drop exact-sentinel samples.
    pub clip: bool,
}

impl StatisticsOptions {
    /// Options with clipping enabled.
    pub const fn clipped() -> Self {
        Self { clip: true }
    }
}

/// Summary of one channel, as shown by a statistics display.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChannelStatistics {
    /// Samples that took part (after clipping).
    pub pixel_count: u64,
    /// Arithmetic mean.
    pub mean: f64,
    /// Median.
    pub median: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    /// Mean absolute deviation from the median.
    pub avg_dev: f64,
    /// Median absolute deviation.
    pub mad: f64,
    /// Smallest sample.
    pub min: f64,
    /// Largest sample.
    pub max: f64,
}

impl ChannelStatistics {
    /// Computes the record for one channel.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChannelOutOfRange`](astro_core::Error::ChannelOutOfRange)
    /// for a missing channel.
    pub fn compute<T: Sample>(image: &Image<T>, channel: u32, options: StatisticsOptions) -> Result<Self> {
        image.check_channel(channel)?;
        let clip = options.clip;
        let hist = Histogram::from_channel_selected(image, channel, clip);
        let median = hist.median(false);
        let mad = Histogram::mad_histogram(image, channel, median, clip).median(false);
        let (min, max) = image.compute_min_max(channel, clip);
        let stats = Self {
            pixel_count: hist.total(),
            mean: image.compute_mean(channel, clip),
            median,
            std_dev: image.compute_std_dev(channel, clip),
            avg_dev: mean_of(selected(image, channel, clip).map(|v| (v - median).abs())),
            mad,
            min,
            max,
        };
        debug!(channel, clip, count = stats.pixel_count, median, "channel statistics");
        Ok(stats)
    }

    /// Computes one record per channel.
    pub fn for_image<T: Sample>(image: &Image<T>, options: StatisticsOptions) -> Vec<Self> {
        (0..image.channels())
            .filter_map(|ch| Self::compute(image, ch, options).ok())
            .collect()
    }

    /// Per-channel records for an image whose sample type is known only at runtime.
    pub fn for_dyn_image(image: &DynImage, options: StatisticsOptions) -> Vec<Self> {
        struct Collect(StatisticsOptions);

        impl ImageVisitor for Collect {
            type Output = Vec<ChannelStatistics>;
            fn visit<T: Sample>(self, image: &Image<T>) -> Self::Output {
                ChannelStatistics::for_image(image, self.0)
            }
        }

        image.visit(Collect(options))
    }

    /// Normalized MAD of this record.
    pub fn n_mad(&self) -> f64 {
        MAD_TO_SIGMA * self.mad
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use astro_core::Error;

    fn mono_u8(values: &[u8]) -> Image<u8> {
        Image::from_data(1, values.len() as u32, 1, values.to_vec()).unwrap()
    }

    #[test]
    fn test_clip_changes_statistics() {
        let img = mono_u8(&[0, 0, 0, 10, 20, 255]);
        assert_eq!(img.compute_median(0, false), 5.0);
        assert_eq!(img.compute_median(0, true), 15.0);
        assert_abs_diff_eq!(img.compute_mean(0, false), 285.0 / 6.0, epsilon = 1e-12);
        assert_eq!(img.compute_mean(0, true), 15.0);
        assert_eq!(img.compute_min_max(0, true), (10.0, 20.0));
        assert_eq!(img.compute_min_max(0, false), (0.0, 255.0));
    }

    #[test]
    fn test_std_and_avg_dev() {
        let img = mono_u8(&[2, 4, 4, 4, 5, 5, 7, 9]);
        assert_abs_diff_eq!(img.compute_std_dev(0, false), 2.0, epsilon = 1e-12);
        // median: cumulative hits 4 exactly at bin 4, next occupied is 5
        assert_eq!(img.compute_median(0, false), 4.5);
        assert_abs_diff_eq!(img.compute_avg_dev(0, false), 12.0 / 8.0, epsilon = 1e-12);
    }

    #[test]
    fn test_mad_and_n_mad() {
        let img = mono_u8(&[10, 12, 14, 16, 18]);
        assert_eq!(img.compute_mad(0, false), 2.0);
        assert_abs_diff_eq!(img.n_mad(0, false), 2.0 * 1.4826, epsilon = 1e-12);
    }

    #[test]
    fn test_bwmv() {
        let img = mono_u8(&[10, 12, 14, 16, 18]);
        // MAD = 2, scale = 18; u = d / 18 for d in {-4,-2,0,2,4}
        let mut num = 0.0;
        let mut den = 0.0;
        for d in [-4.0f64, -2.0, 0.0, 2.0, 4.0] {
            let u2 = (d / 18.0) * (d / 18.0);
            num += d * d * (1.0 - u2).powi(4);
            den += (1.0 - u2) * (1.0 - 5.0 * u2);
        }
        let expected = 5.0 * num / (den * den);
        assert_abs_diff_eq!(img.bwmv(0, false), expected, epsilon = 1e-9);
        assert_eq!(mono_u8(&[7, 7, 7]).bwmv(0, false), 0.0);
    }

    #[test]
    fn test_float_units() {
        let img = Image::<f32>::from_data(1, 4, 1, vec![0.0, 0.25, 0.75, 1.0]).unwrap();
        assert_abs_diff_eq!(img.compute_mean(0, true), 0.5, epsilon = 1e-7);
        assert_eq!(img.compute_min_max(0, true), (0.25, 0.75));
    }

    #[test]
    fn test_float_clip_drops_exact_sentinels_only() {
        let img = Image::<f32>::from_data(1, 5, 1, vec![0.0, 1e-6, 0.5, 0.999995, 1.0]).unwrap();
        let s = ChannelStatistics::compute(&img, 0, StatisticsOptions::clipped()).unwrap();
        assert_eq!(s.pixel_count, 3);
        assert_eq!(s.min, 1e-6f32 as f64);
        assert_eq!(s.max, 0.999995f32 as f64);
        assert_abs_diff_eq!(s.mean, (1e-6 + 0.5 + 0.999995) / 3.0, epsilon = 1e-7);
        assert_abs_diff_eq!(s.median, 0.5, epsilon = 1e-4);
        assert_eq!(img.compute_median(0, true), s.median);

        let all = ChannelStatistics::compute(&img, 0, StatisticsOptions::default()).unwrap();
        assert_eq!(all.pixel_count, 5);
    }

    #[test]
    fn test_mad_between_bins() {
        let img = mono_u8(&[2, 4, 4, 4, 5, 5, 7, 9]);
        assert_eq!(img.compute_mad(0, false), 0.5);
    }

    #[test]
    fn test_empty_selection_is_zero() {
        let img = mono_u8(&[0, 255]);
        assert_eq!(img.compute_mean(0, true), 0.0);
        assert_eq!(img.compute_std_dev(0, true), 0.0);
        assert_eq!(img.compute_median(0, true), 0.0);
        assert_eq!(img.compute_min_max(0, true), (0.0, 0.0));
    }

    #[test]
    fn test_channel_record() {
        let img = Image::<u8>::from_fn(2, 2, 3, |x, y, c| (c * 10 + y * 2 + x) as u8).unwrap();
        let stats = ChannelStatistics::for_image(&img, StatisticsOptions::default());
        assert_eq!(stats.len(), 3);
        assert_eq!(stats[2].pixel_count, 4);
        assert_eq!(stats[2].mean, 21.5);
        assert_eq!(stats[2].min, 20.0);
        assert_eq!(stats[2].max, 23.0);
        assert_eq!(stats[2].median, 21.5);

        let err = ChannelStatistics::compute(&img, 3, StatisticsOptions::default()).unwrap_err();
        assert!(matches!(err, Error::ChannelOutOfRange { channel: 3, channels: 3 }));
    }

    #[test]
    fn test_dyn_record_matches_typed() {
        let img = Image::<u16>::from_fn(3, 3, 1, |x, y, _| (x * 1000 + y * 10) as u16).unwrap();
        let typed = ChannelStatistics::for_image(&img, StatisticsOptions::clipped());
        let dynamic = ChannelStatistics::for_dyn_image(&DynImage::from(img), StatisticsOptions::clipped());
        assert_eq!(typed, dynamic);
        assert_eq!(dynamic[0].pixel_count, 8);
    }
}
