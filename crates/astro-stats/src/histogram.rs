//! Sample histograms and order statistics.
//!
//! A [`Histogram`] holds one count per possible sample value: 256 bins for
//! `u8`, 65536 for `u16`, and 65536 for `f32`, which is quantized to 16-bit
//! resolution. It is built in one pass and never updated incrementally.
//!
//! # Clipping
//!
//! Every query takes a `clip` flag. With `clip = true` the two sentinel
//! bins (index `0` and `resolution - 1`) are dropped from the total and
//! from the cumulative walk, so saturated black and white pixels don't
//! pull the statistic.
//!
//! For `f32` the end bins also hold near-sentinel values (anything that
//! quantizes to 0 or 65535). Statistics that must leave out only exact
//! `0.0` and `1.0` build the histogram with
//! [`from_channel_selected`](Histogram::from_channel_selected) and query it
//! unclipped.
//!
//! # Units
//!
//! Results are reported in the native scale of the source sample type:
//! integer images in their integer range, float images in `[0, 1]`. The
//! `*_bin` variants return raw bin positions.
//!
//! ```rust
//! use astro_core::Image;
//! use astro_stats::Histogram;
//!
//! let img = Image::<u8>::from_data(1, 6, 1, vec![0, 0, 0, 10, 20, 255]).unwrap();
//! let hist = Histogram::from_channel(&img, 0);
//! assert_eq!(hist.median(false), 5.0);
//! assert_eq!(hist.median(true), 15.0);
//! ```

use astro_core::{Image, Sample, SampleType};
use tracing::trace;

/// Count-per-value histogram of one image or channel.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    bins: Vec<u64>,
    /// Native value represented by the last bin.
    max_native: f64,
}

impl Histogram {
    /// Creates an empty histogram with `resolution` bins spanning
    /// `[0, max_native]`.
    pub fn new(resolution: usize, max_native: f64) -> Self {
        Self {
            bins: vec![0; resolution],
            max_native,
        }
    }

    /// Creates an empty histogram at the native resolution of `T`.
    pub fn for_sample<T: Sample>() -> Self {
        Self::new(T::HISTOGRAM_RESOLUTION, T::max_value().to_native())
    }

    /// Creates an empty histogram at the native resolution of a runtime type.
    pub fn for_sample_type(sample_type: SampleType) -> Self {
        match sample_type {
            SampleType::U8 => Self::for_sample::<u8>(),
            SampleType::U16 => Self::for_sample::<u16>(),
            SampleType::F32 => Self::for_sample::<f32>(),
        }
    }

    /// Tallies every sample of every channel.
    pub fn from_image<T: Sample>(image: &Image<T>) -> Self {
        let mut hist = Self::for_sample::<T>();
        hist.add_samples(image.data().iter().copied());
        trace!(
            rows = image.rows(),
            cols = image.cols(),
            channels = image.channels(),
            total = hist.total(),
            "histogram::from_image"
        );
        hist
    }

    /// Tallies one channel plane.
    ///
    /// # Panics
    ///
    /// Panics if `channel >= image.channels()`.
    pub fn from_channel<T: Sample>(image: &Image<T>, channel: u32) -> Self {
        let mut hist = Self::for_sample::<T>();
        hist.add_samples(image.channel_iter(channel));
        trace!(channel, total = hist.total(), "histogram::from_channel");
        hist
    }

    /// Tallies one channel plane, leaving out exact-sentinel samples when
    /// `clip` is set.
    ///
    /// The result holds exactly the samples a clipped statistic uses, so it
    /// is queried with `clip = false`.
    ///
    /// # Panics
    ///
    /// Panics if `channel >= image.channels()`.
    pub fn from_channel_selected<T: Sample>(image: &Image<T>, channel: u32, clip: bool) -> Self {
        let mut hist = Self::for_sample::<T>();
        hist.add_samples(image.channel_iter(channel).filter(|v| !(clip && v.is_sentinel())));
        trace!(channel, clip, total = hist.total(), "histogram::from_channel_selected");
        hist
    }

    /// Histogram of absolute deviations `|bin(sample) - median|`.
    ///
    /// `median` is in native units (as returned by [`median`](Self::median)).
    /// Bins are half a sample bin wide (`2 * (resolution - 1) + 1` of them
    /// over the same native range), so a median sitting between two bins
    /// gives exact deviations. With `clip` set, samples sitting on a sentinel
    /// are not tallied. MAD is the unclipped median of the result, since bin
    /// 0 here means "no deviation" rather than "black".
    ///
    /// # Panics
    ///
    /// Panics if `channel >= image.channels()`.
    pub fn mad_histogram<T: Sample>(image: &Image<T>, channel: u32, median: f64, clip: bool) -> Self {
        let median_bin = Self::for_sample::<T>().native_to_bin(median);
        let mut hist = Self::new(2 * (T::HISTOGRAM_RESOLUTION - 1) + 1, T::max_value().to_native());
        let last = hist.bins.len() - 1;
        for v in image.channel_iter(channel) {
            if clip && v.is_sentinel() {
                continue;
            }
            let dev = (2.0 * (v.histogram_index() as f64 - median_bin)).abs().round() as usize;
            hist.bins[dev.min(last)] += 1;
        }
        trace!(channel, median, clip, total = hist.total(), "histogram::mad_histogram");
        hist
    }

    fn add_samples<T: Sample>(&mut self, samples: impl Iterator<Item = T>) {
        for v in samples {
            self.bins[v.histogram_index()] += 1;
        }
    }

    /// Number of bins.
    #[inline]
    pub fn resolution(&self) -> usize {
        self.bins.len()
    }

    /// Raw bin counts.
    #[inline]
    pub fn bins(&self) -> &[u64] {
        &self.bins
    }

    /// Increments one bin.
    #[inline]
    pub fn add(&mut self, bin: usize) {
        self.bins[bin] += 1;
    }

    /// Native value of the last bin (255, 65535 or 1.0 for unresampled
    /// histograms).
    #[inline]
    pub fn max_native(&self) -> f64 {
        self.max_native
    }

    /// Total count across all bins.
    pub fn total(&self) -> u64 {
        self.bins.iter().sum()
    }

    /// Total count, excluding the sentinel bins when `clip` is set.
    pub fn count(&self, clip: bool) -> u64 {
        let (lo, hi) = self.range(clip);
        self.bins[lo..hi].iter().sum()
    }

    /// Running sum of the bin counts.
    pub fn cumulative(&self) -> Vec<u64> {
        self.bins
            .iter()
            .scan(0u64, |acc, &c| {
                *acc += c;
                Some(*acc)
            })
            .collect()
    }

    /// `[lo, hi)` bin range taking part in a query.
    fn range(&self, clip: bool) -> (usize, usize) {
        let n = self.bins.len();
        if clip && n > 2 { (1, n - 1) } else { (0, n) }
    }

    /// Native value of a (possibly fractional) bin position.
    #[inline]
    pub fn bin_to_native(&self, bin: f64) -> f64 {
        match self.bins.len() {
            0 | 1 => 0.0,
            n => bin * self.max_native / (n - 1) as f64,
        }
    }

    /// Bin position of a native value.
    #[inline]
    pub fn native_to_bin(&self, value: f64) -> f64 {
        if self.max_native == 0.0 || self.bins.len() < 2 {
            0.0
        } else {
            value * (self.bins.len() - 1) as f64 / self.max_native
        }
    }

    /// Median bin position.
    ///
    /// Walks the cumulative counts until they exceed half the total. When
    /// the running count lands exactly on half, the median is the midpoint
    /// of that bin and the next non-empty one. An empty histogram gives 0.
    pub fn median_bin(&self, clip: bool) -> f64 {
        let (lo, hi) = self.range(clip);
        let total = self.count(clip);
        if total == 0 {
            return 0.0;
        }
        let half = total as f64 / 2.0;
        let mut cum = 0u64;
        for i in lo..hi {
            cum += self.bins[i];
            let c = cum as f64;
            if c > half {
                return i as f64;
            }
            if c == half {
                let next = (i + 1..hi).find(|&j| self.bins[j] > 0).unwrap_or(i);
                return (i + next) as f64 / 2.0;
            }
        }
        0.0
    }

    /// Median in native units.
    pub fn median(&self, clip: bool) -> f64 {
        self.bin_to_native(self.median_bin(clip))
    }

    /// Median normalized to `[0, 1]`.
    pub fn median_normalized(&self, clip: bool) -> f64 {
        match self.bins.len() {
            0 | 1 => 0.0,
            n => self.median_bin(clip) / (n - 1) as f64,
        }
    }

    /// Count-weighted mean in native units.
    pub fn mean(&self, clip: bool) -> f64 {
        let (lo, hi) = self.range(clip);
        let total = self.count(clip);
        if total == 0 {
            return 0.0;
        }
        let sum: f64 = (lo..hi).map(|i| i as f64 * self.bins[i] as f64).sum();
        self.bin_to_native(sum / total as f64)
    }

    /// Population standard deviation in native units.
    pub fn std_dev(&self, clip: bool) -> f64 {
        let (lo, hi) = self.range(clip);
        let total = self.count(clip);
        if total == 0 {
            return 0.0;
        }
        let mean = self.native_to_bin(self.mean(clip));
        let var: f64 = (lo..hi)
            .map(|i| {
                let d = i as f64 - mean;
                d * d * self.bins[i] as f64
            })
            .sum::<f64>()
            / total as f64;
        self.bin_to_native(var.sqrt())
    }

    /// Lowest occupied bin in native units, 0 if empty.
    pub fn min(&self, clip: bool) -> f64 {
        let (lo, hi) = self.range(clip);
        (lo..hi)
            .find(|&i| self.bins[i] > 0)
            .map_or(0.0, |i| self.bin_to_native(i as f64))
    }

    /// Highest occupied bin in native units, 0 if empty.
    pub fn max(&self, clip: bool) -> f64 {
        let (lo, hi) = self.range(clip);
        (lo..hi)
            .rev()
            .find(|&i| self.bins[i] > 0)
            .map_or(0.0, |i| self.bin_to_native(i as f64))
    }

    /// Most populated bin in native units (the lowest one on ties), 0 if empty.
    pub fn peak(&self, clip: bool) -> f64 {
        let (lo, hi) = self.range(clip);
        let mut best: Option<(usize, u64)> = None;
        for i in lo..hi {
            let c = self.bins[i];
            if c > 0 && best.is_none_or(|(_, b)| c > b) {
                best = Some((i, c));
            }
        }
        best.map_or(0.0, |(i, _)| self.bin_to_native(i as f64))
    }

    /// Redistributes counts to `resolution` bins by nearest-index mapping.
    ///
    /// Bin `i` moves to `round(i * (resolution - 1) / (old - 1))`. The total
    /// is preserved; the shape is not. Coarsening merges bins, and widening
    /// back only spreads the merged counts over the new grid, so a round trip
    /// does not reproduce the original.
    pub fn resample(&self, resolution: usize) -> Histogram {
        let mut out = Histogram::new(resolution, self.max_native);
        if resolution == 0 {
            return out;
        }
        let old = self.bins.len();
        if old <= 1 {
            if let Some(&c) = self.bins.first() {
                out.bins[0] = c;
            }
            return out;
        }
        let scale = (resolution - 1) as f64 / (old - 1) as f64;
        for (i, &c) in self.bins.iter().enumerate() {
            if c > 0 {
                let j = ((i as f64 * scale).round() as usize).min(resolution - 1);
                out.bins[j] += c;
            }
        }
        trace!(from = old, to = resolution, "histogram::resample");
        out
    }
}
