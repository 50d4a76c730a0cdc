//! Per-pixel processes and their dispatch over runtime sample types.
//!
//! Two levels of abstraction:
//!
//! - [`SampleMap`] - a stateless per-sample function in normalized float,
//!   applied by [`apply_map`] across every plane, rows in parallel
//! - [`Process`] - a (possibly stateful) operation written once over
//!   `Image<T>` for any sample type
//!
//! [`apply_process`] runs a [`Process`] on a [`DynImage`]. The match over
//! the three variants is exhaustive, and `Process::apply` is instantiated
//! for `u8`, `u16` and `f32` by the compiler.
//!
//! ```rust
//! use astro_core::{DynImage, Image, ParallelConfig};
//! use astro_ops::process::{apply_process, Binarize, MapProcess};
//!
//! let mut img = DynImage::from(Image::<u16>::filled(4, 4, 1, 40000).unwrap());
//! let mut threshold = MapProcess(Binarize::new(0.5));
//! apply_process(&mut img, &mut threshold, &ParallelConfig::default()).unwrap();
//! assert_eq!(img.at(0, 0, 0).to_f32(), 1.0);
//! ```

use astro_core::{DynImage, Image, ImageVisitorMut, ParallelConfig, Sample};
use tracing::{debug, trace};

use crate::OpsResult;

/// Stateless per-sample transform on normalized values.
pub trait SampleMap: Sync + Send {
    /// Maps one normalized sample of `channel`.
    fn map(&self, value: f32, channel: u32) -> f32;
}

/// `1.0` at or above the threshold, `0.0` below.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Binarize {
    /// Normalized threshold.
    pub threshold: f32,
}

impl Binarize {
    /// Creates a binarize map.
    pub const fn new(threshold: f32) -> Self {
        Self { threshold }
    }
}

impl SampleMap for Binarize {
    #[inline]
    fn map(&self, value: f32, _channel: u32) -> f32 {
        if value >= self.threshold { 1.0 } else { 0.0 }
    }
}

/// `1 - v`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Invert;

impl SampleMap for Invert {
    #[inline]
    fn map(&self, value: f32, _channel: u32) -> f32 {
        1.0 - value
    }
}

/// `v * scale + offset`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Linear {
    /// Multiplier.
    pub scale: f32,
    /// Added after scaling.
    pub offset: f32,
}

impl SampleMap for Linear {
    #[inline]
    fn map(&self, value: f32, _channel: u32) -> f32 {
        value.mul_add(self.scale, self.offset)
    }
}

/// Per-channel linear coefficients.
struct ChannelLinear(Vec<Linear>);

impl SampleMap for ChannelLinear {
    #[inline]
    fn map(&self, value: f32, channel: u32) -> f32 {
        self.0.get(channel as usize).map_or(value, |l| l.map(value, channel))
    }
}

/// Applies `map` to every sample of `image` in place.
///
/// Rows are independent, so the output is identical for any thread count.
pub fn apply_map<T, M>(image: &mut Image<T>, map: &M, parallel: &ParallelConfig)
where
    T: Sample,
    M: SampleMap + ?Sized,
{
    let rows = image.rows() as usize;
    let cols = image.cols() as usize;
    if rows == 0 || cols == 0 {
        return;
    }
    trace!(rows, cols, channels = image.channels(), threads = parallel.threads(), "apply_map");
    parallel.for_each_row_mut(image.data_mut(), cols, |idx, row| {
        let channel = (idx / rows) as u32;
        for v in row.iter_mut() {
            *v = T::from_f32(map.map(v.to_f32(), channel));
        }
    });
}

/// An operation written once for every sample type.
pub trait Process {
    /// Short name for logging.
    fn name(&self) -> &'static str;

    /// Runs the process on `image` in place.
    fn apply<T: Sample>(&mut self, image: &mut Image<T>, parallel: &ParallelConfig) -> OpsResult<()>;
}

/// Lifts a [`SampleMap`] into a [`Process`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapProcess<M>(pub M);

impl<M: SampleMap> Process for MapProcess<M> {
    fn name(&self) -> &'static str {
        "map"
    }

    fn apply<T: Sample>(&mut self, image: &mut Image<T>, parallel: &ParallelConfig) -> OpsResult<()> {
        apply_map(image, &self.0, parallel);
        Ok(())
    }
}

/// Stretches each channel so its darkest sample becomes 0 and its
/// brightest 1, remembering the ranges it found.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rescale {
    ranges: Vec<(f32, f32)>,
}

impl Rescale {
    /// Creates a rescale process.
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalized `(min, max)` of each channel seen by the last run.
    pub fn ranges(&self) -> &[(f32, f32)] {
        &self.ranges
    }
}

impl Process for Rescale {
    fn name(&self) -> &'static str {
        "rescale"
    }

    fn apply<T: Sample>(&mut self, image: &mut Image<T>, parallel: &ParallelConfig) -> OpsResult<()> {
        self.ranges = image
            .planes()
            .map(|plane| {
                plane.iter().fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| {
                    let f = v.to_f32();
                    (lo.min(f), hi.max(f))
                })
            })
            .collect();
        let coeffs = self
            .ranges
            .iter()
            .map(|&(lo, hi)| {
                if hi > lo {
                    let scale = 1.0 / (hi - lo);
                    Linear { scale, offset: -lo * scale }
                } else {
                    Linear { scale: 1.0, offset: 0.0 }
                }
            })
            .collect();
        apply_map(image, &ChannelLinear(coeffs), parallel);
        Ok(())
    }
}

/// Runs `process` on whichever concrete image `image` holds.
pub fn apply_process<P: Process>(
    image: &mut DynImage,
    process: &mut P,
    parallel: &ParallelConfig,
) -> OpsResult<()> {
    struct Apply<'a, P>(&'a mut P, &'a ParallelConfig);

    impl<P: Process> ImageVisitorMut for Apply<'_, P> {
        type Output = OpsResult<()>;
        fn visit_mut<T: Sample>(self, image: &mut Image<T>) -> Self::Output {
            self.0.apply(image, self.1)
        }
    }

    debug!(process = process.name(), sample_type = %image.sample_type(), "apply_process");
    image.visit_mut(Apply(process, parallel))
}
