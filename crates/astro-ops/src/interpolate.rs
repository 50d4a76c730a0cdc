//! Fractional-coordinate sample interpolation.
//!
//! An [`Interpolator`] reads one sample of an [`Image`] at a real-valued
//! `(x, y, channel)` position using one of seven kernels:
//!
//! | kind | taps per axis | output clipped |
//! |------|---------------|----------------|
//! | [`Nearest`](InterpolationKind::Nearest) | 1 | no |
//! | [`Bilinear`](InterpolationKind::Bilinear) | 2 | only with `clip_bilinear` |
//! | [`BicubicSpline`](InterpolationKind::BicubicSpline) | 4 | yes |
//! | [`BicubicBSpline`](InterpolationKind::BicubicBSpline) | 4 | yes |
//! | [`CubicBSpline`](InterpolationKind::CubicBSpline) | 4 | yes |
//! | [`CatmullRom`](InterpolationKind::CatmullRom) | 4 | yes |
//! | [`Lanczos3`](InterpolationKind::Lanczos3) | 6 | yes |
//!
//! # Boundary policy
//!
//! When the tap neighborhood would leave the raster, every kernel falls back
//! to nearest neighbor: the coordinate is rounded and the sample at that
//! position is returned, or zero if it is outside as well.
//!
//! # Ringing suppression
//!
//! The 4- and 6-tap kernels are applied as two 1-D passes. In each pass the
//! contribution of the two taps straddling the position (`f12`) is compared
//! with that of the outer taps (`f03`). If `|f03| > 0.3 * |f12|` the outer
//! taps are dropped and the pass returns `f12 / (w1 + w2)`.
//!
//! All arithmetic runs in normalized `f32`; the result is converted back to
//! the image's sample type only at the end.
//!
//! ```rust
//! use astro_core::{Image, ImagePointF};
//! use astro_ops::{InterpolationKind, Interpolator};
//!
//! let img = Image::<u16>::filled(8, 8, 1, 1000).unwrap();
//! let interp = Interpolator::new(InterpolationKind::Lanczos3);
//! assert_eq!(interp.interpolate_pixel(&img, ImagePointF::new(3.3, 4.7, 0)), 1000);
//! ```

use astro_core::{DynImage, DynSample, Image, ImagePointF, ImageVisitor, Sample};
use std::f32::consts::PI;
use std::str::FromStr;

use crate::{OpsError, OpsResult};

/// Widest tap count of any kernel.
const MAX_TAPS: usize = 6;

/// Outer-tap share above which a pass falls back to the inner pair.
pub const RINGING_THRESHOLD: f32 = 0.3;

/// Interpolation kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InterpolationKind {
    /// Nearest sample, no blending.
    Nearest,
    /// Linear blend of the 2x2 neighborhood.
    #[default]
    Bilinear,
    /// Keys cubic convolution, `a = -0.75`.
    BicubicSpline,
    /// Mitchell-Netravali cubic, `B = C = 1/3`.
    BicubicBSpline,
    /// Uniform cubic B-spline (`B = 1, C = 0`); smoothest, not interpolating.
    CubicBSpline,
    /// Catmull-Rom spline (`B = 0, C = 1/2`).
    CatmullRom,
    /// Windowed sinc with a 3-lobe window, 6x6 neighborhood.
    Lanczos3,
}

impl InterpolationKind {
    /// All kernels.
    pub const ALL: [InterpolationKind; 7] = [
        InterpolationKind::Nearest,
        InterpolationKind::Bilinear,
        InterpolationKind::BicubicSpline,
        InterpolationKind::BicubicBSpline,
        InterpolationKind::CubicBSpline,
        InterpolationKind::CatmullRom,
        InterpolationKind::Lanczos3,
    ];

    /// Samples used per axis.
    #[inline]
    pub const fn taps(&self) -> usize {
        match self {
            InterpolationKind::Nearest => 1,
            InterpolationKind::Bilinear => 2,
            InterpolationKind::Lanczos3 => 6,
            _ => 4,
        }
    }

    /// Short lowercase name.
    pub const fn name(&self) -> &'static str {
        match self {
            InterpolationKind::Nearest => "nearest",
            InterpolationKind::Bilinear => "bilinear",
            InterpolationKind::BicubicSpline => "bicubic-spline",
            InterpolationKind::BicubicBSpline => "bicubic-b-spline",
            InterpolationKind::CubicBSpline => "cubic-b-spline",
            InterpolationKind::CatmullRom => "catmull-rom",
            InterpolationKind::Lanczos3 => "lanczos3",
        }
    }

    /// Evaluates the kernel at signed distance `d` from the sample position.
    #[inline]
    pub fn weight(&self, d: f32) -> f32 {
        match self {
            InterpolationKind::Nearest => {
                if d.abs() < 0.5 {
                    1.0
                } else {
                    0.0
                }
            }
            InterpolationKind::Bilinear => (1.0 - d.abs()).max(0.0),
            InterpolationKind::BicubicSpline => keys_weight(d, -0.75),
            InterpolationKind::BicubicBSpline => mitchell_weight(d, 1.0 / 3.0, 1.0 / 3.0),
            InterpolationKind::CubicBSpline => mitchell_weight(d, 1.0, 0.0),
            InterpolationKind::CatmullRom => mitchell_weight(d, 0.0, 0.5),
            InterpolationKind::Lanczos3 => lanczos_weight(d, 3.0),
        }
    }
}

impl std::fmt::Display for InterpolationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for InterpolationKind {
    type Err = OpsError;

    fn from_str(s: &str) -> OpsResult<Self> {
        let lower = s.to_ascii_lowercase();
        InterpolationKind::ALL
            .into_iter()
            .find(|k| k.name() == lower)
            .ok_or_else(|| OpsError::InvalidParameter(format!("unknown interpolation kind: {s}")))
    }
}

/// Keys cubic convolution kernel.
#[inline]
fn keys_weight(d: f32, a: f32) -> f32 {
    let x = d.abs();
    if x < 1.0 {
        ((a + 2.0) * x - (a + 3.0)) * x * x + 1.0
    } else if x < 2.0 {
        ((a * x - 5.0 * a) * x + 8.0 * a) * x - 4.0 * a
    } else {
        0.0
    }
}

/// Mitchell-Netravali family kernel.
#[inline]
fn mitchell_weight(d: f32, b: f32, c: f32) -> f32 {
    let x = d.abs();
    if x < 1.0 {
        ((12.0 - 9.0 * b - 6.0 * c) * x * x * x + (-18.0 + 12.0 * b + 6.0 * c) * x * x + (6.0 - 2.0 * b))
            / 6.0
    } else if x < 2.0 {
        ((-b - 6.0 * c) * x * x * x
            + (6.0 * b + 30.0 * c) * x * x
            + (-12.0 * b - 48.0 * c) * x
            + (8.0 * b + 24.0 * c))
            / 6.0
    } else {
        0.0
    }
}

/// Lanczos kernel.
#[inline]
fn lanczos_weight(d: f32, a: f32) -> f32 {
    let x = d.abs();
    if x < 1e-6 {
        1.0
    } else if x < a {
        let px = PI * x;
        a * px.sin() * (px / a).sin() / (px * px)
    } else {
        0.0
    }
}

/// Fills `out` with normalized weights for fractional offset `t`.
fn axis_weights(kind: InterpolationKind, t: f32, out: &mut [f32]) {
    let offset = (out.len() / 2) as f32 - 1.0;
    for (k, w) in out.iter_mut().enumerate() {
        *w = kind.weight(k as f32 - offset - t);
    }
    let sum: f32 = out.iter().sum();
    if sum != 0.0 {
        for w in out.iter_mut() {
            *w /= sum;
        }
    }
}

/// One separable pass with ringing suppression.
fn pass(values: &[f32], weights: &[f32]) -> f32 {
    let n = values.len();
    if n <= 2 {
        return values.iter().zip(weights).map(|(v, w)| v * w).sum();
    }
    let (i1, i2) = (n / 2 - 1, n / 2);
    let f12 = values[i1] * weights[i1] + values[i2] * weights[i2];
    let f03: f32 = (0..n)
        .filter(|&i| i != i1 && i != i2)
        .map(|i| values[i] * weights[i])
        .sum();
    let inner = weights[i1] + weights[i2];
    if f03.abs() > RINGING_THRESHOLD * f12.abs() && inner != 0.0 {
        f12 / inner
    } else {
        f12 + f03
    }
}

/// Sample at the rounded coordinate; zero outside the raster.
#[inline]
fn nearest<T: Sample>(image: &Image<T>, p: ImagePointF) -> T {
    if !p.x.is_finite() || !p.y.is_finite() {
        return T::zero();
    }
    let r = p.rounded();
    image.at(r.x, r.y, p.channel)
}

/// Kernel selection plus output policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Interpolator {
    /// Kernel used for every lookup.
    pub kind: InterpolationKind,
    /// Clip bilinear output to `[0, 1]` like the cubic kernels. Off by
    /// default.
    pub clip_bilinear: bool,
}

impl Interpolator {
    /// Interpolator for `kind` with the default output policy.
    pub const fn new(kind: InterpolationKind) -> Self {
        Self {
            kind,
            clip_bilinear: false,
        }
    }

    /// Sets whether bilinear output is clipped.
    pub const fn with_clip_bilinear(mut self, clip: bool) -> Self {
        self.clip_bilinear = clip;
        self
    }

    /// Whether results are clipped to the normalized sample range.
    #[inline]
    pub fn clips_output(&self) -> bool {
        match self.kind {
            InterpolationKind::Nearest => false,
            InterpolationKind::Bilinear => self.clip_bilinear,
            _ => true,
        }
    }

    /// Top-left tap of the neighborhood, or `None` when it leaves the raster.
    fn neighborhood<T: Sample>(&self, image: &Image<T>, p: ImagePointF) -> Option<(i64, i64)> {
        let n = self.kind.taps();
        if n <= 1 || !p.x.is_finite() || !p.y.is_finite() {
            return None;
        }
        let offset = (n / 2) as i64 - 1;
        let sx = p.x.floor() as i64 - offset;
        let sy = p.y.floor() as i64 - offset;
        let last = n as i64 - 1;
        (image.contains(sx, sy) && image.contains(sx + last, sy + last)).then_some((sx, sy))
    }

    fn convolve<T: Sample>(&self, image: &Image<T>, p: ImagePointF, (sx, sy): (i64, i64)) -> f32 {
        let n = self.kind.taps();
        let mut wx = [0.0f32; MAX_TAPS];
        let mut wy = [0.0f32; MAX_TAPS];
        axis_weights(self.kind, (p.x - p.x.floor()) as f32, &mut wx[..n]);
        axis_weights(self.kind, (p.y - p.y.floor()) as f32, &mut wy[..n]);

        let mut column = [0.0f32; MAX_TAPS];
        for (j, c) in column[..n].iter_mut().enumerate() {
            let mut row = [0.0f32; MAX_TAPS];
            for (i, v) in row[..n].iter_mut().enumerate() {
                *v = image.at(sx + i as i64, sy + j as i64, p.channel).to_f32();
            }
            *c = pass(&row[..n], &wx[..n]);
        }
        let v = pass(&column[..n], &wy[..n]);
        if self.clips_output() { v.clamp(0.0, 1.0) } else { v }
    }

    /// Interpolated sample in the image's own type.
    pub fn interpolate_pixel<T: Sample>(&self, image: &Image<T>, p: ImagePointF) -> T {
        match self.neighborhood(image, p) {
            Some(origin) => T::from_f32(self.convolve(image, p, origin)),
            None => nearest(image, p),
        }
    }

    /// Interpolated sample as a normalized float.
    pub fn interpolate_f32<T: Sample>(&self, image: &Image<T>, p: ImagePointF) -> f32 {
        match self.neighborhood(image, p) {
            Some(origin) => self.convolve(image, p, origin),
            None => nearest(image, p).to_f32(),
        }
    }

    /// Interpolated sample of an image whose sample type is chosen at runtime.
    pub fn interpolate_dyn(&self, image: &DynImage, p: ImagePointF) -> DynSample {
        struct Lookup<'a>(&'a Interpolator, ImagePointF);

        impl ImageVisitor for Lookup<'_> {
            type Output = DynSample;
            fn visit<T: Sample>(self, image: &Image<T>) -> DynSample {
                DynSample::from_sample(self.0.interpolate_pixel(image, self.1))
            }
        }

        image.visit(Lookup(self, p))
    }
}
