//! Planar multi-channel image buffer.
//!
//! [`Image<T>`] owns one contiguous allocation of `rows * cols * channels`
//! samples of a single [`Sample`] type.
//!
//! # Memory Layout
//!
//! Samples are stored **planar**: the full raster of channel 0, then
//! channel 1, then channel 2.
//!
//! ```text
//! Memory: [R R R R ... R]  <- channel 0, rows * cols samples
//!         [G G G G ... G]  <- channel 1
//!         [B B B B ... B]  <- channel 2
//!
//! index(x, y, ch) = ch * rows * cols + y * cols + x
//! ```
//!
//! A whole-channel transform therefore walks one contiguous slice
//! ([`Image::channel`], [`Image::channel_iter`]) with no coordinate math.
//!
//! # Usage
//!
//! ```rust
//! use astro_core::Image;
//!
//! let mut img: Image<u16> = Image::new(2, 3, 3).unwrap();
//! img.set(2, 1, 1, 4000);
//! assert_eq!(img.get(2, 1, 1), 4000);
//! assert_eq!(img.index_of(2, 1, 1), 1 * 2 * 3 + 1 * 3 + 2);
//!
//! // Out-of-bounds reads through `at` return the zero sentinel
//! assert_eq!(img.at(-1, 0, 0), 0);
//! ```
//!
//! # Ownership
//!
//! There is no shared ownership. `clone()` produces an independent
//! allocation; [`Image::take`] moves the pixels out and leaves an empty
//! image behind.

use crate::color::Color;
use crate::point::ImagePoint;
use crate::{Error, Result, Sample, SampleType};
use std::ops::{AddAssign, DivAssign, Index, IndexMut, MulAssign, SubAssign};

/// Elementwise arithmetic selector for [`Image::try_combine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    /// `self + other`
    Add,
    /// `self - other`
    Sub,
    /// `self * other`
    Mul,
    /// `self / other`; a zero divisor gives zero.
    Div,
}

impl ArithOp {
    /// Applies the operation to normalized samples.
    #[inline]
    pub fn apply(self, a: f32, b: f32) -> f32 {
        match self {
            ArithOp::Add => a + b,
            ArithOp::Sub => a - b,
            ArithOp::Mul => a * b,
            ArithOp::Div => {
                if b == 0.0 {
                    0.0
                } else {
                    a / b
                }
            }
        }
    }
}

/// Owned planar image buffer over one sample type.
///
/// # Invariants
///
/// - `channels` is 1 (grayscale / mask) or 3 (RGB)
/// - `data.len() == rows * cols * channels`, and that product fits in `u32`
///
/// # Example
///
/// ```rust
/// use astro_core::Image;
///
/// let img = Image::<u8>::filled(4, 4, 3, 10).unwrap();
/// assert_eq!(img.sample_count(), 48);
/// assert!(img.channel_iter(2).all(|v| v == 10));
/// ```
#[derive(Clone, PartialEq)]
pub struct Image<T: Sample> {
    data: Vec<T>,
    rows: u32,
    cols: u32,
    channels: u32,
}

impl<T: Sample> Default for Image<T> {
    /// An empty single-channel image.
    fn default() -> Self {
        Self {
            data: Vec::new(),
            rows: 0,
            cols: 0,
            channels: 1,
        }
    }
}

/// Validates a shape and returns its sample count.
fn checked_len(rows: u32, cols: u32, channels: u32) -> Result<usize> {
    if channels != 1 && channels != 3 {
        return Err(Error::InvalidChannels(channels));
    }
    rows.checked_mul(cols)
        .and_then(|v| v.checked_mul(channels))
        .map(|v| v as usize)
        .ok_or_else(|| Error::invalid_dimensions(rows, cols, "sample count overflows u32"))
}

impl<T: Sample> Image<T> {
    /// Creates a zero-filled image.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidChannels`] if `channels` is not 1 or 3
    /// - [`Error::InvalidDimensions`] if `rows * cols * channels` overflows `u32`
    pub fn new(rows: u32, cols: u32, channels: u32) -> Result<Self> {
        Self::filled(rows, cols, channels, T::zero())
    }

    /// Creates an image with every sample set to `value`.
    pub fn filled(rows: u32, cols: u32, channels: u32, value: T) -> Result<Self> {
        let len = checked_len(rows, cols, channels)?;
        Ok(Self {
            data: vec![value; len],
            rows,
            cols,
            channels,
        })
    }

    /// Wraps existing planar sample data.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidData`] if `data.len()` doesn't match the shape.
    pub fn from_data(rows: u32, cols: u32, channels: u32, data: Vec<T>) -> Result<Self> {
        let len = checked_len(rows, cols, channels)?;
        if data.len() != len {
            return Err(Error::InvalidData(format!(
                "expected {} samples, got {}",
                len,
                data.len()
            )));
        }
        Ok(Self {
            data,
            rows,
            cols,
            channels,
        })
    }

    /// Builds an image by evaluating `f(x, y, channel)` for every sample.
    pub fn from_fn<F>(rows: u32, cols: u32, channels: u32, mut f: F) -> Result<Self>
    where
        F: FnMut(u32, u32, u32) -> T,
    {
        let len = checked_len(rows, cols, channels)?;
        let mut data = Vec::with_capacity(len);
        for ch in 0..channels {
            for y in 0..rows {
                for x in 0..cols {
                    data.push(f(x, y, ch));
                }
            }
        }
        Ok(Self {
            data,
            rows,
            cols,
            channels,
        })
    }

    /// Creates a planar image from interleaved (`RGBRGB...`) samples, as
    /// produced by most file decoders.
    pub fn from_interleaved(rows: u32, cols: u32, channels: u32, samples: &[T]) -> Result<Self> {
        let len = checked_len(rows, cols, channels)?;
        if samples.len() != len {
            return Err(Error::InvalidData(format!(
                "expected {} interleaved samples, got {}",
                len,
                samples.len()
            )));
        }
        let n = channels as usize;
        let plane = rows as usize * cols as usize;
        let mut data = vec![T::zero(); len];
        for (i, px) in samples.chunks_exact(n).enumerate() {
            for (c, &v) in px.iter().enumerate() {
                data[c * plane + i] = v;
            }
        }
        Ok(Self {
            data,
            rows,
            cols,
            channels,
        })
    }

    /// Exports interleaved samples converted to `U`, e.g. a `u8` display
    /// bitmap.
    pub fn to_interleaved<U: Sample>(&self) -> Vec<U> {
        let n = self.channels as usize;
        let plane = self.plane_len();
        let mut out = vec![U::zero(); self.data.len()];
        for (c, src) in self.data.chunks_exact(plane.max(1)).enumerate().take(n) {
            for (i, &v) in src.iter().enumerate() {
                out[i * n + c] = v.convert();
            }
        }
        out
    }

    /// Number of rows (image height).
    #[inline]
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of columns (image width).
    #[inline]
    pub fn cols(&self) -> u32 {
        self.cols
    }

    /// Number of channel planes (1 or 3).
    #[inline]
    pub fn channels(&self) -> u32 {
        self.channels
    }

    /// `(rows, cols, channels)`.
    #[inline]
    pub fn shape(&self) -> (u32, u32, u32) {
        (self.rows, self.cols, self.channels)
    }

    /// Runtime tag of the element type.
    #[inline]
    pub fn sample_type(&self) -> SampleType {
        T::TYPE
    }

    /// Pixels per channel plane.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.plane_len()
    }

    /// Total samples across all planes.
    #[inline]
    pub fn sample_count(&self) -> usize {
        self.data.len()
    }

    #[inline]
    fn plane_len(&self) -> usize {
        self.rows as usize * self.cols as usize
    }

    /// Whether the image holds no samples.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Whether rows and cols match (channels ignored).
    #[inline]
    pub fn is_same_size<U: Sample>(&self, other: &Image<U>) -> bool {
        self.rows == other.rows && self.cols == other.cols
    }

    /// Whether rows, cols and channels all match.
    #[inline]
    pub fn is_same_shape<U: Sample>(&self, other: &Image<U>) -> bool {
        self.is_same_size(other) && self.channels == other.channels
    }

    /// Raw planar samples.
    #[inline]
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Mutable raw planar samples.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Consumes the image, returning its planar samples.
    #[inline]
    pub fn into_data(self) -> Vec<T> {
        self.data
    }

    /// Moves the pixels out, leaving an empty image in `self`.
    #[inline]
    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }

    /// Linear index of `(x, y, channel)`: `channel*rows*cols + y*cols + x`.
    #[inline]
    pub fn index_of(&self, x: u32, y: u32, channel: u32) -> usize {
        channel as usize * self.plane_len() + y as usize * self.cols as usize + x as usize
    }

    /// Returns the sample at `(x, y, channel)`.
    ///
    /// The caller guarantees `x < cols`, `y < rows`, `channel < channels`.
    /// Violations are caught by a debug assertion, or by slice indexing when
    /// the linear index leaves the buffer.
    #[inline]
    pub fn get(&self, x: u32, y: u32, channel: u32) -> T {
        debug_assert!(
            x < self.cols && y < self.rows && channel < self.channels,
            "sample ({x}, {y}, {channel}) out of bounds"
        );
        self.data[self.index_of(x, y, channel)]
    }

    /// Mutable reference to the sample at `(x, y, channel)`.
    #[inline]
    pub fn get_mut(&mut self, x: u32, y: u32, channel: u32) -> &mut T {
        debug_assert!(
            x < self.cols && y < self.rows && channel < self.channels,
            "sample ({x}, {y}, {channel}) out of bounds"
        );
        let i = self.index_of(x, y, channel);
        &mut self.data[i]
    }

    /// Writes the sample at `(x, y, channel)`.
    #[inline]
    pub fn set(&mut self, x: u32, y: u32, channel: u32, value: T) {
        *self.get_mut(x, y, channel) = value;
    }

    /// Whether `(x, y)` lies inside the raster.
    #[inline]
    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < self.cols as i64 && y < self.rows as i64
    }

    /// Bounds-checked read: the zero sentinel outside the raster or for a
    /// missing channel.
    #[inline]
    pub fn at(&self, x: i64, y: i64, channel: u32) -> T {
        if self.contains(x, y) && channel < self.channels {
            self.data[self.index_of(x as u32, y as u32, channel)]
        } else {
            T::zero()
        }
    }

    /// Read with coordinates reflected back into range.
    ///
    /// `x < 0` maps to `-x` and `x >= cols` maps to `2*cols - (x + 1)`, the
    /// same for `y`. The reflection is applied once; coordinates still
    /// outside after that read as zero.
    #[inline]
    pub fn at_mirrored(&self, x: i64, y: i64, channel: u32) -> T {
        let x = mirror(x, self.cols as i64);
        let y = mirror(y, self.rows as i64);
        self.at(x, y, channel)
    }

    /// One channel plane as a contiguous slice.
    ///
    /// # Panics
    ///
    /// Panics if `channel >= channels`.
    #[inline]
    pub fn channel(&self, channel: u32) -> &[T] {
        assert!(channel < self.channels, "channel {channel} out of range");
        let plane = self.plane_len();
        let start = channel as usize * plane;
        &self.data[start..start + plane]
    }

    /// One channel plane as a mutable slice.
    ///
    /// # Panics
    ///
    /// Panics if `channel >= channels`.
    #[inline]
    pub fn channel_mut(&mut self, channel: u32) -> &mut [T] {
        assert!(channel < self.channels, "channel {channel} out of range");
        let plane = self.plane_len();
        let start = channel as usize * plane;
        &mut self.data[start..start + plane]
    }

    /// Lazy, restartable (`Clone`) sequence over one channel plane.
    #[inline]
    pub fn channel_iter(&self, channel: u32) -> impl Iterator<Item = T> + Clone + '_ {
        self.channel(channel).iter().copied()
    }

    /// Iterates over the channel planes in order.
    pub fn planes(&self) -> impl Iterator<Item = &[T]> + '_ {
        let plane = self.plane_len().max(1);
        self.data.chunks_exact(plane)
    }

    /// Iterates mutably over the channel planes in order.
    pub fn planes_mut(&mut self) -> impl Iterator<Item = &mut [T]> + '_ {
        let plane = self.plane_len().max(1);
        self.data.chunks_exact_mut(plane)
    }

    /// One row of one channel plane.
    #[inline]
    pub fn row(&self, y: u32, channel: u32) -> &[T] {
        let start = self.index_of(0, y, channel);
        &self.data[start..start + self.cols as usize]
    }

    /// Checks that `channel` exists.
    pub fn check_channel(&self, channel: u32) -> Result<()> {
        if channel < self.channels {
            Ok(())
        } else {
            Err(Error::ChannelOutOfRange {
                channel,
                channels: self.channels,
            })
        }
    }

    /// Color of pixel `(x, y)`; a single-channel image yields a gray color.
    #[inline]
    pub fn color_at(&self, x: u32, y: u32) -> Color<T> {
        if self.channels == 3 {
            Color::new(self.get(x, y, 0), self.get(x, y, 1), self.get(x, y, 2))
        } else {
            Color::gray(self.get(x, y, 0))
        }
    }

    /// Writes pixel `(x, y)`; a single-channel image stores the luminance.
    #[inline]
    pub fn set_color(&mut self, x: u32, y: u32, color: Color<T>) {
        if self.channels == 3 {
            self.set(x, y, 0, color.red);
            self.set(x, y, 1, color.green);
            self.set(x, y, 2, color.blue);
        } else {
            self.set(x, y, 0, T::from_f32(color.luminance()));
        }
    }

    /// Sets every sample to `value`.
    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    /// Sets every sample of one channel to `value`.
    pub fn fill_channel(&mut self, channel: u32, value: T) {
        self.channel_mut(channel).fill(value);
    }

    /// Applies `f` to every sample in place.
    pub fn map_samples<F>(&mut self, f: F)
    where
        F: Fn(T) -> T,
    {
        for v in &mut self.data {
            *v = f(*v);
        }
    }

    /// Converts to another sample type through the normalized float law.
    pub fn convert<U: Sample>(&self) -> Image<U> {
        Image {
            data: self.data.iter().map(|&v| v.convert()).collect(),
            rows: self.rows,
            cols: self.cols,
            channels: self.channels,
        }
    }

    /// Elementwise arithmetic against `other` after validating shapes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ShapeMismatch`] when the images differ in rows,
    /// cols or channels.
    pub fn try_combine(&mut self, other: &Image<T>, op: ArithOp) -> Result<()> {
        if !self.is_same_shape(other) {
            return Err(Error::shape_mismatch(self.shape(), other.shape()));
        }
        self.combine(other, op);
        Ok(())
    }

    /// Elementwise arithmetic; the caller guarantees identical shapes.
    pub fn combine(&mut self, other: &Image<T>, op: ArithOp) {
        debug_assert!(self.is_same_shape(other), "combine on differently shaped images");
        for (a, &b) in self.data.iter_mut().zip(other.data.iter()) {
            *a = T::from_f32(op.apply(a.to_f32(), b.to_f32()));
        }
    }

    /// Replaces the buffer with a new shape. Used by reshaping conversions.
    pub(crate) fn replace_data(&mut self, channels: u32, data: Vec<T>) {
        debug_assert_eq!(data.len(), self.plane_len() * channels as usize);
        self.channels = channels;
        self.data = data;
    }
}

/// Reflects a coordinate about the first/last sample.
#[inline]
fn mirror(v: i64, len: i64) -> i64 {
    if v < 0 {
        -v
    } else if v >= len {
        2 * len - (v + 1)
    } else {
        v
    }
}

impl<T: Sample> std::fmt::Debug for Image<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Image")
            .field("rows", &self.rows)
            .field("cols", &self.cols)
            .field("channels", &self.channels)
            .field("sample_type", &T::TYPE)
            .finish()
    }
}

impl<T: Sample> Index<(u32, u32)> for Image<T> {
    type Output = T;

    /// Channel 0 sample at `(x, y)`.
    #[inline]
    fn index(&self, (x, y): (u32, u32)) -> &T {
        &self.data[self.index_of(x, y, 0)]
    }
}

impl<T: Sample> IndexMut<(u32, u32)> for Image<T> {
    #[inline]
    fn index_mut(&mut self, (x, y): (u32, u32)) -> &mut T {
        let i = self.index_of(x, y, 0);
        &mut self.data[i]
    }
}

impl<T: Sample> Index<(u32, u32, u32)> for Image<T> {
    type Output = T;

    #[inline]
    fn index(&self, (x, y, ch): (u32, u32, u32)) -> &T {
        &self.data[self.index_of(x, y, ch)]
    }
}

impl<T: Sample> IndexMut<(u32, u32, u32)> for Image<T> {
    #[inline]
    fn index_mut(&mut self, (x, y, ch): (u32, u32, u32)) -> &mut T {
        let i = self.index_of(x, y, ch);
        &mut self.data[i]
    }
}

impl<T: Sample> Index<ImagePoint> for Image<T> {
    type Output = T;

    #[inline]
    fn index(&self, p: ImagePoint) -> &T {
        &self.data[self.index_of(p.x, p.y, p.channel)]
    }
}

impl<T: Sample> IndexMut<ImagePoint> for Image<T> {
    #[inline]
    fn index_mut(&mut self, p: ImagePoint) -> &mut T {
        let i = self.index_of(p.x, p.y, p.channel);
        &mut self.data[i]
    }
}

impl<T: Sample> AddAssign<&Image<T>> for Image<T> {
    fn add_assign(&mut self, rhs: &Image<T>) {
        self.combine(rhs, ArithOp::Add);
    }
}

impl<T: Sample> SubAssign<&Image<T>> for Image<T> {
    fn sub_assign(&mut self, rhs: &Image<T>) {
        self.combine(rhs, ArithOp::Sub);
    }
}

impl<T: Sample> MulAssign<&Image<T>> for Image<T> {
    fn mul_assign(&mut self, rhs: &Image<T>) {
        self.combine(rhs, ArithOp::Mul);
    }
}

impl<T: Sample> DivAssign<&Image<T>> for Image<T> {
    fn div_assign(&mut self, rhs: &Image<T>) {
        self.combine(rhs, ArithOp::Div);
    }
}
