//! Geometric resampling built on the [`Interpolator`].
//!
//! Every transform here produces a new buffer of the same sample type and
//! channel count. Each destination pixel is mapped back into the source
//! through the inverse transform and sampled per channel, so the edge
//! behavior is the interpolator's: nearest-neighbor fallback near the
//! border, zero outside.
//!
//! - [`resize`] - scale to a new size, pixel centers aligned
//! - [`rotate`] - rotation about an arbitrary center
//! - [`warp_affine`] - any invertible affine map (registration shift,
//!   rotation, scale)
//!
//! Destination rows are computed in parallel according to the
//! [`ParallelConfig`]; the result does not depend on the thread count.
//!
//! ```rust
//! use astro_core::{Image, ParallelConfig};
//! use astro_ops::{transform::resize, InterpolationKind, Interpolator};
//!
//! let img = Image::<u8>::filled(16, 16, 3, 90).unwrap();
//! let interp = Interpolator::new(InterpolationKind::Lanczos3);
//! let half = resize(&img, 8, 8, &interp, &ParallelConfig::default()).unwrap();
//! assert_eq!(half.shape(), (8, 8, 3));
//! ```

use astro_core::{Image, ImagePointF, ParallelConfig, Point, Sample};
use glam::{DAffine2, DVec2};
use tracing::debug;

use crate::{Interpolator, OpsError, OpsResult};

/// Fills a `rows x cols` destination by sampling `image` at `map(x, y)`.
fn remap<T, F>(
    image: &Image<T>,
    rows: u32,
    cols: u32,
    interp: &Interpolator,
    parallel: &ParallelConfig,
    map: F,
) -> OpsResult<Image<T>>
where
    T: Sample,
    F: Fn(f64, f64) -> (f64, f64) + Sync + Send,
{
    let mut out = Image::<T>::new(rows, cols, image.channels())?;
    let rows = rows as usize;
    parallel.for_each_row_mut(out.data_mut(), cols as usize, |idx, row| {
        let channel = (idx / rows) as u32;
        let y = (idx % rows) as f64;
        for (x, v) in row.iter_mut().enumerate() {
            let (sx, sy) = map(x as f64, y);
            *v = interp.interpolate_pixel(image, ImagePointF::new(sx, sy, channel));
        }
    });
    Ok(out)
}

/// Resamples `image` to `rows x cols`.
///
/// Pixel centers are aligned: destination `d` reads source
/// `(d + 0.5) * src / dst - 0.5` on each axis.
///
/// # Errors
///
/// Returns [`OpsError::InvalidDimensions`] for a zero target size or an
/// empty source.
pub fn resize<T: Sample>(
    image: &Image<T>,
    rows: u32,
    cols: u32,
    interp: &Interpolator,
    parallel: &ParallelConfig,
) -> OpsResult<Image<T>> {
    if rows == 0 || cols == 0 {
        return Err(OpsError::InvalidDimensions(format!("target size {rows}x{cols}")));
    }
    if image.is_empty() {
        return Err(OpsError::InvalidDimensions("empty source image".into()));
    }
    debug!(
        from_rows = image.rows(),
        from_cols = image.cols(),
        rows,
        cols,
        kind = %interp.kind,
        "resize"
    );
    let sx = image.cols() as f64 / cols as f64;
    let sy = image.rows() as f64 / rows as f64;
    remap(image, rows, cols, interp, parallel, |x, y| {
        ((x + 0.5) * sx - 0.5, (y + 0.5) * sy - 0.5)
    })
}

/// Resamples `image` through `transform`, which maps source coordinates to
/// destination coordinates, into a `rows x cols` destination.
///
/// # Errors
///
/// - [`OpsError::InvalidParameter`] if `transform` is not invertible
/// - [`OpsError::InvalidDimensions`] for a zero target size
pub fn warp_affine<T: Sample>(
    image: &Image<T>,
    transform: &DAffine2,
    rows: u32,
    cols: u32,
    interp: &Interpolator,
    parallel: &ParallelConfig,
) -> OpsResult<Image<T>> {
    if rows == 0 || cols == 0 {
        return Err(OpsError::InvalidDimensions(format!("target size {rows}x{cols}")));
    }
    let det = transform.matrix2.determinant();
    if !det.is_finite() || det.abs() < 1e-12 {
        return Err(OpsError::InvalidParameter(format!(
            "affine transform is not invertible (determinant {det})"
        )));
    }
    debug!(rows, cols, kind = %interp.kind, "warp_affine");
    let inverse = transform.inverse();
    remap(image, rows, cols, interp, parallel, |x, y| {
        let p = inverse.transform_point2(DVec2::new(x, y));
        (p.x, p.y)
    })
}

/// Rotates `image` by `angle` radians about `center`, keeping its size.
///
/// Positive angles turn from +x toward +y.
pub fn rotate<T: Sample>(
    image: &Image<T>,
    angle: f64,
    center: Point<f64>,
    interp: &Interpolator,
    parallel: &ParallelConfig,
) -> OpsResult<Image<T>> {
    let c = DVec2::new(center.x, center.y);
    let transform =
        DAffine2::from_translation(c) * DAffine2::from_angle(angle) * DAffine2::from_translation(-c);
    warp_affine(image, &transform, image.rows(), image.cols(), interp, parallel)
}

/// Rotation about the geometric center of the image.
pub fn rotate_centered<T: Sample>(
    image: &Image<T>,
    angle: f64,
    interp: &Interpolator,
    parallel: &ParallelConfig,
) -> OpsResult<Image<T>> {
    let center = Point::new(
        (image.cols() as f64 - 1.0) / 2.0,
        (image.rows() as f64 - 1.0) / 2.0,
    );
    rotate(image, angle, center, interp, parallel)
}
