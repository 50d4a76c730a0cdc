//! Mask-weighted blending of an original and a processed image.
//!
//! ```text
//! m      = invert ? 1 - mask : mask
//! result = original * (1 - m) + modified * m
//! ```
//!
//! The mask may have any sample type. A 1-channel mask applies to every
//! channel of the image; a mask with the image's channel count applies
//! channel by channel.
//!
//! [`apply_masked`] wraps the usual flow: run a [`Process`] on a copy, then
//! blend the copy back through the mask.

use astro_core::{DynImage, Image, ImageVisitorMut, ParallelConfig, Sample};
use tracing::debug;

use crate::process::Process;
use crate::{OpsError, OpsResult};

/// Blends one normalized sample.
#[inline]
pub fn blend_sample(original: f32, modified: f32, mask: f32, invert: bool) -> f32 {
    let m = if invert { 1.0 - mask } else { mask };
    original * (1.0 - m) + modified * m
}

fn check_mask<T: Sample, M: Sample>(image: &Image<T>, mask: &Image<M>) -> OpsResult<()> {
    if !mask.is_same_size(image) {
        return Err(OpsError::SizeMismatch(format!(
            "mask {}x{} vs image {}x{}",
            mask.rows(),
            mask.cols(),
            image.rows(),
            image.cols()
        )));
    }
    if mask.channels() != 1 && mask.channels() != image.channels() {
        return Err(OpsError::SizeMismatch(format!(
            "{}-channel mask for {}-channel image",
            mask.channels(),
            image.channels()
        )));
    }
    Ok(())
}

/// Blends `modified` into `target` through `mask`, in place.
///
/// # Errors
///
/// Returns [`OpsError::SizeMismatch`] if `target` and `modified` differ in
/// shape, or the mask has a different size or an incompatible channel count.
pub fn blend_into<T: Sample, M: Sample>(
    target: &mut Image<T>,
    modified: &Image<T>,
    mask: &Image<M>,
    invert: bool,
) -> OpsResult<()> {
    if !target.is_same_shape(modified) {
        return Err(OpsError::SizeMismatch(format!(
            "{:?} vs {:?}",
            target.shape(),
            modified.shape()
        )));
    }
    check_mask(target, mask)?;
    for ch in 0..target.channels() {
        let mask_ch = if mask.channels() == 1 { 0 } else { ch };
        let weights = mask.channel(mask_ch);
        let changed = modified.channel(ch);
        for ((o, &m), &w) in target.channel_mut(ch).iter_mut().zip(changed).zip(weights) {
            *o = T::from_f32(blend_sample(o.to_f32(), m.to_f32(), w.to_f32(), invert));
        }
    }
    Ok(())
}

/// Returns the blend of `original` and `modified` through `mask`.
pub fn blend<T: Sample, M: Sample>(
    original: &Image<T>,
    modified: &Image<T>,
    mask: &Image<M>,
    invert: bool,
) -> OpsResult<Image<T>> {
    let mut out = original.clone();
    blend_into(&mut out, modified, mask, invert)?;
    Ok(out)
}

/// Runs `process` on a copy of `image` and blends the result back through
/// `mask`.
pub fn apply_masked<T, M, P>(
    image: &mut Image<T>,
    process: &mut P,
    mask: &Image<M>,
    invert: bool,
    parallel: &ParallelConfig,
) -> OpsResult<()>
where
    T: Sample,
    M: Sample,
    P: Process,
{
    check_mask(image, mask)?;
    debug!(process = process.name(), invert, "apply_masked");
    let mut modified = image.clone();
    process.apply(&mut modified, parallel)?;
    blend_into(image, &modified, mask, invert)
}

/// [`apply_masked`] for an image and a mask whose sample types are chosen
/// at runtime.
pub fn apply_masked_dyn<P: Process>(
    image: &mut DynImage,
    process: &mut P,
    mask: &DynImage,
    invert: bool,
    parallel: &ParallelConfig,
) -> OpsResult<()> {
    struct Masked<'a, P> {
        process: &'a mut P,
        mask: &'a DynImage,
        invert: bool,
        parallel: &'a ParallelConfig,
    }

    impl<P: Process> ImageVisitorMut for Masked<'_, P> {
        type Output = OpsResult<()>;
        fn visit_mut<T: Sample>(self, image: &mut Image<T>) -> Self::Output {
            let Masked { process, mask, invert, parallel } = self;
            match mask {
                DynImage::U8(m) => apply_masked(image, process, m, invert, parallel),
                DynImage::U16(m) => apply_masked(image, process, m, invert, parallel),
                DynImage::F32(m) => apply_masked(image, process, m, invert, parallel),
            }
        }
    }

    image.visit_mut(Masked {
        process,
        mask,
        invert,
        parallel,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{Invert, MapProcess};
    use approx::assert_abs_diff_eq;

    fn half_mask(rows: u32, cols: u32) -> Image<u16> {
        Image::from_fn(rows, cols, 1, |x, _, _| if x < cols / 2 { 0 } else { u16::MAX }).unwrap()
    }

    #[test]
    fn test_blend_sample() {
        assert_abs_diff_eq!(blend_sample(0.2, 0.8, 0.25, false), 0.35, epsilon = 1e-6);
        assert_abs_diff_eq!(blend_sample(0.2, 0.8, 0.25, true), 0.65, epsilon = 1e-6);
        assert_eq!(blend_sample(0.2, 0.8, 0.0, false), 0.2);
        assert_eq!(blend_sample(0.2, 0.8, 1.0, false), 0.8);
    }

    #[test]
    fn test_blend_broadcasts_mono_mask() {
        let original = Image::<u8>::filled(2, 4, 3, 10).unwrap();
        let modified = Image::<u8>::filled(2, 4, 3, 200).unwrap();
        let mask = half_mask(2, 4);

        let out = blend(&original, &modified, &mask, false).unwrap();
        for ch in 0..3 {
            assert_eq!(out.row(1, ch), &[10, 10, 200, 200]);
        }
        let inverted = blend(&original, &modified, &mask, true).unwrap();
        assert_eq!(inverted.row(0, 2), &[200, 200, 10, 10]);
    }

    #[test]
    fn test_blend_rejects_mismatch() {
        let a = Image::<u8>::new(2, 4, 3).unwrap();
        let b = Image::<u8>::new(2, 4, 1).unwrap();
        assert!(matches!(blend(&a, &b, &half_mask(2, 4), false), Err(OpsError::SizeMismatch(_))));
        assert!(matches!(blend(&a, &a, &half_mask(3, 4), false), Err(OpsError::SizeMismatch(_))));
        let rg = Image::<f32>::new(2, 4, 3).unwrap();
        assert!(blend(&b, &b, &rg, false).is_err());
    }

    #[test]
    fn test_apply_masked() {
        let mut img = Image::<u8>::filled(2, 4, 1, 100).unwrap();
        apply_masked(&mut img, &mut MapProcess(Invert), &half_mask(2, 4), false, &ParallelConfig::default()).unwrap();
        assert_eq!(img.row(0, 0), &[100, 100, 155, 155]);
    }

    #[test]
    fn test_apply_masked_dyn_mixed_depths() {
        let mut img = DynImage::from(Image::<f32>::filled(2, 4, 3, 0.25).unwrap());
        let mask = DynImage::from(half_mask(2, 4).convert::<u8>());
        apply_masked_dyn(&mut img, &mut MapProcess(Invert), &mask, true, &ParallelConfig::default()).unwrap();
        assert_eq!(img.at(0, 0, 1).to_f32(), 0.75);
        assert_eq!(img.at(3, 1, 1).to_f32(), 0.25);
    }
}
