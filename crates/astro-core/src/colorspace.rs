//! Color-space conversions on planar RGB buffers.
//!
//! - [`Image::rgb_to_gray`] - CIE luminance, **reshapes** 3 channels to 1
//! - [`Image::rgb_to_cielab`] / [`Image::cielab_to_rgb`] - in place, 3 channels
//!
//! All three are no-ops on single-channel images. RGB is treated as linear
//! with sRGB primaries and a D65 white point.
//!
//! # Lab encoding
//!
//! Lab values are stored in the normalized sample range so any sample type
//! can hold them:
//!
//! ```text
//! ch0 = L* / 100
//! ch1 = a* / 255 + 0.5
//! ch2 = b* / 255 + 0.5
//! ```

use crate::color::luminance;
use crate::{Image, ParallelConfig, Sample};

const RGB_TO_XYZ: [[f32; 3]; 3] = [
    [0.4124564, 0.3575761, 0.1804375],
    [0.2126729, 0.7151522, 0.0721750],
    [0.0193339, 0.1191920, 0.9503041],
];

const XYZ_TO_RGB: [[f32; 3]; 3] = [
    [3.2404542, -1.5371385, -0.4985314],
    [-0.9692660, 1.8760108, 0.0415560],
    [0.0556434, -0.2040259, 1.0572252],
];

/// D65 reference white.
const WHITE: [f32; 3] = [0.95047, 1.0, 1.08883];

const LAB_EPSILON: f32 = 216.0 / 24389.0;
const LAB_KAPPA: f32 = 24389.0 / 27.0;

#[inline]
fn mat_mul(m: &[[f32; 3]; 3], v: [f32; 3]) -> [f32; 3] {
    [
        m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
        m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
        m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
    ]
}

#[inline]
fn lab_f(t: f32) -> f32 {
    if t > LAB_EPSILON {
        t.cbrt()
    } else {
        (LAB_KAPPA * t + 16.0) / 116.0
    }
}

#[inline]
fn lab_f_inv(ft: f32) -> f32 {
    let t3 = ft * ft * ft;
    if t3 > LAB_EPSILON {
        t3
    } else {
        (116.0 * ft - 16.0) / LAB_KAPPA
    }
}

/// Converts linear RGB to encoded Lab (see module docs).
#[inline]
pub fn rgb_to_lab(rgb: [f32; 3]) -> [f32; 3] {
    let xyz = mat_mul(&RGB_TO_XYZ, rgb);
    let fx = lab_f(xyz[0] / WHITE[0]);
    let fy = lab_f(xyz[1] / WHITE[1]);
    let fz = lab_f(xyz[2] / WHITE[2]);

    let l = 116.0 * fy - 16.0;
    let a = 500.0 * (fx - fy);
    let b = 200.0 * (fy - fz);
    [l / 100.0, a / 255.0 + 0.5, b / 255.0 + 0.5]
}

/// Converts encoded Lab back to linear RGB.
#[inline]
pub fn lab_to_rgb(lab: [f32; 3]) -> [f32; 3] {
    let l = lab[0] * 100.0;
    let a = (lab[1] - 0.5) * 255.0;
    let b = (lab[2] - 0.5) * 255.0;

    let fy = (l + 16.0) / 116.0;
    let fx = fy + a / 500.0;
    let fz = fy - b / 200.0;
    let xyz = [
        lab_f_inv(fx) * WHITE[0],
        lab_f_inv(fy) * WHITE[1],
        lab_f_inv(fz) * WHITE[2],
    ];
    mat_mul(&XYZ_TO_RGB, xyz)
}

impl<T: Sample> Image<T> {
    /// Converts RGB to CIE luminance and drops to a single channel.
    ///
    /// After the call `channels() == 1` and `sample_count() == rows * cols`.
    /// No-op unless the image has 3 channels. Runs on rayon's global pool.
    pub fn rgb_to_gray(&mut self) {
        self.rgb_to_gray_with(&ParallelConfig::global());
    }

    /// [`rgb_to_gray`](Self::rgb_to_gray) with explicit threading.
    pub fn rgb_to_gray_with(&mut self, parallel: &ParallelConfig) {
        if self.channels() != 3 {
            return;
        }
        let cols = self.cols() as usize;
        let mut gray = vec![T::zero(); self.pixel_count()];
        {
            let (r, g, b) = (self.channel(0), self.channel(1), self.channel(2));
            parallel.for_each_row_mut(&mut gray, cols, |y, row| {
                let offset = y * cols;
                for (x, out) in row.iter_mut().enumerate() {
                    let i = offset + x;
                    *out = T::from_f32(luminance([r[i].to_f32(), g[i].to_f32(), b[i].to_f32()]));
                }
            });
        }
        self.replace_data(1, gray);
    }

    /// Converts linear RGB to encoded CIELab in place. No-op unless 3 channels.
    pub fn rgb_to_cielab(&mut self) {
        self.map_rgb_with(&ParallelConfig::global(), rgb_to_lab);
    }

    /// [`rgb_to_cielab`](Self::rgb_to_cielab) with explicit threading.
    pub fn rgb_to_cielab_with(&mut self, parallel: &ParallelConfig) {
        self.map_rgb_with(parallel, rgb_to_lab);
    }

    /// Converts encoded CIELab back to linear RGB in place. No-op unless 3 channels.
    pub fn cielab_to_rgb(&mut self) {
        self.map_rgb_with(&ParallelConfig::global(), lab_to_rgb);
    }

    /// [`cielab_to_rgb`](Self::cielab_to_rgb) with explicit threading.
    pub fn cielab_to_rgb_with(&mut self, parallel: &ParallelConfig) {
        self.map_rgb_with(parallel, lab_to_rgb);
    }

    /// Runs `f` over every pixel's normalized `[c0, c1, c2]` triple.
    pub fn map_rgb_with<F>(&mut self, parallel: &ParallelConfig, f: F)
    where
        F: Fn([f32; 3]) -> [f32; 3] + Sync + Send,
    {
        if self.channels() != 3 || self.is_empty() {
            return;
        }
        let cols = self.cols() as usize;
        let plane = self.pixel_count();
        let mut pixels = vec![[T::zero(); 3]; plane];
        {
            let (r, g, b) = (self.channel(0), self.channel(1), self.channel(2));
            parallel.for_each_row_mut(&mut pixels, cols, |y, row| {
                let offset = y * cols;
                for (x, out) in row.iter_mut().enumerate() {
                    let i = offset + x;
                    let v = f([r[i].to_f32(), g[i].to_f32(), b[i].to_f32()]);
                    *out = [T::from_f32(v[0]), T::from_f32(v[1]), T::from_f32(v[2])];
                }
            });
        }
        let data = self.data_mut();
        for (i, px) in pixels.iter().enumerate() {
            data[i] = px[0];
            data[plane + i] = px[1];
            data[2 * plane + i] = px[2];
        }
    }
}
