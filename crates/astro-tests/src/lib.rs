//! Integration tests for the astro imaging crates.
//!
//! This crate contains end-to-end scenarios that exercise `astro-core`,
//! `astro-stats` and `astro-ops` together, the way a processing dialog
//! would: build a buffer, query statistics, transform, query again.

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use astro_core::{luminance, DynImage, Image, ImagePointF, ParallelConfig, Sample, SampleType};
    use astro_ops::process::{apply_process, Binarize, MapProcess, Rescale};
    use astro_ops::{apply_masked_dyn, resize, warp_affine, InterpolationKind, Interpolator};
    use astro_stats::{ChannelStatistics, ImageStatistics, StatisticsOptions};
    use tracing_subscriber::EnvFilter;

    /// Routes library logs to the test harness; `RUST_LOG=debug` to see them.
    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    const LIGHT: [u8; 3] = [200, 50, 10];
    const DARK: [u8; 3] = [20, 150, 240];

    fn checkerboard() -> Image<u8> {
        Image::from_fn(4, 4, 3, |x, y, c| {
            if (x + y) % 2 == 0 { LIGHT[c as usize] } else { DARK[c as usize] }
        })
        .unwrap()
    }

    fn normalized(rgb: [u8; 3]) -> [f32; 3] {
        [rgb[0].to_f32(), rgb[1].to_f32(), rgb[2].to_f32()]
    }

    /// Checkerboard: per-channel mean, then gray conversion against the
    /// luminance formula.
    #[test]
    fn test_checkerboard_mean_and_gray() {
        init_tracing();
        let img = checkerboard();
        for ch in 0..3 {
            let expected = (LIGHT[ch] as f64 + DARK[ch] as f64) / 2.0;
            assert_eq!(img.compute_mean(ch as u32, false), expected);
        }

        // float buffer: luminance within 1e-3
        let mut gray_f: Image<f32> = img.convert();
        gray_f.rgb_to_gray();
        assert_eq!(gray_f.channels(), 1);
        assert_eq!(gray_f.sample_count(), 16);
        for y in 0..4 {
            for x in 0..4 {
                let rgb = if (x + y) % 2 == 0 { LIGHT } else { DARK };
                assert_abs_diff_eq!(gray_f.get(x, y, 0), luminance(normalized(rgb)), epsilon = 1e-3);
            }
        }

        // 8-bit buffer: same luminance, rounded once
        let mut gray = img.clone();
        gray.rgb_to_gray();
        assert_eq!(gray.sample_count(), 16);
        assert_eq!(gray.get(0, 0, 0), u8::from_f32(luminance(normalized(LIGHT))));
        assert_eq!(gray.get(1, 0, 0), u8::from_f32(luminance(normalized(DARK))));
    }

    #[test]
    fn test_record_for_checkerboard() {
        let stats = ChannelStatistics::for_image(&checkerboard(), StatisticsOptions::default());
        assert_eq!(stats.len(), 3);
        for (ch, s) in stats.iter().enumerate() {
            let (lo, hi) = (LIGHT[ch].min(DARK[ch]) as f64, LIGHT[ch].max(DARK[ch]) as f64);
            assert_eq!(s.pixel_count, 16);
            assert_eq!(s.min, lo);
            assert_eq!(s.max, hi);
            // even split: median sits halfway between the two populations
            assert_eq!(s.median, (lo + hi) / 2.0);
            assert_eq!(s.std_dev, (hi - lo) / 2.0);
            assert_eq!(s.avg_dev, (hi - lo) / 2.0);
        }
    }

    /// Depth change keeps the clip semantics: sentinels move with the type.
    #[test]
    fn test_clip_survives_depth_conversion() {
        let img = Image::<u8>::from_data(1, 6, 1, vec![0, 0, 0, 10, 20, 255]).unwrap();
        let wide = DynImage::from(img).convert_to(SampleType::U16);
        let stats = ChannelStatistics::for_dyn_image(&wide, StatisticsOptions::default());
        assert_eq!(stats[0].median, 5.0 * 257.0);
        let clipped = ChannelStatistics::for_dyn_image(&wide, StatisticsOptions::clipped());
        assert_eq!(clipped[0].median, 15.0 * 257.0);
        assert_eq!(clipped[0].pixel_count, 2);
    }

    /// A tag read from a file header selects the concrete buffer; processes
    /// and statistics then run through dispatch without naming the type.
    #[test]
    fn test_dispatch_from_header_tag() {
        init_tracing();
        for bitpix in [8, 16, -32] {
            let tag = SampleType::from_bitpix(bitpix).unwrap();
            let ramp = Image::<f32>::from_fn(8, 8, 1, |x, y, _| 0.2 + (x + y * 8) as f32 / 200.0).unwrap();
            let mut img = DynImage::from(ramp).convert_to(tag);
            assert_eq!(img.sample_type(), tag);

            let mut rescale = Rescale::new();
            apply_process(&mut img, &mut rescale, &ParallelConfig::default()).unwrap();
            assert_eq!(rescale.ranges().len(), 1);

            let stats = ChannelStatistics::for_dyn_image(&img, StatisticsOptions::default());
            assert_abs_diff_eq!(stats[0].min, 0.0, epsilon = 1e-5);
            assert_abs_diff_eq!(stats[0].max, tag.max_value(), epsilon = 1e-5);
        }
        assert!(SampleType::from_bitpix(64).is_err());
    }

    #[test]
    fn test_binarize_parallel_vs_sequential_over_dispatch() {
        for tag in SampleType::ALL {
            let src = Image::<f32>::from_fn(65, 41, 3, |x, y, c| ((x * 31 + y * 17 + c * 7) % 97) as f32 / 96.0).unwrap();
            let base = DynImage::from(src).convert_to(tag);
            let mut seq = base.clone();
            let mut par = base;
            let mut map = MapProcess(Binarize::new(0.4));
            apply_process(&mut seq, &mut map, &ParallelConfig::sequential()).unwrap();
            apply_process(&mut par, &mut map, &ParallelConfig::with_threads(4).with_min_rows_per_task(2)).unwrap();
            assert_eq!(seq, par, "{tag}");
        }
    }

    #[test]
    fn test_boundary_fallback_through_dispatch() {
        let interp = Interpolator::new(InterpolationKind::BicubicSpline);
        let base = Image::<u16>::from_fn(5, 5, 1, |x, y, _| (1 + x + y * 5) as u16 * 1000).unwrap();
        for tag in SampleType::ALL {
            let img = DynImage::from(base.clone()).convert_to(tag);
            for (x, y) in [(0.6, 2.2), (3.7, 4.4), (2.0, 0.5)] {
                let p = ImagePointF::new(x, y, 0);
                let r = p.rounded();
                assert_eq!(interp.interpolate_dyn(&img, p), img.at(r.x, r.y, 0), "{tag} ({x}, {y})");
            }
        }
    }

    #[test]
    fn test_resize_keeps_gradient_mean() {
        let img = Image::<f32>::from_fn(8, 64, 1, |x, _, _| x as f32 / 63.0).unwrap();
        let interp = Interpolator::new(InterpolationKind::Bilinear);
        let half = resize(&img, 8, 32, &interp, &ParallelConfig::default()).unwrap();
        assert_eq!(half.shape(), (8, 32, 1));
        let row_mean = half.row(3, 0).iter().sum::<f32>() / 32.0;
        assert_abs_diff_eq!(row_mean, 0.5, epsilon = 1e-5);
        // the last row has no lower neighbor and falls back to nearest
        assert_eq!(half.get(0, 7, 0), img.get(1, 7, 0));
    }

    #[test]
    fn test_registration_shift_moves_statistics_window() {
        // a bright 2x2 star shifted by (3, 2) lands at the expected place
        let mut frame = Image::<u16>::new(10, 10, 1).unwrap();
        for (x, y) in [(2, 2), (3, 2), (2, 3), (3, 3)] {
            frame.set(x, y, 0, 50000);
        }
        let shift = glam::DAffine2::from_translation(glam::DVec2::new(3.0, 2.0));
        let interp = Interpolator::new(InterpolationKind::Lanczos3);
        let aligned = warp_affine(&frame, &shift, 10, 10, &interp, &ParallelConfig::default()).unwrap();
        for (x, y) in [(5, 4), (6, 4), (5, 5), (6, 5)] {
            assert_eq!(aligned.get(x, y, 0), 50000);
        }
        assert_eq!(aligned.get(2, 2, 0), 0);
        assert_eq!(aligned.compute_min_max(0, false), (0.0, 50000.0));
    }

    #[test]
    fn test_masked_process_touches_only_masked_half() {
        let mut img = DynImage::from(checkerboard());
        let mask = DynImage::from(Image::<f32>::from_fn(4, 4, 1, |_, y, _| if y < 2 { 1.0 } else { 0.0 }).unwrap());
        apply_masked_dyn(&mut img, &mut MapProcess(Binarize::new(0.5)), &mask, false, &ParallelConfig::default())
            .unwrap();
        let img = img.downcast_ref::<u8>().unwrap();
        // top rows binarized
        assert!(img.row(0, 0).iter().all(|&v| v == 0 || v == 255));
        // bottom rows untouched
        assert_eq!(img.row(3, 1), checkerboard().row(3, 1));
    }
}
