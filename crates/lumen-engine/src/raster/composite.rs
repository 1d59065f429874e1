use super::RasterImage;

/// Pixel displacement of the foreground origin relative to the background
/// origin. Either component may be negative.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct Offset {
    pub x: i32,
    pub y: i32,
}

impl Offset {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Blends `foreground` onto `background` in place with the "over" operator.
///
/// Per foreground pixel:
/// - `a_f = fg.a / 255 * opacity`; pixels with `a_f == 0` are skipped
/// - pixels landing outside the background are skipped
/// - `out_a = a_f + a_b * (1 - a_f)`
/// - `out_c = (fg_c * a_f + bg_c * a_b * (1 - a_f)) / out_a`
///
/// Arithmetic is carried out in `f64`. Results are rounded to nearest (ties
/// away from zero) and clamped to `[0, 255]`. When `out_a` is not positive
/// (only reachable with NaN or negative opacity) the background pixel is left
/// untouched.
pub fn composite(
    background: &mut RasterImage,
    foreground: &RasterImage,
    opacity: f32,
    offset: Offset,
) {
    let opacity = f64::from(opacity);

    let Some((xs, ys)) = overlap(background, foreground, offset) else {
        log::trace!("composite: foreground at {offset:?} does not overlap the background");
        return;
    };

    for fy in ys {
        let by = (fy as i64 + offset.y as i64) as u32;

        for fx in xs.clone() {
            let fi = foreground.index(fx, fy);
            let fg = &foreground.data()[fi..fi + RasterImage::BYTES_PER_PIXEL];

            let a_f = f64::from(fg[3]) / 255.0 * opacity;
            if a_f == 0.0 {
                continue;
            }

            let bx = (fx as i64 + offset.x as i64) as u32;
            let bi = background.index(bx, by);
            let bg = &mut background.data_mut()[bi..bi + RasterImage::BYTES_PER_PIXEL];

            let a_b = f64::from(bg[3]) / 255.0;
            let out_a = a_f + a_b * (1.0 - a_f);
            if !(out_a > 0.0) {
                continue;
            }

            for c in 0..3 {
                let out_c = (f64::from(fg[c]) * a_f + f64::from(bg[c]) * a_b * (1.0 - a_f)) / out_a;
                bg[c] = to_channel(out_c);
            }
            bg[3] = to_channel(out_a * 255.0);
        }
    }
}

/// Foreground column/row ranges that land inside the background.
fn overlap(
    background: &RasterImage,
    foreground: &RasterImage,
    offset: Offset,
) -> Option<(std::ops::Range<u32>, std::ops::Range<u32>)> {
    let axis = |fg_len: u32, bg_len: u32, off: i32| -> Option<std::ops::Range<u32>> {
        let start = (-(off as i64)).max(0);
        let end = (fg_len as i64).min(bg_len as i64 - off as i64);
        (start < end).then(|| start as u32..end as u32)
    };

    let xs = axis(foreground.width(), background.width(), offset.x)?;
    let ys = axis(foreground.height(), background.height(), offset.y)?;
    Some((xs, ys))
}

/// Round to nearest, clamp to a byte. NaN maps to 0.
#[inline]
fn to_channel(v: f64) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker(w: u32, h: u32) -> RasterImage {
        let mut img = RasterImage::filled(w, h, [0, 0, 0, 255]);
        for y in 0..h {
            for x in 0..w {
                let v = ((x * 37 + y * 91) % 256) as u8;
                img.set_pixel(x, y, [v, 255 - v, v / 2, 255]);
            }
        }
        img
    }

    // ── identities ────────────────────────────────────────────────────────

    #[test]
    fn opaque_foreground_replaces_overlap_only() {
        let mut bg = checker(6, 5);
        let original = bg.clone();
        let fg = RasterImage::filled(2, 3, [200, 10, 60, 255]);

        composite(&mut bg, &fg, 1.0, Offset::new(3, 1));

        for y in 0..5 {
            for x in 0..6 {
                let inside = (3..5).contains(&x) && (1..4).contains(&y);
                let expected = if inside { [200, 10, 60, 255] } else { original.pixel(x, y).unwrap() };
                assert_eq!(bg.pixel(x, y).unwrap(), expected, "pixel ({x},{y})");
            }
        }
    }

    #[test]
    fn zero_opacity_leaves_background_untouched() {
        let mut bg = checker(4, 4);
        let original = bg.clone();
        composite(&mut bg, &checker(4, 4), 0.0, Offset::default());
        assert_eq!(bg, original);
    }

    #[test]
    fn fully_transparent_foreground_is_a_no_op() {
        let mut bg = checker(4, 4);
        let original = bg.clone();
        let fg = RasterImage::filled(4, 4, [255, 255, 255, 0]);
        composite(&mut bg, &fg, 1.0, Offset::default());
        assert_eq!(bg, original);
    }

    #[test]
    fn foreground_entirely_outside_is_a_no_op() {
        let fg = RasterImage::filled(3, 3, [255, 0, 0, 255]);
        for offset in [
            Offset::new(4, 0),
            Offset::new(-3, 0),
            Offset::new(0, 4),
            Offset::new(0, -3),
            Offset::new(-100, 100),
        ] {
            let mut bg = checker(4, 4);
            let original = bg.clone();
            composite(&mut bg, &fg, 1.0, offset);
            assert_eq!(bg, original, "offset {offset:?}");
        }
    }

    // ── clipping ──────────────────────────────────────────────────────────

    #[test]
    fn negative_offset_clips_top_left() {
        let mut bg = RasterImage::filled(3, 3, [0, 0, 0, 255]);
        let mut fg = RasterImage::filled(2, 2, [0, 0, 0, 0]);
        fg.set_pixel(1, 1, [10, 20, 30, 255]);

        composite(&mut bg, &fg, 1.0, Offset::new(-1, -1));

        assert_eq!(bg.pixel(0, 0), Some([10, 20, 30, 255]));
        assert_eq!(bg.pixel(1, 1), Some([0, 0, 0, 255]));
    }

    #[test]
    fn overhang_past_bottom_right_is_dropped() {
        let mut bg = RasterImage::filled(2, 2, [0, 0, 0, 255]);
        let fg = RasterImage::filled(3, 3, [9, 9, 9, 255]);

        composite(&mut bg, &fg, 1.0, Offset::new(1, 1));

        assert_eq!(bg.pixel(1, 1), Some([9, 9, 9, 255]));
        assert_eq!(bg.pixel(0, 0), Some([0, 0, 0, 255]));
        assert_eq!(bg.pixel(1, 0), Some([0, 0, 0, 255]));
    }

    // ── blending ──────────────────────────────────────────────────────────

    #[test]
    fn half_opacity_over_opaque_averages() {
        let mut bg = RasterImage::filled(1, 1, [0, 0, 200, 255]);
        let fg = RasterImage::filled(1, 1, [200, 100, 0, 255]);

        composite(&mut bg, &fg, 0.5, Offset::default());

        assert_eq!(bg.pixel(0, 0), Some([100, 50, 100, 255]));
    }

    #[test]
    fn translucent_over_transparent_keeps_color_and_alpha() {
        let mut bg = RasterImage::filled(1, 1, [50, 50, 50, 0]);
        let fg = RasterImage::filled(1, 1, [240, 120, 30, 255]);

        composite(&mut bg, &fg, 0.5, Offset::default());

        // Background contributes nothing; colour is the foreground's and
        // alpha is 0.5 * 255 = 127.5 → 128.
        assert_eq!(bg.pixel(0, 0), Some([240, 120, 30, 128]));
    }

    #[test]
    fn over_operator_on_partial_alphas() {
        let mut bg = RasterImage::filled(1, 1, [0, 255, 0, 128]);
        let fg = RasterImage::filled(1, 1, [255, 0, 0, 102]);

        composite(&mut bg, &fg, 1.0, Offset::default());

        let a_f = 102.0f64 / 255.0;
        let a_b = 128.0f64 / 255.0;
        let out_a = a_f + a_b * (1.0 - a_f);
        let r = (255.0 * a_f / out_a).round() as u8;
        let g = (255.0 * a_b * (1.0 - a_f) / out_a).round() as u8;
        let a = (out_a * 255.0).round() as u8;
        assert_eq!(bg.pixel(0, 0), Some([r, g, 0, a]));
    }

    #[test]
    fn exact_halves_round_up() {
        // Red and green land on x.5 exactly in double precision; single
        // precision falls just short and rounds down.
        let mut bg = RasterImage::filled(1, 1, [255, 0, 200, 30]);
        let fg = RasterImage::filled(1, 1, [0, 255, 7, 34]);

        composite(&mut bg, &fg, 1.0, Offset::default());

        assert_eq!(bg.pixel(0, 0), Some([111, 145, 91, 60]));
    }

    #[test]
    fn opacity_above_one_is_clamped_on_store() {
        let mut bg = RasterImage::filled(1, 1, [0, 0, 0, 255]);
        let fg = RasterImage::filled(1, 1, [100, 100, 100, 255]);

        composite(&mut bg, &fg, 2.0, Offset::default());

        // a_f = 2 drives the colour past the foreground; stored values clamp.
        let px = bg.pixel(0, 0).unwrap();
        assert_eq!(px[3], 255);
        assert_eq!(px[0], 200);
    }

    #[test]
    fn nan_opacity_leaves_pixel_unchanged() {
        let mut bg = checker(2, 2);
        let original = bg.clone();
        composite(&mut bg, &checker(2, 2), f32::NAN, Offset::default());
        assert_eq!(bg, original);
    }
}
