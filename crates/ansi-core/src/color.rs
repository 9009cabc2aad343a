use crate::config::ColorMode;

/// Seuil monochrome : luma ≤ 127 → noir, sinon blanc.
pub const MONO_THRESHOLD: u32 = 127;

/// Luma of pure white in per-mille units.
pub const LUMA_MILLI_MAX: u32 = 255_000;

/// Perceptual luma (BT.601 weights 0.299/0.587/0.114) in per-mille units.
///
/// Integer weights keep gray levels exact: `(128, 128, 128)` is 128.000,
/// not 127.999….
///
/// # Example
/// ```
/// use ansi_core::color::luma_milli;
/// assert_eq!(luma_milli(128, 128, 128), 128_000);
/// assert_eq!(luma_milli(255, 255, 255), 255_000);
/// ```
#[inline(always)]
#[must_use]
pub fn luma_milli(r: u8, g: u8, b: u8) -> u32 {
    299 * u32::from(r) + 587 * u32::from(g) + 114 * u32::from(b)
}

/// Perceptual luma in [0, 255], unfloored.
///
/// # Example
/// ```
/// use ansi_core::color::luma;
/// assert_eq!(luma(255, 255, 255), 255.0);
/// assert_eq!(luma(0, 0, 0), 0.0);
/// ```
#[inline(always)]
#[must_use]
pub fn luma(r: u8, g: u8, b: u8) -> f64 {
    f64::from(luma_milli(r, g, b)) / 1000.0
}

/// Luma floored to an integer gray level.
#[inline(always)]
#[must_use]
pub fn gray_level(r: u8, g: u8, b: u8) -> u8 {
    (luma_milli(r, g, b) / 1000).min(255) as u8
}

/// Map a raw pixel to the effective color used for both glyph color and
/// brightness.
///
/// # Example
/// ```
/// use ansi_core::color::apply_color_mode;
/// use ansi_core::config::ColorMode;
/// assert_eq!(apply_color_mode(200, 50, 50, ColorMode::Full), (200, 50, 50));
/// assert_eq!(apply_color_mode(128, 128, 128, ColorMode::Grayscale), (128, 128, 128));
/// assert_eq!(apply_color_mode(128, 128, 128, ColorMode::Monochrome), (255, 255, 255));
/// ```
#[inline(always)]
#[must_use]
pub fn apply_color_mode(r: u8, g: u8, b: u8, mode: ColorMode) -> (u8, u8, u8) {
    match mode {
        ColorMode::Full => (r, g, b),
        ColorMode::Grayscale => {
            let gray = gray_level(r, g, b);
            (gray, gray, gray)
        }
        ColorMode::Monochrome => {
            let level = if u32::from(gray_level(r, g, b)) > MONO_THRESHOLD {
                255
            } else {
                0
            };
            (level, level, level)
        }
    }
}

/// Brightness in [0, 1] of an effective (already transformed) color.
#[inline(always)]
#[must_use]
pub fn brightness(r: u8, g: u8, b: u8) -> f64 {
    f64::from(luma_milli(r, g, b)) / f64::from(LUMA_MILLI_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grayscale_floors_luma() {
        // 0.299*10 + 0.587*20 + 0.114*30 = 18.15
        assert_eq!(apply_color_mode(10, 20, 30, ColorMode::Grayscale), (18, 18, 18));
    }

    #[test]
    fn gray_levels_are_fixed_points() {
        for v in 0..=255u8 {
            assert_eq!(gray_level(v, v, v), v);
        }
    }

    #[test]
    fn monochrome_threshold_is_inclusive_dark() {
        assert_eq!(apply_color_mode(127, 127, 127, ColorMode::Monochrome), (0, 0, 0));
        assert_eq!(apply_color_mode(128, 128, 128, ColorMode::Monochrome), (255, 255, 255));
    }

    #[test]
    fn monochrome_idempotent() {
        for r in (0..=255u8).step_by(15) {
            for g in (0..=255u8).step_by(15) {
                for b in (0..=255u8).step_by(15) {
                    let once = apply_color_mode(r, g, b, ColorMode::Monochrome);
                    let twice = apply_color_mode(once.0, once.1, once.2, ColorMode::Monochrome);
                    assert_eq!(once, twice, "({r},{g},{b})");
                }
            }
        }
    }

    #[test]
    fn brightness_bounds() {
        assert_eq!(brightness(0, 0, 0), 0.0);
        assert_eq!(brightness(255, 255, 255), 1.0);
        assert!((brightness(128, 128, 128) - 128.0 / 255.0).abs() < 1e-12);
    }
}
