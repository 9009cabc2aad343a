use crate::color::LUMA_MILLI_MAX;
use crate::config::Charset;

/// Blocs Unicode : pseudo-pixels.
pub const CHARSET_BLOCKS: [char; 5] = [' ', '░', '▒', '▓', '█'];

/// Points. Index 2 and 4 share the same glyph; existing renders depend on it.
pub const CHARSET_DOTS: [char; 5] = [' ', '·', '●', '◉', '●'];

/// 11 caractères, compact, bon contraste.
pub const CHARSET_ASCII: [char; 11] = [' ', '.', ':', '-', '=', '+', '*', '#', '%', '@', '$'];

/// Espace suivi des 63 motifs Braille U+2801..=U+283F.
pub const CHARSET_BRAILLE: [char; 64] = braille_ramp();

/// Braille base codepoint (U+2800).
const BRAILLE_BASE: u32 = 0x2800;

const fn braille_ramp() -> [char; 64] {
    let mut out = [' '; 64];
    let mut i = 1;
    while i < 64 {
        out[i] = match char::from_u32(BRAILLE_BASE + i as u32) {
            Some(ch) => ch,
            None => ' ',
        };
        i += 1;
    }
    out
}

/// Ordered brightness → glyph table.
///
/// Index 0 is the darkest/emptiest glyph, the last index the densest.
///
/// # Example
/// ```
/// use ansi_core::charset::GlyphPalette;
/// let palette = GlyphPalette::resolve("ASCII");
/// assert_eq!(palette.len(), 11);
/// assert_eq!(palette.glyph_for(0.0), ' ');
/// assert_eq!(palette.glyph_for(1.0), '$');
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GlyphPalette {
    charset: Charset,
    glyphs: &'static [char],
}

impl GlyphPalette {
    /// Resolve a free-form charset identifier. Unknown names give `blocks`.
    ///
    /// # Example
    /// ```
    /// use ansi_core::charset::GlyphPalette;
    /// use ansi_core::config::Charset;
    /// assert_eq!(GlyphPalette::resolve("  Braille ").charset(), Charset::Braille);
    /// assert_eq!(GlyphPalette::resolve("unknown!").charset(), Charset::Blocks);
    /// ```
    #[must_use]
    pub fn resolve(charset_id: &str) -> Self {
        Self::for_charset(Charset::parse(charset_id))
    }

    /// Palette for an already-parsed charset.
    #[must_use]
    pub fn for_charset(charset: Charset) -> Self {
        let glyphs: &'static [char] = match charset {
            Charset::Blocks => &CHARSET_BLOCKS,
            Charset::Dots => &CHARSET_DOTS,
            Charset::Ascii => &CHARSET_ASCII,
            Charset::Braille => &CHARSET_BRAILLE,
        };
        Self { charset, glyphs }
    }

    /// Charset this palette was built from.
    #[must_use]
    pub fn charset(&self) -> Charset {
        self.charset
    }

    /// Glyphs in brightness order.
    #[must_use]
    pub fn glyphs(&self) -> &'static [char] {
        self.glyphs
    }

    /// Number of brightness levels. Always ≥ 2.
    #[must_use]
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    /// Glyph index for a brightness in [0, 1]: `floor(b × (len − 1))`, clamped.
    ///
    /// Non-finite brightness maps to index 0.
    #[inline(always)]
    #[must_use]
    pub fn index_for(&self, brightness: f64) -> usize {
        let last = self.glyphs.len() - 1;
        if !brightness.is_finite() || brightness <= 0.0 {
            return 0;
        }
        ((brightness * last as f64).floor() as usize).min(last)
    }

    /// Same mapping as [`Self::index_for`], in exact integer arithmetic on a
    /// per-mille luma (see [`crate::color::luma_milli`]).
    #[inline(always)]
    #[must_use]
    pub fn index_for_luma_milli(&self, luma_milli: u32) -> usize {
        let last = self.glyphs.len() - 1;
        let scaled = u64::from(luma_milli) * last as u64 / u64::from(LUMA_MILLI_MAX);
        (scaled as usize).min(last)
    }

    /// Glyph for a brightness in [0, 1].
    #[inline(always)]
    #[must_use]
    pub fn glyph_for(&self, brightness: f64) -> char {
        self.glyphs[self.index_for(brightness)]
    }
}

impl Default for GlyphPalette {
    fn default() -> Self {
        Self::for_charset(Charset::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palettes_have_expected_sizes() {
        assert_eq!(GlyphPalette::resolve("blocks").len(), 5);
        assert_eq!(GlyphPalette::resolve("dots").len(), 5);
        assert_eq!(GlyphPalette::resolve("ascii").len(), 11);
        assert_eq!(GlyphPalette::resolve("braille").len(), 64);
    }

    #[test]
    fn braille_ramp_is_contiguous() {
        assert_eq!(CHARSET_BRAILLE[0], ' ');
        assert_eq!(CHARSET_BRAILLE[1], '\u{2801}');
        assert_eq!(CHARSET_BRAILLE[63], '\u{283F}');
        for pair in CHARSET_BRAILLE[1..].windows(2) {
            assert_eq!(u32::from(pair[1]), u32::from(pair[0]) + 1);
        }
    }

    #[test]
    fn dots_keep_duplicate_glyph() {
        let dots = GlyphPalette::resolve("dots");
        assert_eq!(dots.glyphs()[2], dots.glyphs()[4]);
        assert_eq!(dots.glyphs()[2], '●');
    }

    #[test]
    fn resolver_is_total() {
        for input in ["", "   ", "BLOCKS", "a.s.c.i.i", "--dots--", "ascii", "Braille\n", "💥"] {
            let palette = GlyphPalette::resolve(input);
            assert!(palette.len() >= 2, "palette vide pour {input:?}");
        }
        assert_eq!(GlyphPalette::resolve("").charset(), Charset::Blocks);
        assert_eq!(GlyphPalette::resolve(" DoTs ").charset(), Charset::Dots);
    }

    #[test]
    fn index_monotonic_and_in_range() {
        for palette in [
            GlyphPalette::resolve("blocks"),
            GlyphPalette::resolve("ascii"),
            GlyphPalette::resolve("braille"),
        ] {
            let mut prev = 0usize;
            for step in 0..=1000 {
                let b = f64::from(step) / 1000.0;
                let idx = palette.index_for(b);
                assert!(idx >= prev, "index non monotone à {b}");
                assert!(idx < palette.len());
                prev = idx;
            }
            assert_eq!(palette.index_for(1.0), palette.len() - 1);
            assert_eq!(palette.index_for(1.5), palette.len() - 1);
            assert_eq!(palette.index_for(-0.2), 0);
            assert_eq!(palette.index_for(f64::NAN), 0);
        }
    }

    #[test]
    fn mid_gray_on_ascii_is_plus() {
        let palette = GlyphPalette::resolve("ascii");
        assert_eq!(palette.glyph_for(128.0 / 255.0), '+');
        assert_eq!(palette.glyphs()[palette.index_for_luma_milli(128_000)], '+');
    }

    #[test]
    fn integer_and_float_paths_agree() {
        let palette = GlyphPalette::resolve("braille");
        for v in 0..=255u32 {
            let milli = v * 1000;
            assert_eq!(
                palette.index_for_luma_milli(milli),
                palette.index_for(f64::from(v) / 255.0),
                "gris {v}"
            );
        }
    }
}
