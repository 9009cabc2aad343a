use ansi_core::config::{SizePreset, Viewport};

/// Horizontal inset subtracted from the host width before fitting.
pub const HOST_INSET_PX: f64 = 2.0;

/// Glyph advance of a typical monospace face, relative to the font size.
pub const ADVANCE_RATIO: f64 = 0.6;

/// Métriques de police utilisées pour mesurer la sortie à l'échelle 1.
///
/// # Example
/// ```
/// use ansi_app::measure::FontMetrics;
/// use ansi_core::config::SizePreset;
///
/// let metrics = FontMetrics::for_size(SizePreset::Standard);
/// let (w, h) = metrics.natural_size(80, 20).unwrap();
/// assert!((w - 80.0 * 17.6 * 0.6).abs() < 1e-9);
/// assert!((h - 20.0 * 17.6).abs() < 1e-9);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FontMetrics {
    /// Font size in px.
    pub font_px: f64,
    /// Advance width / font size.
    pub advance_ratio: f64,
    /// Line height / font size.
    pub line_height: f64,
}

impl FontMetrics {
    /// Metrics for the lower bound of a size preset's font clamp.
    #[must_use]
    pub fn for_size(size: SizePreset) -> Self {
        Self {
            font_px: size.font_px(),
            advance_ratio: ADVANCE_RATIO,
            line_height: 1.0,
        }
    }

    /// Natural `(width, height)` in px of a `columns × rows` grid.
    ///
    /// `None` when the grid or the metrics are degenerate.
    #[must_use]
    pub fn natural_size(&self, columns: u32, rows: u32) -> Option<(f64, f64)> {
        let w = f64::from(columns) * self.font_px * self.advance_ratio;
        let h = f64::from(rows) * self.font_px * self.line_height;
        (w.is_finite() && h.is_finite() && w > 0.0 && h > 0.0).then_some((w, h))
    }
}

/// Space the output may occupy: host width minus the inset, full height.
///
/// Unknown (zero) extents come out non-positive and are skipped by the
/// fit engine.
#[must_use]
pub fn available(viewport: Viewport) -> (f64, f64) {
    (viewport.width - HOST_INSET_PX, viewport.height)
}
