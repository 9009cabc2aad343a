use ansi_core::charset::GlyphPalette;
use ansi_core::color::{MONO_THRESHOLD, apply_color_mode, luma_milli};
use ansi_core::config::ColorMode;
use ansi_core::error::CoreError;
use ansi_core::frame::{CellColor, FrameBuffer, GlyphCell, GlyphGrid, GridGeometry};
use rayon::prelude::*;

/// Convert one raw pixel into a cell.
///
/// Alpha is not an input: transparent pixels are treated like opaque ones.
///
/// # Example
/// ```
/// use ansi_ascii::raster::cell_for_pixel;
/// use ansi_core::charset::GlyphPalette;
/// use ansi_core::config::ColorMode;
/// use ansi_core::frame::CellColor;
///
/// let palette = GlyphPalette::resolve("ascii");
/// let cell = cell_for_pixel(128, 128, 128, ColorMode::Grayscale, &palette);
/// assert_eq!(cell.ch, '+');
/// assert_eq!(cell.color, CellColor::Rgb(128, 128, 128));
/// ```
#[inline(always)]
#[must_use]
pub fn cell_for_pixel(r: u8, g: u8, b: u8, mode: ColorMode, palette: &GlyphPalette) -> GlyphCell {
    let (er, eg, eb) = apply_color_mode(r, g, b, mode);
    let ch = palette.glyphs()[palette.index_for_luma_milli(luma_milli(er, eg, eb))];
    let color = match mode {
        // Effective r equals the binary luma level here.
        ColorMode::Monochrome if u32::from(er) > MONO_THRESHOLD => CellColor::White,
        ColorMode::Monochrome => CellColor::Black,
        ColorMode::Full | ColorMode::Grayscale => CellColor::Rgb(er, eg, eb),
    };
    GlyphCell { ch, color }
}

/// Rasterize a pre-scaled buffer into a glyph grid.
///
/// `frame` must hold at least `geometry.columns × geometry.rows` pixels;
/// cell (x, y) samples pixel (x, y). Rows are processed in parallel, the
/// result is identical to a sequential pass.
///
/// # Errors
/// [`CoreError::InvalidDimensions`] for an empty geometry or a buffer
/// smaller than the grid.
///
/// # Example
/// ```
/// use ansi_ascii::raster::rasterize;
/// use ansi_core::charset::GlyphPalette;
/// use ansi_core::config::ColorMode;
/// use ansi_core::frame::{FrameBuffer, GridGeometry};
///
/// let geometry = GridGeometry::derive(10, 10, 10).unwrap();
/// let frame = FrameBuffer::filled(10, 5, [255, 255, 255, 255]);
/// let grid = rasterize(&frame, geometry, ColorMode::Full, &GlyphPalette::resolve("blocks")).unwrap();
/// assert_eq!(grid.get(9, 4).ch, '█');
/// ```
pub fn rasterize(
    frame: &FrameBuffer,
    geometry: GridGeometry,
    mode: ColorMode,
    palette: &GlyphPalette,
) -> Result<GlyphGrid, CoreError> {
    if geometry.columns == 0
        || geometry.rows == 0
        || frame.width < geometry.columns
        || frame.height < geometry.rows
    {
        return Err(CoreError::dimensions(frame.width, frame.height));
    }

    let mut grid = GlyphGrid::with_geometry(geometry);
    grid.cells
        .par_chunks_mut(geometry.columns as usize)
        .enumerate()
        .for_each(|(cy, row)| {
            for (cx, cell) in row.iter_mut().enumerate() {
                let (r, g, b, _a) = frame.pixel(cx as u32, cy as u32);
                *cell = cell_for_pixel(r, g, b, mode, palette);
            }
        });

    log::debug!(
        "Rasterisé {}×{} ({}, {})",
        geometry.columns,
        geometry.rows,
        mode.as_str(),
        palette.charset().as_str()
    );
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> FrameBuffer {
        let mut fb = FrameBuffer::new(width, height);
        for y in 0..height {
            for x in 0..width {
                let v = ((x * 255) / width.max(1)) as u8;
                fb.set_pixel(x, y, [v, 255 - v, (y * 40) as u8, 255]);
            }
        }
        fb
    }

    #[test]
    fn mid_gray_scenario() {
        // 100×50 image at 80 columns: 20 rows.
        let geometry = GridGeometry::derive(80, 100, 50).unwrap();
        assert_eq!(geometry.rows, 20);
        let frame = FrameBuffer::filled(80, 20, [128, 128, 128, 255]);
        let grid = rasterize(
            &frame,
            geometry,
            ColorMode::Grayscale,
            &GlyphPalette::resolve("ascii"),
        )
        .unwrap();
        assert_eq!((grid.width, grid.height), (80, 20));
        assert!(grid.cells.iter().all(|c| c.ch == '+'));
        assert!(grid.cells.iter().all(|c| c.color == CellColor::Rgb(128, 128, 128)));
    }

    #[test]
    fn monochrome_uses_hex_levels() {
        let palette = GlyphPalette::resolve("blocks");
        let dark = cell_for_pixel(127, 127, 127, ColorMode::Monochrome, &palette);
        let light = cell_for_pixel(128, 128, 128, ColorMode::Monochrome, &palette);
        assert_eq!((dark.ch, dark.color), (' ', CellColor::Black));
        assert_eq!((light.ch, light.color), ('█', CellColor::White));
        assert_eq!(light.color.to_string(), "#ffffff");
    }

    #[test]
    fn alpha_is_ignored() {
        let palette = GlyphPalette::resolve("ascii");
        let mut frame = FrameBuffer::new(2, 1);
        frame.set_pixel(0, 0, [200, 100, 50, 255]);
        frame.set_pixel(1, 0, [200, 100, 50, 0]);
        let geometry = GridGeometry { columns: 2, rows: 1 };
        let grid = rasterize(&frame, geometry, ColorMode::Full, &palette).unwrap();
        assert_eq!(grid.get(0, 0), grid.get(1, 0));
    }

    #[test]
    fn parallel_matches_sequential() {
        let frame = gradient(37, 13);
        let palette = GlyphPalette::resolve("braille");
        let geometry = GridGeometry { columns: 37, rows: 13 };
        let grid = rasterize(&frame, geometry, ColorMode::Full, &palette).unwrap();
        for y in 0..13 {
            for x in 0..37 {
                let (r, g, b, _) = frame.pixel(x, y);
                assert_eq!(*grid.get(x, y), cell_for_pixel(r, g, b, ColorMode::Full, &palette));
            }
        }
    }

    #[test]
    fn undersized_buffer_is_rejected() {
        let frame = FrameBuffer::new(4, 4);
        let geometry = GridGeometry { columns: 8, rows: 2 };
        let err = rasterize(&frame, geometry, ColorMode::Full, &GlyphPalette::default());
        assert!(matches!(err, Err(CoreError::InvalidDimensions { .. })));
        let empty = GridGeometry { columns: 0, rows: 2 };
        assert!(rasterize(&frame, empty, ColorMode::Full, &GlyphPalette::default()).is_err());
    }

    #[test]
    fn glyph_density_tracks_brightness() {
        let palette = GlyphPalette::resolve("ascii");
        let mut prev = 0usize;
        for v in 0..=255u8 {
            let cell = cell_for_pixel(v, v, v, ColorMode::Full, &palette);
            let idx = palette.glyphs().iter().position(|&c| c == cell.ch).unwrap();
            assert!(idx >= prev);
            prev = idx;
        }
        assert_eq!(prev, palette.len() - 1);
    }
}
