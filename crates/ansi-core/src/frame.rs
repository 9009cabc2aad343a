use std::fmt;

use serde::{Serialize, Serializer};

use crate::error::CoreError;

/// Vertical correction: a monospace cell is about twice as tall as wide.
pub const CELL_ASPECT: f64 = 0.5;

/// Upper bound on `columns × rows` for one conversion.
pub const MAX_GRID_CELLS: u64 = 1 << 24;

/// Buffer de pixels RGBA, row-major, 4 bytes par pixel.
///
/// Owned by the loader; the conversion pipeline only reads it.
///
/// # Example
/// ```
/// use ansi_core::frame::FrameBuffer;
/// let fb = FrameBuffer::new(10, 10);
/// assert_eq!(fb.data.len(), 400);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameBuffer {
    /// Pixels RGBA, row-major, 4 bytes par pixel.
    pub data: Vec<u8>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl FrameBuffer {
    /// Crée un buffer noir transparent aux dimensions données.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            data: vec![0u8; width as usize * height as usize * 4],
            width,
            height,
        }
    }

    /// Wrap raw RGBA bytes.
    ///
    /// # Errors
    /// [`CoreError::InvalidDimensions`] if `data` is not `width × height × 4` bytes.
    ///
    /// # Example
    /// ```
    /// use ansi_core::frame::FrameBuffer;
    /// assert!(FrameBuffer::from_rgba(2, 1, vec![0; 8]).is_ok());
    /// assert!(FrameBuffer::from_rgba(2, 1, vec![0; 7]).is_err());
    /// ```
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self, CoreError> {
        if data.len() != width as usize * height as usize * 4 {
            return Err(CoreError::dimensions(width, height));
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Buffer filled with a single color.
    #[must_use]
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let mut fb = Self::new(width, height);
        for px in fb.data.chunks_exact_mut(4) {
            px.copy_from_slice(&rgba);
        }
        fb
    }

    /// Accès au pixel (x, y) → (r, g, b, a).
    ///
    /// Out-of-range coordinates read as transparent black.
    #[inline(always)]
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> (u8, u8, u8, u8) {
        debug_assert!(x < self.width && y < self.height, "pixel out of bounds");
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        match self.data.get(idx..idx + 4) {
            Some(px) => (px[0], px[1], px[2], px[3]),
            None => (0, 0, 0, 0),
        }
    }

    /// Write pixel (x, y). Out-of-range writes are ignored.
    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        self.data[idx..idx + 4].copy_from_slice(&rgba);
    }
}

/// Grid size derived from a target width and the source aspect ratio.
///
/// `rows = floor(columns × (source_height / source_width) × 0.5)`.
///
/// # Example
/// ```
/// use ansi_core::frame::GridGeometry;
/// let g = GridGeometry::derive(80, 100, 50).unwrap();
/// assert_eq!((g.columns, g.rows), (80, 20));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridGeometry {
    /// Characters per row.
    pub columns: u32,
    /// Number of rows.
    pub rows: u32,
}

impl GridGeometry {
    /// Derive the grid size.
    ///
    /// # Errors
    /// [`CoreError::InvalidDimensions`] if any input is zero, if the
    /// image is so wide that no row survives the floor, or if the grid
    /// would exceed [`MAX_GRID_CELLS`].
    pub fn derive(columns: u32, source_width: u32, source_height: u32) -> Result<Self, CoreError> {
        if columns == 0 || source_width == 0 || source_height == 0 {
            return Err(CoreError::dimensions(source_width, source_height));
        }
        let aspect = f64::from(source_height) / f64::from(source_width);
        let rows = (f64::from(columns) * aspect * CELL_ASPECT).floor();
        if !rows.is_finite() || rows < 1.0 {
            return Err(CoreError::dimensions(columns, 0));
        }
        let rows = rows.min(f64::from(u32::MAX)) as u32;
        if u64::from(columns) * u64::from(rows) > MAX_GRID_CELLS {
            log::warn!("Grille trop grande : {columns}×{rows}");
            return Err(CoreError::dimensions(columns, rows));
        }
        Ok(Self { columns, rows })
    }

    /// Number of cells.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.columns as usize * self.rows as usize
    }
}

/// Couleur d'une cellule.
///
/// Rendered as `rgb(r,g,b)` except for the two monochrome levels, which
/// render as `#ffffff` / `#000000`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellColor {
    /// Truecolor or gray.
    Rgb(u8, u8, u8),
    /// Monochrome dark level.
    Black,
    /// Monochrome light level.
    White,
}

impl CellColor {
    /// RGB components.
    #[must_use]
    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            Self::Rgb(r, g, b) => (r, g, b),
            Self::Black => (0, 0, 0),
            Self::White => (255, 255, 255),
        }
    }

    /// Parse the CSS forms produced by `Display`.
    ///
    /// # Example
    /// ```
    /// use ansi_core::frame::CellColor;
    /// assert_eq!(CellColor::from_css("rgb(1,2,3)"), Some(CellColor::Rgb(1, 2, 3)));
    /// assert_eq!(CellColor::from_css("#ffffff"), Some(CellColor::White));
    /// assert_eq!(CellColor::from_css("teal"), None);
    /// ```
    #[must_use]
    pub fn from_css(value: &str) -> Option<Self> {
        let value = value.trim();
        match value {
            "#ffffff" => return Some(Self::White),
            "#000000" => return Some(Self::Black),
            _ => {}
        }
        let inner = value.strip_prefix("rgb(")?.strip_suffix(')')?;
        let mut parts = inner.split(',').map(|p| p.trim().parse::<u8>());
        let r = parts.next()?.ok()?;
        let g = parts.next()?.ok()?;
        let b = parts.next()?.ok()?;
        if parts.next().is_some() {
            return None;
        }
        Some(Self::Rgb(r, g, b))
    }
}

impl Serialize for CellColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl fmt::Display for CellColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rgb(r, g, b) => write!(f, "rgb({r},{g},{b})"),
            Self::Black => f.write_str("#000000"),
            Self::White => f.write_str("#ffffff"),
        }
    }
}

/// Single cell in the glyph grid.
///
/// # Example
/// ```
/// use ansi_core::frame::GlyphCell;
/// let cell = GlyphCell::default();
/// assert_eq!(cell.ch, ' ');
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GlyphCell {
    /// Caractère à afficher.
    pub ch: char,
    /// Couleur foreground.
    pub color: CellColor,
}

impl Default for GlyphCell {
    fn default() -> Self {
        Self {
            ch: ' ',
            color: CellColor::Black,
        }
    }
}

/// Grille de sortie, row-major.
///
/// # Example
/// ```
/// use ansi_core::frame::{CellColor, GlyphCell, GlyphGrid};
/// let mut grid = GlyphGrid::new(80, 24);
/// grid.set(0, 0, GlyphCell { ch: '@', color: CellColor::Rgb(255, 0, 0) });
/// assert_eq!(grid.get(0, 0).ch, '@');
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlyphGrid {
    /// Flat array of cells, row-major.
    pub cells: Vec<GlyphCell>,
    /// Width in characters.
    pub width: u32,
    /// Height in characters.
    pub height: u32,
}

impl GlyphGrid {
    /// Crée une grille remplie de cellules par défaut.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            cells: vec![GlyphCell::default(); width as usize * height as usize],
            width,
            height,
        }
    }

    /// Grid sized for `geometry`.
    #[must_use]
    pub fn with_geometry(geometry: GridGeometry) -> Self {
        Self::new(geometry.columns, geometry.rows)
    }

    /// Set a cell at position (x, y).
    #[inline(always)]
    pub fn set(&mut self, x: u32, y: u32, cell: GlyphCell) {
        self.cells[y as usize * self.width as usize + x as usize] = cell;
    }

    /// Get a cell reference at position (x, y).
    #[inline(always)]
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> &GlyphCell {
        &self.cells[y as usize * self.width as usize + x as usize]
    }

    /// Rows as slices, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[GlyphCell]> {
        self.cells.chunks(self.width.max(1) as usize)
    }

    /// Glyphs only, one `\n`-terminated line per row.
    #[must_use]
    pub fn to_plain_text(&self) -> String {
        let mut out = String::with_capacity(self.cells.len() + self.height as usize);
        for row in self.rows() {
            out.extend(row.iter().map(|c| c.ch));
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn char_height_follows_floor_formula() {
        for columns in [1u32, 7, 40, 80, 121] {
            for (w, h) in [(100u32, 50u32), (3, 7), (640, 480), (1, 1), (17, 200)] {
                let expected =
                    (f64::from(columns) * (f64::from(h) / f64::from(w)) * 0.5).floor() as u32;
                match GridGeometry::derive(columns, w, h) {
                    Ok(g) => assert_eq!(g.rows, expected, "{columns} cols, {w}×{h}"),
                    Err(_) => assert_eq!(expected, 0, "{columns} cols, {w}×{h}"),
                }
            }
        }
    }

    #[test]
    fn degenerate_geometry_is_rejected() {
        assert!(GridGeometry::derive(0, 100, 50).is_err());
        assert!(GridGeometry::derive(80, 0, 50).is_err());
        assert!(GridGeometry::derive(80, 100, 0).is_err());
        // 1 column on a panorama floors to zero rows.
        assert!(GridGeometry::derive(1, 1000, 10).is_err());
    }

    #[test]
    fn tall_image_is_rejected_before_allocation() {
        let err = GridGeometry::derive(4096, 1, 100_000).unwrap_err();
        assert!(matches!(err, CoreError::InvalidDimensions { width: 4096, .. }));
        // The largest square-ish grids stay accepted.
        let g = GridGeometry::derive(4096, 4096, 4096).unwrap();
        assert!(g.cell_count() as u64 <= MAX_GRID_CELLS);
    }

    #[test]
    fn css_color_display_and_parse_agree() {
        for color in [CellColor::Rgb(12, 0, 255), CellColor::Black, CellColor::White] {
            assert_eq!(CellColor::from_css(&color.to_string()), Some(color));
        }
        assert_eq!(CellColor::from_css("rgb(1,2)"), None);
        assert_eq!(CellColor::from_css("rgb(1,2,3,4)"), None);
        assert_eq!(CellColor::from_css("rgb(256,0,0)"), None);
    }

    #[test]
    fn pixel_access() {
        let mut fb = FrameBuffer::new(3, 2);
        fb.set_pixel(2, 1, [9, 8, 7, 6]);
        assert_eq!(fb.pixel(2, 1), (9, 8, 7, 6));
        assert_eq!(fb.pixel(0, 0), (0, 0, 0, 0));
        fb.set_pixel(5, 5, [1, 1, 1, 1]);
        assert_eq!(FrameBuffer::filled(2, 2, [1, 2, 3, 4]).pixel(1, 1), (1, 2, 3, 4));
    }

    #[test]
    fn plain_text_has_one_line_per_row() {
        let grid = GlyphGrid::new(3, 2);
        assert_eq!(grid.to_plain_text(), "   \n   \n");
    }
}
