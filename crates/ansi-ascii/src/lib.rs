/// Character-art conversion engine for ansimage.
///
/// Rasterizes pixel buffers to glyph grids and serializes grids into
/// color-run documents.
pub mod document;
pub mod encode;
pub mod raster;
