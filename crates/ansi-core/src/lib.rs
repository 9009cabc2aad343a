/// Configuration, types, and shared structures for ansimage.
///
/// This crate contains the glyph palettes, the color transforms, the
/// fit/scale engine and every type shared across the ansimage workspace.

pub mod charset;
pub mod color;
pub mod config;
pub mod error;
pub mod fit;
pub mod frame;
pub mod traits;

pub use charset::GlyphPalette;
pub use config::RenderConfig;
pub use error::CoreError;
pub use fit::{ScaleState, compute_scale};
pub use frame::{CellColor, FrameBuffer, GlyphCell, GlyphGrid, GridGeometry};

/// Re-exports pour accès par chemin sémantique.
pub mod grid {
    pub use crate::frame::{CellColor, GlyphCell, GlyphGrid, GridGeometry};
}
