use crate::error::CoreError;
use crate::frame::FrameBuffer;

/// Fournit un buffer RGBA décodé à partir d'un localisateur opaque.
///
/// Implémenté par : `FileLoader` (disque), les loaders de test.
///
/// The pipeline never interprets the locator; it only hands it over.
///
/// # Example
/// ```
/// use ansi_core::traits::ImageLoader;
/// use ansi_core::frame::FrameBuffer;
/// use ansi_core::error::CoreError;
///
/// struct Solid;
/// impl ImageLoader for Solid {
///     fn load(&self, _locator: &str) -> Result<FrameBuffer, CoreError> {
///         Ok(FrameBuffer::filled(4, 4, [255, 0, 0, 255]))
///     }
/// }
/// assert_eq!(Solid.load("any").unwrap().width, 4);
/// ```
pub trait ImageLoader: Send + Sync + 'static {
    /// Charge et décode l'image.
    ///
    /// # Errors
    /// [`CoreError::Load`] (or [`CoreError::FileNotFound`]) on any fetch or
    /// decode failure.
    fn load(&self, locator: &str) -> Result<FrameBuffer, CoreError>;
}
