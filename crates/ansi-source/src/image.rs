use std::path::Path;

use ansi_core::error::CoreError;
use ansi_core::frame::FrameBuffer;
use ansi_core::traits::ImageLoader;
use anyhow::{Context, Result};

/// Loader that reads the locator as a filesystem path.
///
/// # Example
/// ```no_run
/// use ansi_source::image::FileLoader;
/// use ansi_core::traits::ImageLoader;
/// let frame = FileLoader.load("logo.png").unwrap();
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct FileLoader;

impl ImageLoader for FileLoader {
    fn load(&self, locator: &str) -> Result<FrameBuffer, CoreError> {
        let path = Path::new(locator);
        if !path.exists() {
            return Err(CoreError::FileNotFound {
                path: locator.to_string(),
            });
        }
        load_image(path).map_err(|e| CoreError::Load {
            locator: locator.to_string(),
            reason: format!("{e:#}"),
        })
    }
}

/// Décode une image en buffer RGBA.
///
/// # Errors
/// Returns an error if the image cannot be opened or decoded.
///
/// # Example
/// ```no_run
/// use ansi_source::image::load_image;
/// use std::path::Path;
/// let frame = load_image(Path::new("logo.png")).unwrap();
/// ```
pub fn load_image(path: &Path) -> Result<FrameBuffer> {
    let img = image::open(path)
        .with_context(|| format!("Impossible de charger {}", path.display()))?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    log::debug!("Image chargée : {} ({width}×{height})", path.display());
    Ok(FrameBuffer {
        data: rgba.into_raw(),
        width,
        height,
    })
}
