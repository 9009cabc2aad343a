use std::sync::Arc;

use ansi_ascii::encode::{RenderedOutput, encode};
use ansi_ascii::raster::rasterize;
use ansi_core::charset::GlyphPalette;
use ansi_core::config::RenderConfig;
use ansi_core::error::CoreError;
use ansi_core::frame::{FrameBuffer, GridGeometry};
use ansi_core::traits::ImageLoader;
use ansi_source::resize::fit_to_grid;

/// Result of one conversion, tagged with the generation that requested it.
#[derive(Debug)]
pub struct Completion {
    /// Generation counter value at request time.
    pub generation: u64,
    /// Rendered output or the failure that ended the conversion.
    pub result: Result<RenderedOutput, CoreError>,
}

/// Convert a decoded image with the given settings.
///
/// Width resolution, grid geometry, pre-scaling, rasterization and run
/// encoding, in that order.
///
/// # Errors
/// [`CoreError::InvalidDimensions`] for a non-positive explicit width, an
/// empty image, or a grid that rounds to zero rows.
///
/// # Example
/// ```
/// use ansi_app::pipeline::convert;
/// use ansi_core::config::RenderConfig;
/// use ansi_core::frame::FrameBuffer;
///
/// let frame = FrameBuffer::filled(100, 50, [0, 0, 0, 255]);
/// let out = convert(&frame, &RenderConfig::default()).unwrap();
/// assert_eq!((out.columns, out.rows), (80, 20));
/// ```
pub fn convert(frame: &FrameBuffer, config: &RenderConfig) -> Result<RenderedOutput, CoreError> {
    let columns = config.target_char_width()?;
    let geometry = GridGeometry::derive(columns, frame.width, frame.height)?;
    let scaled = fit_to_grid(frame, geometry).map_err(|e| {
        log::warn!("Redimensionnement impossible : {e:#}");
        CoreError::dimensions(frame.width, frame.height)
    })?;
    let palette = GlyphPalette::for_charset(config.charset);
    let grid = rasterize(&scaled, geometry, config.color_mode, &palette)?;
    Ok(encode(&grid))
}

/// Load `config.source` through `loader`, then [`convert`].
///
/// # Errors
/// Any loader error, or a conversion error.
pub fn load_and_convert(
    loader: &dyn ImageLoader,
    config: &RenderConfig,
) -> Result<RenderedOutput, CoreError> {
    let frame = loader.load(&config.source)?;
    log::debug!(
        "Image chargée : {} ({}×{})",
        config.source,
        frame.width,
        frame.height
    );
    convert(&frame, config)
}

/// Run one conversion on a worker thread and post its [`Completion`].
///
/// # Errors
/// Returns an error if the thread cannot be spawned.
pub fn spawn_conversion(
    loader: Arc<dyn ImageLoader>,
    config: RenderConfig,
    generation: u64,
    completions: flume::Sender<Completion>,
) -> std::io::Result<()> {
    std::thread::Builder::new()
        .name(format!("conversion-{generation}"))
        .spawn(move || {
            let result = load_and_convert(loader.as_ref(), &config);
            if completions.send(Completion { generation, result }).is_err() {
                log::debug!("Conversion {generation} terminée après fermeture du contexte");
            }
        })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ansi_core::config::{Charset, ColorMode};

    struct Black;
    impl ImageLoader for Black {
        fn load(&self, _locator: &str) -> Result<FrameBuffer, CoreError> {
            Ok(FrameBuffer::filled(100, 50, [0, 0, 0, 255]))
        }
    }

    #[test]
    fn explicit_width_wins_over_size() {
        let config = RenderConfig {
            width: Some(40),
            ..RenderConfig::default()
        };
        let out = convert(&FrameBuffer::filled(100, 50, [0, 0, 0, 255]), &config).unwrap();
        assert_eq!((out.columns, out.rows), (40, 10));
    }

    #[test]
    fn non_positive_width_fails() {
        for width in [0, -3] {
            let config = RenderConfig {
                width: Some(width),
                ..RenderConfig::default()
            };
            let err = convert(&FrameBuffer::new(10, 10), &config).unwrap_err();
            assert!(matches!(err, CoreError::InvalidDimensions { .. }));
        }
    }

    #[test]
    fn panorama_too_flat_for_one_row_fails() {
        let config = RenderConfig {
            width: Some(1),
            ..RenderConfig::default()
        };
        assert!(convert(&FrameBuffer::new(1000, 10), &config).is_err());
    }

    #[test]
    fn tall_image_fails_instead_of_allocating() {
        let config = RenderConfig {
            width: Some(4096),
            ..RenderConfig::default()
        };
        let err = convert(&FrameBuffer::filled(1, 100_000, [9, 9, 9, 255]), &config).unwrap_err();
        assert!(matches!(err, CoreError::InvalidDimensions { .. }));
    }

    #[test]
    fn black_image_renders_blank_glyphs() {
        let config = RenderConfig {
            charset: Charset::Ascii,
            color_mode: ColorMode::Monochrome,
            ..RenderConfig::default()
        };
        let out = load_and_convert(&Black, &config).unwrap();
        assert_eq!(out.run_rows.len(), 20);
        assert!(out.markup.lines().all(|l| l.contains("#000000")));
    }

    #[test]
    fn worker_posts_tagged_completion() {
        let (tx, rx) = flume::unbounded();
        spawn_conversion(Arc::new(Black), RenderConfig::default(), 7, tx).unwrap();
        let done = rx.recv_timeout(std::time::Duration::from_secs(5)).unwrap();
        assert_eq!(done.generation, 7);
        assert!(done.result.is_ok());
    }
}
