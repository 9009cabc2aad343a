use ansi_core::frame::{FrameBuffer, GridGeometry};
use anyhow::{Context, Result};
use fast_image_resize::images::Image;
use fast_image_resize::{FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer as FirResizer};

/// Pré-échelle bilinéaire vers la grille de caractères.
///
/// The rasterizer samples pixel (x, y) for cell (x, y), so every source
/// goes through here first. Keeps its scratch buffer between conversions.
///
/// # Example
/// ```
/// use ansi_source::resize::Resizer;
/// let scaler = Resizer::default();
/// ```
pub struct Resizer {
    inner: FirResizer,
    options: ResizeOptions,
    /// Mutable copy of the decoded source.
    src_buf: Vec<u8>,
}

impl Resizer {
    /// Scaler using a bilinear convolution filter.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: FirResizer::new(),
            options: ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Bilinear)),
            src_buf: Vec::new(),
        }
    }

    /// Scale `src` to the size of `dst`, which is one pixel per cell.
    ///
    /// Equal sizes are a plain copy.
    ///
    /// # Errors
    /// Fails on a zero-sized buffer on either side or when the convolution
    /// is rejected.
    ///
    /// # Example
    /// ```
    /// use ansi_source::resize::Resizer;
    /// use ansi_core::frame::FrameBuffer;
    /// let mut scaler = Resizer::new();
    /// let image = FrameBuffer::new(100, 100);
    /// let mut cells = FrameBuffer::new(50, 25);
    /// scaler.resize_into(&image, &mut cells).unwrap();
    /// ```
    pub fn resize_into(&mut self, src: &FrameBuffer, dst: &mut FrameBuffer) -> Result<()> {
        if src.width == dst.width && src.height == dst.height {
            dst.data.copy_from_slice(&src.data);
            return Ok(());
        }

        self.src_buf.clear();
        self.src_buf.extend_from_slice(&src.data);

        let src_image =
            Image::from_slice_u8(src.width, src.height, &mut self.src_buf, PixelType::U8x4)
                .context("Image source vide")?;

        let mut dst_image =
            Image::from_slice_u8(dst.width, dst.height, &mut dst.data, PixelType::U8x4)
                .context("Grille cible vide")?;

        self.inner
            .resize(&src_image, &mut dst_image, Some(&self.options))
            .context("Pré-échelle vers la grille échouée")?;

        Ok(())
    }
}

impl Default for Resizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Pre-scale `src` to one pixel per cell of `geometry`.
///
/// # Errors
/// Returns an error if the resize operation fails.
///
/// # Example
/// ```
/// use ansi_source::resize::fit_to_grid;
/// use ansi_core::frame::{FrameBuffer, GridGeometry};
/// let src = FrameBuffer::new(100, 50);
/// let geometry = GridGeometry::derive(80, 100, 50).unwrap();
/// let dst = fit_to_grid(&src, geometry).unwrap();
/// assert_eq!((dst.width, dst.height), (80, 20));
/// ```
pub fn fit_to_grid(src: &FrameBuffer, geometry: GridGeometry) -> Result<FrameBuffer> {
    let mut dst = FrameBuffer::new(geometry.columns, geometry.rows);
    Resizer::new().resize_into(src, &mut dst)?;
    Ok(dst)
}
