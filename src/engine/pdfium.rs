//! pdfium-backed [`RenderEngine`].
//!
//! Natural viewports are PDF points (1/72 in), so scale 1.0 renders one pixel
//! per point. Painting asks pdfium for a bitmap of the viewport's whole-pixel
//! size and composites it over the caller's pre-filled background; the
//! fractional edge the surface rounds up to stays background.

use super::{EngineDocument, EnginePage, RasterSurface, RenderEngine, Viewport};
use crate::error::EngineError;
use pdfium_fetch::{FetchOptions, LibrarySource};
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A bound pdfium library.
pub struct PdfiumEngine {
    pdfium: Pdfium,
    library: PathBuf,
    source: LibrarySource,
}

impl PdfiumEngine {
    /// Locate the library (downloading it on first use), then bind to it.
    ///
    /// Blocking; call from `spawn_blocking`.
    pub fn load(options: &FetchOptions) -> Result<Self, EngineError> {
        let located = pdfium_fetch::locate_library(options)?;
        let pdfium = pdfium_fetch::bind(&located.path)?;
        info!(
            library = %located.path.display(),
            source = ?located.source,
            "pdfium worker library configured"
        );
        Ok(Self {
            pdfium,
            library: located.path,
            source: located.source,
        })
    }

    /// The shared library this engine is bound to.
    pub fn library_path(&self) -> &Path {
        &self.library
    }

    pub fn library_source(&self) -> LibrarySource {
        self.source
    }
}

impl RenderEngine for PdfiumEngine {
    fn open_document<'a>(
        &'a self,
        bytes: &'a [u8],
    ) -> Result<Box<dyn EngineDocument + 'a>, EngineError> {
        let document = self
            .pdfium
            .load_pdf_from_byte_slice(bytes, None)
            .map_err(|e| EngineError::new(format!("{e:?}")))?;
        debug!(bytes = bytes.len(), pages = document.pages().len(), "PDF loaded");
        Ok(Box::new(PdfiumDocument { document }))
    }
}

struct PdfiumDocument<'a> {
    document: PdfDocument<'a>,
}

impl EngineDocument for PdfiumDocument<'_> {
    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    fn page(&self, index: usize) -> Result<Box<dyn EnginePage + '_>, EngineError> {
        let index = PdfPageIndex::try_from(index)
            .map_err(|_| EngineError::new(format!("page index {index} out of range")))?;
        let page = self
            .document
            .pages()
            .get(index)
            .map_err(|e| EngineError::new(format!("{e:?}")))?;
        Ok(Box::new(PdfiumPage { page }))
    }
}

struct PdfiumPage<'a> {
    page: PdfPage<'a>,
}

impl EnginePage for PdfiumPage<'_> {
    fn viewport(&self, scale: f64) -> Viewport {
        Viewport::new(
            f64::from(self.page.width().value) * scale,
            f64::from(self.page.height().value) * scale,
        )
    }

    fn paint(&self, surface: &mut RasterSurface, viewport: &Viewport) -> Result<(), EngineError> {
        let (width, height) = render_target(viewport, surface.width(), surface.height())?;
        let smooth = surface.smoothing();

        let config = PdfRenderConfig::new()
            .set_target_width(width)
            .set_target_height(height)
            .set_text_smoothing(smooth)
            .set_image_smoothing(smooth)
            .set_path_smoothing(smooth);

        let bitmap = self
            .page
            .render_with_config(&config)
            .map_err(|e| EngineError::new(format!("{e:?}")))?;

        let layer = bitmap.as_image().into_rgba8();
        debug!(
            viewport_width = viewport.width(),
            viewport_height = viewport.height(),
            px_width = layer.width(),
            px_height = layer.height(),
            "page painted"
        );
        surface.draw(&layer);
        Ok(())
    }
}

/// Bitmap size for `viewport`: whole pixels, truncated, never larger than the
/// surface and never empty.
fn render_target(
    viewport: &Viewport,
    surface_width: u32,
    surface_height: u32,
) -> Result<(i32, i32), EngineError> {
    let axis = |v: f64, limit: u32, name: &str| {
        let px = v.floor().clamp(1.0, f64::from(limit.max(1)));
        i32::try_from(px as u32)
            .map_err(|_| EngineError::new(format!("surface too {name} for pdfium")))
    };
    Ok((
        axis(viewport.width(), surface_width, "wide")?,
        axis(viewport.height(), surface_height, "tall")?,
    ))
}
