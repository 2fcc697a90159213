//! First-page rasterisation.
//!
//! ## Why spawn_blocking?
//!
//! Every engine call is synchronous and CPU-bound. Opening the document,
//! painting and PNG encoding all run in one `spawn_blocking` closure, so the
//! document and its pages never leave the thread that created them and the
//! Tokio workers never stall on a large page.
//!
//! ## Surface geometry
//!
//! The surface is `ceil(viewport)` pixels on each axis at the planned scale,
//! filled opaque white before the engine paints. A page that does not cover
//! every pixel therefore leaves white, not transparency, in the output.

use crate::engine::{EngineLoader, RasterSurface, RenderEngine, Viewport, WHITE};
use crate::error::Pdf2ImgError;
use crate::pipeline::encode::encode_png;
use crate::pipeline::scale::plan_scale;
use image::RgbaImage;
use std::sync::Arc;
use tracing::{debug, info};

/// The outcome of rasterising one page.
#[derive(Debug, Clone)]
pub struct RasterizedPage {
    /// Surface width in pixels.
    pub width: u32,
    /// Surface height in pixels.
    pub height: u32,
    /// Scale the page was rendered at.
    pub scale: f64,
    /// Page geometry at scale 1.0.
    pub natural: Viewport,
    /// Final pixels, background included.
    pub image: RgbaImage,
    /// `image` encoded as PNG.
    pub png: Vec<u8>,
}

/// Turns PDF bytes into a PNG of their first page.
#[derive(Debug, Clone)]
pub struct PageRasterizer {
    loader: Arc<EngineLoader>,
}

impl PageRasterizer {
    pub fn new(loader: Arc<EngineLoader>) -> Self {
        Self { loader }
    }

    pub fn loader(&self) -> &Arc<EngineLoader> {
        &self.loader
    }

    /// Rasterise page 1 of `bytes` within `pixel_budget`, adjusted by
    /// `density_hint` (see [`plan_scale`]).
    pub async fn rasterize_first_page(
        &self,
        bytes: Vec<u8>,
        pixel_budget: f64,
        density_hint: f64,
    ) -> Result<RasterizedPage, Pdf2ImgError> {
        let engine = self
            .loader
            .acquire()
            .await
            .map_err(|cause| Pdf2ImgError::EngineUnavailable { cause })?;

        tokio::task::spawn_blocking(move || {
            rasterize_blocking(&*engine, &bytes, pixel_budget, density_hint)
        })
        .await
        .map_err(|e| Pdf2ImgError::Internal(format!("Render task panicked: {e}")))?
    }
}

/// Blocking implementation of [`PageRasterizer::rasterize_first_page`].
pub fn rasterize_blocking(
    engine: &dyn RenderEngine,
    bytes: &[u8],
    pixel_budget: f64,
    density_hint: f64,
) -> Result<RasterizedPage, Pdf2ImgError> {
    let (surface, scale, natural) = paint_first_page(engine, bytes, pixel_budget, density_hint)?;
    let image = surface.into_image();
    let png = encode_png(&image)?;
    info!(
        width = image.width(),
        height = image.height(),
        scale,
        bytes = png.len(),
        "page rasterised"
    );
    Ok(RasterizedPage {
        width: image.width(),
        height: image.height(),
        scale,
        natural,
        image,
        png,
    })
}

fn paint_first_page(
    engine: &dyn RenderEngine,
    bytes: &[u8],
    pixel_budget: f64,
    density_hint: f64,
) -> Result<(RasterSurface, f64, Viewport), Pdf2ImgError> {
    let document = engine
        .open_document(bytes)
        .map_err(|cause| Pdf2ImgError::DocumentParse { cause })?;

    let total = document.page_count();
    if total == 0 {
        return Err(Pdf2ImgError::PageNotFound { page: 1, total: 0 });
    }
    let page = document
        .page(0)
        .map_err(|cause| Pdf2ImgError::DocumentParse { cause })?;

    let natural = page.natural_viewport();
    let scale = plan_scale(natural.width(), natural.height(), pixel_budget, density_hint);
    let viewport = page.viewport(scale);
    let (width, height) = surface_size(&viewport, scale)?;
    debug!(
        pages = total,
        natural_width = natural.width(),
        natural_height = natural.height(),
        scale,
        width,
        height,
        "surface planned"
    );

    let mut surface = RasterSurface::new(width, height);
    surface.fill(WHITE);
    surface.set_smoothing(true);
    page.paint(&mut surface, &viewport).map_err(|cause| Pdf2ImgError::RenderFailed { cause })?;

    Ok((surface, scale, natural))
}

/// Whole-pixel surface dimensions for `viewport`, rounding up.
fn surface_size(viewport: &Viewport, scale: f64) -> Result<(u32, u32), Pdf2ImgError> {
    let geometry = || Pdf2ImgError::Geometry {
        width: viewport.width(),
        height: viewport.height(),
        scale,
    };
    let axis = |v: f64| {
        let px = v.ceil();
        if px.is_finite() && px >= 1.0 && px <= f64::from(u32::MAX) {
            Some(px as u32)
        } else {
            None
        }
    };
    let width = axis(viewport.width()).ok_or_else(geometry)?;
    let height = axis(viewport.height()).ok_or_else(geometry)?;

    // The RGBA buffer must be addressable.
    u64::from(width)
        .checked_mul(u64::from(height))
        .and_then(|px| px.checked_mul(4))
        .and_then(|len| usize::try_from(len).ok())
        .filter(|len| isize::try_from(*len).is_ok())
        .ok_or_else(geometry)?;

    Ok((width, height))
}
