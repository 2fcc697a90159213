//! The rendering-engine boundary.
//!
//! The pipeline never talks to pdfium directly. It sees three small traits
//! that mirror what any page-description engine offers:
//!
//! ```text
//! RenderEngine ──open_document(bytes)──▶ EngineDocument ──page(i)──▶ EnginePage
//!                                                               ├─ viewport(scale)
//!                                                               └─ paint(surface, viewport)
//! ```
//!
//! [`pdfium::PdfiumEngine`] is the production adapter; tests plug in
//! in-memory engines. [`EngineLoader`] owns the lazily-created, shared
//! engine instance.
//!
//! Every engine call blocks, so the pipeline drives them from
//! `tokio::task::spawn_blocking`. A document and its pages stay on that one
//! blocking thread; only the engine itself is shared, hence the
//! `Send + Sync` bound on [`RenderEngine`] alone.

pub mod loader;
pub mod pdfium;

pub use loader::EngineLoader;

use crate::error::EngineError;
use image::{imageops, Rgba, RgbaImage};
use std::sync::Arc;

/// An engine handle shared by every conversion.
pub type SharedEngine = Arc<dyn RenderEngine>;

/// Opaque white, the background every surface is filled with before painting.
pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Parses documents. One instance serves the whole process.
pub trait RenderEngine: Send + Sync {
    /// Parse `bytes` into a document that borrows them.
    fn open_document<'a>(
        &'a self,
        bytes: &'a [u8],
    ) -> Result<Box<dyn EngineDocument + 'a>, EngineError>;
}

/// A parsed document, owned by the conversion that opened it.
pub trait EngineDocument {
    fn page_count(&self) -> usize;

    /// Fetch a page by 0-based index.
    fn page(&self, index: usize) -> Result<Box<dyn EnginePage + '_>, EngineError>;
}

/// One page of a document.
pub trait EnginePage {
    /// Page geometry at `scale`. Scale 1.0 is the natural viewport.
    fn viewport(&self, scale: f64) -> Viewport;

    fn natural_viewport(&self) -> Viewport {
        self.viewport(1.0)
    }

    /// Paint the page onto `surface`, fitted to `viewport`.
    fn paint(&self, surface: &mut RasterSurface, viewport: &Viewport) -> Result<(), EngineError>;
}

/// Page size in device-independent units at some scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    width: f64,
    height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }
}

/// Off-screen RGBA drawing target the caller allocates and engines paint on.
///
/// Starts fully transparent; the pipeline fills it with [`WHITE`] before
/// handing it to an engine, since a page need not cover every pixel.
#[derive(Debug, Clone)]
pub struct RasterSurface {
    pixels: RgbaImage,
    smoothing: bool,
}

impl RasterSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::new(width, height),
            smoothing: false,
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn fill(&mut self, color: Rgba<u8>) {
        for px in self.pixels.pixels_mut() {
            *px = color;
        }
    }

    /// Request anti-aliased text, image and path rendering. Engines that
    /// cannot honour it ignore the flag.
    pub fn set_smoothing(&mut self, enabled: bool) {
        self.smoothing = enabled;
    }

    pub fn smoothing(&self) -> bool {
        self.smoothing
    }

    /// Alpha-composite `layer` over the surface, anchored at the top-left.
    /// Anything past the surface edge is clipped.
    pub fn draw(&mut self, layer: &RgbaImage) {
        imageops::overlay(&mut self.pixels, layer, 0, 0);
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn into_image(self) -> RgbaImage {
        self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_surface_is_transparent_until_filled() {
        let mut s = RasterSurface::new(3, 2);
        assert_eq!(s.pixels().get_pixel(0, 0)[3], 0);

        s.fill(WHITE);
        assert!(s.pixels().pixels().all(|p| *p == WHITE));
    }

    #[test]
    fn draw_keeps_background_where_layer_is_transparent() {
        let mut s = RasterSurface::new(4, 4);
        s.fill(WHITE);

        let mut layer = RgbaImage::new(4, 4);
        layer.put_pixel(1, 1, Rgba([0, 0, 0, 255]));
        s.draw(&layer);

        assert_eq!(*s.pixels().get_pixel(1, 1), Rgba([0, 0, 0, 255]));
        assert_eq!(*s.pixels().get_pixel(3, 3), WHITE);
    }

    #[test]
    fn oversized_layer_is_clipped() {
        let mut s = RasterSurface::new(2, 2);
        s.draw(&RgbaImage::from_pixel(10, 10, Rgba([9, 9, 9, 255])));
        assert_eq!(s.width(), 2);
        assert_eq!(*s.pixels().get_pixel(1, 1), Rgba([9, 9, 9, 255]));
    }

    #[test]
    fn smoothing_defaults_off() {
        let mut s = RasterSurface::new(1, 1);
        assert!(!s.smoothing());
        s.set_smoothing(true);
        assert!(s.smoothing());
    }
}
