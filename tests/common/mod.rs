//! Shared fixtures for the integration tests: an in-memory render engine
//! and loaders that count how often they initialise.

#![allow(dead_code)]

use edgequake_pdf2img::engine::{
    EngineDocument, EngineLoader, EnginePage, RasterSurface, RenderEngine, SharedEngine, Viewport,
};
use edgequake_pdf2img::{EngineError, InputFile};
use image::{Rgba, RgbaImage};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};
use std::time::Duration;

pub const INK: Rgba<u8> = Rgba([20, 40, 60, 255]);

/// Bytes containing this marker open fine but fail to paint.
pub const PAINT_FAIL: &[u8] = b"PAINT-FAIL";

/// Engine whose documents all have the same page sizes.
///
/// Opening fails unless the bytes start with `%PDF`. Painting inks the
/// left half of the surface and leaves the rest untouched; it fails if the
/// surface did not request smoothing.
pub struct FakeEngine {
    pages: Vec<(f64, f64)>,
    opens: AtomicUsize,
}

impl FakeEngine {
    pub fn new(pages: Vec<(f64, f64)>) -> Self {
        Self {
            pages,
            opens: AtomicUsize::new(0),
        }
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

impl RenderEngine for FakeEngine {
    fn open_document<'a>(
        &'a self,
        bytes: &'a [u8],
    ) -> Result<Box<dyn EngineDocument + 'a>, EngineError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        if !bytes.starts_with(b"%PDF") {
            return Err(EngineError::new("Invalid PDF structure"));
        }
        Ok(Box::new(FakeDocument {
            pages: &self.pages,
            paint_fails: bytes.windows(PAINT_FAIL.len()).any(|w| w == PAINT_FAIL),
        }))
    }
}

struct FakeDocument<'a> {
    pages: &'a [(f64, f64)],
    paint_fails: bool,
}

impl EngineDocument for FakeDocument<'_> {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page(&self, index: usize) -> Result<Box<dyn EnginePage + '_>, EngineError> {
        match self.pages.get(index) {
            Some(&(width, height)) => Ok(Box::new(FakePage {
                width,
                height,
                paint_fails: self.paint_fails,
            })),
            None => Err(EngineError::new(format!("no page {index}"))),
        }
    }
}

struct FakePage {
    width: f64,
    height: f64,
    paint_fails: bool,
}

impl EnginePage for FakePage {
    fn viewport(&self, scale: f64) -> Viewport {
        Viewport::new(self.width * scale, self.height * scale)
    }

    fn paint(&self, surface: &mut RasterSurface, _viewport: &Viewport) -> Result<(), EngineError> {
        if self.paint_fails {
            return Err(EngineError::new("canvas exploded"));
        }
        if !surface.smoothing() {
            return Err(EngineError::new("smoothing not requested"));
        }
        let half = (surface.width() / 2).max(1);
        surface.draw(&RgbaImage::from_pixel(half, surface.height(), INK));
        Ok(())
    }
}

/// A loader serving `engine`, plus a counter of initialisations.
pub fn loader_for(engine: Arc<FakeEngine>) -> (Arc<EngineLoader>, Arc<AtomicUsize>) {
    let inits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&inits);
    let loader = EngineLoader::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        let engine = Arc::clone(&engine);
        async move {
            tokio::time::sleep(Duration::from_millis(25)).await;
            Ok::<_, EngineError>(engine as SharedEngine)
        }
    });
    (Arc::new(loader), inits)
}

/// A loader that always fails, plus a counter of initialisations.
pub fn failing_loader(message: &'static str) -> (Arc<EngineLoader>, Arc<AtomicUsize>) {
    let inits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&inits);
    let loader = EngineLoader::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        async move { Err::<SharedEngine, _>(EngineError::new(message)) }
    });
    (Arc::new(loader), inits)
}

pub fn pdf(name: &str) -> InputFile {
    InputFile::from_bytes(name, "application/pdf", b"%PDF-1.7 fake".to_vec())
}

pub fn pdf_with(name: &str, bytes: &[u8]) -> InputFile {
    InputFile::from_bytes(name, "application/pdf", bytes.to_vec())
}

/// Route `tracing` output through the test harness once per binary.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}
