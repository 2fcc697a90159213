//! Conversion facade: one input file in, one [`ConversionResult`] out.
//!
//! [`Converter::convert`] never returns an error. Every pipeline failure is
//! mapped to [`ConversionResult::Failure`] here and nowhere else, so callers
//! get a single shape to render whatever happened.
//!
//! ```text
//! InputFile
//!  │
//!  ├─ 1. Validate  name/type sniff; rejects before any engine work
//!  ├─ 2. Read      lazily materialise the bytes
//!  ├─ 3. Render    acquire engine, plan scale, paint page 1 on white
//!  ├─ 4. Encode    PNG
//!  └─ 5. Publish   name the artifact, register a locator
//! ```

use crate::config::RasterConfig;
use crate::engine::EngineLoader;
use crate::error::Pdf2ImgError;
use crate::locator::{ImageLocator, LocatorRegistry};
use crate::output::{ConversionResult, ImageArtifact};
use crate::pipeline::encode::{PNG_EXTENSION, PNG_MIME};
use crate::pipeline::input::{output_name, InputFile};
use crate::pipeline::render::PageRasterizer;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// Converts PDFs to first-page PNG previews.
///
/// Cheap to share behind an `Arc`; all state (engine, locators) is
/// internally synchronised.
#[derive(Debug)]
pub struct Converter {
    config: RasterConfig,
    rasterizer: PageRasterizer,
    registry: Arc<LocatorRegistry>,
}

impl Converter {
    /// A converter backed by pdfium, located and bound on first use.
    pub fn new(config: RasterConfig) -> Self {
        let loader = Arc::new(EngineLoader::pdfium(&config));
        Self::with_loader(config, loader, Arc::new(LocatorRegistry::new()))
    }

    /// A converter using an existing engine loader and locator registry.
    ///
    /// Several converters built over the same loader share one engine.
    pub fn with_loader(
        config: RasterConfig,
        loader: Arc<EngineLoader>,
        registry: Arc<LocatorRegistry>,
    ) -> Self {
        Self {
            config,
            rasterizer: PageRasterizer::new(loader),
            registry,
        }
    }

    pub fn config(&self) -> &RasterConfig {
        &self.config
    }

    pub fn loader(&self) -> &Arc<EngineLoader> {
        self.rasterizer.loader()
    }

    pub fn registry(&self) -> &Arc<LocatorRegistry> {
        &self.registry
    }

    /// Release a locator handed out by [`Converter::convert`].
    pub fn revoke(&self, locator: &ImageLocator) -> bool {
        self.registry.revoke(locator)
    }

    /// Convert the first page of `file` to PNG.
    pub async fn convert(&self, file: InputFile) -> ConversionResult {
        let name = file.name().to_string();
        let start = Instant::now();
        match self.try_convert(file).await {
            Ok(result) => {
                let elapsed_ms = start.elapsed().as_millis() as u64;
                debug!(file = %name, elapsed_ms, "conversion finished");
                result
            }
            Err(e) => {
                error!(file = %name, error = %e, "conversion failed");
                ConversionResult::from_error(&e)
            }
        }
    }

    /// Synchronous wrapper around [`Converter::convert`].
    ///
    /// Creates a temporary tokio runtime internally. Called from inside a
    /// runtime it returns a failure instead of blocking that runtime.
    pub fn convert_blocking(&self, file: InputFile) -> ConversionResult {
        if tokio::runtime::Handle::try_current().is_ok() {
            return ConversionResult::from_error(&Pdf2ImgError::Internal(
                "convert_blocking called inside an async runtime; use convert().await".into(),
            ));
        }
        match tokio::runtime::Runtime::new() {
            Ok(rt) => rt.block_on(self.convert(file)),
            Err(e) => ConversionResult::from_error(&Pdf2ImgError::Internal(format!(
                "Failed to create tokio runtime: {e}"
            ))),
        }
    }

    async fn try_convert(&self, file: InputFile) -> Result<ConversionResult, Pdf2ImgError> {
        // ── Step 1: Validate ────────────────────────────────────────────────
        if !file.looks_like_pdf() {
            return Err(Pdf2ImgError::InvalidInput {
                name: file.name().to_string(),
                declared_type: file.declared_type().to_string(),
            });
        }
        let name = output_name(file.name(), PNG_EXTENSION);

        // ── Step 2: Read ────────────────────────────────────────────────────
        let bytes = file.into_bytes().await?;

        // ── Steps 3-4: Render + encode ──────────────────────────────────────
        let page = self
            .rasterizer
            .rasterize_first_page(
                bytes,
                self.config.pixel_budget,
                self.config.resolved_density(),
            )
            .await?;

        // ── Step 5: Publish ─────────────────────────────────────────────────
        let artifact = ImageArtifact::new(name, PNG_MIME, page.png, page.width, page.height);
        let image_locator = self.registry.register(artifact.shared_bytes());
        info!(
            output = artifact.name(),
            width = artifact.width(),
            height = artifact.height(),
            bytes = artifact.size(),
            locator = %image_locator,
            "PDF converted"
        );

        Ok(ConversionResult::Success {
            image_locator,
            artifact,
        })
    }
}
