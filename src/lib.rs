//! # edgequake-pdf2img
//!
//! Render the first page of a PDF to a PNG preview.
//!
//! ## Why this crate?
//!
//! Thumbnailing a PDF means parsing it, choosing a resolution, painting the
//! page and encoding the pixels, and a PDF engine is heavy to start. This
//! crate wraps those steps behind one call that never throws: you get
//! either a named PNG with a locator or a message fit to show a user.
//!
//! ## Pipeline Overview
//!
//! ```text
//! InputFile
//!  │
//!  ├─ 1. Validate  name ends in .pdf or declared type mentions pdf
//!  ├─ 2. Engine    pdfium, fetched and bound once per process (spawn_blocking)
//!  ├─ 3. Scale     sqrt(budget / page area), clamped, × density
//!  ├─ 4. Paint     page 1 onto a white RGBA surface
//!  ├─ 5. Encode    PNG, best compression
//!  └─ 6. Output    <name>.png + locator, or a failure message
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_pdf2img::{Converter, InputFile, RasterConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let converter = Converter::new(RasterConfig::from_env()?);
//!     let result = converter.convert(InputFile::from_path("report.pdf")).await;
//!     match result.into_result() {
//!         Ok((locator, artifact)) => {
//!             std::fs::write(artifact.name(), artifact.bytes())?;
//!             eprintln!("{} ({} bytes) at {locator}", artifact.name(), artifact.size());
//!         }
//!         Err(message) => eprintln!("{message}"),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## The pdfium library
//!
//! The first conversion locates a pdfium shared library: `PDFIUM_LIB_PATH`
//! if set, else the user cache, else a one-time download into the cache
//! (see the `pdfium-fetch` crate). Concurrent first conversions wait on the
//! same initialisation.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod engine;
pub mod error;
pub mod locator;
pub mod output;
pub mod pipeline;
pub mod stream;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{RasterConfig, RasterConfigBuilder, DEFAULT_PIXEL_BUDGET};
pub use convert::Converter;
pub use engine::{EngineLoader, RenderEngine, SharedEngine};
pub use error::{EngineError, Pdf2ImgError};
pub use locator::{ImageLocator, LocatorRegistry};
pub use output::{ConversionResult, ImageArtifact};
pub use pipeline::input::InputFile;
pub use pipeline::scale::plan_scale;
pub use stream::{convert_stream, ConversionStream};
