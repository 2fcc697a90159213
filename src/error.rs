//! Error types for the edgequake-pdf2img library.
//!
//! Two error types for two layers:
//!
//! * [`EngineError`]: what an engine adapter reports. It is a cloneable
//!   message so one failed engine initialization can be handed to every
//!   caller that was waiting on it.
//!
//! * [`Pdf2ImgError`]: the typed failure of a pipeline stage. The
//!   [`crate::convert::Converter`] facade is the only place these are turned
//!   into a user-facing [`crate::output::ConversionResult::Failure`].

use std::path::PathBuf;
use thiserror::Error;

/// Failure reported by a [`crate::engine::RenderEngine`] implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct EngineError {
    pub message: String,
}

impl EngineError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<pdfium_fetch::FetchError> for EngineError {
    fn from(e: pdfium_fetch::FetchError) -> Self {
        Self::new(e.to_string())
    }
}

/// All failures of the rasterisation pipeline.
#[derive(Debug, Error)]
pub enum Pdf2ImgError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Neither the declared content type nor the file name says PDF.
    #[error("File is not a PDF")]
    InvalidInput { name: String, declared_type: String },

    /// The lazily-read input bytes could not be read.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Engine errors ─────────────────────────────────────────────────────
    /// The rendering engine could not be initialised.
    #[error("PDF engine unavailable: {cause}")]
    EngineUnavailable { cause: EngineError },

    /// The document bytes could not be parsed.
    #[error("Could not parse PDF: {cause}")]
    DocumentParse { cause: EngineError },

    /// The document has no page at the requested index.
    #[error("PDF has no page {page} (document has {total} pages)")]
    PageNotFound { page: usize, total: usize },

    /// The planned surface has no drawable area.
    #[error("Invalid raster geometry: {width}x{height} at scale {scale}")]
    Geometry { width: f64, height: f64, scale: f64 },

    /// The engine failed while painting the page.
    #[error("Page rendering failed: {cause}")]
    RenderFailed { cause: EngineError },

    // ── Output errors ─────────────────────────────────────────────────────
    /// The surface could not be encoded, or encoding produced no bytes.
    #[error("Failed to encode image: {detail}")]
    EncodeFailed { detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// A blocking task panicked or was cancelled.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_input_message_is_fixed() {
        let e = Pdf2ImgError::InvalidInput {
            name: "report.txt".into(),
            declared_type: "text/plain".into(),
        };
        assert_eq!(e.to_string(), "File is not a PDF");
    }

    #[test]
    fn engine_causes_are_carried_into_display() {
        let e = Pdf2ImgError::DocumentParse {
            cause: EngineError::new("trailer not found"),
        };
        assert!(e.to_string().contains("trailer not found"), "got: {e}");

        let e = Pdf2ImgError::EngineUnavailable {
            cause: EngineError::new("bind failed"),
        };
        assert!(e.to_string().contains("bind failed"));
    }

    #[test]
    fn page_not_found_display() {
        let e = Pdf2ImgError::PageNotFound { page: 1, total: 0 };
        let msg = e.to_string();
        assert!(msg.contains("page 1"), "got: {msg}");
        assert!(msg.contains("0 pages"), "got: {msg}");
    }

    #[test]
    fn fetch_error_converts_to_engine_error() {
        let fetch = pdfium_fetch::FetchError::Download("HTTP 404".into());
        let e: EngineError = fetch.into();
        assert!(e.message.contains("HTTP 404"));
    }
}
