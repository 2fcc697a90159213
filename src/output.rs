//! Conversion results.
//!
//! [`ConversionResult`] is the one value every conversion produces: success
//! carries the named artifact plus a locator for it, failure carries a
//! human-readable message. It serialises with a `status` tag so it can be
//! handed straight to a UI or written to a job log.

use crate::error::Pdf2ImgError;
use crate::locator::ImageLocator;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Serialize;
use std::sync::Arc;

/// A produced image: bytes plus naming and type metadata.
#[derive(Debug, Clone, Serialize)]
pub struct ImageArtifact {
    name: String,
    mime_type: String,
    #[serde(skip)]
    bytes: Arc<[u8]>,
    size: usize,
    width: u32,
    height: u32,
}

impl ImageArtifact {
    pub fn new(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
        width: u32,
        height: u32,
    ) -> Self {
        let bytes = bytes.into();
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size: bytes.len(),
            bytes,
            width,
            height,
        }
    }

    /// Output filename, e.g. `report.png`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The same buffer the locator registry holds.
    pub fn shared_bytes(&self) -> Arc<[u8]> {
        Arc::clone(&self.bytes)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Raster width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Raster height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `data:<mime>;base64,<payload>`, for embedding without a locator.
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.bytes))
    }
}

/// Outcome of one conversion.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConversionResult {
    Success {
        image_locator: ImageLocator,
        artifact: ImageArtifact,
    },
    Failure {
        message: String,
    },
}

impl ConversionResult {
    /// Map a pipeline error to its user-facing message.
    ///
    /// Input rejection keeps its own message; every other failure is
    /// prefixed with `Failed to convert PDF: `.
    pub fn from_error(error: &Pdf2ImgError) -> Self {
        let message = match error {
            Pdf2ImgError::InvalidInput { .. } => error.to_string(),
            other => format!("Failed to convert PDF: {other}"),
        };
        Self::Failure { message }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn artifact(&self) -> Option<&ImageArtifact> {
        match self {
            Self::Success { artifact, .. } => Some(artifact),
            Self::Failure { .. } => None,
        }
    }

    pub fn image_locator(&self) -> Option<&ImageLocator> {
        match self {
            Self::Success { image_locator, .. } => Some(image_locator),
            Self::Failure { .. } => None,
        }
    }

    /// The failure message, if any.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { message } => Some(message),
        }
    }

    /// `Ok((locator, artifact))` or `Err(message)`.
    pub fn into_result(self) -> Result<(ImageLocator, ImageArtifact), String> {
        match self {
            Self::Success {
                image_locator,
                artifact,
            } => Ok((image_locator, artifact)),
            Self::Failure { message } => Err(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::locator::LocatorRegistry;

    fn artifact() -> ImageArtifact {
        ImageArtifact::new("a.png", "image/png", vec![1u8, 2, 3], 4, 5)
    }

    #[test]
    fn size_tracks_bytes() {
        let a = artifact();
        assert_eq!(a.size(), 3);
        assert_eq!(a.bytes(), &[1, 2, 3]);
        assert_eq!((a.width(), a.height()), (4, 5));
    }

    #[test]
    fn data_uri_embeds_mime_and_payload() {
        assert_eq!(artifact().data_uri(), "data:image/png;base64,AQID");
    }

    #[test]
    fn failure_messages() {
        let invalid = ConversionResult::from_error(&Pdf2ImgError::InvalidInput {
            name: "x.txt".into(),
            declared_type: "text/plain".into(),
        });
        assert_eq!(invalid.error(), Some("File is not a PDF"));

        let parse = ConversionResult::from_error(&Pdf2ImgError::DocumentParse {
            cause: EngineError::new("bad xref"),
        });
        assert_eq!(
            parse.error(),
            Some("Failed to convert PDF: Could not parse PDF: bad xref")
        );
        assert!(parse.artifact().is_none());
        assert!(parse.image_locator().is_none());
    }

    #[test]
    fn serializes_with_status_tag() {
        let reg = LocatorRegistry::new();
        let a = artifact();
        let loc = reg.register(a.shared_bytes());
        let ok = ConversionResult::Success {
            image_locator: loc.clone(),
            artifact: a,
        };
        let v = serde_json::to_value(&ok).unwrap();
        assert_eq!(v["status"], "success");
        assert_eq!(v["image_locator"], loc.as_str());
        assert_eq!(v["artifact"]["name"], "a.png");
        assert_eq!(v["artifact"]["size"], 3);
        assert!(v["artifact"].get("bytes").is_none());

        let err = ConversionResult::Failure {
            message: "File is not a PDF".into(),
        };
        let v = serde_json::to_value(&err).unwrap();
        assert_eq!(v["status"], "failure");
        assert_eq!(v["message"], "File is not a PDF");
    }

    #[test]
    fn into_result_splits_variants() {
        let (_, a) = ConversionResult::Success {
            image_locator: LocatorRegistry::new().register(Arc::from(&b""[..])),
            artifact: artifact(),
        }
        .into_result()
        .unwrap();
        assert_eq!(a.name(), "a.png");
        assert!(ConversionResult::Failure {
            message: "m".into()
        }
        .into_result()
        .is_err());
    }
}
