//! Image encoding: `RgbaImage` → PNG bytes.
//!
//! PNG is lossless, so text edges survive exactly as rasterised. The
//! encoder runs at its highest compression level with adaptive filtering;
//! output is a little slower to produce but noticeably smaller for
//! page-like content (large flat regions, sharp glyphs).

use crate::error::Pdf2ImgError;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder, RgbaImage};
use tracing::debug;

/// MIME type of every artifact this crate produces.
pub const PNG_MIME: &str = "image/png";

/// Filename extension for [`PNG_MIME`] artifacts.
pub const PNG_EXTENSION: &str = "png";

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Encode a finished surface as PNG.
///
/// ## Errors
/// [`Pdf2ImgError::EncodeFailed`] if the encoder rejects the image or
/// produces nothing.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, Pdf2ImgError> {
    let mut buf = Vec::new();
    PngEncoder::new_with_quality(&mut buf, CompressionType::Best, FilterType::Adaptive)
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            ExtendedColorType::Rgba8,
        )
        .map_err(|e| Pdf2ImgError::EncodeFailed {
            detail: e.to_string(),
        })?;

    if buf.is_empty() {
        return Err(Pdf2ImgError::EncodeFailed {
            detail: "encoder produced no output".to_string(),
        });
    }

    debug!(
        width = image.width(),
        height = image.height(),
        bytes = buf.len(),
        "page encoded as PNG"
    );
    Ok(buf)
}

/// Cheap check that `bytes` start with the PNG signature.
pub fn is_png(bytes: &[u8]) -> bool {
    bytes.starts_with(&PNG_SIGNATURE)
}
