//! Smoke tests against a real pdfium library.
//!
//! Gated behind `PDFIUM_E2E` because the first run locates or downloads
//! pdfium. Point `PDFIUM_LIB_PATH` at an existing library to skip the
//! download.
//!
//! Run with:
//!   PDFIUM_E2E=1 cargo test --test pdfium_smoke -- --nocapture

mod common;

use edgequake_pdf2img::{ConversionResult, Converter, InputFile, RasterConfig};
use image::{ImageFormat, Rgba};

/// A one-page, 200 × 100 pt document with a filled black square in the
/// lower-left corner.
const SQUARE_PDF: &[u8] = b"%PDF-1.4
1 0 obj << /Type /Catalog /Pages 2 0 R >> endobj
2 0 obj << /Type /Pages /Kids [3 0 R] /Count 1 >> endobj
3 0 obj << /Type /Page /Parent 2 0 R /MediaBox [0 0 200 100] /Contents 4 0 R >> endobj
4 0 obj << /Length 24 >> stream
0 0 0 rg 0 0 50 50 re f
endstream endobj
trailer << /Root 1 0 R >>
%%EOF
";

macro_rules! skip_unless_enabled {
    () => {
        if std::env::var("PDFIUM_E2E").is_err() {
            println!("SKIP: set PDFIUM_E2E=1 to run pdfium smoke tests");
            return;
        }
    };
}

fn converter() -> Converter {
    let config = RasterConfig::from_env().expect("valid environment config");
    Converter::new(config)
}

#[tokio::test]
async fn renders_first_page_with_white_background() {
    skip_unless_enabled!();
    common::init_tracing();

    let converter = converter();
    let result = converter
        .convert(InputFile::from_bytes("square.pdf", "application/pdf", SQUARE_PDF.to_vec()))
        .await;

    let artifact = match &result {
        ConversionResult::Success { artifact, .. } => artifact,
        ConversionResult::Failure { message } => panic!("conversion failed: {message}"),
    };
    assert_eq!(artifact.name(), "square.png");
    // 200 × 100 pt is tiny, so scale is capped at 3.0.
    assert_eq!((artifact.width(), artifact.height()), (600, 300));

    let img = image::load_from_memory_with_format(artifact.bytes(), ImageFormat::Png)
        .unwrap()
        .into_rgba8();
    assert_eq!(*img.get_pixel(599, 0), Rgba([255, 255, 255, 255]));
    let ink = img.get_pixel(10, 290);
    assert!(ink[0] < 64 && ink[1] < 64 && ink[2] < 64, "expected ink, got {ink:?}");
    assert!(converter.loader().is_ready());
}

#[tokio::test]
async fn garbage_bytes_fail_cleanly() {
    skip_unless_enabled!();

    let result = converter()
        .convert(InputFile::from_bytes("junk.pdf", "application/pdf", b"not a pdf at all".to_vec()))
        .await;
    let message = result.error().expect("failure");
    assert!(message.starts_with("Failed to convert PDF: "), "{message}");
}
