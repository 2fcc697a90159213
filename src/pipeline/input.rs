//! Input files: what the caller hands us, and how we name the output.
//!
//! An [`InputFile`] carries a name, a declared content type and a byte
//! source that is only read after the cheap name/type sniff has passed, so
//! a rejected upload never costs a disk read or an engine start.

use crate::error::Pdf2ImgError;
use std::path::{Path, PathBuf};
use tracing::debug;

const PDF_SUFFIX: &str = ".pdf";

/// Where an input's bytes come from.
#[derive(Debug, Clone)]
pub enum ByteSource {
    /// Already in memory.
    Memory(Vec<u8>),
    /// Read from disk on demand.
    Path(PathBuf),
}

/// A file-like input: `{name, declared type, lazily-readable bytes}`.
#[derive(Debug, Clone)]
pub struct InputFile {
    name: String,
    declared_type: String,
    source: ByteSource,
}

impl InputFile {
    pub fn from_bytes(
        name: impl Into<String>,
        declared_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
            source: ByteSource::Memory(bytes),
        }
    }

    /// An input backed by a file on disk. The declared type is guessed from
    /// the extension the way a browser file picker would.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            declared_type: content_type_for(&name).to_string(),
            name,
            source: ByteSource::Path(path.to_path_buf()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declared_type(&self) -> &str {
        &self.declared_type
    }

    pub fn source(&self) -> &ByteSource {
        &self.source
    }

    /// Name/type sniff. Does not look at the bytes.
    pub fn looks_like_pdf(&self) -> bool {
        is_pdf_like(&self.name, &self.declared_type)
    }

    /// Consume the input and produce its bytes.
    pub async fn into_bytes(self) -> Result<Vec<u8>, Pdf2ImgError> {
        match self.source {
            ByteSource::Memory(bytes) => Ok(bytes),
            ByteSource::Path(path) => {
                let bytes = tokio::fs::read(&path)
                    .await
                    .map_err(|source| Pdf2ImgError::ReadFailed {
                        path: path.clone(),
                        source,
                    })?;
                debug!(path = %path.display(), bytes = bytes.len(), "input read");
                Ok(bytes)
            }
        }
    }
}

/// True when the declared type contains `pdf` or the name ends in `.pdf`.
///
/// The name suffix is matched case-insensitively; the declared type is
/// matched as given, so `application/PDF` alone does not qualify.
pub fn is_pdf_like(name: &str, declared_type: &str) -> bool {
    declared_type.contains("pdf") || has_pdf_suffix(name)
}

fn has_pdf_suffix(name: &str) -> bool {
    pdf_stem(name).is_some()
}

/// `name` without a trailing, case-insensitive `.pdf`.
fn pdf_stem(name: &str) -> Option<&str> {
    let split = name.len().checked_sub(PDF_SUFFIX.len())?;
    if !name.is_char_boundary(split) {
        return None;
    }
    let (stem, suffix) = name.split_at(split);
    suffix.eq_ignore_ascii_case(PDF_SUFFIX).then_some(stem)
}

/// Output filename: the input name with any trailing `.pdf` removed and
/// `extension` appended.
pub fn output_name(input_name: &str, extension: &str) -> String {
    let stem = pdf_stem(input_name).unwrap_or(input_name);
    format!("{stem}.{extension}")
}

fn content_type_for(name: &str) -> &'static str {
    if has_pdf_suffix(name) {
        "application/pdf"
    } else {
        "application/octet-stream"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniff_accepts_type_or_extension() {
        assert!(is_pdf_like("report.pdf", ""));
        assert!(is_pdf_like("REPORT.PDF", "application/octet-stream"));
        assert!(is_pdf_like("scan", "application/pdf"));
        assert!(is_pdf_like("scan.bin", "application/x-pdf"));
        assert!(!is_pdf_like("report.txt", "text/plain"));
        assert!(!is_pdf_like("pdf.txt", "text/plain"));
        assert!(!is_pdf_like("", ""));
    }

    #[test]
    fn declared_type_is_matched_case_sensitively() {
        assert!(!is_pdf_like("x.bin", "application/PDF"));
        assert!(is_pdf_like("x.PDF", "application/PDF"));
    }

    #[test]
    fn output_name_swaps_suffix_case_insensitively() {
        assert_eq!(output_name("Resume.PDF", "png"), "Resume.png");
        assert_eq!(output_name("resume.pdf", "png"), "resume.png");
        assert_eq!(output_name("a.pdf.Pdf", "png"), "a.pdf.png");
        assert_eq!(output_name("scan", "png"), "scan.png");
        assert_eq!(output_name(".pdf", "png"), ".png");
    }

    #[test]
    fn suffix_check_survives_multibyte_names() {
        assert_eq!(output_name("résumé", "png"), "résumé.png");
        assert_eq!(output_name("日本.pdf", "png"), "日本.png");
        assert!(!is_pdf_like("ü", ""));
    }

    #[test]
    fn from_path_guesses_type_from_extension() {
        let f = InputFile::from_path("/tmp/docs/Invoice.Pdf");
        assert_eq!(f.name(), "Invoice.Pdf");
        assert_eq!(f.declared_type(), "application/pdf");
        assert!(f.looks_like_pdf());

        let f = InputFile::from_path("/tmp/notes.txt");
        assert_eq!(f.declared_type(), "application/octet-stream");
        assert!(!f.looks_like_pdf());
    }

    #[tokio::test]
    async fn memory_source_returns_bytes_untouched() {
        let f = InputFile::from_bytes("a.pdf", "application/pdf", b"%PDF-1.7".to_vec());
        assert_eq!(f.into_bytes().await.unwrap(), b"%PDF-1.7");
    }

    #[tokio::test]
    async fn path_source_is_read_lazily() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("late.pdf");
        let f = InputFile::from_path(&path);

        // Written after the input was created.
        std::fs::write(&path, b"%PDF-1.4 late").unwrap();
        assert_eq!(f.into_bytes().await.unwrap(), b"%PDF-1.4 late");
    }

    #[tokio::test]
    async fn missing_file_is_a_read_error() {
        let f = InputFile::from_path("/definitely/not/here.pdf");
        let err = f.into_bytes().await.unwrap_err();
        assert!(matches!(err, Pdf2ImgError::ReadFailed { .. }), "{err:?}");
    }
}
