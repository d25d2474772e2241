//! PDF text extraction via pdfium.
//!
//! ## Why spawn_blocking?
//!
//! `pdfium-render` wraps the pdfium C++ library, which keeps thread-local
//! state and blocks while it parses. Extraction runs on the blocking pool so
//! the async runtime stays responsive.
//!
//! Pages are concatenated in document order with nothing between them. Any
//! page that fails aborts the whole extraction; there is no partial result.

use crate::error::DigestError;
use pdfium_render::prelude::*;
use std::future::Future;
use std::path::PathBuf;
use tracing::{debug, info};

/// Turns PDF bytes into plain text.
pub trait TextExtractor {
    fn extract(&self, pdf: Vec<u8>) -> impl Future<Output = Result<String, DigestError>> + Send;
}

/// Production extractor backed by pdfium.
///
/// The library is located in this order:
/// 1. `PDFIUM_LIB_PATH` (a file path, or a directory containing the platform library)
/// 2. the current working directory
/// 3. the system library search path
#[derive(Debug, Clone, Default)]
pub struct PdfiumExtractor {
    lib_path: Option<PathBuf>,
}

impl PdfiumExtractor {
    /// Use `PDFIUM_LIB_PATH` when set, else the default search order.
    pub fn from_env() -> Self {
        Self {
            lib_path: std::env::var_os("PDFIUM_LIB_PATH").map(PathBuf::from),
        }
    }

    /// Bind to an explicit pdfium library (file or containing directory).
    pub fn with_library(path: impl Into<PathBuf>) -> Self {
        Self {
            lib_path: Some(path.into()),
        }
    }
}

impl TextExtractor for PdfiumExtractor {
    async fn extract(&self, pdf: Vec<u8>) -> Result<String, DigestError> {
        let lib_path = self.lib_path.clone();
        tokio::task::spawn_blocking(move || extract_text(&pdf, lib_path.as_ref()))
            .await
            .map_err(|e| DigestError::Internal(format!("Extraction task panicked: {}", e)))?
    }
}

/// Check that `bytes` starts with the `%PDF` magic.
pub fn check_pdf_magic(bytes: &[u8]) -> Result<(), DigestError> {
    if bytes.starts_with(b"%PDF") {
        Ok(())
    } else {
        Err(DigestError::NotAPdf {
            magic: bytes.iter().take(4).copied().collect(),
        })
    }
}

/// Blocking extraction: concatenate the text of every page in order.
pub fn extract_text(bytes: &[u8], lib_path: Option<&PathBuf>) -> Result<String, DigestError> {
    check_pdf_magic(bytes)?;

    let pdfium = bind_pdfium(lib_path)?;
    let document = pdfium
        .load_pdf_from_byte_slice(bytes, None)
        .map_err(|e| DigestError::CorruptPdf {
            detail: format!("{:?}", e),
        })?;

    let pages = document.pages();
    info!("PDF loaded: {} pages", pages.len());

    let mut text = String::new();
    for (idx, page) in pages.iter().enumerate() {
        let page_text = page
            .text()
            .map_err(|e| DigestError::TextExtractionFailed {
                page: idx + 1,
                detail: format!("{:?}", e),
            })?
            .all();
        debug!("Page {}: {} chars", idx + 1, page_text.len());
        text.push_str(&page_text);
    }

    Ok(text)
}

fn bind_pdfium(lib_path: Option<&PathBuf>) -> Result<Pdfium, DigestError> {
    let bindings = match lib_path {
        Some(path) if path.is_dir() => {
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(path))
        }
        Some(path) => Pdfium::bind_to_library(path),
        None => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library()),
    }
    .map_err(|e| DigestError::PdfiumBindingFailed(format!("{:?}", e)))?;

    Ok(Pdfium::new(bindings))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn magic_accepts_pdf_header() {
        assert!(check_pdf_magic(b"%PDF-1.7\n%\xe2\xe3").is_ok());
    }

    #[test]
    fn magic_rejects_html() {
        let err = check_pdf_magic(b"<!DOCTYPE html>").unwrap_err();
        match err {
            DigestError::NotAPdf { magic } => assert_eq!(magic, b"<!DO"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn magic_rejects_short_and_empty_bodies() {
        assert!(check_pdf_magic(b"").is_err());
        assert!(check_pdf_magic(b"%P").is_err());
    }

    #[test]
    fn non_pdf_fails_before_binding() {
        // Must not need a pdfium library to reject garbage.
        let err = extract_text(b"not a pdf at all", None).unwrap_err();
        assert!(matches!(err, DigestError::NotAPdf { .. }));
    }

    #[tokio::test]
    async fn extractor_propagates_not_a_pdf() {
        let err = PdfiumExtractor::default()
            .extract(b"{\"error\":\"rate limited\"}".to_vec())
            .await
            .unwrap_err();
        assert!(matches!(err, DigestError::NotAPdf { .. }));
    }
}
