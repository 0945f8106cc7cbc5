use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

pub mod batch;

// Re-export domain types for convenience
pub use batch::{BatchItem, BatchOptions, BatchProgress, BatchStatus, process_batch};
pub use policylens_core::{BackendError, PdfBackend, PdfMetadata};

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("{}: {source}", .path.display())]
    Backend {
        path: PathBuf,
        #[source]
        source: BackendError,
    },
    #[error("{}: failed to read file: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{}: no text extracted", .path.display())]
    Empty { path: PathBuf },
    #[error("{}: extraction timed out after {secs}s", .path.display())]
    Timeout { path: PathBuf, secs: u64 },
}

/// How a document's text is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    /// Anything else is read as (lossy) UTF-8 text.
    Text,
}

impl DocumentKind {
    /// Dispatch on file extension, case-insensitively.
    pub fn from_path(path: &Path) -> Self {
        let is_pdf = path
            .extension()
            .map(|e| e.eq_ignore_ascii_case("pdf"))
            .unwrap_or(false);
        if is_pdf { Self::Pdf } else { Self::Text }
    }
}

/// PDF text extraction that never panics and never leaks an untyped error.
///
/// Every failure is logged at `warn` and returned as an [`ExtractError`]
/// carrying the path and the reason.
#[derive(Clone)]
pub struct PdfTextExtractor {
    backend: Arc<dyn PdfBackend>,
}

impl std::fmt::Debug for PdfTextExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfTextExtractor").finish_non_exhaustive()
    }
}

#[cfg(feature = "pdf")]
impl Default for PdfTextExtractor {
    fn default() -> Self {
        Self::new(Arc::new(policylens_pdf_mupdf::MupdfBackend::new()))
    }
}

impl PdfTextExtractor {
    pub fn new(backend: Arc<dyn PdfBackend>) -> Self {
        Self { backend }
    }

    /// Page text concatenated in page order, ligatures expanded.
    ///
    /// A readable PDF without a text layer yields `Ok("")`.
    pub fn extract_text(&self, path: &Path) -> Result<String, ExtractError> {
        match self.backend.extract_text(path) {
            Ok(text) => Ok(policylens_core::expand_ligatures(&text)),
            Err(source) => {
                tracing::warn!(path = %path.display(), error = %source, "error processing PDF");
                Err(ExtractError::Backend {
                    path: path.to_path_buf(),
                    source,
                })
            }
        }
    }

    pub fn try_get_metadata(&self, path: &Path) -> Result<PdfMetadata, ExtractError> {
        self.backend.metadata(path).map_err(|source| {
            tracing::warn!(path = %path.display(), error = %source, "error extracting metadata");
            ExtractError::Backend {
                path: path.to_path_buf(),
                source,
            }
        })
    }

    /// Embedded metadata, or an empty map if it cannot be read.
    pub fn get_metadata(&self, path: &Path) -> PdfMetadata {
        self.try_get_metadata(path).unwrap_or_default()
    }
}

/// Text loaded from a document, ready for analysis.
#[derive(Debug, Clone)]
pub struct LoadedText {
    pub kind: DocumentKind,
    pub text: String,
}

impl LoadedText {
    /// The loaded text, or [`ExtractError::Empty`] if it is blank.
    ///
    /// A PDF without a text layer loads fine but has nothing to analyze;
    /// callers that report risks must not mistake it for a risk-free policy.
    pub fn into_non_empty(self, path: &Path) -> Result<String, ExtractError> {
        if self.text.trim().is_empty() {
            tracing::warn!(path = %path.display(), kind = ?self.kind, "no text extracted");
            return Err(ExtractError::Empty {
                path: path.to_path_buf(),
            });
        }
        Ok(self.text)
    }
}

/// Load the text of a PDF or plain-text document.
///
/// PDF text is passed through [`policylens_core::clean_text`] when `clean`
/// is set; plain text is returned as read.
pub fn load_text(
    path: &Path,
    extractor: &PdfTextExtractor,
    clean: bool,
) -> Result<LoadedText, ExtractError> {
    let kind = DocumentKind::from_path(path);
    let text = match kind {
        DocumentKind::Pdf => {
            let raw = extractor.extract_text(path)?;
            if clean {
                policylens_core::clean_text(&raw)
            } else {
                raw
            }
        }
        DocumentKind::Text => {
            let bytes = std::fs::read(path).map_err(|source| {
                tracing::warn!(path = %path.display(), error = %source, "error reading text file");
                ExtractError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            })?;
            String::from_utf8_lossy(&bytes).into_owned()
        }
    };
    Ok(LoadedText { kind, text })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticBackend(&'static str);

    impl PdfBackend for StaticBackend {
        fn extract_text(&self, _path: &Path) -> Result<String, BackendError> {
            Ok(self.0.to_string())
        }

        fn metadata(&self, _path: &Path) -> Result<PdfMetadata, BackendError> {
            let mut meta = PdfMetadata::new();
            meta.insert("title", "Policy");
            Ok(meta)
        }
    }

    #[test]
    fn kind_from_extension() {
        assert_eq!(DocumentKind::from_path(Path::new("a.pdf")), DocumentKind::Pdf);
        assert_eq!(DocumentKind::from_path(Path::new("A.PDF")), DocumentKind::Pdf);
        assert_eq!(DocumentKind::from_path(Path::new("a.txt")), DocumentKind::Text);
        assert_eq!(DocumentKind::from_path(Path::new("noext")), DocumentKind::Text);
    }

    #[test]
    fn ligatures_expanded_after_extraction() {
        let extractor = PdfTextExtractor::new(Arc::new(StaticBackend("ﬁrst-party")));
        assert_eq!(
            extractor.extract_text(Path::new("x.pdf")).unwrap(),
            "first-party"
        );
    }

    #[test]
    fn pdf_text_cleaned_on_request() {
        let extractor = PdfTextExtractor::new(Arc::new(StaticBackend(
            "We   <b>collect</b>\ndata: see www.example.com",
        )));
        let cleaned = load_text(Path::new("p.pdf"), &extractor, true).unwrap();
        assert_eq!(cleaned.kind, DocumentKind::Pdf);
        assert_eq!(cleaned.text, "We collect data see");

        let raw = load_text(Path::new("p.pdf"), &extractor, false).unwrap();
        assert!(raw.text.contains("<b>"));
    }

    #[test]
    fn pdf_without_text_layer_is_empty_error() {
        let extractor = PdfTextExtractor::new(Arc::new(StaticBackend(" \n\u{c} \n")));
        let loaded = load_text(Path::new("scan.pdf"), &extractor, true).unwrap();
        assert_eq!(loaded.text, "");

        let err = loaded.into_non_empty(Path::new("scan.pdf")).unwrap_err();
        assert!(matches!(err, ExtractError::Empty { ref path } if path == Path::new("scan.pdf")));
        assert_eq!(err.to_string(), "scan.pdf: no text extracted");
    }

    #[test]
    fn non_empty_text_passes_through() {
        let extractor = PdfTextExtractor::new(Arc::new(StaticBackend("We collect data.")));
        let text = load_text(Path::new("p.pdf"), &extractor, false)
            .and_then(|loaded| loaded.into_non_empty(Path::new("p.pdf")))
            .unwrap();
        assert_eq!(text, "We collect data.");
    }

    #[test]
    fn metadata_passed_through() {
        let extractor = PdfTextExtractor::new(Arc::new(StaticBackend("")));
        let meta = extractor.get_metadata(Path::new("p.pdf"));
        assert_eq!(meta.get("title"), Some("Policy"));
    }
}
