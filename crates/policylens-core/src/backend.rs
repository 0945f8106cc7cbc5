use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("failed to open PDF: {0}")]
    OpenError(String),
    #[error("failed to extract text: {0}")]
    ExtractionError(String),
    #[error("failed to read metadata: {0}")]
    MetadataError(String),
}

/// Embedded document metadata (title, author, producer, ...).
///
/// Keys follow the PDF info dictionary names used by MuPDF
/// (`format`, `title`, `author`, `creationDate`, ...). Empty values are
/// never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PdfMetadata(BTreeMap<String, String>);

impl PdfMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a value, ignoring blank ones.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let value = value.into();
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            self.0.insert(key.into(), trimmed.to_string());
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Trait for PDF text extraction backends.
///
/// Implementors provide the raw document access; the no-throw extraction
/// contract and text cleanup live in `policylens_ingest::PdfTextExtractor`.
pub trait PdfBackend: Send + Sync {
    /// Extract the full text content of a PDF file, pages in order.
    fn extract_text(&self, path: &Path) -> Result<String, BackendError>;

    /// Read the document's embedded metadata.
    fn metadata(&self, path: &Path) -> Result<PdfMetadata, BackendError>;
}
