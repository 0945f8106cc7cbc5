use std::path::Path;

use mupdf::{Document, MetadataName, TextPageFlags};

use policylens_core::{BackendError, PdfBackend, PdfMetadata};

/// MuPDF-based implementation of [`PdfBackend`].
///
/// This crate is the sole AGPL island: it isolates the mupdf dependency
/// (which is AGPL-3.0) so that analysis code does not transitively depend
/// on it.
///
/// Each call opens its own [`Document`]; the handle is dropped when the call
/// returns, on success and on every error path.
#[derive(Debug, Clone, Default)]
pub struct MupdfBackend;

impl MupdfBackend {
    pub fn new() -> Self {
        Self
    }
}

fn open(path: &Path) -> Result<Document, BackendError> {
    let path_str = path
        .to_str()
        .ok_or_else(|| BackendError::OpenError("invalid path encoding".into()))?;
    Document::open(path_str).map_err(|e| BackendError::OpenError(e.to_string()))
}

/// Info-dictionary keys, named the way PDF tooling usually reports them.
fn metadata_fields() -> [(MetadataName, &'static str); 10] {
    [
        (MetadataName::Format, "format"),
        (MetadataName::Encryption, "encryption"),
        (MetadataName::Title, "title"),
        (MetadataName::Author, "author"),
        (MetadataName::Subject, "subject"),
        (MetadataName::Keywords, "keywords"),
        (MetadataName::Creator, "creator"),
        (MetadataName::Producer, "producer"),
        (MetadataName::CreationDate, "creationDate"),
        (MetadataName::ModDate, "modDate"),
    ]
}

impl PdfBackend for MupdfBackend {
    fn extract_text(&self, path: &Path) -> Result<String, BackendError> {
        let document = open(path)?;

        let mut text = String::new();
        let mut pages = 0usize;

        for page_result in document
            .pages()
            .map_err(|e| BackendError::ExtractionError(e.to_string()))?
        {
            let page = page_result.map_err(|e| BackendError::ExtractionError(e.to_string()))?;
            let text_page = page
                .to_text_page(TextPageFlags::empty())
                .map_err(|e| BackendError::ExtractionError(e.to_string()))?;

            // Block/line iteration mirrors a plain-text dump of the page
            for block in text_page.blocks() {
                for line in block.lines() {
                    let line_text: String = line
                        .chars()
                        .map(|c| c.char().unwrap_or('\u{FFFD}'))
                        .collect();
                    text.push_str(&line_text);
                    text.push('\n');
                }
            }
            pages += 1;
        }

        tracing::debug!(path = %path.display(), pages, chars = text.len(), "extracted PDF text");
        Ok(text)
    }

    fn metadata(&self, path: &Path) -> Result<PdfMetadata, BackendError> {
        let document = open(path)?;

        let mut metadata = PdfMetadata::new();
        for (name, key) in metadata_fields() {
            let value = document
                .metadata(name)
                .map_err(|e| BackendError::MetadataError(format!("{key}: {e}")))?;
            metadata.insert(key, value);
        }
        Ok(metadata)
    }
}
