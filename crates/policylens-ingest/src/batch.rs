use std::path::{Path, PathBuf};

use policylens_core::{AnalysisResult, PolicyAnalyzer};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::{ExtractError, PdfTextExtractor, load_text};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchStatus {
    Success,
    Error,
}

/// Outcome for a single file in a batch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchItem {
    pub path: PathBuf,
    pub status: BatchStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Length of the analyzed text, in characters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub characters: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AnalysisResult>,
}

impl BatchItem {
    fn success(path: &Path, characters: usize, analysis: AnalysisResult) -> Self {
        Self {
            path: path.to_path_buf(),
            status: BatchStatus::Success,
            message: None,
            characters: Some(characters),
            analysis: Some(analysis),
        }
    }

    fn failure(path: &Path, message: String) -> Self {
        Self {
            path: path.to_path_buf(),
            status: BatchStatus::Error,
            message: Some(message),
            characters: None,
            analysis: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == BatchStatus::Success
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BatchOptions {
    /// Clean extracted PDF text before analysis.
    pub clean: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self { clean: true }
    }
}

/// Progress events emitted while a batch runs.
#[derive(Debug)]
pub enum BatchProgress<'a> {
    Processing {
        index: usize,
        total: usize,
        path: &'a Path,
    },
    Done {
        index: usize,
        total: usize,
        item: &'a BatchItem,
    },
}

/// Load, clean and analyze each file in order.
///
/// A failing file becomes an error item and never stops the batch. When
/// `cancel` fires, processing stops before the next file and the items
/// finished so far are returned.
pub fn process_batch(
    paths: &[PathBuf],
    extractor: &PdfTextExtractor,
    analyzer: &PolicyAnalyzer,
    options: BatchOptions,
    mut progress: impl FnMut(BatchProgress<'_>),
    cancel: &CancellationToken,
) -> Vec<BatchItem> {
    let total = paths.len();
    let mut items = Vec::with_capacity(total);

    for (index, path) in paths.iter().enumerate() {
        if cancel.is_cancelled() {
            tracing::info!(done = index, total, "batch cancelled");
            break;
        }
        progress(BatchProgress::Processing { index, total, path });

        let item = match process_one(path, extractor, analyzer, options) {
            Ok((characters, analysis)) => BatchItem::success(path, characters, analysis),
            Err(e) => BatchItem::failure(path, e.to_string()),
        };
        tracing::debug!(path = %path.display(), status = ?item.status, "batch item done");

        progress(BatchProgress::Done {
            index,
            total,
            item: &item,
        });
        items.push(item);
    }

    items
}

fn process_one(
    path: &Path,
    extractor: &PdfTextExtractor,
    analyzer: &PolicyAnalyzer,
    options: BatchOptions,
) -> Result<(usize, AnalysisResult), ExtractError> {
    let text = load_text(path, extractor, options.clean)?.into_non_empty(path)?;
    Ok((text.chars().count(), analyzer.analyze(&text)))
}
