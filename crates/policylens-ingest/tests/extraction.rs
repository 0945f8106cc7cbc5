use std::path::{Path, PathBuf};
use std::sync::Arc;

use policylens_core::PolicyAnalyzer;
use policylens_ingest::{
    BackendError, BatchOptions, BatchProgress, BatchStatus, ExtractError, PdfBackend,
    PdfMetadata, PdfTextExtractor, process_batch,
};
use tokio_util::sync::CancellationToken;

/// Serves canned text for `good.pdf`, a blank page for `blank.pdf`, and
/// fails to open anything else.
struct FakeBackend;

impl PdfBackend for FakeBackend {
    fn extract_text(&self, path: &Path) -> Result<String, BackendError> {
        match path.file_stem().and_then(|s| s.to_str()) {
            Some("good") => Ok("We share data with third parties.\nWe use tracking.".into()),
            Some("blank") => Ok("  \n ".into()),
            _ => Err(BackendError::OpenError("cannot open document".into())),
        }
    }

    fn metadata(&self, _path: &Path) -> Result<PdfMetadata, BackendError> {
        Err(BackendError::MetadataError("no info dictionary".into()))
    }
}

fn fake_extractor() -> PdfTextExtractor {
    PdfTextExtractor::new(Arc::new(FakeBackend))
}

#[test]
fn missing_pdf_returns_error_value() {
    let extractor = PdfTextExtractor::default();
    let result = extractor.extract_text(Path::new("/definitely/not/here.pdf"));
    match result {
        Err(ExtractError::Backend { path, .. }) => {
            assert_eq!(path, PathBuf::from("/definitely/not/here.pdf"));
        }
        other => panic!("expected backend error, got {other:?}"),
    }
}

#[test]
fn missing_pdf_metadata_is_empty() {
    let extractor = PdfTextExtractor::default();
    assert!(
        extractor
            .get_metadata(Path::new("/definitely/not/here.pdf"))
            .is_empty()
    );
}

#[test]
fn metadata_failure_keeps_reason() {
    let err = fake_extractor()
        .try_get_metadata(Path::new("good.pdf"))
        .unwrap_err();
    assert!(err.to_string().contains("no info dictionary"));
    assert!(fake_extractor().get_metadata(Path::new("good.pdf")).is_empty());
}

#[test]
fn batch_reports_each_file_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let notes = dir.path().join("notes.txt");
    std::fs::write(&notes, "We sell your data. Consent is assumed.").unwrap();

    let paths = vec![
        PathBuf::from("good.pdf"),
        dir.path().join("missing.txt"),
        PathBuf::from("broken.pdf"),
        PathBuf::from("blank.pdf"),
        notes.clone(),
    ];

    let mut events = Vec::new();
    let items = process_batch(
        &paths,
        &fake_extractor(),
        &PolicyAnalyzer::default(),
        BatchOptions::default(),
        |event| {
            let label = match event {
                BatchProgress::Processing { index, .. } => format!("start {index}"),
                BatchProgress::Done { index, item, .. } => {
                    format!("done {index} {:?}", item.status)
                }
            };
            events.push(label);
        },
        &CancellationToken::new(),
    );

    let statuses: Vec<_> = items.iter().map(|i| i.status).collect();
    assert_eq!(
        statuses,
        [
            BatchStatus::Success,
            BatchStatus::Error,
            BatchStatus::Error,
            BatchStatus::Error,
            BatchStatus::Success,
        ]
    );

    let good = items[0].analysis.as_ref().unwrap();
    assert_eq!(good.found_risks, ["third party", "tracking"]);
    assert!(items[0].is_success());

    assert!(items[2].message.as_deref().unwrap().contains("cannot open document"));
    assert!(items[3].message.as_deref().unwrap().contains("no text extracted"));

    let notes_item = &items[4];
    assert_eq!(notes_item.path, notes);
    assert_eq!(
        notes_item.analysis.as_ref().unwrap().found_risks,
        ["sell your data", "consent"]
    );

    assert_eq!(events.len(), 10);
    assert_eq!(events[0], "start 0");
    assert_eq!(events[1], "done 0 Success");
}

#[test]
fn cancelled_batch_stops_early() {
    let cancel = CancellationToken::new();
    let paths = vec![PathBuf::from("good.pdf"), PathBuf::from("good.pdf")];

    let items = process_batch(
        &paths,
        &fake_extractor(),
        &PolicyAnalyzer::default(),
        BatchOptions::default(),
        |event| {
            if let BatchProgress::Done { .. } = event {
                cancel.cancel();
            }
        },
        &cancel,
    );

    assert_eq!(items.len(), 1);
}

#[test]
fn batch_exports_as_json_array() {
    let paths = vec![PathBuf::from("good.pdf"), PathBuf::from("broken.pdf")];
    let items = process_batch(
        &paths,
        &fake_extractor(),
        &PolicyAnalyzer::default(),
        BatchOptions::default(),
        |_| {},
        &CancellationToken::new(),
    );

    let json = serde_json::to_value(&items).unwrap();
    assert_eq!(json[0]["status"], "success");
    assert_eq!(json[0]["analysis"]["risk_score"], 2);
    assert!(json[0].get("message").is_none());
    assert_eq!(json[1]["status"], "error");
    assert!(json[1].get("analysis").is_none());
}
