use serde::Serialize;
use serde::ser::{SerializeStruct, Serializer};

pub mod analyzer;
pub mod backend;
pub mod config_file;
pub mod sentences;
pub mod text_utils;
pub mod vocabulary;

// Re-export for convenience
pub use analyzer::{PolicyAnalyzer, SUMMARY_SENTENCES};
pub use backend::{BackendError, PdfBackend, PdfMetadata};
pub use sentences::split_sentences;
pub use text_utils::{clean_text, expand_ligatures};
pub use vocabulary::{DEFAULT_RISK_TERMS, RiskVocabulary};

/// The outcome of analyzing a single policy text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisResult {
    /// Leading sentences of the text, in document order.
    pub summary: Vec<String>,
    /// Number of vocabulary terms found. Always `found_risks.len()`.
    pub risk_score: usize,
    /// Matched vocabulary terms, in vocabulary order.
    pub found_risks: Vec<String>,
}

impl AnalysisResult {
    pub fn has_risks(&self) -> bool {
        !self.found_risks.is_empty()
    }
}

/// Side-by-side result of analyzing two policy texts.
///
/// Set-valued fields carry no duplicates and keep vocabulary order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonResult {
    pub result_a: AnalysisResult,
    pub result_b: AnalysisResult,
    /// `result_a.risk_score - result_b.risk_score`.
    pub risk_difference: i64,
    pub common_risks: Vec<String>,
    pub unique_to_a: Vec<String>,
    pub unique_to_b: Vec<String>,
}

#[derive(Serialize)]
struct ComparisonSummary<'a> {
    risk_difference: i64,
    common_risks: &'a [String],
    unique_risks_policy1: &'a [String],
    unique_risks_policy2: &'a [String],
}

impl Serialize for ComparisonResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ComparisonResult", 3)?;
        state.serialize_field("policy1", &self.result_a)?;
        state.serialize_field("policy2", &self.result_b)?;
        state.serialize_field(
            "comparison",
            &ComparisonSummary {
                risk_difference: self.risk_difference,
                common_risks: &self.common_risks,
                unique_risks_policy1: &self.unique_to_a,
                unique_risks_policy2: &self.unique_to_b,
            },
        )?;
        state.end()
    }
}
