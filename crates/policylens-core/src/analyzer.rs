use std::sync::Arc;

use crate::sentences::split_sentences;
use crate::vocabulary::RiskVocabulary;
use crate::{AnalysisResult, ComparisonResult};

/// Maximum number of leading sentences kept as a summary.
pub const SUMMARY_SENTENCES: usize = 5;

/// Scores privacy-policy text against a risk vocabulary.
///
/// Cheap to clone and safe to share across threads; the vocabulary is
/// immutable once built.
#[derive(Debug, Clone, Default)]
pub struct PolicyAnalyzer {
    vocabulary: Arc<RiskVocabulary>,
}

impl PolicyAnalyzer {
    pub fn new(vocabulary: Arc<RiskVocabulary>) -> Self {
        Self { vocabulary }
    }

    pub fn vocabulary(&self) -> &RiskVocabulary {
        &self.vocabulary
    }

    /// Summarize `text` and flag every vocabulary term it contains.
    ///
    /// Terms are matched case-insensitively as plain substrings of the whole
    /// text, so "disclose" also matches "disclosed" and "undisclosed".
    pub fn analyze(&self, text: &str) -> AnalysisResult {
        let summary: Vec<String> = split_sentences(text)
            .into_iter()
            .take(SUMMARY_SENTENCES)
            .collect();

        let lowered = text.to_lowercase();
        let found_risks: Vec<String> = self
            .vocabulary
            .matches_in(&lowered)
            .map(str::to_string)
            .collect();

        tracing::debug!(
            sentences = summary.len(),
            risks = found_risks.len(),
            "analyzed policy text"
        );

        AnalysisResult {
            summary,
            risk_score: found_risks.len(),
            found_risks,
        }
    }

    /// Analyze two texts independently and diff their findings.
    pub fn compare(&self, text_a: &str, text_b: &str) -> ComparisonResult {
        let result_a = self.analyze(text_a);
        let result_b = self.analyze(text_b);
        compare_results(result_a, result_b)
    }
}

/// Diff two existing analyses.
///
/// Both results must come from the same vocabulary for the set fields to be
/// meaningful. Output lists keep the order of `result_a` (common, unique to
/// a) and `result_b` (unique to b), which is vocabulary order.
pub fn compare_results(result_a: AnalysisResult, result_b: AnalysisResult) -> ComparisonResult {
    let in_b = |term: &String| result_b.found_risks.contains(term);
    let in_a = |term: &String| result_a.found_risks.contains(term);

    let common_risks: Vec<String> = result_a
        .found_risks
        .iter()
        .filter(|&t| in_b(t))
        .cloned()
        .collect();
    let unique_to_a: Vec<String> = result_a
        .found_risks
        .iter()
        .filter(|&t| !in_b(t))
        .cloned()
        .collect();
    let unique_to_b: Vec<String> = result_b
        .found_risks
        .iter()
        .filter(|&t| !in_a(t))
        .cloned()
        .collect();

    let risk_difference = result_a.risk_score as i64 - result_b.risk_score as i64;

    ComparisonResult {
        result_a,
        result_b,
        risk_difference,
        common_risks,
        unique_to_a,
        unique_to_b,
    }
}
