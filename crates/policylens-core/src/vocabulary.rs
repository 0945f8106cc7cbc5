use std::collections::HashSet;

/// Risk phrases flagged in privacy policies, checked in this order.
pub const DEFAULT_RISK_TERMS: &[&str] = &[
    "third party",
    "share with third parties",
    "sell your data",
    "no encryption",
    "data retention",
    "tracking",
    "personal data",
    "consent",
    "collect",
    "disclose",
    "transfer",
];

/// An immutable, ordered list of risk phrases.
///
/// Each term keeps the casing it was given; matching is done against
/// lowercased patterns computed once at construction. Blank entries and
/// case-insensitive duplicates are dropped, first occurrence wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiskVocabulary {
    terms: Vec<String>,
    patterns: Vec<Vec<String>>,
}

impl Default for RiskVocabulary {
    fn default() -> Self {
        Self::new(DEFAULT_RISK_TERMS.iter().copied())
    }
}

impl RiskVocabulary {
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut kept = Vec::new();
        let mut patterns = Vec::new();

        for term in terms {
            let term: String = term.into();
            let term = term.trim().to_string();
            if term.is_empty() {
                continue;
            }
            let lower = term.to_lowercase();
            if seen.insert(lower.clone()) {
                kept.push(term);
                patterns.push(match plural_of(&lower) {
                    Some(plural) => vec![lower, plural],
                    None => vec![lower],
                });
            }
        }

        Self {
            terms: kept,
            patterns,
        }
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Terms contained in `lowered_text`, in vocabulary order.
    ///
    /// `lowered_text` must already be lowercase. Matching is plain substring
    /// containment, so "collect" also matches inside "collection". A term
    /// ending in consonant + `y` also matches its `-ies` plural.
    pub(crate) fn matches_in<'a>(
        &'a self,
        lowered_text: &'a str,
    ) -> impl Iterator<Item = &'a str> + 'a {
        self.terms
            .iter()
            .zip(&self.patterns)
            .filter(move |(_, patterns)| {
                patterns.iter().any(|p| lowered_text.contains(p.as_str()))
            })
            .map(|(term, _)| term.as_str())
    }

    /// Position of `term` in the vocabulary, if present.
    pub fn position(&self, term: &str) -> Option<usize> {
        self.terms.iter().position(|t| t == term)
    }
}

/// `"third party"` -> `"third parties"`.
fn plural_of(lower: &str) -> Option<String> {
    let stem = lower.strip_suffix('y')?;
    let before = stem.chars().last()?;
    if !before.is_alphabetic() || "aeiou".contains(before) {
        return None;
    }
    Some(format!("{stem}ies"))
}
