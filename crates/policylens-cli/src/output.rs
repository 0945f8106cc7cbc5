use std::io::Write;

use owo_colors::OwoColorize;
use policylens_core::{AnalysisResult, ComparisonResult, PdfMetadata};
use policylens_ingest::{BatchItem, BatchStatus};
use serde::Serialize;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

pub fn write_json<T: Serialize + ?Sized>(w: &mut dyn Write, value: &T) -> std::io::Result<()> {
    serde_json::to_writer_pretty(&mut *w, value)?;
    writeln!(w)
}

fn heading(w: &mut dyn Write, text: &str, color: ColorMode) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(w, "{}", text.bold())
    } else {
        writeln!(w, "{}", text)
    }
}

fn print_score(w: &mut dyn Write, score: usize, color: ColorMode) -> std::io::Result<()> {
    if !color.enabled() {
        return writeln!(w, "Risk score: {}", score);
    }
    if score == 0 {
        writeln!(w, "Risk score: {}", score.green())
    } else {
        writeln!(w, "Risk score: {}", score.yellow().bold())
    }
}

fn print_terms(w: &mut dyn Write, terms: &[String], color: ColorMode) -> std::io::Result<()> {
    if terms.is_empty() {
        if color.enabled() {
            writeln!(w, "  {}", "(none)".dimmed())?;
        } else {
            writeln!(w, "  (none)")?;
        }
        return Ok(());
    }
    for term in terms {
        if color.enabled() {
            writeln!(w, "  - {}", term.red())?;
        } else {
            writeln!(w, "  - {}", term)?;
        }
    }
    Ok(())
}

/// Print a single-document analysis report.
pub fn print_analysis(
    w: &mut dyn Write,
    name: &str,
    result: &AnalysisResult,
    color: ColorMode,
) -> std::io::Result<()> {
    heading(w, &format!("Analysis of {}", name), color)?;
    print_score(w, result.risk_score, color)?;
    writeln!(w, "Risks found:")?;
    print_terms(w, &result.found_risks, color)?;
    writeln!(w, "Summary:")?;
    if result.summary.is_empty() {
        writeln!(w, "  (empty)")?;
    }
    for (i, sentence) in result.summary.iter().enumerate() {
        writeln!(w, "  {}. {}", i + 1, sentence)?;
    }
    Ok(())
}

/// Print both analyses followed by the risk diff.
pub fn print_comparison(
    w: &mut dyn Write,
    name_a: &str,
    name_b: &str,
    comparison: &ComparisonResult,
    color: ColorMode,
) -> std::io::Result<()> {
    print_analysis(w, name_a, &comparison.result_a, color)?;
    writeln!(w)?;
    print_analysis(w, name_b, &comparison.result_b, color)?;
    writeln!(w)?;

    let sep = "=".repeat(60);
    heading(w, &sep, color)?;
    heading(w, "COMPARISON", color)?;
    heading(w, &sep, color)?;

    let diff = comparison.risk_difference;
    let verdict = match diff {
        0 => "both policies carry the same number of risks".to_string(),
        d if d > 0 => format!("{} carries {} more risk(s)", name_a, d),
        d => format!("{} carries {} more risk(s)", name_b, -d),
    };
    writeln!(w, "Risk difference: {:+} ({})", diff, verdict)?;

    writeln!(w, "Common risks:")?;
    print_terms(w, &comparison.common_risks, color)?;
    writeln!(w, "Only in {}:", name_a)?;
    print_terms(w, &comparison.unique_to_a, color)?;
    writeln!(w, "Only in {}:", name_b)?;
    print_terms(w, &comparison.unique_to_b, color)?;
    Ok(())
}

pub fn print_metadata(
    w: &mut dyn Write,
    name: &str,
    metadata: &PdfMetadata,
    color: ColorMode,
) -> std::io::Result<()> {
    heading(w, &format!("Metadata of {}", name), color)?;
    if metadata.is_empty() {
        writeln!(w, "  (no metadata)")?;
        return Ok(());
    }
    let width = metadata.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    for (key, value) in metadata.iter() {
        writeln!(w, "  {:width$}  {}", key, value, width = width)?;
    }
    Ok(())
}

/// Print one finished batch item as a progress line.
pub fn print_batch_item(
    w: &mut dyn Write,
    index: usize,
    total: usize,
    item: &BatchItem,
    color: ColorMode,
) -> std::io::Result<()> {
    let name = item.path.display();
    match (item.status, &item.analysis) {
        (BatchStatus::Success, Some(analysis)) => {
            let risks = if analysis.has_risks() {
                analysis.found_risks.join(", ")
            } else {
                "no risks".to_string()
            };
            if color.enabled() {
                writeln!(
                    w,
                    "[{}/{}] {} -> {} (score {}: {})",
                    index + 1,
                    total,
                    name,
                    "OK".green(),
                    analysis.risk_score,
                    risks
                )
            } else {
                writeln!(
                    w,
                    "[{}/{}] {} -> OK (score {}: {})",
                    index + 1,
                    total,
                    name,
                    analysis.risk_score,
                    risks
                )
            }
        }
        _ => {
            let message = item.message.as_deref().unwrap_or("unknown error");
            if color.enabled() {
                writeln!(
                    w,
                    "[{}/{}] {} -> {} ({})",
                    index + 1,
                    total,
                    name,
                    "ERROR".red(),
                    message
                )
            } else {
                writeln!(
                    w,
                    "[{}/{}] {} -> ERROR ({})",
                    index + 1,
                    total,
                    name,
                    message
                )
            }
        }
    }
}

pub fn print_batch_summary(
    w: &mut dyn Write,
    items: &[BatchItem],
    requested: usize,
    color: ColorMode,
) -> std::io::Result<()> {
    let succeeded = items.iter().filter(|i| i.is_success()).count();
    let failed = items.len() - succeeded;
    writeln!(w)?;
    let line = format!(
        "Processed {} of {} files: {} succeeded, {} failed",
        items.len(),
        requested,
        succeeded,
        failed
    );
    if color.enabled() && failed > 0 {
        writeln!(w, "{}", line.yellow())?;
    } else {
        writeln!(w, "{}", line)?;
    }
    if items.len() < requested {
        writeln!(w, "(cancelled before all files were processed)")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn render(f: impl FnOnce(&mut dyn Write) -> std::io::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn sample() -> AnalysisResult {
        AnalysisResult {
            summary: vec!["We share data.".into(), "We track you.".into()],
            risk_score: 2,
            found_risks: vec!["third party".into(), "tracking".into()],
        }
    }

    #[test]
    fn analysis_report_lists_risks_and_summary() {
        let out = render(|w| print_analysis(w, "policy.pdf", &sample(), ColorMode(false)));
        assert!(out.starts_with("Analysis of policy.pdf\n"));
        assert!(out.contains("Risk score: 2\n"));
        assert!(out.contains("  - third party\n  - tracking\n"));
        assert!(out.contains("  1. We share data.\n  2. We track you.\n"));
    }

    #[test]
    fn empty_analysis_report() {
        let empty = AnalysisResult {
            summary: vec![],
            risk_score: 0,
            found_risks: vec![],
        };
        let out = render(|w| print_analysis(w, "blank.txt", &empty, ColorMode(false)));
        assert!(out.contains("Risk score: 0\n"));
        assert!(out.contains("  (none)\n"));
        assert!(out.contains("  (empty)\n"));
    }

    #[test]
    fn comparison_report_names_riskier_policy() {
        let comparison = ComparisonResult {
            result_a: AnalysisResult {
                summary: vec![],
                risk_score: 0,
                found_risks: vec![],
            },
            result_b: sample(),
            risk_difference: -2,
            common_risks: vec![],
            unique_to_a: vec![],
            unique_to_b: vec!["third party".into(), "tracking".into()],
        };
        let out = render(|w| print_comparison(w, "a.txt", "b.txt", &comparison, ColorMode(false)));
        assert!(out.contains("Risk difference: -2 (b.txt carries 2 more risk(s))"));
        assert!(out.contains("Only in b.txt:\n  - third party\n  - tracking\n"));
        assert!(out.contains("Only in a.txt:\n  (none)\n"));
    }

    #[test]
    fn metadata_aligned() {
        let mut meta = PdfMetadata::new();
        meta.insert("title", "Policy");
        meta.insert("producer", "Writer");
        let out = render(|w| print_metadata(w, "p.pdf", &meta, ColorMode(false)));
        assert!(out.contains("  producer  Writer\n"));
        assert!(out.contains("  title     Policy\n"));
    }

    #[test]
    fn batch_lines_and_summary() {
        let ok = BatchItem {
            path: PathBuf::from("a.pdf"),
            status: BatchStatus::Success,
            message: None,
            characters: Some(30),
            analysis: Some(sample()),
        };
        let failed = BatchItem {
            path: PathBuf::from("b.pdf"),
            status: BatchStatus::Error,
            message: Some("b.pdf: no text extracted".into()),
            characters: None,
            analysis: None,
        };
        let out = render(|w| {
            print_batch_item(w, 0, 3, &ok, ColorMode(false))?;
            print_batch_item(w, 1, 3, &failed, ColorMode(false))?;
            print_batch_summary(w, &[ok.clone(), failed.clone()], 3, ColorMode(false))
        });
        assert!(out.contains("[1/3] a.pdf -> OK (score 2: third party, tracking)\n"));
        assert!(out.contains("[2/3] b.pdf -> ERROR (b.pdf: no text extracted)\n"));
        assert!(out.contains("Processed 2 of 3 files: 1 succeeded, 1 failed\n"));
        assert!(out.contains("(cancelled before all files were processed)"));
    }

    #[test]
    fn batch_line_without_risks() {
        let clean = BatchItem {
            path: PathBuf::from("clean.txt"),
            status: BatchStatus::Success,
            message: None,
            characters: Some(12),
            analysis: Some(AnalysisResult {
                summary: vec!["We are nice.".into()],
                risk_score: 0,
                found_risks: vec![],
            }),
        };
        let out = render(|w| print_batch_item(w, 0, 1, &clean, ColorMode(false)));
        assert_eq!(out, "[1/1] clean.txt -> OK (score 0: no risks)\n");
    }

    #[test]
    fn json_is_pretty_printed_with_newline() {
        let out = render(|w| write_json(w, &sample()));
        assert!(out.ends_with("}\n"));
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["risk_score"], 2);
    }
}
