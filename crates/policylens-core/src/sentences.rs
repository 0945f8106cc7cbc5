//! Rule-based sentence segmentation.
//!
//! Boundaries are runs of `.`, `!` or `?` (optionally followed by closing
//! quotes or brackets) that are followed by whitespace, plus paragraph
//! breaks. A lone period does not end a sentence when it closes a known
//! abbreviation, a single-letter initial, a dotted abbreviation such as
//! `e.g.` or `U.S.`, or when the next word starts in lowercase. Domains and
//! email addresses are not abbreviations.

use once_cell::sync::Lazy;
use regex::Regex;

/// Abbreviations (lowercase, without the trailing period) that do not end a
/// sentence.
const ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "mt", "inc", "ltd", "co", "corp", "llc",
    "vs", "approx", "dept", "est", "no", "nos", "fig", "sec", "para", "cf", "al", "ca", "jan",
    "feb", "mar", "apr", "jun", "jul", "aug", "sep", "sept", "oct", "nov", "dec",
];

fn is_terminator(c: char) -> bool {
    matches!(c, '.' | '!' | '?')
}

fn is_closing(c: char) -> bool {
    matches!(c, '"' | '\'' | ')' | ']' | '}' | '\u{2019}' | '\u{201D}')
}

fn is_opening(c: char) -> bool {
    matches!(c, '"' | '\'' | '(' | '[' | '{' | '\u{2018}' | '\u{201C}')
}

/// Split `text` into trimmed, non-empty sentences in document order.
pub fn split_sentences(text: &str) -> Vec<String> {
    static PARAGRAPH_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").unwrap());

    let mut sentences = Vec::new();
    for paragraph in PARAGRAPH_BREAK.split(text) {
        split_paragraph(paragraph, &mut sentences);
    }
    sentences
}

fn split_paragraph(paragraph: &str, out: &mut Vec<String>) {
    let chars: Vec<(usize, char)> = paragraph.char_indices().collect();
    let mut start = 0;
    let mut i = 0;

    while i < chars.len() {
        if !is_terminator(chars[i].1) {
            i += 1;
            continue;
        }

        let run_start = i;
        while i < chars.len() && is_terminator(chars[i].1) {
            i += 1;
        }
        let lone_period = chars[run_start].1 == '.' && i - run_start == 1;
        while i < chars.len() && is_closing(chars[i].1) {
            i += 1;
        }

        let at_end = i == chars.len();
        if !at_end && !chars[i].1.is_whitespace() {
            continue;
        }

        let end = if at_end { paragraph.len() } else { chars[i].0 };
        if lone_period && !at_end {
            let before = &paragraph[start..chars[run_start].0];
            if is_abbreviation(last_word(before)) || next_word_is_lowercase(&paragraph[end..]) {
                continue;
            }
        }

        push_sentence(&paragraph[start..end], out);
        start = end;
    }

    push_sentence(&paragraph[start..], out);
}

fn push_sentence(segment: &str, out: &mut Vec<String>) {
    let trimmed = segment.trim();
    if !trimmed.is_empty() {
        out.push(trimmed.to_string());
    }
}

fn last_word(text: &str) -> &str {
    let word = text
        .rsplit(char::is_whitespace)
        .next()
        .unwrap_or_default();
    word.trim_start_matches(is_opening)
}

fn is_abbreviation(word: &str) -> bool {
    let mut chars = word.chars();
    match (chars.next(), chars.next()) {
        (None, _) => false,
        (Some(c), None) => c.is_alphabetic(),
        _ => {
            if word.contains('.') {
                return is_dotted_abbreviation(word);
            }
            let lower = word.to_lowercase();
            ABBREVIATIONS.contains(&lower.as_str())
        }
    }
}

/// `e.g`, `i.e`, `U.S`: every dot-separated segment is one or two letters.
/// Domains and email addresses fail this and may end a sentence.
fn is_dotted_abbreviation(word: &str) -> bool {
    word.split('.').all(|segment| {
        let len = segment.chars().count();
        (1..=2).contains(&len) && segment.chars().all(char::is_alphabetic)
    })
}

fn next_word_is_lowercase(rest: &str) -> bool {
    rest.trim_start()
        .trim_start_matches(is_opening)
        .chars()
        .next()
        .is_some_and(char::is_lowercase)
}
