use once_cell::sync::Lazy;
use regex::Regex;

/// Expand common typographic ligatures found in PDFs.
pub fn expand_ligatures(text: &str) -> String {
    text.replace('\u{FB00}', "ff")
        .replace('\u{FB01}', "fi")
        .replace('\u{FB02}', "fl")
        .replace('\u{FB03}', "ffi")
        .replace('\u{FB04}', "ffl")
        .replace(['\u{FB05}', '\u{FB06}'], "st")
}

/// Clean extracted text for analysis.
///
/// Each pass, in order:
/// 1. drop URL-looking substrings (`http...`, `https...`, `www...`)
/// 2. drop tag-looking substrings (`<...>`)
/// 3. collapse whitespace runs to a single space
/// 4. drop characters other than word characters, whitespace and `.,!?-`
///
/// Removing characters can expose a new URL or whitespace run, so passes
/// repeat until the text stops changing. The result is trimmed.
pub fn clean_text(text: &str) -> String {
    let mut current = clean_pass(text);
    loop {
        let next = clean_pass(&current);
        if next == current {
            return current.trim().to_string();
        }
        current = next;
    }
}

fn clean_pass(text: &str) -> String {
    static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"http\S+|www\S+|https\S+").unwrap());
    static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<.*?>").unwrap());
    static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
    static SPECIAL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s.,!?-]").unwrap());

    let text = URL_RE.replace_all(text, "");
    let text = TAG_RE.replace_all(&text, "");
    let text = WHITESPACE_RE.replace_all(&text, " ");
    let text = SPECIAL_RE.replace_all(&text, "");
    text.trim().to_string()
}
