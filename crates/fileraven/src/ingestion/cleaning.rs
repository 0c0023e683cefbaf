//! Minimal whitespace normalization that keeps markdown structure intact

use once_cell::sync::Lazy;
use regex::Regex;

static EXCESS_NEWLINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());
static HORIZONTAL_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+").unwrap());

/// Collapse 3+ newlines into one blank line and runs of spaces/tabs into a
/// single space, then trim
pub fn normalize_whitespace(text: &str) -> String {
    let text = text.replace("\r\n", "\n");
    let text = EXCESS_NEWLINES.replace_all(&text, "\n\n");
    let text = HORIZONTAL_RUNS.replace_all(&text, " ");
    text.trim().to_string()
}
