use once_cell::sync::Lazy;
use regex::Regex;

/// Punctuation allowed through cleaning, in addition to word characters
/// and whitespace.
const ALLOWED_PUNCTUATION: &str = r"-.,;:!?()[]{}@#$%&*+=/|\";

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex"));

/// Normalizes extracted text for the token-oriented pipeline stages:
/// strips characters outside the allow-list, collapses whitespace runs
/// (including newlines) into a single space, and trims.
///
/// Stripping happens before collapsing so the transform is idempotent:
/// after one pass no disallowed character remains, and collapse + trim
/// are fixpoints on their own output.
pub fn clean_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let stripped: String = text.chars().filter(|&c| is_allowed(c)).collect();
    let collapsed = WHITESPACE_RUN.replace_all(&stripped, " ");
    collapsed.trim().to_string()
}

fn is_allowed(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c.is_whitespace() || ALLOWED_PUNCTUATION.contains(c)
}
