//! Version token extraction.

use std::sync::LazyLock;

use regex::Regex;

/// A version token: starts with a digit, continues through alphanumerics
/// and the separators `.`, `-`, `_`.
static VERSION_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d[0-9A-Za-z._\-]*").expect("VERSION_TOKEN must compile")
});

/// Extract the first version-looking token from `text`.
///
/// Trailing separators are dropped, so `"Python 3.9.0."` yields `3.9.0`.
/// Returns `None` when `text` contains no digits at all.
pub fn extract_version(text: &str) -> Option<&str> {
    let token = VERSION_TOKEN.find(text)?.as_str();
    let token = token.trim_end_matches(['.', '-', '_']);
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}
