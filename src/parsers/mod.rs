//! Format-specific parsers. Each one turns source text into the shared IR
//! and reports recoverable issues through a caller-supplied warning sink.

use once_cell::sync::Lazy;
use regex::Regex;

pub mod erb;
pub mod haml;
pub mod phlex;
pub mod slim;

// ============================================================================
// SHARED CODE-LINE CLASSIFICATION
// ============================================================================

/// `items.each do |item|`, with or without a receiver.
static EACH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<recv>.*?)\.?each\s+do\s*\|\s*(?P<var>\w+)\s*\|").expect("each pattern")
});

/// `for item in items` (an optional trailing `do` is tolerated).
static FOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^for\s+(?P<var>\w+)\s+in\s+(?P<recv>.+?)(?:\s+do)?\s*$").expect("for pattern"));

static CONDITIONAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<kw>if|unless|elsif|when)\s+(?P<cond>.+)$").expect("conditional pattern"));

/// Splits a conditional opener into its keyword and the opaque condition.
pub(crate) fn split_conditional(code: &str) -> Option<(&str, &str)> {
    let caps = CONDITIONAL_RE.captures(code.trim())?;
    Some((
        caps.name("kw").map(|m| m.as_str()).unwrap_or_default(),
        caps.name("cond").map(|m| m.as_str()).unwrap_or_default(),
    ))
}

/// Recovers `(collection, variable)` from an iteration opener, or `None` if
/// the code is not one. Falls back to `collection`/`item` placeholders when
/// a piece cannot be recovered from the text.
pub(crate) fn split_loop(code: &str) -> Option<(String, String)> {
    let code = code.trim();
    if let Some(caps) = EACH_RE.captures(code) {
        let recv = caps.name("recv").map(|m| m.as_str().trim()).unwrap_or("");
        let var = caps.name("var").map(|m| m.as_str()).unwrap_or("item");
        let collection = if recv.is_empty() {
            "collection".to_string()
        } else {
            recv.to_string()
        };
        return Some((collection, var.to_string()));
    }
    if let Some(caps) = FOR_RE.captures(code) {
        let recv = caps.name("recv").map(|m| m.as_str().trim()).unwrap_or("collection");
        let var = caps.name("var").map(|m| m.as_str()).unwrap_or("item");
        return Some((recv.to_string(), var.to_string()));
    }
    None
}

/// True when a code line opens an iteration scope.
pub(crate) fn opens_loop(code: &str) -> bool {
    let code = code.trim();
    code.starts_with("each ")
        || code.starts_with("while ")
        || code.starts_with("for ")
        || EACH_RE.is_match(code)
}
