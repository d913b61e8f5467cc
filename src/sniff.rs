//! Content-type sniffing from payload bytes.
//!
//! Binary formats are recognised by their magic numbers through the `infer`
//! registry. Text is then split into JSON, XML, HTML and plain text locally so
//! text types carry a charset. Anything else is `application/octet-stream`.

use infer::MatcherType;

pub const OCTET_STREAM: &str = "application/octet-stream";
pub const PLAIN_TEXT: &str = "text/plain";
pub const PLAIN_TEXT_UTF8: &str = "text/plain; charset=utf-8";
pub const JSON: &str = "application/json";

/// Leading bytes inspected for markup detection.
const MARKUP_WINDOW: usize = 512;

const HTML_TAGS: &[&str] = &[
    "<!doctype html", "<html", "<head", "<body", "<script", "<iframe", "<title", "<div", "<table",
    "<style", "<p", "<a", "<h1", "<br", "<b", "<font", "<!--",
];

/// Returns the sniffed content type of `data`.
///
/// Callers pass the complete payload: JSON detection parses it as a whole.
pub fn detect(data: &[u8]) -> &'static str {
    if data.is_empty() {
        return PLAIN_TEXT;
    }

    if let Some(kind) = infer::get(data).filter(|k| k.matcher_type() != MatcherType::Text) {
        return kind.mime_type();
    }

    let Ok(text) = std::str::from_utf8(data) else {
        return OCTET_STREAM;
    };
    if text.chars().any(is_binary_control) {
        return OCTET_STREAM;
    }

    let trimmed = text.trim_start_matches('\u{feff}').trim_start();
    if (trimmed.starts_with('{') || trimmed.starts_with('['))
        && serde_json::from_str::<serde_json::Value>(trimmed).is_ok()
    {
        return JSON;
    }

    let head: String = trimmed.chars().take(MARKUP_WINDOW).collect::<String>().to_ascii_lowercase();
    if head.starts_with("<?xml") {
        return "text/xml; charset=utf-8";
    }
    if HTML_TAGS.iter().any(|tag| starts_with_tag(&head, tag)) {
        return "text/html; charset=utf-8";
    }

    PLAIN_TEXT_UTF8
}

/// A tag matches only when followed by whitespace, `>` or the end of input.
fn starts_with_tag(head: &str, tag: &str) -> bool {
    match head.strip_prefix(tag) {
        Some(rest) => tag == "<!--" || rest.is_empty() || rest.starts_with(['>', ' ', '\t', '\n', '\r']),
        None => false,
    }
}

fn is_binary_control(c: char) -> bool {
    c.is_control() && !matches!(c, '\n' | '\r' | '\t' | '\x0c' | '\x1b')
}
