//! Tree view of request and response dumps.
//!
//! [`render`] takes the wire-level text produced by
//! [`dump_request`](crate::net::dump_request) or
//! [`dump_response`](crate::net::dump_response) and summarises it:
//!
//! ```text
//! POST /upload HTTP/1.1
//! ├── Headers:
//! │   ├── Host: example.com
//! │   └── Content-Type: application/json
//! ├── Cookies:
//! │   └── sid=42
//! └── Body: 17 B of application/json
//! ```

mod style;
mod tree;

pub use style::Style;
pub use tree::Tree;

use std::fmt::Write as _;

use crate::errors::{Error, Result};
use crate::{pool, sniff};

const HEADER_END: &[u8] = b"\r\n\r\n";

/// Renders a raw dump as a tree.
pub fn render(dump: &[u8], style: Style) -> Result<String> {
    let tree = to_tree(dump, style)?;
    let mut out = pool::strings().get();
    write!(out, "{tree}").map_err(|e| Error::Malformed(e.to_string()))?;
    Ok(out.as_str().to_owned())
}

/// Builds the tree for a raw dump without drawing it.
pub fn to_tree(dump: &[u8], style: Style) -> Result<Tree> {
    let (head, body) = match find(dump, HEADER_END) {
        Some(i) => (&dump[..i], Some(&dump[i + HEADER_END.len()..])),
        None => (dump, None),
    };
    // obs-text bytes in header values are legal on the wire
    let head = String::from_utf8_lossy(head);

    let mut lines = head.split("\r\n");
    let start = lines.next().map(str::trim).unwrap_or_default();
    if start.is_empty() {
        return Err(Error::Malformed("missing start line".into()));
    }

    let mut headers = Tree::new("Headers:");
    let mut cookies = Tree::new("Cookies:");
    let mut content_type = None;
    for line in lines.map(str::trim).filter(|l| !l.is_empty()) {
        let (name, value) = line.split_once(':').unwrap_or((line, ""));
        let value = value.trim();
        if name.eq_ignore_ascii_case("cookie") || name.eq_ignore_ascii_case("set-cookie") {
            cookies.push(value);
            continue;
        }
        if name.eq_ignore_ascii_case("content-type") && !value.is_empty() {
            content_type = Some(value.to_string());
        }
        headers.push(line);
    }

    let mut root = Tree::new(start_line(start, style));
    if !headers.children.is_empty() {
        root.push(headers);
    }
    if !cookies.children.is_empty() {
        root.push(cookies);
    }
    if let Some(body) = body.filter(|b| !b.is_empty()) {
        let ct = content_type.unwrap_or_else(|| sniff::detect(body).to_string());
        root.push(format!("Body: {} of {}", format_bytes(body.len() as u64), ct));
    }
    Ok(root)
}

/// `METHOD target VERSION` or `VERSION CODE REASON`, with the method or the
/// status decorated.
fn start_line(line: &str, style: Style) -> String {
    if line.starts_with("HTTP/") {
        let (version, status) = line.split_once(' ').unwrap_or((line, ""));
        let code = status.split(' ').next().and_then(|c| c.parse::<u16>().ok());
        return match code {
            Some(code) => format!("{version} {}", style.status(code, status)),
            None => line.to_string(),
        };
    }
    match line.split_once(' ') {
        Some((method, rest)) => format!("{} {rest}", style.method(method)),
        None => style.method(line),
    }
}

/// Human-readable size with 1024 steps: `1023 B`, `1.0 KB`, `1.5 MB`.
pub fn format_bytes(n: u64) -> String {
    const UNIT: u64 = 1024;
    if n < UNIT {
        return format!("{n} B");
    }
    let mut div = UNIT;
    let mut exp = 0;
    let mut rest = n / UNIT;
    while rest >= UNIT && exp < 5 {
        div *= UNIT;
        exp += 1;
        rest /= UNIT;
    }
    let prefix = b"KMGTPE"[exp] as char;
    format!("{:.1} {prefix}B", n as f64 / div as f64)
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}
