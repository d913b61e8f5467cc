//! Parsing of `key:value` flags and body attachments.
//!
//! Attachment values may point at files:
//! - `@path` reads the file (for `--part` it becomes a file part)
//! - `<@path` inlines the file's text as a plain field value
//!
//! A `--part` written as `<name=@path` is the same as `name=<@path`.

use std::path::Path;

use crate::body::{file_name, read_attachment, Body, FormBody, MultipartBuilder};
use crate::errors::{Error, Result};
use crate::request::MultiMap;

/// Parses `Key:v1,v2` flags (headers, query). Values are trimmed; repeated keys
/// accumulate.
pub fn parse_key_values(raw: &[String]) -> Result<MultiMap> {
    let mut out = MultiMap::new();
    for item in raw {
        let (key, values) = item
            .split_once(':')
            .ok_or_else(|| Error::MalformedPair { raw: item.clone(), expected: "key:value" })?;
        let key = key.trim();
        if key.is_empty() {
            return Err(Error::MalformedPair { raw: item.clone(), expected: "key:value" });
        }
        out.entry(key.to_string()).or_default().extend(values.split(',').map(|v| v.trim().to_string()));
    }
    Ok(out)
}

/// Parses cookie flags: `name:value` (or `name=value`), one value each.
pub fn parse_cookies(raw: &[String]) -> Result<Vec<(String, String)>> {
    raw.iter()
        .map(|item| {
            let split = match (item.find(':'), item.find('=')) {
                (Some(c), Some(e)) => Some(c.min(e)),
                (c, e) => c.or(e),
            };
            let Some(at) = split else {
                return Err(Error::MalformedPair { raw: item.clone(), expected: "name:value" });
            };
            let name = item[..at].trim();
            if name.is_empty() {
                return Err(Error::MalformedPair { raw: item.clone(), expected: "name:value" });
            }
            Ok((name.to_string(), item[at + 1..].trim().to_string()))
        })
        .collect()
}

/// `--data`: inline text or `@file`, content type sniffed.
pub fn data(arg: &str) -> Result<Body> {
    let arg = arg.trim();
    match arg.strip_prefix('@') {
        Some(path) => Body::from_file(Path::new(path), None),
        None => Ok(Body::generic(arg.to_string().into_bytes(), None)),
    }
}

/// `--json`: inline JSON or `@file`, validated.
pub fn json(arg: &str) -> Result<Body> {
    let arg = arg.trim();
    match arg.strip_prefix('@') {
        Some(path) => Body::json(read_attachment(Path::new(path))?),
        None => Body::json(arg.to_string().into_bytes()),
    }
}

/// `--form key=value`; `@file` values are inlined as text.
pub fn form(args: &[String]) -> Result<Body> {
    let mut form = FormBody::new();
    for arg in args {
        let (key, value) = split_assignment(arg)?;
        let value = match value.strip_prefix("<@").or_else(|| value.strip_prefix('@')) {
            Some(path) => read_text(path)?,
            None => value.to_string(),
        };
        form.add(key, value);
    }
    Ok(Body::Form(form))
}

/// `--part key=value`, `key=@file` (file part) or `key=<@file` / `<key=@file`
/// (file text inlined as a field).
pub fn parts(args: &[String]) -> Result<Body> {
    let mut mp = MultipartBuilder::new();
    for arg in args {
        let (key, value) = split_assignment(arg)?;
        let (key, inline) = match key.strip_prefix('<') {
            Some(k) => (k.trim(), true),
            None => (key, false),
        };

        if let Some(path) = value.strip_prefix("<@") {
            mp.add_text_field(key, &read_text(path)?)?;
        } else if let Some(path) = value.strip_prefix('@') {
            if inline {
                mp.add_text_field(key, &read_text(path)?)?;
            } else {
                let path = Path::new(path);
                mp.add_file(key, &file_name(path), &read_attachment(path)?)?;
            }
        } else {
            mp.add_text_field(key, value)?;
        }
    }
    Ok(Body::Multipart(mp))
}

fn split_assignment(arg: &str) -> Result<(&str, &str)> {
    let arg = arg.trim();
    match arg.split_once('=') {
        Some((k, v)) if !k.trim().is_empty() => Ok((k.trim(), v)),
        _ => Err(Error::MalformedPair { raw: arg.to_string(), expected: "key=value" }),
    }
}

fn read_text(path: &str) -> Result<String> {
    let bytes = read_attachment(Path::new(path))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
