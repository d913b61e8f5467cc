//! Request bodies.
//!
//! A [`Body`] is one of three variants, each able to report its content type
//! and length and to produce a fresh [`Payload`] for the transport:
//!
//! - `Generic`: fixed bytes with an explicit or sniffed content type
//! - `Form`: URL-encoded fields, encoded on every read
//! - `Multipart`: a [`MultipartBuilder`], closed on first read

mod form;
mod multipart;
mod schema;

use std::fs::File;
use std::io::Read;
use std::path::Path;

use bytes::Bytes;

pub use form::{FormBody, FORM_URLENCODED};
pub use multipart::{MultipartBuilder, PartInfo};
pub(crate) use schema::file_name;
pub use schema::{BodySchema, MultipartField};

use crate::errors::{Error, Result};
use crate::net::Payload;
use crate::{pool, sniff};

#[derive(Debug, Clone)]
pub enum Body {
    Generic { content_type: String, bytes: Bytes },
    Form(FormBody),
    Multipart(MultipartBuilder),
}

impl Body {
    /// Fixed content. Without an explicit type, the type is sniffed from the
    /// complete payload.
    pub fn generic(bytes: impl Into<Bytes>, content_type: Option<&str>) -> Self {
        let bytes = bytes.into();
        let content_type = match content_type {
            Some(ct) => ct.to_string(),
            None => sniff::detect(&bytes).to_string(),
        };
        Body::Generic { content_type, bytes }
    }

    /// JSON content. The bytes must parse as JSON.
    pub fn json(bytes: impl Into<Bytes>) -> Result<Self> {
        let bytes = bytes.into();
        serde_json::from_slice::<serde_json::Value>(&bytes).map_err(Error::InvalidJsonBody)?;
        Ok(Body::Generic { content_type: sniff::JSON.to_string(), bytes })
    }

    /// Reads `path` fully and wraps it as generic content.
    pub fn from_file(path: &Path, content_type: Option<&str>) -> Result<Self> {
        Ok(Body::generic(read_attachment(path)?, content_type))
    }

    pub fn content_type(&self) -> String {
        match self {
            Body::Generic { content_type, .. } => content_type.clone(),
            Body::Form(_) => FORM_URLENCODED.to_string(),
            Body::Multipart(mp) => mp.content_type(),
        }
    }

    /// Payload length in bytes.
    pub fn length(&self) -> Option<u64> {
        match self {
            Body::Generic { bytes, .. } => Some(bytes.len() as u64),
            Body::Form(form) => Some(form.encode().len() as u64),
            Body::Multipart(mp) => Some(mp.encoded_len()),
        }
    }

    /// Short variant name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Body::Generic { .. } => "generic",
            Body::Form(_) => "form",
            Body::Multipart(_) => "multipart",
        }
    }

    /// A fresh reader over the payload.
    ///
    /// An open multipart builder is closed by this call; later field
    /// additions fail with [`Error::BuilderClosed`].
    pub fn reader(&mut self) -> Result<Payload> {
        let bytes = match self {
            Body::Generic { bytes, .. } => bytes.clone(),
            Body::Form(form) => Bytes::from(form.encode()),
            Body::Multipart(mp) => mp.finish(),
        };
        Ok(Payload::from_bytes(bytes))
    }
}

impl From<FormBody> for Body {
    fn from(form: FormBody) -> Self {
        Body::Form(form)
    }
}

impl From<MultipartBuilder> for Body {
    fn from(mp: MultipartBuilder) -> Self {
        Body::Multipart(mp)
    }
}

/// Reads a whole file through a pooled scratch buffer.
pub(crate) fn read_attachment(path: &Path) -> Result<Bytes> {
    let mut file = File::open(path).map_err(|e| Error::attachment(path, e))?;
    let mut buf = pool::bytes().get();
    file.read_to_end(&mut buf).map_err(|e| Error::attachment(path, e))?;
    log::debug!("read attachment {} ({} bytes)", path.display(), buf.len());
    Ok(Bytes::copy_from_slice(&buf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn generic_sniffs_full_payload() {
        let body = Body::generic(&b"<html><body>hi</body></html>"[..], None);
        assert_eq!(body.content_type(), "text/html; charset=utf-8");

        let body = Body::generic(&b"anything"[..], Some("application/x-custom"));
        assert_eq!(body.content_type(), "application/x-custom");
    }

    #[test]
    fn json_is_validated() {
        let body = Body::json(&br#"{"ok":true}"#[..]).unwrap();
        assert_eq!(body.content_type(), "application/json");
        assert!(matches!(Body::json(&b"{nope"[..]), Err(Error::InvalidJsonBody(_))));
    }

    #[test]
    fn generic_reader_is_repeatable() {
        let mut body = Body::generic(&b"abc"[..], None);
        let a = body.reader().unwrap().into_bytes().unwrap();
        let b = body.reader().unwrap().into_bytes().unwrap();
        assert_eq!(a, b);
        assert_eq!(body.length(), Some(3));
    }

    #[test]
    fn empty_form_is_present_but_empty() {
        let mut body = Body::from(FormBody::new());
        assert_eq!(body.content_type(), FORM_URLENCODED);
        assert_eq!(body.length(), Some(0));
        let payload = body.reader().unwrap();
        assert!(!payload.is_absent());
        assert!(payload.into_bytes().unwrap().is_empty());
    }

    #[test]
    fn reading_multipart_closes_it() {
        let mut mp = MultipartBuilder::new();
        mp.add_text_field("a", "1").unwrap();
        let mut body = Body::from(mp);

        let first = body.reader().unwrap().into_bytes().unwrap();
        let second = body.reader().unwrap().into_bytes().unwrap();
        assert_eq!(first, second);

        let Body::Multipart(mp) = &mut body else { unreachable!() };
        assert!(mp.is_closed());
        assert!(matches!(mp.add_text_field("b", "2"), Err(Error::BuilderClosed)));
    }

    #[test]
    fn from_file_reads_large_files_whole() {
        let data: Vec<u8> = (0..(70 * 1024)).map(|i| b'a' + (i % 26) as u8).collect();
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(&data).unwrap();

        let mut body = Body::from_file(f.path(), None).unwrap();
        assert_eq!(body.length(), Some(data.len() as u64));
        assert_eq!(body.content_type(), sniff::PLAIN_TEXT_UTF8);
        assert_eq!(body.reader().unwrap().into_bytes().unwrap().as_ref(), data.as_slice());
    }
}
