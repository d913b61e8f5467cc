//! Streaming `multipart/form-data` encoder.
//!
//! A [`MultipartBuilder`] starts **open** and accepts text and file parts. The
//! first call to [`MultipartBuilder::build`] writes the closing delimiter and
//! freezes the payload; from then on every mutating call fails with
//! [`Error::BuilderClosed`].
//!
//! The builder is owned by exactly one request body and mutated through
//! `&mut self`, so there is no lock around it.

use std::fmt::Write as _;
use std::io::Read;

use bytes::Bytes;
use rand::Rng;

use crate::errors::{Error, Result};
use crate::{pool, sniff};

/// Number of random bytes behind a boundary (hex encoded, so 60 characters).
const BOUNDARY_BYTES: usize = 30;

/// What was written for one part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartInfo {
    pub name: String,
    /// Set for file parts.
    pub filename: Option<String>,
    /// Sniffed content type of a file part.
    pub content_type: Option<String>,
    pub len: usize,
}

#[derive(Debug, Clone)]
enum State {
    Open(Vec<u8>),
    Closed(Bytes),
}

#[derive(Debug, Clone)]
pub struct MultipartBuilder {
    boundary: String,
    state: State,
    parts: Vec<PartInfo>,
}

impl Default for MultipartBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MultipartBuilder {
    /// New open builder with a fresh random boundary.
    pub fn new() -> Self {
        let mut raw = [0u8; BOUNDARY_BYTES];
        rand::rng().fill(&mut raw);

        let mut boundary = String::with_capacity(BOUNDARY_BYTES * 2);
        for b in raw {
            let _ = write!(boundary, "{b:02x}");
        }

        Self { boundary, state: State::Open(Vec::new()), parts: Vec::new() }
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    pub fn parts(&self) -> &[PartInfo] {
        &self.parts
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.state, State::Closed(_))
    }

    /// Appends a plain `form-data` part.
    pub fn add_text_field(&mut self, name: &str, value: &str) -> Result<()> {
        let disposition = format!("form-data; name=\"{}\"", escape_quotes(name));
        self.write_part(&disposition, None, value.as_bytes())?;
        self.parts.push(PartInfo { name: name.to_string(), filename: None, content_type: None, len: value.len() });
        Ok(())
    }

    /// Appends a file part. The content type is sniffed from `content`.
    pub fn add_file(&mut self, name: &str, filename: &str, content: &[u8]) -> Result<()> {
        let content_type = sniff::detect(content);
        let disposition =
            format!("form-data; name=\"{}\"; filename=\"{}\"", escape_quotes(name), escape_quotes(filename));
        self.write_part(&disposition, Some(content_type), content)?;
        self.parts.push(PartInfo {
            name: name.to_string(),
            filename: Some(filename.to_string()),
            content_type: Some(content_type.to_string()),
            len: content.len(),
        });
        Ok(())
    }

    /// Drains `source` completely, then appends it as a file part. Nothing is
    /// written if reading fails. Closing `source` is left to the caller.
    pub fn add_file_from_stream<R: Read>(&mut self, name: &str, filename: &str, mut source: R) -> Result<()> {
        if self.is_closed() {
            return Err(Error::BuilderClosed);
        }
        let mut buf = pool::bytes().get();
        source.read_to_end(&mut buf)?;
        self.add_file(name, filename, &buf)
    }

    /// Writes the closing delimiter and returns the complete payload.
    ///
    /// Only the first call succeeds.
    pub fn build(&mut self) -> Result<Bytes> {
        if self.is_closed() {
            return Err(Error::BuilderClosed);
        }
        Ok(self.finish())
    }

    /// Payload bytes, closing the builder first if it is still open.
    pub(crate) fn finish(&mut self) -> Bytes {
        let mut buf = match &mut self.state {
            State::Closed(bytes) => return bytes.clone(),
            State::Open(buf) => std::mem::take(buf),
        };
        if !buf.is_empty() {
            buf.extend_from_slice(b"\r\n");
        }
        buf.extend_from_slice(b"--");
        buf.extend_from_slice(self.boundary.as_bytes());
        buf.extend_from_slice(b"--\r\n");

        let bytes = Bytes::from(buf);
        log::debug!("multipart closed: {} parts, {} bytes", self.parts.len(), bytes.len());
        self.state = State::Closed(bytes.clone());
        bytes
    }

    /// Length of the final payload. Known while open too, since the closing
    /// delimiter has a fixed size.
    pub fn encoded_len(&self) -> u64 {
        match &self.state {
            State::Closed(bytes) => bytes.len() as u64,
            State::Open(buf) => {
                let separator = if buf.is_empty() { 0 } else { 2 };
                (buf.len() + separator + self.boundary.len() + 6) as u64
            }
        }
    }

    fn write_part(&mut self, disposition: &str, content_type: Option<&str>, content: &[u8]) -> Result<()> {
        let State::Open(buf) = &mut self.state else {
            return Err(Error::BuilderClosed);
        };

        if buf.is_empty() {
            buf.extend_from_slice(b"--");
        } else {
            buf.extend_from_slice(b"\r\n--");
        }
        buf.extend_from_slice(self.boundary.as_bytes());
        buf.extend_from_slice(b"\r\nContent-Disposition: ");
        buf.extend_from_slice(disposition.as_bytes());
        buf.extend_from_slice(b"\r\n");
        if let Some(ct) = content_type {
            buf.extend_from_slice(b"Content-Type: ");
            buf.extend_from_slice(ct.as_bytes());
            buf.extend_from_slice(b"\r\n");
        }
        buf.extend_from_slice(b"\r\n");
        buf.extend_from_slice(content);
        Ok(())
    }
}

fn escape_quotes(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
