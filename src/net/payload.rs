use std::fmt;
use std::io::{Cursor, Read};

use bytes::Bytes;

/// A message body that can be read once.
///
/// A payload either has no body at all or wraps a reader. Reading it (through
/// [`Payload::take`] or [`Payload::into_bytes`]) consumes the reader; use
/// [`tee_and_restore`](super::tee_and_restore) to inspect it without losing it.
#[derive(Default)]
pub struct Payload {
    reader: Option<Box<dyn Read + Send>>,
    len: Option<u64>,
}

impl Payload {
    /// No body.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        let len = bytes.len() as u64;
        Self { reader: Some(Box::new(Cursor::new(bytes))), len: Some(len) }
    }

    /// Wraps a stream. `len` is `None` when the length is not known up front.
    pub fn from_reader(reader: impl Read + Send + 'static, len: Option<u64>) -> Self {
        Self { reader: Some(Box::new(reader)), len }
    }

    /// `true` when there is no body. A consumed body also counts as absent.
    pub fn is_absent(&self) -> bool {
        self.reader.is_none()
    }

    /// Length in bytes, if known.
    pub fn len(&self) -> Option<u64> {
        self.len
    }

    /// Takes the reader out, leaving the payload absent.
    pub fn take(&mut self) -> Option<Box<dyn Read + Send>> {
        self.len = None;
        self.reader.take()
    }

    /// Replaces the reader.
    pub fn replace(&mut self, reader: Box<dyn Read + Send>, len: Option<u64>) {
        self.reader = Some(reader);
        self.len = len;
    }

    /// Drains the payload into memory. An absent payload yields empty bytes.
    pub fn into_bytes(mut self) -> std::io::Result<Bytes> {
        let len = self.len;
        match self.take() {
            Some(mut reader) => {
                let mut buf = Vec::with_capacity(len.unwrap_or(0) as usize);
                reader.read_to_end(&mut buf)?;
                Ok(Bytes::from(buf))
            }
            None => Ok(Bytes::new()),
        }
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Payload")
            .field("present", &self.reader.is_some())
            .field("len", &self.len)
            .finish()
    }
}

impl From<Bytes> for Payload {
    fn from(b: Bytes) -> Self {
        Payload::from_bytes(b)
    }
}

impl From<Vec<u8>> for Payload {
    fn from(b: Vec<u8>) -> Self {
        Payload::from_bytes(b)
    }
}
