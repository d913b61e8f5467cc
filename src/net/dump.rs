//! Safe dumps of requests and responses.
//!
//! A message body is a single-read stream. [`tee_and_restore`] drains it into
//! memory and puts a fresh reader over the same bytes back in place, so the
//! message can still be sent (or read by the caller) after it was dumped. The
//! dump itself is the wire-level text: start line, headers, a blank line and
//! the body.

use std::io::{Cursor, Read};

use bytes::Bytes;
use http::header::{CONTENT_LENGTH, HOST};
use http::{HeaderMap, Request};

use crate::errors::{DumpStage, Error, Result};
use crate::net::Payload;
use crate::pool;

/// A resource whose body can be read once and put back.
pub trait ReadOnce {
    fn take_reader(&mut self) -> Option<Box<dyn Read + Send>>;
    fn put_reader(&mut self, reader: Box<dyn Read + Send>, len: Option<u64>);
}

impl ReadOnce for Payload {
    fn take_reader(&mut self) -> Option<Box<dyn Read + Send>> {
        self.take()
    }

    fn put_reader(&mut self, reader: Box<dyn Read + Send>, len: Option<u64>) {
        self.replace(reader, len);
    }
}

impl ReadOnce for http::Request<Payload> {
    fn take_reader(&mut self) -> Option<Box<dyn Read + Send>> {
        self.body_mut().take_reader()
    }

    fn put_reader(&mut self, reader: Box<dyn Read + Send>, len: Option<u64>) {
        self.body_mut().put_reader(reader, len);
    }
}

impl ReadOnce for http::Response<Payload> {
    fn take_reader(&mut self) -> Option<Box<dyn Read + Send>> {
        self.body_mut().take_reader()
    }

    fn put_reader(&mut self, reader: Box<dyn Read + Send>, len: Option<u64>) {
        self.body_mut().put_reader(reader, len);
    }
}

/// Reads the whole body of `resource` and restores a reader over the same
/// bytes. Returns `None` when there is no body.
///
/// On a read error the bytes consumed so far are chained in front of the
/// remaining stream, so nothing is lost.
pub fn tee_and_restore<R: ReadOnce + ?Sized>(resource: &mut R) -> std::io::Result<Option<Bytes>> {
    let Some(mut reader) = resource.take_reader() else {
        return Ok(None);
    };

    let mut buf = pool::bytes().get();
    match reader.read_to_end(&mut buf) {
        Ok(_) => {
            let bytes = Bytes::copy_from_slice(&buf);
            let len = bytes.len() as u64;
            resource.put_reader(Box::new(Cursor::new(bytes.clone())), Some(len));
            Ok(Some(bytes))
        }
        Err(e) => {
            let consumed = Bytes::copy_from_slice(&buf);
            resource.put_reader(Box::new(Cursor::new(consumed).chain(reader)), None);
            Err(e)
        }
    }
}

/// Dumps an outbound request. The request body stays readable afterwards.
pub fn dump_request(req: &mut Request<Payload>) -> Result<Bytes> {
    let body = tee_and_restore(req).map_err(|source| Error::Dump { stage: DumpStage::Request, source })?;

    let mut out = pool::bytes().get();
    let target = req.uri().path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
    out.extend_from_slice(format!("{} {} HTTP/1.1\r\n", req.method(), target).as_bytes());

    if !req.headers().contains_key(HOST) {
        if let Some(host) = req.uri().host() {
            let host = match req.uri().port_u16() {
                Some(port) => format!("{host}:{port}"),
                None => host.to_string(),
            };
            write_header_line(&mut out, "Host", host.as_bytes());
        }
    }
    write_headers(&mut out, req.headers());

    if let Some(body) = &body {
        if !req.headers().contains_key(CONTENT_LENGTH) {
            write_header_line(&mut out, "Content-Length", body.len().to_string().as_bytes());
        }
    }
    out.extend_from_slice(b"\r\n");
    if let Some(body) = &body {
        out.extend_from_slice(body);
    }

    log::debug!("dumped request: {} bytes", out.len());
    Ok(Bytes::copy_from_slice(&out))
}

/// Dumps a response. The response body stays readable afterwards.
pub fn dump_response(resp: &mut http::Response<Payload>) -> Result<Bytes> {
    let body = tee_and_restore(resp).map_err(|source| Error::Dump { stage: DumpStage::Response, source })?;

    let mut out = pool::bytes().get();
    let status = resp.status();
    let line = format!("{:?} {} {}", resp.version(), status.as_str(), status.canonical_reason().unwrap_or(""));
    out.extend_from_slice(line.trim_end().as_bytes());
    out.extend_from_slice(b"\r\n");
    write_headers(&mut out, resp.headers());
    out.extend_from_slice(b"\r\n");
    if let Some(body) = &body {
        out.extend_from_slice(body);
    }

    log::debug!("dumped response: {} bytes", out.len());
    Ok(Bytes::copy_from_slice(&out))
}

fn write_headers(out: &mut Vec<u8>, headers: &HeaderMap) {
    for (name, value) in headers {
        write_header_line(out, &canonical_name(name.as_str()), value.as_bytes());
    }
}

fn write_header_line(out: &mut Vec<u8>, name: &str, value: &[u8]) {
    out.extend_from_slice(name.as_bytes());
    out.extend_from_slice(b": ");
    out.extend_from_slice(value);
    out.extend_from_slice(b"\r\n");
}

/// `content-type` -> `Content-Type`.
pub(crate) fn canonical_name(name: &str) -> String {
    name.split('-')
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + &chars.as_str().to_ascii_lowercase(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}
