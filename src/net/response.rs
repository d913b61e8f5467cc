//! Buffered HTTP response model.
//!
//! This struct represents a **fully buffered** HTTP response returned by
//! [`Client::send`](super::Client::send). The transport stream has already been
//! drained exactly once, so the body can be read any number of times.
//!
//! ## Notes
//! - Redirects are not followed: a `3xx` comes back as-is and `url` is the
//!   requested URL.
//! - `headers` is an `http::HeaderMap`, which is **case-insensitive** for
//!   header names and keeps repeated headers.
//! - `cookies` are rebuilt from every `Set-Cookie` header with the full
//!   attribute set.
//!
use std::io::Write;

use bytes::Bytes;
use http::{HeaderMap, StatusCode, Version};

use crate::cookies::Cookie;
use crate::errors::Result;
use crate::net::Payload;

#[derive(Debug, Clone)]
pub struct Response {
    /// URL the response was received from.
    pub url: url::Url,

    /// HTTP status code.
    pub status: StatusCode,

    pub version: Version,

    /// Response headers as a case-insensitive multi-map.
    pub headers: HeaderMap,

    /// Cookies parsed from `Set-Cookie` headers.
    pub cookies: Vec<Cookie>,

    /// Raw response body bytes.
    pub body: Bytes,
}

impl Response {
    /// `true` for status codes in `200..300`.
    pub fn is_successful(&self) -> bool {
        self.status.is_success()
    }

    /// Human-readable reason phrase (e.g., `"OK"`). `"Unknown"` for non-standard codes.
    pub fn status_text(&self) -> &'static str {
        self.status.canonical_reason().unwrap_or("Unknown")
    }

    /// First value of header `name`, if it is valid text.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// The buffered body. Cheap to call repeatedly; nothing is consumed.
    pub fn body_bytes(&self) -> Bytes {
        self.body.clone()
    }

    /// Writes the whole body to `w` and flushes it.
    pub fn write_body_to<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_all(&self.body)?;
        w.flush()?;
        Ok(())
    }

    /// An `http::Response` view over this response, suitable for dumping.
    pub fn to_http(&self) -> http::Response<Payload> {
        let mut resp = http::Response::new(Payload::from_bytes(self.body.clone()));
        *resp.status_mut() = self.status;
        *resp.version_mut() = self.version;
        *resp.headers_mut() = self.headers.clone();
        resp
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::dump_response;
    use http::HeaderValue;

    fn response(status: u16) -> Response {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", HeaderValue::from_static("text/plain"));
        Response {
            url: url::Url::parse("https://example.com/").unwrap(),
            status: StatusCode::from_u16(status).unwrap(),
            version: Version::HTTP_11,
            headers,
            cookies: vec![],
            body: Bytes::from_static(b"payload"),
        }
    }

    #[test]
    fn success_is_2xx_only() {
        assert!(!response(199).is_successful());
        assert!(response(200).is_successful());
        assert!(response(299).is_successful());
        assert!(!response(300).is_successful());
        assert!(!response(404).is_successful());
    }

    #[test]
    fn status_text_and_headers() {
        let r = response(418);
        assert_eq!(r.status_text(), "I'm a teapot");
        assert_eq!(r.header("Content-Type"), Some("text/plain"));
        assert_eq!(response(599).status_text(), "Unknown");
    }

    #[test]
    fn write_body_to_copies_everything() {
        let mut out = Vec::new();
        response(200).write_body_to(&mut out).unwrap();
        assert_eq!(out, b"payload");
    }

    /// Accepts at most three bytes per call.
    struct Trickle(Vec<u8>);

    impl Write for Trickle {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            let n = buf.len().min(3);
            self.0.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn short_writes_are_retried() {
        let mut out = Trickle(Vec::new());
        response(200).write_body_to(&mut out).unwrap();
        assert_eq!(out.0, b"payload");
    }

    #[test]
    fn http_view_can_be_dumped_repeatedly() {
        let r = response(200);
        let mut view = r.to_http();
        let first = dump_response(&mut view).unwrap();
        let second = dump_response(&mut view).unwrap();
        assert_eq!(first, second);
        assert!(first.ends_with(b"\r\n\r\npayload"));
    }
}
