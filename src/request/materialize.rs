use http::header::{CONTENT_TYPE, COOKIE};
use http::{HeaderMap, HeaderName, HeaderValue, Method, Uri};

use crate::errors::{Error, Result};
use crate::net::{Payload, RequestTimeout, TransportRequest};
use crate::request::{MultiMap, RequestConfig};

impl RequestConfig {
    /// Builds the transport request.
    ///
    /// Query parameters and headers are appended (never overwritten) in
    /// first-seen order, cookies become one `Cookie` header of `name=value`
    /// pairs, and the body's content type is set last so a user supplied
    /// `Content-Type` cannot override it. Nothing is returned on error.
    ///
    /// Generic and form bodies can be materialised any number of times. A
    /// multipart body is closed by the first call.
    pub fn to_transport_request(&mut self) -> Result<TransportRequest> {
        let method = resolve_method(&self.method)?;
        let uri = self.resolve_uri()?;
        let mut headers = self.resolve_headers()?;

        let cookie_line = self.cookie_line();
        if !cookie_line.is_empty() {
            let value = merge_cookie_values(&headers, &cookie_line)?;
            headers.insert(COOKIE, value);
        }

        let payload = match self.body.as_mut() {
            Some(body) => {
                let ct = body.content_type();
                let value = HeaderValue::from_str(&ct).map_err(|e| Error::invalid_header("Content-Type", e))?;
                let payload = body.reader()?;
                headers.insert(CONTENT_TYPE, value);
                payload
            }
            None => Payload::empty(),
        };

        let mut req = http::Request::new(payload);
        *req.method_mut() = method;
        *req.uri_mut() = uri;
        *req.headers_mut() = headers;
        if let Some(timeout) = self.options.timeout() {
            req.extensions_mut().insert(RequestTimeout(timeout));
        }

        log::info!(
            "materialised {} {} ({} query keys, {} headers, {} cookies, body: {})",
            req.method(),
            req.uri(),
            self.query_params.len(),
            req.headers().len(),
            self.cookies.len(),
            self.body.as_ref().map_or("none", |b| b.kind()),
        );
        Ok(req)
    }

    fn resolve_uri(&self) -> Result<Uri> {
        let mut url = self.url.clone();
        let params = sanitized(&self.query_params, self.options.sanitize_query);
        if !params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, values) in &params {
                for value in values {
                    pairs.append_pair(key, value);
                }
            }
        }
        url.as_str().parse::<Uri>().map_err(|e| Error::invalid_url(url.as_str(), e))
    }

    fn resolve_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        for (key, values) in &sanitized(&self.headers, self.options.sanitize_headers) {
            let name = HeaderName::from_bytes(key.trim().as_bytes()).map_err(|e| Error::invalid_header(key.as_str(), e))?;
            for value in values {
                let value = HeaderValue::from_str(value).map_err(|e| Error::invalid_header(key.as_str(), e))?;
                headers.append(name.clone(), value);
            }
        }
        Ok(headers)
    }

    /// `a=1; b=2`. Only name and value go on the wire.
    fn cookie_line(&self) -> String {
        self.cookies
            .iter()
            .filter(|c| !(self.options.sanitize_cookies && (c.name.is_empty() || c.value.trim().is_empty())))
            .map(|c| c.pair())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Joins every user supplied `Cookie` header value and the cookie pairs into
/// one header value, in that order.
fn merge_cookie_values(headers: &HeaderMap, cookie_line: &str) -> Result<HeaderValue> {
    let mut merged: Vec<u8> = Vec::new();
    for existing in headers.get_all(COOKIE) {
        if existing.as_bytes().trim_ascii().is_empty() {
            continue;
        }
        merged.extend_from_slice(existing.as_bytes());
        merged.extend_from_slice(b"; ");
    }
    merged.extend_from_slice(cookie_line.as_bytes());
    HeaderValue::from_bytes(&merged).map_err(|e| Error::invalid_header("Cookie", e))
}

fn resolve_method(raw: &str) -> Result<Method> {
    let method = raw.trim().to_ascii_uppercase();
    if method.is_empty() {
        return Err(Error::InvalidMethod(raw.to_string()));
    }
    Method::from_bytes(method.as_bytes()).map_err(|_| Error::InvalidMethod(raw.to_string()))
}

/// With `sanitize` on, blank values are dropped and so are keys left without
/// any value.
fn sanitized(map: &MultiMap, sanitize: bool) -> MultiMap {
    if !sanitize {
        return map.clone();
    }
    map.iter()
        .filter_map(|(k, vs)| {
            let kept: Vec<String> = vs.iter().filter(|v| !v.trim().is_empty()).cloned().collect();
            if kept.is_empty() {
                log::debug!("sanitised away {k:?}");
                None
            } else {
                Some((k.clone(), kept))
            }
        })
        .collect()
}
