//! Request configuration.
//!
//! A [`RequestConfig`] collects everything that describes one outbound request
//! (method, URL, query, headers, cookies, body, runtime options). It is built
//! from a URL plus flags or from a JSON request file, and turned into a
//! transport request by
//! [`to_transport_request`](RequestConfig::to_transport_request).

mod materialize;

use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;
use url::Url;

use crate::body::{Body, BodySchema};
use crate::config::{OptionOverrides, Options};
use crate::cookies::Cookie;
use crate::errors::{Error, Result};

pub type MultiMap = IndexMap<String, Vec<String>>;

#[derive(Debug, Clone)]
pub struct RequestConfig {
    /// Verb as given. Trimmed and uppercased when materialised.
    pub method: String,
    /// Target URL without its query; the query lives in `query_params`.
    url: Url,
    query_params: MultiMap,
    headers: MultiMap,
    cookies: Vec<Cookie>,
    body: Option<Body>,
    pub options: Options,
}

/// On-disk shape of a JSON request file. Unknown fields are rejected.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RequestFile {
    #[serde(default)]
    method: String,
    url: String,
    #[serde(default)]
    query_params: MultiMap,
    #[serde(default)]
    headers: MultiMap,
    #[serde(default)]
    cookies: Vec<Cookie>,
    #[serde(default)]
    body: Option<BodySchema>,
    #[serde(default)]
    options: Options,

    // Flat runtime switches written by older request files. When present
    // they win over `options`.
    #[serde(default)]
    should_dump_request: Option<bool>,
    #[serde(default)]
    should_dump_response: Option<bool>,
    #[serde(default)]
    should_send_request: Option<bool>,
    #[serde(default)]
    should_sanitize_query: Option<bool>,
    #[serde(default)]
    should_sanitize_headers: Option<bool>,
    #[serde(default)]
    should_sanitize_cookies: Option<bool>,
}

impl RequestFile {
    fn options(&self) -> Options {
        let mut options = self.options.clone();
        OptionOverrides {
            dump_request: self.should_dump_request.into(),
            dump_response: self.should_dump_response.into(),
            send_request: self.should_send_request.into(),
            sanitize_query: self.should_sanitize_query.into(),
            sanitize_headers: self.should_sanitize_headers.into(),
            sanitize_cookies: self.should_sanitize_cookies.into(),
            ..Default::default()
        }
        .apply(&mut options);
        options
    }
}

impl RequestConfig {
    /// A `GET` request for `url` with default options.
    ///
    /// `url` must be absolute. Any query it carries is moved into the query
    /// parameters.
    pub fn new(url: &str) -> Result<Self> {
        Self::with_options(url, Options::default())
    }

    pub fn with_options(url: &str, options: Options) -> Result<Self> {
        let mut parsed = Url::parse(url.trim()).map_err(|e| Error::invalid_url(url, e))?;
        if !parsed.has_host() {
            return Err(Error::invalid_url(url, "missing host"));
        }

        let embedded: Vec<(String, String)> = parsed.query_pairs().into_owned().collect();
        parsed.set_query(None);
        parsed.set_fragment(None);

        let mut cfg = Self {
            method: "GET".to_string(),
            url: parsed,
            query_params: MultiMap::new(),
            headers: MultiMap::new(),
            cookies: Vec::new(),
            body: None,
            options,
        };
        for (k, v) in embedded {
            cfg.add_query_param(k, [v]);
        }
        Ok(cfg)
    }

    /// Decodes a JSON request file. The method defaults to `GET`.
    pub fn from_json(data: &[u8]) -> Result<Self> {
        let file: RequestFile = serde_json::from_slice(data)?;

        let mut cfg = Self::with_options(&file.url, file.options())?;
        if !file.method.trim().is_empty() {
            cfg.method = file.method;
        }
        for (k, vs) in file.query_params {
            cfg.add_query_param(k, vs);
        }
        for (k, vs) in file.headers {
            cfg.add_header(k, vs);
        }
        for c in file.cookies {
            cfg.push_cookie(c);
        }
        if let Some(schema) = file.body {
            cfg.set_body(schema.parse()?);
        }

        log::debug!("loaded request file: {} {}", cfg.method, cfg.url);
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read(path).map_err(|e| Error::attachment(path, e))?;
        Self::from_json(&data)
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn query_params(&self) -> &MultiMap {
        &self.query_params
    }

    pub fn headers(&self) -> &MultiMap {
        &self.headers
    }

    pub fn cookies(&self) -> &[Cookie] {
        &self.cookies
    }

    /// Appends values to query parameter `key`. With query sanitising on, a
    /// call without values adds nothing.
    pub fn add_query_param<K, I, S>(&mut self, key: K, values: I)
    where
        K: Into<String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        add_values(&mut self.query_params, key.into(), values, self.options.sanitize_query, "query");
    }

    /// Appends values to header `key`; repeated headers are kept. With header
    /// sanitising on, a call without values adds nothing.
    pub fn add_header<K, I, S>(&mut self, key: K, values: I)
    where
        K: Into<String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        add_values(&mut self.headers, key.into(), values, self.options.sanitize_headers, "header");
    }

    pub fn add_cookie(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.push_cookie(Cookie::new(name, value));
    }

    /// Adds a full cookie. With cookie sanitising on, an empty value is dropped.
    pub fn push_cookie(&mut self, cookie: Cookie) {
        if self.options.sanitize_cookies && cookie.value.is_empty() {
            log::debug!("dropping cookie {:?} without a value", cookie.name);
            return;
        }
        self.cookies.push(cookie);
    }

    pub fn set_body(&mut self, body: Body) {
        log::debug!("attached {} body ({}, {:?} bytes)", body.kind(), body.content_type(), body.length());
        self.body = Some(body);
    }

    pub fn body(&self) -> Option<&Body> {
        self.body.as_ref()
    }

    pub fn body_mut(&mut self) -> Option<&mut Body> {
        self.body.as_mut()
    }

    pub fn take_body(&mut self) -> Option<Body> {
        self.body.take()
    }
}

fn add_values<I, S>(map: &mut MultiMap, key: String, values: I, sanitize: bool, what: &str)
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let values: Vec<String> = values.into_iter().map(Into::into).collect();
    if sanitize && values.is_empty() {
        log::debug!("dropping {what} {key:?} without values");
        return;
    }
    map.entry(key).or_default().extend(values);
}
