//! Client wrapper around `reqwest`.
//!
//! One [`Client`] is built at start-up from a [`ClientConfig`] and passed to
//! whatever sends requests. It never follows redirects: the first redirect
//! response is returned and the caller decides what to do with it.

use std::time::{Duration, Instant};

use reqwest::redirect::Policy;

use crate::config::ClientConfig;
use crate::cookies::Cookie;
use crate::errors::{Error, Result};
use crate::net::{Payload, Response, TransportRequest};

/// Per-request timeout, carried in the request extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTimeout(pub Duration);

#[derive(Debug, Clone)]
pub struct Client {
    inner: reqwest::Client,
    config: ClientConfig,
}

impl Client {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let inner = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .tcp_keepalive(config.tcp_keepalive)
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.max_idle_per_host)
            .timeout(config.request_timeout)
            .min_tls_version(config.min_tls)
            .max_tls_version(config.max_tls)
            .use_rustls_tls()
            .redirect(Policy::none())
            .http1_only()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(Error::ClientSetup)?;

        Ok(Self { inner, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Sends `req` and buffers the whole response.
    ///
    /// A non-2xx status is not an error; check [`Response::is_successful`].
    pub async fn send(&self, req: TransportRequest) -> Result<Response> {
        let (parts, body) = req.into_parts();

        let url = url::Url::parse(&parts.uri.to_string()).map_err(|e| Error::invalid_url(parts.uri.to_string(), e))?;
        let body = body_for_transport(body)?;

        let mut builder = self.inner.request(parts.method.clone(), url.clone()).headers(parts.headers);
        if let Some(body) = body {
            builder = builder.body(body);
        }
        if let Some(RequestTimeout(timeout)) = parts.extensions.get::<RequestTimeout>() {
            builder = builder.timeout(*timeout);
        }

        log::info!("sending {} {}", parts.method, url);
        let started = Instant::now();

        let res = builder.send().await.map_err(Error::SendFailed)?;

        let status = res.status();
        let version = res.version();
        let headers = res.headers().clone();
        let final_url = res.url().clone();

        // Drained once, kept in memory from here on.
        let body = res.bytes().await.map_err(Error::SendFailed)?;

        log::info!("{} {} -> {} in {:?} ({} bytes)", parts.method, url, status, started.elapsed(), body.len());

        Ok(Response {
            url: final_url,
            status,
            version,
            cookies: Cookie::from_response_headers(&headers),
            headers,
            body,
        })
    }
}

fn body_for_transport(body: Payload) -> Result<Option<reqwest::Body>> {
    if body.is_absent() {
        return Ok(None);
    }
    let bytes = body.into_bytes()?;
    Ok(Some(reqwest::Body::from(bytes)))
}
