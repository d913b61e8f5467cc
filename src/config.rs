//! Client and request configuration.
//!
//! [`ClientConfig`] controls the transport used by [`Client`](crate::net::Client):
//! timeouts, connection pooling and the accepted TLS range. It provides sensible
//! defaults via [`Default`] and a fluent [`ClientConfig::builder()`] with validation.
//!
//! [`Options`] are the per-request runtime switches (preview, send, sanitize, timeout).
//! They can come from a request file or from defaults, and are overridden by
//! [`OptionOverrides`] built from command line flags.
//!
//! # Examples
//!
//! ```rust
//! use std::time::Duration;
//! use courier::config::ClientConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = ClientConfig::builder()
//!     .request_timeout(Duration::from_secs(10))
//!     .max_idle_per_host(8)
//!     .build()?;
//! assert_eq!(cfg.connect_timeout, Duration::from_secs(8));
//! # Ok(()) }
//! ```
//!
//! # Errors
//!
//! Builder validation returns [`ClientConfigError`] for zero timeouts, an inverted
//! TLS range or an idle pool of size zero.

use std::fmt;
use std::time::Duration;

use reqwest::tls::Version as TlsVersion;
use serde::{Deserialize, Serialize};

const DEFAULT_USER_AGENT: &str = concat!("courier/", env!("CARGO_PKG_VERSION"));

/// Transport configuration for the HTTP client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Maximum time to establish a TCP connection.
    pub connect_timeout: Duration,
    /// TCP keep-alive interval for open connections.
    pub tcp_keepalive: Duration,
    /// How long an idle pooled connection is kept around.
    pub pool_idle_timeout: Duration,
    /// Per-host cap on idle pooled connections.
    pub max_idle_per_host: usize,
    /// Overall request timeout, used when a request carries no timeout of its own.
    pub request_timeout: Duration,
    pub min_tls: TlsVersion,
    pub max_tls: TlsVersion,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(8),
            tcp_keepalive: Duration::from_secs(30),
            pool_idle_timeout: Duration::from_secs(60),
            max_idle_per_host: 50,
            request_timeout: Duration::from_secs(30),
            min_tls: TlsVersion::TLS_1_2,
            max_tls: TlsVersion::TLS_1_3,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug, Clone, Default)]
pub struct ClientConfigBuilder {
    inner: ClientConfig,
}

impl ClientConfigBuilder {
    #[inline]
    fn map(mut self, f: impl FnOnce(&mut ClientConfig)) -> Self {
        f(&mut self.inner);
        self
    }

    pub fn connect_timeout(self, d: Duration) -> Self { self.map(|c| c.connect_timeout = d) }
    pub fn tcp_keepalive(self, d: Duration) -> Self { self.map(|c| c.tcp_keepalive = d) }
    pub fn pool_idle_timeout(self, d: Duration) -> Self { self.map(|c| c.pool_idle_timeout = d) }
    pub fn max_idle_per_host(self, n: usize) -> Self { self.map(|c| c.max_idle_per_host = n) }
    pub fn request_timeout(self, d: Duration) -> Self { self.map(|c| c.request_timeout = d) }
    pub fn tls_range(self, min: TlsVersion, max: TlsVersion) -> Self {
        self.map(|c| {
            c.min_tls = min;
            c.max_tls = max;
        })
    }
    pub fn user_agent<S: Into<String>>(self, ua: S) -> Self { self.map(|c| c.user_agent = ua.into()) }

    /// Apply multiple changes in one go.
    pub fn with(self, f: impl FnOnce(&mut ClientConfig)) -> Self { self.map(f) }

    /// Validate and build the final config.
    pub fn build(self) -> Result<ClientConfig, ClientConfigError> {
        validate(&self.inner)?;
        Ok(self.inner)
    }
}

// ---------- Validation ----------

#[derive(Debug, Clone)]
pub enum ClientConfigError {
    ZeroTimeout(&'static str),
    TlsRangeInverted,
    ZeroIdlePool,
}

impl fmt::Display for ClientConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientConfigError::ZeroTimeout(name) => write!(f, "{name} must be greater than zero"),
            ClientConfigError::TlsRangeInverted => write!(f, "minimum TLS version is above the maximum"),
            ClientConfigError::ZeroIdlePool => write!(f, "max_idle_per_host must be at least 1"),
        }
    }
}
impl std::error::Error for ClientConfigError {}

fn tls_rank(v: TlsVersion) -> u8 {
    if v == TlsVersion::TLS_1_0 {
        0
    } else if v == TlsVersion::TLS_1_1 {
        1
    } else if v == TlsVersion::TLS_1_2 {
        2
    } else {
        3
    }
}

fn validate(c: &ClientConfig) -> Result<(), ClientConfigError> {
    if c.connect_timeout.is_zero() {
        return Err(ClientConfigError::ZeroTimeout("connect_timeout"));
    }
    if c.request_timeout.is_zero() {
        return Err(ClientConfigError::ZeroTimeout("request_timeout"));
    }
    if tls_rank(c.min_tls) > tls_rank(c.max_tls) {
        return Err(ClientConfigError::TlsRangeInverted);
    }
    if c.max_idle_per_host == 0 {
        return Err(ClientConfigError::ZeroIdlePool);
    }
    Ok(())
}

// ---------- Request options ----------

/// Runtime options attached to a request configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Options {
    pub verbose: bool,
    /// Send the request; `false` means preview only.
    pub send_request: bool,
    pub dump_request: bool,
    pub dump_response: bool,
    /// Drop query parameters that end up with no values.
    pub sanitize_query: bool,
    /// Drop headers that end up with no values.
    pub sanitize_headers: bool,
    /// Drop cookies with an empty value.
    pub sanitize_cookies: bool,
    /// Request timeout in seconds. Zero falls back to the client default.
    pub timeout: u64,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            verbose: false,
            send_request: true,
            dump_request: false,
            dump_response: false,
            sanitize_query: true,
            sanitize_headers: true,
            sanitize_cookies: true,
            timeout: 30,
        }
    }
}

impl Options {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout > 0).then(|| Duration::from_secs(self.timeout))
    }
}

/// Whether a boolean flag was given, and with which value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Switch {
    #[default]
    Unset,
    On,
    Off,
}

impl Switch {
    fn apply(self, target: &mut bool) {
        match self {
            Switch::Unset => {}
            Switch::On => *target = true,
            Switch::Off => *target = false,
        }
    }
}

impl From<Option<bool>> for Switch {
    fn from(v: Option<bool>) -> Self {
        match v {
            None => Switch::Unset,
            Some(true) => Switch::On,
            Some(false) => Switch::Off,
        }
    }
}

/// Option values coming from the command line. Only flags that were actually
/// given replace the values already present on a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionOverrides {
    pub verbose: Switch,
    pub send_request: Switch,
    pub dump_request: Switch,
    pub dump_response: Switch,
    pub sanitize_query: Switch,
    pub sanitize_headers: Switch,
    pub sanitize_cookies: Switch,
    pub timeout: Option<u64>,
}

impl OptionOverrides {
    pub fn apply(&self, options: &mut Options) {
        self.verbose.apply(&mut options.verbose);
        self.send_request.apply(&mut options.send_request);
        self.dump_request.apply(&mut options.dump_request);
        self.dump_response.apply(&mut options.dump_response);
        self.sanitize_query.apply(&mut options.sanitize_query);
        self.sanitize_headers.apply(&mut options.sanitize_headers);
        self.sanitize_cookies.apply(&mut options.sanitize_cookies);
        if let Some(t) = self.timeout {
            options.timeout = t;
        }
    }
}
