use std::path::PathBuf;

use crate::config::ClientConfigError;

/// Which side of the exchange a safe dump was working on when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DumpStage {
    Request,
    Response,
}

impl std::fmt::Display for DumpStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DumpStage::Request => f.write_str("request"),
            DumpStage::Response => f.write_str("response"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Invalid header {name:?}: {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("Invalid method: {0:?}")]
    InvalidMethod(String),

    #[error("Wrong {expected} pair format: {raw}")]
    MalformedPair { raw: String, expected: &'static str },

    #[error("Cannot read attachment {}: {source}", path.display())]
    Attachment {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unknown body type: {0}")]
    UnknownBodyType(String),

    #[error("No content supplied for {0} body")]
    MissingContent(&'static str),

    #[error("Invalid body: {0}")]
    InvalidBody(String),

    #[error("Body is not valid JSON: {0}")]
    InvalidJsonBody(#[source] serde_json::Error),

    #[error("Cannot decode request file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Multipart builder already closed")]
    BuilderClosed,

    #[error("Send failed: {0}")]
    SendFailed(#[source] reqwest::Error),

    #[error("Cannot set up HTTP client: {0}")]
    ClientSetup(#[source] reqwest::Error),

    #[error("Dumping {stage} failed: {source}")]
    Dump {
        stage: DumpStage,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid client configuration: {0}")]
    Config(#[from] ClientConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed HTTP message: {0}")]
    Malformed(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn invalid_url(url: impl Into<String>, reason: impl ToString) -> Self {
        Error::InvalidUrl { url: url.into(), reason: reason.to_string() }
    }

    pub(crate) fn invalid_header(name: impl Into<String>, reason: impl ToString) -> Self {
        Error::InvalidHeader { name: name.into(), reason: reason.to_string() }
    }

    pub(crate) fn attachment(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Attachment { path: path.into(), source }
    }
}
