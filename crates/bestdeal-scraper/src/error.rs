use bestdeal_core::ErrorKind;
use thiserror::Error;

/// Failures surfaced by a [`crate::browser::PageSession`].
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("failed to launch browser: {0}")]
    Launch(String),

    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("unexpected page: title {title:?} does not mention {expected:?}")]
    UnexpectedPage { title: String, expected: String },

    #[error("element not found: {0}")]
    ElementNotFound(String),

    #[error("timed out after {timeout_ms}ms waiting for {locator}")]
    Timeout { locator: String, timeout_ms: u64 },

    #[error("script evaluation failed: {0}")]
    Script(String),

    #[error("browser protocol error: {0}")]
    Protocol(String),

    #[error("page session is closed")]
    Closed,
}

impl From<chromiumoxide::error::CdpError> for BrowserError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        BrowserError::Protocol(err.to_string())
    }
}

/// Terminal failure of one adapter invocation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct ScrapeFailure {
    pub kind: ErrorKind,
    pub message: String,
}

impl ScrapeFailure {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Problems building a [`crate::registry::SourceRegistry`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("source {0:?} is registered twice")]
    DuplicateSource(String),

    #[error("unknown source key {0:?}")]
    UnknownSource(String),

    #[error("no sources configured")]
    Empty,
}
