use std::time::Duration;
use thiserror::Error;

/// Failure talking to one of the external collaborators.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{service} returned HTTP {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("Failed to parse {service} response: {message}")]
    Parse {
        service: &'static str,
        message: String,
    },

    #[error("{0} is not configured")]
    NotConfigured(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
}

impl SourceError {
    pub fn not_configured(what: impl Into<String>) -> Self {
        Self::NotConfigured(what.into())
    }

    /// Short label used when grouping failures in logs
    pub fn category(&self) -> &'static str {
        match self {
            SourceError::Http(_) => "http",
            SourceError::Status { .. } => "status",
            SourceError::Parse { .. } => "parse",
            SourceError::NotConfigured(_) => "not_configured",
            SourceError::Timeout(_) => "timeout",
        }
    }
}
