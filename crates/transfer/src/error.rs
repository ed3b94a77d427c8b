use std::path::{Path, PathBuf};

use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("invalid URL `{input}`: {reason}")]
    InvalidUrl { input: String, reason: String },

    #[error("unsupported protocol `{protocol}`")]
    UnsupportedProtocol { protocol: String },

    #[error("invalid destination `{}`: {reason}", .path.display())]
    InvalidDestination { path: PathBuf, reason: String },

    #[error("HTTP request failed: {source}")]
    Network {
        #[from]
        source: reqwest::Error,
    },

    #[error("request failed with HTTP {status} for {url}")]
    HttpStatus { status: StatusCode, url: String },

    #[error("I/O error while {operation} `{}`: {source}", .path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("transfer ended after {received} of {expected} bytes")]
    Incomplete { expected: u64, received: u64 },

    #[error("transfer cancelled")]
    Cancelled,

    #[error("transfer task aborted: {reason}")]
    Aborted { reason: String },

    #[error("configuration error: {reason}")]
    Configuration { reason: String },
}

impl TransferError {
    pub fn invalid_url(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidUrl {
            input: input.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_destination(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidDestination {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn io(operation: &'static str, path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            operation,
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    /// Whether the request itself was rejected before any transfer was attempted.
    pub fn is_construction_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidUrl { .. } | Self::UnsupportedProtocol { .. } | Self::InvalidDestination { .. }
        )
    }
}
