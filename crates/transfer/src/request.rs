use std::ffi::OsString;
use std::path::{Path, PathBuf};

use url::Url;

use crate::TransferError;

/// Suffix appended to the destination while the body is being written.
pub const STAGING_SUFFIX: &str = ".part";

/// A validated request to transfer one remote file to one local path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    url: Url,
    destination: PathBuf,
}

impl TransferRequest {
    /// Validate `url` and `destination`.
    ///
    /// Fails for unparsable URLs, schemes other than `http`/`https`, an empty
    /// destination, or a destination that is an existing directory.
    pub fn new(destination: impl Into<PathBuf>, url: &str) -> Result<Self, TransferError> {
        let destination = destination.into();

        let parsed = Url::parse(url.trim())
            .map_err(|e| TransferError::invalid_url(url, e.to_string()))?;
        match parsed.scheme() {
            "http" | "https" => {}
            other => {
                return Err(TransferError::UnsupportedProtocol {
                    protocol: other.to_string(),
                });
            }
        }

        if destination.as_os_str().is_empty() {
            return Err(TransferError::invalid_destination(
                destination,
                "path is empty",
            ));
        }
        if destination.is_dir() {
            return Err(TransferError::invalid_destination(
                destination,
                "path is a directory",
            ));
        }

        Ok(Self {
            url: parsed,
            destination,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Path the body is streamed into before being renamed over the destination.
    pub fn staging_path(&self) -> PathBuf {
        let mut name = OsString::from(self.destination.as_os_str());
        name.push(STAGING_SUFFIX);
        PathBuf::from(name)
    }
}
