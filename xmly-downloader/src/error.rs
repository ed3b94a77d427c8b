//! Application error type.
//!
//! `Display` of each variant is the exact message handed across the C
//! boundary, so the wording here is part of the public contract.

use std::sync::Arc;

use thiserror::Error;
use transfer_engine::TransferError;
use xmly_api::ApiError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Upstream API failure, surfaced verbatim.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The transfer could not be constructed (bad URL or destination).
    #[error(transparent)]
    Transfer(#[from] TransferError),

    /// Cancelling a transfer superseded by an existing file failed.
    #[error(transparent)]
    Cancel(Arc<TransferError>),

    #[error("download failed: timed out")]
    StallTimeout,

    #[error("download failed: timed out: {0}")]
    StallTimeoutCancelFailed(Arc<TransferError>),

    #[error("download failed: {0}")]
    DownloadFailed(Arc<TransferError>),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Whether the error is the stall timeout, with or without a failed cancel.
    pub fn is_stall(&self) -> bool {
        matches!(self, Self::StallTimeout | Self::StallTimeoutCancelFailed(_))
    }
}
