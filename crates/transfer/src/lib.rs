//! Streaming single-file HTTP transfer engine.
//!
//! A transfer is described by a validated [`TransferRequest`] and started with
//! [`TransferEngine::start`]. The body is written to `<destination>.part` on a
//! background task and renamed into place once complete, so an existing file
//! at the destination is only replaced by a finished transfer.

mod config;
mod engine;
mod error;
mod handle;
mod request;

pub use config::{
    DEFAULT_USER_AGENT, DEFAULT_WRITE_BUFFER, TransferConfig, create_client,
    install_rustls_provider,
};
pub use engine::TransferEngine;
pub use error::TransferError;
pub use handle::{TransferHandle, TransferOutcome};
pub use request::{STAGING_SUFFIX, TransferRequest};
