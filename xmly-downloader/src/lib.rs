//! # xmly-downloader
//!
//! Album, track and account lookups plus single-file downloads with progress
//! reporting and stall detection, usable from Rust through
//! [`service::XmlyService`] and from C through [`ffi`].
//!
//! A download reports `(total, 0)` once, then polls the transfer every
//! `poll_interval`. A transfer whose progress does not move for
//! `stall_threshold` consecutive polls is cancelled and reported as
//! `download failed: timed out`. A destination that already holds a file of
//! the announced size is accepted without downloading.

pub mod config;
pub mod downloader;
pub mod error;
pub mod ffi;
pub mod logging;
pub mod service;
pub mod utils;

pub use config::Settings;
pub use downloader::{
    Completion, Downloader, MonitorConfig, NoProgress, ProgressSample, ProgressSink,
};
pub use error::{Error, Result};
pub use logging::{DEFAULT_LOG_FILTER, LoggingGuard, init_logging};
pub use service::XmlyService;
