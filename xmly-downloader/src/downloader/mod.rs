//! Single-file downloads with progress reporting and stall detection.
//!
//! [`Downloader::download`] starts a transfer, reports `(total, 0)` once,
//! accepts an existing file of the announced size as already downloaded, and
//! otherwise polls the transfer with [`monitor::watch`] until it ends.

pub mod monitor;
pub mod probe;
pub mod progress;
pub mod transfer;

use std::path::Path;

use serde::Serialize;
use tracing::{info, instrument};
use transfer_engine::{TransferEngine, TransferRequest};

use crate::Result;
pub use monitor::{MonitorConfig, StallCounter};
pub use progress::{NoProgress, ProgressSample, ProgressSink};
pub use transfer::{Transfer, TransferStarter};

/// How a successful download ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Completion {
    /// The body was transferred and written to the destination.
    Transferred,
    /// A file of the expected size was already present; nothing was written.
    AlreadyPresent,
}

pub struct Downloader<S = TransferEngine> {
    starter: S,
    monitor: MonitorConfig,
}

impl<S: TransferStarter> Downloader<S> {
    pub fn new(starter: S, monitor: MonitorConfig) -> Self {
        Self { starter, monitor }
    }

    pub fn monitor_config(&self) -> &MonitorConfig {
        &self.monitor
    }

    /// Download `url` to `destination`, reporting progress under `transfer_id`.
    #[instrument(skip(self, destination, sink), fields(path = %destination.as_ref().display()))]
    pub async fn download(
        &self,
        url: &str,
        destination: impl AsRef<Path>,
        transfer_id: i64,
        sink: &dyn ProgressSink,
    ) -> Result<Completion> {
        let destination = destination.as_ref();
        let request = TransferRequest::new(destination, url)?;
        let transfer = self.starter.start(request).await;

        let expected_size = transfer.expected_size();
        sink.on_progress(ProgressSample {
            transfer_id,
            expected_size,
            bytes_transferred: 0,
        });

        if let Some(size) = expected_size
            && probe::existing_file_size(destination).await == Some(size)
        {
            info!(transfer_id, size, "Destination already complete, skipping");
            transfer.cancel().await.map_err(crate::Error::Cancel)?;
            return Ok(Completion::AlreadyPresent);
        }

        monitor::watch(&transfer, transfer_id, &self.monitor, sink).await?;
        info!(transfer_id, bytes = transfer.bytes_transferred(), "Download finished");
        Ok(Completion::Transferred)
    }
}
