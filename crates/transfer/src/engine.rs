//! # Transfer engine
//!
//! Streams a single HTTP resource to disk on a background task. The caller
//! gets a [`TransferHandle`] as soon as the response headers arrive and can
//! poll it for progress, wait for completion or cancel it.

use std::path::Path;
use std::sync::Arc;

use futures::StreamExt;
use reqwest::{Client, Response};
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::handle::{TransferOutcome, TransferState};
use crate::{TransferConfig, TransferError, TransferHandle, TransferRequest, create_client};

/// Streaming single-file transfer engine.
#[derive(Debug, Clone)]
pub struct TransferEngine {
    client: Client,
    config: TransferConfig,
}

impl TransferEngine {
    /// Create a new engine with its own client.
    pub fn new(config: TransferConfig) -> Result<Self, TransferError> {
        let client = create_client(&config)?;
        Ok(Self { client, config })
    }

    /// Create an engine on top of an existing client.
    pub fn with_client(client: Client, config: TransferConfig) -> Self {
        Self { client, config }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Send the request and start streaming the body in the background.
    ///
    /// Request and status failures do not fail this call; they yield a
    /// handle that is already done with the corresponding error.
    #[instrument(skip(self, request), fields(url = %request.url(), path = %request.destination().display()))]
    pub async fn start(&self, request: TransferRequest) -> TransferHandle {
        let response = match self.client.get(request.url().clone()).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Transfer request failed");
                return TransferHandle::failed(request, e.into());
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "Transfer rejected by server");
            let url = request.url().to_string();
            return TransferHandle::failed(request, TransferError::HttpStatus { status, url });
        }

        let expected_size = response.content_length();
        info!(size = ?expected_size, "Transfer started");

        let state = TransferState::new();
        let cancel_token = CancellationToken::new();
        let handle = TransferHandle::new(
            request.clone(),
            expected_size,
            Arc::clone(&state),
            cancel_token.clone(),
        );

        let body = tokio::spawn(write_body(
            response,
            request,
            expected_size,
            Arc::clone(&state),
            cancel_token,
            self.config.write_buffer,
        ));

        tokio::spawn(async move {
            let outcome = match body.await {
                Ok(Ok(())) => TransferOutcome::Completed,
                Ok(Err(TransferError::Cancelled)) => TransferOutcome::Cancelled,
                Ok(Err(e)) => TransferOutcome::Failed(Arc::new(e)),
                Err(join_err) => TransferOutcome::Failed(Arc::new(TransferError::Aborted {
                    reason: join_err.to_string(),
                })),
            };
            state.finish(outcome);
        });

        handle
    }
}

/// Write the body to the staging file, then move it over the destination.
async fn write_body(
    response: Response,
    request: TransferRequest,
    expected_size: Option<u64>,
    state: Arc<TransferState>,
    token: CancellationToken,
    write_buffer: usize,
) -> Result<(), TransferError> {
    let staging = request.staging_path();

    let result = match stream_to_staging(response, &staging, &state, &token, write_buffer).await {
        Ok(written) => match expected_size {
            Some(expected) if expected != written => Err(TransferError::Incomplete {
                expected,
                received: written,
            }),
            _ => Ok(written),
        },
        Err(e) => Err(e),
    };

    match result {
        Ok(written) => {
            tokio::fs::rename(&staging, request.destination())
                .await
                .map_err(|e| TransferError::io("renaming", &staging, e))?;
            info!(bytes = written, path = %request.destination().display(), "Transfer completed");
            Ok(())
        }
        Err(e) => {
            match &e {
                TransferError::Cancelled => debug!("Transfer cancelled"),
                other => warn!(error = %other, "Transfer failed"),
            }
            if let Err(rm) = tokio::fs::remove_file(&staging).await
                && rm.kind() != std::io::ErrorKind::NotFound
            {
                warn!(path = %staging.display(), error = %rm, "Failed to remove staging file");
            }
            Err(e)
        }
    }
}

async fn stream_to_staging(
    response: Response,
    staging: &Path,
    state: &TransferState,
    token: &CancellationToken,
    write_buffer: usize,
) -> Result<u64, TransferError> {
    if let Some(parent) = staging.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| TransferError::io("creating directory", parent, e))?;
    }

    let file = tokio::fs::File::create(staging)
        .await
        .map_err(|e| TransferError::io("creating", staging, e))?;
    let mut writer = BufWriter::with_capacity(write_buffer, file);
    let mut stream = response.bytes_stream();
    let mut written = 0u64;

    loop {
        let chunk = tokio::select! {
            biased;
            _ = token.cancelled() => return Err(TransferError::Cancelled),
            chunk = stream.next() => chunk,
        };
        let Some(chunk) = chunk else {
            break;
        };
        let bytes = chunk?;

        writer
            .write_all(&bytes)
            .await
            .map_err(|e| TransferError::io("writing", staging, e))?;
        written += bytes.len() as u64;
        state.add_bytes(bytes.len() as u64);
    }

    writer
        .flush()
        .await
        .map_err(|e| TransferError::io("flushing", staging, e))?;
    writer
        .into_inner()
        .sync_all()
        .await
        .map_err(|e| TransferError::io("syncing", staging, e))?;

    Ok(written)
}
