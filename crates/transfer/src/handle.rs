use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;

use crate::{TransferError, TransferRequest};

/// How a transfer ended.
#[derive(Debug, Clone)]
pub enum TransferOutcome {
    /// The whole body was written and moved into place.
    Completed,
    /// The transfer stopped because [`TransferHandle::cancel`] was called.
    Cancelled,
    /// The transfer stopped on an error.
    Failed(Arc<TransferError>),
}

/// State shared between a handle and the task writing the body.
#[derive(Debug, Default)]
pub(crate) struct TransferState {
    bytes_transferred: AtomicU64,
    outcome: OnceLock<TransferOutcome>,
    finished: CancellationToken,
}

impl TransferState {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn add_bytes(&self, n: u64) {
        self.bytes_transferred.fetch_add(n, Ordering::Relaxed);
    }

    /// Record the outcome and release everyone waiting on completion.
    pub(crate) fn finish(&self, outcome: TransferOutcome) {
        if self.outcome.set(outcome).is_err() {
            debug!("Transfer outcome already recorded");
        }
        self.finished.cancel();
    }
}

/// Handle to a transfer started by [`crate::TransferEngine::start`].
///
/// All accessors are read-only queries against counters owned by the
/// transfer task, so the handle can be polled from any task without locking.
#[derive(Debug, Clone)]
pub struct TransferHandle {
    request: TransferRequest,
    expected_size: Option<u64>,
    state: Arc<TransferState>,
    cancel_token: CancellationToken,
}

impl TransferHandle {
    pub(crate) fn new(
        request: TransferRequest,
        expected_size: Option<u64>,
        state: Arc<TransferState>,
        cancel_token: CancellationToken,
    ) -> Self {
        Self {
            request,
            expected_size,
            state,
            cancel_token,
        }
    }

    /// A handle whose transfer failed before any byte was written.
    pub(crate) fn failed(request: TransferRequest, error: TransferError) -> Self {
        let state = TransferState::new();
        state.finish(TransferOutcome::Failed(Arc::new(error)));
        Self::new(request, None, state, CancellationToken::new())
    }

    pub fn url(&self) -> &Url {
        self.request.url()
    }

    pub fn destination(&self) -> &Path {
        self.request.destination()
    }

    /// Size announced by the server, if any.
    pub fn expected_size(&self) -> Option<u64> {
        self.expected_size
    }

    pub fn bytes_transferred(&self) -> u64 {
        self.state.bytes_transferred.load(Ordering::Relaxed)
    }

    /// Fraction of the body transferred so far, `0.0` while the size is unknown.
    pub fn progress(&self) -> f64 {
        match self.expected_size {
            Some(size) if size > 0 => (self.bytes_transferred() as f64 / size as f64).min(1.0),
            _ => 0.0,
        }
    }

    pub fn is_done(&self) -> bool {
        self.state.finished.is_cancelled()
    }

    /// Resolves once the transfer has ended, for whatever reason.
    pub async fn done(&self) {
        self.state.finished.cancelled().await;
    }

    /// The recorded outcome, `None` while the transfer is still running.
    pub fn outcome(&self) -> Option<TransferOutcome> {
        self.state.outcome.get().cloned()
    }

    /// The error the transfer ended with, if it ended unsuccessfully.
    pub fn error(&self) -> Option<Arc<TransferError>> {
        match self.state.outcome.get()? {
            TransferOutcome::Completed => None,
            TransferOutcome::Cancelled => Some(Arc::new(TransferError::Cancelled)),
            TransferOutcome::Failed(e) => Some(Arc::clone(e)),
        }
    }

    /// Request cancellation and wait for the transfer task to settle.
    ///
    /// Returns `Ok` when the transfer stopped because of the cancellation or
    /// had already completed; otherwise returns the error the transfer
    /// actually ended with.
    pub async fn cancel(&self) -> Result<(), Arc<TransferError>> {
        self.cancel_token.cancel();
        self.done().await;

        match self.state.outcome.get() {
            Some(TransferOutcome::Completed) | Some(TransferOutcome::Cancelled) => Ok(()),
            Some(TransferOutcome::Failed(e)) => Err(Arc::clone(e)),
            None => Err(Arc::new(TransferError::Aborted {
                reason: "transfer finished without an outcome".to_string(),
            })),
        }
    }
}
