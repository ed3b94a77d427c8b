//! Seams between the download loop and the transfer engine.

use std::sync::Arc;

use async_trait::async_trait;
use transfer_engine::{TransferEngine, TransferError, TransferHandle, TransferRequest};

/// An in-flight transfer as seen by the download loop.
#[async_trait]
pub trait Transfer: Send + Sync {
    fn expected_size(&self) -> Option<u64>;

    fn bytes_transferred(&self) -> u64;

    /// Fraction between 0.0 and 1.0.
    fn progress(&self) -> f64;

    /// Resolves once the transfer has ended. Must be cancel safe.
    async fn done(&self);

    /// The terminal error, `None` on success or while still running.
    fn error(&self) -> Option<Arc<TransferError>>;

    async fn cancel(&self) -> Result<(), Arc<TransferError>>;
}

/// Starts transfers.
#[async_trait]
pub trait TransferStarter: Send + Sync {
    type Transfer: Transfer;

    async fn start(&self, request: TransferRequest) -> Self::Transfer;
}

#[async_trait]
impl Transfer for TransferHandle {
    fn expected_size(&self) -> Option<u64> {
        TransferHandle::expected_size(self)
    }

    fn bytes_transferred(&self) -> u64 {
        TransferHandle::bytes_transferred(self)
    }

    fn progress(&self) -> f64 {
        TransferHandle::progress(self)
    }

    async fn done(&self) {
        TransferHandle::done(self).await
    }

    fn error(&self) -> Option<Arc<TransferError>> {
        TransferHandle::error(self)
    }

    async fn cancel(&self) -> Result<(), Arc<TransferError>> {
        TransferHandle::cancel(self).await
    }
}

#[async_trait]
impl TransferStarter for TransferEngine {
    type Transfer = TransferHandle;

    async fn start(&self, request: TransferRequest) -> TransferHandle {
        TransferEngine::start(self, request).await
    }
}
