//! The process-wide progress callback.

use std::ffi::{c_int, c_long};
use std::sync::OnceLock;

use tracing::{debug, warn};

use crate::downloader::{ProgressSample, ProgressSink};

/// `(transfer_id, &total, &bytes_transferred)`. `total` is `-1` when unknown.
pub type UpdateFileLengthCallback =
    extern "C" fn(id: c_int, total: *const c_long, current: *const c_long);

static CALLBACK: OnceLock<UpdateFileLengthCallback> = OnceLock::new();

/// Store the callback. Returns `false` if one was already registered.
pub fn register(callback: UpdateFileLengthCallback) -> bool {
    let stored = CALLBACK.set(callback).is_ok();
    if stored {
        debug!("Progress callback registered");
    } else {
        warn!("Progress callback already registered, ignoring");
    }
    stored
}

/// Forwards samples to a C callback, or drops them when none is registered.
#[derive(Debug, Clone, Copy)]
pub struct CallbackSink {
    callback: Option<UpdateFileLengthCallback>,
}

impl CallbackSink {
    pub fn registered() -> Self {
        Self {
            callback: CALLBACK.get().copied(),
        }
    }

    pub fn new(callback: UpdateFileLengthCallback) -> Self {
        Self {
            callback: Some(callback),
        }
    }
}

impl ProgressSink for CallbackSink {
    fn on_progress(&self, sample: ProgressSample) {
        let Some(callback) = self.callback else {
            return;
        };
        let id = c_int::try_from(sample.transfer_id).unwrap_or(c_int::MAX);
        let total = c_long::try_from(sample.total_or_unknown()).unwrap_or(c_long::MAX);
        let current = c_long::try_from(sample.bytes_transferred).unwrap_or(c_long::MAX);
        callback(id, &total, &current);
    }
}
