//! Progress polling and stall detection for a running transfer.

use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, warn};

use super::progress::{ProgressSample, ProgressSink};
use super::transfer::Transfer;
use crate::{Error, Result};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);
pub const DEFAULT_STALL_THRESHOLD: u32 = 20;

/// Polling cadence and stall threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorConfig {
    pub poll_interval: Duration,
    /// Consecutive unchanged samples after which the transfer is cancelled.
    pub stall_threshold: u32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            stall_threshold: DEFAULT_STALL_THRESHOLD,
        }
    }
}

/// Counts consecutive samples that show no progress.
///
/// A sample is unchanged when both the fraction and the byte count equal the
/// previous sample. The baseline is the initial `(0.0, 0)` report.
#[derive(Debug, Clone, Default)]
pub struct StallCounter {
    last_fraction: f64,
    last_bytes: u64,
    stalled: u32,
}

impl StallCounter {
    /// Record a sample and return the number of consecutive unchanged samples.
    pub fn observe(&mut self, fraction: f64, bytes: u64) -> u32 {
        if fraction == self.last_fraction && bytes == self.last_bytes {
            self.stalled += 1;
        } else {
            self.last_fraction = fraction;
            self.last_bytes = bytes;
            self.stalled = 0;
        }
        self.stalled
    }

    pub fn stalled(&self) -> u32 {
        self.stalled
    }
}

/// Poll `transfer` until it completes or stalls.
///
/// Each tick first evaluates the stall threshold, then samples the transfer
/// and reports the sample to `sink`. Completion is checked before the tick,
/// so a transfer finishing on the same tick as a stall still succeeds.
pub async fn watch<T>(
    transfer: &T,
    transfer_id: i64,
    config: &MonitorConfig,
    sink: &dyn ProgressSink,
) -> Result<()>
where
    T: Transfer + ?Sized,
{
    let period = config.poll_interval.max(Duration::from_millis(1));
    let threshold = config.stall_threshold.max(1);
    let expected_size = transfer.expected_size();
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut stall = StallCounter::default();

    loop {
        tokio::select! {
            biased;

            _ = transfer.done() => {
                return match transfer.error() {
                    Some(e) => {
                        warn!(transfer_id, error = %e, "Transfer failed");
                        Err(Error::DownloadFailed(e))
                    }
                    None => {
                        debug!(transfer_id, bytes = transfer.bytes_transferred(), "Transfer completed");
                        Ok(())
                    }
                };
            }

            _ = ticker.tick() => {
                if stall.stalled() >= threshold {
                    warn!(
                        transfer_id,
                        bytes = transfer.bytes_transferred(),
                        samples = stall.stalled(),
                        "Transfer stalled, cancelling"
                    );
                    return match transfer.cancel().await {
                        Ok(()) => Err(Error::StallTimeout),
                        Err(e) => Err(Error::StallTimeoutCancelFailed(e)),
                    };
                }

                let bytes = transfer.bytes_transferred();
                stall.observe(transfer.progress(), bytes);
                sink.on_progress(ProgressSample {
                    transfer_id,
                    expected_size,
                    bytes_transferred: bytes,
                });
            }
        }
    }
}
