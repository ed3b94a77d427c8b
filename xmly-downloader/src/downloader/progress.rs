/// One progress report for a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSample {
    pub transfer_id: i64,
    /// Total size announced by the server, `None` if unknown.
    pub expected_size: Option<u64>,
    pub bytes_transferred: u64,
}

impl ProgressSample {
    /// The total as a signed integer, `-1` when unknown.
    pub fn total_or_unknown(&self) -> i64 {
        self.expected_size
            .and_then(|size| i64::try_from(size).ok())
            .unwrap_or(-1)
    }
}

/// Receives progress reports.
///
/// Implementations may be called concurrently from several transfers and
/// must not block.
pub trait ProgressSink: Send + Sync {
    fn on_progress(&self, sample: ProgressSample);
}

impl<F> ProgressSink for F
where
    F: Fn(ProgressSample) + Send + Sync,
{
    fn on_progress(&self, sample: ProgressSample) {
        self(sample)
    }
}

/// Discards every report.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_progress(&self, _sample: ProgressSample) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn unknown_total_is_negative_one() {
        let sample = ProgressSample {
            transfer_id: 1,
            expected_size: None,
            bytes_transferred: 10,
        };
        assert_eq!(sample.total_or_unknown(), -1);
        let sized = ProgressSample {
            expected_size: Some(4096),
            ..sample
        };
        assert_eq!(sized.total_or_unknown(), 4096);
    }

    #[test]
    fn closures_are_sinks() {
        let seen = Mutex::new(Vec::new());
        let sink = |s: ProgressSample| seen.lock().unwrap().push(s.bytes_transferred);
        sink.on_progress(ProgressSample {
            transfer_id: 3,
            expected_size: Some(2),
            bytes_transferred: 1,
        });
        NoProgress.on_progress(ProgressSample {
            transfer_id: 3,
            expected_size: Some(2),
            bytes_transferred: 2,
        });
        assert_eq!(*seen.lock().unwrap(), vec![1]);
    }
}
