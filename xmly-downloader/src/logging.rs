//! Tracing subscriber setup.

use chrono::Local;
use tracing::debug;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::Writer, time::FormatTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::config::Settings;
use crate::{Error, Result};

pub const DEFAULT_LOG_FILTER: &str = "xmly_downloader=info,xmly_api=info,transfer_engine=info";

const LOG_FILE_PREFIX: &str = "xmly-downloader";

/// Timestamps in the local timezone.
#[derive(Debug, Clone, Copy)]
struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z"))
    }
}

/// Keeps the file writer flushing; drop it only at shutdown.
#[derive(Debug)]
pub struct LoggingGuard {
    _file: Option<WorkerGuard>,
}

/// Install the global subscriber.
///
/// Logs go to stderr and, when `log_dir` is set, to a daily rolling file.
/// If a subscriber is already installed the call leaves it in place.
pub fn init_logging(settings: &Settings) -> Result<LoggingGuard> {
    let directive = settings.log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER);
    let filter = EnvFilter::try_new(directive)
        .map_err(|e| Error::config(format!("invalid log filter {directive:?}: {e}")))?;

    let console_layer = fmt::layer()
        .with_timer(LocalTimer)
        .with_target(true)
        .with_writer(std::io::stderr);

    let (file_layer, guard) = match &settings.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix(LOG_FILE_PREFIX)
                .filename_suffix("log")
                .build(dir)
                .map_err(|e| Error::config(format!("failed to open log directory: {e}")))?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_timer(LocalTimer)
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    if let Err(e) = tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
    {
        debug!(error = %e, "Global subscriber already installed");
    }

    Ok(LoggingGuard { _file: guard })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_filter() {
        let settings = Settings {
            log_filter: Some("xmly_downloader=notalevel".to_string()),
            ..Settings::default()
        };
        assert!(matches!(init_logging(&settings), Err(Error::Configuration(_))));
    }

    #[test]
    fn writes_log_files_into_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let log_dir = dir.path().join("logs");
        let settings = Settings {
            log_dir: Some(log_dir.clone()),
            ..Settings::default()
        };
        let guard = init_logging(&settings).unwrap();
        assert!(log_dir.is_dir());
        drop(guard);
    }
}
