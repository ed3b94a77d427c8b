//! Lazily built process state shared by every export.

use std::future::Future;
use std::sync::OnceLock;

use tokio::runtime::{Builder, Handle, Runtime};
use tracing::{error, info};

use crate::config::Settings;
use crate::logging::{LoggingGuard, init_logging};
use crate::service::XmlyService;
use crate::{Error, Result};

pub(crate) struct Context {
    runtime: Runtime,
    service: XmlyService,
    _logging: LoggingGuard,
}

const REENTRANT_CALL: &str =
    "xmly functions cannot be called from a progress callback or an async runtime";

static CONTEXT: OnceLock<std::result::Result<Context, String>> = OnceLock::new();

fn build() -> Result<Context> {
    let settings = Settings::from_env()?;
    let logging = init_logging(&settings)?;
    let runtime = Builder::new_multi_thread()
        .enable_all()
        .thread_name("xmly-worker")
        .build()?;
    let service = XmlyService::from_settings(&settings)?;
    info!(
        poll_interval_ms = settings.poll_interval.as_millis() as u64,
        stall_threshold = settings.stall_threshold,
        "xmly downloader initialised"
    );
    Ok(Context {
        runtime,
        service,
        _logging: logging,
    })
}

fn context() -> std::result::Result<&'static Context, String> {
    CONTEXT
        .get_or_init(|| {
            build().map_err(|e| {
                error!(error = %e, "Failed to initialise xmly downloader");
                e.to_string()
            })
        })
        .as_ref()
        .map_err(Clone::clone)
}

/// Run `f` against the shared service on the shared runtime, blocking the caller.
///
/// Errors, including initialisation failures, come back as boundary messages.
/// Calls made from inside a runtime, such as from a progress callback, are
/// refused.
pub(crate) fn block_on<T, F, Fut>(f: F) -> std::result::Result<T, String>
where
    F: FnOnce(&'static XmlyService) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    if Handle::try_current().is_ok() {
        return Err(REENTRANT_CALL.to_string());
    }
    let ctx = context()?;
    ctx.runtime
        .block_on(f(&ctx.service))
        .map_err(|e: Error| e.to_string())
}
