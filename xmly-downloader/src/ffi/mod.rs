//! C ABI over [`crate::service::XmlyService`].
//!
//! See `include/xmly_downloader.h` for the C declarations. Every export
//! blocks the calling thread on a shared tokio runtime, so they must not be
//! called from inside an async context.

mod callback;
mod exports;
mod runtime;
mod types;

pub use callback::{CallbackSink, UpdateFileLengthCallback};
pub use exports::*;
pub use types::{AlbumInfo, DataError, QrCode, TrackInfo, TrackList, UserInfo};
