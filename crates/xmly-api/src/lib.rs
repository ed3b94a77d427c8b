//! # xmly-api
//!
//! Async client for the Ximalaya album, track, account and QR login APIs.
//!
//! ```no_run
//! # async fn run() -> Result<(), xmly_api::ApiError> {
//! let client = xmly_api::XmlyClient::new(xmly_api::default_client()?);
//! let album = client.album_info(3_595_841).await?;
//! let page = client.track_list(album.album_id, 1, true).await?;
//! println!("{} has {} pages", album.title, page.max_page_id);
//! # Ok(())
//! # }
//! ```

mod album;
pub mod client;
pub mod crypto;
pub mod error;
pub mod models;
mod qr_login;
mod track;
mod user;

pub use album::TRACK_PAGE_SIZE;
pub use client::{ANDROID_UA, Endpoints, PC_UA, XmlyClient, create_client_builder, default_client};
pub use crypto::decrypt_play_url;
pub use error::ApiError;
pub use models::{Album, AlbumType, QrCode, QrStatus, Track, TrackPage, UserInfo};
