//! Boundary operations in native types.
//!
//! Each call goes straight to the API client or the downloader; text that may
//! end up in a file name is passed through [`format_file_name`].

use std::path::Path;

use serde::Serialize;
use tracing::{debug, instrument};
use transfer_engine::{TransferEngine, create_client};
use xmly_api::{AlbumType, ApiError, Endpoints, Track, XmlyClient, create_client_builder};

use crate::config::Settings;
use crate::downloader::{Completion, Downloader, ProgressSink, TransferStarter};
use crate::utils::format_file_name;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlbumSummary {
    pub title: String,
    pub track_count: i32,
    pub album_type: AlbumType,
    pub free_track_ids: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackRecord {
    pub track_id: i64,
    pub title: String,
    pub duration: i32,
    pub play_url32: Option<String>,
    pub play_url64: Option<String>,
    pub play_path_aacv224: Option<String>,
    pub play_path_aacv164: Option<String>,
}

impl From<Track> for TrackRecord {
    fn from(track: Track) -> Self {
        Self {
            track_id: track.track_id,
            title: format_file_name(&track.title),
            duration: track.duration,
            play_url32: track.play_url32,
            play_url64: track.play_url64,
            play_path_aacv224: track.play_path_aacv224,
            play_path_aacv164: track.play_path_aacv164,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackPage {
    pub max_page_id: i32,
    pub tracks: Vec<TrackRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub ret: i32,
    pub msg: String,
    pub uid: i64,
    pub is_vip: bool,
    pub nickname: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QrCodeSession {
    pub ret: i32,
    pub msg: String,
    pub qr_id: String,
    /// Base64 encoded PNG.
    pub img: String,
}

pub struct XmlyService<S = TransferEngine> {
    api: XmlyClient,
    downloader: Downloader<S>,
}

impl XmlyService<TransferEngine> {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let api_client = create_client_builder(Some(settings.api_timeout))
            .build()
            .map_err(ApiError::from)?;
        let transfer_config = settings.transfer_config();
        let transfer_client = create_client(&transfer_config)?;
        let engine = TransferEngine::with_client(transfer_client, transfer_config);

        let mut api = XmlyClient::new(api_client);
        if let Some(base) = &settings.api_base_url {
            api = api.with_endpoints(Endpoints::single_host(base.clone()));
        }

        Ok(Self::new(
            api,
            Downloader::new(engine, settings.monitor()),
        ))
    }
}

impl<S: TransferStarter> XmlyService<S> {
    pub fn new(api: XmlyClient, downloader: Downloader<S>) -> Self {
        Self { api, downloader }
    }

    pub fn api(&self) -> &XmlyClient {
        &self.api
    }

    #[instrument(skip(self))]
    pub async fn album_info(&self, album_id: i64) -> Result<AlbumSummary> {
        let album = self.api.album_info(album_id).await?;
        Ok(AlbumSummary {
            album_type: album.album_type(),
            free_track_ids: album.free_track_ids().map(str::to_string),
            title: album.title,
            track_count: album.track_count,
        })
    }

    #[instrument(skip(self))]
    pub async fn track_list(&self, album_id: i64, page_id: u32, is_asc: bool) -> Result<TrackPage> {
        let page = self.api.track_list(album_id, page_id, is_asc).await?;
        Ok(TrackPage {
            max_page_id: page.max_page_id,
            tracks: page.list.into_iter().map(TrackRecord::from).collect(),
        })
    }

    #[instrument(skip(self, cookie))]
    pub async fn charge_track_info(&self, track_id: i64, cookie: &str) -> Result<TrackRecord> {
        let track = self.api.paid_track_info(track_id, cookie).await?;
        Ok(TrackRecord::from(track))
    }

    pub async fn download_file(
        &self,
        url: &str,
        destination: impl AsRef<Path>,
        transfer_id: i64,
        sink: &dyn ProgressSink,
    ) -> Result<Completion> {
        self.downloader
            .download(url, destination, transfer_id, sink)
            .await
    }

    #[instrument(skip(self, cookie))]
    pub async fn user_info(&self, cookie: &str) -> Result<UserProfile> {
        let user = self.api.user_info(cookie).await?;
        Ok(UserProfile {
            ret: user.ret,
            msg: user.msg,
            uid: user.uid,
            is_vip: user.is_vip,
            nickname: format_file_name(&user.nickname),
        })
    }

    pub async fn qr_code(&self) -> Result<QrCodeSession> {
        let qr = self.api.generate_qr().await?;
        Ok(QrCodeSession {
            ret: qr.ret,
            msg: qr.msg,
            qr_id: qr.qr_id,
            img: qr.img,
        })
    }

    /// The login cookie once the QR code has been confirmed.
    ///
    /// Lookup failures are indistinguishable from a pending login: both
    /// return `None`.
    pub async fn check_qr_code(&self, qr_id: &str) -> Option<String> {
        match self.api.check_qr_status(qr_id).await {
            Ok(status) if status.ret == 0 => status.cookie,
            Ok(status) => {
                debug!(qr_id, ret = status.ret, msg = %status.msg, "QR login not confirmed");
                None
            }
            Err(e) => {
                debug!(qr_id, error = %e, "QR status lookup failed");
                None
            }
        }
    }
}
