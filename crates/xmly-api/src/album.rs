use reqwest::header::USER_AGENT;
use tracing::debug;

use crate::client::{ANDROID_UA, XmlyClient, timestamp_millis};
use crate::error::check_ret;
use crate::models::{Album, AlbumResponse, TrackListResponse, TrackPage};
use crate::ApiError;

/// Tracks per listing page.
pub const TRACK_PAGE_SIZE: u32 = 20;

impl XmlyClient {
    /// Fetch the album summary.
    pub async fn album_info(&self, album_id: i64) -> Result<Album, ApiError> {
        let url = format!(
            "{}/mobile/v1/album/ts-{}",
            self.endpoints.mobile,
            timestamp_millis()
        );
        let response: AlbumResponse = self
            .client
            .get(&url)
            .header(USER_AGENT, ANDROID_UA)
            .query(&[
                ("albumId", album_id.to_string()),
                ("device", "android".to_string()),
                ("isAsc", "true".to_string()),
                ("pageId", "1".to_string()),
                ("pageSize", "1".to_string()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        check_ret(response.ret, response.msg.as_deref())?;
        let album = response
            .data
            .map(|d| d.album)
            .ok_or_else(|| ApiError::InvalidResponse("album response has no data".to_string()))?;
        debug!(album_id, title = %album.title, tracks = album.track_count, "fetched album");
        Ok(album)
    }

    /// Fetch one page of an album's tracks. Pages start at 1.
    pub async fn track_list(
        &self,
        album_id: i64,
        page_id: u32,
        is_asc: bool,
    ) -> Result<TrackPage, ApiError> {
        let url = format!(
            "{}/mobile/v1/album/track/ts-{}",
            self.endpoints.mobile,
            timestamp_millis()
        );
        let response: TrackListResponse = self
            .client
            .get(&url)
            .header(USER_AGENT, ANDROID_UA)
            .query(&[
                ("albumId", album_id.to_string()),
                ("device", "android".to_string()),
                ("isAsc", is_asc.to_string()),
                ("pageId", page_id.max(1).to_string()),
                ("pageSize", TRACK_PAGE_SIZE.to_string()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        check_ret(response.ret, response.msg.as_deref())?;
        let page = response.data.ok_or_else(|| {
            ApiError::InvalidResponse("track list response has no data".to_string())
        })?;
        debug!(
            album_id,
            page_id,
            max_page_id = page.max_page_id,
            tracks = page.list.len(),
            "fetched track page"
        );
        Ok(page)
    }
}
