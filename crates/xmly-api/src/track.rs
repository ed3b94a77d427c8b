use reqwest::header::{COOKIE, REFERER, USER_AGENT};
use tracing::debug;

use crate::client::{PC_UA, XmlyClient, timestamp_millis};
use crate::crypto::decrypt_play_url;
use crate::error::check_ret;
use crate::models::{PaidTrackResponse, Track};
use crate::ApiError;

impl XmlyClient {
    /// Resolve the play URL of a paid or VIP track.
    ///
    /// The returned track carries the decrypted URL of the best quality in
    /// `play_path_aacv164`.
    pub async fn paid_track_info(&self, track_id: i64, cookie: &str) -> Result<Track, ApiError> {
        let url = format!(
            "{}/mobile-playpage/track/v3/baseInfo/{}",
            self.endpoints.web,
            timestamp_millis()
        );
        let response: PaidTrackResponse = self
            .client
            .get(&url)
            .header(USER_AGENT, PC_UA)
            .header(REFERER, "https://www.ximalaya.com/")
            .header(COOKIE, cookie)
            .query(&[
                ("device", "web".to_string()),
                ("trackId", track_id.to_string()),
                ("trackQualityLevel", "2".to_string()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        check_ret(response.ret, response.msg.as_deref())?;
        let info = response
            .track_info
            .ok_or_else(|| ApiError::InvalidResponse("response has no trackInfo".to_string()))?;
        let best = info
            .play_url_list
            .iter()
            .max_by_key(|p| p.quality_level)
            .ok_or_else(|| ApiError::InvalidResponse("track has no play url".to_string()))?;
        let play_url = decrypt_play_url(&best.url)?;
        debug!(track_id, quality = best.quality_level, "resolved paid track url");

        Ok(Track {
            track_id: info.track_id,
            title: info.title,
            duration: info.duration,
            play_path_aacv164: Some(play_url),
            ..Track::default()
        })
    }
}
