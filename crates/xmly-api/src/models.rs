use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub(crate) struct AlbumResponse {
    #[serde(default)]
    pub ret: i32,
    pub msg: Option<String>,
    pub data: Option<AlbumData>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AlbumData {
    pub album: Album,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    #[serde(default)]
    pub album_id: i64,
    pub title: String,
    #[serde(default, rename = "tracks", alias = "trackCount")]
    pub track_count: i32,
    #[serde(default)]
    pub is_paid: bool,
    #[serde(default)]
    pub vip_free_type: i32,
    #[serde(default)]
    pub price_types: Vec<PriceType>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceType {
    #[serde(default)]
    pub free_track_ids: String,
}

/// How an album can be listened to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i32)]
pub enum AlbumType {
    Free = 0,
    VipFree = 1,
    Paid = 2,
}

impl Album {
    pub fn album_type(&self) -> AlbumType {
        match (self.is_paid, self.vip_free_type) {
            (false, _) => AlbumType::Free,
            (true, 1) => AlbumType::VipFree,
            (true, _) => AlbumType::Paid,
        }
    }

    /// Comma separated ids of the tracks that can be played for free.
    pub fn free_track_ids(&self) -> Option<&str> {
        self.price_types.first().map(|p| p.free_track_ids.as_str())
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct TrackListResponse {
    #[serde(default)]
    pub ret: i32,
    pub msg: Option<String>,
    pub data: Option<TrackPage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackPage {
    #[serde(default)]
    pub list: Vec<Track>,
    #[serde(default)]
    pub max_page_id: i32,
    #[serde(default)]
    pub page_id: i32,
    #[serde(default)]
    pub total_count: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub track_id: i64,
    pub title: String,
    #[serde(default)]
    pub duration: i32,
    #[serde(default)]
    pub play_url32: Option<String>,
    #[serde(default)]
    pub play_url64: Option<String>,
    #[serde(default)]
    pub play_path_aacv224: Option<String>,
    #[serde(default)]
    pub play_path_aacv164: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PaidTrackResponse {
    #[serde(default)]
    pub ret: i32,
    pub msg: Option<String>,
    pub track_info: Option<PaidTrackInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PaidTrackInfo {
    pub track_id: i64,
    pub title: String,
    #[serde(default)]
    pub duration: i32,
    #[serde(default)]
    pub play_url_list: Vec<PlayUrl>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PlayUrl {
    #[serde(default)]
    pub quality_level: i32,
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserInfoResponse {
    #[serde(default)]
    pub ret: i32,
    #[serde(default)]
    pub msg: String,
    pub data: Option<UserData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UserData {
    #[serde(default)]
    pub uid: i64,
    #[serde(default)]
    pub is_vip: bool,
    #[serde(default)]
    pub nickname: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub ret: i32,
    pub msg: String,
    pub uid: i64,
    pub is_vip: bool,
    pub nickname: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrCode {
    #[serde(default)]
    pub ret: i32,
    #[serde(default)]
    pub msg: String,
    #[serde(default)]
    pub qr_id: String,
    /// Base64 encoded PNG.
    #[serde(default)]
    pub img: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct QrStatusResponse {
    #[serde(default)]
    pub ret: i32,
    #[serde(default)]
    pub msg: String,
}

/// Result of polling a QR login session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrStatus {
    pub ret: i32,
    pub msg: String,
    /// Cookie string, present once the login is confirmed.
    pub cookie: Option<String>,
}

impl QrStatus {
    pub fn is_authenticated(&self) -> bool {
        self.ret == 0 && self.cookie.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn album(is_paid: bool, vip_free_type: i32) -> Album {
        Album {
            album_id: 1,
            title: "a".to_string(),
            track_count: 1,
            is_paid,
            vip_free_type,
            price_types: Vec::new(),
        }
    }

    #[test]
    fn album_type_from_flags() {
        assert_eq!(album(false, 0).album_type(), AlbumType::Free);
        assert_eq!(album(false, 1).album_type(), AlbumType::Free);
        assert_eq!(album(true, 1).album_type(), AlbumType::VipFree);
        assert_eq!(album(true, 0).album_type(), AlbumType::Paid);
        assert_eq!(AlbumType::Paid as i32, 2);
    }

    #[test]
    fn album_parses_track_count_from_either_name() {
        let a: Album = serde_json::from_str(r#"{"title":"x","tracks":12}"#).unwrap();
        assert_eq!(a.track_count, 12);
        let b: Album = serde_json::from_str(r#"{"title":"x","trackCount":7}"#).unwrap();
        assert_eq!(b.track_count, 7);
    }

    #[test]
    fn free_track_ids_come_from_first_price_type() {
        let a: Album = serde_json::from_str(
            r#"{"title":"x","priceTypes":[{"freeTrackIds":"1,2,3"},{"freeTrackIds":"9"}]}"#,
        )
        .unwrap();
        assert_eq!(a.free_track_ids(), Some("1,2,3"));
        assert_eq!(album(false, 0).free_track_ids(), None);
    }

    #[test]
    fn track_fields_use_camel_case_names() {
        let t: Track = serde_json::from_str(
            r#"{"trackId":42,"title":"t","duration":61,"playUrl32":"a","playUrl64":"b","playPathAacv224":"c","playPathAacv164":"d"}"#,
        )
        .unwrap();
        assert_eq!(t.track_id, 42);
        assert_eq!(t.play_url32.as_deref(), Some("a"));
        assert_eq!(t.play_url64.as_deref(), Some("b"));
        assert_eq!(t.play_path_aacv224.as_deref(), Some("c"));
        assert_eq!(t.play_path_aacv164.as_deref(), Some("d"));
    }

    #[test]
    fn qr_status_requires_cookie_to_be_authenticated() {
        let pending = QrStatus {
            ret: 0,
            msg: String::new(),
            cookie: None,
        };
        assert!(!pending.is_authenticated());
        let done = QrStatus {
            ret: 0,
            msg: String::new(),
            cookie: Some("1&_token=x".to_string()),
        };
        assert!(done.is_authenticated());
    }
}
