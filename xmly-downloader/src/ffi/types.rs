//! `#[repr(C)]` records handed to C callers.
//!
//! Every record owns its strings and arrays; dropping a boxed record frees
//! everything it points to.

use std::ffi::{CString, c_char, c_int, c_void};
use std::ptr;

use crate::service::{AlbumSummary, QrCodeSession, TrackPage, TrackRecord, UserProfile};

/// Result of a data call: exactly one of `data` and `error` is non-null.
#[repr(C)]
#[derive(Debug)]
pub struct DataError {
    pub data: *mut c_void,
    pub error: *mut c_char,
}

impl DataError {
    pub(crate) fn data<T>(value: T) -> Self {
        Self {
            data: Box::into_raw(Box::new(value)).cast(),
            error: ptr::null_mut(),
        }
    }

    pub(crate) fn error(message: impl Into<String>) -> Self {
        Self {
            data: ptr::null_mut(),
            error: into_c_string(message),
        }
    }
}

impl Drop for DataError {
    fn drop(&mut self) {
        // `data` is typed by the call that produced it and freed separately.
        free_c_string(self.error);
    }
}

#[repr(C)]
#[derive(Debug)]
pub struct AlbumInfo {
    pub title: *mut c_char,
    pub track_count: c_int,
    pub album_type: c_int,
    /// Comma separated, null when the album has no price information.
    pub free_track_ids: *mut c_char,
}

impl From<AlbumSummary> for AlbumInfo {
    fn from(album: AlbumSummary) -> Self {
        Self {
            title: into_c_string(album.title),
            track_count: album.track_count,
            album_type: album.album_type as c_int,
            free_track_ids: opt_c_string(album.free_track_ids),
        }
    }
}

impl Drop for AlbumInfo {
    fn drop(&mut self) {
        free_c_string(self.title);
        free_c_string(self.free_track_ids);
    }
}

#[repr(C)]
#[derive(Debug)]
pub struct TrackInfo {
    pub id: i64,
    pub title: *mut c_char,
    pub duration: c_int,
    pub play_url32: *mut c_char,
    pub play_url64: *mut c_char,
    pub play_path_aacv224: *mut c_char,
    pub play_path_aacv164: *mut c_char,
}

impl From<TrackRecord> for TrackInfo {
    fn from(track: TrackRecord) -> Self {
        Self {
            id: track.track_id,
            title: into_c_string(track.title),
            duration: track.duration,
            play_url32: opt_c_string(track.play_url32),
            play_url64: opt_c_string(track.play_url64),
            play_path_aacv224: opt_c_string(track.play_path_aacv224),
            play_path_aacv164: opt_c_string(track.play_path_aacv164),
        }
    }
}

impl Drop for TrackInfo {
    fn drop(&mut self) {
        free_c_string(self.title);
        free_c_string(self.play_url32);
        free_c_string(self.play_url64);
        free_c_string(self.play_path_aacv224);
        free_c_string(self.play_path_aacv164);
    }
}

#[repr(C)]
#[derive(Debug)]
pub struct TrackList {
    pub max_page_id: c_int,
    pub length: c_int,
    /// `length` contiguous records, null when empty.
    pub tracks: *mut TrackInfo,
}

impl From<TrackPage> for TrackList {
    fn from(page: TrackPage) -> Self {
        let mut tracks: Vec<TrackInfo> = page.tracks.into_iter().map(TrackInfo::from).collect();
        tracks.truncate(c_int::MAX as usize);
        let length = tracks.len() as c_int;
        let tracks = if tracks.is_empty() {
            ptr::null_mut()
        } else {
            Box::into_raw(tracks.into_boxed_slice()).cast()
        };
        Self {
            max_page_id: page.max_page_id,
            length,
            tracks,
        }
    }
}

impl Drop for TrackList {
    fn drop(&mut self) {
        if self.tracks.is_null() {
            return;
        }
        let len = usize::try_from(self.length).unwrap_or(0);
        // SAFETY: `tracks` came from a boxed slice of exactly `length` records.
        unsafe {
            drop(Box::from_raw(ptr::slice_from_raw_parts_mut(self.tracks, len)));
        }
    }
}

#[repr(C)]
#[derive(Debug)]
pub struct UserInfo {
    pub ret: c_int,
    pub msg: *mut c_char,
    pub uid: i64,
    pub is_vip: c_int,
    pub nickname: *mut c_char,
}

impl From<UserProfile> for UserInfo {
    fn from(user: UserProfile) -> Self {
        Self {
            ret: user.ret,
            msg: into_c_string(user.msg),
            uid: user.uid,
            is_vip: c_int::from(user.is_vip),
            nickname: into_c_string(user.nickname),
        }
    }
}

impl Drop for UserInfo {
    fn drop(&mut self) {
        free_c_string(self.msg);
        free_c_string(self.nickname);
    }
}

#[repr(C)]
#[derive(Debug)]
pub struct QrCode {
    pub ret: c_int,
    pub msg: *mut c_char,
    pub qr_id: *mut c_char,
    /// Base64 encoded PNG.
    pub img: *mut c_char,
}

impl From<QrCodeSession> for QrCode {
    fn from(qr: QrCodeSession) -> Self {
        Self {
            ret: qr.ret,
            msg: into_c_string(qr.msg),
            qr_id: into_c_string(qr.qr_id),
            img: into_c_string(qr.img),
        }
    }
}

impl Drop for QrCode {
    fn drop(&mut self) {
        free_c_string(self.msg);
        free_c_string(self.qr_id);
        free_c_string(self.img);
    }
}

/// Hand a string to C. Interior NUL bytes are dropped.
pub(crate) fn into_c_string(s: impl Into<String>) -> *mut c_char {
    let mut bytes: Vec<u8> = s.into().into_bytes();
    bytes.retain(|&b| b != 0);
    match CString::new(bytes) {
        Ok(c) => c.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

pub(crate) fn opt_c_string(s: Option<String>) -> *mut c_char {
    s.map_or(ptr::null_mut(), into_c_string)
}

/// Free a string produced by [`into_c_string`]. Null is ignored.
pub(crate) fn free_c_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        // SAFETY: non-null strings in these records come from `CString::into_raw`.
        unsafe { drop(CString::from_raw(ptr)) };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CStr;

    fn read(ptr: *const c_char) -> Option<String> {
        if ptr.is_null() {
            None
        } else {
            Some(unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned())
        }
    }

    fn record(id: i64, title: &str) -> TrackRecord {
        TrackRecord {
            track_id: id,
            title: title.to_string(),
            duration: 30,
            play_url32: None,
            play_url64: Some(format!("http://cdn/{id}.mp3")),
            play_path_aacv224: None,
            play_path_aacv164: None,
        }
    }

    #[test]
    fn interior_nul_is_removed() {
        let ptr = into_c_string("a\0b");
        assert_eq!(read(ptr).as_deref(), Some("ab"));
        free_c_string(ptr);
    }

    #[test]
    fn data_error_has_exactly_one_side() {
        let ok = DataError::data(7i32);
        assert!(ok.error.is_null());
        assert!(!ok.data.is_null());
        drop(unsafe { Box::from_raw(ok.data.cast::<i32>()) });

        let err = DataError::error("boom");
        assert!(err.data.is_null());
        assert_eq!(read(err.error).as_deref(), Some("boom"));
    }

    #[test]
    fn track_list_owns_contiguous_records() {
        let list = TrackList::from(TrackPage {
            max_page_id: 4,
            tracks: vec![record(1, "one"), record(2, "two")],
        });
        assert_eq!(list.max_page_id, 4);
        assert_eq!(list.length, 2);
        let tracks = unsafe { std::slice::from_raw_parts(list.tracks, 2) };
        assert_eq!(tracks[1].id, 2);
        assert_eq!(read(tracks[1].title).as_deref(), Some("two"));
        assert_eq!(read(tracks[0].play_url64).as_deref(), Some("http://cdn/1.mp3"));
        assert!(tracks[0].play_url32.is_null());
    }

    #[test]
    fn empty_track_list_has_null_array() {
        let list = TrackList::from(TrackPage {
            max_page_id: 0,
            tracks: Vec::new(),
        });
        assert_eq!(list.length, 0);
        assert!(list.tracks.is_null());
    }

    #[test]
    fn user_flags_are_ints() {
        let user = UserInfo::from(UserProfile {
            ret: 200,
            msg: "ok".to_string(),
            uid: 9,
            is_vip: true,
            nickname: "n".to_string(),
        });
        assert_eq!(user.is_vip, 1);
        assert_eq!(read(user.nickname).as_deref(), Some("n"));
    }
}
