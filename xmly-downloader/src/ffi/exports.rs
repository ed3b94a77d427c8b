//! Exported C functions.
//!
//! Returned pointers are owned by the caller and must be released with the
//! matching `xmly_free_*` function.

use std::ffi::{CStr, c_char, c_int};
use std::ptr;

use super::callback::{self, CallbackSink, UpdateFileLengthCallback};
use super::runtime::block_on;
use super::types::{
    AlbumInfo, DataError, QrCode, TrackInfo, TrackList, UserInfo, free_c_string, into_c_string,
};
use crate::Error;

/// Copy a C string argument into Rust.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string.
unsafe fn read_arg(ptr: *const c_char, name: &str) -> Result<String, String> {
    if ptr.is_null() {
        return Err(Error::invalid_argument(format!("{name} is null")).to_string());
    }
    // SAFETY: checked for null, NUL termination is the caller's contract.
    let value = unsafe { CStr::from_ptr(ptr) };
    value
        .to_str()
        .map(str::to_string)
        .map_err(|e| Error::invalid_argument(format!("{name} is not utf-8: {e}")).to_string())
}

/// Pages start at 1; zero and negative values select the first page.
fn page_number(page_id: c_int) -> u32 {
    u32::try_from(page_id).unwrap_or(0).max(1)
}

fn respond<T>(result: Result<T, String>) -> *mut DataError {
    let record = match result {
        Ok(value) => DataError::data(value),
        Err(message) => DataError::error(message),
    };
    Box::into_raw(Box::new(record))
}

/// Register the progress callback. Only the first registration takes effect.
///
/// The callback must not call back into the library.
#[unsafe(no_mangle)]
pub extern "C" fn xmly_register_callback(callback: Option<UpdateFileLengthCallback>) {
    if let Some(callback) = callback {
        callback::register(callback);
    }
}

/// On success `data` points to an [`AlbumInfo`].
#[unsafe(no_mangle)]
pub extern "C" fn xmly_get_album_info(album_id: i64) -> *mut DataError {
    respond(block_on(|service| async move {
        service.album_info(album_id).await.map(AlbumInfo::from)
    }))
}

/// On success `data` points to a [`TrackList`]. Pages start at 1; a negative
/// `page_id` requests page 1.
#[unsafe(no_mangle)]
pub extern "C" fn xmly_get_track_list(album_id: i64, page_id: c_int, is_asc: c_int) -> *mut DataError {
    let page_id = page_number(page_id);
    respond(block_on(|service| async move {
        service
            .track_list(album_id, page_id, is_asc != 0)
            .await
            .map(TrackList::from)
    }))
}

/// On success `data` points to a [`TrackInfo`] whose `play_path_aacv164` is the
/// resolved URL.
///
/// # Safety
/// `cookie` must be null or a NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn xmly_get_charge_track_info(
    track_id: i64,
    cookie: *const c_char,
) -> *mut DataError {
    // SAFETY: forwarded caller contract.
    let cookie = match unsafe { read_arg(cookie, "cookie") } {
        Ok(cookie) => cookie,
        Err(e) => return respond::<TrackInfo>(Err(e)),
    };
    respond(block_on(|service| async move {
        service
            .charge_track_info(track_id, &cookie)
            .await
            .map(TrackInfo::from)
    }))
}

/// Download `url` to `file_path`, reporting progress under `id`.
///
/// Returns null on success, otherwise an error message to be released with
/// [`xmly_free_string`].
///
/// # Safety
/// `url` and `file_path` must be null or NUL-terminated strings.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn xmly_download_file(
    url: *const c_char,
    file_path: *const c_char,
    id: c_int,
) -> *mut c_char {
    // SAFETY: forwarded caller contract.
    let args = unsafe { read_arg(url, "url").and_then(|u| Ok((u, read_arg(file_path, "file_path")?))) };
    let (url, file_path) = match args {
        Ok(args) => args,
        Err(e) => return into_c_string(e),
    };

    let sink = CallbackSink::registered();
    let result = block_on(|service| async move {
        service
            .download_file(&url, &file_path, i64::from(id), &sink)
            .await
    });
    match result {
        Ok(_) => ptr::null_mut(),
        Err(message) => into_c_string(message),
    }
}

/// On success `data` points to a [`UserInfo`].
///
/// # Safety
/// `cookie` must be null or a NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn xmly_get_user_info(cookie: *const c_char) -> *mut DataError {
    // SAFETY: forwarded caller contract.
    let cookie = match unsafe { read_arg(cookie, "cookie") } {
        Ok(cookie) => cookie,
        Err(e) => return respond::<UserInfo>(Err(e)),
    };
    respond(block_on(|service| async move {
        service.user_info(&cookie).await.map(UserInfo::from)
    }))
}

/// On success `data` points to a [`QrCode`].
#[unsafe(no_mangle)]
pub extern "C" fn xmly_get_qr_code() -> *mut DataError {
    respond(block_on(|service| async move {
        service.qr_code().await.map(QrCode::from)
    }))
}

/// The login cookie once the QR code is confirmed, null otherwise.
///
/// Lookup failures also return null.
///
/// # Safety
/// `qr_id` must be null or a NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn xmly_check_qr_code(qr_id: *const c_char) -> *mut c_char {
    // SAFETY: forwarded caller contract.
    let Ok(qr_id) = (unsafe { read_arg(qr_id, "qr_id") }) else {
        return ptr::null_mut();
    };
    let cookie = block_on(|service| async move { Ok(service.check_qr_code(&qr_id).await) });
    match cookie {
        Ok(Some(cookie)) => into_c_string(cookie),
        _ => ptr::null_mut(),
    }
}

/// # Safety
/// `ptr` must be null or a pointer returned by this library, freed once.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn xmly_free_string(ptr: *mut c_char) {
    free_c_string(ptr);
}

/// Frees the record and its error string. Free `data` with its own function first.
///
/// # Safety
/// `ptr` must be null or a pointer returned by this library, freed once.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn xmly_free_data_error(ptr: *mut DataError) {
    // SAFETY: forwarded caller contract.
    unsafe { free_boxed(ptr) }
}

/// # Safety
/// `ptr` must be null or a pointer returned by this library, freed once.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn xmly_free_album_info(ptr: *mut AlbumInfo) {
    // SAFETY: forwarded caller contract.
    unsafe { free_boxed(ptr) }
}

/// # Safety
/// `ptr` must be null or a pointer returned by this library, freed once.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn xmly_free_track_info(ptr: *mut TrackInfo) {
    // SAFETY: forwarded caller contract.
    unsafe { free_boxed(ptr) }
}

/// Frees the list and every record in it.
///
/// # Safety
/// `ptr` must be null or a pointer returned by this library, freed once.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn xmly_free_track_list(ptr: *mut TrackList) {
    // SAFETY: forwarded caller contract.
    unsafe { free_boxed(ptr) }
}

/// # Safety
/// `ptr` must be null or a pointer returned by this library, freed once.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn xmly_free_user_info(ptr: *mut UserInfo) {
    // SAFETY: forwarded caller contract.
    unsafe { free_boxed(ptr) }
}

/// # Safety
/// `ptr` must be null or a pointer returned by this library, freed once.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn xmly_free_qr_code(ptr: *mut QrCode) {
    // SAFETY: forwarded caller contract.
    unsafe { free_boxed(ptr) }
}

/// # Safety
/// `ptr` must be null or come from `Box::into_raw` for the same `T`.
unsafe fn free_boxed<T>(ptr: *mut T) {
    if !ptr.is_null() {
        // SAFETY: see function contract.
        drop(unsafe { Box::from_raw(ptr) });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_arguments_are_reported() {
        let err = unsafe { xmly_download_file(ptr::null(), ptr::null(), 1) };
        assert!(!err.is_null());
        let message = unsafe { CStr::from_ptr(err) }.to_str().unwrap().to_string();
        assert_eq!(message, "invalid argument: url is null");
        unsafe { xmly_free_string(err) };

        let result = unsafe { xmly_get_user_info(ptr::null()) };
        let record = unsafe { &*result };
        assert!(record.data.is_null());
        assert!(!record.error.is_null());
        unsafe { xmly_free_data_error(result) };
    }

    #[test]
    fn out_of_range_pages_select_the_first() {
        assert_eq!(page_number(-3), 1);
        assert_eq!(page_number(0), 1);
        assert_eq!(page_number(1), 1);
        assert_eq!(page_number(7), 7);
    }

    #[test]
    fn null_qr_id_is_not_authenticated() {
        assert!(unsafe { xmly_check_qr_code(ptr::null()) }.is_null());
    }

    #[test]
    fn freeing_null_is_a_no_op() {
        unsafe {
            xmly_free_string(ptr::null_mut());
            xmly_free_data_error(ptr::null_mut());
            xmly_free_album_info(ptr::null_mut());
            xmly_free_track_info(ptr::null_mut());
            xmly_free_track_list(ptr::null_mut());
            xmly_free_user_info(ptr::null_mut());
            xmly_free_qr_code(ptr::null_mut());
        }
    }
}
