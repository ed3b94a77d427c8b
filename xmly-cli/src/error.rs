use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("this command needs a login cookie, pass --cookie or set XMLY_COOKIE")]
    MissingCookie,

    #[error("QR code was not confirmed within {}s", .0.as_secs())]
    LoginTimeout(Duration),

    #[error("QR code request failed ({ret}): {msg}")]
    QrCodeRejected { ret: i32, msg: String },

    #[error("QR code image is not valid base64: {0}")]
    InvalidQrImage(#[from] base64::DecodeError),
}
