use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("api error {ret}: {msg}")]
    Api { ret: i32, msg: String },
    #[error("decrypt error: {0}")]
    Decrypt(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Turn a non-zero `ret` code into an [`ApiError::Api`].
pub(crate) fn check_ret(ret: i32, msg: Option<&str>) -> Result<(), ApiError> {
    if ret == 0 {
        Ok(())
    } else {
        Err(ApiError::Api {
            ret,
            msg: msg.unwrap_or_default().to_string(),
        })
    }
}
