//! QR code login against the passport service.

use reqwest::header::{HeaderMap, SET_COOKIE, USER_AGENT};
use tracing::debug;

use crate::client::{PC_UA, XmlyClient, timestamp_millis};
use crate::models::{QrCode, QrStatus, QrStatusResponse};
use crate::ApiError;

impl XmlyClient {
    /// Start a login session. `img` holds the QR image as base64 PNG.
    pub async fn generate_qr(&self) -> Result<QrCode, ApiError> {
        let url = format!("{}/web/qrCode/gen", self.endpoints.passport);
        let qr: QrCode = self
            .client
            .get(&url)
            .header(USER_AGENT, PC_UA)
            .query(&[("level", "L")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        debug!(qr_id = %qr.qr_id, ret = qr.ret, "generated login qr code");
        Ok(qr)
    }

    /// Poll a login session once.
    pub async fn check_qr_status(&self, qr_id: &str) -> Result<QrStatus, ApiError> {
        let url = format!(
            "{}/web/qrCode/check/{}/{}",
            self.endpoints.passport,
            urlencoding::encode(qr_id),
            timestamp_millis()
        );
        let response = self
            .client
            .get(&url)
            .header(USER_AGENT, PC_UA)
            .send()
            .await?
            .error_for_status()?;

        let cookie = collect_cookies(response.headers());
        let body: QrStatusResponse = response.json().await?;
        debug!(qr_id, ret = body.ret, "polled login qr code");

        Ok(QrStatus {
            ret: body.ret,
            msg: body.msg,
            cookie: (body.ret == 0 && !cookie.is_empty()).then_some(cookie),
        })
    }
}

/// Join the `name=value` part of every `Set-Cookie` header with `"; "`.
fn collect_cookies(headers: &HeaderMap) -> String {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .collect::<Vec<_>>()
        .join("; ")
}
