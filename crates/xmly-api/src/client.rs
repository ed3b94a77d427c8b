use std::sync::OnceLock;
use std::time::Duration;

use reqwest::{Client, ClientBuilder};
use tracing::debug;

use crate::ApiError;

pub const PC_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";
pub const ANDROID_UA: &str = "ting_6.7.9(GM1900,Android29)";

/// Base URLs of the remote services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// Mobile API host (album and track listings).
    pub mobile: String,
    /// Web API host (play info, current user).
    pub web: String,
    /// Passport host (QR login).
    pub passport: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            mobile: "https://mobile.ximalaya.com".to_string(),
            web: "https://www.ximalaya.com".to_string(),
            passport: "https://passport.ximalaya.com".to_string(),
        }
    }
}

impl Endpoints {
    /// Point every service at the same host, used by tests.
    pub fn single_host(base: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            mobile: base.clone(),
            web: base.clone(),
            passport: base,
        }
    }
}

fn install_rustls_provider() {
    static PROVIDER_INSTALLED: OnceLock<()> = OnceLock::new();
    PROVIDER_INSTALLED.get_or_init(|| {
        if let Err(e) = rustls::crypto::aws_lc_rs::default_provider().install_default() {
            debug!(existing_provider = ?e, "rustls CryptoProvider already installed");
        }
    });
}

/// A client builder with the defaults every API call expects.
pub fn create_client_builder(timeout: Option<Duration>) -> ClientBuilder {
    install_rustls_provider();
    Client::builder()
        .user_agent(PC_UA)
        .timeout(timeout.unwrap_or(Duration::from_secs(30)))
}

pub fn default_client() -> Result<Client, ApiError> {
    Ok(create_client_builder(None).build()?)
}

/// Client for the album, track, user and login APIs.
#[derive(Debug, Clone)]
pub struct XmlyClient {
    pub(crate) client: Client,
    pub(crate) endpoints: Endpoints,
}

impl XmlyClient {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            endpoints: Endpoints::default(),
        }
    }

    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }
}

/// Millisecond timestamp used as a cache buster in API paths.
pub(crate) fn timestamp_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_host_points_everything_at_base() {
        let endpoints = Endpoints::single_host("http://127.0.0.1:9000");
        assert_eq!(endpoints.mobile, "http://127.0.0.1:9000");
        assert_eq!(endpoints.web, "http://127.0.0.1:9000");
        assert_eq!(endpoints.passport, "http://127.0.0.1:9000");
    }

    #[test]
    fn builds_default_client() {
        let client = XmlyClient::new(default_client().unwrap());
        assert_eq!(client.endpoints(), &Endpoints::default());
    }
}
