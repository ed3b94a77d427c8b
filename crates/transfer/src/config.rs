use std::sync::OnceLock;
use std::time::Duration;

use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::{debug, warn};

use crate::TransferError;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";

/// Buffer size used when writing the response body to disk.
pub const DEFAULT_WRITE_BUFFER: usize = 64 * 1024;

/// Configurable options for the transfer engine
#[derive(Debug, Clone)]
pub struct TransferConfig {
    /// User agent string
    pub user_agent: String,

    /// Connection timeout (time to establish initial connection).
    /// No overall request timeout is set; stalls are detected by the caller.
    pub connect_timeout: Duration,

    /// Whether to follow redirects
    pub follow_redirects: bool,

    /// Custom HTTP headers for requests
    pub headers: HeaderMap,

    /// Explicit proxy URL, takes precedence over system settings
    pub proxy: Option<String>,

    /// Whether to use system proxy settings if available
    pub use_system_proxy: bool,

    /// Write buffer size for the staging file (in bytes)
    pub write_buffer: usize,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            connect_timeout: Duration::from_secs(30),
            follow_redirects: true,
            headers: TransferConfig::get_default_headers(),
            proxy: None,
            use_system_proxy: true,
            write_buffer: DEFAULT_WRITE_BUFFER,
        }
    }
}

impl TransferConfig {
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_proxy(mut self, url: impl Into<String>) -> Self {
        self.proxy = Some(url.into());
        self
    }

    pub fn with_system_proxy(mut self, enabled: bool) -> Self {
        self.use_system_proxy = enabled;
        self
    }

    pub fn get_default_headers() -> HeaderMap {
        let mut default_headers = HeaderMap::new();

        default_headers.insert(reqwest::header::ACCEPT, HeaderValue::from_static("*/*"));

        default_headers.insert(
            reqwest::header::CONNECTION,
            HeaderValue::from_static("keep-alive"),
        );

        default_headers.insert(
            reqwest::header::ACCEPT_LANGUAGE,
            HeaderValue::from_static("zh-CN,zh;q=0.9,en-US;q=0.5,en;q=0.3"),
        );
        default_headers
    }
}

/// Install the process-wide rustls crypto provider exactly once.
pub fn install_rustls_provider() {
    static PROVIDER_INSTALLED: OnceLock<()> = OnceLock::new();
    PROVIDER_INSTALLED.get_or_init(|| {
        if let Err(e) = rustls::crypto::aws_lc_rs::default_provider().install_default() {
            // Another crate installed one first.
            debug!(existing_provider = ?e, "rustls CryptoProvider already installed");
        }
    });
}

/// Create a reqwest Client with the provided configuration
pub fn create_client(config: &TransferConfig) -> Result<Client, TransferError> {
    install_rustls_provider();

    let mut builder = Client::builder()
        .user_agent(&config.user_agent)
        .connect_timeout(config.connect_timeout)
        .default_headers(config.headers.clone())
        .redirect(if config.follow_redirects {
            reqwest::redirect::Policy::limited(10)
        } else {
            reqwest::redirect::Policy::none()
        });

    if let Some(url) = config.proxy.as_deref() {
        let proxy = reqwest::Proxy::all(url).map_err(|e| {
            warn!(proxy_url = %url, error = %e, "Invalid proxy URL");
            TransferError::configuration(format!("invalid proxy URL `{url}`: {e}"))
        })?;
        builder = builder.proxy(proxy);
    } else if !config.use_system_proxy {
        builder = builder.no_proxy();
    }

    builder
        .build()
        .map_err(|e| TransferError::configuration(format!("failed to build HTTP client: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_follows_redirects_and_uses_system_proxy() {
        let config = TransferConfig::default();
        assert!(config.follow_redirects);
        assert!(config.use_system_proxy);
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
        assert!(config.headers.contains_key(reqwest::header::ACCEPT));
    }

    #[test]
    fn invalid_proxy_is_a_configuration_error() {
        let config = TransferConfig::default().with_proxy("::not a proxy::");
        let err = create_client(&config).unwrap_err();
        assert!(matches!(err, TransferError::Configuration { .. }));
    }

    #[test]
    fn builds_client_without_proxy() {
        let config = TransferConfig::default().with_system_proxy(false);
        assert!(create_client(&config).is_ok());
    }
}
