//! Settings loaded from the environment.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use transfer_engine::TransferConfig;

use crate::downloader::MonitorConfig;
use crate::downloader::monitor::{DEFAULT_POLL_INTERVAL, DEFAULT_STALL_THRESHOLD};
use crate::{Error, Result};

pub const ENV_POLL_INTERVAL_MS: &str = "XMLY_POLL_INTERVAL_MS";
pub const ENV_STALL_THRESHOLD: &str = "XMLY_STALL_THRESHOLD";
pub const ENV_USER_AGENT: &str = "XMLY_USER_AGENT";
pub const ENV_CONNECT_TIMEOUT_SECS: &str = "XMLY_CONNECT_TIMEOUT_SECS";
pub const ENV_API_TIMEOUT_SECS: &str = "XMLY_API_TIMEOUT_SECS";
pub const ENV_API_BASE_URL: &str = "XMLY_API_BASE_URL";
pub const ENV_PROXY: &str = "XMLY_PROXY";
pub const ENV_NO_PROXY: &str = "XMLY_NO_PROXY";
pub const ENV_LOG: &str = "XMLY_LOG";
pub const ENV_LOG_DIR: &str = "XMLY_LOG_DIR";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub poll_interval: Duration,
    pub stall_threshold: u32,
    /// Overrides the transfer user agent.
    pub user_agent: Option<String>,
    pub connect_timeout: Duration,
    /// Whole-request timeout for API calls.
    pub api_timeout: Duration,
    /// Serve every API host from this base URL instead of the public ones.
    pub api_base_url: Option<String>,
    pub proxy: Option<String>,
    pub use_system_proxy: bool,
    /// `EnvFilter` directive.
    pub log_filter: Option<String>,
    /// Directory for daily rolling log files.
    pub log_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            stall_threshold: DEFAULT_STALL_THRESHOLD,
            user_agent: None,
            connect_timeout: Duration::from_secs(30),
            api_timeout: Duration::from_secs(30),
            api_base_url: None,
            proxy: None,
            use_system_proxy: true,
            log_filter: None,
            log_dir: None,
        }
    }
}

impl Settings {
    /// Read settings from the process environment, after loading `.env` if present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`, falling back to defaults for unset keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let poll_interval_ms: u64 = parse_or(
            ENV_POLL_INTERVAL_MS,
            var(ENV_POLL_INTERVAL_MS),
            defaults.poll_interval.as_millis() as u64,
        )?;
        if poll_interval_ms == 0 {
            return Err(Error::config(format!("{ENV_POLL_INTERVAL_MS} must be greater than 0")));
        }

        let stall_threshold: u32 = parse_or(
            ENV_STALL_THRESHOLD,
            var(ENV_STALL_THRESHOLD),
            defaults.stall_threshold,
        )?;
        if stall_threshold == 0 {
            return Err(Error::config(format!("{ENV_STALL_THRESHOLD} must be greater than 0")));
        }

        Ok(Self {
            poll_interval: Duration::from_millis(poll_interval_ms),
            stall_threshold,
            user_agent: var(ENV_USER_AGENT),
            connect_timeout: Duration::from_secs(parse_or(
                ENV_CONNECT_TIMEOUT_SECS,
                var(ENV_CONNECT_TIMEOUT_SECS),
                defaults.connect_timeout.as_secs(),
            )?),
            api_timeout: Duration::from_secs(parse_or(
                ENV_API_TIMEOUT_SECS,
                var(ENV_API_TIMEOUT_SECS),
                defaults.api_timeout.as_secs(),
            )?),
            api_base_url: var(ENV_API_BASE_URL).map(|v| v.trim_end_matches('/').to_string()),
            proxy: var(ENV_PROXY),
            use_system_proxy: !parse_flag(ENV_NO_PROXY, var(ENV_NO_PROXY))?,
            log_filter: var(ENV_LOG),
            log_dir: var(ENV_LOG_DIR).map(PathBuf::from),
        })
    }

    pub fn monitor(&self) -> MonitorConfig {
        MonitorConfig {
            poll_interval: self.poll_interval,
            stall_threshold: self.stall_threshold,
        }
    }

    pub fn transfer_config(&self) -> TransferConfig {
        let mut config = TransferConfig::default()
            .with_connect_timeout(self.connect_timeout)
            .with_system_proxy(self.use_system_proxy);
        if let Some(ua) = &self.user_agent {
            config = config.with_user_agent(ua.clone());
        }
        if let Some(proxy) = &self.proxy {
            config = config.with_proxy(proxy.clone());
        }
        config
    }
}

fn parse_or<T>(key: &str, value: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        Some(v) => v
            .parse()
            .map_err(|e| Error::config(format!("invalid {key} value {v:?}: {e}"))),
        None => Ok(default),
    }
}

fn parse_flag(key: &str, value: Option<String>) -> Result<bool> {
    match value.as_deref().map(str::to_ascii_lowercase).as_deref() {
        None | Some("0" | "false" | "no" | "off") => Ok(false),
        Some("1" | "true" | "yes" | "on") => Ok(true),
        Some(other) => Err(Error::config(format!("invalid {key} value {other:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> Result<Settings> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let s = settings(&[]).unwrap();
        assert_eq!(s, Settings::default());
        assert_eq!(s.monitor(), MonitorConfig::default());
        assert_eq!(s.poll_interval, Duration::from_millis(100));
        assert_eq!(s.stall_threshold, 20);
        assert!(s.use_system_proxy);
    }

    #[test]
    fn reads_every_variable() {
        let s = settings(&[
            (ENV_POLL_INTERVAL_MS, "250"),
            (ENV_STALL_THRESHOLD, "8"),
            (ENV_USER_AGENT, "test-agent"),
            (ENV_CONNECT_TIMEOUT_SECS, "5"),
            (ENV_API_TIMEOUT_SECS, "12"),
            (ENV_API_BASE_URL, "http://127.0.0.1:9000/"),
            (ENV_PROXY, "http://127.0.0.1:8080"),
            (ENV_NO_PROXY, "true"),
            (ENV_LOG, "xmly_downloader=debug"),
            (ENV_LOG_DIR, "/tmp/xmly-logs"),
        ])
        .unwrap();

        assert_eq!(
            s.monitor(),
            MonitorConfig {
                poll_interval: Duration::from_millis(250),
                stall_threshold: 8,
            }
        );
        assert_eq!(s.user_agent.as_deref(), Some("test-agent"));
        assert_eq!(s.connect_timeout, Duration::from_secs(5));
        assert_eq!(s.api_timeout, Duration::from_secs(12));
        assert_eq!(s.api_base_url.as_deref(), Some("http://127.0.0.1:9000"));
        assert_eq!(s.proxy.as_deref(), Some("http://127.0.0.1:8080"));
        assert!(!s.use_system_proxy);
        assert_eq!(s.log_filter.as_deref(), Some("xmly_downloader=debug"));
        assert_eq!(s.log_dir, Some(PathBuf::from("/tmp/xmly-logs")));

        let transfer = s.transfer_config();
        assert_eq!(transfer.user_agent, "test-agent");
        assert_eq!(transfer.connect_timeout, Duration::from_secs(5));
        assert_eq!(transfer.proxy.as_deref(), Some("http://127.0.0.1:8080"));
        assert!(!transfer.use_system_proxy);
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let s = settings(&[(ENV_STALL_THRESHOLD, "  "), (ENV_USER_AGENT, "")]).unwrap();
        assert_eq!(s.stall_threshold, 20);
        assert_eq!(s.user_agent, None);
    }

    #[test]
    fn invalid_numbers_are_configuration_errors() {
        let err = settings(&[(ENV_STALL_THRESHOLD, "many")]).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert!(err.to_string().contains(ENV_STALL_THRESHOLD));

        assert!(settings(&[(ENV_POLL_INTERVAL_MS, "0")]).is_err());
        assert!(settings(&[(ENV_NO_PROXY, "maybe")]).is_err());
    }

    #[test]
    fn zero_stall_threshold_is_rejected() {
        let err = settings(&[(ENV_STALL_THRESHOLD, "0")]).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert!(err.to_string().contains(ENV_STALL_THRESHOLD));

        let s = settings(&[(ENV_STALL_THRESHOLD, "1")]).unwrap();
        assert_eq!(s.stall_threshold, 1);
    }
}
