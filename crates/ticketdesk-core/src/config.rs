//! Client configuration.
//!
//! The only externally visible setting is the API base URL. REST endpoints
//! and the real-time channel both live on that host.

use crate::error::{DeskError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Timeout applied to every REST exchange.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Resolved client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the support-ticket service, e.g. `https://desk.example.com`.
    pub api_base_url: Url,
    /// Timeout for a single REST request.
    pub request_timeout: Duration,
}

/// On-disk form of the configuration file (`config.toml`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub api_base_url: Option<String>,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl ClientConfig {
    /// Creates a configuration from a base URL string.
    ///
    /// Only `http` and `https` URLs are accepted.
    pub fn new(api_base_url: &str) -> Result<Self> {
        let url = Url::parse(api_base_url.trim())?;
        match url.scheme() {
            "http" | "https" => Ok(Self {
                api_base_url: url,
                request_timeout: DEFAULT_REQUEST_TIMEOUT,
            }),
            other => Err(DeskError::config(format!(
                "unsupported scheme '{}' in API base URL",
                other
            ))),
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Resolves a REST path (e.g. `/api/incidents`) against the base URL.
    ///
    /// Any path prefix on the base URL is preserved.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        let base = self.api_base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{}/{}", base, path))?)
    }

    /// URL of the real-time channel on the same host (`http` -> `ws`).
    pub fn channel_url(&self) -> Result<Url> {
        let mut url = self.api_base_url.clone();
        let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
        url.set_scheme(scheme)
            .map_err(|_| DeskError::config("cannot derive channel URL from API base URL"))?;
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_paths() {
        let config = ClientConfig::new("https://desk.example.com/").unwrap();
        assert_eq!(
            config.endpoint("/api/incidents").unwrap().as_str(),
            "https://desk.example.com/api/incidents"
        );

        let prefixed = ClientConfig::new("http://localhost:8083/desk").unwrap();
        assert_eq!(
            prefixed.endpoint("auth/login").unwrap().as_str(),
            "http://localhost:8083/desk/auth/login"
        );
    }

    #[test]
    fn test_channel_url_switches_scheme() {
        let secure = ClientConfig::new("https://desk.example.com").unwrap();
        assert_eq!(secure.channel_url().unwrap().scheme(), "wss");

        let plain = ClientConfig::new("http://localhost:8083").unwrap();
        assert_eq!(plain.channel_url().unwrap().as_str(), "ws://localhost:8083/");
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        let err = ClientConfig::new("ftp://desk.example.com").unwrap_err();
        assert!(matches!(err, DeskError::Config(_)));
    }
}
