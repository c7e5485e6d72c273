//! Configuration service implementation.
//!
//! Resolves the [`ClientConfig`] from, in priority order, the
//! `TICKETDESK_API_URL` environment variable and `config.toml` in the
//! ticketdesk config directory.

use crate::paths::DeskPaths;
use crate::storage::AtomicTomlFile;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use ticketdesk_core::config::{ClientConfig, ConfigFile};
use ticketdesk_core::{DeskError, Result};

/// Environment variable overriding the configured API base URL.
pub const API_URL_ENV: &str = "TICKETDESK_API_URL";

/// Loads and caches the client configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    paths: DeskPaths,
    env_url: Option<String>,
    config: Arc<RwLock<Option<ClientConfig>>>,
}

impl ConfigService {
    /// Creates a service that honours `TICKETDESK_API_URL`.
    pub fn new(paths: DeskPaths) -> Self {
        let env_url = std::env::var(API_URL_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty());
        Self::with_env_url(paths, env_url)
    }

    /// Creates a service with an explicit environment override.
    pub fn with_env_url(paths: DeskPaths, env_url: Option<String>) -> Self {
        Self {
            paths,
            env_url,
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Gets the client configuration, loading it if not cached.
    pub fn get_config(&self) -> Result<ClientConfig> {
        {
            let cached = self
                .config
                .read()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if let Some(config) = cached.as_ref() {
                return Ok(config.clone());
            }
        }

        let loaded = self.load_config()?;
        *self
            .config
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(loaded.clone());
        Ok(loaded)
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        *self
            .config
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
    }

    fn load_config(&self) -> Result<ClientConfig> {
        let file = self.read_config_file()?;
        let timeout = file.request_timeout_secs.map(Duration::from_secs);

        let (source, url) = match (&self.env_url, file.api_base_url) {
            (Some(url), _) => (API_URL_ENV, url.clone()),
            (None, Some(url)) => ("config.toml", url),
            (None, None) => {
                return Err(DeskError::config(format!(
                    "API base URL is not configured; set {} or api_base_url in {}",
                    API_URL_ENV,
                    self.paths.config_file()?.display()
                )));
            }
        };

        let mut config = ClientConfig::new(&url)?;
        if let Some(timeout) = timeout {
            config = config.with_request_timeout(timeout);
        }
        tracing::debug!(source, api_base_url = %config.api_base_url, "Loaded client configuration");
        Ok(config)
    }

    fn read_config_file(&self) -> Result<ConfigFile> {
        let file = AtomicTomlFile::<ConfigFile>::new(self.paths.config_file()?);
        Ok(file.load()?.unwrap_or_default())
    }
}
