//! Unified path management for ticketdesk files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/ticketdesk/        # Config directory (platform default via `dirs`)
//! ├── config.toml              # Client configuration (API base URL)
//! └── credentials.toml         # Stored session tokens
//! ```

use std::path::{Path, PathBuf};
use ticketdesk_core::{DeskError, Result};

const APP_DIR: &str = "ticketdesk";

/// Resolves ticketdesk file locations.
///
/// A base path overrides the platform config directory, which keeps tests
/// and alternate profiles off the user's real files.
#[derive(Debug, Clone)]
pub struct DeskPaths {
    base: Option<PathBuf>,
}

impl DeskPaths {
    pub fn new(base: Option<&Path>) -> Self {
        Self {
            base: base.map(Path::to_path_buf),
        }
    }

    /// Returns the ticketdesk configuration directory.
    ///
    /// # Returns
    ///
    /// - `Ok(PathBuf)`: Path to config directory (e.g., `~/.config/ticketdesk/`)
    /// - `Err(DeskError::Config)`: The platform config directory is unknown
    pub fn config_dir(&self) -> Result<PathBuf> {
        if let Some(base) = &self.base {
            return Ok(base.clone());
        }
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| DeskError::config("Cannot find config directory"))
    }

    pub fn config_file(&self) -> Result<PathBuf> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    /// Returns the path to the credentials file.
    ///
    /// # Security Note
    ///
    /// The file holds live tokens. It is written with mode 600 on Unix.
    pub fn credentials_file(&self) -> Result<PathBuf> {
        Ok(self.config_dir()?.join("credentials.toml"))
    }
}

impl Default for DeskPaths {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_override() {
        let paths = DeskPaths::new(Some(Path::new("/tmp/desk")));
        assert_eq!(paths.config_dir().unwrap(), PathBuf::from("/tmp/desk"));
        assert_eq!(
            paths.config_file().unwrap(),
            PathBuf::from("/tmp/desk/config.toml")
        );
        assert_eq!(
            paths.credentials_file().unwrap(),
            PathBuf::from("/tmp/desk/credentials.toml")
        );
    }

    #[test]
    fn test_default_dir_is_namespaced() {
        if let Ok(dir) = DeskPaths::default().config_dir() {
            assert!(dir.ends_with("ticketdesk"));
        }
    }
}
