//! Credential store implementations.
//!
//! One store instance is created per process and shared: the token
//! lifecycle manager and the login/logout flow get it as a
//! [`CredentialWriter`], everything else as a [`CredentialReader`].

use crate::dto::CredentialsDto;
use crate::paths::DeskPaths;
use crate::storage::AtomicTomlFile;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use ticketdesk_core::Result;
use ticketdesk_core::credentials::{CredentialReader, CredentialWriter, Credentials};

/// Credentials persisted in `credentials.toml`, with a read-through cache.
pub struct FileCredentialStore {
    file: AtomicTomlFile<CredentialsDto>,
    /// `None` until the first read.
    cache: RwLock<Option<Credentials>>,
}

impl FileCredentialStore {
    /// Opens the store at the default credentials location.
    pub fn open(paths: &DeskPaths) -> Result<Self> {
        Ok(Self::at(paths.credentials_file()?))
    }

    pub fn at(path: PathBuf) -> Self {
        Self {
            file: AtomicTomlFile::new(path).private(),
            cache: RwLock::new(None),
        }
    }

    fn read_cache(&self) -> RwLockReadGuard<'_, Option<Credentials>> {
        self.cache.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_cache(&self) -> RwLockWriteGuard<'_, Option<Credentials>> {
        self.cache.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn load_from_disk(&self) -> Credentials {
        match self.file.load() {
            Ok(Some(dto)) => dto.into(),
            Ok(None) => Credentials::empty(),
            Err(e) => {
                tracing::warn!(
                    path = %self.file.path().display(),
                    error = %e,
                    "Unreadable credentials file, treating session as logged out"
                );
                Credentials::empty()
            }
        }
    }
}

impl CredentialReader for FileCredentialStore {
    fn snapshot(&self) -> Credentials {
        if let Some(cached) = self.read_cache().as_ref() {
            return cached.clone();
        }

        let mut cache = self.write_cache();
        cache.get_or_insert_with(|| self.load_from_disk()).clone()
    }
}

impl CredentialWriter for FileCredentialStore {
    fn replace(&self, credentials: Credentials) -> Result<()> {
        let mut cache = self.write_cache();
        if credentials.is_empty() {
            self.file.remove()?;
        } else {
            self.file.store(&CredentialsDto::from(&credentials))?;
        }
        *cache = Some(credentials);
        Ok(())
    }

    fn apply_refresh(
        &self,
        refresh_token: &str,
        access_token: &str,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let mut cache = self.write_cache();
        let current = match cache.as_ref() {
            Some(cached) => cached.clone(),
            None => self.load_from_disk(),
        };
        if current.refresh_token() != Some(refresh_token) {
            *cache = Some(current);
            return Ok(false);
        }

        let refreshed = current.refreshed(access_token, now);
        self.file.store(&CredentialsDto::from(&refreshed))?;
        *cache = Some(refreshed);
        Ok(true)
    }

    fn clear(&self) -> Result<()> {
        let mut cache = self.write_cache();
        // The in-memory session is gone even if the file cannot be removed.
        *cache = Some(Credentials::empty());
        self.file.remove()
    }
}

/// In-process credential store for tests and ephemeral runs.
#[derive(Default)]
pub struct MemoryCredentialStore {
    credentials: RwLock<Credentials>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(credentials: Credentials) -> Self {
        Self {
            credentials: RwLock::new(credentials),
        }
    }
}

impl CredentialReader for MemoryCredentialStore {
    fn snapshot(&self) -> Credentials {
        self.credentials
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl CredentialWriter for MemoryCredentialStore {
    fn replace(&self, credentials: Credentials) -> Result<()> {
        *self
            .credentials
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = credentials;
        Ok(())
    }

    fn apply_refresh(
        &self,
        refresh_token: &str,
        access_token: &str,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let mut credentials = self
            .credentials
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if credentials.refresh_token() != Some(refresh_token) {
            return Ok(false);
        }
        *credentials = credentials.refreshed(access_token, now);
        Ok(true)
    }

    fn clear(&self) -> Result<()> {
        self.replace(Credentials::empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    #[test]
    fn test_file_store_persists_across_instances() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("credentials.toml");

        let store = FileCredentialStore::at(path.clone());
        assert!(!store.is_authenticated());
        store
            .replace(Credentials::issued("a1", "r1", Utc::now()))
            .unwrap();

        let reopened = FileCredentialStore::at(path);
        assert_eq!(reopened.access_token().as_deref(), Some("a1"));
        assert_eq!(reopened.snapshot().refresh_token(), Some("r1"));
        assert!(reopened.snapshot().expires_at().is_some());
    }

    #[test]
    fn test_clear_removes_everything() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("credentials.toml");

        let store = FileCredentialStore::at(path.clone());
        store
            .replace(Credentials::issued("a1", "r1", Utc::now()))
            .unwrap();
        store.clear().unwrap();

        assert!(store.snapshot().is_empty());
        assert!(!path.exists());
        assert!(FileCredentialStore::at(path).snapshot().is_empty());
    }

    #[test]
    fn test_corrupt_file_reads_as_logged_out() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("credentials.toml");
        std::fs::write(&path, "access_token = [").unwrap();

        let store = FileCredentialStore::at(path);
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn test_apply_refresh_requires_matching_refresh_token() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("credentials.toml");
        let now = Utc::now();

        let store = FileCredentialStore::at(path.clone());
        store.replace(Credentials::issued("a1", "r1", now)).unwrap();

        assert!(store.apply_refresh("r1", "a2", now).unwrap());
        let reopened = FileCredentialStore::at(path);
        assert_eq!(reopened.access_token().as_deref(), Some("a2"));
        assert_eq!(reopened.snapshot().refresh_token(), Some("r1"));

        store.clear().unwrap();
        assert!(!store.apply_refresh("r1", "a3", now).unwrap());
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn test_memory_store_apply_refresh_after_logout() {
        let store = MemoryCredentialStore::with(Credentials::issued("a1", "r1", Utc::now()));
        store.clear().unwrap();

        assert!(!store.apply_refresh("r1", "a2", Utc::now()).unwrap());
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryCredentialStore::new();
        store
            .replace(Credentials::issued("a1", "r1", Utc::now()))
            .unwrap();
        assert!(store.is_authenticated());

        store.clear().unwrap();
        assert!(store.snapshot().is_empty());
    }
}
