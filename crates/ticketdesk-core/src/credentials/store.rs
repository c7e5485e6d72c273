use super::model::Credentials;
use crate::error::Result;
use chrono::{DateTime, Utc};

/// Read-only view of the process-wide credential store.
///
/// Handed to components that need the current token but must never change
/// it (the real-time channel, diagnostics).
pub trait CredentialReader: Send + Sync {
    /// Returns a snapshot of the stored session.
    fn snapshot(&self) -> Credentials;

    /// Returns the stored access token, if any.
    fn access_token(&self) -> Option<String> {
        self.snapshot().access_token().map(str::to_string)
    }

    fn is_authenticated(&self) -> bool {
        self.snapshot().access_token().is_some()
    }
}

/// Write access to the credential store.
///
/// Implementations must replace or clear all three entries together.
pub trait CredentialWriter: CredentialReader {
    /// Replaces the stored session.
    fn replace(&self, credentials: Credentials) -> Result<()>;

    /// Stores a refreshed access token with a new lease, but only while the
    /// session still holds `refresh_token`.
    ///
    /// The check and the write happen under the store's write lock. Returns
    /// `false`, leaving the store untouched, when the session was cleared or
    /// replaced in the meantime.
    fn apply_refresh(
        &self,
        refresh_token: &str,
        access_token: &str,
        now: DateTime<Utc>,
    ) -> Result<bool>;

    /// Removes access token, refresh token and expiry in one step.
    fn clear(&self) -> Result<()>;
}
