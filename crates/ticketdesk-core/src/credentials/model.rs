use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Fixed lease granted by every successful login or refresh.
///
/// The server does not report a TTL the client relies on.
pub const SESSION_LEASE: TimeDelta = TimeDelta::minutes(30);

/// How far ahead of expiry a token is treated as already expiring.
pub const REFRESH_BUFFER: TimeDelta = TimeDelta::seconds(60);

/// The stored client session.
///
/// Invariant: `access_token.is_some()` implies `expires_at.is_some()`. The
/// constructors below are the only way to set an access token, and both set
/// the expiry in the same step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    access_token: Option<String>,
    refresh_token: Option<String>,
    expires_at: Option<DateTime<Utc>>,
}

impl Credentials {
    /// An empty (logged out) session.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Session created by a successful login.
    pub fn issued(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            access_token: Some(access_token.into()),
            refresh_token: Some(refresh_token.into()),
            expires_at: Some(now + SESSION_LEASE),
        }
    }

    /// Rebuilds a session from persisted parts, dropping an access token
    /// that has no expiry.
    pub fn from_parts(
        access_token: Option<String>,
        refresh_token: Option<String>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        let access_token = access_token.filter(|_| expires_at.is_some());
        Self {
            access_token,
            refresh_token,
            expires_at,
        }
    }

    /// Replaces the access token and expiry, keeping the refresh token.
    pub fn refreshed(&self, access_token: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            access_token: Some(access_token.into()),
            refresh_token: self.refresh_token.clone(),
            expires_at: Some(now + SESSION_LEASE),
        }
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none() && self.expires_at.is_none()
    }

    /// True if no token is stored or `now + buffer` is past the expiry.
    pub fn is_expiring(&self, now: DateTime<Utc>, buffer: TimeDelta) -> bool {
        match (&self.access_token, self.expires_at) {
            (Some(_), Some(expires_at)) => now + buffer > expires_at,
            _ => true,
        }
    }
}
