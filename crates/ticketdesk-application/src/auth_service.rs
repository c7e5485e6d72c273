//! Login, registration and logout.

use std::sync::Arc;
use ticketdesk_core::Result;
use ticketdesk_core::auth::{AuthApi, LoginRequest};
use ticketdesk_core::clock::Clock;
use ticketdesk_core::credentials::{CredentialWriter, Credentials};

/// Owns the login/logout side of the credential store.
pub struct AuthService {
    auth: Arc<dyn AuthApi>,
    store: Arc<dyn CredentialWriter>,
    clock: Arc<dyn Clock>,
}

impl AuthService {
    pub fn new(
        auth: Arc<dyn AuthApi>,
        store: Arc<dyn CredentialWriter>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { auth, store, clock }
    }

    /// Logs in and stores a fresh 30-minute session.
    pub async fn login(&self, email: &str, password: &str) -> Result<()> {
        let grant = self.auth.login(&LoginRequest::new(email, password)).await?;
        self.store.replace(Credentials::issued(
            grant.access_token,
            grant.refresh_token,
            self.clock.now(),
        ))?;
        tracing::info!("Logged in");
        Ok(())
    }

    pub async fn register(&self, email: &str, password: &str) -> Result<()> {
        self.auth.register(&LoginRequest::new(email, password)).await
    }

    /// Revokes the refresh token server-side, then clears local credentials.
    ///
    /// Local credentials are cleared even when the server call fails.
    pub async fn logout(&self) -> Result<()> {
        let refresh_token = self.store.snapshot().refresh_token().map(str::to_string);
        if let Some(refresh_token) = refresh_token
            && let Err(e) = self.auth.logout(&refresh_token).await
        {
            tracing::warn!(error = %e, "Server-side logout failed, clearing local session anyway");
        }
        self.store.clear()?;
        tracing::info!("Logged out");
        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        self.store.is_authenticated()
    }
}
