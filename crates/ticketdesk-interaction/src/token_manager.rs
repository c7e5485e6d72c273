//! Access token lifecycle.
//!
//! Tokens are refreshed shortly before they expire. Concurrent callers that
//! find the token expiring share one refresh: the first caller starts it,
//! everyone else awaits the same [`Shared`] future, so exactly one
//! `/auth/refresh` call is made per expiry. A forced refresh names the token
//! the server rejected; if that token has already been replaced, the
//! replacement is returned instead of refreshing again.

use async_trait::async_trait;
use chrono::TimeDelta;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use std::sync::{Arc, Mutex, MutexGuard};
use ticketdesk_core::auth::{AuthApi, TokenSource};
use ticketdesk_core::clock::Clock;
use ticketdesk_core::credentials::{CredentialWriter, REFRESH_BUFFER};
use ticketdesk_core::{DeskError, Result};

type RefreshFlight = Shared<BoxFuture<'static, Result<String>>>;

enum Plan {
    Ready(String),
    Await(RefreshFlight),
}

/// Keeps the stored access token valid.
pub struct TokenLifecycleManager {
    store: Arc<dyn CredentialWriter>,
    auth: Arc<dyn AuthApi>,
    clock: Arc<dyn Clock>,
    in_flight: Mutex<Option<RefreshFlight>>,
}

impl TokenLifecycleManager {
    pub fn new(
        store: Arc<dyn CredentialWriter>,
        auth: Arc<dyn AuthApi>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            auth,
            clock,
            in_flight: Mutex::new(None),
        }
    }

    /// True if no token is stored or it expires within `buffer`.
    pub fn is_expiring(&self, buffer: TimeDelta) -> bool {
        self.store.snapshot().is_expiring(self.clock.now(), buffer)
    }

    /// Returns a usable access token, refreshing first if it is expiring.
    pub async fn ensure_valid(&self) -> Result<String> {
        let flight = match self.plan(None) {
            Plan::Ready(token) => return Ok(token),
            Plan::Await(flight) => flight,
        };
        self.finish(flight).await
    }

    /// Refreshes after the server rejected `rejected`, regardless of expiry.
    ///
    /// Joins any refresh already running. When the stored token is no longer
    /// `rejected` and still valid, another caller has already refreshed and
    /// that token is returned without a new refresh.
    pub async fn force_refresh(&self, rejected: &str) -> Result<String> {
        let flight = match self.plan(Some(rejected)) {
            Plan::Ready(token) => return Ok(token),
            Plan::Await(flight) => flight,
        };
        self.finish(flight).await
    }

    /// Drops the stored session.
    pub fn invalidate(&self) -> Result<()> {
        tracing::info!("Invalidating stored session");
        self.store.clear()
    }

    fn slot(&self) -> MutexGuard<'_, Option<RefreshFlight>> {
        self.in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Decides under the slot lock whether to use the stored token, join the
    /// running refresh or start a new one.
    fn plan(&self, rejected: Option<&str>) -> Plan {
        let mut slot = self.slot();

        if let Some(flight) = slot.as_ref()
            && flight.peek().is_none()
        {
            tracing::debug!("Joining in-flight token refresh");
            return Plan::Await(flight.clone());
        }

        let current = self.store.snapshot();
        if !current.is_expiring(self.clock.now(), REFRESH_BUFFER)
            && let Some(token) = current.access_token()
            && rejected.is_none_or(|rejected| rejected != token)
        {
            if rejected.is_some() {
                tracing::debug!("Rejected token was already replaced, skipping refresh");
            }
            return Plan::Ready(token.to_string());
        }

        tracing::debug!(forced = rejected.is_some(), "Starting token refresh");
        let flight = refresh(self.store.clone(), self.auth.clone(), self.clock.clone())
            .boxed()
            .shared();
        *slot = Some(flight.clone());
        Plan::Await(flight)
    }

    async fn finish(&self, flight: RefreshFlight) -> Result<String> {
        let outcome = flight.clone().await;

        let mut slot = self.slot();
        if slot
            .as_ref()
            .is_some_and(|current| Shared::ptr_eq(current, &flight))
        {
            *slot = None;
        }

        outcome
    }
}

#[async_trait]
impl TokenSource for TokenLifecycleManager {
    async fn valid_token(&self) -> Result<String> {
        self.ensure_valid().await
    }
}

async fn refresh(
    store: Arc<dyn CredentialWriter>,
    auth: Arc<dyn AuthApi>,
    clock: Arc<dyn Clock>,
) -> Result<String> {
    let Some(refresh_token) = store.snapshot().refresh_token().map(str::to_string) else {
        clear_quietly(store.as_ref());
        return Err(DeskError::session_expired("No refresh token available"));
    };

    match auth.refresh(&refresh_token).await {
        Ok(access_token) => {
            // Logged out (or re-logged in) while the refresh was running.
            if !store.apply_refresh(&refresh_token, &access_token, clock.now())? {
                return Err(DeskError::session_expired(
                    "Session changed during token refresh",
                ));
            }
            tracing::info!("Access token refreshed");
            Ok(access_token)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Token refresh failed, clearing session");
            clear_quietly(store.as_ref());
            Err(DeskError::session_expired(format!(
                "Token refresh failed: {}",
                e
            )))
        }
    }
}

fn clear_quietly(store: &dyn CredentialWriter) {
    if let Err(e) = store.clear() {
        tracing::warn!(error = %e, "Failed to clear stored credentials");
    }
}
