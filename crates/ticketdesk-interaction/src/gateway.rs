//! Authenticated request gateway.

use crate::http::{ApiRequest, ApiResponse, HttpExecutor};
use crate::token_manager::TokenLifecycleManager;
use std::sync::Arc;
use ticketdesk_core::{DeskError, Result};

/// Sends requests with a valid bearer token.
///
/// A 401 triggers exactly one forced refresh and one retry. Concurrent
/// requests rejected for the same token share that refresh. If the retry
/// fails in any way the session is dropped and the caller gets
/// `SessionExpired`. Other statuses come back untouched, and transport
/// failures on the first attempt propagate as-is.
pub struct AuthenticatedGateway {
    tokens: Arc<TokenLifecycleManager>,
    http: Arc<dyn HttpExecutor>,
}

impl AuthenticatedGateway {
    pub fn new(tokens: Arc<TokenLifecycleManager>, http: Arc<dyn HttpExecutor>) -> Self {
        Self { tokens, http }
    }

    pub async fn request(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let token = self.tokens.ensure_valid().await?;
        let response = self.http.execute(request, Some(&token)).await?;
        if !response.is_unauthorized() {
            return Ok(response);
        }

        tracing::info!(url = %request.url, "Access token rejected, refreshing once");
        let token = self.tokens.force_refresh(&token).await?;

        match self.http.execute(request, Some(&token)).await {
            Ok(retried) if !retried.is_unauthorized() => Ok(retried),
            Ok(_) => self.expire("Access token rejected after refresh"),
            Err(e) => self.expire(format!("Retry after token refresh failed: {}", e)),
        }
    }

    fn expire(&self, reason: impl Into<String>) -> Result<ApiResponse> {
        let reason = reason.into();
        tracing::warn!(reason = %reason, "Ending session");
        if let Err(e) = self.tokens.invalidate() {
            tracing::warn!(error = %e, "Failed to clear stored credentials");
        }
        Err(DeskError::session_expired(reason))
    }
}
