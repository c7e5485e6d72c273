//! Client for the unauthenticated `/auth/*` endpoints.

use crate::http::{ApiRequest, ApiResponse, HttpExecutor};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use ticketdesk_core::auth::{AuthApi, LoginRequest, TokenGrant};
use ticketdesk_core::config::ClientConfig;
use ticketdesk_core::{DeskError, Result};

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: String,
}

/// [`AuthApi`] over HTTP.
#[derive(Clone)]
pub struct HttpAuthClient {
    config: ClientConfig,
    http: Arc<dyn HttpExecutor>,
}

impl HttpAuthClient {
    pub fn new(config: ClientConfig, http: Arc<dyn HttpExecutor>) -> Self {
        Self { config, http }
    }

    async fn post(&self, path: &str, body: serde_json::Value) -> Result<ApiResponse> {
        let request = ApiRequest::post_json(self.config.endpoint(path)?, body);
        self.http.execute(&request, None).await
    }

    /// Credential rejections become `AuthFailure`; 5xx stays a transport error.
    fn credential_result(response: ApiResponse, fallback: &str) -> Result<ApiResponse> {
        if response.is_success() {
            Ok(response)
        } else if response.is_server_error() {
            Err(DeskError::transport_status(
                response.status,
                response.error_message(),
            ))
        } else {
            let message = if response.body.trim().is_empty() {
                fallback.to_string()
            } else {
                response.error_message()
            };
            Err(DeskError::auth_failure(message))
        }
    }
}

#[async_trait]
impl AuthApi for HttpAuthClient {
    async fn register(&self, request: &LoginRequest) -> Result<()> {
        let response = self.post("/auth/register", serde_json::to_value(request)?).await?;
        Self::credential_result(response, "Registration failed")?;
        tracing::info!("Registered new account");
        Ok(())
    }

    async fn login(&self, request: &LoginRequest) -> Result<TokenGrant> {
        let response = self.post("/auth/login", serde_json::to_value(request)?).await?;
        let response = Self::credential_result(response, "Login failed")?;
        response.json::<TokenGrant>()
    }

    async fn refresh(&self, refresh_token: &str) -> Result<String> {
        let response = self
            .post("/auth/refresh", json!({ "refresh_token": refresh_token }))
            .await?;
        if !response.is_success() {
            return Err(DeskError::session_expired(response.error_message()));
        }
        Ok(response.json::<RefreshResponse>()?.access_token)
    }

    async fn logout(&self, refresh_token: &str) -> Result<()> {
        let response = self
            .post("/auth/logout", json!({ "refresh_token": refresh_token }))
            .await?;
        response.into_result().map(|_| ())
    }
}
