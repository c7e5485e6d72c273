//! Authentication API contract.
//!
//! The token lifecycle manager and the login/logout flow talk to the auth
//! endpoints only through [`AuthApi`], so both can be exercised without a
//! server.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Tokens returned by a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    pub refresh_token: String,
}

/// Login form contents.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Unauthenticated auth endpoints (`/auth/*`).
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// `POST /auth/register`. Rejections surface as `AuthFailure`.
    async fn register(&self, request: &LoginRequest) -> Result<()>;

    /// `POST /auth/login`. Bad credentials surface as `AuthFailure`.
    async fn login(&self, request: &LoginRequest) -> Result<TokenGrant>;

    /// `POST /auth/refresh`. Returns the new access token.
    async fn refresh(&self, refresh_token: &str) -> Result<String>;

    /// `POST /auth/logout`. Revokes the refresh token server-side.
    async fn logout(&self, refresh_token: &str) -> Result<()>;
}

/// Hands out an access token that is valid right now, refreshing the stored
/// session first when needed.
///
/// Consumers that only read the credential store (the real-time channel)
/// rely on someone calling this before they pick the token up.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn valid_token(&self) -> Result<String>;
}
