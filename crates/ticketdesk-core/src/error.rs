//! Error types for the Ticketdesk client.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the entire Ticketdesk client.
///
/// The first four variants form the session-layer taxonomy: credentials
/// rejected at login, a session that can no longer be refreshed, a failed
/// REST exchange, and an error pushed by the real-time peer. The rest cover
/// business rejections and the ambient storage/config layers.
///
/// The type is `Clone` so a single refresh outcome can be handed to every
/// caller waiting on it.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DeskError {
    /// Bad credentials at login or registration.
    #[error("Authentication failed: {0}")]
    AuthFailure(String),

    /// Refresh impossible or rejected; the stored session has been cleared.
    #[error("Session expired: {0}")]
    SessionExpired(String),

    /// Network failure, timeout or 5xx on a REST call.
    #[error("Transport error{}: {message}", status_suffix(.status))]
    Transport {
        message: String,
        status: Option<u16>,
    },

    /// Error pushed by the real-time channel peer.
    #[error("Channel error: {0}")]
    Channel(String),

    /// Business-level rejection (validation, not found) surfaced verbatim.
    #[error("Request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// A gated ticket action was attempted while the status forbids it.
    #[error("Action '{action}' is not available while ticket status is '{status}'")]
    ActionNotAllowed { action: String, status: String },

    /// Input refused before any request was made.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound { entity_type: String, id: String },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DeskError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    pub fn auth_failure(message: impl Into<String>) -> Self {
        Self::AuthFailure(message.into())
    }

    pub fn session_expired(message: impl Into<String>) -> Self {
        Self::SessionExpired(message.into())
    }

    /// Creates a transport error without an HTTP status (network, timeout).
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            status: None,
        }
    }

    /// Creates a transport error carrying the HTTP status that caused it.
    pub fn transport_status(status: u16, message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            status: Some(status),
        }
    }

    pub fn channel(message: impl Into<String>) -> Self {
        Self::Channel(message.into())
    }

    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }

    pub fn action_not_allowed(action: impl Into<String>, status: impl Into<String>) -> Self {
        Self::ActionNotAllowed {
            action: action.into(),
            status: status.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::AuthFailure(_))
    }

    /// True when the caller must send the user back to re-authentication.
    pub fn is_session_expired(&self) -> bool {
        matches!(self, Self::SessionExpired(_))
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::Rejected { status: 404, .. })
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for DeskError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for DeskError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for DeskError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for DeskError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<url::ParseError> for DeskError {
    fn from(err: url::ParseError) -> Self {
        Self::Config(format!("invalid URL: {}", err))
    }
}

impl From<anyhow::Error> for DeskError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|code| format!(" ({})", code)).unwrap_or_default()
}

/// A type alias for `Result<T, DeskError>`.
pub type Result<T> = std::result::Result<T, DeskError>;
