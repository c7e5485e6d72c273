//! Credentials file DTO.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ticketdesk_core::credentials::Credentials;

/// Current layout of `credentials.toml`.
pub const CREDENTIALS_SCHEMA_VERSION: u32 = 1;

/// Persisted form of [`Credentials`].
///
/// All three fields are written and cleared together.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CredentialsDto {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

fn default_schema_version() -> u32 {
    CREDENTIALS_SCHEMA_VERSION
}

// ============================================================================
// Domain conversions
// ============================================================================

impl From<&Credentials> for CredentialsDto {
    fn from(credentials: &Credentials) -> Self {
        Self {
            schema_version: CREDENTIALS_SCHEMA_VERSION,
            access_token: credentials.access_token().map(str::to_string),
            refresh_token: credentials.refresh_token().map(str::to_string),
            expires_at: credentials.expires_at(),
        }
    }
}

impl From<CredentialsDto> for Credentials {
    fn from(dto: CredentialsDto) -> Self {
        Credentials::from_parts(dto.access_token, dto.refresh_token, dto.expires_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_token_without_expiry_is_dropped() {
        let dto: CredentialsDto = toml::from_str(
            r#"
access_token = "a1"
refresh_token = "r1"
"#,
        )
        .unwrap();
        assert_eq!(dto.schema_version, CREDENTIALS_SCHEMA_VERSION);

        let credentials = Credentials::from(dto);
        assert_eq!(credentials.access_token(), None);
        assert_eq!(credentials.refresh_token(), Some("r1"));
    }

    #[test]
    fn test_issued_credentials_survive_toml() {
        let now = Utc::now();
        let credentials = Credentials::issued("a1", "r1", now);

        let text = toml::to_string_pretty(&CredentialsDto::from(&credentials)).unwrap();
        let dto: CredentialsDto = toml::from_str(&text).unwrap();

        assert_eq!(Credentials::from(dto), credentials);
    }
}
