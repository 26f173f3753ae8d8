//! Authentication configuration.

use serde::{Deserialize, Serialize};
use time::Duration;

use crate::error::AuthError;
use crate::google;

/// Authentication configuration.
///
/// # Example (TOML)
///
/// ```toml
/// [auth]
/// jwt_secret = "change-me"
/// access_token_minutes = 15
/// refresh_token_days = 7
///
/// [auth.smtp]
/// host = "smtp.example.com"
/// username = "mailer"
/// password = "secret"
/// from = "Brightpath <no-reply@brightpath.app>"
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Shared secret for HS256 token signing.
    pub jwt_secret: String,

    /// Access token lifetime in minutes.
    pub access_token_minutes: i64,

    /// Refresh token lifetime in days.
    pub refresh_token_days: i64,

    /// Password-reset token lifetime in minutes.
    pub reset_token_minutes: i64,

    /// Google userinfo endpoint. Overridable for tests.
    pub google_userinfo_url: String,

    /// Base URL embedded in password-reset emails.
    pub reset_url_base: String,

    /// SMTP relay settings. When absent, emails are logged instead of sent.
    pub smtp: Option<SmtpConfig>,
}

/// SMTP relay settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SmtpConfig {
    pub host: String,
    pub username: String,
    pub password: String,
    /// From address, optionally with a display name.
    pub from: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "brightpath-dev-secret".to_string(),
            access_token_minutes: 15,
            refresh_token_days: 7,
            reset_token_minutes: 30,
            google_userinfo_url: google::USERINFO_URL.to_string(),
            reset_url_base: "http://localhost:8080/reset-password".to_string(),
            smtp: None,
        }
    }
}

impl AuthConfig {
    /// Checks the configuration for values that cannot work.
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.jwt_secret.is_empty() {
            return Err(AuthError::invalid_request("auth.jwt_secret must be set"));
        }
        if self.access_token_minutes <= 0
            || self.refresh_token_days <= 0
            || self.reset_token_minutes <= 0
        {
            return Err(AuthError::invalid_request(
                "token lifetimes must be positive",
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn access_ttl(&self) -> Duration {
        Duration::minutes(self.access_token_minutes)
    }

    #[must_use]
    pub fn refresh_ttl(&self) -> Duration {
        Duration::days(self.refresh_token_days)
    }

    #[must_use]
    pub fn reset_ttl(&self) -> Duration {
        Duration::minutes(self.reset_token_minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        AuthConfig::default().validate().unwrap();
    }

    #[test]
    fn empty_secret_is_rejected() {
        let config = AuthConfig {
            jwt_secret: String::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn negative_lifetime_is_rejected() {
        let config = AuthConfig {
            access_token_minutes: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
