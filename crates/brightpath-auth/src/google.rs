//! Google sign-in support.
//!
//! The client-side flow hands us a Google OAuth access token; we call the
//! userinfo endpoint to confirm it and learn who the token belongs to.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::AuthError;

pub const USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v3/userinfo";

/// Profile data returned by the userinfo endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleProfile {
    /// Google's stable subject identifier.
    pub sub: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Verifies Google access tokens. Abstracted so tests can substitute a
/// local server for the real endpoint.
#[async_trait]
pub trait GoogleVerifier: Send + Sync {
    /// Resolves an access token to the profile it belongs to.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` when Google rejects the
    /// token and `AuthError::Provider` when the call itself fails.
    async fn verify(&self, access_token: &str) -> Result<GoogleProfile, AuthError>;
}

/// Calls the real (or configured) userinfo endpoint over HTTPS.
#[derive(Clone)]
pub struct HttpGoogleVerifier {
    client: reqwest::Client,
    userinfo_url: String,
}

impl HttpGoogleVerifier {
    #[must_use]
    pub fn new(userinfo_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            userinfo_url: userinfo_url.into(),
        }
    }
}

impl Default for HttpGoogleVerifier {
    fn default() -> Self {
        Self::new(USERINFO_URL)
    }
}

#[async_trait]
impl GoogleVerifier for HttpGoogleVerifier {
    async fn verify(&self, access_token: &str) -> Result<GoogleProfile, AuthError> {
        let response = self
            .client
            .get(&self.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AuthError::provider(e.to_string()))?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(AuthError::InvalidCredentials);
        }
        if !response.status().is_success() {
            return Err(AuthError::provider(format!(
                "userinfo returned {}",
                response.status()
            )));
        }
        response
            .json::<GoogleProfile>()
            .await
            .map_err(|e| AuthError::provider(e.to_string()))
    }
}
