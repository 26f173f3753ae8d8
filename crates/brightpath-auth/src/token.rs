//! JWT issuance and validation.
//!
//! Tokens are signed with HS256 and carry a `kind` claim so an access token
//! can never be replayed as a refresh or password-reset token. Reset tokens
//! additionally embed a fingerprint of the current password hash, which
//! invalidates them as soon as the password changes.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use brightpath_core::now_utc;

use crate::error::AuthError;

/// What a token is allowed to be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Access,
    Refresh,
    Reset,
}

/// Claims carried by every Brightpath token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id.
    pub sub: Uuid,
    /// Expiry as a unix timestamp.
    pub exp: i64,
    /// Issued-at as a unix timestamp.
    pub iat: i64,
    /// What this token may be used for.
    pub kind: TokenKind,
    /// Password-hash fingerprint, present on reset tokens only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pwd_fp: Option<String>,
}

/// An access/refresh pair handed out at login and verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Issues and validates HS256 tokens with a shared secret.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
    reset_ttl: Duration,
}

impl TokenService {
    #[must_use]
    pub fn new(
        secret: &str,
        access_ttl: Duration,
        refresh_ttl: Duration,
        reset_ttl: Duration,
    ) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl,
            refresh_ttl,
            reset_ttl,
        }
    }

    /// Issues an access/refresh pair for a user.
    pub fn issue_pair(&self, user_id: Uuid) -> Result<TokenPair, AuthError> {
        Ok(TokenPair {
            access: self.issue(user_id, TokenKind::Access, self.access_ttl, None)?,
            refresh: self.issue(user_id, TokenKind::Refresh, self.refresh_ttl, None)?,
        })
    }

    /// Issues a password-reset token bound to the current password hash.
    pub fn issue_reset(&self, user_id: Uuid, password_hash: &str) -> Result<String, AuthError> {
        let fp = password_fingerprint(password_hash);
        self.issue(user_id, TokenKind::Reset, self.reset_ttl, Some(fp))
    }

    fn issue(
        &self,
        user_id: Uuid,
        kind: TokenKind,
        ttl: Duration,
        pwd_fp: Option<String>,
    ) -> Result<String, AuthError> {
        let now = now_utc();
        let claims = Claims {
            sub: user_id,
            exp: (now + ttl).unix_timestamp(),
            iat: now.unix_timestamp(),
            kind,
            pwd_fp,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::invalid_token(e.to_string()))
    }

    /// Decodes a token and checks that it is of the expected kind and not
    /// expired.
    pub fn verify(&self, token: &str, expected: TokenKind) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        let data = decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|e| AuthError::invalid_token(e.to_string()))?;
        let claims = data.claims;
        if claims.kind != expected {
            return Err(AuthError::invalid_token("wrong token kind"));
        }
        let expiry = OffsetDateTime::from_unix_timestamp(claims.exp)
            .map_err(|e| AuthError::invalid_token(e.to_string()))?;
        if expiry <= now_utc() {
            return Err(AuthError::invalid_token("token expired"));
        }
        Ok(claims)
    }

    /// Verifies a reset token against the account's current password hash.
    pub fn verify_reset(&self, token: &str, password_hash: &str) -> Result<Claims, AuthError> {
        let claims = self.verify(token, TokenKind::Reset)?;
        let expected = password_fingerprint(password_hash);
        if claims.pwd_fp.as_deref() != Some(expected.as_str()) {
            return Err(AuthError::invalid_token("reset token no longer valid"));
        }
        Ok(claims)
    }
}

fn password_fingerprint(password_hash: &str) -> String {
    let digest = Sha256::digest(password_hash.as_bytes());
    hex::encode(&digest[..8])
}
