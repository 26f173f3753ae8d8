use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::id::new_id;
use crate::time::now_utc;

/// OTP codes are accepted for five minutes after issue.
pub const OTP_TTL: Duration = Duration::minutes(5);

/// A registered account.
///
/// Users are created inactive and flip to active once their email is
/// verified with an OTP. Social-login accounts have no password hash and
/// are active from the start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub is_active: bool,
    /// Google account subject when the user signed in via Google.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_sub: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl User {
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        let now = now_utc();
        Self {
            id: new_id(),
            username: username.into(),
            email: email.into(),
            password_hash: None,
            is_active: false,
            google_sub: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = now_utc();
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
        }
    }
}

/// The subset of user fields embedded in other payloads (appointments,
/// forum posts).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

/// A one-time passcode tied to an email address.
///
/// The email may belong to a not-yet-activated user, so the code is keyed
/// by email rather than user id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpCode {
    pub id: Uuid,
    pub email: String,
    pub code: String,
    pub used: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl OtpCode {
    pub fn issue(email: impl Into<String>, code: impl Into<String>) -> Self {
        let now = now_utc();
        Self {
            id: new_id(),
            email: email.into(),
            code: code.into(),
            used: false,
            expires_at: now + OTP_TTL,
            created_at: now,
        }
    }

    /// A code is live when it is unused and not yet expired.
    pub fn is_valid(&self, now: OffsetDateTime) -> bool {
        !self.used && self.expires_at > now
    }
}
