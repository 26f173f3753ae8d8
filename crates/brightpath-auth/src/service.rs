//! Account flows: registration, verification, login, password reset and
//! Google sign-in.

use std::sync::Arc;

use brightpath_core::model::{OtpCode, User, UserSummary};
use brightpath_core::now_utc;
use brightpath_storage::DataStore;
use tracing::{info, warn};
use uuid::Uuid;

use crate::email::{EmailSender, OutboundEmail};
use crate::error::AuthError;
use crate::google::GoogleVerifier;
use crate::otp;
use crate::password::{hash_password, verify_password};
use crate::token::{TokenKind, TokenPair, TokenService};

/// Result of a successful login or verification.
#[derive(Debug, Clone)]
pub struct AuthOutcome {
    pub user: UserSummary,
    pub tokens: TokenPair,
}

/// Orchestrates account flows on top of the store, token service, mailer
/// and identity provider.
pub struct AuthService {
    store: Arc<dyn DataStore>,
    tokens: TokenService,
    email: Arc<dyn EmailSender>,
    google: Arc<dyn GoogleVerifier>,
    /// Base URL the password-reset link points at; the token is appended
    /// as a query parameter.
    reset_url_base: String,
}

impl AuthService {
    #[must_use]
    pub fn new(
        store: Arc<dyn DataStore>,
        tokens: TokenService,
        email: Arc<dyn EmailSender>,
        google: Arc<dyn GoogleVerifier>,
        reset_url_base: impl Into<String>,
    ) -> Self {
        Self {
            store,
            tokens,
            email,
            google,
            reset_url_base: reset_url_base.into(),
        }
    }

    /// Registers a new account and emails a verification code.
    ///
    /// The account stays inactive until the code is confirmed. If the email
    /// cannot be delivered the account is rolled back so the address can be
    /// registered again.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<UserSummary, AuthError> {
        if self.store.find_user_by_username(username).await?.is_some() {
            return Err(AuthError::UsernameTaken {
                username: username.to_string(),
            });
        }
        if self.store.find_user_by_email(email).await?.is_some() {
            return Err(AuthError::EmailTaken {
                email: email.to_string(),
            });
        }

        let mut user = User::new(username, email);
        user.password_hash = Some(hash_password(password)?);
        let user = self.store.create_user(&user).await?;

        if let Err(e) = self.issue_and_send_otp(&user.email).await {
            warn!(email = %user.email, error = %e, "verification email failed, rolling back account");
            let _ = self.store.delete_otp(&user.email).await;
            let _ = self.store.delete_user(user.id).await;
            return Err(e);
        }

        info!(user_id = %user.id, "account registered, awaiting verification");
        Ok(user.summary())
    }

    /// Confirms a verification code and activates the account.
    pub async fn verify_otp(&self, email: &str, code: &str) -> Result<AuthOutcome, AuthError> {
        let mut user = self
            .store
            .find_user_by_email(email)
            .await?
            .ok_or_else(|| AuthError::UnknownEmail {
                email: email.to_string(),
            })?;

        let otp = self
            .store
            .get_otp(email)
            .await?
            .ok_or(AuthError::InvalidOtp)?;
        if !otp.is_valid(now_utc()) || otp.code != code {
            return Err(AuthError::InvalidOtp);
        }

        self.store.mark_otp_used(email).await?;
        if !user.is_active {
            user.is_active = true;
            user.touch();
            user = self.store.update_user(&user).await?;
        }

        let tokens = self.tokens.issue_pair(user.id)?;
        info!(user_id = %user.id, "account verified");
        Ok(AuthOutcome {
            user: user.summary(),
            tokens,
        })
    }

    /// Sends a fresh verification code to a pending account.
    pub async fn resend_otp(&self, email: &str) -> Result<(), AuthError> {
        let user = self
            .store
            .find_user_by_email(email)
            .await?
            .ok_or_else(|| AuthError::UnknownEmail {
                email: email.to_string(),
            })?;
        if user.is_active {
            return Err(AuthError::invalid_request("account is already verified"));
        }
        self.issue_and_send_otp(&user.email).await
    }

    /// Authenticates with email and password.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthOutcome, AuthError> {
        let user = self
            .store
            .find_user_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;
        let hash = user
            .password_hash
            .as_deref()
            .ok_or(AuthError::InvalidCredentials)?;
        if !verify_password(password, hash)? {
            return Err(AuthError::InvalidCredentials);
        }
        if !user.is_active {
            return Err(AuthError::AccountInactive);
        }
        let tokens = self.tokens.issue_pair(user.id)?;
        Ok(AuthOutcome {
            user: user.summary(),
            tokens,
        })
    }

    /// Exchanges a refresh token for a new access/refresh pair.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let claims = self.tokens.verify(refresh_token, TokenKind::Refresh)?;
        let user = self
            .store
            .get_user(claims.sub)
            .await?
            .ok_or_else(|| AuthError::invalid_token("unknown subject"))?;
        if !user.is_active {
            return Err(AuthError::AccountInactive);
        }
        Ok(self.tokens.issue_pair(user.id)?)
    }

    /// Emails a password-reset link.
    pub async fn forgot_password(&self, email: &str) -> Result<(), AuthError> {
        let user = self
            .store
            .find_user_by_email(email)
            .await?
            .ok_or_else(|| AuthError::UnknownEmail {
                email: email.to_string(),
            })?;
        let token = self
            .tokens
            .issue_reset(user.id, user.password_hash.as_deref().unwrap_or_default())?;
        let link = format!("{}?token={token}", self.reset_url_base);
        self.email
            .send(OutboundEmail {
                to: user.email.clone(),
                subject: "Reset your Brightpath password".to_string(),
                body: format!(
                    "Hello {},\n\nUse the link below to choose a new password. \
                     The link expires shortly.\n\n{link}\n\nIf you did not ask \
                     for this, you can ignore this email.",
                    user.username
                ),
            })
            .await
    }

    /// Sets a new password using a reset token.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), AuthError> {
        let claims = self.tokens.verify(token, TokenKind::Reset)?;
        let mut user = self
            .store
            .get_user(claims.sub)
            .await?
            .ok_or_else(|| AuthError::invalid_token("unknown subject"))?;
        // Reject tokens issued before the last password change.
        self.tokens
            .verify_reset(token, user.password_hash.as_deref().unwrap_or_default())?;

        user.password_hash = Some(hash_password(new_password)?);
        user.touch();
        self.store.update_user(&user).await?;
        info!(user_id = %user.id, "password reset");
        Ok(())
    }

    /// Signs in with a Google access token, creating the account on first
    /// use. Google has already verified the address, so the account is
    /// active immediately.
    pub async fn google_login(&self, access_token: &str) -> Result<AuthOutcome, AuthError> {
        let profile = self.google.verify(access_token).await?;

        let user = match self.store.find_user_by_email(&profile.email).await? {
            Some(mut existing) => {
                let mut changed = false;
                if existing.google_sub.is_none() {
                    existing.google_sub = Some(profile.sub.clone());
                    changed = true;
                }
                if !existing.is_active {
                    existing.is_active = true;
                    changed = true;
                }
                if changed {
                    existing.touch();
                    self.store.update_user(&existing).await?
                } else {
                    existing
                }
            }
            None => {
                let username = profile
                    .name
                    .clone()
                    .unwrap_or_else(|| profile.email.clone());
                let mut user = User::new(username, &profile.email);
                user.is_active = true;
                user.google_sub = Some(profile.sub.clone());
                self.store.create_user(&user).await?
            }
        };

        let tokens = self.tokens.issue_pair(user.id)?;
        Ok(AuthOutcome {
            user: user.summary(),
            tokens,
        })
    }

    /// Verifies an access token and returns its subject.
    pub async fn authenticate(&self, access_token: &str) -> Result<User, AuthError> {
        let claims = self.tokens.verify(access_token, TokenKind::Access)?;
        let user = self
            .store
            .get_user(claims.sub)
            .await?
            .ok_or_else(|| AuthError::invalid_token("unknown subject"))?;
        if !user.is_active {
            return Err(AuthError::AccountInactive);
        }
        Ok(user)
    }

    async fn issue_and_send_otp(&self, email: &str) -> Result<(), AuthError> {
        let code = otp::generate_code();
        self.store.put_otp(&OtpCode::issue(email, &code)).await?;
        self.email
            .send(OutboundEmail {
                to: email.to_string(),
                subject: "Your Brightpath verification code".to_string(),
                body: format!(
                    "Your verification code is {code}. It expires in 5 minutes."
                ),
            })
            .await
    }

    /// Looks up a user by id. Used by handlers that need author/patient
    /// summaries.
    pub async fn user_summary(&self, id: Uuid) -> Result<Option<UserSummary>, AuthError> {
        Ok(self.store.get_user(id).await?.map(|u| u.summary()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::google::GoogleProfile;
    use async_trait::async_trait;
    use brightpath_db_memory::MemoryStore;
    use std::sync::Mutex;
    use time::Duration;

    /// Records outbound mail; optionally fails every send.
    #[derive(Default)]
    struct RecordingSender {
        sent: Mutex<Vec<OutboundEmail>>,
        fail: bool,
    }

    #[async_trait]
    impl EmailSender for RecordingSender {
        async fn send(&self, email: OutboundEmail) -> Result<(), AuthError> {
            if self.fail {
                return Err(AuthError::email_delivery("smtp down"));
            }
            self.sent.lock().unwrap().push(email);
            Ok(())
        }
    }

    struct StubGoogle {
        profile: GoogleProfile,
    }

    #[async_trait]
    impl GoogleVerifier for StubGoogle {
        async fn verify(&self, access_token: &str) -> Result<GoogleProfile, AuthError> {
            if access_token == "good" {
                Ok(self.profile.clone())
            } else {
                Err(AuthError::InvalidCredentials)
            }
        }
    }

    fn service_with(
        store: Arc<MemoryStore>,
        email: Arc<RecordingSender>,
    ) -> AuthService {
        let tokens = TokenService::new(
            "unit-test-secret",
            Duration::minutes(15),
            Duration::days(7),
            Duration::minutes(30),
        );
        let google = Arc::new(StubGoogle {
            profile: GoogleProfile {
                sub: "g-123".to_string(),
                email: "social@example.com".to_string(),
                name: Some("Social Parent".to_string()),
            },
        });
        AuthService::new(store, tokens, email, google, "https://app.test/reset")
    }

    fn sent_code(sender: &RecordingSender) -> String {
        let sent = sender.sent.lock().unwrap();
        let body = &sent.last().unwrap().body;
        body.split("code is ")
            .nth(1)
            .unwrap()
            .chars()
            .take(6)
            .collect()
    }

    #[tokio::test]
    async fn register_verify_login_flow() {
        let store = Arc::new(MemoryStore::new());
        let sender = Arc::new(RecordingSender::default());
        let svc = service_with(store.clone(), sender.clone());

        svc.register("parent1", "p@example.com", "pass1234")
            .await
            .unwrap();

        // Not yet verified, login is refused.
        let err = svc.login("p@example.com", "pass1234").await.unwrap_err();
        assert!(matches!(err, AuthError::AccountInactive));

        let code = sent_code(&sender);
        let outcome = svc.verify_otp("p@example.com", &code).await.unwrap();
        assert_eq!(outcome.user.email, "p@example.com");

        let outcome = svc.login("p@example.com", "pass1234").await.unwrap();
        assert_eq!(outcome.user.username, "parent1");
    }

    #[tokio::test]
    async fn register_rolls_back_when_email_fails() {
        let store = Arc::new(MemoryStore::new());
        let sender = Arc::new(RecordingSender {
            fail: true,
            ..Default::default()
        });
        let svc = service_with(store.clone(), sender);

        let err = svc
            .register("parent1", "p@example.com", "pass1234")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::EmailDelivery { .. }));

        // The address is free again.
        use brightpath_storage::UserStore;
        assert!(
            store
                .find_user_by_email("p@example.com")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn duplicate_registration_is_rejected() {
        let store = Arc::new(MemoryStore::new());
        let sender = Arc::new(RecordingSender::default());
        let svc = service_with(store, sender);

        svc.register("a", "dup@example.com", "pass1234")
            .await
            .unwrap();
        let err = svc
            .register("b", "dup@example.com", "pass1234")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::EmailTaken { .. }));
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let store = Arc::new(MemoryStore::new());
        let sender = Arc::new(RecordingSender::default());
        let svc = service_with(store, sender);

        svc.register("jane", "jane@example.com", "pass1234")
            .await
            .unwrap();
        let err = svc
            .register("jane", "other@example.com", "pass1234")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UsernameTaken { .. }));
    }

    #[tokio::test]
    async fn otp_is_single_use() {
        let store = Arc::new(MemoryStore::new());
        let sender = Arc::new(RecordingSender::default());
        let svc = service_with(store, sender.clone());

        svc.register("parent1", "p@example.com", "pass1234")
            .await
            .unwrap();
        let code = sent_code(&sender);
        svc.verify_otp("p@example.com", &code).await.unwrap();

        let err = svc.verify_otp("p@example.com", &code).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidOtp));
    }

    #[tokio::test]
    async fn wrong_code_is_rejected() {
        let store = Arc::new(MemoryStore::new());
        let sender = Arc::new(RecordingSender::default());
        let svc = service_with(store, sender.clone());

        svc.register("parent1", "p@example.com", "pass1234")
            .await
            .unwrap();
        let mut wrong = sent_code(&sender);
        // Flip the last digit.
        let last = wrong.pop().unwrap();
        wrong.push(if last == '0' { '1' } else { '0' });

        let err = svc.verify_otp("p@example.com", &wrong).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidOtp));
    }

    #[tokio::test]
    async fn resend_requires_pending_account() {
        let store = Arc::new(MemoryStore::new());
        let sender = Arc::new(RecordingSender::default());
        let svc = service_with(store, sender.clone());

        let err = svc.resend_otp("nobody@example.com").await.unwrap_err();
        assert!(matches!(err, AuthError::UnknownEmail { .. }));

        svc.register("parent1", "p@example.com", "pass1234")
            .await
            .unwrap();
        svc.resend_otp("p@example.com").await.unwrap();
        assert_eq!(sender.sent.lock().unwrap().len(), 2);

        let code = sent_code(&sender);
        svc.verify_otp("p@example.com", &code).await.unwrap();
        let err = svc.resend_otp("p@example.com").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidRequest { .. }));
    }

    #[tokio::test]
    async fn password_reset_flow() {
        let store = Arc::new(MemoryStore::new());
        let sender = Arc::new(RecordingSender::default());
        let svc = service_with(store, sender.clone());

        svc.register("parent1", "p@example.com", "old-pass-123")
            .await
            .unwrap();
        let code = sent_code(&sender);
        svc.verify_otp("p@example.com", &code).await.unwrap();

        svc.forgot_password("p@example.com").await.unwrap();
        let link_body = sender.sent.lock().unwrap().last().unwrap().body.clone();
        let token = link_body
            .split("?token=")
            .nth(1)
            .unwrap()
            .split_whitespace()
            .next()
            .unwrap()
            .to_string();

        svc.reset_password(&token, "new-pass-456").await.unwrap();
        svc.login("p@example.com", "new-pass-456").await.unwrap();
        let err = svc.login("p@example.com", "old-pass-123").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));

        // The used token is dead now that the hash changed.
        let err = svc.reset_password(&token, "again-789").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken { .. }));
    }

    #[tokio::test]
    async fn google_login_creates_active_account() {
        let store = Arc::new(MemoryStore::new());
        let sender = Arc::new(RecordingSender::default());
        let svc = service_with(store.clone(), sender);

        let outcome = svc.google_login("good").await.unwrap();
        assert_eq!(outcome.user.email, "social@example.com");

        use brightpath_storage::UserStore;
        let user = store
            .find_user_by_email("social@example.com")
            .await
            .unwrap()
            .unwrap();
        assert!(user.is_active);
        assert_eq!(user.google_sub.as_deref(), Some("g-123"));

        // Second login reuses the account.
        let again = svc.google_login("good").await.unwrap();
        assert_eq!(again.user.id, outcome.user.id);
    }

    #[tokio::test]
    async fn google_login_with_bad_token_fails() {
        let store = Arc::new(MemoryStore::new());
        let sender = Arc::new(RecordingSender::default());
        let svc = service_with(store, sender);

        let err = svc.google_login("bad").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn refresh_rotates_the_pair() {
        let store = Arc::new(MemoryStore::new());
        let sender = Arc::new(RecordingSender::default());
        let svc = service_with(store, sender.clone());

        svc.register("parent1", "p@example.com", "pass1234")
            .await
            .unwrap();
        let code = sent_code(&sender);
        let outcome = svc.verify_otp("p@example.com", &code).await.unwrap();

        let pair = svc.refresh(&outcome.tokens.refresh).await.unwrap();
        let user = svc.authenticate(&pair.access).await.unwrap();
        assert_eq!(user.email, "p@example.com");

        // An access token is not accepted as a refresh token.
        assert!(svc.refresh(&outcome.tokens.access).await.is_err());
    }
}
