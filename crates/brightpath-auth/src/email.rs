//! Outbound email.
//!
//! Registration and password-reset flows send mail through an
//! [`EmailSender`]. Deployments use SMTP; development and tests use the
//! logging sender, which only records what would have been sent.

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::error::AuthError;

/// A plain-text email ready to send.
#[derive(Debug, Clone)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Delivers emails. Implementations must be thread-safe.
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Sends one email.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::EmailDelivery` when the message cannot be
    /// delivered.
    async fn send(&self, email: OutboundEmail) -> Result<(), AuthError>;
}

/// Sends through an SMTP relay with STARTTLS.
pub struct SmtpEmailSender {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpEmailSender {
    /// Builds a sender against `host`, authenticating with the given
    /// credentials.
    pub fn new(
        host: &str,
        username: &str,
        password: &str,
        from: &str,
    ) -> Result<Self, AuthError> {
        let from: Mailbox = from
            .parse()
            .map_err(|_| AuthError::email_delivery(format!("invalid from address: {from}")))?;
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .map_err(|e| AuthError::email_delivery(e.to_string()))?
            .credentials(Credentials::new(username.to_string(), password.to_string()))
            .build();
        Ok(Self { transport, from })
    }
}

#[async_trait]
impl EmailSender for SmtpEmailSender {
    async fn send(&self, email: OutboundEmail) -> Result<(), AuthError> {
        let to: Mailbox = email
            .to
            .parse()
            .map_err(|_| AuthError::email_delivery(format!("invalid recipient: {}", email.to)))?;
        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(email.subject)
            .body(email.body)
            .map_err(|e| AuthError::email_delivery(e.to_string()))?;
        self.transport
            .send(message)
            .await
            .map_err(|e| AuthError::email_delivery(e.to_string()))?;
        Ok(())
    }
}

/// Logs instead of sending. The default when SMTP is not configured.
#[derive(Debug, Default)]
pub struct LogEmailSender;

#[async_trait]
impl EmailSender for LogEmailSender {
    async fn send(&self, email: OutboundEmail) -> Result<(), AuthError> {
        tracing::info!(
            to = %email.to,
            subject = %email.subject,
            body = %email.body,
            "email delivery disabled, logging message instead"
        );
        Ok(())
    }
}
