//! Accounts, tokens and verification flows.
//!
//! The [`AuthService`] orchestrates registration with email verification,
//! login, token refresh, password reset and Google sign-in on top of the
//! storage traits.

pub mod config;
pub mod email;
pub mod error;
pub mod google;
pub mod otp;
pub mod password;
pub mod service;
pub mod token;

pub use config::{AuthConfig, SmtpConfig};
pub use email::{EmailSender, LogEmailSender, OutboundEmail, SmtpEmailSender};
pub use error::AuthError;
pub use google::{GoogleProfile, GoogleVerifier, HttpGoogleVerifier};
pub use service::{AuthOutcome, AuthService};
pub use token::{Claims, TokenKind, TokenPair, TokenService};
