//! Authentication error types.

/// Errors that can occur during account and token operations.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The supplied credentials do not match any active account.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The account exists but has not completed email verification.
    #[error("Account is not active")]
    AccountInactive,

    /// An account with this email already exists.
    #[error("Email already registered: {email}")]
    EmailTaken {
        /// The conflicting address.
        email: String,
    },

    /// An account with this username already exists.
    #[error("Username already taken: {username}")]
    UsernameTaken {
        /// The conflicting name.
        username: String,
    },

    /// No account matches the given email.
    #[error("No account for email: {email}")]
    UnknownEmail {
        /// The address that was looked up.
        email: String,
    },

    /// The verification code is wrong, expired, or already used.
    #[error("Invalid or expired verification code")]
    InvalidOtp,

    /// A token is malformed, expired, or of the wrong kind.
    #[error("Invalid token: {message}")]
    InvalidToken {
        /// Description of why the token is invalid.
        message: String,
    },

    /// The request is missing a required field or carries a bad value.
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Description of what is wrong with the request.
        message: String,
    },

    /// An outbound call to the identity provider failed.
    #[error("Identity provider error: {message}")]
    Provider {
        /// Description of the provider failure.
        message: String,
    },

    /// Sending an email failed.
    #[error("Email delivery failed: {message}")]
    EmailDelivery {
        /// Description of the delivery failure.
        message: String,
    },

    /// Password hashing or verification failed internally.
    #[error("Password hashing error: {message}")]
    Hashing {
        /// Description of the hashing failure.
        message: String,
    },

    /// An underlying storage operation failed.
    #[error("Storage error: {0}")]
    Storage(#[from] brightpath_storage::StorageError),
}

impl AuthError {
    /// Creates a new `InvalidToken` error.
    #[must_use]
    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::InvalidToken {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidRequest` error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Creates a new `Provider` error.
    #[must_use]
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider {
            message: message.into(),
        }
    }

    /// Creates a new `EmailDelivery` error.
    #[must_use]
    pub fn email_delivery(message: impl Into<String>) -> Self {
        Self::EmailDelivery {
            message: message.into(),
        }
    }

    /// Creates a new `Hashing` error.
    #[must_use]
    pub fn hashing(message: impl Into<String>) -> Self {
        Self::Hashing {
            message: message.into(),
        }
    }
}
