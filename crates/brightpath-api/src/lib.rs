//! Shared HTTP surface types: the uniform error body and pagination.

use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Uniform JSON error body returned by every endpoint.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ErrorBody {
    /// Stable machine-readable code: invalid | unauthorized | forbidden |
    /// not-found | conflict | upstream | exception
    pub error: &'static str,
    /// Human-readable description
    pub message: String,
}

/// High-level API errors to be mapped to HTTP responses.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Bad gateway: {0}")]
    BadGateway(String),
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
    pub fn bad_gateway(msg: impl Into<String>) -> Self {
        Self::BadGateway(msg.into())
    }
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn to_body(&self) -> ErrorBody {
        let (code, message) = match self {
            ApiError::BadRequest(msg) => ("invalid", msg.clone()),
            ApiError::Unauthorized(msg) => ("unauthorized", msg.clone()),
            ApiError::Forbidden(msg) => ("forbidden", msg.clone()),
            ApiError::NotFound(msg) => ("not-found", msg.clone()),
            ApiError::Conflict(msg) => ("conflict", msg.clone()),
            ApiError::BadGateway(msg) => ("upstream", msg.clone()),
            // Internal details are logged server-side, never echoed.
            ApiError::Internal(_) => ("exception", "Internal server error".to_string()),
        };
        ErrorBody {
            error: code,
            message,
        }
    }
}

impl From<brightpath_storage::StorageError> for ApiError {
    fn from(err: brightpath_storage::StorageError) -> Self {
        use brightpath_storage::StorageError;
        match err {
            StorageError::NotFound { .. } => Self::NotFound(err.to_string()),
            StorageError::AlreadyExists { .. } => Self::Conflict(err.to_string()),
            StorageError::Conflict { .. } => Self::Conflict(err.to_string()),
            StorageError::InvalidReference { .. } => Self::BadRequest(err.to_string()),
            StorageError::Internal { .. } => Self::Internal(err.to_string()),
        }
    }
}

impl From<brightpath_auth::AuthError> for ApiError {
    fn from(err: brightpath_auth::AuthError) -> Self {
        use brightpath_auth::AuthError;
        match err {
            AuthError::InvalidCredentials => Self::Unauthorized("Invalid credentials".into()),
            AuthError::AccountInactive => Self::Forbidden("Account is not active".into()),
            AuthError::EmailTaken { .. } => Self::Conflict(err.to_string()),
            AuthError::UsernameTaken { .. } => Self::Conflict(err.to_string()),
            AuthError::UnknownEmail { .. } => Self::NotFound(err.to_string()),
            AuthError::InvalidOtp => Self::BadRequest(err.to_string()),
            AuthError::InvalidToken { .. } => Self::Unauthorized("Invalid token".into()),
            AuthError::InvalidRequest { message } => Self::BadRequest(message),
            AuthError::Provider { .. } => Self::BadGateway("Identity provider unavailable".into()),
            AuthError::EmailDelivery { .. } => Self::BadGateway("Email delivery failed".into()),
            AuthError::Hashing { .. } => Self::Internal(err.to_string()),
            AuthError::Storage(storage) => ApiError::from(storage),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = serde_json::to_vec(&self.to_body()).unwrap_or_else(|_| b"{}".to_vec());

        axum::http::Response::builder()
            .status(status)
            .header(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            )
            .body(axum::body::Body::from(body))
            .unwrap_or_else(|_| {
                axum::http::Response::builder()
                    .status(StatusCode::INTERNAL_SERVER_ERROR)
                    .body(axum::body::Body::from("{}"))
                    .expect("build fallback response")
            })
    }
}

// -------------------------
// Pagination
// -------------------------

/// Query parameters accepted by every list endpoint.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageParams {
    #[serde(default)]
    pub offset: Option<usize>,
    #[serde(default)]
    pub count: Option<usize>,
}

impl PageParams {
    pub const DEFAULT_COUNT: usize = 50;
    pub const MAX_COUNT: usize = 200;

    pub fn offset(&self) -> usize {
        self.offset.unwrap_or(0)
    }

    pub fn count(&self) -> usize {
        self.count
            .unwrap_or(Self::DEFAULT_COUNT)
            .min(Self::MAX_COUNT)
    }
}

/// A page of results with the total row count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub total: usize,
    pub offset: usize,
    pub items: Vec<T>,
}

impl<T> Page<T> {
    /// Slice `items` according to `params`, recording the full length as
    /// `total`.
    pub fn from_vec(items: Vec<T>, params: &PageParams) -> Self {
        let total = items.len();
        let offset = params.offset();
        let items = items
            .into_iter()
            .skip(offset)
            .take(params.count())
            .collect();
        Self {
            total,
            offset,
            items,
        }
    }
}
