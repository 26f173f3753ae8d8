//! Request extractors.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use brightpath_api::ApiError;
use brightpath_core::model::User;

use crate::state::AppState;

/// The authenticated user, extracted from a bearer access token.
///
/// Handlers that take `AuthUser` reject requests without a valid token
/// with 401 before the handler body runs.
pub struct AuthUser(pub User);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Missing Authorization header"))?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::unauthorized("Expected a bearer token"))?;

        let user = state.auth.authenticate(token).await?;
        Ok(AuthUser(user))
    }
}
