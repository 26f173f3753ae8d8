//! Account endpoints under `/api/auth`.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use brightpath_api::ApiError;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/verify-otp", post(verify_otp))
        .route("/resend-otp", post(resend_otp))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/forgot-password", post(forgot_password))
        .route("/password-reset-confirm", post(password_reset_confirm))
        .route("/google-login", post(google_login))
}

fn require<'a>(value: &'a str, field: &str) -> Result<&'a str, ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::bad_request(format!("{field} is required")));
    }
    Ok(trimmed)
}

#[derive(Debug, Deserialize)]
struct RegisterRequest {
    username: String,
    email: String,
    password: String,
}

async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let username = require(&body.username, "username")?;
    let email = require(&body.email, "email")?;
    if body.password.len() < 8 {
        return Err(ApiError::bad_request(
            "password must be at least 8 characters",
        ));
    }

    let user = state.auth.register(username, email, &body.password).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Verification code sent",
            "user": user,
        })),
    ))
}

#[derive(Debug, Deserialize)]
struct VerifyOtpRequest {
    email: String,
    code: String,
}

async fn verify_otp(
    State(state): State<AppState>,
    Json(body): Json<VerifyOtpRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = require(&body.email, "email")?;
    let code = require(&body.code, "code")?;

    let outcome = state.auth.verify_otp(email, code).await?;
    Ok(Json(json!({
        "user": outcome.user,
        "access": outcome.tokens.access,
        "refresh": outcome.tokens.refresh,
    })))
}

#[derive(Debug, Deserialize)]
struct EmailRequest {
    email: String,
}

async fn resend_otp(
    State(state): State<AppState>,
    Json(body): Json<EmailRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = require(&body.email, "email")?;
    state.auth.resend_otp(email).await?;
    Ok(Json(json!({ "message": "Verification code sent" })))
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = require(&body.email, "email")?;
    let outcome = state.auth.login(email, &body.password).await?;
    Ok(Json(json!({
        "id": outcome.user.id,
        "name": outcome.user.username,
        "access": outcome.tokens.access,
        "refresh": outcome.tokens.refresh,
    })))
}

#[derive(Debug, Deserialize)]
struct RefreshRequest {
    refresh: String,
}

async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let pair = state.auth.refresh(&body.refresh).await?;
    Ok(Json(json!({
        "access": pair.access,
        "refresh": pair.refresh,
    })))
}

async fn forgot_password(
    State(state): State<AppState>,
    Json(body): Json<EmailRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = require(&body.email, "email")?;
    state.auth.forgot_password(email).await?;
    Ok(Json(json!({ "message": "Password reset link sent" })))
}

#[derive(Debug, Deserialize)]
struct ResetConfirmRequest {
    token: String,
    new_password: String,
}

async fn password_reset_confirm(
    State(state): State<AppState>,
    Json(body): Json<ResetConfirmRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if body.new_password.len() < 8 {
        return Err(ApiError::bad_request(
            "password must be at least 8 characters",
        ));
    }
    state
        .auth
        .reset_password(&body.token, &body.new_password)
        .await?;
    Ok(Json(json!({ "message": "Password updated" })))
}

#[derive(Debug, Deserialize)]
struct GoogleLoginRequest {
    access_token: String,
}

async fn google_login(
    State(state): State<AppState>,
    Json(body): Json<GoogleLoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let token = require(&body.access_token, "access_token")?;
    let outcome = state.auth.google_login(token).await?;
    Ok(Json(json!({
        "id": outcome.user.id,
        "name": outcome.user.username,
        "email": outcome.user.email,
        "access": outcome.tokens.access,
        "refresh": outcome.tokens.refresh,
    })))
}
