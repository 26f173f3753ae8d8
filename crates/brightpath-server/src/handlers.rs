//! Health and meta endpoints.

use axum::Json;
use serde_json::json;

pub async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "name": "brightpath-server",
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn healthz() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn readyz() -> Json<serde_json::Value> {
    Json(json!({ "status": "ready" }))
}
