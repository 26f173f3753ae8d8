mod common;

use std::sync::Arc;

use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use brightpath_server::config::AppConfig;
use brightpath_storage::OtpStore;
use common::StubAnalysis;

#[tokio::test]
async fn register_verify_and_login() {
    let server = common::start_server().await;
    let client = reqwest::Client::new();

    let (id, access) =
        common::register_verified(&server, &client, "jane", "jane@example.com", "s3cret-pass")
            .await;
    assert!(!access.is_empty());

    // Password login after verification
    let resp = client
        .post(format!("{}/api/auth/login", server.base))
        .json(&json!({ "email": "jane@example.com", "password": "s3cret-pass" }))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["id"].as_str().unwrap(), id.to_string());
    assert_eq!(body["name"], "jane");
    assert!(body["access"].as_str().is_some());
    assert!(body["refresh"].as_str().is_some());

    // Refresh rotates the pair
    let refresh = body["refresh"].as_str().unwrap();
    let resp = client
        .post(format!("{}/api/auth/refresh", server.base))
        .json(&json!({ "refresh": refresh }))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());
    let body: Value = resp.json().await.unwrap();
    assert!(body["access"].as_str().is_some());

    server.stop().await;
}

#[tokio::test]
async fn duplicate_email_is_conflict() {
    let server = common::start_server().await;
    let client = reqwest::Client::new();

    let payload = json!({
        "username": "jane",
        "email": "jane@example.com",
        "password": "s3cret-pass",
    });
    let resp = client
        .post(format!("{}/api/auth/register", server.base))
        .json(&payload)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 201);

    // Same address, different case
    let resp = client
        .post(format!("{}/api/auth/register", server.base))
        .json(&json!({
            "username": "jane2",
            "email": "Jane@Example.com",
            "password": "s3cret-pass",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 409);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "conflict");

    server.stop().await;
}

#[tokio::test]
async fn duplicate_username_is_conflict() {
    let server = common::start_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/api/auth/register", server.base))
        .json(&json!({
            "username": "jane",
            "email": "jane@example.com",
            "password": "s3cret-pass",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 201);

    // Same name, fresh address
    let resp = client
        .post(format!("{}/api/auth/register", server.base))
        .json(&json!({
            "username": "jane",
            "email": "other@example.com",
            "password": "s3cret-pass",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 409);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "conflict");

    server.stop().await;
}

#[tokio::test]
async fn login_before_verification_is_forbidden() {
    let server = common::start_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/api/auth/register", server.base))
        .json(&json!({
            "username": "sam",
            "email": "sam@example.com",
            "password": "s3cret-pass",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 201);

    let resp = client
        .post(format!("{}/api/auth/login", server.base))
        .json(&json!({ "email": "sam@example.com", "password": "s3cret-pass" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);

    // Wrong password stays 401 even for inactive accounts
    let resp = client
        .post(format!("{}/api/auth/login", server.base))
        .json(&json!({ "email": "sam@example.com", "password": "wrong-pass" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 401);

    server.stop().await;
}

#[tokio::test]
async fn wrong_otp_is_rejected_and_resend_issues_a_new_code() {
    let server = common::start_server().await;
    let client = reqwest::Client::new();

    client
        .post(format!("{}/api/auth/register", server.base))
        .json(&json!({
            "username": "kim",
            "email": "kim@example.com",
            "password": "s3cret-pass",
        }))
        .send()
        .await
        .unwrap();

    let resp = client
        .post(format!("{}/api/auth/verify-otp", server.base))
        .json(&json!({ "email": "kim@example.com", "code": "000000" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);

    let first = server.store.get_otp("kim@example.com").await.unwrap().unwrap();
    let resp = client
        .post(format!("{}/api/auth/resend-otp", server.base))
        .json(&json!({ "email": "kim@example.com" }))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());
    let second = server.store.get_otp("kim@example.com").await.unwrap().unwrap();
    assert_ne!(first.id, second.id);

    // Resend for an unknown address is 404
    let resp = client
        .post(format!("{}/api/auth/resend-otp", server.base))
        .json(&json!({ "email": "nobody@example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 404);

    server.stop().await;
}

#[tokio::test]
async fn forgot_password_requires_known_email() {
    let server = common::start_server().await;
    let client = reqwest::Client::new();

    common::register_verified(&server, &client, "lee", "lee@example.com", "s3cret-pass").await;

    let resp = client
        .post(format!("{}/api/auth/forgot-password", server.base))
        .json(&json!({ "email": "lee@example.com" }))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());

    let resp = client
        .post(format!("{}/api/auth/forgot-password", server.base))
        .json(&json!({ "email": "stranger@example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 404);

    server.stop().await;
}

#[tokio::test]
async fn google_login_creates_an_active_account() {
    let mock = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/userinfo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sub": "google-sub-1",
            "email": "gina@example.com",
            "name": "Gina",
        })))
        .mount(&mock)
        .await;

    let mut cfg = AppConfig::default();
    cfg.auth.google_userinfo_url = format!("{}/userinfo", mock.uri());
    let server =
        common::start_server_full(cfg, Arc::new(StubAnalysis::replying("ok"))).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/api/auth/google-login", server.base))
        .json(&json!({ "access_token": "provider-token" }))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["name"], "Gina");
    assert_eq!(body["email"], "gina@example.com");
    assert!(body["access"].as_str().is_some());

    // The minted token works against protected routes
    let access = body["access"].as_str().unwrap();
    let resp = client
        .get(format!("{}/appointment/appointments", server.base))
        .bearer_auth(access)
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());

    server.stop().await;
}

#[tokio::test]
async fn google_login_with_bad_token_is_unauthorized() {
    let mock = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/userinfo"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock)
        .await;

    let mut cfg = AppConfig::default();
    cfg.auth.google_userinfo_url = format!("{}/userinfo", mock.uri());
    let server =
        common::start_server_full(cfg, Arc::new(StubAnalysis::replying("ok"))).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/api/auth/google-login", server.base))
        .json(&json!({ "access_token": "bad-token" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 401);

    server.stop().await;
}
