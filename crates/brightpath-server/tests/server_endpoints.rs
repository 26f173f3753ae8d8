mod common;

use serde_json::Value;

#[tokio::test]
async fn server_endpoints_work() {
    let server = common::start_server().await;
    let client = reqwest::Client::new();

    // GET /
    let resp = client
        .get(format!("{}/", server.base))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["name"], "brightpath-server");
    assert_eq!(body["status"], "ok");

    // GET /healthz
    let resp = client
        .get(format!("{}/healthz", server.base))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");

    // GET /readyz
    let resp = client
        .get(format!("{}/readyz", server.base))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ready");

    // x-request-id is mirrored on the response
    let resp = client
        .get(format!("{}/healthz", server.base))
        .header("x-request-id", "test-req-1")
        .send()
        .await
        .unwrap();
    assert_eq!(
        resp.headers().get("x-request-id").unwrap().to_str().unwrap(),
        "test-req-1"
    );

    server.stop().await;
}

#[tokio::test]
async fn protected_routes_reject_anonymous_requests() {
    let server = common::start_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/appointment/appointments", server.base))
        .json(&serde_json::json!({ "slot_id": uuid::Uuid::new_v4() }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 401);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "unauthorized");

    server.stop().await;
}
