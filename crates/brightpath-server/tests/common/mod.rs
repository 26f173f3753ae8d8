#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::task::JoinHandle;

use brightpath_db_memory::MemoryStore;
use brightpath_server::analysis::AnalysisClient;
use brightpath_server::config::AppConfig;
use brightpath_server::{AppState, build_app};
use brightpath_storage::{DataStore, OtpStore};

/// Analysis client with a canned reply, or a canned failure.
pub struct StubAnalysis {
    reply: Result<String, String>,
}

impl StubAnalysis {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: Err("provider down".to_string()),
        }
    }
}

#[async_trait]
impl AnalysisClient for StubAnalysis {
    async fn generate(&self, _prompt: &str) -> anyhow::Result<String> {
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(msg) => Err(anyhow::anyhow!(msg.clone())),
        }
    }
}

pub struct TestServer {
    pub base: String,
    pub store: Arc<MemoryStore>,
    shutdown: tokio::sync::oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn stop(self) {
        let _ = self.shutdown.send(());
        let _ = self.handle.await;
    }
}

pub async fn start_server() -> TestServer {
    start_server_with(Arc::new(StubAnalysis::replying("All good."))).await
}

pub async fn start_server_with(analysis: Arc<dyn AnalysisClient>) -> TestServer {
    start_server_full(AppConfig::default(), analysis).await
}

pub async fn start_server_full(cfg: AppConfig, analysis: Arc<dyn AnalysisClient>) -> TestServer {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::with_parts(&cfg, store.clone() as Arc<dyn DataStore>, analysis)
        .expect("build state");
    let app = build_app(state, &cfg);

    // Bind to an ephemeral port
    let listener = tokio::net::TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0))
        .await
        .expect("bind");
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = tokio::sync::oneshot::channel::<()>();

    let handle = tokio::spawn(async move {
        let _ = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = rx.await;
            })
            .await;
    });

    TestServer {
        base: format!("http://{addr}"),
        store,
        shutdown: tx,
        handle,
    }
}

/// Registers and verifies an account, returning its id and access token.
///
/// Registration stores the OTP through the same store the server uses, so
/// the test reads the code back instead of scraping log output.
pub async fn register_verified(
    server: &TestServer,
    client: &reqwest::Client,
    username: &str,
    email: &str,
    password: &str,
) -> (uuid::Uuid, String) {
    let resp = client
        .post(format!("{}/api/auth/register", server.base))
        .json(&json!({
            "username": username,
            "email": email,
            "password": password,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 201, "register failed");

    let otp = server
        .store
        .get_otp(email)
        .await
        .unwrap()
        .expect("otp issued on registration");

    let resp = client
        .post(format!("{}/api/auth/verify-otp", server.base))
        .json(&json!({ "email": email, "code": otp.code }))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success(), "verify-otp failed");
    let body: Value = resp.json().await.unwrap();
    let id: uuid::Uuid = body["user"]["id"].as_str().unwrap().parse().unwrap();
    let access = body["access"].as_str().unwrap().to_string();
    (id, access)
}
