use std::sync::Arc;

use brightpath_auth::{
    AuthService, HttpGoogleVerifier, LogEmailSender, SmtpEmailSender, TokenService,
};
use brightpath_db_memory::MemoryStore;
use brightpath_storage::DataStore;
use tracing::info;

use crate::analysis::{AnalysisClient, GeminiClient};
use crate::config::AppConfig;

/// Shared server state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DataStore>,
    pub auth: Arc<AuthService>,
    pub analysis: Arc<dyn AnalysisClient>,
    pub media_dir: String,
}

impl AppState {
    /// Wires up the default stack from configuration: in-memory store,
    /// SMTP or logging mailer, Google verifier and Gemini analysis client.
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let store: Arc<dyn DataStore> = Arc::new(MemoryStore::new());
        let analysis: Arc<dyn AnalysisClient> = Arc::new(GeminiClient::new(&config.analysis));
        Self::with_parts(config, store, analysis)
    }

    /// Builds state around externally supplied store and analysis client.
    /// Tests use this to substitute mock providers.
    pub fn with_parts(
        config: &AppConfig,
        store: Arc<dyn DataStore>,
        analysis: Arc<dyn AnalysisClient>,
    ) -> anyhow::Result<Self> {
        let tokens = TokenService::new(
            &config.auth.jwt_secret,
            config.auth.access_ttl(),
            config.auth.refresh_ttl(),
            config.auth.reset_ttl(),
        );

        let email: Arc<dyn brightpath_auth::EmailSender> = match &config.auth.smtp {
            Some(smtp) => Arc::new(SmtpEmailSender::new(
                &smtp.host,
                &smtp.username,
                &smtp.password,
                &smtp.from,
            )?),
            None => {
                info!("smtp not configured, emails will be logged");
                Arc::new(LogEmailSender)
            }
        };

        let google = Arc::new(HttpGoogleVerifier::new(
            config.auth.google_userinfo_url.clone(),
        ));

        let auth = Arc::new(AuthService::new(
            store.clone(),
            tokens,
            email,
            google,
            config.auth.reset_url_base.clone(),
        ));

        Ok(Self {
            store,
            auth,
            analysis,
            media_dir: config.media.dir.clone(),
        })
    }
}
