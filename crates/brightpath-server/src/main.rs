use std::env;

use brightpath_server::ServerBuilder;
use brightpath_server::config::loader::load_config;
use brightpath_server::seed::seed_scenarios;
use brightpath_server::state::AppState;

/// How the configuration path was determined.
#[derive(Debug, Clone, Copy)]
enum ConfigSource {
    /// From --config CLI argument
    CliArgument,
    /// From BRIGHTPATH_CONFIG environment variable
    EnvironmentVariable,
    /// Default path (brightpath.toml)
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CliArgument => write!(f, "CLI argument (--config)"),
            Self::EnvironmentVariable => write!(f, "environment variable (BRIGHTPATH_CONFIG)"),
            Self::Default => write!(f, "default"),
        }
    }
}

#[tokio::main]
async fn main() {
    // Load .env file if present (before anything else)
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if .env doesn't exist, it's optional
        if !matches!(e, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
        {
            eprintln!("Warning: Failed to load .env file: {e}");
        }
    }

    // Initialize tracing early with the default level
    brightpath_server::observability::init_tracing();

    // Parse config path from CLI, environment, or use default
    let (config_path, source) = resolve_config_path();

    let cfg = match load_config(Some(&config_path)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(2);
        }
    };

    tracing::info!(
        path = %config_path,
        source = %source,
        "Configuration loaded"
    );

    brightpath_server::observability::apply_logging_level(&cfg.logging.level);

    let state = match AppState::from_config(&cfg) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("State initialization failed: {e}");
            std::process::exit(2);
        }
    };

    // Screening scenarios ship with the server and are loaded on boot
    if let Err(e) = seed_scenarios(state.store.as_ref()).await {
        eprintln!("Scenario seeding failed: {e}");
        std::process::exit(2);
    }

    let server = ServerBuilder::new(cfg, state).build();

    if let Err(err) = server.run().await {
        eprintln!("Server error: {err}");
    }
}

/// Resolve the configuration file path.
///
/// Priority order:
/// 1. CLI argument: --config <path>
/// 2. Environment variable: BRIGHTPATH_CONFIG
/// 3. Default: brightpath.toml
fn resolve_config_path() -> (String, ConfigSource) {
    // 1. Check CLI: --config <path>
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            if let Some(path) = args.next() {
                return (path, ConfigSource::CliArgument);
            }
        }
    }

    // 2. Check environment variable
    if let Ok(path) = env::var("BRIGHTPATH_CONFIG") {
        if !path.is_empty() {
            return (path, ConfigSource::EnvironmentVariable);
        }
    }

    // 3. Default to brightpath.toml
    ("brightpath.toml".to_string(), ConfigSource::Default)
}
