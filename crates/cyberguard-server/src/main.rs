//! The entry point for the CyberGuard cyber safety dashboard.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use cyberguard_core::{Database, GuardConfig, HoneypotLog, IncidentLog};
use cyberguard_gateway::GeminiGateway;
use cyberguard_server::api::{self, AppState};

#[derive(Parser, Debug)]
#[command(name = "cyberguard", about = "Cyber safety dashboard server", version)]
struct Cli {
    /// Address to bind the dashboard and API to
    #[arg(long, env = "CYBERGUARD_BIND")]
    bind: Option<String>,

    /// SQLite database file path
    #[arg(long, env = "CYBERGUARD_DB")]
    db: Option<PathBuf>,

    /// Config file path (defaults to the platform config directory)
    #[arg(long, env = "CYBERGUARD_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Default to info; RUST_LOG overrides
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    let config_path = cli.config.unwrap_or_else(GuardConfig::default_path);
    let mut config = GuardConfig::load(&config_path)?;
    if let Some(bind) = cli.bind {
        config.server.bind_addr = bind;
    }
    if let Some(db) = cli.db {
        config.database.path = db;
    }

    let db = Database::open(&config.database.path)?;
    info!(path = %config.database.path.display(), "Store opened");

    let api_key = config.gateway.api_key().unwrap_or_else(|| {
        warn!(
            env = %config.gateway.api_key_env,
            "Gateway API key not set; analyses will fail until it is provided"
        );
        String::new()
    });
    let gateway = GeminiGateway::new(api_key)
        .with_base_url(config.gateway.base_url.clone())
        .with_model(config.gateway.model.clone())
        .with_timeout(Duration::from_secs(config.gateway.timeout_secs));

    let incidents = IncidentLog::new(db.clone()).with_retention(config.retention.clone());
    let honeypot = HoneypotLog::new(db.clone()).with_retention(config.retention.clone());
    let state = AppState::new(db, Arc::new(gateway)).with_logs(incidents, honeypot);

    let app = api::router(state);
    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr).await?;
    info!(addr = %config.server.bind_addr, "CyberGuard dashboard started");

    axum::serve(listener, app).await?;

    Ok(())
}
