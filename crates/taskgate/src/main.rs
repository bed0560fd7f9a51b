//! Taskgate - per-user task API with password login and bearer tokens

use anyhow::Result;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod config;

use config::{Config, LoggingConfig, Overrides};
use taskgate_api::{AppState, BookCatalog, create_router};
use taskgate_auth::TokenIssuer;
use taskgate_db::Database;

/// Taskgate - per-user task API with password login and bearer tokens
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    /// Bind address
    #[arg(long, env = "TASKGATE_BIND")]
    bind: Option<String>,

    /// Port
    #[arg(short, long, env = "TASKGATE_PORT")]
    port: Option<u16>,

    /// Database connection string
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Token signing secret
    #[arg(long, env = "SECRET_KEY", hide_env_values = true)]
    secret_key: Option<String>,

    /// Access token lifetime in minutes
    #[arg(long, env = "ACCESS_TOKEN_EXPIRE_MINUTES")]
    access_token_expire_minutes: Option<i64>,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            bind: self.bind.clone(),
            port: self.port,
            database_url: self.database_url.clone(),
            secret_key: self.secret_key.clone(),
            access_token_expire_minutes: self.access_token_expire_minutes,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = Config::load(&args.config)?.apply(args.overrides());

    init_logging(&config.logging);

    info!("Starting Taskgate v{}", env!("CARGO_PKG_VERSION"));
    config.validate()?;

    // Initialize database
    ensure_database_dir(&config.database.url).await?;
    let db = Database::new(&config.database.url).await?;

    // Initialize token issuer
    let tokens = Arc::new(TokenIssuer::new(&config.auth_settings()));

    // Create application state
    let state = AppState::new(db, tokens, Arc::new(BookCatalog::seeded()))?;

    // Prometheus recorder; the server still runs without one
    let metrics_handle = match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => Some(Arc::new(handle)),
        Err(e) => {
            warn!("Failed to install metrics recorder: {}", e);
            None
        }
    };

    // Create router
    let app = create_router(state, metrics_handle).layer(TraceLayer::new_for_http());

    let addr: SocketAddr =
        format!("{}:{}", config.server.bind_address, config.server.port).parse()?;

    info!("Listening on {}", addr);
    info!(
        "Access tokens expire after {} minutes",
        config.auth.access_token_expire_minutes
    );

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Create the parent directory of a file-backed SQLite database
async fn ensure_database_dir(url: &str) -> Result<()> {
    let Some(rest) = url.strip_prefix("sqlite:") else {
        return Ok(());
    };
    let path = rest.trim_start_matches("//");
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() || path.starts_with(":memory:") {
        return Ok(());
    }

    if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    Ok(())
}

/// Initialize logging
fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format == "json" {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
