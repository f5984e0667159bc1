//! User accounts HTTP server.
//!
//! Loads configuration, connects to PostgreSQL, applies migrations and serves
//! the API until interrupted.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Error};
use pico_args::Arguments;
use tracing::info;
use ua_server::{
    api::{self, AppState},
    config::ServerConfig,
    logging, metrics,
};
use user_accounts::Database;

const HELP: &str = "\
Run the user accounts server

USAGE:
  ua_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:8000]
  --db-url     URL         Database connection string  [default: env DATABASE_URL or postgres://postgres@localhost/user_accounts]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND                   Server bind address (e.g., 0.0.0.0:8000)
  DATABASE_URL                  PostgreSQL connection string
  JWT_SECRET                    JWT signing secret, at least 32 characters (required)
  JWT_ALGORITHM                 HS256 (default), HS384 or HS512
  ACCESS_TOKEN_EXPIRE_MINUTES   Access token lifetime [default: 180]
  REFRESH_TOKEN_EXPIRE_DAYS     Refresh token lifetime [default: 60]
  PASSWORD_PEPPER               Optional password pepper, at least 16 characters
  CORS_ORIGINS                  Comma-separated allowed origins, * for any
  METRICS_BIND                  Prometheus exporter address (disabled if unset)
  (See .env.example for all configuration options)
";

struct Args {
    bind: Option<SocketAddr>,
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        return Ok(());
    }

    let args = Args {
        bind: pargs.opt_value_from_str("--bind")?,
        database_url: pargs.opt_value_from_str("--db-url")?,
    };

    logging::init();

    let config = ServerConfig::from_env(args.bind, args.database_url)?;
    config.validate()?;
    info!("Starting user accounts server at {}", config.bind);

    if let Some(metrics_bind) = config.metrics_bind {
        metrics::init_metrics(metrics_bind).map_err(Error::msg)?;
        info!("Prometheus metrics exported on {}", metrics_bind);
    }

    let db = Database::new(&config.database)
        .await
        .context("Failed to connect to database")?;
    db.migrate().await.context("Failed to apply migrations")?;
    info!("Database connected and migrated");

    let state = AppState::new(Arc::new(db.users()), &config.auth)?;
    let app = api::create_router(state, &config.cors);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutting down server...");
    db.close().await;

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
