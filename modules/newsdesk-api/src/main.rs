use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use newsdesk_api::auth::JwtService;
use newsdesk_api::db::{PgSessionStore, PgTranscriptStore};
use newsdesk_api::{deps, routes, AppState};
use newsdesk_common::{file_config::load_config, AppConfig};

#[derive(Parser)]
#[command(name = "newsdesk-api", about = "Nepali news question answering API")]
struct Cli {
    /// Path to config TOML file
    #[arg(long, default_value = "./config/newsdesk.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    let cli = Cli::parse();

    let config_path = cli.config.canonicalize().with_context(|| {
        format!(
            "Config file not found: {}. Create one or specify --config <path>",
            cli.config.display()
        )
    })?;
    info!(config = %config_path.display(), "Loading config");
    let file_config = load_config(&config_path)?;

    let config = AppConfig::from_env()?;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to Postgres")?;
    info!("Connected to database");

    sqlx::migrate!("../../migrations").run(&pool).await?;
    info!("Migrations complete");

    let transcripts = Arc::new(PgTranscriptStore::new(pool.clone()));
    let pipeline = deps::build_pipeline(&config, &file_config, transcripts.clone())?;

    let state = Arc::new(AppState {
        jwt: JwtService::new(&config.jwt_secret, config.jwt_issuer.clone()),
        sessions: Arc::new(PgSessionStore::new(pool)),
        transcripts,
        pipeline: Arc::new(pipeline),
    });

    let app = routes::build_router(state, &file_config.server.allowed_origins);

    let addr = format!("{}:{}", file_config.server.host, file_config.server.port);
    info!("Newsdesk API starting on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
