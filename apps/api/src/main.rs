mod config;
mod db;
mod embedding;
mod errors;
mod extract;
mod matching;
mod models;
mod routes;
mod state;

use std::net::SocketAddr;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::{count_jobs, create_pool, ensure_schema, seed_sample_jobs};
use crate::embedding::SemanticModel;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting JobScope API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize SQLite and the job corpus
    let db = create_pool(&config.database_url).await?;
    ensure_schema(&db).await?;
    if config.seed_sample_jobs && count_jobs(&db).await? == 0 {
        let seeded = seed_sample_jobs(&db).await?;
        info!("Seeded {seeded} sample job postings");
    }
    info!("Job corpus holds {} postings", count_jobs(&db).await?);

    // Initialize the semantic capability. Its absence is a supported
    // degraded mode: matching then runs on the lexical signal alone.
    let semantic = SemanticModel::from_config(&config);
    if semantic.is_available() {
        info!(
            "Semantic encoder configured at {}",
            config.embedding_url.as_deref().unwrap_or_default()
        );
    } else {
        warn!("EMBEDDING_URL not set; semantic scoring disabled, ranking is lexical-only");
    }

    // Build app state
    let state = AppState {
        db,
        config: config.clone(),
        semantic,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
