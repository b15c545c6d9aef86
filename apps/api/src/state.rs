use sqlx::SqlitePool;

use crate::config::Config;
use crate::embedding::SemanticModel;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Config,
    /// Process-lifetime semantic capability, loaded once at startup.
    /// `Unavailable` keeps the service in lexical-only mode.
    pub semantic: SemanticModel,
}
