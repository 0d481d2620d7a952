use sqlx::PgPool;

use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
/// Constructed once in `main` so tests can build one against any pool and secret.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
}
