//! Health check endpoint.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::postgres::PoolStats;
use crate::server::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    /// "connected", or the error that made the check fail
    pub database: String,
    pub version: String,
    pub uptime_seconds: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pool: Option<PoolStats>,
}

/// GET /health - Runs `SELECT 1` through the pool
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let check = state.db.query("SELECT 1 AS value", &[]).await;
    let pool = state.db.pool().stats().await;

    let (status, label, database) = match check {
        Ok(_) => (StatusCode::OK, "healthy", "connected".to_string()),
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "unhealthy", e.to_string())
        }
    };

    (
        status,
        Json(HealthResponse {
            status: label.to_string(),
            database,
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: state.start_time.elapsed().as_secs(),
            pool,
        }),
    )
}
