use axum::{routing::get, Router};

use crate::server::AppState;

use super::entries::{create_entry, delete_entry, get_entry, list_entries, update_entry};
use super::health::health;
use super::metrics::prometheus_metrics;

pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health & Metrics
        .route("/health", get(health))
        .route("/metrics", get(prometheus_metrics))
        // Entry endpoints
        .nest(
            "/api",
            Router::new()
                .route("/entries", get(list_entries).post(create_entry))
                .route(
                    "/entries/{id}",
                    get(get_entry).put(update_entry).delete(delete_entry),
                ),
        )
}
