//! API layer - HTTP endpoint handlers.

mod entries;
mod health;
mod metrics;
mod routes;

// Re-export all handlers for use in server/app.rs
pub use entries::{create_entry, delete_entry, get_entry, list_entries, update_entry};
pub use health::health;
pub use metrics::prometheus_metrics;
pub use routes::api_routes;
