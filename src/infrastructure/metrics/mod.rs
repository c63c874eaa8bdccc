//! Prometheus metrics for the entries service.
//!
//! Covers the database access layer:
//! - Query counts and latency
//! - Startup connectivity attempts
//! - Pool connection lifecycle and occupancy

mod helpers;

pub use helpers::{encode_metrics, ConnectMetrics, PoolMetrics, QueryMetrics};

use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, register_int_gauge,
    Histogram, IntCounter, IntCounterVec, IntGauge,
};

/// Prefix for all metrics
const METRIC_PREFIX: &str = "entries";

lazy_static! {
    // ============================================================================
    // Query Metrics
    // ============================================================================

    /// Total statements executed by outcome
    pub static ref DB_QUERIES_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_db_queries_total", METRIC_PREFIX),
        "Total statements executed against the database",
        &["outcome"]
    ).unwrap();

    /// Statement execution latency, excluding pool acquisition
    pub static ref DB_QUERY_DURATION: Histogram = register_histogram!(
        format!("{}_db_query_duration_seconds", METRIC_PREFIX),
        "Statement execution latency in seconds",
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]
    ).unwrap();

    // ============================================================================
    // Connectivity Metrics
    // ============================================================================

    /// Startup connectivity attempts by outcome
    pub static ref DB_CONNECT_ATTEMPTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_db_connect_attempts_total", METRIC_PREFIX),
        "Startup connectivity check attempts",
        &["outcome"]
    ).unwrap();

    /// Physical connections opened by the pool
    pub static ref DB_CONNECTIONS_OPENED_TOTAL: IntCounter = register_int_counter!(
        format!("{}_db_connections_opened_total", METRIC_PREFIX),
        "Physical database connections opened by the pool"
    ).unwrap();

    /// Idle connections discarded after failing a liveness ping
    pub static ref DB_IDLE_ERRORS_TOTAL: IntCounter = register_int_counter!(
        format!("{}_db_idle_errors_total", METRIC_PREFIX),
        "Idle pooled connections that failed a liveness ping"
    ).unwrap();

    // ============================================================================
    // Pool Occupancy
    // ============================================================================

    pub static ref DB_POOL_CONNECTIONS: IntGauge = register_int_gauge!(
        format!("{}_db_pool_connections", METRIC_PREFIX),
        "Open connections held by the pool"
    ).unwrap();

    pub static ref DB_POOL_IDLE_CONNECTIONS: IntGauge = register_int_gauge!(
        format!("{}_db_pool_idle_connections", METRIC_PREFIX),
        "Idle connections held by the pool"
    ).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_register_and_encode() {
        QueryMetrics::record_success(0.002);
        ConnectMetrics::record_failure();
        PoolMetrics::record_connection_opened();

        let output = encode_metrics().unwrap();
        assert!(output.contains("entries_db_queries_total"));
        assert!(output.contains("entries_db_connect_attempts_total"));
        assert!(output.contains("entries_db_connections_opened_total"));
    }
}
