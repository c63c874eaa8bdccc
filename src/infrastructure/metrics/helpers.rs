//! Metrics helper structs for convenient metric recording

use prometheus::{Encoder, TextEncoder};

use super::{
    DB_CONNECTIONS_OPENED_TOTAL, DB_CONNECT_ATTEMPTS_TOTAL, DB_IDLE_ERRORS_TOTAL,
    DB_POOL_CONNECTIONS, DB_POOL_IDLE_CONNECTIONS, DB_QUERIES_TOTAL, DB_QUERY_DURATION,
};

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}

/// Helper struct for recording statement metrics
pub struct QueryMetrics;

impl QueryMetrics {
    pub fn record_success(duration_secs: f64) {
        DB_QUERIES_TOTAL.with_label_values(&["success"]).inc();
        DB_QUERY_DURATION.observe(duration_secs);
    }

    pub fn record_error(duration_secs: f64) {
        DB_QUERIES_TOTAL.with_label_values(&["error"]).inc();
        DB_QUERY_DURATION.observe(duration_secs);
    }

    /// Statement never ran because no connection could be acquired
    pub fn record_acquire_failure() {
        DB_QUERIES_TOTAL.with_label_values(&["acquire_failed"]).inc();
    }
}

/// Helper struct for recording startup connectivity metrics
pub struct ConnectMetrics;

impl ConnectMetrics {
    pub fn record_success() {
        DB_CONNECT_ATTEMPTS_TOTAL.with_label_values(&["success"]).inc();
    }

    pub fn record_failure() {
        DB_CONNECT_ATTEMPTS_TOTAL.with_label_values(&["failure"]).inc();
    }
}

/// Helper struct for pool lifecycle metrics
pub struct PoolMetrics;

impl PoolMetrics {
    pub fn record_connection_opened() {
        DB_CONNECTIONS_OPENED_TOTAL.inc();
    }

    pub fn record_idle_error() {
        DB_IDLE_ERRORS_TOTAL.inc();
    }

    pub fn set_occupancy(size: u32, idle: usize) {
        DB_POOL_CONNECTIONS.set(size as i64);
        DB_POOL_IDLE_CONNECTIONS.set(idle as i64);
    }
}
