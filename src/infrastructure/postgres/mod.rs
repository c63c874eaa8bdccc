//! PostgreSQL persistence module.
//!
//! - `pool`: lazily created, bounded connection pool with explicit shutdown
//! - `executor`: startup connectivity retry and acquire/execute/release queries
//! - `row`: bind parameters and decoded result rows

mod backoff;
mod error;
pub mod executor;
pub mod pool;
pub mod row;
pub mod schema;

pub use backoff::{BackoffConfig, ExponentialBackoff};
pub use error::DatabaseError;
pub use executor::QueryExecutor;
pub use pool::{PoolManager, PoolStats, PooledConnection};
pub use row::{QueryResult, Row, SqlValue};
