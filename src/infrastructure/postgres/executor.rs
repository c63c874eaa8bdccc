//! Query execution over the pooled connections.
//!
//! Every call leases its own connection and gives it back before returning,
//! whatever the outcome. The only local recovery is the startup
//! connectivity check, which retries with exponential backoff.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::TryStreamExt;
use sqlx::postgres::PgConnection;
use sqlx::{Either, Executor};

use crate::config::RetryConfig;
use crate::metrics::{ConnectMetrics, QueryMetrics};

use super::backoff::{BackoffConfig, ExponentialBackoff};
use super::row::{QueryResult, Row, SqlValue};
use super::schema::CREATE_ENTRIES_TABLE;
use super::{DatabaseError, PoolManager};

/// Runs statements through a shared [`PoolManager`].
#[derive(Clone)]
pub struct QueryExecutor {
    pool: Arc<PoolManager>,
    retry: RetryConfig,
}

impl QueryExecutor {
    /// Executor using the retry settings from the pool's configuration.
    pub fn new(pool: Arc<PoolManager>) -> Self {
        let retry = pool.config().retry.clone();
        Self { pool, retry }
    }

    pub fn with_retry(pool: Arc<PoolManager>, retry: RetryConfig) -> Self {
        Self { pool, retry }
    }

    pub fn pool(&self) -> &Arc<PoolManager> {
        &self.pool
    }

    /// Verify connectivity using the configured attempt count and delay.
    pub async fn connect_with_retry(&self) -> Result<(), DatabaseError> {
        self.connect_with_attempts(
            self.retry.max_attempts,
            Duration::from_millis(self.retry.initial_delay_ms),
        )
        .await
    }

    /// Lease a connection and run `SELECT 1`, retrying with backoff.
    ///
    /// After failed attempt `n` the executor sleeps
    /// `initial_delay * 2^(n-1)` before trying again. The verified connection
    /// is released immediately; nothing is held open.
    #[tracing::instrument(name = "db.connect", skip(self, initial_delay))]
    pub async fn connect_with_attempts(
        &self,
        max_attempts: u32,
        initial_delay: Duration,
    ) -> Result<(), DatabaseError> {
        let max_attempts = max_attempts.max(1);
        let mut backoff = ExponentialBackoff::with_config(BackoffConfig {
            initial_delay_ms: initial_delay.as_millis() as u64,
            ..BackoffConfig::from(&self.retry)
        });
        let mut last_error = None;

        for attempt in 1..=max_attempts {
            tracing::debug!(attempt, max_attempts, "Connecting to database");

            match self.check_liveness().await {
                Ok(()) => {
                    ConnectMetrics::record_success();
                    tracing::info!(attempt, "Database connection established");
                    return Ok(());
                }
                Err(e) => {
                    ConnectMetrics::record_failure();
                    tracing::warn!(attempt, max_attempts, error = %e, "Connection attempt failed");
                    last_error = Some(e);
                }
            }

            if attempt < max_attempts {
                let delay = backoff.next_delay();
                tracing::info!(delay_ms = delay.as_millis() as u64, "Retrying database connection");
                tokio::time::sleep(delay).await;
            }
        }

        let source = last_error.unwrap_or(DatabaseError::PoolClosed);
        tracing::error!(attempts = max_attempts, error = %source, "Giving up on database connection");

        Err(DatabaseError::ConnectionEstablishment {
            attempts: max_attempts,
            source: Box::new(source),
        })
    }

    async fn check_liveness(&self) -> Result<(), DatabaseError> {
        let mut conn = self.pool.acquire().await?;
        let outcome = sqlx::query("SELECT 1")
            .execute(&mut *conn)
            .await
            .map(|_| ())
            .map_err(DatabaseError::Statement);
        self.pool.release(conn);
        outcome
    }

    /// Execute one parameterized statement on a leased connection.
    ///
    /// Storage errors are returned unmodified as [`DatabaseError::Statement`].
    pub async fn query(
        &self,
        statement: &str,
        params: &[SqlValue],
    ) -> Result<QueryResult, DatabaseError> {
        let mut conn = match self.pool.acquire().await {
            Ok(conn) => conn,
            Err(e) => {
                QueryMetrics::record_acquire_failure();
                return Err(e);
            }
        };

        let start = Instant::now();
        let outcome = run_statement(&mut conn, statement, params).await;
        let elapsed = start.elapsed();
        self.pool.release(conn);

        let duration_ms = elapsed.as_millis() as u64;
        match outcome {
            Ok(result) => {
                QueryMetrics::record_success(elapsed.as_secs_f64());
                tracing::debug!(
                    statement = %compact(statement),
                    duration_ms,
                    rows = result.row_count,
                    "Executed query"
                );
                Ok(result)
            }
            Err(e) => {
                QueryMetrics::record_error(elapsed.as_secs_f64());
                tracing::debug!(
                    statement = %compact(statement),
                    duration_ms,
                    error = %e,
                    "Query failed"
                );
                Err(e)
            }
        }
    }

    /// Create the `entries` table if it does not exist.
    pub async fn init_schema(&self) -> Result<(), DatabaseError> {
        match self.query(CREATE_ENTRIES_TABLE, &[]).await {
            Ok(_) => {
                tracing::info!("Database schema initialized successfully");
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to initialize database schema");
                Err(DatabaseError::SchemaInitialization(Box::new(e)))
            }
        }
    }

    /// Close every pooled connection.
    pub async fn close(&self) {
        self.pool.shutdown().await;
    }
}

async fn run_statement(
    conn: &mut PgConnection,
    statement: &str,
    params: &[SqlValue],
) -> Result<QueryResult, DatabaseError> {
    let query = params
        .iter()
        .fold(sqlx::query(statement), |query, param| param.bind(query));

    let mut result = QueryResult::default();
    let mut stream = conn.fetch_many(query);

    while let Some(step) = stream.try_next().await.map_err(DatabaseError::Statement)? {
        match step {
            Either::Left(done) => result.row_count += done.rows_affected(),
            Either::Right(row) => result.rows.push(Row::decode(&row)?),
        }
    }

    Ok(result)
}

/// Collapse whitespace so multi-line statements log on one line.
fn compact(statement: &str) -> String {
    statement.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;

    fn unreachable_executor(acquire_timeout_ms: u64) -> QueryExecutor {
        let mut config = DatabaseConfig::with_url("postgres://entries@127.0.0.1:1/entries");
        config.ssl_mode = "disable".to_string();
        config.acquire_timeout_ms = acquire_timeout_ms;
        QueryExecutor::new(Arc::new(PoolManager::new(config)))
    }

    #[tokio::test]
    async fn test_connect_with_retry_exhausts_attempts() {
        let executor = unreachable_executor(50);

        let start = Instant::now();
        let err = executor
            .connect_with_attempts(3, Duration::from_millis(20))
            .await
            .unwrap_err();
        let elapsed = start.elapsed();

        match err {
            DatabaseError::ConnectionEstablishment { attempts, source } => {
                assert_eq!(attempts, 3);
                assert!(!matches!(*source, DatabaseError::ConnectionEstablishment { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
        // 20ms after attempt 1, 40ms after attempt 2
        assert!(elapsed >= Duration::from_millis(60));

        executor.close().await;
    }

    #[tokio::test]
    async fn test_zero_attempts_still_tries_once() {
        let executor = unreachable_executor(50);
        let err = executor
            .connect_with_attempts(0, Duration::from_millis(1))
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::ConnectionEstablishment { attempts: 1, .. }));
        executor.close().await;
    }

    #[tokio::test]
    async fn test_query_fails_without_database() {
        let executor = unreachable_executor(50);
        let result = executor.query("SELECT 1", &[]).await;
        tokio_test::assert_err!(result);
        executor.close().await;
    }

    #[tokio::test]
    async fn test_init_schema_wraps_failure() {
        let executor = unreachable_executor(50);
        let err = executor.init_schema().await.unwrap_err();
        assert!(matches!(err, DatabaseError::SchemaInitialization(_)));
        executor.close().await;
    }

    #[tokio::test]
    async fn test_close_without_pool_is_noop() {
        let executor = unreachable_executor(50);
        executor.close().await;
        assert!(!executor.pool().is_initialized().await);
    }

    #[test]
    fn test_compact_statement() {
        let statement = "\n  SELECT id,\n    title\n  FROM entries\n";
        assert_eq!(compact(statement), "SELECT id, title FROM entries");
    }
}
