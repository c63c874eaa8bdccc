use std::time::Duration;

use thiserror::Error;

/// Errors produced by the database access layer.
///
/// Storage failures are carried verbatim in [`DatabaseError::Statement`];
/// callers decide how to present them.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Startup connectivity check failed on every attempt
    #[error("Failed to connect after {attempts} attempts: {source}")]
    ConnectionEstablishment {
        attempts: u32,
        #[source]
        source: Box<DatabaseError>,
    },

    /// No connection became free within the acquisition timeout
    #[error("No database connection available within {timeout:?}")]
    PoolExhausted { timeout: Duration },

    #[error("Connection pool is closed")]
    PoolClosed,

    /// Opening a new physical connection failed
    #[error("Connection error: {0}")]
    Connection(#[source] sqlx::Error),

    #[error("Statement failed: {0}")]
    Statement(#[source] sqlx::Error),

    #[error("Failed to initialize database schema: {0}")]
    SchemaInitialization(#[source] Box<DatabaseError>),

    #[error("Invalid database configuration: {0}")]
    Configuration(String),

    #[error("Unsupported type {type_name} for column {column}")]
    UnsupportedColumn { column: String, type_name: String },

    #[error("Row mapping failed: {0}")]
    RowMapping(#[from] serde_json::Error),
}

impl DatabaseError {
    /// Map a pool acquisition failure.
    pub(crate) fn from_acquire(err: sqlx::Error, timeout: Duration) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => DatabaseError::PoolExhausted { timeout },
            sqlx::Error::PoolClosed => DatabaseError::PoolClosed,
            other => DatabaseError::Connection(other),
        }
    }

    /// SQLSTATE code reported by the server, if any.
    pub fn sqlstate(&self) -> Option<String> {
        match self {
            DatabaseError::Statement(sqlx::Error::Database(db)) => {
                db.code().map(|code| code.into_owned())
            }
            DatabaseError::SchemaInitialization(inner) => inner.sqlstate(),
            _ => None,
        }
    }

    /// Integrity constraint violation (SQLSTATE class 23).
    pub fn is_constraint_violation(&self) -> bool {
        self.sqlstate().is_some_and(|code| code.starts_with("23"))
    }
}
