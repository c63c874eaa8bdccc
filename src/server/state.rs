use std::sync::Arc;
use std::time::Instant;

use crate::config::Settings;
use crate::entries::EntryRepository;
use crate::postgres::{PoolManager, QueryExecutor};

/// Shared handles for request handlers.
///
/// This is the composition root: the pool manager is created here once and
/// passed to the executor and repository by `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub db: Arc<QueryExecutor>,
    pub entries: EntryRepository,
    pub start_time: Instant,
}

impl AppState {
    /// Build the state. No database connection is opened until first use.
    pub fn new(settings: Settings) -> Self {
        let pool = Arc::new(PoolManager::new(settings.database.clone()));
        let db = Arc::new(QueryExecutor::new(pool));
        let entries = EntryRepository::new(db.clone());

        Self {
            settings: Arc::new(settings),
            db,
            entries,
            start_time: Instant::now(),
        }
    }
}
