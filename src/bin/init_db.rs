//! One-shot schema bootstrap: connect, create the `entries` table, exit.

use std::sync::Arc;

use anyhow::Result;

use entries_service::config::{OtelConfig, Settings};
use entries_service::postgres::{PoolManager, QueryExecutor};
use entries_service::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> Result<()> {
    let (settings, _telemetry) = match Settings::new() {
        Ok(settings) => {
            let telemetry = init_telemetry(&settings.otel)?;
            (settings, telemetry)
        }
        Err(e) => {
            let _telemetry = init_telemetry(&OtelConfig::default())?;
            tracing::error!(error = %e, "Failed to load configuration");
            return Err(e.into());
        }
    };

    let executor = QueryExecutor::new(Arc::new(PoolManager::new(settings.database)));

    let outcome = async {
        executor.connect_with_retry().await?;
        executor.init_schema().await
    }
    .await;

    executor.close().await;

    match outcome {
        Ok(()) => {
            tracing::info!("Database initialized successfully");
            Ok(())
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to initialize database");
            Err(e.into())
        }
    }
}
