use anyhow::Result;
use tokio::net::TcpListener;

use entries_service::config::{OtelConfig, Settings};
use entries_service::server::{create_app, AppState};
use entries_service::shutdown::wait_for_signal;
use entries_service::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration; on failure fall back to console logging so the error is traced
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
    tracing::info!("Configuration loaded");

    // Create application state (the pool is built lazily)
    let state = AppState::new(settings.clone());
    let db = state.db.clone();

    // Connect with retries, then make sure the table exists
    let startup = async {
        db.connect_with_retry().await?;
        db.init_schema().await
    };
    if let Err(e) = startup.await {
        tracing::error!(error = %e, "Failed to start server");
        db.close().await;
        return Err(e.into());
    }

    // Create Axum app
    let app = create_app(state);

    // Start server
    let addr = settings.server_addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            db.close().await;
            return Err(e.into());
        }
    };
    tracing::info!("Server running on {}", addr);

    // Run server with graceful shutdown
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let signal = wait_for_signal().await;
            tracing::info!(?signal, "Stopping HTTP server");
        })
        .await;
    tracing::info!("HTTP server closed");

    db.close().await;
    tracing::info!("Server shutdown complete");

    served?;
    Ok(())
}
