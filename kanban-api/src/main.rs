//! Kanban API Server Entry Point
//!
//! Bootstraps configuration, opens the configured store and starts the Axum
//! HTTP server.

use std::sync::Arc;

use kanban_api::telemetry::{init_tracing, TelemetryConfig};
use kanban_api::{
    create_api_router, ApiConfig, ApiError, ApiResult, AppState, AuthConfig, BoardService,
    DbClient, DbConfig, StorageBackend,
};
use kanban_storage::{BoardStore, MemoryStore};

#[tokio::main]
async fn main() -> ApiResult<()> {
    init_tracing(&TelemetryConfig::default())?;

    let api_config = ApiConfig::from_env()?;
    let auth_config = AuthConfig::from_env();

    let store: Arc<dyn BoardStore> = match api_config.storage_backend {
        StorageBackend::Postgres => {
            let db = DbClient::from_config(&DbConfig::from_env())?;
            db.ensure_schema().await?;
            Arc::new(db)
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    let service = BoardService::new(store).with_retry_limit(api_config.move_retry_limit);
    let state = AppState::new(service, api_config.storage_backend);
    let app = create_api_router(state, &api_config, auth_config)?;

    let addr = api_config.bind_addr;
    tracing::info!(
        %addr,
        backend = api_config.storage_backend.as_str(),
        "Starting Kanban API server"
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
