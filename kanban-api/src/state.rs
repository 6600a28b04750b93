//! Shared application state for Axum routers.

use std::time::Instant;

use crate::config::StorageBackend;
use crate::services::BoardService;

/// Application-wide state shared across all routes.
#[derive(Debug, Clone)]
pub struct AppState {
    pub service: BoardService,
    /// Which store the service runs on, reported by the readiness probe.
    pub storage_backend: StorageBackend,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(service: BoardService, storage_backend: StorageBackend) -> Self {
        Self {
            service,
            storage_backend,
            start_time: Instant::now(),
        }
    }
}

crate::impl_from_ref!(BoardService, service);
crate::impl_from_ref!(StorageBackend, storage_backend);
crate::impl_from_ref!(Instant, start_time);
