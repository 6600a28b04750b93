//! Kanban API - REST layer for boards, columns and tasks
//!
//! Axum routes over [`services::BoardService`], which keeps task and column
//! orders contiguous across moves. Storage is either PostgreSQL
//! ([`db::DbClient`]) or the in-process [`kanban_storage::MemoryStore`].

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod macros;
pub mod middleware;
#[cfg(feature = "openapi")]
pub mod openapi;
pub mod routes;
pub mod services;
pub mod state;
pub mod telemetry;
pub mod types;

// Re-export commonly used types
pub use auth::{
    authenticate, generate_jwt_token, validate_jwt_token, AuthConfig, AuthContext, Claims,
};
pub use config::{ApiConfig, ConfigError, StorageBackend};
pub use db::{DbClient, DbConfig};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use middleware::{auth_middleware, AuthExtractor, AuthMiddlewareState};
#[cfg(feature = "openapi")]
pub use openapi::ApiDoc;
pub use routes::create_api_router;
pub use services::{BoardService, NewTask};
pub use state::AppState;
pub use types::*;
