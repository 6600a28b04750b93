//! REST API Routes Module
//!
//! Route handlers organized by entity type, plus:
//! - Health check endpoints (Kubernetes-compatible, public)
//! - OpenAPI document at /openapi.json (public)
//! - CORS support for browser-based clients

pub mod board;
pub mod column;
pub mod health;
pub mod task;

use std::time::Duration;

use axum::{
    http::{header, Method},
    middleware::from_fn_with_state,
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
#[cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::auth::AuthConfig;
use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use crate::middleware::{auth_middleware, AuthMiddlewareState};
#[cfg(feature = "openapi")]
use crate::openapi::ApiDoc;
use crate::state::AppState;

/// Handler for /openapi.json endpoint.
#[cfg(feature = "openapi")]
async fn openapi_json() -> axum::Json<utoipa::openapi::OpenApi> {
    axum::Json(ApiDoc::openapi())
}

// ============================================================================
// PRODUCTION VALIDATION
// ============================================================================

fn is_production_environment() -> bool {
    std::env::var("KANBAN_ENVIRONMENT")
        .map(|e| matches!(e.to_lowercase().as_str(), "production" | "prod"))
        .unwrap_or(false)
}

fn validate_api_config_for_production(config: &ApiConfig) -> ApiResult<()> {
    if config.cors_origins.is_empty() {
        return Err(ApiError::invalid_input(
            "CORS origins not configured for production. Set KANBAN_CORS_ORIGINS.",
        ));
    }
    Ok(())
}

// ============================================================================
// ROUTER
// ============================================================================

fn build_cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(config.cors_max_age_secs));

    if config.cors_origins.is_empty() {
        tracing::info!("CORS: Development mode - allowing all origins");
        cors.allow_origin(Any)
    } else {
        tracing::info!(
            "CORS: Production mode - allowing origins: {:?}",
            config.cors_origins
        );
        let origins: Vec<header::HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();

        if config.cors_allow_credentials {
            cors.allow_origin(origins).allow_credentials(true)
        } else {
            cors.allow_origin(origins)
        }
    }
}

/// Create the complete API router.
///
/// - Board, column and task routes under /api/v1/* (bearer JWT required)
/// - Health checks at /health/*
/// - OpenAPI document at /openapi.json (`openapi` feature)
///
/// In production (`KANBAN_ENVIRONMENT=production`) the JWT secret and CORS
/// origins are validated and startup fails when they are unsafe.
pub fn create_api_router(
    state: AppState,
    api_config: &ApiConfig,
    auth_config: AuthConfig,
) -> ApiResult<Router> {
    auth_config.validate_for_production()?;
    if is_production_environment() {
        validate_api_config_for_production(api_config)?;
    }

    let auth_state = AuthMiddlewareState::new(auth_config);
    let api_routes = Router::new()
        .merge(board::create_router())
        .merge(column::create_router())
        .merge(task::create_router())
        .layer(from_fn_with_state(auth_state, auth_middleware));

    let mut router = Router::new()
        .nest("/api/v1", api_routes)
        .nest("/health", health::create_router());

    #[cfg(feature = "openapi")]
    {
        router = router.route("/openapi.json", axum::routing::get(openapi_json));
    }

    Ok(router
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(api_config)))
}
