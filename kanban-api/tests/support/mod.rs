//! Shared helpers for the API integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use kanban_api::{
    create_api_router, generate_jwt_token, ApiConfig, AppState, AuthConfig, BoardService,
    StorageBackend,
};
use kanban_core::UserId;
use kanban_storage::MemoryStore;
use serde_json::Value;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "kanban-integration-test-secret-0123456789";

pub struct TestApp {
    pub router: Router,
    pub service: BoardService,
    pub store: MemoryStore,
    pub auth: AuthConfig,
}

pub fn auth_config() -> AuthConfig {
    AuthConfig::with_secret(TEST_SECRET).expect("test secret is not empty")
}

/// Router over a fresh in-memory store.
pub fn test_app() -> TestApp {
    let store = MemoryStore::new();
    let service = BoardService::new(Arc::new(store.clone()));
    let state = AppState::new(service.clone(), StorageBackend::Memory);
    let auth = auth_config();
    let router = create_api_router(state, &ApiConfig::default(), auth.clone())
        .expect("router builds with development config");

    TestApp {
        router,
        service,
        store,
        auth,
    }
}

impl TestApp {
    pub fn token_for(&self, user: UserId) -> String {
        generate_jwt_token(&self.auth, user, None).expect("token signs")
    }

    /// Send one request and decode the JSON body (`Value::Null` when empty).
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        user: Option<UserId>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header(
                header::AUTHORIZATION,
                format!("Bearer {}", self.token_for(user)),
            );
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request builds");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body reads");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, user: UserId) -> (StatusCode, Value) {
        self.send(Method::GET, uri, Some(user), None).await
    }

    pub async fn post(&self, uri: &str, user: UserId, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(user), Some(body)).await
    }
}

/// Task titles of column `index` in a board view JSON.
pub fn column_titles(board: &Value, index: usize) -> Vec<String> {
    board["columns"][index]["tasks"]
        .as_array()
        .map(|tasks| {
            tasks
                .iter()
                .filter_map(|t| t["title"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

/// Task orders of column `index` in a board view JSON.
pub fn column_orders(board: &Value, index: usize) -> Vec<i64> {
    board["columns"][index]["tasks"]
        .as_array()
        .map(|tasks| tasks.iter().filter_map(|t| t["order"].as_i64()).collect())
        .unwrap_or_default()
}
