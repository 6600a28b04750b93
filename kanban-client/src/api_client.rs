//! REST client for the board API.

use std::time::Duration;

use async_trait::async_trait;
use kanban_api::error::ApiError as ApiServerError;
use kanban_api::types::{
    CreateColumnRequest, CreateTaskRequest, MoveTaskRequest, SuccessResponse,
};
use kanban_core::{BoardId, BoardView, Column, ColumnId, Task, TaskId};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Method, StatusCode};

use crate::config::ClientConfig;
use crate::mirror::MoveCommand;

#[derive(Debug, thiserror::Error)]
pub enum ApiClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    /// The server answered with a structured error body.
    #[error("HTTP {status}: {}", .error.message)]
    Api {
        status: StatusCode,
        error: ApiServerError,
    },
    #[error("Unexpected response: {0}")]
    InvalidResponse(String),
    #[error("Config error: {0}")]
    Config(String),
}

impl ApiClientError {
    /// HTTP status of a server-side rejection.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiClientError::Api { status, .. } => Some(*status),
            ApiClientError::Http(err) => err.status(),
            _ => None,
        }
    }
}

/// The board operations a session needs from the server.
#[async_trait]
pub trait BoardApi: Send + Sync {
    async fn get_board(&self, id: BoardId) -> Result<BoardView, ApiClientError>;

    async fn get_main_board(&self) -> Result<BoardView, ApiClientError>;

    async fn move_task(&self, command: &MoveCommand) -> Result<(), ApiClientError>;

    async fn create_task(
        &self,
        column_id: ColumnId,
        request: &CreateTaskRequest,
    ) -> Result<Task, ApiClientError>;

    async fn delete_task(&self, id: TaskId) -> Result<(), ApiClientError>;

    async fn create_column(&self, board_id: BoardId, name: &str) -> Result<Column, ApiClientError>;

    async fn delete_column(&self, id: ColumnId) -> Result<(), ApiClientError>;
}

#[derive(Clone)]
pub struct RestClient {
    client: reqwest::Client,
    base_url: String,
    auth_header: HeaderMap,
}

impl std::fmt::Debug for RestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl RestClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiClientError> {
        let timeout = Duration::from_millis(config.request_timeout_ms);
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        let auth_header = build_auth_headers(&config.jwt)?;
        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            auth_header,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send_json<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ApiClientError>
    where
        T: serde::de::DeserializeOwned,
        B: serde::Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self
            .client
            .request(method, url)
            .headers(self.auth_header.clone());
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;
        self.parse_response(response).await
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, ApiClientError> {
        self.send_json::<T, ()>(Method::GET, path, None).await
    }

    async fn post_json<T, B>(&self, path: &str, body: &B) -> Result<T, ApiClientError>
    where
        T: serde::de::DeserializeOwned,
        B: serde::Serialize + ?Sized,
    {
        self.send_json(Method::POST, path, Some(body)).await
    }

    async fn delete(&self, path: &str) -> Result<(), ApiClientError> {
        let response: SuccessResponse = self.send_json::<_, ()>(Method::DELETE, path, None).await?;
        expect_success(response)
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ApiClientError> {
        let status = response.status();
        if status.is_success() {
            Ok(response.json::<T>().await?)
        } else {
            let text = response.text().await?;
            if let Ok(error) = serde_json::from_str::<ApiServerError>(&text) {
                return Err(ApiClientError::Api { status, error });
            }
            Err(ApiClientError::InvalidResponse(format!(
                "HTTP {}: {}",
                status.as_u16(),
                text
            )))
        }
    }
}

#[async_trait]
impl BoardApi for RestClient {
    async fn get_board(&self, id: BoardId) -> Result<BoardView, ApiClientError> {
        self.get_json(&format!("/api/v1/boards/{}", id)).await
    }

    async fn get_main_board(&self) -> Result<BoardView, ApiClientError> {
        self.get_json("/api/v1/boards/main").await
    }

    async fn move_task(&self, command: &MoveCommand) -> Result<(), ApiClientError> {
        let body = MoveTaskRequest {
            new_column_id: command.new_column_id,
            new_index: command.new_index,
        };
        let response: SuccessResponse = self
            .post_json(&format!("/api/v1/tasks/{}/move", command.task_id), &body)
            .await?;
        expect_success(response)
    }

    async fn create_task(
        &self,
        column_id: ColumnId,
        request: &CreateTaskRequest,
    ) -> Result<Task, ApiClientError> {
        self.post_json(&format!("/api/v1/columns/{}/tasks", column_id), request)
            .await
    }

    async fn delete_task(&self, id: TaskId) -> Result<(), ApiClientError> {
        self.delete(&format!("/api/v1/tasks/{}", id)).await
    }

    async fn create_column(&self, board_id: BoardId, name: &str) -> Result<Column, ApiClientError> {
        let body = CreateColumnRequest {
            name: name.to_string(),
        };
        self.post_json(&format!("/api/v1/boards/{}/columns", board_id), &body)
            .await
    }

    async fn delete_column(&self, id: ColumnId) -> Result<(), ApiClientError> {
        self.delete(&format!("/api/v1/columns/{}", id)).await
    }
}

fn expect_success(response: SuccessResponse) -> Result<(), ApiClientError> {
    if response.success {
        Ok(())
    } else {
        Err(ApiClientError::InvalidResponse(
            "server reported success = false".to_string(),
        ))
    }
}

fn build_auth_headers(jwt: &str) -> Result<HeaderMap, ApiClientError> {
    let mut headers = HeaderMap::new();
    let value = format!("Bearer {}", jwt.trim());
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&value).map_err(|e| ApiClientError::Config(e.to_string()))?,
    );
    Ok(headers)
}
