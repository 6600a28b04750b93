//! Task REST API Routes

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use kanban_core::{Task, TaskId};

use crate::{
    error::{ApiError, ApiResult},
    middleware::AuthExtractor,
    services::BoardService,
    state::AppState,
    types::{ListTasksResponse, MoveTaskRequest, SuccessResponse, UpdateTaskRequest},
};

/// GET /api/v1/tasks - Tasks written by the caller, newest first
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/api/v1/tasks",
    tag = "Tasks",
    responses(
        (status = 200, description = "Tasks authored by the caller", body = ListTasksResponse),
        (status = 401, description = "Unauthorized", body = ApiError),
    ),
    security(("bearer_auth" = []))
))]
pub async fn list_my_tasks(
    State(service): State<BoardService>,
    AuthExtractor(auth): AuthExtractor,
) -> ApiResult<Json<ListTasksResponse>> {
    let tasks = service.list_my_tasks(auth.user_id).await?;
    Ok(Json(ListTasksResponse { tasks }))
}

/// GET /api/v1/tasks/{id}
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/api/v1/tasks/{id}",
    tag = "Tasks",
    params(("id" = String, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Task", body = Task),
        (status = 404, description = "Task not found", body = ApiError),
    ),
    security(("bearer_auth" = []))
))]
pub async fn get_task(
    State(service): State<BoardService>,
    AuthExtractor(auth): AuthExtractor,
    Path(id): Path<TaskId>,
) -> ApiResult<Json<Task>> {
    Ok(Json(service.get_task(auth.user_id, id).await?))
}

/// PATCH /api/v1/tasks/{id} - Partial update of a task's content
#[cfg_attr(feature = "openapi", utoipa::path(
    patch,
    path = "/api/v1/tasks/{id}",
    tag = "Tasks",
    params(("id" = String, Path, description = "Task ID")),
    request_body = UpdateTaskRequest,
    responses(
        (status = 200, description = "Task updated", body = Task),
        (status = 400, description = "Invalid request", body = ApiError),
        (status = 404, description = "Task not found", body = ApiError),
    ),
    security(("bearer_auth" = []))
))]
pub async fn update_task(
    State(service): State<BoardService>,
    AuthExtractor(auth): AuthExtractor,
    Path(id): Path<TaskId>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<Task>> {
    Ok(Json(service.update_task(auth.user_id, id, req.into()).await?))
}

/// DELETE /api/v1/tasks/{id}
#[cfg_attr(feature = "openapi", utoipa::path(
    delete,
    path = "/api/v1/tasks/{id}",
    tag = "Tasks",
    params(("id" = String, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Task deleted", body = SuccessResponse),
        (status = 404, description = "Task not found", body = ApiError),
    ),
    security(("bearer_auth" = []))
))]
pub async fn delete_task(
    State(service): State<BoardService>,
    AuthExtractor(auth): AuthExtractor,
    Path(id): Path<TaskId>,
) -> ApiResult<Json<SuccessResponse>> {
    service.delete_task(auth.user_id, id).await?;
    Ok(Json(SuccessResponse::ok()))
}

/// POST /api/v1/tasks/{id}/move - Move a task to a column and index
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/api/v1/tasks/{id}/move",
    tag = "Tasks",
    params(("id" = String, Path, description = "Task ID")),
    request_body = MoveTaskRequest,
    responses(
        (status = 200, description = "Task moved", body = SuccessResponse),
        (status = 400, description = "Invalid index", body = ApiError),
        (status = 403, description = "Target column belongs to another user", body = ApiError),
        (status = 404, description = "Task not found", body = ApiError),
        (status = 409, description = "Concurrent modification", body = ApiError),
    ),
    security(("bearer_auth" = []))
))]
pub async fn move_task(
    State(service): State<BoardService>,
    AuthExtractor(auth): AuthExtractor,
    Path(id): Path<TaskId>,
    Json(req): Json<MoveTaskRequest>,
) -> ApiResult<Json<SuccessResponse>> {
    service
        .move_task(auth.user_id, id, req.new_column_id, req.new_index)
        .await?;
    Ok(Json(SuccessResponse::ok()))
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/tasks", get(list_my_tasks))
        .route(
            "/tasks/:id",
            get(get_task).patch(update_task).delete(delete_task),
        )
        .route("/tasks/:id/move", post(move_task))
}
