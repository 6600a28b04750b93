//! Column REST API Routes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{patch, post},
    Json, Router,
};
use kanban_core::{Column, ColumnId, Task};

use crate::{
    error::{ApiError, ApiResult},
    middleware::AuthExtractor,
    services::BoardService,
    state::AppState,
    types::{
        CompactResponse, CreateTaskRequest, MoveColumnRequest, SuccessResponse,
        UpdateColumnRequest,
    },
};

/// PATCH /api/v1/columns/{id} - Rename a column
#[cfg_attr(feature = "openapi", utoipa::path(
    patch,
    path = "/api/v1/columns/{id}",
    tag = "Columns",
    params(("id" = String, Path, description = "Column ID")),
    request_body = UpdateColumnRequest,
    responses(
        (status = 200, description = "Column renamed", body = Column),
        (status = 400, description = "Invalid request", body = ApiError),
        (status = 403, description = "Column belongs to another user", body = ApiError),
        (status = 404, description = "Column not found", body = ApiError),
    ),
    security(("bearer_auth" = []))
))]
pub async fn update_column(
    State(service): State<BoardService>,
    AuthExtractor(auth): AuthExtractor,
    Path(id): Path<ColumnId>,
    Json(req): Json<UpdateColumnRequest>,
) -> ApiResult<Json<Column>> {
    Ok(Json(service.update_column(auth.user_id, id, &req.name).await?))
}

/// DELETE /api/v1/columns/{id} - Delete a column and its tasks
#[cfg_attr(feature = "openapi", utoipa::path(
    delete,
    path = "/api/v1/columns/{id}",
    tag = "Columns",
    params(("id" = String, Path, description = "Column ID")),
    responses(
        (status = 200, description = "Column deleted", body = SuccessResponse),
        (status = 403, description = "Column belongs to another user", body = ApiError),
        (status = 404, description = "Column not found", body = ApiError),
    ),
    security(("bearer_auth" = []))
))]
pub async fn delete_column(
    State(service): State<BoardService>,
    AuthExtractor(auth): AuthExtractor,
    Path(id): Path<ColumnId>,
) -> ApiResult<Json<SuccessResponse>> {
    service.delete_column(auth.user_id, id).await?;
    Ok(Json(SuccessResponse::ok()))
}

/// POST /api/v1/columns/{id}/move - Move a column within its board
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/api/v1/columns/{id}/move",
    tag = "Columns",
    params(("id" = String, Path, description = "Column ID")),
    request_body = MoveColumnRequest,
    responses(
        (status = 200, description = "Column moved", body = Column),
        (status = 400, description = "Invalid index", body = ApiError),
        (status = 403, description = "Column belongs to another user", body = ApiError),
        (status = 404, description = "Column not found", body = ApiError),
        (status = 409, description = "Concurrent modification", body = ApiError),
    ),
    security(("bearer_auth" = []))
))]
pub async fn move_column(
    State(service): State<BoardService>,
    AuthExtractor(auth): AuthExtractor,
    Path(id): Path<ColumnId>,
    Json(req): Json<MoveColumnRequest>,
) -> ApiResult<Json<Column>> {
    Ok(Json(
        service.move_column(auth.user_id, id, req.new_index).await?,
    ))
}

/// POST /api/v1/columns/{id}/compact - Renumber tasks to 0..n-1
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/api/v1/columns/{id}/compact",
    tag = "Columns",
    params(("id" = String, Path, description = "Column ID")),
    responses(
        (status = 200, description = "Column compacted", body = CompactResponse),
        (status = 403, description = "Column belongs to another user", body = ApiError),
        (status = 404, description = "Column not found", body = ApiError),
    ),
    security(("bearer_auth" = []))
))]
pub async fn compact_column(
    State(service): State<BoardService>,
    AuthExtractor(auth): AuthExtractor,
    Path(id): Path<ColumnId>,
) -> ApiResult<Json<CompactResponse>> {
    let renumbered = service.compact_column(auth.user_id, id).await?;
    Ok(Json(CompactResponse { renumbered }))
}

/// POST /api/v1/columns/{id}/tasks - Append a task to a column
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/api/v1/columns/{id}/tasks",
    tag = "Tasks",
    params(("id" = String, Path, description = "Column ID")),
    request_body = CreateTaskRequest,
    responses(
        (status = 201, description = "Task created", body = Task),
        (status = 400, description = "Invalid request", body = ApiError),
        (status = 403, description = "Column belongs to another user", body = ApiError),
        (status = 404, description = "Column not found", body = ApiError),
    ),
    security(("bearer_auth" = []))
))]
pub async fn create_task(
    State(service): State<BoardService>,
    AuthExtractor(auth): AuthExtractor,
    Path(id): Path<ColumnId>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<impl IntoResponse> {
    let task = service.create_task(auth.user_id, id, req.into()).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/columns/:id", patch(update_column).delete(delete_column))
        .route("/columns/:id/move", post(move_column))
        .route("/columns/:id/compact", post(compact_column))
        .route("/columns/:id/tasks", post(create_task))
}
