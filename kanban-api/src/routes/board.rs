//! Board REST API Routes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use kanban_core::{Board, BoardId, BoardView, Column};

use crate::{
    error::{ApiError, ApiResult},
    middleware::AuthExtractor,
    services::BoardService,
    state::AppState,
    types::{
        CreateBoardRequest, CreateColumnRequest, ListBoardsResponse, SuccessResponse,
        UpdateBoardRequest,
    },
};

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// GET /api/v1/boards - List the caller's boards
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/api/v1/boards",
    tag = "Boards",
    responses(
        (status = 200, description = "Boards owned by the caller", body = ListBoardsResponse),
        (status = 401, description = "Unauthorized", body = ApiError),
    ),
    security(("bearer_auth" = []))
))]
pub async fn list_boards(
    State(service): State<BoardService>,
    AuthExtractor(auth): AuthExtractor,
) -> ApiResult<Json<ListBoardsResponse>> {
    let boards = service.list_boards(auth.user_id).await?;
    Ok(Json(ListBoardsResponse { boards }))
}

/// POST /api/v1/boards - Create a board with the default columns
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/api/v1/boards",
    tag = "Boards",
    request_body = CreateBoardRequest,
    responses(
        (status = 201, description = "Board created", body = BoardView),
        (status = 400, description = "Invalid request", body = ApiError),
        (status = 401, description = "Unauthorized", body = ApiError),
    ),
    security(("bearer_auth" = []))
))]
pub async fn create_board(
    State(service): State<BoardService>,
    AuthExtractor(auth): AuthExtractor,
    Json(req): Json<CreateBoardRequest>,
) -> ApiResult<impl IntoResponse> {
    let board = service
        .create_board(auth.user_id, &req.name, req.description)
        .await?;
    Ok((StatusCode::CREATED, Json(board)))
}

/// GET /api/v1/boards/main - The caller's main board, created on first use
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/api/v1/boards/main",
    tag = "Boards",
    responses(
        (status = 200, description = "Main board with columns and tasks", body = BoardView),
        (status = 401, description = "Unauthorized", body = ApiError),
    ),
    security(("bearer_auth" = []))
))]
pub async fn get_main_board(
    State(service): State<BoardService>,
    AuthExtractor(auth): AuthExtractor,
) -> ApiResult<Json<BoardView>> {
    Ok(Json(service.get_main_board(auth.user_id).await?))
}

/// GET /api/v1/boards/{id} - Board with nested columns and tasks, in order
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/api/v1/boards/{id}",
    tag = "Boards",
    params(("id" = String, Path, description = "Board ID")),
    responses(
        (status = 200, description = "Board with columns and tasks", body = BoardView),
        (status = 403, description = "Board belongs to another user", body = ApiError),
        (status = 404, description = "Board not found", body = ApiError),
    ),
    security(("bearer_auth" = []))
))]
pub async fn get_board(
    State(service): State<BoardService>,
    AuthExtractor(auth): AuthExtractor,
    Path(id): Path<BoardId>,
) -> ApiResult<Json<BoardView>> {
    Ok(Json(service.get_board(auth.user_id, id).await?))
}

/// PATCH /api/v1/boards/{id} - Rename a board or change its description
#[cfg_attr(feature = "openapi", utoipa::path(
    patch,
    path = "/api/v1/boards/{id}",
    tag = "Boards",
    params(("id" = String, Path, description = "Board ID")),
    request_body = UpdateBoardRequest,
    responses(
        (status = 200, description = "Board updated", body = Board),
        (status = 400, description = "Invalid request", body = ApiError),
        (status = 403, description = "Board belongs to another user", body = ApiError),
        (status = 404, description = "Board not found", body = ApiError),
    ),
    security(("bearer_auth" = []))
))]
pub async fn update_board(
    State(service): State<BoardService>,
    AuthExtractor(auth): AuthExtractor,
    Path(id): Path<BoardId>,
    Json(req): Json<UpdateBoardRequest>,
) -> ApiResult<Json<Board>> {
    Ok(Json(service.update_board(auth.user_id, id, req.into()).await?))
}

/// DELETE /api/v1/boards/{id} - Delete a board with its columns and tasks
#[cfg_attr(feature = "openapi", utoipa::path(
    delete,
    path = "/api/v1/boards/{id}",
    tag = "Boards",
    params(("id" = String, Path, description = "Board ID")),
    responses(
        (status = 200, description = "Board deleted", body = SuccessResponse),
        (status = 403, description = "Board belongs to another user", body = ApiError),
        (status = 404, description = "Board not found", body = ApiError),
    ),
    security(("bearer_auth" = []))
))]
pub async fn delete_board(
    State(service): State<BoardService>,
    AuthExtractor(auth): AuthExtractor,
    Path(id): Path<BoardId>,
) -> ApiResult<Json<SuccessResponse>> {
    service.delete_board(auth.user_id, id).await?;
    Ok(Json(SuccessResponse::ok()))
}

/// POST /api/v1/boards/{id}/columns - Append a column
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/api/v1/boards/{id}/columns",
    tag = "Columns",
    params(("id" = String, Path, description = "Board ID")),
    request_body = CreateColumnRequest,
    responses(
        (status = 201, description = "Column created", body = Column),
        (status = 400, description = "Invalid request", body = ApiError),
        (status = 403, description = "Board belongs to another user", body = ApiError),
        (status = 404, description = "Board not found", body = ApiError),
    ),
    security(("bearer_auth" = []))
))]
pub async fn create_column(
    State(service): State<BoardService>,
    AuthExtractor(auth): AuthExtractor,
    Path(id): Path<BoardId>,
    Json(req): Json<CreateColumnRequest>,
) -> ApiResult<impl IntoResponse> {
    let column = service.create_column(auth.user_id, id, &req.name).await?;
    Ok((StatusCode::CREATED, Json(column)))
}

// ============================================================================
// ROUTER
// ============================================================================

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/boards", get(list_boards).post(create_board))
        .route("/boards/main", get(get_main_board))
        .route(
            "/boards/:id",
            get(get_board).patch(update_board).delete(delete_board),
        )
        .route("/boards/:id/columns", post(create_column))
}
