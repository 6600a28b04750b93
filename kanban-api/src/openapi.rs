//! OpenAPI document for the board API, generated by utoipa from the route
//! annotations and schema derives.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error::{ApiError, ErrorCode};
use crate::routes::health::{ComponentHealth, HealthDetails, HealthResponse, HealthStatus};
use crate::routes::{board, column, health, task};
use crate::types::*;

use kanban_core::{Board, BoardView, Column, ColumnView, EntityKind, Priority, Task};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Kanban API",
        version = "0.1.0",
        description = "Boards, columns and tasks with drag-and-drop ordering",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local Development")
    ),
    tags(
        (name = "Boards", description = "Boards owned by the caller"),
        (name = "Columns", description = "Ordered columns within a board"),
        (name = "Tasks", description = "Ordered tasks within a column, and moves between columns"),
        (name = "Health", description = "Liveness and readiness probes")
    ),
    paths(
        // === Board Routes ===
        board::list_boards,
        board::create_board,
        board::get_main_board,
        board::get_board,
        board::update_board,
        board::delete_board,
        board::create_column,

        // === Column Routes ===
        column::update_column,
        column::delete_column,
        column::move_column,
        column::compact_column,
        column::create_task,

        // === Task Routes ===
        task::list_my_tasks,
        task::get_task,
        task::update_task,
        task::delete_task,
        task::move_task,

        // === Health ===
        health::liveness,
        health::readiness,
    ),
    components(
        schemas(
            ApiError, ErrorCode,

            CreateBoardRequest, UpdateBoardRequest, ListBoardsResponse,
            CreateColumnRequest, UpdateColumnRequest, MoveColumnRequest, CompactResponse,
            CreateTaskRequest, UpdateTaskRequest, MoveTaskRequest, ListTasksResponse,
            SuccessResponse,

            Board, Column, Task, BoardView, ColumnView, Priority, EntityKind,

            HealthResponse, HealthStatus, HealthDetails, ComponentHealth
        )
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Registers the bearer JWT scheme referenced by the routes.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
