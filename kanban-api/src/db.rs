//! Database Connection Pool Module
//!
//! PostgreSQL connection pooling with deadpool-postgres, and the Postgres
//! implementation of the board store. Each unit of work runs on one pooled
//! connection inside `BEGIN`/`COMMIT`; column rows are locked with
//! `SELECT ... FOR UPDATE` so concurrent moves touching the same column
//! serialize instead of interleaving their shifts.

use crate::error::{ApiError, ApiResult};
use async_trait::async_trait;
use deadpool_postgres::{Config, ManagerConfig, Object, Pool, RecyclingMethod, Runtime};
use kanban_core::{
    Board, BoardId, BoardView, Column, ColumnId, EntityKind, Order, OrderRange, StorageError,
    StorageResult, Task, TaskId, UserId,
};
use kanban_storage::{BoardStore, BoardUpdate, ColumnUpdate, TaskUpdate, UnitOfWork};
use std::time::Duration;
use tokio_postgres::error::SqlState;
use tokio_postgres::{NoTls, Row};
use uuid::Uuid;

/// Schema bootstrap, safe to run on every start.
pub const SCHEMA_SQL: &str = include_str!("../sql/schema.sql");

// ============================================================================
// CONNECTION POOL CONFIGURATION
// ============================================================================

/// Database connection pool configuration.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// PostgreSQL host
    pub host: String,
    /// PostgreSQL port
    pub port: u16,
    /// Database name
    pub dbname: String,
    /// Database user
    pub user: String,
    /// Database password
    pub password: String,
    /// Maximum pool size
    pub max_size: usize,
    /// Wait timeout when acquiring a connection
    pub timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            dbname: "kanban".to_string(),
            user: "postgres".to_string(),
            password: "".to_string(),
            max_size: 16,
            timeout: Duration::from_secs(30),
        }
    }
}

impl DbConfig {
    /// Create a new database configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("KANBAN_DB_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: std::env::var("KANBAN_DB_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5432),
            dbname: std::env::var("KANBAN_DB_NAME").unwrap_or_else(|_| "kanban".to_string()),
            user: std::env::var("KANBAN_DB_USER").unwrap_or_else(|_| "postgres".to_string()),
            password: std::env::var("KANBAN_DB_PASSWORD").unwrap_or_default(),
            max_size: std::env::var("KANBAN_DB_POOL_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(16),
            timeout: Duration::from_secs(
                std::env::var("KANBAN_DB_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
        }
    }

    /// Create a connection pool from this configuration.
    pub fn create_pool(&self) -> ApiResult<Pool> {
        let mut cfg = Config::new();
        cfg.host = Some(self.host.clone());
        cfg.port = Some(self.port);
        cfg.dbname = Some(self.dbname.clone());
        cfg.user = Some(self.user.clone());
        cfg.password = Some(self.password.clone());

        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });
        let mut pool_cfg = deadpool_postgres::PoolConfig::new(self.max_size);
        pool_cfg.timeouts.wait = Some(self.timeout);
        cfg.pool = Some(pool_cfg);

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| ApiError::database_error(format!("Failed to create pool: {}", e)))?;

        Ok(pool)
    }
}

// ============================================================================
// DATABASE CLIENT WRAPPER
// ============================================================================

/// Postgres-backed board store.
#[derive(Clone)]
pub struct DbClient {
    pool: Pool,
}

impl DbClient {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    pub fn from_config(config: &DbConfig) -> ApiResult<Self> {
        let pool = config.create_pool()?;
        Ok(Self::new(pool))
    }

    /// Current pool size, for health reporting.
    pub fn pool_size(&self) -> usize {
        self.pool.status().size
    }

    async fn get_conn(&self) -> StorageResult<Object> {
        self.pool.get().await.map_err(|e| StorageError::Backend {
            reason: format!("failed to acquire connection: {}", e),
        })
    }

    /// Create tables and indexes if they are missing.
    pub async fn ensure_schema(&self) -> ApiResult<()> {
        let conn = self.pool.get().await?;
        conn.batch_execute(SCHEMA_SQL).await?;
        tracing::info!("Database schema is up to date");
        Ok(())
    }
}

impl std::fmt::Debug for DbClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbClient")
            .field("pool_size", &self.pool_size())
            .finish()
    }
}

// ============================================================================
// ROW MAPPING
// ============================================================================

const BOARD_COLUMNS: &str = "id, name, description, owner_id, created_at, updated_at";
const COLUMN_COLUMNS: &str = "id, board_id, name, sort_order, created_at, updated_at";
const TASK_COLUMNS: &str = "t.id, t.column_id, t.title, t.description, t.label, t.priority, \
     t.due_date, t.sort_order, t.assignee_id, t.author_id, t.created_at, t.updated_at";

fn board_from_row(row: &Row) -> Board {
    Board {
        id: BoardId::from_uuid(row.get("id")),
        name: row.get("name"),
        description: row.get("description"),
        owner_id: UserId::from_uuid(row.get("owner_id")),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn column_from_row(row: &Row) -> Column {
    Column {
        id: ColumnId::from_uuid(row.get("id")),
        board_id: BoardId::from_uuid(row.get("board_id")),
        name: row.get("name"),
        order: row.get("sort_order"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn task_from_row(row: &Row) -> Task {
    let priority: String = row.get("priority");
    Task {
        id: TaskId::from_uuid(row.get("id")),
        column_id: ColumnId::from_uuid(row.get("column_id")),
        title: row.get("title"),
        description: row.get("description"),
        label: row.get("label"),
        priority: priority.parse().unwrap_or_default(),
        due_date: row.get("due_date"),
        order: row.get("sort_order"),
        assignee_id: row
            .get::<_, Option<Uuid>>("assignee_id")
            .map(UserId::from_uuid),
        author_id: UserId::from_uuid(row.get("author_id")),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Map driver errors to storage errors. Serialization failures, deadlocks
/// and lock timeouts are retryable conflicts.
fn storage_error(err: tokio_postgres::Error) -> StorageError {
    let retryable = err.code().is_some_and(|code| {
        *code == SqlState::T_R_SERIALIZATION_FAILURE
            || *code == SqlState::T_R_DEADLOCK_DETECTED
            || *code == SqlState::LOCK_NOT_AVAILABLE
    });

    if retryable {
        StorageError::Conflict {
            reason: err.to_string(),
        }
    } else {
        tracing::error!("Database error: {:?}", err);
        StorageError::Backend {
            reason: err.to_string(),
        }
    }
}

// ============================================================================
// READ SIDE
// ============================================================================

#[async_trait]
impl BoardStore for DbClient {
    async fn find_board(&self, id: BoardId) -> StorageResult<Option<Board>> {
        let conn = self.get_conn().await?;
        let row = conn
            .query_opt(
                &format!("SELECT {} FROM boards WHERE id = $1", BOARD_COLUMNS),
                &[&id.as_uuid()],
            )
            .await
            .map_err(storage_error)?;
        Ok(row.as_ref().map(board_from_row))
    }

    async fn list_boards_for_owner(&self, owner: UserId) -> StorageResult<Vec<Board>> {
        let conn = self.get_conn().await?;
        let rows = conn
            .query(
                &format!(
                    "SELECT {} FROM boards WHERE owner_id = $1 ORDER BY created_at, id",
                    BOARD_COLUMNS
                ),
                &[&owner.as_uuid()],
            )
            .await
            .map_err(storage_error)?;
        Ok(rows.iter().map(board_from_row).collect())
    }

    async fn find_column_with_board(&self, id: ColumnId) -> StorageResult<Option<(Column, Board)>> {
        let conn = self.get_conn().await?;
        let Some(column_row) = conn
            .query_opt(
                &format!("SELECT {} FROM board_columns WHERE id = $1", COLUMN_COLUMNS),
                &[&id.as_uuid()],
            )
            .await
            .map_err(storage_error)?
        else {
            return Ok(None);
        };
        let column = column_from_row(&column_row);

        let board_row = conn
            .query_opt(
                &format!("SELECT {} FROM boards WHERE id = $1", BOARD_COLUMNS),
                &[&column.board_id.as_uuid()],
            )
            .await
            .map_err(storage_error)?;
        Ok(board_row.map(|row| (column, board_from_row(&row))))
    }

    async fn find_task(&self, id: TaskId) -> StorageResult<Option<Task>> {
        let conn = self.get_conn().await?;
        let row = conn
            .query_opt(
                &format!("SELECT {} FROM tasks t WHERE t.id = $1", TASK_COLUMNS),
                &[&id.as_uuid()],
            )
            .await
            .map_err(storage_error)?;
        Ok(row.as_ref().map(task_from_row))
    }

    async fn load_board_view(&self, id: BoardId) -> StorageResult<Option<BoardView>> {
        let conn = self.get_conn().await?;
        let Some(board_row) = conn
            .query_opt(
                &format!("SELECT {} FROM boards WHERE id = $1", BOARD_COLUMNS),
                &[&id.as_uuid()],
            )
            .await
            .map_err(storage_error)?
        else {
            return Ok(None);
        };

        let column_rows = conn
            .query(
                &format!(
                    "SELECT {} FROM board_columns WHERE board_id = $1",
                    COLUMN_COLUMNS
                ),
                &[&id.as_uuid()],
            )
            .await
            .map_err(storage_error)?;

        let task_rows = conn
            .query(
                &format!(
                    "SELECT {} FROM tasks t \
                     JOIN board_columns c ON c.id = t.column_id \
                     WHERE c.board_id = $1",
                    TASK_COLUMNS
                ),
                &[&id.as_uuid()],
            )
            .await
            .map_err(storage_error)?;

        Ok(Some(BoardView::assemble(
            board_from_row(&board_row),
            column_rows.iter().map(column_from_row).collect(),
            task_rows.iter().map(task_from_row).collect(),
        )))
    }

    async fn list_tasks_for_author(&self, author: UserId) -> StorageResult<Vec<Task>> {
        let conn = self.get_conn().await?;
        let rows = conn
            .query(
                &format!(
                    "SELECT {} FROM tasks t WHERE t.author_id = $1 \
                     ORDER BY t.created_at DESC, t.id DESC",
                    TASK_COLUMNS
                ),
                &[&author.as_uuid()],
            )
            .await
            .map_err(storage_error)?;
        Ok(rows.iter().map(task_from_row).collect())
    }

    async fn ping(&self) -> StorageResult<()> {
        let conn = self.get_conn().await?;
        conn.simple_query("SELECT 1").await.map_err(storage_error)?;
        Ok(())
    }

    async fn begin(&self) -> StorageResult<Box<dyn UnitOfWork>> {
        let conn = self.get_conn().await?;
        conn.batch_execute("BEGIN").await.map_err(storage_error)?;
        Ok(Box::new(PgUnitOfWork { conn: Some(conn) }))
    }
}

// ============================================================================
// UNIT OF WORK
// ============================================================================

/// A transaction on one pooled connection.
///
/// Dropped without `commit`/`rollback`, it rolls back in the background.
pub struct PgUnitOfWork {
    conn: Option<Object>,
}

impl PgUnitOfWork {
    fn conn(&self) -> StorageResult<&Object> {
        self.conn.as_ref().ok_or_else(|| StorageError::TransactionFailed {
            reason: "unit of work already finished".to_string(),
        })
    }

    async fn finish(mut self: Box<Self>, statement: &str) -> StorageResult<()> {
        let conn = self.conn.take().ok_or_else(|| StorageError::TransactionFailed {
            reason: "unit of work already finished".to_string(),
        })?;
        conn.batch_execute(statement).await.map_err(storage_error)
    }

    fn expect_one(affected: u64, entity: EntityKind, id: Uuid) -> StorageResult<()> {
        if affected == 0 {
            return Err(StorageError::NotFound { entity, id });
        }
        Ok(())
    }

    async fn select_task_for_update(&self, id: TaskId) -> StorageResult<Option<Task>> {
        let row = self
            .conn()?
            .query_opt(
                &format!(
                    "SELECT {} FROM tasks t WHERE t.id = $1 FOR UPDATE",
                    TASK_COLUMNS
                ),
                &[&id.as_uuid()],
            )
            .await
            .map_err(storage_error)?;
        Ok(row.as_ref().map(task_from_row))
    }
}

impl Drop for PgUnitOfWork {
    fn drop(&mut self) {
        let Some(conn) = self.conn.take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(err) = conn.batch_execute("ROLLBACK").await {
                        tracing::warn!(error = %err, "Rollback of abandoned unit of work failed");
                    }
                });
            }
            Err(_) => {
                // Detach so the open transaction never returns to the pool.
                drop(Object::take(conn));
            }
        }
    }
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn lock_board(&mut self, id: BoardId) -> StorageResult<Option<Board>> {
        let row = self
            .conn()?
            .query_opt(
                &format!("SELECT {} FROM boards WHERE id = $1 FOR UPDATE", BOARD_COLUMNS),
                &[&id.as_uuid()],
            )
            .await
            .map_err(storage_error)?;
        Ok(row.as_ref().map(board_from_row))
    }

    async fn lock_columns(&mut self, ids: &[ColumnId]) -> StorageResult<Vec<Column>> {
        let mut ids: Vec<Uuid> = ids.iter().map(ColumnId::as_uuid).collect();
        ids.sort_unstable();
        ids.dedup();

        let rows = self
            .conn()?
            .query(
                &format!(
                    "SELECT {} FROM board_columns WHERE id = ANY($1) ORDER BY id FOR UPDATE",
                    COLUMN_COLUMNS
                ),
                &[&ids],
            )
            .await
            .map_err(storage_error)?;
        Ok(rows.iter().map(column_from_row).collect())
    }

    async fn find_task(&mut self, id: TaskId) -> StorageResult<Option<Task>> {
        let row = self
            .conn()?
            .query_opt(
                &format!("SELECT {} FROM tasks t WHERE t.id = $1", TASK_COLUMNS),
                &[&id.as_uuid()],
            )
            .await
            .map_err(storage_error)?;
        Ok(row.as_ref().map(task_from_row))
    }

    async fn find_column(&mut self, id: ColumnId) -> StorageResult<Option<Column>> {
        let row = self
            .conn()?
            .query_opt(
                &format!("SELECT {} FROM board_columns WHERE id = $1", COLUMN_COLUMNS),
                &[&id.as_uuid()],
            )
            .await
            .map_err(storage_error)?;
        Ok(row.as_ref().map(column_from_row))
    }

    async fn list_task_orders(&mut self, column: ColumnId) -> StorageResult<Vec<(TaskId, Order)>> {
        let rows = self
            .conn()?
            .query(
                "SELECT id, sort_order FROM tasks WHERE column_id = $1 \
                 ORDER BY sort_order, created_at, id",
                &[&column.as_uuid()],
            )
            .await
            .map_err(storage_error)?;
        Ok(rows
            .iter()
            .map(|row| (TaskId::from_uuid(row.get(0)), row.get(1)))
            .collect())
    }

    async fn list_column_orders(
        &mut self,
        board: BoardId,
    ) -> StorageResult<Vec<(ColumnId, Order)>> {
        let rows = self
            .conn()?
            .query(
                "SELECT id, sort_order FROM board_columns WHERE board_id = $1 \
                 ORDER BY sort_order, created_at, id",
                &[&board.as_uuid()],
            )
            .await
            .map_err(storage_error)?;
        Ok(rows
            .iter()
            .map(|row| (ColumnId::from_uuid(row.get(0)), row.get(1)))
            .collect())
    }

    async fn max_task_order(&mut self, column: ColumnId) -> StorageResult<Option<Order>> {
        let row = self
            .conn()?
            .query_one(
                "SELECT MAX(sort_order) FROM tasks WHERE column_id = $1",
                &[&column.as_uuid()],
            )
            .await
            .map_err(storage_error)?;
        Ok(row.get(0))
    }

    async fn max_column_order(&mut self, board: BoardId) -> StorageResult<Option<Order>> {
        let row = self
            .conn()?
            .query_one(
                "SELECT MAX(sort_order) FROM board_columns WHERE board_id = $1",
                &[&board.as_uuid()],
            )
            .await
            .map_err(storage_error)?;
        Ok(row.get(0))
    }

    async fn shift_task_orders(
        &mut self,
        column: ColumnId,
        range: OrderRange,
        delta: i32,
    ) -> StorageResult<u64> {
        let (low, high) = range.bounds();
        self.conn()?
            .execute(
                "UPDATE tasks SET sort_order = sort_order + $4, updated_at = now() \
                 WHERE column_id = $1 AND sort_order BETWEEN $2 AND $3",
                &[&column.as_uuid(), &low, &high, &delta],
            )
            .await
            .map_err(storage_error)
    }

    async fn shift_column_orders(
        &mut self,
        board: BoardId,
        range: OrderRange,
        delta: i32,
    ) -> StorageResult<u64> {
        let (low, high) = range.bounds();
        self.conn()?
            .execute(
                "UPDATE board_columns SET sort_order = sort_order + $4, updated_at = now() \
                 WHERE board_id = $1 AND sort_order BETWEEN $2 AND $3",
                &[&board.as_uuid(), &low, &high, &delta],
            )
            .await
            .map_err(storage_error)
    }

    async fn update_task_order(
        &mut self,
        id: TaskId,
        order: Order,
        column: Option<ColumnId>,
    ) -> StorageResult<()> {
        let column = column.map(|c| c.as_uuid());
        let affected = self
            .conn()?
            .execute(
                "UPDATE tasks SET sort_order = $2, column_id = COALESCE($3, column_id), \
                 updated_at = now() WHERE id = $1",
                &[&id.as_uuid(), &order, &column],
            )
            .await
            .map_err(storage_error)?;
        Self::expect_one(affected, EntityKind::Task, id.as_uuid())
    }

    async fn update_column_order(&mut self, id: ColumnId, order: Order) -> StorageResult<()> {
        let affected = self
            .conn()?
            .execute(
                "UPDATE board_columns SET sort_order = $2, updated_at = now() WHERE id = $1",
                &[&id.as_uuid(), &order],
            )
            .await
            .map_err(storage_error)?;
        Self::expect_one(affected, EntityKind::Column, id.as_uuid())
    }

    async fn insert_board(&mut self, board: &Board) -> StorageResult<()> {
        self.conn()?
            .execute(
                "INSERT INTO boards (id, name, description, owner_id, created_at, updated_at) \
                 VALUES ($1, $2, $3, $4, $5, $6)",
                &[
                    &board.id.as_uuid(),
                    &board.name,
                    &board.description,
                    &board.owner_id.as_uuid(),
                    &board.created_at,
                    &board.updated_at,
                ],
            )
            .await
            .map_err(|e| StorageError::InsertFailed {
                entity: EntityKind::Board,
                reason: e.to_string(),
            })?;
        Ok(())
    }

    async fn insert_column(&mut self, column: &Column) -> StorageResult<()> {
        self.conn()?
            .execute(
                "INSERT INTO board_columns \
                 (id, board_id, name, sort_order, created_at, updated_at) \
                 VALUES ($1, $2, $3, $4, $5, $6)",
                &[
                    &column.id.as_uuid(),
                    &column.board_id.as_uuid(),
                    &column.name,
                    &column.order,
                    &column.created_at,
                    &column.updated_at,
                ],
            )
            .await
            .map_err(|e| StorageError::InsertFailed {
                entity: EntityKind::Column,
                reason: e.to_string(),
            })?;
        Ok(())
    }

    async fn insert_task(&mut self, task: &Task) -> StorageResult<()> {
        let assignee = task.assignee_id.map(|a| a.as_uuid());
        self.conn()?
            .execute(
                "INSERT INTO tasks (id, column_id, title, description, label, priority, due_date, \
                 sort_order, assignee_id, author_id, created_at, updated_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
                &[
                    &task.id.as_uuid(),
                    &task.column_id.as_uuid(),
                    &task.title,
                    &task.description,
                    &task.label,
                    &task.priority.as_str(),
                    &task.due_date,
                    &task.order,
                    &assignee,
                    &task.author_id.as_uuid(),
                    &task.created_at,
                    &task.updated_at,
                ],
            )
            .await
            .map_err(|e| StorageError::InsertFailed {
                entity: EntityKind::Task,
                reason: e.to_string(),
            })?;
        Ok(())
    }

    async fn update_board(&mut self, id: BoardId, update: &BoardUpdate) -> StorageResult<Board> {
        let mut board = self
            .lock_board(id)
            .await?
            .ok_or(StorageError::NotFound {
                entity: EntityKind::Board,
                id: id.as_uuid(),
            })?;
        update.apply(&mut board, chrono::Utc::now());

        self.conn()?
            .execute(
                "UPDATE boards SET name = $2, description = $3, updated_at = $4 WHERE id = $1",
                &[&id.as_uuid(), &board.name, &board.description, &board.updated_at],
            )
            .await
            .map_err(storage_error)?;
        Ok(board)
    }

    async fn update_column(
        &mut self,
        id: ColumnId,
        update: &ColumnUpdate,
    ) -> StorageResult<Column> {
        let mut column = self
            .lock_columns(&[id])
            .await?
            .into_iter()
            .next()
            .ok_or(StorageError::NotFound {
                entity: EntityKind::Column,
                id: id.as_uuid(),
            })?;
        update.apply(&mut column, chrono::Utc::now());

        self.conn()?
            .execute(
                "UPDATE board_columns SET name = $2, updated_at = $3 WHERE id = $1",
                &[&id.as_uuid(), &column.name, &column.updated_at],
            )
            .await
            .map_err(storage_error)?;
        Ok(column)
    }

    async fn update_task(&mut self, id: TaskId, update: &TaskUpdate) -> StorageResult<Task> {
        let mut task = self
            .select_task_for_update(id)
            .await?
            .ok_or(StorageError::NotFound {
                entity: EntityKind::Task,
                id: id.as_uuid(),
            })?;
        update.apply(&mut task, chrono::Utc::now());

        let assignee = task.assignee_id.map(|a| a.as_uuid());
        self.conn()?
            .execute(
                "UPDATE tasks SET title = $2, description = $3, label = $4, priority = $5, \
                 due_date = $6, assignee_id = $7, updated_at = $8 WHERE id = $1",
                &[
                    &id.as_uuid(),
                    &task.title,
                    &task.description,
                    &task.label,
                    &task.priority.as_str(),
                    &task.due_date,
                    &assignee,
                    &task.updated_at,
                ],
            )
            .await
            .map_err(storage_error)?;
        Ok(task)
    }

    async fn delete_board(&mut self, id: BoardId) -> StorageResult<()> {
        let affected = self
            .conn()?
            .execute("DELETE FROM boards WHERE id = $1", &[&id.as_uuid()])
            .await
            .map_err(storage_error)?;
        Self::expect_one(affected, EntityKind::Board, id.as_uuid())
    }

    async fn delete_column(&mut self, id: ColumnId) -> StorageResult<()> {
        let affected = self
            .conn()?
            .execute("DELETE FROM board_columns WHERE id = $1", &[&id.as_uuid()])
            .await
            .map_err(storage_error)?;
        Self::expect_one(affected, EntityKind::Column, id.as_uuid())
    }

    async fn delete_task(&mut self, id: TaskId) -> StorageResult<()> {
        let affected = self
            .conn()?
            .execute("DELETE FROM tasks WHERE id = $1", &[&id.as_uuid()])
            .await
            .map_err(storage_error)?;
        Self::expect_one(affected, EntityKind::Task, id.as_uuid())
    }

    async fn commit(self: Box<Self>) -> StorageResult<()> {
        self.finish("COMMIT").await
    }

    async fn rollback(self: Box<Self>) -> StorageResult<()> {
        self.finish("ROLLBACK").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DbConfig::default();
        assert_eq!(config.port, 5432);
        assert_eq!(config.dbname, "kanban");
        assert_eq!(config.max_size, 16);
    }

    #[test]
    fn test_schema_declares_all_tables() {
        for table in ["boards", "board_columns", "tasks"] {
            assert!(
                SCHEMA_SQL.contains(&format!("CREATE TABLE IF NOT EXISTS {}", table)),
                "missing table {}",
                table
            );
        }
        assert!(SCHEMA_SQL.contains("ON DELETE CASCADE"));
    }

    #[tokio::test]
    async fn test_create_pool_is_lazy() {
        // Pool creation does not connect, so a bogus host is fine here.
        let config = DbConfig {
            host: "db.invalid".to_string(),
            ..DbConfig::default()
        };
        let client = DbClient::from_config(&config).expect("pool");
        assert_eq!(client.pool_size(), 0);
    }
}
