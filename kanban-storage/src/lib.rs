//! Kanban Storage - Persistence Interface
//!
//! Read operations live on [`BoardStore`]. Every mutation goes through a
//! [`UnitOfWork`]: a transaction that holds per-column locks for its lifetime
//! and is applied all-or-nothing on [`UnitOfWork::commit`]. Dropping a unit
//! without committing discards its writes.

mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use kanban_core::{
    Board, BoardId, BoardView, Column, ColumnId, Order, OrderRange, Priority, StorageError,
    StorageResult, Task, TaskId, Timestamp, UserId,
};

// ============================================================================
// PATCH PAYLOADS
// ============================================================================

/// Partial update for a board. `None` leaves a field untouched; for nullable
/// fields `Some(None)` clears the value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoardUpdate {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
}

/// Partial update for a column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnUpdate {
    pub name: Option<String>,
}

/// Partial update for a task's content fields. Placement changes are not
/// part of this payload; they go through the order operations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub label: Option<Option<String>>,
    pub priority: Option<Priority>,
    pub due_date: Option<Option<Timestamp>>,
    pub assignee_id: Option<Option<UserId>>,
}

impl BoardUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }

    /// Write the present fields onto `board`.
    pub fn apply(&self, board: &mut Board, now: Timestamp) {
        if let Some(name) = &self.name {
            board.name = name.clone();
        }
        if let Some(description) = &self.description {
            board.description = description.clone();
        }
        board.updated_at = now;
    }
}

impl ColumnUpdate {
    pub fn apply(&self, column: &mut Column, now: Timestamp) {
        if let Some(name) = &self.name {
            column.name = name.clone();
        }
        column.updated_at = now;
    }
}

impl TaskUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.label.is_none()
            && self.priority.is_none()
            && self.due_date.is_none()
            && self.assignee_id.is_none()
    }

    /// Write the present fields onto `task`. Placement is untouched.
    pub fn apply(&self, task: &mut Task, now: Timestamp) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(label) = &self.label {
            task.label = label.clone();
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        if let Some(assignee_id) = self.assignee_id {
            task.assignee_id = assignee_id;
        }
        task.updated_at = now;
    }
}

// ============================================================================
// TRAITS
// ============================================================================

/// Read side of the store, and the factory for units of work.
#[async_trait]
pub trait BoardStore: Send + Sync {
    async fn find_board(&self, id: BoardId) -> StorageResult<Option<Board>>;

    /// Boards owned by `owner`, oldest first.
    async fn list_boards_for_owner(&self, owner: UserId) -> StorageResult<Vec<Board>>;

    /// A column together with the board that owns it.
    async fn find_column_with_board(&self, id: ColumnId) -> StorageResult<Option<(Column, Board)>>;

    async fn find_task(&self, id: TaskId) -> StorageResult<Option<Task>>;

    /// The board with nested columns and tasks, sorted for display.
    async fn load_board_view(&self, id: BoardId) -> StorageResult<Option<BoardView>>;

    /// Tasks written by `author`, newest first.
    async fn list_tasks_for_author(&self, author: UserId) -> StorageResult<Vec<Task>>;

    /// Check the backend is reachable.
    async fn ping(&self) -> StorageResult<()>;

    /// Open a unit of work.
    async fn begin(&self) -> StorageResult<Box<dyn UnitOfWork>>;
}

/// A transaction over the store.
#[async_trait]
pub trait UnitOfWork: Send {
    // ========================================================================
    // LOCKING AND READS
    // ========================================================================

    /// Lock a board row so its column sequence can be rewritten.
    async fn lock_board(&mut self, id: BoardId) -> StorageResult<Option<Board>>;

    /// Lock the given columns for the rest of the unit, in ascending id
    /// order. Missing columns are skipped; the locked rows are returned.
    async fn lock_columns(&mut self, ids: &[ColumnId]) -> StorageResult<Vec<Column>>;

    async fn find_task(&mut self, id: TaskId) -> StorageResult<Option<Task>>;

    async fn find_column(&mut self, id: ColumnId) -> StorageResult<Option<Column>>;

    /// `(id, order)` of a column's tasks in display order.
    async fn list_task_orders(&mut self, column: ColumnId) -> StorageResult<Vec<(TaskId, Order)>>;

    /// `(id, order)` of a board's columns in display order.
    async fn list_column_orders(&mut self, board: BoardId)
        -> StorageResult<Vec<(ColumnId, Order)>>;

    async fn max_task_order(&mut self, column: ColumnId) -> StorageResult<Option<Order>>;

    async fn max_column_order(&mut self, board: BoardId) -> StorageResult<Option<Order>>;

    // ========================================================================
    // ORDER UPDATES
    // ========================================================================

    /// `order += delta` for every task of `column` in `range`. Returns the
    /// number of rows touched.
    async fn shift_task_orders(
        &mut self,
        column: ColumnId,
        range: OrderRange,
        delta: i32,
    ) -> StorageResult<u64>;

    /// `order += delta` for every column of `board` in `range`.
    async fn shift_column_orders(
        &mut self,
        board: BoardId,
        range: OrderRange,
        delta: i32,
    ) -> StorageResult<u64>;

    /// Write a task's order, moving it to `column` when given.
    async fn update_task_order(
        &mut self,
        id: TaskId,
        order: Order,
        column: Option<ColumnId>,
    ) -> StorageResult<()>;

    async fn update_column_order(&mut self, id: ColumnId, order: Order) -> StorageResult<()>;

    /// Write a batch of task orders. A row deleted since it was listed is a
    /// [`StorageError::Conflict`].
    async fn renumber_tasks(&mut self, entries: &[(TaskId, Order)]) -> StorageResult<()> {
        for (id, order) in entries {
            self.update_task_order(*id, *order, None)
                .await
                .map_err(vanished_as_conflict)?;
        }
        Ok(())
    }

    /// Write a batch of column orders. Same conflict rule as
    /// [`UnitOfWork::renumber_tasks`].
    async fn renumber_columns(&mut self, entries: &[(ColumnId, Order)]) -> StorageResult<()> {
        for (id, order) in entries {
            self.update_column_order(*id, *order)
                .await
                .map_err(vanished_as_conflict)?;
        }
        Ok(())
    }

    // ========================================================================
    // ENTITY WRITES
    // ========================================================================

    async fn insert_board(&mut self, board: &Board) -> StorageResult<()>;

    async fn insert_column(&mut self, column: &Column) -> StorageResult<()>;

    async fn insert_task(&mut self, task: &Task) -> StorageResult<()>;

    async fn update_board(&mut self, id: BoardId, update: &BoardUpdate) -> StorageResult<Board>;

    async fn update_column(&mut self, id: ColumnId, update: &ColumnUpdate)
        -> StorageResult<Column>;

    async fn update_task(&mut self, id: TaskId, update: &TaskUpdate) -> StorageResult<Task>;

    /// Delete a board with its columns and their tasks.
    async fn delete_board(&mut self, id: BoardId) -> StorageResult<()>;

    /// Delete a column with its tasks. Sibling orders are left as they are.
    async fn delete_column(&mut self, id: ColumnId) -> StorageResult<()>;

    /// Delete a task. Sibling orders are left as they are.
    async fn delete_task(&mut self, id: TaskId) -> StorageResult<()>;

    // ========================================================================
    // COMPLETION
    // ========================================================================

    async fn commit(self: Box<Self>) -> StorageResult<()>;

    async fn rollback(self: Box<Self>) -> StorageResult<()>;
}

/// `NotFound` for a row being renumbered becomes a retryable `Conflict`.
fn vanished_as_conflict(err: StorageError) -> StorageError {
    match err {
        StorageError::NotFound { entity, id } => StorageError::Conflict {
            reason: format!("{:?} {} removed while renumbering", entity, id),
        },
        other => other,
    }
}
