//! In-memory store for tests and local development.

use crate::{BoardStore, BoardUpdate, ColumnUpdate, TaskUpdate, UnitOfWork};
use async_trait::async_trait;
use chrono::Utc;
use kanban_core::{
    Board, BoardId, BoardView, Column, ColumnId, EntityKind, Order, OrderRange, StorageError,
    StorageResult, Task, TaskId, UserId,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Debug, Clone, Default)]
struct Tables {
    boards: HashMap<BoardId, Board>,
    columns: HashMap<ColumnId, Column>,
    tasks: HashMap<TaskId, Task>,
}

impl Tables {
    fn task_orders(&self, column: ColumnId) -> Vec<(TaskId, Order)> {
        let mut tasks: Vec<&Task> = self
            .tasks
            .values()
            .filter(|t| t.column_id == column)
            .collect();
        tasks.sort_by(|a, b| (a.order, a.created_at, a.id).cmp(&(b.order, b.created_at, b.id)));
        tasks.iter().map(|t| (t.id, t.order)).collect()
    }

    fn column_orders(&self, board: BoardId) -> Vec<(ColumnId, Order)> {
        let mut columns: Vec<&Column> = self
            .columns
            .values()
            .filter(|c| c.board_id == board)
            .collect();
        columns.sort_by(|a, b| (a.order, a.created_at, a.id).cmp(&(b.order, b.created_at, b.id)));
        columns.iter().map(|c| (c.id, c.order)).collect()
    }

    fn board_view(&self, id: BoardId) -> Option<BoardView> {
        let board = self.boards.get(&id)?.clone();
        let columns: Vec<Column> = self
            .columns
            .values()
            .filter(|c| c.board_id == id)
            .cloned()
            .collect();
        let tasks: Vec<Task> = self
            .tasks
            .values()
            .filter(|t| columns.iter().any(|c| c.id == t.column_id))
            .cloned()
            .collect();
        Some(BoardView::assemble(board, columns, tasks))
    }
}

#[derive(Debug, Default)]
struct Faults {
    conflicts: AtomicU32,
    fail_next_task_update: AtomicBool,
}

/// Store backed by hash maps behind one async mutex.
///
/// A unit of work takes the mutex for its whole lifetime and edits a private
/// copy of the tables; commit swaps the copy in. Units are therefore fully
/// serialized, which subsumes per-column locking.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<Tables>>,
    faults: Arc<Faults>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` commits fail with [`StorageError::Conflict`].
    pub fn inject_conflicts(&self, count: u32) {
        self.faults.conflicts.store(count, Ordering::SeqCst);
    }

    /// Make the next `update_task_order` fail with a backend error, so a
    /// unit of work dies halfway through a move.
    pub fn fail_next_task_update(&self) {
        self.faults.fail_next_task_update.store(true, Ordering::SeqCst);
    }

    pub async fn board_count(&self) -> usize {
        self.state.lock().await.boards.len()
    }

    pub async fn column_count(&self) -> usize {
        self.state.lock().await.columns.len()
    }

    pub async fn task_count(&self) -> usize {
        self.state.lock().await.tasks.len()
    }

    /// Current order values of a column's tasks, in display order.
    pub async fn task_orders(&self, column: ColumnId) -> Vec<Order> {
        self.state
            .lock()
            .await
            .task_orders(column)
            .into_iter()
            .map(|(_, order)| order)
            .collect()
    }
}

#[async_trait]
impl BoardStore for MemoryStore {
    async fn find_board(&self, id: BoardId) -> StorageResult<Option<Board>> {
        Ok(self.state.lock().await.boards.get(&id).cloned())
    }

    async fn list_boards_for_owner(&self, owner: UserId) -> StorageResult<Vec<Board>> {
        let state = self.state.lock().await;
        let mut boards: Vec<Board> = state
            .boards
            .values()
            .filter(|b| b.owner_id == owner)
            .cloned()
            .collect();
        boards.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
        Ok(boards)
    }

    async fn find_column_with_board(&self, id: ColumnId) -> StorageResult<Option<(Column, Board)>> {
        let state = self.state.lock().await;
        Ok(state.columns.get(&id).and_then(|column| {
            state
                .boards
                .get(&column.board_id)
                .map(|board| (column.clone(), board.clone()))
        }))
    }

    async fn find_task(&self, id: TaskId) -> StorageResult<Option<Task>> {
        Ok(self.state.lock().await.tasks.get(&id).cloned())
    }

    async fn load_board_view(&self, id: BoardId) -> StorageResult<Option<BoardView>> {
        Ok(self.state.lock().await.board_view(id))
    }

    async fn list_tasks_for_author(&self, author: UserId) -> StorageResult<Vec<Task>> {
        let state = self.state.lock().await;
        let mut tasks: Vec<Task> = state
            .tasks
            .values()
            .filter(|t| t.author_id == author)
            .cloned()
            .collect();
        tasks.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(tasks)
    }

    async fn ping(&self) -> StorageResult<()> {
        Ok(())
    }

    async fn begin(&self) -> StorageResult<Box<dyn UnitOfWork>> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryUnit {
            guard,
            working,
            faults: Arc::clone(&self.faults),
        }))
    }
}

/// Unit of work over [`MemoryStore`].
struct MemoryUnit {
    guard: OwnedMutexGuard<Tables>,
    working: Tables,
    faults: Arc<Faults>,
}

fn not_found(entity: EntityKind, id: impl Into<uuid::Uuid>) -> StorageError {
    StorageError::NotFound {
        entity,
        id: id.into(),
    }
}

#[async_trait]
impl UnitOfWork for MemoryUnit {
    async fn lock_board(&mut self, id: BoardId) -> StorageResult<Option<Board>> {
        Ok(self.working.boards.get(&id).cloned())
    }

    async fn lock_columns(&mut self, ids: &[ColumnId]) -> StorageResult<Vec<Column>> {
        let mut ids = ids.to_vec();
        ids.sort_unstable();
        ids.dedup();
        Ok(ids
            .iter()
            .filter_map(|id| self.working.columns.get(id).cloned())
            .collect())
    }

    async fn find_task(&mut self, id: TaskId) -> StorageResult<Option<Task>> {
        Ok(self.working.tasks.get(&id).cloned())
    }

    async fn find_column(&mut self, id: ColumnId) -> StorageResult<Option<Column>> {
        Ok(self.working.columns.get(&id).cloned())
    }

    async fn list_task_orders(&mut self, column: ColumnId) -> StorageResult<Vec<(TaskId, Order)>> {
        Ok(self.working.task_orders(column))
    }

    async fn list_column_orders(
        &mut self,
        board: BoardId,
    ) -> StorageResult<Vec<(ColumnId, Order)>> {
        Ok(self.working.column_orders(board))
    }

    async fn max_task_order(&mut self, column: ColumnId) -> StorageResult<Option<Order>> {
        Ok(self
            .working
            .tasks
            .values()
            .filter(|t| t.column_id == column)
            .map(|t| t.order)
            .max())
    }

    async fn max_column_order(&mut self, board: BoardId) -> StorageResult<Option<Order>> {
        Ok(self
            .working
            .columns
            .values()
            .filter(|c| c.board_id == board)
            .map(|c| c.order)
            .max())
    }

    async fn shift_task_orders(
        &mut self,
        column: ColumnId,
        range: OrderRange,
        delta: i32,
    ) -> StorageResult<u64> {
        let mut touched = 0;
        for task in self.working.tasks.values_mut() {
            if task.column_id == column && range.contains(task.order) {
                task.order += delta;
                touched += 1;
            }
        }
        Ok(touched)
    }

    async fn shift_column_orders(
        &mut self,
        board: BoardId,
        range: OrderRange,
        delta: i32,
    ) -> StorageResult<u64> {
        let mut touched = 0;
        for column in self.working.columns.values_mut() {
            if column.board_id == board && range.contains(column.order) {
                column.order += delta;
                touched += 1;
            }
        }
        Ok(touched)
    }

    async fn update_task_order(
        &mut self,
        id: TaskId,
        order: Order,
        column: Option<ColumnId>,
    ) -> StorageResult<()> {
        if self.faults.fail_next_task_update.swap(false, Ordering::SeqCst) {
            return Err(StorageError::Backend {
                reason: "injected task update failure".to_string(),
            });
        }
        let task = self
            .working
            .tasks
            .get_mut(&id)
            .ok_or_else(|| not_found(EntityKind::Task, id))?;
        task.order = order;
        if let Some(column) = column {
            task.column_id = column;
        }
        task.updated_at = Utc::now();
        Ok(())
    }

    async fn update_column_order(&mut self, id: ColumnId, order: Order) -> StorageResult<()> {
        let column = self
            .working
            .columns
            .get_mut(&id)
            .ok_or_else(|| not_found(EntityKind::Column, id))?;
        column.order = order;
        column.updated_at = Utc::now();
        Ok(())
    }

    async fn insert_board(&mut self, board: &Board) -> StorageResult<()> {
        if self.working.boards.contains_key(&board.id) {
            return Err(StorageError::InsertFailed {
                entity: EntityKind::Board,
                reason: "already exists".to_string(),
            });
        }
        self.working.boards.insert(board.id, board.clone());
        Ok(())
    }

    async fn insert_column(&mut self, column: &Column) -> StorageResult<()> {
        if !self.working.boards.contains_key(&column.board_id) {
            return Err(StorageError::InsertFailed {
                entity: EntityKind::Column,
                reason: format!("board {} does not exist", column.board_id),
            });
        }
        if self.working.columns.contains_key(&column.id) {
            return Err(StorageError::InsertFailed {
                entity: EntityKind::Column,
                reason: "already exists".to_string(),
            });
        }
        self.working.columns.insert(column.id, column.clone());
        Ok(())
    }

    async fn insert_task(&mut self, task: &Task) -> StorageResult<()> {
        if !self.working.columns.contains_key(&task.column_id) {
            return Err(StorageError::InsertFailed {
                entity: EntityKind::Task,
                reason: format!("column {} does not exist", task.column_id),
            });
        }
        if self.working.tasks.contains_key(&task.id) {
            return Err(StorageError::InsertFailed {
                entity: EntityKind::Task,
                reason: "already exists".to_string(),
            });
        }
        self.working.tasks.insert(task.id, task.clone());
        Ok(())
    }

    async fn update_board(&mut self, id: BoardId, update: &BoardUpdate) -> StorageResult<Board> {
        let board = self
            .working
            .boards
            .get_mut(&id)
            .ok_or_else(|| not_found(EntityKind::Board, id))?;
        update.apply(board, Utc::now());
        Ok(board.clone())
    }

    async fn update_column(
        &mut self,
        id: ColumnId,
        update: &ColumnUpdate,
    ) -> StorageResult<Column> {
        let column = self
            .working
            .columns
            .get_mut(&id)
            .ok_or_else(|| not_found(EntityKind::Column, id))?;
        update.apply(column, Utc::now());
        Ok(column.clone())
    }

    async fn update_task(&mut self, id: TaskId, update: &TaskUpdate) -> StorageResult<Task> {
        let task = self
            .working
            .tasks
            .get_mut(&id)
            .ok_or_else(|| not_found(EntityKind::Task, id))?;
        update.apply(task, Utc::now());
        Ok(task.clone())
    }

    async fn delete_board(&mut self, id: BoardId) -> StorageResult<()> {
        if self.working.boards.remove(&id).is_none() {
            return Err(not_found(EntityKind::Board, id));
        }
        let columns: Vec<ColumnId> = self
            .working
            .columns
            .values()
            .filter(|c| c.board_id == id)
            .map(|c| c.id)
            .collect();
        self.working.columns.retain(|_, c| c.board_id != id);
        self.working
            .tasks
            .retain(|_, t| !columns.contains(&t.column_id));
        Ok(())
    }

    async fn delete_column(&mut self, id: ColumnId) -> StorageResult<()> {
        if self.working.columns.remove(&id).is_none() {
            return Err(not_found(EntityKind::Column, id));
        }
        self.working.tasks.retain(|_, t| t.column_id != id);
        Ok(())
    }

    async fn delete_task(&mut self, id: TaskId) -> StorageResult<()> {
        if self.working.tasks.remove(&id).is_none() {
            return Err(not_found(EntityKind::Task, id));
        }
        Ok(())
    }

    async fn commit(self: Box<Self>) -> StorageResult<()> {
        let pending = self.faults.conflicts.load(Ordering::SeqCst);
        if pending > 0 {
            self.faults.conflicts.store(pending - 1, Ordering::SeqCst);
            tracing::debug!(remaining = pending - 1, "Injected commit conflict");
            return Err(StorageError::Conflict {
                reason: "injected serialization failure".to_string(),
            });
        }
        let MemoryUnit {
            mut guard, working, ..
        } = *self;
        *guard = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> StorageResult<()> {
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
