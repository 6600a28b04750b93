//! Service Layer
//!
//! Board, column and task operations on top of a [`BoardStore`]. Every
//! operation takes the calling user and enforces ownership before touching
//! storage. Mutations run inside one unit of work and commit all-or-nothing.

mod board_ops;
mod order_engine;
mod task_ops;

pub use board_ops::*;
pub use order_engine::*;
pub use task_ops::*;

use kanban_core::{
    Board, BoardId, Column, ColumnId, EntityKind, KanbanError, KanbanResult, StorageError, Task,
    TaskId, UserId,
};
use kanban_storage::{BoardStore, UnitOfWork};
use std::future::Future;
use std::sync::Arc;

use crate::config::DEFAULT_MOVE_RETRY_LIMIT;

/// Entry point for board operations.
#[derive(Clone)]
pub struct BoardService {
    store: Arc<dyn BoardStore>,
    retry_limit: u32,
}

impl std::fmt::Debug for BoardService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoardService")
            .field("retry_limit", &self.retry_limit)
            .finish_non_exhaustive()
    }
}

impl BoardService {
    pub fn new(store: Arc<dyn BoardStore>) -> Self {
        Self {
            store,
            retry_limit: DEFAULT_MOVE_RETRY_LIMIT,
        }
    }

    /// Total attempts for order-changing operations that hit a conflict.
    pub fn with_retry_limit(mut self, retry_limit: u32) -> Self {
        self.retry_limit = retry_limit.max(1);
        self
    }

    pub fn retry_limit(&self) -> u32 {
        self.retry_limit
    }

    pub fn store(&self) -> &Arc<dyn BoardStore> {
        &self.store
    }

    // ========================================================================
    // OWNERSHIP
    // ========================================================================

    /// A board owned by `user`. Foreign boards are `Forbidden`.
    pub(crate) async fn authorize_board(&self, user: UserId, id: BoardId) -> KanbanResult<Board> {
        let board = self
            .store
            .find_board(id)
            .await?
            .ok_or_else(|| KanbanError::not_found(EntityKind::Board, id))?;
        if board.owner_id != user {
            return Err(KanbanError::forbidden("board belongs to another user"));
        }
        Ok(board)
    }

    /// A column whose board is owned by `user`.
    pub(crate) async fn authorize_column(
        &self,
        user: UserId,
        id: ColumnId,
    ) -> KanbanResult<(Column, Board)> {
        let (column, board) = self
            .store
            .find_column_with_board(id)
            .await?
            .ok_or_else(|| KanbanError::not_found(EntityKind::Column, id))?;
        if board.owner_id != user {
            return Err(KanbanError::forbidden("column belongs to another user"));
        }
        Ok((column, board))
    }

    /// A task reachable through a board owned by `user`. Tasks of other
    /// users are reported as missing.
    pub(crate) async fn authorize_task(&self, user: UserId, id: TaskId) -> KanbanResult<Task> {
        let not_found = || KanbanError::not_found(EntityKind::Task, id);
        let task = self.store.find_task(id).await?.ok_or_else(not_found)?;
        match self.store.find_column_with_board(task.column_id).await? {
            Some((_, board)) if board.owner_id == user => Ok(task),
            _ => Err(not_found()),
        }
    }

    // ========================================================================
    // UNITS OF WORK
    // ========================================================================

    /// Re-run `attempt` while it fails with a storage conflict, up to the
    /// retry limit. Every attempt starts from a fresh unit of work.
    pub(crate) async fn with_retry<T, F, Fut>(
        &self,
        operation: &'static str,
        mut attempt: F,
    ) -> KanbanResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = KanbanResult<T>>,
    {
        let mut attempts = 1;
        loop {
            match attempt().await {
                Err(KanbanError::Storage(StorageError::Conflict { reason })) => {
                    if attempts >= self.retry_limit {
                        tracing::warn!(operation, attempts, %reason, "Giving up after conflicts");
                        return Err(KanbanError::ConcurrencyConflict { attempts });
                    }
                    tracing::warn!(operation, attempts, %reason, "Conflict, retrying");
                    attempts += 1;
                }
                other => return other,
            }
        }
    }
}

/// Commit `unit` when `result` is a success, otherwise roll it back and
/// surface the original error.
pub(crate) async fn finish<T>(
    unit: Box<dyn UnitOfWork>,
    result: KanbanResult<T>,
) -> KanbanResult<T> {
    match result {
        Ok(value) => {
            unit.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback) = unit.rollback().await {
                tracing::warn!(error = %rollback, "Rollback failed");
            }
            Err(err)
        }
    }
}
