//! Board session: the mirror plus the server it mirrors.
//!
//! Every mutation sent to the server is followed by a reload of the board
//! that overwrites the mirror. A failed move is corrected the same way, by
//! re-syncing from the server rather than undoing locally.

use kanban_api::types::CreateTaskRequest;
use kanban_core::{BoardId, Column, ColumnId, Task, TaskId};
use tracing::{debug, warn};

use crate::api_client::{ApiClientError, BoardApi};
use crate::mirror::{BoardMirror, DropTarget, MoveCommand};

pub struct BoardSession<A: BoardApi> {
    api: A,
    mirror: BoardMirror,
}

impl<A: BoardApi> BoardSession<A> {
    /// Load `board_id`, or the caller's main board, into a new mirror.
    pub async fn open(api: A, board_id: Option<BoardId>) -> Result<Self, ApiClientError> {
        let view = match board_id {
            Some(id) => api.get_board(id).await?,
            None => api.get_main_board().await?,
        };
        Ok(Self {
            api,
            mirror: BoardMirror::new(view),
        })
    }

    pub fn mirror(&self) -> &BoardMirror {
        &self.mirror
    }

    /// Mutable access for gesture handlers (`drag_start`, `drag_over`).
    pub fn mirror_mut(&mut self) -> &mut BoardMirror {
        &mut self.mirror
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn board_id(&self) -> BoardId {
        self.mirror.board().id
    }

    /// Reload the board and overwrite the mirror.
    pub async fn refresh(&mut self) -> Result<(), ApiClientError> {
        let view = self.api.get_board(self.board_id()).await?;
        self.mirror.reconcile(view);
        Ok(())
    }

    /// End a drag gesture and send the resulting move.
    ///
    /// Returns the command that was sent, or `None` when the drop produced
    /// no move. On failure the board is re-synced before the error is
    /// returned. A failed re-sync after a confirmed move is only logged; the
    /// mirror keeps its local state until the next refresh.
    pub async fn drop_task(
        &mut self,
        active: TaskId,
        over: Option<DropTarget>,
    ) -> Result<Option<MoveCommand>, ApiClientError> {
        let Some(command) = self.mirror.drag_end(active, over) else {
            return Ok(None);
        };

        match self.api.move_task(&command).await {
            Ok(()) => {
                debug!(task_id = %command.task_id, "Move confirmed");
                if let Err(refresh_err) = self.refresh().await {
                    warn!(error = %refresh_err, "Re-sync after confirmed move failed");
                }
                Ok(Some(command))
            }
            Err(err) => {
                warn!(task_id = %command.task_id, error = %err, "Failed to move task, re-syncing");
                if let Err(refresh_err) = self.refresh().await {
                    warn!(error = %refresh_err, "Re-sync after failed move also failed");
                }
                Err(err)
            }
        }
    }

    pub async fn create_task(
        &mut self,
        column_id: ColumnId,
        request: &CreateTaskRequest,
    ) -> Result<Task, ApiClientError> {
        let task = self.api.create_task(column_id, request).await?;
        self.refresh().await?;
        Ok(task)
    }

    pub async fn delete_task(&mut self, id: TaskId) -> Result<(), ApiClientError> {
        self.api.delete_task(id).await?;
        self.refresh().await
    }

    pub async fn create_column(&mut self, name: &str) -> Result<Column, ApiClientError> {
        let column = self.api.create_column(self.board_id(), name).await?;
        self.refresh().await?;
        Ok(column)
    }

    pub async fn delete_column(&mut self, id: ColumnId) -> Result<(), ApiClientError> {
        self.api.delete_column(id).await?;
        self.refresh().await
    }
}
