//! Board and column operations

use chrono::Utc;
use kanban_core::order::next_order;
use kanban_core::validation::{optional_text, require_name};
use kanban_core::{
    Board, BoardId, BoardView, Column, ColumnId, EntityKind, KanbanError, KanbanResult, UserId,
    DEFAULT_COLUMNS, MAIN_BOARD_NAME,
};
use kanban_storage::{BoardUpdate, ColumnUpdate, UnitOfWork};
use tracing::info;

use super::{finish, BoardService};

impl BoardService {
    // ========================================================================
    // BOARDS
    // ========================================================================

    /// The caller's first board, created with the default columns when the
    /// caller has none yet.
    #[tracing::instrument(skip(self), err)]
    pub async fn get_main_board(&self, user: UserId) -> KanbanResult<BoardView> {
        let boards = self.store.list_boards_for_owner(user).await?;
        match boards.first() {
            Some(board) => self.load_view(board.id).await,
            None => {
                info!(%user, "Creating main board");
                self.create_board(user, MAIN_BOARD_NAME, None).await
            }
        }
    }

    #[tracing::instrument(skip(self), err)]
    pub async fn list_boards(&self, user: UserId) -> KanbanResult<Vec<Board>> {
        Ok(self.store.list_boards_for_owner(user).await?)
    }

    /// Create a board seeded with the default columns.
    #[tracing::instrument(skip(self, description), err)]
    pub async fn create_board(
        &self,
        user: UserId,
        name: &str,
        description: Option<String>,
    ) -> KanbanResult<BoardView> {
        let name = require_name("name", name)?;
        let now = Utc::now();
        let board = Board {
            id: BoardId::now_v7(),
            name,
            description: optional_text(description),
            owner_id: user,
            created_at: now,
            updated_at: now,
        };
        let columns: Vec<Column> = DEFAULT_COLUMNS
            .iter()
            .zip(0..)
            .map(|(name, order)| Column {
                id: ColumnId::now_v7(),
                board_id: board.id,
                name: (*name).to_string(),
                order,
                created_at: now,
                updated_at: now,
            })
            .collect();

        let mut unit = self.store.begin().await?;
        let result = insert_board_with_columns(unit.as_mut(), &board, &columns).await;
        finish(unit, result).await?;

        info!(board_id = %board.id, "Board created");
        Ok(BoardView::assemble(board, columns, Vec::new()))
    }

    /// The board with nested columns and tasks in display order.
    #[tracing::instrument(skip(self), err)]
    pub async fn get_board(&self, user: UserId, id: BoardId) -> KanbanResult<BoardView> {
        self.authorize_board(user, id).await?;
        self.load_view(id).await
    }

    #[tracing::instrument(skip(self, update), err)]
    pub async fn update_board(
        &self,
        user: UserId,
        id: BoardId,
        mut update: BoardUpdate,
    ) -> KanbanResult<Board> {
        if let Some(name) = &update.name {
            update.name = Some(require_name("name", name)?);
        }
        if let Some(description) = update.description.take() {
            update.description = Some(optional_text(description));
        }
        let board = self.authorize_board(user, id).await?;
        if update.is_empty() {
            return Ok(board);
        }

        let mut unit = self.store.begin().await?;
        let result = unit.update_board(id, &update).await.map_err(Into::into);
        let board = finish(unit, result).await?;

        info!(board_id = %id, "Board updated");
        Ok(board)
    }

    /// Delete a board with all of its columns and tasks.
    #[tracing::instrument(skip(self), err)]
    pub async fn delete_board(&self, user: UserId, id: BoardId) -> KanbanResult<()> {
        self.authorize_board(user, id).await?;

        let mut unit = self.store.begin().await?;
        let result = unit.delete_board(id).await.map_err(Into::into);
        finish(unit, result).await?;

        info!(board_id = %id, "Board deleted");
        Ok(())
    }

    // ========================================================================
    // COLUMNS
    // ========================================================================

    /// Append a column at the end of the board.
    #[tracing::instrument(skip(self), err)]
    pub async fn create_column(
        &self,
        user: UserId,
        board_id: BoardId,
        name: &str,
    ) -> KanbanResult<Column> {
        let name = require_name("name", name)?;
        self.authorize_board(user, board_id).await?;

        let mut unit = self.store.begin().await?;
        let result = append_column(unit.as_mut(), board_id, name).await;
        let column = finish(unit, result).await?;

        info!(column_id = %column.id, %board_id, order = column.order, "Column created");
        Ok(column)
    }

    /// Rename a column.
    #[tracing::instrument(skip(self), err)]
    pub async fn update_column(
        &self,
        user: UserId,
        id: ColumnId,
        name: &str,
    ) -> KanbanResult<Column> {
        let update = ColumnUpdate {
            name: Some(require_name("name", name)?),
        };
        self.authorize_column(user, id).await?;

        let mut unit = self.store.begin().await?;
        let result = unit.update_column(id, &update).await.map_err(Into::into);
        finish(unit, result).await
    }

    /// Delete a column and its tasks. Sibling columns keep their orders.
    #[tracing::instrument(skip(self), err)]
    pub async fn delete_column(&self, user: UserId, id: ColumnId) -> KanbanResult<()> {
        self.with_retry("delete_column", move || async move {
            let (column, _) = self.authorize_column(user, id).await?;
            let mut unit = self.store.begin().await?;
            let result = delete_column_in_unit(unit.as_mut(), id, column.board_id).await;
            finish(unit, result).await
        })
        .await?;

        info!(column_id = %id, "Column deleted");
        Ok(())
    }

    async fn load_view(&self, id: BoardId) -> KanbanResult<BoardView> {
        self.store
            .load_board_view(id)
            .await?
            .ok_or_else(|| KanbanError::not_found(EntityKind::Board, id))
    }
}

async fn insert_board_with_columns(
    unit: &mut dyn UnitOfWork,
    board: &Board,
    columns: &[Column],
) -> KanbanResult<()> {
    unit.insert_board(board).await?;
    for column in columns {
        unit.insert_column(column).await?;
    }
    Ok(())
}

async fn append_column(
    unit: &mut dyn UnitOfWork,
    board_id: BoardId,
    name: String,
) -> KanbanResult<Column> {
    unit.lock_board(board_id)
        .await?
        .ok_or_else(|| KanbanError::not_found(EntityKind::Board, board_id))?;

    let now = Utc::now();
    let column = Column {
        id: ColumnId::now_v7(),
        board_id,
        name,
        order: next_order(unit.max_column_order(board_id).await?),
        created_at: now,
        updated_at: now,
    };
    unit.insert_column(&column).await?;
    Ok(column)
}

/// Board before column, as in `move_column`.
async fn delete_column_in_unit(
    unit: &mut dyn UnitOfWork,
    id: ColumnId,
    board_id: BoardId,
) -> KanbanResult<()> {
    unit.lock_board(board_id)
        .await?
        .ok_or_else(|| KanbanError::not_found(EntityKind::Board, board_id))?;
    if unit.lock_columns(&[id]).await?.is_empty() {
        return Err(KanbanError::not_found(EntityKind::Column, id));
    }
    unit.delete_column(id).await?;
    Ok(())
}
