//! Order maintenance
//!
//! Moves are planned with [`kanban_core::order::plan_move`] and persisted as
//! range-scoped shifts plus one final update, all inside a single unit of
//! work. The affected columns (or, for column moves, the board) are locked
//! before positions are read, so concurrent moves on the same column run one
//! after another. A column whose orders are no longer `0..n-1` (after a
//! delete) is renumbered under the same lock before indexes are resolved.

use kanban_core::order::{clamp_index, compact, plan_move, to_order};
use kanban_core::validation::require_index;
use kanban_core::{
    BoardId, Column, ColumnId, EntityKind, KanbanError, KanbanResult, MovePlan, Order, Placement,
    StorageError, Task, TaskId, UserId,
};
use kanban_storage::UnitOfWork;
use tracing::{debug, info};

use super::{finish, BoardService};

impl BoardService {
    /// Move a task to `new_index` of `new_column_id`.
    ///
    /// A missing or foreign task is `NotFound`; a target column the caller
    /// does not own is `Forbidden`. An index past the end of the destination
    /// appends. Conflicting writers cause the whole move to be retried.
    #[tracing::instrument(skip(self), err)]
    pub async fn move_task(
        &self,
        user: UserId,
        task_id: TaskId,
        new_column_id: ColumnId,
        new_index: Order,
    ) -> KanbanResult<Task> {
        let index = require_index("new_index", new_index)?;
        let task = self
            .with_retry("move_task", move || {
                self.try_move_task(user, task_id, new_column_id, index)
            })
            .await?;

        info!(%task_id, column_id = %task.column_id, order = task.order, "Task moved");
        Ok(task)
    }

    /// Move a column to `new_index` within its board.
    #[tracing::instrument(skip(self), err)]
    pub async fn move_column(
        &self,
        user: UserId,
        column_id: ColumnId,
        new_index: Order,
    ) -> KanbanResult<Column> {
        let index = require_index("new_index", new_index)?;
        let column = self
            .with_retry("move_column", move || {
                self.try_move_column(user, column_id, index)
            })
            .await?;

        info!(%column_id, order = column.order, "Column moved");
        Ok(column)
    }

    /// Renumber a column's tasks to `0..n-1`, keeping their sequence.
    /// Returns how many tasks changed order.
    #[tracing::instrument(skip(self), err)]
    pub async fn compact_column(&self, user: UserId, column_id: ColumnId) -> KanbanResult<usize> {
        self.authorize_column(user, column_id).await?;

        self.with_retry("compact_column", move || async move {
            let mut unit = self.store.begin().await?;
            let result = compact_in_unit(unit.as_mut(), column_id).await;
            finish(unit, result).await
        })
        .await
    }

    async fn try_move_task(
        &self,
        user: UserId,
        task_id: TaskId,
        target: ColumnId,
        index: usize,
    ) -> KanbanResult<Task> {
        let task = self.authorize_task(user, task_id).await?;
        match self.store.find_column_with_board(target).await? {
            Some((_, board)) if board.owner_id == user => {}
            _ => return Err(KanbanError::forbidden("target column is not owned by the caller")),
        }

        let mut unit = self.store.begin().await?;
        let result = move_task_in_unit(unit.as_mut(), task_id, task.column_id, target, index).await;
        finish(unit, result).await
    }

    async fn try_move_column(
        &self,
        user: UserId,
        column_id: ColumnId,
        index: usize,
    ) -> KanbanResult<Column> {
        let (column, _) = self.authorize_column(user, column_id).await?;

        let mut unit = self.store.begin().await?;
        let result = move_column_in_unit(unit.as_mut(), column_id, column.board_id, index).await;
        finish(unit, result).await
    }
}

async fn move_task_in_unit(
    unit: &mut dyn UnitOfWork,
    task_id: TaskId,
    source: ColumnId,
    target: ColumnId,
    index: usize,
) -> KanbanResult<Task> {
    let locked = unit.lock_columns(&[source, target]).await?;
    if !locked.iter().any(|column| column.id == target) {
        return Err(KanbanError::forbidden("target column no longer exists"));
    }

    let mut task = unit
        .find_task(task_id)
        .await?
        .ok_or_else(|| KanbanError::not_found(EntityKind::Task, task_id))?;
    if task.column_id != source {
        return Err(StorageError::Conflict {
            reason: "task changed column before the lock was taken".to_string(),
        }
        .into());
    }

    let source_tasks = dense_task_orders(unit, source).await?;
    let from_index = source_tasks
        .iter()
        .position(|(id, _)| *id == task_id)
        .ok_or_else(|| KanbanError::not_found(EntityKind::Task, task_id))?;
    let siblings = if source == target {
        source_tasks.len() - 1
    } else {
        dense_task_orders(unit, target).await?.len()
    };

    let from = Placement::new(source, to_order(from_index));
    let to = Placement::new(target, clamp_index(index, siblings));
    task.order = from.order;

    let MovePlan::Move { shifts, target: placement } = plan_move(from, to) else {
        debug!(%task_id, "Move is a no-op");
        return Ok(task);
    };

    for shift in &shifts {
        let touched = unit
            .shift_task_orders(shift.parent, shift.range, shift.delta)
            .await?;
        debug!(
            column_id = %shift.parent,
            range = ?shift.range,
            delta = shift.delta,
            touched,
            "Shifted tasks"
        );
    }
    let new_column = (placement.parent != source).then_some(placement.parent);
    unit.update_task_order(task_id, placement.order, new_column)
        .await?;

    task.column_id = placement.parent;
    task.order = placement.order;
    Ok(task)
}

async fn move_column_in_unit(
    unit: &mut dyn UnitOfWork,
    column_id: ColumnId,
    board_id: BoardId,
    index: usize,
) -> KanbanResult<Column> {
    unit.lock_board(board_id)
        .await?
        .ok_or_else(|| KanbanError::not_found(EntityKind::Board, board_id))?;
    let mut column = unit
        .find_column(column_id)
        .await?
        .ok_or_else(|| KanbanError::not_found(EntityKind::Column, column_id))?;

    let entries = unit.list_column_orders(board_id).await?;
    let renumbered = compact(&entries);
    if !renumbered.is_empty() {
        debug!(%board_id, count = renumbered.len(), "Compacting column orders");
        unit.renumber_columns(&renumbered).await?;
    }
    let from_index = entries
        .iter()
        .position(|(id, _)| *id == column_id)
        .ok_or_else(|| KanbanError::not_found(EntityKind::Column, column_id))?;

    let from = Placement::new(board_id, to_order(from_index));
    let to = Placement::new(board_id, clamp_index(index, entries.len() - 1));
    column.order = from.order;

    let MovePlan::Move { shifts, target } = plan_move(from, to) else {
        return Ok(column);
    };
    for shift in &shifts {
        unit.shift_column_orders(shift.parent, shift.range, shift.delta)
            .await?;
    }
    unit.update_column_order(column_id, target.order).await?;

    column.order = target.order;
    Ok(column)
}

async fn compact_in_unit(unit: &mut dyn UnitOfWork, column_id: ColumnId) -> KanbanResult<usize> {
    if unit.lock_columns(&[column_id]).await?.is_empty() {
        return Err(KanbanError::not_found(EntityKind::Column, column_id));
    }
    let entries = unit.list_task_orders(column_id).await?;
    let renumbered = compact(&entries);
    unit.renumber_tasks(&renumbered).await?;
    Ok(renumbered.len())
}

/// A locked column's tasks in display order, renumbered to `0..n-1` first
/// when their orders have gaps or duplicates.
async fn dense_task_orders(
    unit: &mut dyn UnitOfWork,
    column: ColumnId,
) -> KanbanResult<Vec<(TaskId, Order)>> {
    let entries = unit.list_task_orders(column).await?;
    let renumbered = compact(&entries);
    if !renumbered.is_empty() {
        debug!(column_id = %column, count = renumbered.len(), "Compacting task orders");
        unit.renumber_tasks(&renumbered).await?;
    }
    Ok(entries
        .into_iter()
        .enumerate()
        .map(|(index, (id, _))| (id, to_order(index)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::super::test_support::service;
    use super::super::NewTask;
    use super::*;
    use kanban_core::order::is_contiguous;
    use kanban_core::{BoardView, ValidationError};
    use kanban_storage::MemoryStore;
    use kanban_test_utils::assertions::{assert_forbidden, assert_not_found};
    use std::sync::Arc;

    struct Fixture {
        service: BoardService,
        store: MemoryStore,
        user: UserId,
        board: BoardView,
    }

    impl Fixture {
        async fn new() -> Self {
            let (service, store) = service();
            let user = UserId::now_v7();
            let board = service.get_main_board(user).await.expect("main board");
            Self {
                service,
                store,
                user,
                board,
            }
        }

        fn column(&self, index: usize) -> ColumnId {
            self.board.columns[index].column.id
        }

        async fn seed(&self, column: ColumnId, titles: &[&str]) -> Vec<TaskId> {
            let mut ids = Vec::new();
            for title in titles {
                let task = self
                    .service
                    .create_task(self.user, column, NewTask::titled(*title))
                    .await
                    .expect("seed task");
                ids.push(task.id);
            }
            ids
        }

        /// `(title, order)` of a column in display order.
        async fn titles(&self, column: ColumnId) -> Vec<(String, Order)> {
            let view = self
                .service
                .get_board(self.user, self.board.board.id)
                .await
                .expect("board");
            view.column(column)
                .expect("column")
                .tasks
                .iter()
                .map(|t| (t.title.clone(), t.order))
                .collect()
        }
    }

    fn expect(pairs: &[(&str, Order)]) -> Vec<(String, Order)> {
        pairs.iter().map(|(t, o)| (t.to_string(), *o)).collect()
    }

    #[tokio::test]
    async fn test_same_column_forward_move() {
        let fx = Fixture::new().await;
        let column = fx.column(0);
        let ids = fx.seed(column, &["A", "B", "C", "D"]).await;

        fx.service
            .move_task(fx.user, ids[0], column, 2)
            .await
            .expect("move");

        assert_eq!(
            fx.titles(column).await,
            expect(&[("B", 0), ("C", 1), ("A", 2), ("D", 3)])
        );
    }

    #[tokio::test]
    async fn test_same_column_backward_move() {
        let fx = Fixture::new().await;
        let column = fx.column(0);
        let ids = fx.seed(column, &["A", "B", "C", "D"]).await;

        fx.service
            .move_task(fx.user, ids[3], column, 0)
            .await
            .expect("move");

        assert_eq!(
            fx.titles(column).await,
            expect(&[("D", 0), ("A", 1), ("B", 2), ("C", 3)])
        );
    }

    #[tokio::test]
    async fn test_cross_column_move() {
        let fx = Fixture::new().await;
        let (x, y) = (fx.column(0), fx.column(1));
        let xs = fx.seed(x, &["A", "B"]).await;
        fx.seed(y, &["C"]).await;

        let moved = fx
            .service
            .move_task(fx.user, xs[1], y, 0)
            .await
            .expect("move");
        assert_eq!(moved.column_id, y);
        assert_eq!(moved.order, 0);

        assert_eq!(fx.titles(x).await, expect(&[("A", 0)]));
        assert_eq!(fx.titles(y).await, expect(&[("B", 0), ("C", 1)]));
    }

    #[tokio::test]
    async fn test_noop_move_leaves_orders_unchanged() {
        let fx = Fixture::new().await;
        let column = fx.column(0);
        let ids = fx.seed(column, &["A", "B", "C"]).await;
        let before = fx.titles(column).await;

        let task = fx
            .service
            .move_task(fx.user, ids[1], column, 1)
            .await
            .expect("move");
        assert_eq!(task.order, 1);
        assert_eq!(fx.titles(column).await, before);
    }

    #[tokio::test]
    async fn test_index_past_end_appends() {
        let fx = Fixture::new().await;
        let (x, y) = (fx.column(0), fx.column(1));
        let xs = fx.seed(x, &["A", "B", "C"]).await;
        fx.seed(y, &["D"]).await;

        fx.service
            .move_task(fx.user, xs[0], x, 99)
            .await
            .expect("same column");
        assert_eq!(
            fx.titles(x).await,
            expect(&[("B", 0), ("C", 1), ("A", 2)])
        );

        fx.service
            .move_task(fx.user, xs[1], y, 99)
            .await
            .expect("cross column");
        assert_eq!(fx.titles(y).await, expect(&[("D", 0), ("B", 1)]));
        assert_eq!(fx.titles(x).await, expect(&[("C", 0), ("A", 1)]));
    }

    #[tokio::test]
    async fn test_move_into_empty_column() {
        let fx = Fixture::new().await;
        let (x, z) = (fx.column(0), fx.column(2));
        let xs = fx.seed(x, &["A", "B"]).await;

        fx.service
            .move_task(fx.user, xs[0], z, 0)
            .await
            .expect("move");
        assert_eq!(fx.titles(z).await, expect(&[("A", 0)]));
        assert_eq!(fx.titles(x).await, expect(&[("B", 0)]));
    }

    #[tokio::test]
    async fn test_move_after_delete_uses_positions() {
        let fx = Fixture::new().await;
        let column = fx.column(0);
        let ids = fx.seed(column, &["A", "B", "C", "D"]).await;
        fx.service
            .delete_task(fx.user, ids[1])
            .await
            .expect("delete");
        assert_eq!(fx.store.task_orders(column).await, vec![0, 2, 3]);

        // Index 1 is the slot between A and C, whatever the stored orders.
        fx.service
            .move_task(fx.user, ids[3], column, 1)
            .await
            .expect("move");
        assert_eq!(
            fx.titles(column).await,
            expect(&[("A", 0), ("D", 1), ("C", 2)])
        );
    }

    #[tokio::test]
    async fn test_move_to_foreign_column_is_forbidden() {
        let fx = Fixture::new().await;
        let column = fx.column(0);
        let ids = fx.seed(column, &["A", "B"]).await;

        let other_user = UserId::now_v7();
        let foreign = fx
            .service
            .get_main_board(other_user)
            .await
            .expect("other board")
            .columns[0]
            .column
            .id;

        let result = fx.service.move_task(fx.user, ids[0], foreign, 0).await;
        assert_forbidden(&result);
        assert_eq!(fx.titles(column).await, expect(&[("A", 0), ("B", 1)]));
    }

    #[tokio::test]
    async fn test_move_of_foreign_task_is_not_found() {
        let fx = Fixture::new().await;
        let ids = fx.seed(fx.column(0), &["A"]).await;

        let result = fx
            .service
            .move_task(UserId::now_v7(), ids[0], fx.column(1), 0)
            .await;
        assert_not_found(&result);
    }

    #[tokio::test]
    async fn test_negative_index_is_rejected() {
        let fx = Fixture::new().await;
        let ids = fx.seed(fx.column(0), &["A"]).await;

        let err = fx
            .service
            .move_task(fx.user, ids[0], fx.column(0), -1)
            .await
            .expect_err("invalid");
        assert!(matches!(
            err,
            KanbanError::Validation(ValidationError::InvalidValue { .. })
        ));
    }

    #[tokio::test]
    async fn test_conflict_is_retried() {
        let fx = Fixture::new().await;
        let column = fx.column(0);
        let ids = fx.seed(column, &["A", "B", "C"]).await;

        fx.store.inject_conflicts(2);
        fx.service
            .move_task(fx.user, ids[2], column, 0)
            .await
            .expect("move after retries");
        assert_eq!(
            fx.titles(column).await,
            expect(&[("C", 0), ("A", 1), ("B", 2)])
        );
    }

    #[tokio::test]
    async fn test_persistent_conflict_surfaces() {
        let fx = Fixture::new().await;
        let column = fx.column(0);
        let ids = fx.seed(column, &["A", "B", "C"]).await;

        fx.store.inject_conflicts(10);
        let err = fx
            .service
            .move_task(fx.user, ids[2], column, 0)
            .await
            .expect_err("conflict");
        assert_eq!(err, KanbanError::ConcurrencyConflict { attempts: 3 });

        fx.store.inject_conflicts(0);
        assert_eq!(
            fx.titles(column).await,
            expect(&[("A", 0), ("B", 1), ("C", 2)])
        );
    }

    #[tokio::test]
    async fn test_failed_move_is_rolled_back() {
        let fx = Fixture::new().await;
        let (x, y) = (fx.column(0), fx.column(1));
        let xs = fx.seed(x, &["A", "B", "C"]).await;
        fx.seed(y, &["D", "E"]).await;

        // Shifts succeed, the final update fails.
        fx.store.fail_next_task_update();
        let err = fx
            .service
            .move_task(fx.user, xs[0], y, 1)
            .await
            .expect_err("backend failure");
        assert!(matches!(err, KanbanError::Storage(StorageError::Backend { .. })));

        assert_eq!(fx.titles(x).await, expect(&[("A", 0), ("B", 1), ("C", 2)]));
        assert_eq!(fx.titles(y).await, expect(&[("D", 0), ("E", 1)]));
    }

    #[tokio::test]
    async fn test_concurrent_moves_keep_columns_contiguous() {
        let fx = Fixture::new().await;
        let (x, y) = (fx.column(0), fx.column(1));
        let mut ids = fx.seed(x, &["A", "B", "C", "D", "E"]).await;
        ids.extend(fx.seed(y, &["F", "G", "H"]).await);

        let service = Arc::new(fx.service.clone());
        let mut handles = Vec::new();
        for (i, id) in ids.iter().copied().enumerate() {
            let service = Arc::clone(&service);
            let user = fx.user;
            let target = if i % 2 == 0 { x } else { y };
            handles.push(tokio::spawn(async move {
                service.move_task(user, id, target, (i % 3) as Order).await
            }));
        }
        for handle in handles {
            handle.await.expect("join").expect("move");
        }

        let xs = fx.store.task_orders(x).await;
        let ys = fx.store.task_orders(y).await;
        assert!(is_contiguous(xs.iter().copied()), "x: {:?}", xs);
        assert!(is_contiguous(ys.iter().copied()), "y: {:?}", ys);
        assert_eq!(xs.len() + ys.len(), 8);
    }

    #[tokio::test]
    async fn test_move_column() {
        let fx = Fixture::new().await;
        let done = fx.column(2);

        let column = fx
            .service
            .move_column(fx.user, done, 0)
            .await
            .expect("move column");
        assert_eq!(column.order, 0);

        let view = fx
            .service
            .get_board(fx.user, fx.board.board.id)
            .await
            .expect("board");
        let names: Vec<(&str, Order)> = view
            .columns
            .iter()
            .map(|c| (c.column.name.as_str(), c.column.order))
            .collect();
        assert_eq!(names, vec![("Done", 0), ("To Do", 1), ("In Progress", 2)]);
    }

    #[tokio::test]
    async fn test_compact_column() {
        let fx = Fixture::new().await;
        let column = fx.column(0);
        let ids = fx.seed(column, &["A", "B", "C", "D"]).await;
        fx.service.delete_task(fx.user, ids[0]).await.expect("delete");

        let changed = fx
            .service
            .compact_column(fx.user, column)
            .await
            .expect("compact");
        assert_eq!(changed, 3);
        assert_eq!(fx.store.task_orders(column).await, vec![0, 1, 2]);

        let changed = fx
            .service
            .compact_column(fx.user, column)
            .await
            .expect("compact again");
        assert_eq!(changed, 0);
    }
}
