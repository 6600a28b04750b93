//! Property-Based Tests for Mirror/Engine Agreement
//!
//! A drag gesture applied to the mirror, and the move command it produces
//! applied through the engine's shift plan, must leave every column with the
//! same task sequence and contiguous orders.

use kanban_client::{BoardMirror, DropTarget};
use kanban_core::order::{apply_plan, clamp_index, is_contiguous, plan_move};
use kanban_core::{BoardView, ColumnId, Placement, Task, TaskId, UserId};
use kanban_test_utils::fixtures;
use kanban_test_utils::generators::arb_board_shape;
use proptest::prelude::*;

/// Task ids per column after applying the command through a move plan.
fn engine_sequences(
    view: &BoardView,
    task_id: TaskId,
    column: ColumnId,
    index: i32,
) -> Vec<Vec<TaskId>> {
    let mut tasks: Vec<Task> = view.columns.iter().flat_map(|c| c.tasks.clone()).collect();
    let moved = tasks
        .iter()
        .find(|t| t.id == task_id)
        .cloned()
        .expect("moved task exists");

    let dest_len = tasks.iter().filter(|t| t.column_id == column).count();
    let siblings = if moved.column_id == column { dest_len - 1 } else { dest_len };
    let target = clamp_index(index as usize, siblings);

    let plan = plan_move(
        Placement::new(moved.column_id, moved.order),
        Placement::new(column, target),
    );
    apply_plan(&mut tasks, task_id, &plan);

    view.columns
        .iter()
        .map(|c| {
            let mut in_column: Vec<&Task> = tasks
                .iter()
                .filter(|t| t.column_id == c.column.id)
                .collect();
            in_column.sort_by_key(|t| t.order);
            assert_contiguous(&in_column);
            in_column.iter().map(|t| t.id).collect()
        })
        .collect()
}

fn assert_contiguous(tasks: &[&Task]) {
    assert!(is_contiguous(tasks.iter().map(|t| t.order)));
}

fn task_ids(view: &BoardView) -> Vec<TaskId> {
    view.columns
        .iter()
        .flat_map(|c| c.tasks.iter().map(|t| t.id))
        .collect()
}

fn mirror_sequences(mirror: &BoardMirror) -> Vec<Vec<TaskId>> {
    mirror
        .columns()
        .iter()
        .map(|c| c.tasks.iter().map(|t| t.id).collect())
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_mirror_matches_engine(
        shape in arb_board_shape(),
        pick in any::<prop::sample::Index>(),
        dest in any::<prop::sample::Index>(),
        over_task in any::<bool>(),
        over_pick in any::<prop::sample::Index>(),
    ) {
        let view = fixtures::board_view(UserId::now_v7(), &shape);
        let all = task_ids(&view);
        prop_assume!(!all.is_empty());

        let active = all[pick.index(all.len())];
        let dest_column = &view.columns[dest.index(view.columns.len())];
        let target = if over_task && !dest_column.tasks.is_empty() {
            DropTarget::Task(dest_column.tasks[over_pick.index(dest_column.tasks.len())].id)
        } else {
            DropTarget::Column(dest_column.column.id)
        };

        let mut mirror = BoardMirror::new(view.clone());
        prop_assert!(mirror.drag_start(active));
        mirror.drag_over(active, target);
        let command = mirror.drag_end(active, Some(target));
        let command = command.expect("drop on a target yields a command");

        let expected = engine_sequences(
            &view,
            command.task_id,
            command.new_column_id,
            command.new_index,
        );
        prop_assert_eq!(mirror_sequences(&mirror), expected);

        for column in mirror.columns() {
            prop_assert!(is_contiguous(column.tasks.iter().map(|t| t.order)));
        }
    }

    /// Cancelling any hover sequence leaves the board exactly as loaded.
    #[test]
    fn prop_cancel_restores_board(
        shape in arb_board_shape(),
        hovers in prop::collection::vec(
            (any::<prop::sample::Index>(), any::<prop::sample::Index>()),
            1..6,
        ),
        pick in any::<prop::sample::Index>(),
    ) {
        let view = fixtures::board_view(UserId::now_v7(), &shape);
        let all = task_ids(&view);
        prop_assume!(!all.is_empty());

        let active = all[pick.index(all.len())];
        let mut mirror = BoardMirror::new(view.clone());
        mirror.drag_start(active);
        for (column, task) in hovers {
            let dest = &mirror.columns()[column.index(mirror.columns().len())];
            let target = if dest.tasks.is_empty() {
                DropTarget::Column(dest.column.id)
            } else {
                DropTarget::Task(dest.tasks[task.index(dest.tasks.len())].id)
            };
            mirror.drag_over(active, target);
        }
        mirror.drag_cancel();
        prop_assert_eq!(mirror.to_view(), view);
    }
}
