//! Property-Based Tests for the Order Maintenance Engine
//!
//! Random sequences of creates, moves, deletes and compactions run against
//! the service over the in-memory store. After every step the persisted
//! sequence of each column must match a plain `Vec` model, and any column a
//! move touched must hold orders `0..n-1`.

use std::sync::Arc;

use kanban_api::{BoardService, NewTask};
use kanban_core::order::{clamp_index, is_contiguous};
use kanban_core::{BoardView, ColumnId, Priority, TaskId, UserId};
use kanban_storage::MemoryStore;
use kanban_test_utils::assertions::{assert_column_contiguous, assert_forbidden};
use kanban_test_utils::generators::{arb_board_ops, arb_priority, arb_title, arb_user_id, BoardOp};
use proptest::prelude::*;
use tokio::runtime::Runtime;

// ============================================================================
// TEST CONFIGURATION
// ============================================================================

fn test_runtime() -> Result<Runtime, TestCaseError> {
    Runtime::new().map_err(|e| TestCaseError::fail(format!("Failed to create runtime: {}", e)))
}

fn fail(context: &str, e: impl std::fmt::Display) -> TestCaseError {
    TestCaseError::fail(format!("{}: {}", context, e))
}

/// Column sequences as task ids, in display order.
fn sequences(view: &BoardView) -> Vec<Vec<TaskId>> {
    view.columns
        .iter()
        .map(|c| c.tasks.iter().map(|t| t.id).collect())
        .collect()
}

fn column_is_contiguous(view: &BoardView, column: ColumnId) -> bool {
    view.column(column)
        .map(|c| is_contiguous(c.tasks.iter().map(|t| t.order)))
        .unwrap_or(false)
}

async fn run_session(ops: Vec<BoardOp>) -> Result<(), TestCaseError> {
    let service = BoardService::new(Arc::new(MemoryStore::new()));
    let user = UserId::now_v7();

    let view = service.get_main_board(user).await.map_err(|e| fail("main board", e))?;
    let columns: Vec<ColumnId> = view.columns.iter().map(|c| c.column.id).collect();
    let mut model: Vec<Vec<TaskId>> = vec![Vec::new(); columns.len()];
    let mut created = 0usize;

    for op in ops {
        let mut touched: Vec<ColumnId> = Vec::new();

        match op {
            BoardOp::Create { column } => {
                let ci = column.index(columns.len());
                created += 1;
                let task = service
                    .create_task(user, columns[ci], NewTask::titled(format!("task {}", created)))
                    .await
                    .map_err(|e| fail("create", e))?;
                model[ci].push(task.id);
            }
            BoardOp::Move {
                task,
                column,
                index,
            } => {
                let all: Vec<(usize, TaskId)> = model
                    .iter()
                    .enumerate()
                    .flat_map(|(ci, ids)| ids.iter().map(move |id| (ci, *id)))
                    .collect();
                if all.is_empty() {
                    continue;
                }
                let (from_ci, task_id) = all[task.index(all.len())];
                let to_ci = column.index(columns.len());

                model[from_ci].retain(|id| *id != task_id);
                let landing = clamp_index(index, model[to_ci].len()) as usize;
                model[to_ci].insert(landing, task_id);

                let moved = service
                    .move_task(user, task_id, columns[to_ci], index as i32)
                    .await
                    .map_err(|e| fail("move", e))?;
                prop_assert_eq!(moved.column_id, columns[to_ci]);
                prop_assert_eq!(moved.order as usize, landing);
                touched.push(columns[from_ci]);
                touched.push(columns[to_ci]);
            }
            BoardOp::Delete { task } => {
                let all: Vec<(usize, TaskId)> = model
                    .iter()
                    .enumerate()
                    .flat_map(|(ci, ids)| ids.iter().map(move |id| (ci, *id)))
                    .collect();
                if all.is_empty() {
                    continue;
                }
                let (ci, task_id) = all[task.index(all.len())];
                model[ci].retain(|id| *id != task_id);
                service
                    .delete_task(user, task_id)
                    .await
                    .map_err(|e| fail("delete", e))?;
            }
            BoardOp::Compact { column } => {
                let ci = column.index(columns.len());
                service
                    .compact_column(user, columns[ci])
                    .await
                    .map_err(|e| fail("compact", e))?;
                touched.push(columns[ci]);
            }
        }

        let view = service.get_main_board(user).await.map_err(|e| fail("reload", e))?;
        prop_assert_eq!(sequences(&view), model.clone());
        for column in touched {
            prop_assert!(
                column_is_contiguous(&view, column),
                "column {} lost contiguity",
                column
            );
        }
    }

    Ok(())
}

/// Appends titled tasks to the owner's first column, then checks placement,
/// trimming, and that nobody else can append there.
async fn run_appends(
    owner: UserId,
    stranger: UserId,
    entries: Vec<(String, Priority)>,
) -> Result<(), TestCaseError> {
    let service = BoardService::new(Arc::new(MemoryStore::new()));
    let view = service.get_main_board(owner).await.map_err(|e| fail("main board", e))?;
    let column = view.columns[0].column.id;

    for (i, (title, priority)) in entries.iter().enumerate() {
        let task = service
            .create_task(
                owner,
                column,
                NewTask {
                    title: title.clone(),
                    priority: Some(*priority),
                    ..NewTask::default()
                },
            )
            .await
            .map_err(|e| fail("create", e))?;
        prop_assert_eq!(task.order as usize, i);
        prop_assert_eq!(task.title.as_str(), title.trim());
        prop_assert_eq!(task.priority, *priority);
    }

    if stranger != owner {
        let result = service
            .create_task(stranger, column, NewTask::titled("intruder"))
            .await;
        assert_forbidden(&result);
    }

    let view = service.get_main_board(owner).await.map_err(|e| fail("reload", e))?;
    let first = view.column(column).ok_or_else(|| fail("column", "missing"))?;
    prop_assert_eq!(first.tasks.len(), entries.len());
    assert_column_contiguous(first);
    Ok(())
}

// ============================================================================
// PROPERTIES
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Persisted column sequences always match list surgery on a model.
    #[test]
    fn prop_engine_matches_list_model(ops in arb_board_ops(24)) {
        let rt = test_runtime()?;
        rt.block_on(run_session(ops))?;
    }

    /// Created tasks land at the end of the column with trimmed titles.
    #[test]
    fn prop_create_task_appends(
        owner in arb_user_id(),
        stranger in arb_user_id(),
        entries in prop::collection::vec((arb_title(), arb_priority()), 1..8),
    ) {
        let rt = test_runtime()?;
        rt.block_on(run_appends(owner, stranger, entries))?;
    }
}
