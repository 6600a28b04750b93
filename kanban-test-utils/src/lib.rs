//! Kanban Test Utilities
//!
//! Shared test infrastructure for the workspace:
//! - Proptest generators for entities and move sequences
//! - Fixtures that build boards with a given shape
//! - Assertions over order contiguity

// Re-export the in-memory store from its source crate
pub use kanban_storage::MemoryStore;

pub use kanban_core::{
    Board, BoardId, BoardView, Column, ColumnId, ColumnView, KanbanError, KanbanResult, Order,
    Priority, Task, TaskId, Timestamp, UserId,
};

use chrono::Utc;

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for kanban values.

    use super::*;
    use proptest::prelude::*;
    use uuid::Uuid;

    pub fn arb_user_id() -> impl Strategy<Value = UserId> {
        any::<[u8; 16]>().prop_map(|bytes| UserId::from_uuid(Uuid::from_bytes(bytes)))
    }

    pub fn arb_priority() -> impl Strategy<Value = Priority> {
        prop_oneof![
            Just(Priority::Low),
            Just(Priority::Medium),
            Just(Priority::High),
        ]
    }

    /// Non-blank titles, possibly padded with whitespace.
    pub fn arb_title() -> impl Strategy<Value = String> {
        "[ ]{0,2}[A-Za-z0-9][A-Za-z0-9 ]{0,30}"
    }

    /// Column sizes for a board with one to four columns.
    pub fn arb_board_shape() -> impl Strategy<Value = Vec<usize>> {
        prop::collection::vec(0usize..6, 1..5)
    }

    /// One step of a randomized session against a single board.
    ///
    /// Picks are resolved against the current board state with
    /// [`prop::sample::Index`], so every step stays meaningful however the
    /// board has changed.
    #[derive(Debug, Clone)]
    pub enum BoardOp {
        Create {
            column: prop::sample::Index,
        },
        Move {
            task: prop::sample::Index,
            column: prop::sample::Index,
            index: usize,
        },
        Delete {
            task: prop::sample::Index,
        },
        Compact {
            column: prop::sample::Index,
        },
    }

    pub fn arb_board_op() -> impl Strategy<Value = BoardOp> {
        prop_oneof![
            2 => any::<prop::sample::Index>().prop_map(|column| BoardOp::Create { column }),
            5 => (any::<prop::sample::Index>(), any::<prop::sample::Index>(), 0usize..8)
                .prop_map(|(task, column, index)| BoardOp::Move { task, column, index }),
            1 => any::<prop::sample::Index>().prop_map(|task| BoardOp::Delete { task }),
            1 => any::<prop::sample::Index>().prop_map(|column| BoardOp::Compact { column }),
        ]
    }

    pub fn arb_board_ops(max_len: usize) -> impl Strategy<Value = Vec<BoardOp>> {
        prop::collection::vec(arb_board_op(), 1..max_len.max(2))
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built entities for tests that do not go through a store.

    use super::*;

    pub fn board(owner: UserId, name: &str) -> Board {
        let now = Utc::now();
        Board {
            id: BoardId::now_v7(),
            name: name.to_string(),
            description: None,
            owner_id: owner,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn column(board_id: BoardId, name: &str, order: Order) -> Column {
        let now = Utc::now();
        Column {
            id: ColumnId::now_v7(),
            board_id,
            name: name.to_string(),
            order,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn task(column_id: ColumnId, author: UserId, title: &str, order: Order) -> Task {
        let now = Utc::now();
        Task {
            id: TaskId::now_v7(),
            column_id,
            title: title.to_string(),
            description: None,
            label: None,
            priority: Priority::default(),
            due_date: None,
            order,
            assignee_id: None,
            author_id: author,
            created_at: now,
            updated_at: now,
        }
    }

    /// A board whose columns hold `sizes[i]` tasks each, titled `c{i}t{j}`,
    /// with contiguous orders.
    pub fn board_view(owner: UserId, sizes: &[usize]) -> BoardView {
        let board = board(owner, kanban_core::MAIN_BOARD_NAME);
        let mut columns = Vec::with_capacity(sizes.len());
        let mut tasks = Vec::new();
        for (ci, size) in sizes.iter().enumerate() {
            let col = column(board.id, &format!("Column {}", ci), order(ci));
            for ti in 0..*size {
                tasks.push(task(col.id, owner, &format!("c{}t{}", ci, ti), order(ti)));
            }
            columns.push(col);
        }
        BoardView::assemble(board, columns, tasks)
    }

    fn order(index: usize) -> Order {
        kanban_core::order::to_order(index)
    }
}

// ============================================================================
// ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions over board ordering.

    use super::*;
    use kanban_core::order::is_contiguous;

    /// Assert that every column's task orders and the board's column orders
    /// are exactly `0..n-1`.
    #[track_caller]
    pub fn assert_board_contiguous(view: &BoardView) {
        assert!(
            is_contiguous(view.columns.iter().map(|c| c.column.order)),
            "column orders are not contiguous: {:?}",
            view.columns.iter().map(|c| c.column.order).collect::<Vec<_>>()
        );
        for column in &view.columns {
            assert_column_contiguous(column);
        }
    }

    #[track_caller]
    pub fn assert_column_contiguous(column: &ColumnView) {
        let orders: Vec<Order> = column.tasks.iter().map(|t| t.order).collect();
        assert!(
            is_contiguous(orders.iter().copied()),
            "column '{}' has non-contiguous orders: {:?}",
            column.column.name,
            orders
        );
    }

    /// Assert that a result failed with `NotFound`.
    #[track_caller]
    pub fn assert_not_found<T: std::fmt::Debug>(result: &KanbanResult<T>) {
        match result {
            Err(KanbanError::NotFound { .. }) => {}
            other => panic!("Expected NotFound, got: {:?}", other),
        }
    }

    /// Assert that a result failed with `Forbidden`.
    #[track_caller]
    pub fn assert_forbidden<T: std::fmt::Debug>(result: &KanbanResult<T>) {
        match result {
            Err(KanbanError::Forbidden { .. }) => {}
            other => panic!("Expected Forbidden, got: {:?}", other),
        }
    }

    /// Titles of a column's tasks in display order.
    pub fn titles(column: &ColumnView) -> Vec<&str> {
        column.tasks.iter().map(|t| t.title.as_str()).collect()
    }
}
