//! Optimistic board mirror
//!
//! A local copy of a board's columns that drag gestures mutate immediately.
//! Every hover rewrites the lists into the state the server will hold once
//! the move is applied, so rendering never waits on the network. The server
//! stays authoritative: after a move is sent the caller reloads the board and
//! hands it to [`BoardMirror::reconcile`].

use kanban_core::order::{array_move, to_order};
use kanban_core::{Board, BoardView, ColumnId, ColumnView, Order, Task, TaskId};

/// What the pointer is over during a drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropTarget {
    /// Another task card; the dragged task takes its slot.
    Task(TaskId),
    /// Empty space inside a column; the dragged task goes to the end.
    Column(ColumnId),
}

/// Drag gesture state.
#[derive(Debug, Clone, PartialEq)]
pub enum DragState {
    Idle,
    Dragging {
        task_id: TaskId,
        /// Columns as they were when the gesture began.
        origin: Vec<ColumnView>,
    },
}

/// The move to send once a gesture ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveCommand {
    pub task_id: TaskId,
    pub new_column_id: ColumnId,
    pub new_index: Order,
}

#[derive(Debug, Clone)]
pub struct BoardMirror {
    board: Board,
    columns: Vec<ColumnView>,
    drag: DragState,
}

impl BoardMirror {
    pub fn new(view: BoardView) -> Self {
        Self {
            board: view.board,
            columns: view.columns,
            drag: DragState::Idle,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn columns(&self) -> &[ColumnView] {
        &self.columns
    }

    pub fn drag_state(&self) -> &DragState {
        &self.drag
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.drag, DragState::Dragging { .. })
    }

    /// The task being dragged, as currently placed in the local lists.
    pub fn active_task(&self) -> Option<&Task> {
        match &self.drag {
            DragState::Idle => None,
            DragState::Dragging { task_id, .. } => self.task(*task_id),
        }
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.locate(id)
            .map(|(ci, ti)| &self.columns[ci].tasks[ti])
    }

    /// `(column index, task index)` of a task in the local lists.
    pub fn locate(&self, id: TaskId) -> Option<(usize, usize)> {
        self.columns.iter().enumerate().find_map(|(ci, column)| {
            column
                .tasks
                .iter()
                .position(|t| t.id == id)
                .map(|ti| (ci, ti))
        })
    }

    fn column_index(&self, id: ColumnId) -> Option<usize> {
        self.columns.iter().position(|c| c.column.id == id)
    }

    // ========================================================================
    // GESTURE
    // ========================================================================

    /// Begin dragging `task_id`. Unknown tasks are ignored.
    pub fn drag_start(&mut self, task_id: TaskId) -> bool {
        if self.locate(task_id).is_none() {
            return false;
        }
        self.drag = DragState::Dragging {
            task_id,
            origin: self.columns.clone(),
        };
        true
    }

    /// Move `active` to where `over` sits in the local lists.
    ///
    /// Returns whether the lists changed. Hovering a task over itself and
    /// unknown ids are no-ops.
    pub fn drag_over(&mut self, active: TaskId, over: DropTarget) -> bool {
        if over == DropTarget::Task(active) {
            return false;
        }
        let Some((from_ci, from_ti)) = self.locate(active) else {
            return false;
        };
        let to_ci = match over {
            DropTarget::Task(id) => self.locate(id).map(|(ci, _)| ci),
            DropTarget::Column(id) => self.column_index(id),
        };
        let Some(to_ci) = to_ci else {
            return false;
        };
        let to_ti = match over {
            DropTarget::Task(id) => self.columns[to_ci].tasks.iter().position(|t| t.id == id),
            DropTarget::Column(_) => None,
        }
        .unwrap_or(self.columns[to_ci].tasks.len());

        if !self.is_dragging() {
            self.drag_start(active);
        }

        if from_ci == to_ci {
            let len = self.columns[to_ci].tasks.len();
            if from_ti == to_ti || (to_ti >= len && from_ti + 1 == to_ti) {
                return false;
            }
            array_move(&mut self.columns[from_ci].tasks, from_ti, to_ti);
            renumber(&mut self.columns[from_ci]);
        } else {
            let mut task = self.columns[from_ci].tasks.remove(from_ti);
            task.column_id = self.columns[to_ci].column.id;
            let to_ti = to_ti.min(self.columns[to_ci].tasks.len());
            self.columns[to_ci].tasks.insert(to_ti, task);
            renumber(&mut self.columns[from_ci]);
            renumber(&mut self.columns[to_ci]);
        }
        true
    }

    /// Finish the gesture and produce the move to send.
    ///
    /// The final column and index are read from the local lists, which the
    /// hovers have already rearranged. Dropping outside any target (`None`)
    /// sends nothing and restores the lists to their pre-drag state. The
    /// mirror is `Idle` afterwards in every case.
    pub fn drag_end(&mut self, active: TaskId, over: Option<DropTarget>) -> Option<MoveCommand> {
        let drag = std::mem::replace(&mut self.drag, DragState::Idle);
        if over.is_none() {
            if let DragState::Dragging { origin, .. } = drag {
                self.columns = origin;
            }
            return None;
        }

        let (ci, ti) = self.locate(active)?;
        Some(MoveCommand {
            task_id: active,
            new_column_id: self.columns[ci].column.id,
            new_index: to_order(ti),
        })
    }

    /// Abandon the gesture and restore the lists captured at drag start.
    pub fn drag_cancel(&mut self) {
        if let DragState::Dragging { origin, .. } =
            std::mem::replace(&mut self.drag, DragState::Idle)
        {
            self.columns = origin;
        }
    }

    // ========================================================================
    // SERVER STATE
    // ========================================================================

    /// Replace the local lists with authoritative state.
    ///
    /// A gesture in progress keeps going, but a later cancel restores to the
    /// new state rather than the stale snapshot.
    pub fn reconcile(&mut self, view: BoardView) {
        self.board = view.board;
        self.columns = view.columns;
        if let DragState::Dragging { origin, .. } = &mut self.drag {
            *origin = self.columns.clone();
        }
    }

    /// Snapshot of the local state as a board view.
    pub fn to_view(&self) -> BoardView {
        BoardView {
            board: self.board.clone(),
            columns: self.columns.clone(),
        }
    }

    /// Columns with only the tasks whose title, description or label
    /// contains `query`, case-insensitively. A blank query keeps every task.
    pub fn filtered(&self, query: &str) -> Vec<ColumnView> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.columns.clone();
        }
        self.columns
            .iter()
            .map(|column| ColumnView {
                column: column.column.clone(),
                tasks: column
                    .tasks
                    .iter()
                    .filter(|task| matches_query(task, &needle))
                    .cloned()
                    .collect(),
            })
            .collect()
    }
}

fn matches_query(task: &Task, needle: &str) -> bool {
    let contains = |text: &str| text.to_lowercase().contains(needle);
    contains(&task.title)
        || task.description.as_deref().is_some_and(contains)
        || task.label.as_deref().is_some_and(contains)
}

/// Write list positions into the `order` fields.
fn renumber(column: &mut ColumnView) {
    for (index, task) in column.tasks.iter_mut().enumerate() {
        task.order = to_order(index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kanban_core::UserId;
    use kanban_test_utils::assertions::{assert_board_contiguous, titles};
    use kanban_test_utils::fixtures;

    fn mirror(sizes: &[usize]) -> BoardMirror {
        BoardMirror::new(fixtures::board_view(UserId::now_v7(), sizes))
    }

    fn task_at(m: &BoardMirror, ci: usize, ti: usize) -> TaskId {
        m.columns()[ci].tasks[ti].id
    }

    fn column_at(m: &BoardMirror, ci: usize) -> ColumnId {
        m.columns()[ci].column.id
    }

    #[test]
    fn test_same_column_hover_is_array_move() {
        let mut m = mirror(&[4]);
        let a = task_at(&m, 0, 0);
        let c = task_at(&m, 0, 2);

        assert!(m.drag_start(a));
        assert!(m.drag_over(a, DropTarget::Task(c)));
        assert_eq!(titles(&m.columns()[0]), vec!["c0t1", "c0t2", "c0t0", "c0t3"]);
        assert_board_contiguous(&m.to_view());
    }

    #[test]
    fn test_cross_column_hover_inserts_at_target() {
        let mut m = mirror(&[2, 2]);
        let a = task_at(&m, 0, 0);
        let target = task_at(&m, 1, 1);

        m.drag_start(a);
        assert!(m.drag_over(a, DropTarget::Task(target)));
        assert_eq!(titles(&m.columns()[0]), vec!["c0t1"]);
        assert_eq!(titles(&m.columns()[1]), vec!["c1t0", "c0t0", "c1t1"]);
        assert_eq!(m.task(a).map(|t| t.column_id), Some(column_at(&m, 1)));
        assert_board_contiguous(&m.to_view());
    }

    #[test]
    fn test_hover_over_column_appends() {
        let mut m = mirror(&[1, 2]);
        let a = task_at(&m, 0, 0);
        let dest = column_at(&m, 1);

        assert!(m.drag_over(a, DropTarget::Column(dest)));
        assert!(m.is_dragging());
        assert_eq!(titles(&m.columns()[1]), vec!["c1t0", "c1t1", "c0t0"]);
        assert!(m.columns()[0].tasks.is_empty());
    }

    #[test]
    fn test_hover_over_empty_column() {
        let mut m = mirror(&[2, 0]);
        let a = task_at(&m, 0, 1);
        let dest = column_at(&m, 1);

        assert!(m.drag_over(a, DropTarget::Column(dest)));
        assert_eq!(titles(&m.columns()[1]), vec!["c0t1"]);
        assert_eq!(m.columns()[1].tasks[0].order, 0);
    }

    #[test]
    fn test_self_hover_and_unknown_ids_are_ignored() {
        let mut m = mirror(&[3]);
        let a = task_at(&m, 0, 0);
        let before = m.to_view();

        assert!(!m.drag_over(a, DropTarget::Task(a)));
        assert!(!m.drag_over(TaskId::now_v7(), DropTarget::Task(a)));
        assert!(!m.drag_over(a, DropTarget::Task(TaskId::now_v7())));
        assert!(!m.drag_over(a, DropTarget::Column(ColumnId::now_v7())));
        assert!(!m.drag_start(TaskId::now_v7()));
        assert_eq!(m.to_view(), before);
    }

    #[test]
    fn test_drag_end_reports_final_position() {
        let mut m = mirror(&[3, 1]);
        let a = task_at(&m, 0, 0);
        let x = task_at(&m, 1, 0);

        m.drag_start(a);
        m.drag_over(a, DropTarget::Task(x));
        let command = m.drag_end(a, Some(DropTarget::Task(x)));

        assert_eq!(
            command,
            Some(MoveCommand {
                task_id: a,
                new_column_id: column_at(&m, 1),
                new_index: 0,
            })
        );
        assert_eq!(m.drag_state(), &DragState::Idle);
    }

    #[test]
    fn test_drop_outside_restores_origin() {
        let mut m = mirror(&[3, 1]);
        let before = m.to_view();
        let a = task_at(&m, 0, 0);

        m.drag_start(a);
        m.drag_over(a, DropTarget::Column(column_at(&m, 1)));
        assert_eq!(m.drag_end(a, None), None);
        assert_eq!(m.to_view(), before);
        assert!(!m.is_dragging());
    }

    #[test]
    fn test_cancel_restores_snapshot() {
        let mut m = mirror(&[2, 2]);
        let before = m.to_view();
        let a = task_at(&m, 0, 0);

        m.drag_start(a);
        m.drag_over(a, DropTarget::Task(task_at(&m, 1, 0)));
        m.drag_cancel();
        assert_eq!(m.to_view(), before);
        assert_eq!(m.drag_state(), &DragState::Idle);
    }

    #[test]
    fn test_reconcile_overwrites_local_lists() {
        let mut m = mirror(&[2]);
        let a = task_at(&m, 0, 0);
        m.drag_over(a, DropTarget::Column(column_at(&m, 0)));

        let server = fixtures::board_view(UserId::now_v7(), &[1, 1]);
        m.reconcile(server.clone());
        assert_eq!(m.to_view(), server);

        m.drag_cancel();
        assert_eq!(m.to_view(), server);
    }

    #[test]
    fn test_filtered_matches_title_description_and_label() {
        let mut view = fixtures::board_view(UserId::now_v7(), &[3]);
        view.columns[0].tasks[0].title = "Fix login".to_string();
        view.columns[0].tasks[1].description = Some("LOGIN page copy".to_string());
        view.columns[0].tasks[2].label = Some("infra".to_string());
        let m = BoardMirror::new(view);

        let hits = m.filtered("login");
        assert_eq!(hits[0].tasks.len(), 2);
        assert_eq!(m.filtered("INFRA")[0].tasks.len(), 1);
        assert_eq!(m.filtered("  ")[0].tasks.len(), 3);
        assert_eq!(m.columns()[0].tasks.len(), 3);
    }
}
