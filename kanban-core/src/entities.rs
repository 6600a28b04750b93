//! Core entity structures

use crate::order::{Placement, Sequenced};
use crate::{BoardId, ColumnId, Order, TaskId, Timestamp, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of entity, used in errors and ownership checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Board,
    Column,
    Task,
}

/// Task priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(format!("unknown priority '{}'", other)),
        }
    }
}

/// Board - owned by one user, holds an ordered set of columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Board {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub id: BoardId,
    pub name: String,
    pub description: Option<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub owner_id: UserId,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub updated_at: Timestamp,
}

/// Column - an ordered lane inside a board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Column {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub id: ColumnId,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub board_id: BoardId,
    pub name: String,
    #[cfg_attr(feature = "openapi", schema(value_type = i32))]
    pub order: Order,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub updated_at: Timestamp,
}

/// Task - a card inside exactly one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Task {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub id: TaskId,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub column_id: ColumnId,
    pub title: String,
    pub description: Option<String>,
    pub label: Option<String>,
    pub priority: Priority,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date-time"))]
    pub due_date: Option<Timestamp>,
    #[cfg_attr(feature = "openapi", schema(value_type = i32))]
    pub order: Order,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "uuid"))]
    pub assignee_id: Option<UserId>,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub author_id: UserId,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub updated_at: Timestamp,
}

impl Sequenced for Task {
    type Id = TaskId;
    type Parent = ColumnId;

    fn sequence_id(&self) -> TaskId {
        self.id
    }

    fn placement(&self) -> Placement<ColumnId> {
        Placement::new(self.column_id, self.order)
    }

    fn set_placement(&mut self, placement: Placement<ColumnId>) {
        self.column_id = placement.parent;
        self.order = placement.order;
    }
}

impl Sequenced for Column {
    type Id = ColumnId;
    type Parent = BoardId;

    fn sequence_id(&self) -> ColumnId {
        self.id
    }

    fn placement(&self) -> Placement<BoardId> {
        Placement::new(self.board_id, self.order)
    }

    fn set_placement(&mut self, placement: Placement<BoardId>) {
        self.board_id = placement.parent;
        self.order = placement.order;
    }
}

// ============================================================================
// NESTED VIEWS
// ============================================================================

/// A column with its tasks in display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ColumnView {
    #[serde(flatten)]
    pub column: Column,
    pub tasks: Vec<Task>,
}

/// A board with its columns and tasks in display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BoardView {
    #[serde(flatten)]
    pub board: Board,
    pub columns: Vec<ColumnView>,
}

impl BoardView {
    /// Assemble a view from flat rows. Columns and tasks are sorted by
    /// order, then creation time, then id; tasks whose column is not part
    /// of the board are dropped.
    pub fn assemble(board: Board, mut columns: Vec<Column>, mut tasks: Vec<Task>) -> Self {
        columns.sort_by(|a, b| (a.order, a.created_at, a.id).cmp(&(b.order, b.created_at, b.id)));
        tasks.sort_by(|a, b| (a.order, a.created_at, a.id).cmp(&(b.order, b.created_at, b.id)));

        let columns = columns
            .into_iter()
            .map(|column| {
                let column_tasks = tasks
                    .iter()
                    .filter(|task| task.column_id == column.id)
                    .cloned()
                    .collect();
                ColumnView {
                    column,
                    tasks: column_tasks,
                }
            })
            .collect();

        Self { board, columns }
    }

    pub fn column(&self, id: ColumnId) -> Option<&ColumnView> {
        self.columns.iter().find(|c| c.column.id == id)
    }

    /// Locate a task: `(column index, task index)`.
    pub fn position_of(&self, task_id: TaskId) -> Option<(usize, usize)> {
        self.columns.iter().enumerate().find_map(|(ci, column)| {
            column
                .tasks
                .iter()
                .position(|t| t.id == task_id)
                .map(|ti| (ci, ti))
        })
    }

    pub fn task_count(&self) -> usize {
        self.columns.iter().map(|c| c.tasks.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn board() -> Board {
        let now = Utc::now();
        Board {
            id: BoardId::now_v7(),
            name: "My Tasks".to_string(),
            description: None,
            owner_id: UserId::now_v7(),
            created_at: now,
            updated_at: now,
        }
    }

    fn column(board_id: BoardId, name: &str, order: Order) -> Column {
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

    fn task(column_id: ColumnId, title: &str, order: Order, created_at: Timestamp) -> Task {
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
            author_id: UserId::nil(),
            created_at,
            updated_at: created_at,
        }
    }

    #[test]
    fn test_priority_defaults_to_medium() {
        assert_eq!(Priority::default(), Priority::Medium);
        assert_eq!("HIGH".parse::<Priority>(), Ok(Priority::High));
        assert!("urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn test_assemble_sorts_columns_and_tasks() {
        let board = board();
        let done = column(board.id, "Done", 2);
        let todo = column(board.id, "To Do", 0);
        let doing = column(board.id, "In Progress", 1);

        let t0 = Utc::now();
        let later = task(todo.id, "later", 1, t0);
        // Duplicate order: creation time breaks the tie.
        let first = task(todo.id, "first", 0, t0);
        let second = task(todo.id, "second", 0, t0 + Duration::seconds(1));
        let stray = task(ColumnId::now_v7(), "stray", 0, t0);

        let view = BoardView::assemble(
            board,
            vec![done, todo.clone(), doing],
            vec![later, second, first, stray],
        );

        let names: Vec<&str> = view.columns.iter().map(|c| c.column.name.as_str()).collect();
        assert_eq!(names, vec!["To Do", "In Progress", "Done"]);

        let titles: Vec<&str> = view.columns[0].tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["first", "second", "later"]);
        assert_eq!(view.task_count(), 3);
        assert!(view.column(todo.id).is_some());
    }

    #[test]
    fn test_view_serializes_flat() -> Result<(), serde_json::Error> {
        let board = board();
        let view = BoardView::assemble(board.clone(), vec![column(board.id, "To Do", 0)], vec![]);
        let json = serde_json::to_value(&view)?;
        assert_eq!(json["name"], "My Tasks");
        assert_eq!(json["columns"][0]["name"], "To Do");
        assert_eq!(json["columns"][0]["tasks"], serde_json::json!([]));

        let back: BoardView = serde_json::from_value(json)?;
        assert_eq!(back, view);
        Ok(())
    }
}
