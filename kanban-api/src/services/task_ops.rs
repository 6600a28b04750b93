//! Task operations other than moves

use chrono::Utc;
use kanban_core::order::next_order;
use kanban_core::validation::{optional_text, require_name};
use kanban_core::{
    ColumnId, EntityKind, KanbanError, KanbanResult, Priority, StorageError, Task, TaskId,
    Timestamp, UserId,
};
use kanban_storage::{TaskUpdate, UnitOfWork};
use tracing::info;

use super::{finish, BoardService};

/// Fields for a new task. Placement is always the end of the column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub label: Option<String>,
    pub priority: Option<Priority>,
    pub due_date: Option<Timestamp>,
    pub assignee_id: Option<UserId>,
}

impl NewTask {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

impl BoardService {
    /// Append a task to the end of `column_id`.
    #[tracing::instrument(skip(self, new_task), fields(title = %new_task.title), err)]
    pub async fn create_task(
        &self,
        user: UserId,
        column_id: ColumnId,
        new_task: NewTask,
    ) -> KanbanResult<Task> {
        let title = require_name("title", &new_task.title)?;
        self.authorize_column(user, column_id).await?;

        let now = Utc::now();
        let task = Task {
            id: TaskId::now_v7(),
            column_id,
            title,
            description: optional_text(new_task.description),
            label: optional_text(new_task.label),
            priority: new_task.priority.unwrap_or_default(),
            due_date: new_task.due_date,
            order: 0,
            assignee_id: new_task.assignee_id,
            author_id: user,
            created_at: now,
            updated_at: now,
        };

        let mut unit = self.store.begin().await?;
        let result = append_task(unit.as_mut(), task).await;
        let task = finish(unit, result).await?;

        info!(task_id = %task.id, %column_id, order = task.order, "Task created");
        Ok(task)
    }

    /// Partial update of a task's content. Placement only changes through
    /// [`BoardService::move_task`].
    #[tracing::instrument(skip(self, update), err)]
    pub async fn update_task(
        &self,
        user: UserId,
        id: TaskId,
        mut update: TaskUpdate,
    ) -> KanbanResult<Task> {
        if let Some(title) = &update.title {
            update.title = Some(require_name("title", title)?);
        }
        if let Some(description) = update.description.take() {
            update.description = Some(optional_text(description));
        }
        if let Some(label) = update.label.take() {
            update.label = Some(optional_text(label));
        }
        let task = self.authorize_task(user, id).await?;
        if update.is_empty() {
            return Ok(task);
        }

        let mut unit = self.store.begin().await?;
        let result = unit.update_task(id, &update).await.map_err(Into::into);
        let task = finish(unit, result).await?;

        info!(task_id = %id, "Task updated");
        Ok(task)
    }

    /// Delete a task. Its siblings keep their orders.
    ///
    /// The task's column is locked first, so a delete runs strictly before
    /// or after any move touching that column.
    #[tracing::instrument(skip(self), err)]
    pub async fn delete_task(&self, user: UserId, id: TaskId) -> KanbanResult<()> {
        self.with_retry("delete_task", move || async move {
            let task = self.authorize_task(user, id).await?;
            let mut unit = self.store.begin().await?;
            let result = delete_task_in_unit(unit.as_mut(), id, task.column_id).await;
            finish(unit, result).await
        })
        .await?;

        info!(task_id = %id, "Task deleted");
        Ok(())
    }

    #[tracing::instrument(skip(self), err)]
    pub async fn get_task(&self, user: UserId, id: TaskId) -> KanbanResult<Task> {
        self.authorize_task(user, id).await
    }

    /// Tasks the caller wrote, newest first.
    #[tracing::instrument(skip(self), err)]
    pub async fn list_my_tasks(&self, user: UserId) -> KanbanResult<Vec<Task>> {
        Ok(self.store.list_tasks_for_author(user).await?)
    }
}

async fn append_task(unit: &mut dyn UnitOfWork, mut task: Task) -> KanbanResult<Task> {
    // Deleted between authorization and now.
    if unit.lock_columns(&[task.column_id]).await?.is_empty() {
        return Err(KanbanError::not_found(EntityKind::Column, task.column_id));
    }
    task.order = next_order(unit.max_task_order(task.column_id).await?);
    unit.insert_task(&task).await?;
    Ok(task)
}

async fn delete_task_in_unit(
    unit: &mut dyn UnitOfWork,
    id: TaskId,
    column: ColumnId,
) -> KanbanResult<()> {
    unit.lock_columns(&[column]).await?;
    let task = unit
        .find_task(id)
        .await?
        .ok_or_else(|| KanbanError::not_found(EntityKind::Task, id))?;
    if task.column_id != column {
        return Err(StorageError::Conflict {
            reason: "task changed column before the lock was taken".to_string(),
        }
        .into());
    }
    unit.delete_task(id).await?;
    Ok(())
}
