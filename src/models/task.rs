use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Lifecycle state of a task.
/// Corresponds to the `task_status` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub enum TaskStatus {
    /// Task is yet to be started.
    Todo,
    /// Task is currently being worked on.
    InProgress,
    /// Task is completed.
    Done,
    /// Task is kept for reference only.
    Archive,
    /// Task is blocked on something external.
    Pending,
}

/// Status as it appears on the wire: `{"name": "inProgress"}`.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct StatusRef {
    pub name: TaskStatus,
}

impl From<TaskStatus> for StatusRef {
    fn from(name: TaskStatus) -> Self {
        Self { name }
    }
}

/// Body of `POST /api/v1/tasks`.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TaskInput {
    /// Must be between 1 and 255 characters.
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub status: StatusRef,
}

/// Body of `PATCH /api/v1/tasks/{id}`. Absent fields are left untouched.
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
pub struct TaskPatch {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub status: Option<StatusRef>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.status.is_none()
    }
}

/// Data needed to persist a new task. The owner is passed separately.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub name: String,
    pub status: TaskStatus,
}

impl From<TaskInput> for NewTask {
    fn from(input: TaskInput) -> Self {
        Self {
            name: input.name,
            status: input.status.name,
        }
    }
}

/// Represents a task entity as stored in the database.
#[derive(Debug, Clone, FromRow)]
pub struct Task {
    pub id: i32,
    pub name: String,
    pub status: TaskStatus,
    /// Identifier of the user who owns the task.
    pub user_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Applies the present fields of `patch` and bumps `updated_at`.
    pub fn apply(&mut self, patch: TaskPatch, now: DateTime<Utc>) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(status) = patch.status {
            self.status = status.name;
        }
        self.updated_at = now;
    }
}

/// Public representation of a task. The owner is implied by the session and not echoed.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskView {
    pub kind: String,
    pub id: i32,
    pub name: String,
    pub status: StatusRef,
}

impl From<Task> for TaskView {
    fn from(task: Task) -> Self {
        Self {
            kind: "task".to_string(),
            id: task.id,
            name: task.name,
            status: task.status.into(),
        }
    }
}
