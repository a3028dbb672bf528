use std::sync::Arc;

use crate::auth::token::AUTHENTICATION_FAILED;
use crate::error::AppError;
use crate::models::{NewTask, Task, TaskPatch};
use crate::repository::{TaskRepository, UserRepository};

const TASK_NOT_FOUND: &str = "task not found";

/// Owner-scoped task CRUD. A task owned by someone else is reported exactly
/// like one that does not exist.
#[derive(Clone)]
pub struct TaskService {
    repo: Arc<dyn TaskRepository>,
    users: Arc<dyn UserRepository>,
}

impl TaskService {
    pub fn new(repo: Arc<dyn TaskRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { repo, users }
    }

    /// Sessions outlive account deletion, so the owner is confirmed before anything is written.
    pub async fn create(&self, owner: i32, task: NewTask) -> Result<Task, AppError> {
        if self.users.find_by_id(owner).await?.is_none() {
            log::warn!("Task creation for deleted user {} refused", owner);
            return Err(AppError::Unauthorized(AUTHENTICATION_FAILED.into()));
        }
        let task = self.repo.create(owner, task).await?;
        log::info!("Task {} created by user {}", task.id, owner);
        Ok(task)
    }

    pub async fn get(&self, id: i32, owner: i32) -> Result<Task, AppError> {
        self.repo
            .find(id, owner)
            .await?
            .ok_or_else(|| not_found(id, owner))
    }

    pub async fn list(&self, owner: i32) -> Result<Vec<Task>, AppError> {
        self.repo.list(owner).await
    }

    pub async fn update(&self, id: i32, owner: i32, patch: TaskPatch) -> Result<Task, AppError> {
        if patch.is_empty() {
            return self.get(id, owner).await;
        }
        let task = self
            .repo
            .update(id, owner, patch)
            .await?
            .ok_or_else(|| not_found(id, owner))?;
        log::info!("Task {} updated by user {}", id, owner);
        Ok(task)
    }

    pub async fn delete(&self, id: i32, owner: i32) -> Result<(), AppError> {
        if self.repo.delete(id, owner).await? {
            log::info!("Task {} deleted by user {}", id, owner);
            Ok(())
        } else {
            Err(not_found(id, owner))
        }
    }

    pub async fn delete_all(&self, owner: i32) -> Result<u64, AppError> {
        let removed = self.repo.delete_all(owner).await?;
        log::info!("Removed {} tasks of user {}", removed, owner);
        Ok(removed)
    }
}

fn not_found(id: i32, owner: i32) -> AppError {
    log::warn!("Task {} not found for user {}", id, owner);
    AppError::NotFound(TASK_NOT_FOUND.into())
}
