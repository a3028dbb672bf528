//! Persistence seam.
//!
//! Services talk to storage only through these traits. Every task operation is keyed by
//! the owning user, so there is no way to read or mutate another user's task by id alone.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::{NewTask, NewUser, Task, TaskPatch, User};

pub use memory::{MemoryTaskRepository, MemoryUserRepository};
pub use postgres::{PgTaskRepository, PgUserRepository};

pub(crate) const EMAIL_TAKEN: &str = "email already registered";

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `BadRequest` when the email is already registered.
    async fn create(&self, user: NewUser) -> Result<User, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    async fn find_by_id(&self, id: i32) -> Result<Option<User>, AppError>;
    /// Returns whether a row was removed.
    async fn delete(&self, id: i32) -> Result<bool, AppError>;
}

#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn create(&self, owner: i32, task: NewTask) -> Result<Task, AppError>;
    async fn find(&self, id: i32, owner: i32) -> Result<Option<Task>, AppError>;
    /// Owner's tasks, oldest first.
    async fn list(&self, owner: i32) -> Result<Vec<Task>, AppError>;
    async fn update(&self, id: i32, owner: i32, patch: TaskPatch)
        -> Result<Option<Task>, AppError>;
    async fn delete(&self, id: i32, owner: i32) -> Result<bool, AppError>;
    /// Removes every task of `owner`, returning how many were deleted.
    async fn delete_all(&self, owner: i32) -> Result<u64, AppError>;
}
