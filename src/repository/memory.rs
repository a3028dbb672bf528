//! In-process repositories, used when no database is configured and by the HTTP tests.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{TaskRepository, UserRepository, EMAIL_TAKEN};
use crate::error::AppError;
use crate::models::{NewTask, NewUser, Task, TaskPatch, User};

/// Rows keyed by id plus the next id to hand out, mirroring a serial column.
struct Table<T> {
    rows: BTreeMap<i32, T>,
    next_id: i32,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl<T> Table<T> {
    fn allocate_id(&mut self) -> i32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

#[derive(Default)]
pub struct MemoryUserRepository {
    table: RwLock<Table<User>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, AppError> {
        let mut table = self.table.write().await;
        if table.rows.values().any(|existing| existing.email == user.email) {
            return Err(AppError::BadRequest(EMAIL_TAKEN.into()));
        }

        let id = table.allocate_id();
        let user = User {
            id,
            email: user.email,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        table.rows.insert(id, user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let table = self.table.read().await;
        Ok(table.rows.values().find(|user| user.email == email).cloned())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<User>, AppError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn delete(&self, id: i32) -> Result<bool, AppError> {
        Ok(self.table.write().await.rows.remove(&id).is_some())
    }
}

#[derive(Default)]
pub struct MemoryTaskRepository {
    table: RwLock<Table<Task>>,
}

impl MemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskRepository for MemoryTaskRepository {
    async fn create(&self, owner: i32, task: NewTask) -> Result<Task, AppError> {
        let mut table = self.table.write().await;
        let id = table.allocate_id();
        let now = Utc::now();
        let task = Task {
            id,
            name: task.name,
            status: task.status,
            user_id: owner,
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(id, task.clone());
        Ok(task)
    }

    async fn find(&self, id: i32, owner: i32) -> Result<Option<Task>, AppError> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .get(&id)
            .filter(|task| task.user_id == owner)
            .cloned())
    }

    async fn list(&self, owner: i32) -> Result<Vec<Task>, AppError> {
        // Ids are allocated in insertion order, so key order is creation order.
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .filter(|task| task.user_id == owner)
            .cloned()
            .collect())
    }

    async fn update(
        &self,
        id: i32,
        owner: i32,
        patch: TaskPatch,
    ) -> Result<Option<Task>, AppError> {
        let mut table = self.table.write().await;
        match table.rows.get_mut(&id) {
            Some(task) if task.user_id == owner => {
                task.apply(patch, Utc::now());
                Ok(Some(task.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete(&self, id: i32, owner: i32) -> Result<bool, AppError> {
        let mut table = self.table.write().await;
        let owned = table.rows.get(&id).map_or(false, |task| task.user_id == owner);
        if owned {
            table.rows.remove(&id);
        }
        Ok(owned)
    }

    async fn delete_all(&self, owner: i32) -> Result<u64, AppError> {
        let mut table = self.table.write().await;
        let before = table.rows.len();
        table.rows.retain(|_, task| task.user_id != owner);
        Ok((before - table.rows.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaskStatus;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            password_hash: "hash".to_string(),
        }
    }

    fn new_task(name: &str) -> NewTask {
        NewTask {
            name: name.to_string(),
            status: TaskStatus::Todo,
        }
    }

    #[actix_rt::test]
    async fn test_user_email_is_unique() {
        let repo = MemoryUserRepository::new();
        let first = repo.create(new_user("a@b.com")).await.unwrap();
        assert_eq!(first.id, 1);

        let duplicate = repo.create(new_user("a@b.com")).await;
        assert!(matches!(duplicate, Err(AppError::BadRequest(_))));

        let found = repo.find_by_email("a@b.com").await.unwrap().unwrap();
        assert_eq!(found.id, first.id);
        assert!(repo.find_by_id(first.id).await.unwrap().is_some());

        assert!(repo.delete(first.id).await.unwrap());
        assert!(!repo.delete(first.id).await.unwrap());
        assert!(repo.find_by_email("a@b.com").await.unwrap().is_none());
    }

    #[actix_rt::test]
    async fn test_tasks_are_scoped_to_owner() {
        let repo = MemoryTaskRepository::new();
        let mine = repo.create(1, new_task("mine")).await.unwrap();
        let theirs = repo.create(2, new_task("theirs")).await.unwrap();

        assert!(repo.find(mine.id, 1).await.unwrap().is_some());
        assert!(repo.find(theirs.id, 1).await.unwrap().is_none());

        let patch = TaskPatch {
            name: Some("stolen".into()),
            status: None,
        };
        assert!(repo.update(theirs.id, 1, patch).await.unwrap().is_none());
        assert!(!repo.delete(theirs.id, 1).await.unwrap());

        let untouched = repo.find(theirs.id, 2).await.unwrap().unwrap();
        assert_eq!(untouched.name, "theirs");
    }

    #[actix_rt::test]
    async fn test_list_is_oldest_first_and_delete_all() {
        let repo = MemoryTaskRepository::new();
        for name in ["first", "second", "third"] {
            repo.create(7, new_task(name)).await.unwrap();
        }
        repo.create(8, new_task("other")).await.unwrap();

        let names: Vec<String> = repo
            .list(7)
            .await
            .unwrap()
            .into_iter()
            .map(|task| task.name)
            .collect();
        assert_eq!(names, vec!["first", "second", "third"]);

        assert_eq!(repo.delete_all(7).await.unwrap(), 3);
        assert!(repo.list(7).await.unwrap().is_empty());
        assert_eq!(repo.list(8).await.unwrap().len(), 1);
    }

    #[actix_rt::test]
    async fn test_update_keeps_absent_fields() {
        let repo = MemoryTaskRepository::new();
        let task = repo.create(1, new_task("keep me")).await.unwrap();

        let patch = TaskPatch {
            name: None,
            status: Some(TaskStatus::Pending.into()),
        };
        let updated = repo.update(task.id, 1, patch).await.unwrap().unwrap();
        assert_eq!(updated.name, "keep me");
        assert_eq!(updated.status, TaskStatus::Pending);
        assert!(updated.updated_at >= task.updated_at);
    }
}
