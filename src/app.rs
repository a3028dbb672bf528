use std::sync::Arc;

use crate::auth::{CookiePolicy, PasswordHasher, TokenService};
use crate::config::Config;
use crate::repository::{
    MemoryTaskRepository, MemoryUserRepository, TaskRepository, UserRepository,
};
use crate::services::{TaskService, UserService};

/// Everything the routes need, assembled once at startup and handed to
/// `routes::configure`.
#[derive(Clone)]
pub struct AppState {
    pub cookies: CookiePolicy,
    pub tokens: Arc<TokenService>,
    pub users: UserService,
    pub tasks: TaskService,
    pub cors_allow_origins: Vec<String>,
}

impl AppState {
    pub fn new(
        config: &Config,
        user_repo: Arc<dyn UserRepository>,
        task_repo: Arc<dyn TaskRepository>,
        hasher: PasswordHasher,
    ) -> Self {
        let tokens = Arc::new(TokenService::new(config.jwt_secret.as_bytes()));
        Self {
            cookies: CookiePolicy::for_env(config.app_env),
            tokens: Arc::clone(&tokens),
            users: UserService::new(Arc::clone(&user_repo), hasher, tokens),
            tasks: TaskService::new(task_repo, user_repo),
            cors_allow_origins: config.cors_allow_origins.clone(),
        }
    }

    /// State backed by the in-process repositories.
    pub fn in_memory(config: &Config, hasher: PasswordHasher) -> Self {
        Self::new(
            config,
            Arc::new(MemoryUserRepository::new()),
            Arc::new(MemoryTaskRepository::new()),
            hasher,
        )
    }
}
