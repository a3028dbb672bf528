use std::sync::Arc;

use crate::auth::{Credentials, IssuedToken, PasswordHasher, TokenService};
use crate::error::AppError;
use crate::models::{NewUser, User};
use crate::repository::UserRepository;

/// The only message a failed login ever produces.
pub const INVALID_CREDENTIALS: &str = "invalid credentials";

/// A user together with the session token just issued for them.
pub struct Session {
    pub user: User,
    pub token: IssuedToken,
}

/// Account lifecycle: sign-up, login and deletion.
#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository>,
    hasher: PasswordHasher,
    tokens: Arc<TokenService>,
}

impl UserService {
    pub fn new(
        repo: Arc<dyn UserRepository>,
        hasher: PasswordHasher,
        tokens: Arc<TokenService>,
    ) -> Self {
        Self {
            repo,
            hasher,
            tokens,
        }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Creates the account and opens a session for it.
    pub async fn sign_up(&self, credentials: Credentials) -> Result<Session, AppError> {
        let password_hash = self.hasher.hash(&credentials.password).await?;
        let user = self
            .repo
            .create(NewUser {
                email: credentials.email,
                password_hash,
            })
            .await?;
        log::info!("User {} signed up", user.id);

        let token = self.tokens.issue(user.id)?;
        Ok(Session { user, token })
    }

    /// Unknown email and wrong password are indistinguishable to the caller,
    /// down to the single bcrypt verification both paths perform.
    pub async fn login(&self, credentials: Credentials) -> Result<Session, AppError> {
        let user = self.repo.find_by_email(&credentials.email).await?;

        let user = match user {
            Some(user) => user,
            None => {
                self.hasher.verify_dummy(&credentials.password).await;
                return Err(Self::rejected());
            }
        };
        if !self
            .hasher
            .verify(&user.password_hash, &credentials.password)
            .await?
        {
            return Err(Self::rejected());
        }

        let token = self.tokens.issue(user.id)?;
        log::info!("User {} logged in", user.id);
        Ok(Session { user, token })
    }

    /// Removes the account record. Task cleanup is the caller's concern.
    pub async fn delete_account(&self, user_id: i32) -> Result<(), AppError> {
        if self.repo.delete(user_id).await? {
            log::info!("User {} deleted", user_id);
            Ok(())
        } else {
            Err(AppError::NotFound("user not found".into()))
        }
    }

    fn rejected() -> AppError {
        log::warn!("Login rejected: invalid credentials");
        AppError::Unauthorized(INVALID_CREDENTIALS.into())
    }
}
