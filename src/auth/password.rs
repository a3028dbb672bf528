use std::sync::Arc;

use crate::error::AppError;
use bcrypt::{hash, verify};

/// bcrypt work factor used for stored credentials.
pub const DEFAULT_COST: u32 = 10;

/// One-way salted password hashing.
///
/// Besides the cost factor the hasher keeps a digest of a fixed throwaway password, so a
/// login for an unknown email can spend the same bcrypt time as a real comparison.
/// bcrypt runs on tokio's blocking pool; the actix workers never wait on it.
#[derive(Clone)]
pub struct PasswordHasher {
    cost: u32,
    dummy_hash: Arc<str>,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Result<Self, AppError> {
        let dummy_hash = hash("taskgate-timing-equaliser", cost)
            .map_err(|e| AppError::InternalServerError(format!("Failed to hash password: {}", e)))?;
        Ok(Self {
            cost,
            dummy_hash: dummy_hash.into(),
        })
    }

    pub async fn hash(&self, password: &str) -> Result<String, AppError> {
        let password = password.to_owned();
        let cost = self.cost;
        blocking(move || hash(password, cost))
            .await?
            .map_err(|e| AppError::InternalServerError(format!("Failed to hash password: {}", e)))
    }

    /// `Ok(false)` on mismatch; `Err` only when the stored digest is unusable.
    pub async fn verify(&self, hashed_password: &str, password: &str) -> Result<bool, AppError> {
        let password = password.to_owned();
        let hashed_password = hashed_password.to_owned();
        blocking(move || verify(password, &hashed_password))
            .await?
            .map_err(|e| AppError::InternalServerError(format!("Failed to verify password: {}", e)))
    }

    /// Burns one verification against the dummy digest. Always reports a mismatch.
    pub async fn verify_dummy(&self, password: &str) -> bool {
        let password = password.to_owned();
        let dummy_hash = Arc::clone(&self.dummy_hash);
        let _ = blocking(move || verify(password, &dummy_hash)).await;
        false
    }
}

async fn blocking<T, F>(work: F) -> Result<T, AppError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AppError::InternalServerError(format!("Password task failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> PasswordHasher {
        PasswordHasher::new(4).unwrap()
    }

    #[actix_rt::test]
    async fn test_password_hashing_and_verification() {
        let hasher = hasher();
        let password = "test_password123";
        let hashed = hasher.hash(password).await.unwrap();

        assert_ne!(hashed, password);
        assert!(hasher.verify(&hashed, password).await.unwrap());
        assert!(!hasher.verify(&hashed, "wrong_password").await.unwrap());
        assert!(!hasher.verify(&hashed, "test_password12").await.unwrap());
    }

    #[actix_rt::test]
    async fn test_hashes_are_salted() {
        let hasher = hasher();
        let first = hasher.hash("same-password").await.unwrap();
        let second = hasher.hash("same-password").await.unwrap();
        assert_ne!(first, second);
        assert!(hasher.verify(&first, "same-password").await.unwrap());
        assert!(hasher.verify(&second, "same-password").await.unwrap());
    }

    #[actix_rt::test]
    async fn test_default_cost_is_embedded_in_digest() {
        let hasher = PasswordHasher::new(DEFAULT_COST).unwrap();
        let hashed = hasher.hash("secret123").await.unwrap();
        assert!(hashed.starts_with("$2b$10$"));
    }

    #[actix_rt::test]
    async fn test_multibyte_password_at_byte_limit() {
        let hasher = hasher();
        let password = "é".repeat(36);
        let hashed = hasher.hash(&password).await.unwrap();

        assert!(hasher.verify(&hashed, &password).await.unwrap());
        assert!(!hasher.verify(&hashed, &"é".repeat(35)).await.unwrap());
        assert!(!hasher.verify(&hashed, &format!("{}e", "é".repeat(35))).await.unwrap());
    }

    #[actix_rt::test]
    async fn test_verify_with_invalid_hash() {
        match hasher().verify("invalidhashformat", "test_password123").await {
            Err(AppError::InternalServerError(msg)) => {
                assert!(msg.contains("Failed to verify password"));
            }
            Ok(false) => {}
            Ok(true) => panic!("Password verification should fail for invalid hash format"),
            Err(e) => panic!("Unexpected error: {:?}", e),
        }
    }

    #[actix_rt::test]
    async fn test_dummy_verification_never_matches() {
        let hasher = hasher();
        assert!(!hasher.verify_dummy("taskgate-timing-equaliser").await);
        assert!(!hasher.verify_dummy("anything").await);
    }
}
