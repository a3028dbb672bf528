pub mod cookie;
pub mod csrf;
pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

pub use cookie::{CookiePolicy, CSRF_COOKIE, CSRF_HEADER, SESSION_COOKIE};
pub use csrf::{CsrfIssuer, CsrfToken, CsrfValidator};
pub use extractors::AuthenticatedUserId;
pub use middleware::SessionAuth;
pub use password::PasswordHasher;
pub use token::{Claims, IssuedToken, TokenService};

/// Email and password as submitted by the client.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct Credentials {
    /// Must be a valid email format.
    #[validate(email)]
    pub email: String,
    /// At least 6 characters and at most 72 bytes once UTF-8 encoded.
    #[validate(length(min = 6), custom = "fits_bcrypt_input")]
    pub password: String,
}

/// bcrypt only reads the first 72 bytes of its input, so anything longer would
/// collide with its own prefix.
pub const MAX_PASSWORD_BYTES: usize = 72;

fn fits_bcrypt_input(password: &str) -> Result<(), ValidationError> {
    if password.len() > MAX_PASSWORD_BYTES {
        let mut err = ValidationError::new("length");
        err.message = Some(format!("must be at most {} bytes", MAX_PASSWORD_BYTES).into());
        return Err(err);
    }
    Ok(())
}

impl Credentials {
    /// Emails are stored and looked up trimmed and lowercased.
    pub fn normalized(mut self) -> Self {
        self.email = self.email.trim().to_lowercase();
        self
    }
}

/// Body of `POST /api/v1/signup`.
#[derive(Debug, Serialize, Deserialize)]
pub struct SignUpRequest {
    pub user: Credentials,
}

/// Body of `POST /api/v1/login`.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub user: Credentials,
}

/// Body of `GET /api/v1/csrf`.
#[derive(Debug, Serialize, Deserialize)]
pub struct CsrfTokenResponse {
    pub token: String,
}
