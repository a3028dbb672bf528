use crate::error::AppError;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Lifetime of a session token, counted from issuance.
pub const SESSION_TTL_HOURS: i64 = 12;

/// The only algorithm a session token may be signed or verified with.
pub const SESSION_ALGORITHM: Algorithm = Algorithm::HS256;

/// Outward message for every session-token failure.
pub const AUTHENTICATION_FAILED: &str = "authentication failed";

/// Represents the claims encoded within a session token.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Identifier of the authenticated user.
    pub user_id: i32,
    /// Absolute expiry (seconds since epoch).
    pub exp: i64,
}

/// A freshly minted token together with the instant it stops being valid.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Mints and verifies stateless, HMAC-signed session tokens.
///
/// Holds the server secret for the lifetime of the process. Issuing and verifying are pure
/// functions of their inputs plus that secret, so one instance is shared by every worker.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &[u8]) -> Self {
        Self::with_ttl(secret, Duration::hours(SESSION_TTL_HOURS))
    }

    pub fn with_ttl(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(SESSION_ALGORITHM);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    /// How long issued tokens stay valid. Also the session cookie's max age.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(&self, user_id: i32) -> Result<IssuedToken, AppError> {
        self.issue_at(user_id, Utc::now())
    }

    /// Mints a token as if issued at `issued_at`.
    pub fn issue_at(&self, user_id: i32, issued_at: DateTime<Utc>) -> Result<IssuedToken, AppError> {
        let expires_at = issued_at + self.ttl;
        let claims = Claims {
            user_id,
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(SESSION_ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Verifies signature, algorithm, expiry and the identity claim.
    ///
    /// Every failure collapses to `AppError::Unauthorized(AUTHENTICATION_FAILED)`; the
    /// precise cause is only logged.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                log::warn!("Session token rejected: {:?}", e.kind());
                AppError::Unauthorized(AUTHENTICATION_FAILED.into())
            })?;

        if claims.user_id <= 0 {
            log::warn!("Session token rejected: malformed user_id claim");
            return Err(AppError::Unauthorized(AUTHENTICATION_FAILED.into()));
        }

        Ok(claims)
    }
}
