use std::time::Duration;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::models::users::{self, Roles};

/// Session token claims.
///
/// `sub` is the numeric user id as a string, per the JWT convention.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    /// Token expiration (Unix timestamp).
    pub exp: usize,
    pub iat: usize,
    pub email: String,
    pub role: Roles,
}

impl Claims {
    pub fn for_user(user: &users::Model, ttl: Duration) -> Self {
        let now = chrono::Utc::now().timestamp().max(0) as usize;
        Self {
            sub: user.id.to_string(),
            exp: now + ttl.as_secs() as usize,
            iat: now,
            email: user.email.clone(),
            role: user.role,
        }
    }

    pub fn user_id(&self) -> Result<i32, String> {
        self.sub
            .parse()
            .map_err(|e| format!("Invalid user id in sub claim: {e}"))
    }
}

/// Sign a session token for `user` with HS256.
pub fn issue_token(user: &users::Model, secret: &str, ttl: Duration) -> Result<String, String> {
    encode(
        &Header::new(Algorithm::HS256),
        &Claims::for_user(user, ttl),
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| format!("Failed to sign token: {e}"))
}

/// Validate an HS256 session token and return the decoded claims.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, String> {
    let validation = Validation::new(Algorithm::HS256);
    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| format!("Token validation failed: {e}"))
}
