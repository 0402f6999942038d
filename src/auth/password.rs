use actix_web::web;

use crate::errors::AppError;

/// bcrypt is CPU-bound, so both operations run on the blocking pool.
pub async fn hash_password(password: String) -> Result<String, AppError> {
    web::block(move || bcrypt::hash(password, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| AppError::Internal(format!("blocking pool error: {e}")))?
        .map_err(|e| AppError::Internal(format!("bcrypt hash failed: {e}")))
}

/// A malformed stored hash counts as a mismatch.
pub async fn verify_password(password: String, hash: String) -> Result<bool, AppError> {
    web::block(move || bcrypt::verify(password, &hash).unwrap_or(false))
        .await
        .map_err(|e| AppError::Internal(format!("blocking pool error: {e}")))
}
