use actix_web::FromRequest;
use actix_web::{HttpRequest, dev::Payload, web};
use sea_orm::DatabaseConnection;
use std::future::Future;
use std::pin::Pin;

use crate::auth::{SESSION_COOKIE, jwt};
use crate::db::users::get_user_by_id;
use crate::errors::AppError;
use crate::models::users;

/// The logged-in user, loaded fresh from the database on every request.
pub struct AuthenticatedUser(pub users::Model);

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            // 1. Bearer header first, then the session cookie.
            let token = bearer_token(&req)
                .or_else(|| req.cookie(SESSION_COOKIE).map(|c| c.value().to_string()))
                .ok_or_else(|| AppError::Unauthorized("Faça login para continuar".into()))?;

            // 2. Validate the JWT.
            let secret = req
                .app_data::<web::Data<JwtSecret>>()
                .ok_or_else(|| AppError::Internal("JWT secret not configured".into()))?;

            let claims = jwt::validate_token(&token, &secret.0).map_err(|e| {
                tracing::debug!("rejected session token: {e}");
                AppError::Unauthorized("Sessão inválida ou expirada".into())
            })?;

            let user_id = claims
                .user_id()
                .map_err(|_| AppError::Unauthorized("Sessão inválida ou expirada".into()))?;

            // 3. Load the user. A deleted account invalidates its tokens.
            let db = req
                .app_data::<web::Data<DatabaseConnection>>()
                .ok_or_else(|| AppError::Internal("Database not configured".into()))?;

            let user = get_user_by_id(db.get_ref(), user_id)
                .await?
                .ok_or_else(|| AppError::Unauthorized("Sessão inválida ou expirada".into()))?;

            Ok(AuthenticatedUser(user))
        })
    }
}

fn bearer_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Wrapper type to store the JWT secret in Actix app data.
#[derive(Clone)]
pub struct JwtSecret(pub String);
