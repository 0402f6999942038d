use actix_web::cookie::{Cookie, SameSite, time};
use actix_web::{HttpResponse, web};
use sea_orm::{DatabaseConnection, SqlErr};

use crate::auth::middleware::{AuthenticatedUser, JwtSecret};
use crate::auth::{SESSION_COOKIE, jwt, password};
use crate::config::AppConfig;
use crate::db::users;
use crate::errors::{AppError, AppResult};
use crate::models::users::{CreateUser, LoginRequest, RegisterUser, Roles, UserResponse};
use crate::validation::{cpf::checked_cpf, non_blank};

const MIN_PASSWORD_CHARS: usize = 6;

/// POST /api/auth/register: create a client or provider account.
pub async fn register(
    db: web::Data<DatabaseConnection>,
    body: web::Json<RegisterUser>,
) -> AppResult<HttpResponse> {
    let input = body.into_inner();

    let name = input.name.trim().to_string();
    if name.chars().count() < 2 {
        return Err(AppError::bad_request("Informe seu nome"));
    }

    let email = input.email.trim().to_lowercase();
    if !is_plausible_email(&email) {
        return Err(AppError::bad_request("E-mail inválido"));
    }

    if input.password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(AppError::bad_request(format!(
            "A senha deve ter pelo menos {MIN_PASSWORD_CHARS} caracteres"
        )));
    }

    let role = input.role.unwrap_or(Roles::Client);
    if role == Roles::Admin {
        return Err(AppError::Forbidden(
            "Não é possível criar contas de administrador".into(),
        ));
    }

    let cpf = match non_blank(input.cpf.as_deref()) {
        Some(raw) => Some(checked_cpf(raw).ok_or_else(|| AppError::bad_request("CPF inválido"))?),
        None => None,
    };

    if users::get_user_by_email(db.get_ref(), &email).await?.is_some() {
        return Err(AppError::Conflict("E-mail já cadastrado".into()));
    }

    let password_hash = password::hash_password(input.password).await?;

    let created = users::insert_user(
        db.get_ref(),
        CreateUser {
            name,
            email,
            password_hash,
            role,
            phone: non_blank(input.phone.as_deref()).map(str::to_string),
            cpf,
        },
    )
    .await
    .map_err(|e| match e.sql_err() {
        // Lost a race with another registration for the same email.
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::Conflict("E-mail já cadastrado".into()),
        _ => AppError::Database(e),
    })?;

    tracing::info!(user_id = created.id, role = ?created.role, "account created");
    Ok(HttpResponse::Created().json(UserResponse::from(created)))
}

/// POST /api/auth/login: check credentials, return a token and set the
/// session cookie.
pub async fn login(
    db: web::Data<DatabaseConnection>,
    secret: web::Data<JwtSecret>,
    config: web::Data<AppConfig>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let input = body.into_inner();
    let invalid = || AppError::Unauthorized("E-mail ou senha incorretos".into());

    let email = input.email.trim().to_lowercase();
    let user = users::get_user_by_email(db.get_ref(), &email)
        .await?
        .ok_or_else(invalid)?;

    if !password::verify_password(input.password, user.password_hash.clone()).await? {
        return Err(invalid());
    }

    let token = jwt::issue_token(&user, &secret.0, config.jwt_ttl).map_err(AppError::Internal)?;

    let cookie = Cookie::build(SESSION_COOKIE, token.clone())
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(config.jwt_ttl.as_secs() as i64))
        .finish();

    Ok(HttpResponse::Ok().cookie(cookie).json(serde_json::json!({
        "token": token,
        "user": UserResponse::from(user),
    })))
}

/// POST /api/auth/logout: expire the session cookie.
pub async fn logout() -> HttpResponse {
    let mut cookie = Cookie::build(SESSION_COOKIE, "")
        .path("/")
        .http_only(true)
        .finish();
    cookie.make_removal();

    HttpResponse::Ok().cookie(cookie).json(serde_json::json!({ "ok": true }))
}

/// GET /api/auth/me: the currently authenticated user.
pub async fn me(user: AuthenticatedUser) -> HttpResponse {
    HttpResponse::Ok().json(UserResponse::from(user.0))
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !email.contains(' ')
        }
        None => false,
    }
}
