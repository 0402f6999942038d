use actix_web::{HttpResponse, web};
use sea_orm::DatabaseConnection;

use crate::auth::middleware::AuthenticatedUser;
use crate::db::users as user_db;
use crate::errors::{AppError, AppResult};
use crate::models::users::{UpdateUser, UserResponse};
use crate::validation::{checked_uf, clean_cep, cpf::checked_cpf, non_blank};

/// PUT /api/users/me: edit the caller's own account details.
pub async fn update_me(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    body: web::Json<UpdateUser>,
) -> AppResult<HttpResponse> {
    let input = normalize_update(body.into_inner())?;
    let updated = user_db::update_user(db.get_ref(), user.0.id, input).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(updated)))
}

/// Trim text fields and canonicalize CPF, CEP and state, rejecting invalid ones.
fn normalize_update(mut input: UpdateUser) -> Result<UpdateUser, AppError> {
    if let Some(name) = input.name.as_deref() {
        let name = name.trim();
        if name.chars().count() < 2 {
            return Err(AppError::bad_request("Informe seu nome"));
        }
        input.name = Some(name.to_string());
    }

    if let Some(cpf) = input.cpf.as_deref() {
        input.cpf = Some(checked_cpf(cpf).ok_or_else(|| AppError::bad_request("CPF inválido"))?);
    }

    if let Some(cep) = input.cep.as_deref() {
        input.cep = Some(clean_cep(cep).ok_or_else(|| AppError::bad_request("CEP inválido"))?);
    }

    input.phone = trimmed(input.phone);
    input.city = trimmed(input.city);
    input.state = match trimmed(input.state) {
        Some(state) => Some(
            checked_uf(&state)
                .ok_or_else(|| AppError::bad_request("Estado inválido: use a sigla da UF"))?,
        ),
        None => None,
    };
    input.profile_photo = trimmed(input.profile_photo);
    Ok(input)
}

fn trimmed(value: Option<String>) -> Option<String> {
    non_blank(value.as_deref()).map(str::to_string)
}
