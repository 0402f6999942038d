use sea_orm::DatabaseConnection;

use crate::db::ads as ad_db;
use crate::errors::AppError;
use crate::models::ads;
use crate::models::users::{self, Roles};

pub fn require_role(user: &users::Model, role: Roles) -> Result<(), AppError> {
    if user.role == role {
        Ok(())
    } else {
        Err(AppError::Forbidden("Acesso não permitido".into()))
    }
}

/// Load a listing and make sure `user_id` owns it.
pub async fn verify_ad_owner(
    db: &DatabaseConnection,
    ad_id: i32,
    user_id: i32,
) -> Result<ads::Model, AppError> {
    match ad_db::get_ad_by_id(db, ad_id).await? {
        Some(ad) if ad.user_id == user_id => Ok(ad),
        Some(_) => Err(AppError::Forbidden("Este anúncio não é seu".into())),
        None => Err(AppError::not_found("Anúncio não encontrado")),
    }
}
