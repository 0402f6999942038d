use sea_orm::prelude::Expr;
use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use std::collections::HashMap;

use crate::models::profiles::{self, UpsertProfile};
use crate::models::users;

pub async fn get_profile<C>(db: &C, user_id: i32) -> Result<Option<profiles::Model>, DbErr>
where
    C: ConnectionTrait,
{
    profiles::Entity::find_by_id(user_id).one(db).await
}

/// Load many profiles at once, keyed by user id.
pub async fn get_profiles_by_user_ids(
    db: &DatabaseConnection,
    user_ids: Vec<i32>,
) -> Result<HashMap<i32, profiles::Model>, DbErr> {
    if user_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = profiles::Entity::find()
        .filter(profiles::Column::UserId.is_in(user_ids))
        .all(db)
        .await?;

    Ok(rows.into_iter().map(|p| (p.user_id, p)).collect())
}

/// Save the display name and the provider profile together.
///
/// Both writes commit or neither does. The profile row is created on first
/// save and replaced on every later one.
pub async fn upsert_profile(
    db: &DatabaseConnection,
    user_id: i32,
    input: UpsertProfile,
) -> Result<profiles::Model, DbErr> {
    let txn = db.begin().await?;
    let now = chrono::Utc::now();

    users::Entity::update_many()
        .col_expr(users::Column::Name, Expr::value(input.name.trim().to_string()))
        .col_expr(users::Column::UpdatedAt, Expr::value(Some(now)))
        .filter(users::Column::Id.eq(user_id))
        .exec(&txn)
        .await?;

    let profile = profiles::ActiveModel {
        user_id: Set(user_id),
        address: Set(input.address),
        address_number: Set(input.address_number),
        complement: Set(input.complement),
        neighborhood: Set(input.neighborhood),
        cep: Set(input.cep),
        city: Set(input.city),
        state: Set(input.state),
        category: Set(input.category),
        phone: Set(input.phone),
        whatsapp: Set(input.whatsapp),
        cpf: Set(input.cpf),
        service_type: Set(input.service_type),
        service_radius_km: Set(input.service_radius_km),
        issues_invoice: Set(input.issues_invoice),
        has_cnpj: Set(input.has_cnpj),
        cnpj: Set(input.cnpj),
        availability: Set(serde_json::json!(input.availability)),
        bio: Set(input.bio),
        updated_at: Set(Some(now)),
    };

    let saved = profiles::Entity::insert(profile)
        .on_conflict(
            OnConflict::column(profiles::Column::UserId)
                .update_columns([
                    profiles::Column::Address,
                    profiles::Column::AddressNumber,
                    profiles::Column::Complement,
                    profiles::Column::Neighborhood,
                    profiles::Column::Cep,
                    profiles::Column::City,
                    profiles::Column::State,
                    profiles::Column::Category,
                    profiles::Column::Phone,
                    profiles::Column::Whatsapp,
                    profiles::Column::Cpf,
                    profiles::Column::ServiceType,
                    profiles::Column::ServiceRadiusKm,
                    profiles::Column::IssuesInvoice,
                    profiles::Column::HasCnpj,
                    profiles::Column::Cnpj,
                    profiles::Column::Availability,
                    profiles::Column::Bio,
                    profiles::Column::UpdatedAt,
                ])
                .to_owned(),
        )
        .exec_with_returning(&txn)
        .await?;

    txn.commit().await?;
    Ok(saved)
}
