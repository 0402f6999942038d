use sea_orm::*;
use std::collections::HashMap;

use crate::models::users::{self, CreateUser, Roles, UpdateUser};

/// Insert a new account. The email is expected to be lowercased already.
pub async fn insert_user(db: &DatabaseConnection, input: CreateUser) -> Result<users::Model, DbErr> {
    let new_user = users::ActiveModel {
        name: Set(input.name),
        email: Set(input.email),
        role: Set(input.role),
        password_hash: Set(input.password_hash),
        phone: Set(input.phone),
        cpf: Set(input.cpf),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    new_user.insert(db).await
}

pub async fn get_user_by_id(db: &DatabaseConnection, id: i32) -> Result<Option<users::Model>, DbErr> {
    users::Entity::find_by_id(id).one(db).await
}

pub async fn get_user_by_email(
    db: &DatabaseConnection,
    email: &str,
) -> Result<Option<users::Model>, DbErr> {
    users::Entity::find()
        .filter(users::Column::Email.eq(email))
        .one(db)
        .await
}

/// Load many users at once, keyed by id.
pub async fn get_users_by_ids(
    db: &DatabaseConnection,
    ids: Vec<i32>,
) -> Result<HashMap<i32, users::Model>, DbErr> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = users::Entity::find()
        .filter(users::Column::Id.is_in(ids))
        .all(db)
        .await?;

    Ok(rows.into_iter().map(|u| (u.id, u)).collect())
}

/// All provider accounts, alphabetically.
pub async fn get_providers(db: &DatabaseConnection) -> Result<Vec<users::Model>, DbErr> {
    users::Entity::find()
        .filter(users::Column::Role.eq(Roles::Provider))
        .order_by_asc(users::Column::Name)
        .all(db)
        .await
}

/// Apply a partial update. Fields left as `None` keep their stored value.
pub async fn update_user(
    db: &DatabaseConnection,
    id: i32,
    input: UpdateUser,
) -> Result<users::Model, DbErr> {
    let user = users::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(DbErr::RecordNotFound("User not found".to_string()))?;

    let mut active: users::ActiveModel = user.into();

    if let Some(name) = input.name {
        active.name = Set(name);
    }
    if let Some(phone) = input.phone {
        active.phone = Set(Some(phone));
    }
    if let Some(cpf) = input.cpf {
        active.cpf = Set(Some(cpf));
    }
    if let Some(cep) = input.cep {
        active.cep = Set(Some(cep));
    }
    if let Some(city) = input.city {
        active.city = Set(Some(city));
    }
    if let Some(state) = input.state {
        active.state = Set(Some(state));
    }
    if let Some(profile_photo) = input.profile_photo {
        active.profile_photo = Set(Some(profile_photo));
    }
    active.updated_at = Set(Some(chrono::Utc::now()));

    active.update(db).await
}

/// Number of accounts per role, every role present.
pub async fn count_by_role(db: &DatabaseConnection) -> Result<Vec<(Roles, u64)>, DbErr> {
    let mut counts = Vec::new();
    for role in [Roles::Client, Roles::Provider, Roles::Admin] {
        let count = users::Entity::find()
            .filter(users::Column::Role.eq(role))
            .count(db)
            .await?;
        counts.push((role, count));
    }
    Ok(counts)
}
