use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// The `Roles` enum maps to a Postgres TEXT column stored as lowercase strings.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum Roles {
    #[sea_orm(string_value = "client")]
    Client,
    #[sea_orm(string_value = "provider")]
    Provider,
    #[sea_orm(string_value = "admin")]
    Admin,
}

/// SeaORM entity for the `users` table.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub role: Roles,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub phone: Option<String>,
    pub cpf: Option<String>,
    pub cep: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub profile_photo: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::profiles::Entity")]
    ProviderProfile,
    #[sea_orm(has_many = "super::ads::Entity")]
    Ads,
}

impl Related<super::profiles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProviderProfile.def()
    }
}

impl Related<super::ads::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ads.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// ── DTOs (not stored in DB, used for request bodies) ──

/// Body of `POST /api/auth/register`.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Option<Roles>,
    pub phone: Option<String>,
    pub cpf: Option<String>,
}

/// Already validated input for inserting a user.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Roles,
    pub phone: Option<String>,
    pub cpf: Option<String>,
}

/// Body of `POST /api/auth/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Body of `PUT /api/users/me`. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub cpf: Option<String>,
    pub cep: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub profile_photo: Option<String>,
}

/// A safe user representation for API responses (never leaks internal fields).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub role: Roles,
    pub phone: Option<String>,
    pub cpf: Option<String>,
    pub cep: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub profile_photo: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
}

impl From<Model> for UserResponse {
    fn from(m: Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            email: m.email,
            role: m.role,
            phone: m.phone,
            cpf: m.cpf,
            cep: m.cep,
            city: m.city,
            state: m.state,
            profile_photo: m.profile_photo,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// What other users may see about a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: i32,
    pub name: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub profile_photo: Option<String>,
}

impl From<&Model> for PublicUser {
    fn from(m: &Model) -> Self {
        Self {
            id: m.id,
            name: m.name.clone(),
            city: m.city.clone(),
            state: m.state.clone(),
            profile_photo: m.profile_photo.clone(),
        }
    }
}
