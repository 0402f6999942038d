use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::ads::PublicAd;
use super::reviews::{RatingSummary, ReviewView};
use super::users;

/// Where the provider works: at the client's place, at their own, or both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum ServiceType {
    #[sea_orm(string_value = "domicilio")]
    Domicilio,
    #[sea_orm(string_value = "estabelecimento")]
    Estabelecimento,
    #[sea_orm(string_value = "ambos")]
    Ambos,
}

/// SeaORM entity for the `provider_profiles` table. One row per provider user;
/// a missing row means the provider has not completed their profile yet.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "provider_profiles")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: i32,
    pub address: Option<String>,
    pub address_number: Option<String>,
    pub complement: Option<String>,
    pub neighborhood: Option<String>,
    pub cep: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub category: Option<String>,
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
    pub cpf: Option<String>,
    pub service_type: Option<ServiceType>,
    pub service_radius_km: Option<i32>,
    pub issues_invoice: bool,
    pub has_cnpj: bool,
    pub cnpj: Option<String>,
    #[sea_orm(column_type = "JsonBinary")]
    pub availability: Json,
    #[sea_orm(column_type = "Text", nullable)]
    pub bio: Option<String>,
    pub updated_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    User,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// ── DTOs ──

/// Body of `PUT /api/provider/profile`.
///
/// The whole profile is sent on every save, so absent optional fields clear
/// the stored value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertProfile {
    pub name: String,
    pub address: Option<String>,
    pub address_number: Option<String>,
    pub complement: Option<String>,
    pub neighborhood: Option<String>,
    pub cep: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub category: Option<String>,
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
    pub cpf: Option<String>,
    pub service_type: Option<ServiceType>,
    pub service_radius_km: Option<i32>,
    #[serde(default)]
    pub issues_invoice: bool,
    #[serde(default)]
    pub has_cnpj: bool,
    pub cnpj: Option<String>,
    #[serde(default)]
    pub availability: Vec<String>,
    pub bio: Option<String>,
}

/// Contact block attached to public listings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderContact {
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
}

impl From<&Model> for ProviderContact {
    fn from(m: &Model) -> Self {
        Self {
            phone: m.phone.clone(),
            whatsapp: m.whatsapp.clone(),
        }
    }
}

/// Query string of `GET /api/providers/search`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderSearchQuery {
    pub category: Option<String>,
    pub city: Option<String>,
    pub min_rating: Option<f64>,
    pub search: Option<String>,
}

/// A provider as listed in search results.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderCard {
    pub id: i32,
    pub name: String,
    pub profile_photo: Option<String>,
    pub category: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub neighborhood: Option<String>,
    pub service_type: Option<ServiceType>,
    pub service_radius_km: Option<i32>,
    pub bio: Option<String>,
    pub rating: RatingSummary,
}

impl ProviderCard {
    pub fn new(user: &users::Model, profile: &Model, rating: RatingSummary) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            profile_photo: user.profile_photo.clone(),
            category: profile.category.clone(),
            city: profile.city.clone(),
            state: profile.state.clone(),
            neighborhood: profile.neighborhood.clone(),
            service_type: profile.service_type,
            service_radius_km: profile.service_radius_km,
            bio: profile.bio.clone(),
            rating,
        }
    }
}

/// Everything on a provider's public page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderDetail {
    pub provider: ProviderCard,
    pub contact: ProviderContact,
    pub availability: Vec<String>,
    pub ads: Vec<PublicAd>,
    pub reviews: Vec<ReviewView>,
}
