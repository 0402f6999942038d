use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::profiles::ProviderContact;
use super::users::PublicUser;

/// Moderation state of a listing. Stored with the Portuguese labels the
/// dashboard shows.
///
/// The only transitions are `EmAnalise -> Postado` and `EmAnalise -> Reprovado`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum AdStatus {
    #[sea_orm(string_value = "Em Analise")]
    #[serde(rename = "Em Analise", alias = "pending")]
    EmAnalise,
    #[sea_orm(string_value = "Postado")]
    #[serde(rename = "Postado", alias = "approved")]
    Postado,
    #[sea_orm(string_value = "Reprovado")]
    #[serde(rename = "Reprovado", alias = "rejected")]
    Reprovado,
}

impl AdStatus {
    pub fn can_transition_to(self, next: AdStatus) -> bool {
        matches!(
            (self, next),
            (AdStatus::EmAnalise, AdStatus::Postado) | (AdStatus::EmAnalise, AdStatus::Reprovado)
        )
    }
}

/// SeaORM entity for the `provider_ads` table.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "provider_ads")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub category: String,
    pub service_function: String,
    pub status: AdStatus,
    #[sea_orm(column_type = "Text", nullable)]
    pub rejection_reason: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub neighborhood: Option<String>,
    pub cep: Option<String>,
    #[sea_orm(column_type = "Double", nullable)]
    pub latitude: Option<f64>,
    #[sea_orm(column_type = "Double", nullable)]
    pub longitude: Option<f64>,
    pub service_radius_km: Option<i32>,
    #[sea_orm(column_type = "JsonBinary")]
    pub payment_methods: Json,
    pub has_warranty: bool,
    pub attends_24h: bool,
    pub own_equipment: bool,
    pub specialized_team: bool,
    #[sea_orm(column_type = "JsonBinary")]
    pub photos: Json,
    pub views: i32,
    pub ratings_count: i32,
    #[sea_orm(column_type = "Double")]
    pub ratings_avg: f64,
    #[serde(skip)]
    pub geocode_attempts: i32,
    #[serde(skip)]
    pub geocode_next_attempt_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
}

impl Model {
    pub fn has_coordinates(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Read a JSON string array column, ignoring anything that is not a string.
pub fn json_strings(value: &Json) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

// ── DTOs ──

pub const TITLE_MIN_CHARS: usize = 10;
pub const TITLE_MAX_CHARS: usize = 80;
pub const MAX_PHOTOS: usize = 7;

/// Body of `POST /api/provider/ads`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAdRequest {
    pub title: String,
    pub service_function: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub photos: Vec<String>,
    #[serde(default)]
    pub payment_methods: Vec<String>,
    #[serde(default)]
    pub has_warranty: bool,
    #[serde(default)]
    pub attends_24h: bool,
    #[serde(default)]
    pub own_equipment: bool,
    #[serde(default)]
    pub specialized_team: bool,
}

/// Fully resolved listing ready for insert.
#[derive(Debug, Clone)]
pub struct CreateAd {
    pub user_id: i32,
    pub title: String,
    pub description: String,
    pub category: String,
    pub service_function: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub neighborhood: Option<String>,
    pub cep: Option<String>,
    pub service_radius_km: Option<i32>,
    pub payment_methods: Vec<String>,
    pub photos: Vec<String>,
    pub has_warranty: bool,
    pub attends_24h: bool,
    pub own_equipment: bool,
    pub specialized_team: bool,
}

/// Body of `PUT /api/admin/ads/{id}/status`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateAdStatus {
    pub status: AdStatus,
    pub reason: Option<String>,
}

/// Query string of `GET /api/ads/public`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicAdsQuery {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub category: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub radius_km: Option<f64>,
    pub min_rating: Option<f64>,
    pub search: Option<String>,
    pub sort: Option<String>,
}

impl PublicAdsQuery {
    pub fn limit(&self) -> u64 {
        self.limit.unwrap_or(50).clamp(1, 100)
    }

    pub fn offset(&self) -> u64 {
        self.offset.unwrap_or(0)
    }
}

/// Query string of `GET /api/admin/ads`.
#[derive(Debug, Clone, Deserialize)]
pub struct ModerationQuery {
    pub status: Option<AdStatus>,
}

/// A listing as shown on public pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicAd {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub category: String,
    pub service_function: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub neighborhood: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub service_radius_km: Option<i32>,
    pub payment_methods: Vec<String>,
    pub has_warranty: bool,
    pub attends_24h: bool,
    pub own_equipment: bool,
    pub specialized_team: bool,
    pub photos: Vec<String>,
    pub views: i32,
    pub ratings_count: i32,
    pub ratings_avg: f64,
    pub created_at: DateTimeUtc,
    pub provider: Option<PublicUser>,
    pub contact: ProviderContact,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

impl PublicAd {
    pub fn new(ad: Model, provider: Option<PublicUser>, contact: ProviderContact) -> Self {
        Self {
            payment_methods: json_strings(&ad.payment_methods),
            photos: json_strings(&ad.photos),
            id: ad.id,
            title: ad.title,
            description: ad.description,
            category: ad.category,
            service_function: ad.service_function,
            city: ad.city,
            state: ad.state,
            neighborhood: ad.neighborhood,
            latitude: ad.latitude,
            longitude: ad.longitude,
            service_radius_km: ad.service_radius_km,
            has_warranty: ad.has_warranty,
            attends_24h: ad.attends_24h,
            own_equipment: ad.own_equipment,
            specialized_team: ad.specialized_team,
            views: ad.views,
            ratings_count: ad.ratings_count,
            ratings_avg: ad.ratings_avg,
            created_at: ad.created_at,
            provider,
            contact,
            distance_km: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_pending_ads_move() {
        assert!(AdStatus::EmAnalise.can_transition_to(AdStatus::Postado));
        assert!(AdStatus::EmAnalise.can_transition_to(AdStatus::Reprovado));
        assert!(!AdStatus::Postado.can_transition_to(AdStatus::Reprovado));
        assert!(!AdStatus::Reprovado.can_transition_to(AdStatus::Postado));
        assert!(!AdStatus::EmAnalise.can_transition_to(AdStatus::EmAnalise));
    }

    #[test]
    fn status_accepts_labels_and_english_aliases() {
        let s: AdStatus = serde_json::from_str("\"Postado\"").unwrap();
        assert_eq!(s, AdStatus::Postado);
        let s: AdStatus = serde_json::from_str("\"rejected\"").unwrap();
        assert_eq!(s, AdStatus::Reprovado);
        assert_eq!(serde_json::to_string(&AdStatus::EmAnalise).unwrap(), "\"Em Analise\"");
    }

    #[test]
    fn json_strings_skips_non_strings() {
        let v = serde_json::json!(["pix", 3, "cartão", null]);
        assert_eq!(json_strings(&v), vec!["pix", "cartão"]);
        assert!(json_strings(&serde_json::json!({})).is_empty());
    }
}
