use sea_orm::prelude::Expr;
use sea_orm::*;

use crate::models::ads::{self, AdStatus, CreateAd, PublicAdsQuery};
use crate::validation::geo::Coordinates;
use crate::validation::non_blank;

/// Insert a new listing. Every listing starts out pending moderation.
pub async fn insert_ad(db: &DatabaseConnection, input: CreateAd) -> Result<ads::Model, DbErr> {
    let new_ad = ads::ActiveModel {
        user_id: Set(input.user_id),
        title: Set(input.title),
        description: Set(input.description),
        category: Set(input.category),
        service_function: Set(input.service_function),
        status: Set(AdStatus::EmAnalise),
        rejection_reason: Set(None),
        city: Set(input.city),
        state: Set(input.state),
        neighborhood: Set(input.neighborhood),
        cep: Set(input.cep),
        latitude: Set(None),
        longitude: Set(None),
        service_radius_km: Set(input.service_radius_km),
        payment_methods: Set(serde_json::json!(input.payment_methods)),
        has_warranty: Set(input.has_warranty),
        attends_24h: Set(input.attends_24h),
        own_equipment: Set(input.own_equipment),
        specialized_team: Set(input.specialized_team),
        photos: Set(serde_json::json!(input.photos)),
        views: Set(0),
        ratings_count: Set(0),
        ratings_avg: Set(0.0),
        geocode_attempts: Set(0),
        geocode_next_attempt_at: Set(None),
        created_at: Set(chrono::Utc::now()),
        updated_at: Set(None),
        ..Default::default()
    };

    new_ad.insert(db).await
}

pub async fn get_ad_by_id(db: &DatabaseConnection, id: i32) -> Result<Option<ads::Model>, DbErr> {
    ads::Entity::find_by_id(id).one(db).await
}

/// One page of approved listings, newest first. Only the state is matched in
/// SQL; category and city need accent-insensitive matching, which
/// `ListingFilter` does on the loaded rows.
pub async fn get_public_page(
    db: &DatabaseConnection,
    query: &PublicAdsQuery,
) -> Result<Vec<ads::Model>, DbErr> {
    let mut select = ads::Entity::find().filter(ads::Column::Status.eq(AdStatus::Postado));

    if let Some(state) = non_blank(query.state.as_deref()) {
        select = select.filter(ads::Column::State.eq(state.to_uppercase()));
    }

    select
        .order_by_desc(ads::Column::CreatedAt)
        .order_by_desc(ads::Column::Id)
        .limit(query.limit())
        .offset(query.offset())
        .all(db)
        .await
}

/// Approved listings of one provider, newest first.
pub async fn get_approved_by_user(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<Vec<ads::Model>, DbErr> {
    ads::Entity::find()
        .filter(ads::Column::UserId.eq(user_id))
        .filter(ads::Column::Status.eq(AdStatus::Postado))
        .order_by_desc(ads::Column::CreatedAt)
        .all(db)
        .await
}

/// Every listing of one provider, any status.
pub async fn get_ads_by_user(db: &DatabaseConnection, user_id: i32) -> Result<Vec<ads::Model>, DbErr> {
    ads::Entity::find()
        .filter(ads::Column::UserId.eq(user_id))
        .order_by_desc(ads::Column::CreatedAt)
        .all(db)
        .await
}

/// Listings in one moderation state, oldest first so the queue is fair.
pub async fn get_ads_by_status(
    db: &DatabaseConnection,
    status: AdStatus,
) -> Result<Vec<ads::Model>, DbErr> {
    ads::Entity::find()
        .filter(ads::Column::Status.eq(status))
        .order_by_asc(ads::Column::CreatedAt)
        .all(db)
        .await
}

pub async fn increment_views(db: &DatabaseConnection, id: i32) -> Result<(), DbErr> {
    ads::Entity::update_many()
        .col_expr(ads::Column::Views, Expr::col(ads::Column::Views).add(1))
        .filter(ads::Column::Id.eq(id))
        .exec(db)
        .await?;
    Ok(())
}

/// Move a listing out of moderation. Only pending rows are touched, so a
/// concurrent decision on the same listing can't be overwritten.
///
/// Returns `None` when the listing was not pending anymore.
pub async fn update_status(
    db: &DatabaseConnection,
    id: i32,
    status: AdStatus,
    reason: Option<String>,
) -> Result<Option<ads::Model>, DbErr> {
    let reason = match status {
        AdStatus::Reprovado => reason,
        _ => None,
    };

    let result = ads::Entity::update_many()
        .col_expr(ads::Column::Status, Expr::value(status))
        .col_expr(ads::Column::RejectionReason, Expr::value(reason))
        .col_expr(ads::Column::UpdatedAt, Expr::value(Some(chrono::Utc::now())))
        .filter(ads::Column::Id.eq(id))
        .filter(ads::Column::Status.eq(AdStatus::EmAnalise))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Ok(None);
    }
    get_ad_by_id(db, id).await
}

pub async fn delete_ad(db: &DatabaseConnection, id: i32) -> Result<DeleteResult, DbErr> {
    ads::Entity::delete_by_id(id).exec(db).await
}

/// Number of listings per moderation state, every state present.
pub async fn count_by_status(db: &DatabaseConnection) -> Result<Vec<(AdStatus, u64)>, DbErr> {
    let mut counts = Vec::new();
    for status in [AdStatus::EmAnalise, AdStatus::Postado, AdStatus::Reprovado] {
        let count = ads::Entity::find()
            .filter(ads::Column::Status.eq(status))
            .count(db)
            .await?;
        counts.push((status, count));
    }
    Ok(counts)
}

// ── Coordinate backfill ──

/// Listings still missing coordinates whose retry time has come, excluding
/// those that used up `max_attempts`. Oldest first.
pub async fn find_due_for_enrichment<C>(
    db: &C,
    now: chrono::DateTime<chrono::Utc>,
    max_attempts: i32,
    limit: u64,
) -> Result<Vec<ads::Model>, DbErr>
where
    C: ConnectionTrait,
{
    ads::Entity::find()
        .filter(
            Condition::any()
                .add(ads::Column::Latitude.is_null())
                .add(ads::Column::Longitude.is_null()),
        )
        .filter(ads::Column::GeocodeAttempts.lt(max_attempts))
        .filter(
            Condition::any()
                .add(ads::Column::GeocodeNextAttemptAt.is_null())
                .add(ads::Column::GeocodeNextAttemptAt.lte(now)),
        )
        .order_by_asc(ads::Column::CreatedAt)
        .limit(limit)
        .all(db)
        .await
}

/// Persist a geocoding result without overwriting stored data: coordinates
/// are written as a pair only while one of them is missing, the neighborhood
/// only while it is null.
pub async fn store_coordinates<C>(
    db: &C,
    id: i32,
    coordinates: Coordinates,
    neighborhood: Option<&str>,
) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    ads::Entity::update_many()
        .col_expr(ads::Column::Latitude, Expr::value(coordinates.latitude))
        .col_expr(ads::Column::Longitude, Expr::value(coordinates.longitude))
        .col_expr(ads::Column::GeocodeAttempts, Expr::value(0))
        .col_expr(
            ads::Column::GeocodeNextAttemptAt,
            Expr::value(Option::<chrono::DateTime<chrono::Utc>>::None),
        )
        .filter(ads::Column::Id.eq(id))
        .filter(
            Condition::any()
                .add(ads::Column::Latitude.is_null())
                .add(ads::Column::Longitude.is_null()),
        )
        .exec(db)
        .await?;

    if let Some(neighborhood) = non_blank(neighborhood) {
        ads::Entity::update_many()
            .col_expr(ads::Column::Neighborhood, Expr::value(neighborhood.to_string()))
            .filter(ads::Column::Id.eq(id))
            .filter(ads::Column::Neighborhood.is_null())
            .exec(db)
            .await?;
    }

    Ok(())
}

/// Record a failed geocoding attempt and when to try again.
pub async fn record_geocode_failure<C>(
    db: &C,
    id: i32,
    attempts: i32,
    next_attempt_at: chrono::DateTime<chrono::Utc>,
) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    ads::Entity::update_many()
        .col_expr(ads::Column::GeocodeAttempts, Expr::value(attempts))
        .col_expr(ads::Column::GeocodeNextAttemptAt, Expr::value(Some(next_attempt_at)))
        .filter(ads::Column::Id.eq(id))
        .exec(db)
        .await?;
    Ok(())
}
