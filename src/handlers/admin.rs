use actix_web::{HttpResponse, web};
use sea_orm::DatabaseConnection;
use std::collections::BTreeMap;

use crate::auth::authorization::require_role;
use crate::auth::middleware::AuthenticatedUser;
use crate::cache::{ResponseCache, keys};
use crate::db::{ads as ad_db, users as user_db};
use crate::errors::{AppError, AppResult};
use crate::geocoding::EnrichmentHandle;
use crate::models::ads::{AdStatus, ModerationQuery, UpdateAdStatus};
use crate::models::users::Roles;
use crate::validation::non_blank;

/// GET /api/admin/ads?status=: moderation queue, pending by default.
pub async fn get_ads_for_review(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    query: web::Query<ModerationQuery>,
) -> AppResult<HttpResponse> {
    require_role(&user.0, Roles::Admin)?;

    let status = query.status.unwrap_or(AdStatus::EmAnalise);
    let ads = ad_db::get_ads_by_status(db.get_ref(), status).await?;
    Ok(HttpResponse::Ok().json(ads))
}

/// PUT /api/admin/ads/{id}/status: approve or reject a pending listing.
pub async fn update_ad_status(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    cache: web::Data<ResponseCache>,
    path: web::Path<i32>,
    body: web::Json<UpdateAdStatus>,
) -> AppResult<HttpResponse> {
    require_role(&user.0, Roles::Admin)?;

    let id = path.into_inner();
    let UpdateAdStatus { status, reason } = body.into_inner();

    let current = ad_db::get_ad_by_id(db.get_ref(), id)
        .await?
        .ok_or_else(|| AppError::not_found("Anúncio não encontrado"))?;

    if !current.status.can_transition_to(status) {
        return Err(AppError::bad_request("Apenas anúncios em análise podem ser moderados"));
    }

    let reason = non_blank(reason.as_deref()).map(str::to_string);
    let updated = ad_db::update_status(db.get_ref(), id, status, reason)
        .await?
        // Someone else decided first.
        .ok_or_else(|| AppError::bad_request("Apenas anúncios em análise podem ser moderados"))?;

    cache.invalidate(&keys::provider(updated.user_id)).await;
    tracing::info!(ad_id = id, admin_id = user.0.id, status = ?status, "listing moderated");

    Ok(HttpResponse::Ok().json(updated))
}

/// GET /api/admin/stats: account and listing counts for the dashboard.
pub async fn get_stats(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
) -> AppResult<HttpResponse> {
    require_role(&user.0, Roles::Admin)?;

    let users: BTreeMap<Roles, u64> = user_db::count_by_role(db.get_ref()).await?.into_iter().collect();
    let ads: BTreeMap<AdStatus, u64> = ad_db::count_by_status(db.get_ref()).await?.into_iter().collect();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "users": users,
        "ads": ads,
    })))
}

/// POST /api/admin/enrichment/run: run one coordinate backfill batch now.
pub async fn run_enrichment(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    enrichment: web::Data<EnrichmentHandle>,
) -> AppResult<HttpResponse> {
    require_role(&user.0, Roles::Admin)?;

    let report = enrichment.run_batch(db.get_ref()).await?;
    tracing::info!(admin_id = user.0.id, ?report, "manual enrichment batch");

    Ok(HttpResponse::Ok().json(report))
}
