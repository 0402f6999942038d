use actix_web::{HttpResponse, web};
use sea_orm::{DatabaseConnection, DbErr};

use crate::db::{ads as ad_db, profiles as profile_db, users as user_db};
use crate::errors::{AppError, AppResult};
use crate::models::ads::{self, AdStatus, PublicAd, PublicAdsQuery};
use crate::models::profiles::ProviderContact;
use crate::models::users::PublicUser;
use crate::search::ListingFilter;

/// GET /api/ads/public: approved listings, newest first unless another sort
/// is asked for.
pub async fn get_public_ads(
    db: web::Data<DatabaseConnection>,
    query: web::Query<PublicAdsQuery>,
) -> AppResult<HttpResponse> {
    let query = query.into_inner();
    let rows = ad_db::get_public_page(db.get_ref(), &query).await?;
    let listings = to_public_ads(db.get_ref(), rows).await?;

    let filter = ListingFilter::from(&query);
    Ok(HttpResponse::Ok().json(filter.apply(listings)))
}

/// GET /api/ads/{id}: one approved listing. Counts as a view.
pub async fn get_public_ad(
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let mut ad = ad_db::get_ad_by_id(db.get_ref(), id)
        .await?
        .filter(|ad| ad.status == AdStatus::Postado)
        .ok_or_else(|| AppError::not_found("Anúncio não encontrado"))?;

    ad_db::increment_views(db.get_ref(), id).await?;
    ad.views += 1;

    let listing = to_public_ads(db.get_ref(), vec![ad])
        .await?
        .pop()
        .ok_or_else(|| AppError::not_found("Anúncio não encontrado"))?;

    Ok(HttpResponse::Ok().json(listing))
}

/// Attach owner and contact details, loading each related table once.
pub(crate) async fn to_public_ads(
    db: &DatabaseConnection,
    rows: Vec<ads::Model>,
) -> Result<Vec<PublicAd>, DbErr> {
    let mut owner_ids: Vec<i32> = rows.iter().map(|ad| ad.user_id).collect();
    owner_ids.sort_unstable();
    owner_ids.dedup();

    let owners = user_db::get_users_by_ids(db, owner_ids.clone()).await?;
    let profiles = profile_db::get_profiles_by_user_ids(db, owner_ids).await?;

    Ok(rows
        .into_iter()
        .map(|ad| {
            let owner = owners.get(&ad.user_id).map(PublicUser::from);
            let contact = profiles.get(&ad.user_id).map(ProviderContact::from).unwrap_or_default();
            PublicAd::new(ad, owner, contact)
        })
        .collect())
}
