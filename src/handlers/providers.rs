use actix_web::{HttpResponse, web};
use sea_orm::DatabaseConnection;

use crate::cache::{ResponseCache, keys};
use crate::config::AppConfig;
use crate::db::{ads as ad_db, profiles as profile_db, reviews as review_db, users as user_db};
use crate::errors::{AppError, AppResult};
use crate::handlers::ads::to_public_ads;
use crate::models::ads::json_strings;
use crate::models::profiles::{ProviderCard, ProviderContact, ProviderDetail, ProviderSearchQuery};
use crate::models::users::Roles;
use crate::validation::non_blank;
use crate::validation::text::{contains_normalized, normalize_text};

const LATEST_REVIEWS: u64 = 10;

/// GET /api/providers/search: providers with a filled-in profile, best rated
/// first.
pub async fn search_providers(
    db: web::Data<DatabaseConnection>,
    query: web::Query<ProviderSearchQuery>,
) -> AppResult<HttpResponse> {
    let query = query.into_inner();

    let providers = user_db::get_providers(db.get_ref()).await?;
    let ids: Vec<i32> = providers.iter().map(|u| u.id).collect();
    let profiles = profile_db::get_profiles_by_user_ids(db.get_ref(), ids.clone()).await?;
    let ratings = review_db::rating_summaries(db.get_ref(), ids).await?;

    let mut cards: Vec<ProviderCard> = providers
        .iter()
        .filter_map(|user| {
            let profile = profiles.get(&user.id)?;
            let rating = ratings.get(&user.id).copied().unwrap_or_default();
            Some(ProviderCard::new(user, profile, rating))
        })
        .filter(|card| matches_search(card, &query))
        .collect();

    cards.sort_by(|a, b| {
        b.rating
            .average
            .total_cmp(&a.rating.average)
            .then(b.rating.count.cmp(&a.rating.count))
    });

    Ok(HttpResponse::Ok().json(cards))
}

/// GET /api/providers/{id}: public provider page, cached when Redis is on.
pub async fn get_provider(
    db: web::Data<DatabaseConnection>,
    cache: web::Data<ResponseCache>,
    config: web::Data<AppConfig>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let cache_key = keys::provider(id);

    if let Some(detail) = cache.get::<ProviderDetail>(&cache_key).await {
        return Ok(HttpResponse::Ok().json(detail));
    }

    let not_found = || AppError::not_found("Prestador não encontrado");

    let user = user_db::get_user_by_id(db.get_ref(), id)
        .await?
        .filter(|u| u.role == Roles::Provider)
        .ok_or_else(not_found)?;
    let profile = profile_db::get_profile(db.get_ref(), id)
        .await?
        .ok_or_else(not_found)?;

    let rating = review_db::rating_summaries(db.get_ref(), vec![id])
        .await?
        .remove(&id)
        .unwrap_or_default();
    let ads = ad_db::get_approved_by_user(db.get_ref(), id).await?;
    let reviews = review_db::latest_reviews(db.get_ref(), id, LATEST_REVIEWS).await?;

    let detail = ProviderDetail {
        provider: ProviderCard::new(&user, &profile, rating),
        contact: ProviderContact::from(&profile),
        availability: json_strings(&profile.availability),
        ads: to_public_ads(db.get_ref(), ads).await?,
        reviews,
    };

    cache
        .set(&cache_key, &detail, config.cache.provider_ttl)
        .await;

    Ok(HttpResponse::Ok().json(detail))
}

fn matches_search(card: &ProviderCard, query: &ProviderSearchQuery) -> bool {
    if let Some(category) = non_blank(query.category.as_deref()) {
        let wanted = normalize_text(category);
        if card.category.as_deref().map(normalize_text) != Some(wanted) {
            return false;
        }
    }

    if let Some(city) = non_blank(query.city.as_deref()) {
        let wanted = normalize_text(city);
        if card.city.as_deref().map(normalize_text) != Some(wanted) {
            return false;
        }
    }

    if let Some(min) = query.min_rating {
        if card.rating.average < min {
            return false;
        }
    }

    if let Some(needle) = non_blank(query.search.as_deref()) {
        let haystack = [
            Some(card.name.as_str()),
            card.category.as_deref(),
            card.bio.as_deref(),
            card.city.as_deref(),
        ];
        if !haystack
            .into_iter()
            .flatten()
            .any(|text| contains_normalized(text, needle))
        {
            return false;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::reviews::RatingSummary;

    fn card(name: &str, category: &str, city: &str, average: f64) -> ProviderCard {
        ProviderCard {
            id: 1,
            name: name.into(),
            profile_photo: None,
            category: Some(category.into()),
            city: Some(city.into()),
            state: Some("SP".into()),
            neighborhood: None,
            service_type: None,
            service_radius_km: None,
            bio: Some("Atendo emergências elétricas".into()),
            rating: RatingSummary { average, count: 3 },
        }
    }

    #[test]
    fn search_ignores_accents_and_case() {
        let c = card("José Antônio", "Eletricista", "São Paulo", 4.5);
        let query = ProviderSearchQuery {
            city: Some("sao paulo".into()),
            search: Some("EMERGENCIA".into()),
            ..Default::default()
        };
        assert!(matches_search(&c, &query));
    }

    #[test]
    fn category_and_rating_must_match() {
        let c = card("José", "Eletricista", "Campinas", 3.9);
        let by_category = ProviderSearchQuery {
            category: Some("Encanador".into()),
            ..Default::default()
        };
        assert!(!matches_search(&c, &by_category));

        let by_rating = ProviderSearchQuery {
            min_rating: Some(4.0),
            ..Default::default()
        };
        assert!(!matches_search(&c, &by_rating));
    }
}
