use actix_web::{HttpResponse, web};
use sea_orm::DatabaseConnection;

use crate::cache::{ResponseCache, keys};
use crate::config::AppConfig;
use crate::db::categories as category_db;
use crate::errors::AppResult;
use crate::models::categories;

/// GET /api/categories
pub async fn get_categories(
    db: web::Data<DatabaseConnection>,
    cache: web::Data<ResponseCache>,
    config: web::Data<AppConfig>,
) -> AppResult<HttpResponse> {
    let key = keys::categories();
    if let Some(cached) = cache.get::<Vec<categories::Model>>(&key).await {
        return Ok(HttpResponse::Ok().json(cached));
    }

    let all = category_db::get_all_categories(db.get_ref()).await?;
    cache.set(&key, &all, config.cache.categories_ttl).await;

    Ok(HttpResponse::Ok().json(all))
}
