use actix_cors::Cors;
use actix_files::Files;
use actix_web::{App, HttpServer, middleware::Logger, web};
use antly_backend::auth::middleware::JwtSecret;
use antly_backend::cache::{RedisCache, ResponseCache};
use antly_backend::config::AppConfig;
use antly_backend::create_pool;
use antly_backend::geocoding::{
    self, CachedGeocoder, EnrichmentHandle, EnrichmentWorker, Enricher, Geocoder, NominatimClient,
    PostalLookup, ViaCepClient,
};
use antly_backend::handlers;
use dotenv::dotenv;
use migration::{Migrator, MigratorTrait};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("configuration error: {e}");
            std::process::exit(1);
        }
    };

    let db = create_pool(&config.database_url)
        .await
        .map_err(std::io::Error::other)?;

    if config.run_migrations {
        Migrator::up(&db, None).await.map_err(std::io::Error::other)?;
        tracing::info!("Migrations applied");
    }

    // Redis is optional; without it responses are simply not cached.
    let response_cache = match config.redis_url.as_deref() {
        Some(url) => match RedisCache::new(url).await {
            Ok(redis) => {
                tracing::info!("Connected to Redis");
                ResponseCache::new(Some(redis))
            }
            Err(e) => {
                tracing::warn!("Redis unavailable, caching disabled: {e}");
                ResponseCache::disabled()
            }
        },
        None => ResponseCache::disabled(),
    };

    // Geocoding clients and the background coordinate backfill.
    let http = geocoding::http_client(&config.geocoding).map_err(std::io::Error::other)?;
    let postal: Arc<dyn PostalLookup> = Arc::new(ViaCepClient::new(
        http.clone(),
        &config.geocoding.viacep_base_url,
    ));
    let geocoder: Arc<dyn Geocoder> = Arc::new(CachedGeocoder::new(
        NominatimClient::new(
            http,
            &config.geocoding.nominatim_base_url,
            config.geocoding.min_interval,
        ),
        config.geocoding.cache_ttl,
        config.geocoding.cache_capacity,
    ));

    let enrichment = EnrichmentHandle::new(
        Enricher::new(postal.clone(), geocoder, &config.enrichment),
        config.enrichment.clone(),
    );
    EnrichmentWorker::new(db.clone(), enrichment.clone()).spawn();

    let bind_addr = format!("0.0.0.0:{}", config.port);
    let static_dir = config.static_dir.clone();

    let db_data = web::Data::new(db);
    let cache_data = web::Data::new(response_cache);
    let postal_data = web::Data::new(postal);
    let enrichment_data = web::Data::new(enrichment);
    let secret_data = web::Data::new(JwtSecret(config.jwt_secret.clone()));
    let config_data = web::Data::new(config);

    tracing::info!("Server running at http://{bind_addr}");

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .max_age(3600);

        let mut app = App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(handlers::json_config())
            .app_data(handlers::query_config())
            .app_data(db_data.clone())
            .app_data(cache_data.clone())
            .app_data(postal_data.clone())
            .app_data(enrichment_data.clone())
            .app_data(secret_data.clone())
            .app_data(config_data.clone())
            .service(web::scope("/api").configure(handlers::init_routes));

        if let Some(dir) = &static_dir {
            app = app.service(Files::new("/", dir).index_file("index.html"));
        }
        app
    })
    .bind(&bind_addr)?
    .run()
    .await
}
