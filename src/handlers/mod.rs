pub mod admin;
pub mod ads;
pub mod auth;
pub mod categories;
pub mod cep;
pub mod provider;
pub mod providers;
pub mod users;

use actix_web::{error, web};

use crate::errors::AppError;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    // ── Auth ──
    cfg.service(
        web::scope("/auth")
            .route("/register", web::post().to(auth::register))
            .route("/login", web::post().to(auth::login))
            .route("/logout", web::post().to(auth::logout))
            .route("/me", web::get().to(auth::me)),
    );

    // ── Public listings and provider pages ──
    cfg.service(
        web::scope("/ads")
            .route("/public", web::get().to(ads::get_public_ads))
            .route("/{id}", web::get().to(ads::get_public_ad)),
    );
    cfg.service(
        web::scope("/providers")
            .route("/search", web::get().to(providers::search_providers))
            .route("/{id}", web::get().to(providers::get_provider)),
    );
    cfg.route("/categories", web::get().to(categories::get_categories));
    cfg.route("/cep/{cep}", web::get().to(cep::lookup_cep));

    // ── Logged-in users ──
    cfg.route("/users/me", web::put().to(users::update_me));

    // ── Provider area (provider role) ──
    cfg.service(
        web::scope("/provider")
            .route("/ads", web::get().to(provider::get_my_ads))
            .route("/ads", web::post().to(provider::create_ad))
            .route("/ads/{id}", web::delete().to(provider::delete_ad))
            .route("/profile", web::get().to(provider::get_profile))
            .route("/profile", web::put().to(provider::upsert_profile)),
    );

    // ── Admin dashboard (admin role) ──
    cfg.service(
        web::scope("/admin")
            .route("/ads", web::get().to(admin::get_ads_for_review))
            .route("/ads/{id}/status", web::put().to(admin::update_ad_status))
            .route("/stats", web::get().to(admin::get_stats))
            .route("/enrichment/run", web::post().to(admin::run_enrichment)),
    );
}

/// Malformed JSON bodies become a 400 with the usual `{ "error": ... }` body.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        tracing::debug!("rejected JSON body: {err}");
        error::Error::from(AppError::bad_request(format!("Corpo da requisição inválido: {err}")))
    })
}

/// Same for query strings.
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        error::Error::from(AppError::bad_request(format!("Parâmetros inválidos: {err}")))
    })
}
