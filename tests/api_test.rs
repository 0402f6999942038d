//! HTTP-level tests against the real route table, backed by SeaORM's mock
//! database. Each test queues exactly the query results its request needs;
//! an unexpected extra query makes the mock fail and the request return 500.
//!
//! Run with: `cargo test --test api_test`
use std::sync::Arc;
use std::time::Duration;

use actix_web::{App, http::StatusCode, test, web};
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};

use antly_backend::auth::jwt::issue_token;
use antly_backend::auth::middleware::JwtSecret;
use antly_backend::cache::ResponseCache;
use antly_backend::config::{AppConfig, CacheConfig, EnrichmentConfig, GeocodingConfig};
use antly_backend::geocoding::{
    Coordinates, EnrichmentHandle, Enricher, GeocodeError, Geocoder, PostalAddress, PostalLookup,
};
use antly_backend::handlers;
use antly_backend::models::ads::{self, AdStatus};
use antly_backend::models::profiles;
use antly_backend::models::users::{self, Roles};

const SECRET: &str = "api-test-secret-xxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxx";

struct NoPostal;

#[async_trait]
impl PostalLookup for NoPostal {
    async fn lookup(&self, _cep: &str) -> Option<PostalAddress> {
        None
    }
}

struct NoGeocoder;

#[async_trait]
impl Geocoder for NoGeocoder {
    async fn geocode(&self, _query: &str) -> Result<Option<Coordinates>, GeocodeError> {
        Ok(None)
    }
}

fn test_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://unused".to_string(),
        port: "0".to_string(),
        jwt_secret: SECRET.to_string(),
        jwt_ttl: Duration::from_secs(3600),
        redis_url: None,
        static_dir: None,
        run_migrations: false,
        geocoding: GeocodingConfig::default(),
        enrichment: EnrichmentConfig::default(),
        cache: CacheConfig::default(),
    }
}

macro_rules! test_app {
    ($db:expr) => {{
        let postal: Arc<dyn PostalLookup> = Arc::new(NoPostal);
        let enrichment = EnrichmentHandle::new(
            Enricher::new(postal.clone(), Arc::new(NoGeocoder), &EnrichmentConfig::default()),
            EnrichmentConfig::default(),
        );
        test::init_service(
            App::new()
                .app_data(handlers::json_config())
                .app_data(handlers::query_config())
                .app_data(web::Data::new($db))
                .app_data(web::Data::new(JwtSecret(SECRET.to_string())))
                .app_data(web::Data::new(ResponseCache::disabled()))
                .app_data(web::Data::new(test_config()))
                .app_data(web::Data::new(postal))
                .app_data(web::Data::new(enrichment))
                .service(web::scope("/api").configure(handlers::init_routes)),
        )
        .await
    }};
}

fn empty_db() -> DatabaseConnection {
    MockDatabase::new(DatabaseBackend::Postgres).into_connection()
}

fn user(id: i32, role: Roles) -> users::Model {
    users::Model {
        id,
        name: "Rafael Costa".to_string(),
        email: format!("user{id}@antly.com.br"),
        role,
        password_hash: "$2b$12$unused".to_string(),
        phone: None,
        cpf: None,
        cep: None,
        city: Some("São Paulo".to_string()),
        state: Some("SP".to_string()),
        profile_photo: None,
        created_at: Utc::now(),
        updated_at: None,
    }
}

fn approved_ad(id: i32, user_id: i32, latitude: f64, longitude: f64) -> ads::Model {
    ads::Model {
        id,
        user_id,
        title: format!("Serviço de pintura {id}"),
        description: "Pintura residencial".to_string(),
        category: "Pintor".to_string(),
        service_function: "Pintor".to_string(),
        status: AdStatus::Postado,
        rejection_reason: None,
        city: Some("São Paulo".to_string()),
        state: Some("SP".to_string()),
        neighborhood: None,
        cep: None,
        latitude: Some(latitude),
        longitude: Some(longitude),
        service_radius_km: Some(50),
        payment_methods: serde_json::json!(["pix", "dinheiro"]),
        has_warranty: false,
        attends_24h: false,
        own_equipment: true,
        specialized_team: false,
        photos: serde_json::json!([]),
        views: 3,
        ratings_count: 0,
        ratings_avg: 0.0,
        geocode_attempts: 0,
        geocode_next_attempt_at: None,
        created_at: Utc::now(),
        updated_at: None,
    }
}

fn pending_ad(id: i32, user_id: i32) -> ads::Model {
    ads::Model {
        status: AdStatus::EmAnalise,
        latitude: None,
        longitude: None,
        ..approved_ad(id, user_id, 0.0, 0.0)
    }
}

fn complete_profile(user_id: i32) -> profiles::Model {
    profiles::Model {
        user_id,
        address: Some("Rua Augusta".into()),
        address_number: Some("100".into()),
        complement: None,
        neighborhood: Some("Consolação".into()),
        cep: Some("01305000".into()),
        city: Some("São Paulo".into()),
        state: Some("SP".into()),
        category: Some("Eletricista".into()),
        phone: Some("11987654321".into()),
        whatsapp: Some("11912345678".into()),
        cpf: Some("529.982.247-25".into()),
        service_type: Some(profiles::ServiceType::Domicilio),
        service_radius_km: Some(10),
        issues_invoice: false,
        has_cnpj: false,
        cnpj: None,
        availability: serde_json::json!([]),
        bio: Some("Atendo toda a zona sul".into()),
        updated_at: None,
    }
}

fn bearer(user: &users::Model) -> (&'static str, String) {
    let token = issue_token(user, SECRET, Duration::from_secs(600)).unwrap();
    ("Authorization", format!("Bearer {token}"))
}

#[actix_web::test]
async fn me_without_token_is_unauthorized() {
    let app = test_app!(empty_db());

    let req = test::TestRequest::get().uri("/api/auth/me").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(body["error"].is_string());
}

#[actix_web::test]
async fn me_with_bearer_token_returns_user() {
    let provider = user(5, Roles::Provider);
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![provider.clone()]])
        .into_connection();
    let app = test_app!(db);

    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header(bearer(&provider))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["id"], 5);
    assert_eq!(body["role"], "provider");
    assert!(body.get("passwordHash").is_none());
}

#[actix_web::test]
async fn register_rejects_invalid_cpf_before_touching_the_database() {
    let app = test_app!(empty_db());

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(serde_json::json!({
            "name": "Paula Dias",
            "email": "paula@antly.com.br",
            "password": "segredo123",
            "cpf": "529.982.247-26",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "CPF inválido");
}

#[actix_web::test]
async fn register_refuses_admin_accounts() {
    let app = test_app!(empty_db());

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(serde_json::json!({
            "name": "Mallory",
            "email": "mallory@antly.com.br",
            "password": "segredo123",
            "role": "admin",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn register_short_password_is_rejected() {
    let app = test_app!(empty_db());

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(serde_json::json!({
            "name": "Paula Dias",
            "email": "paula@antly.com.br",
            "password": "12345",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn login_with_unknown_email_is_unauthorized() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<users::Model>::new()])
        .into_connection();
    let app = test_app!(db);

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(serde_json::json!({
            "email": "ninguem@antly.com.br",
            "password": "qualquer",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "E-mail ou senha incorretos");
}

#[actix_web::test]
async fn malformed_json_is_a_bad_request() {
    let app = test_app!(empty_db());

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(body["error"].is_string());
}

#[actix_web::test]
async fn public_listing_applies_radius_filter() {
    // Origin in central São Paulo; the second listing is ~15 km north.
    let near = approved_ad(1, 9, -23.5505, -46.6333);
    let far = approved_ad(2, 9, -23.4156, -46.6333);

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![near, far]])
        .append_query_results([vec![user(9, Roles::Provider)]])
        .append_query_results([Vec::<profiles::Model>::new()])
        .into_connection();
    let app = test_app!(db);

    let req = test::TestRequest::get()
        .uri("/api/ads/public?lat=-23.5505&lon=-46.6333&radiusKm=10")
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

    let items = body.as_array().expect("array of listings");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], 1);
    assert_eq!(items[0]["provider"]["id"], 9);
    assert!(items[0]["distanceKm"].as_f64().unwrap() < 0.01);
    assert_eq!(items[0]["paymentMethods"], serde_json::json!(["pix", "dinheiro"]));
}

#[actix_web::test]
async fn clients_cannot_create_listings() {
    let client = user(3, Roles::Client);
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![client.clone()]])
        .into_connection();
    let app = test_app!(db);

    let req = test::TestRequest::post()
        .uri("/api/provider/ads")
        .insert_header(bearer(&client))
        .set_json(serde_json::json!({
            "title": "Limpeza pós-obra completa",
            "serviceFunction": "Diarista",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn short_title_is_rejected_before_profile_lookup() {
    let provider = user(4, Roles::Provider);
    // Only the session user is queued: a profile query would fail the mock.
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![provider.clone()]])
        .into_connection();
    let app = test_app!(db);

    let req = test::TestRequest::post()
        .uri("/api/provider/ads")
        .insert_header(bearer(&provider))
        .set_json(serde_json::json!({
            "title": "123456789",
            "serviceFunction": "Eletricista",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn provider_without_phone_cannot_publish() {
    let provider = user(4, Roles::Provider);
    let profile = profiles::Model {
        phone: None,
        ..complete_profile(4)
    };
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![provider.clone()]])
        .append_query_results([vec![profile]])
        .into_connection();
    let app = test_app!(db);

    let req = test::TestRequest::post()
        .uri("/api/provider/ads")
        .insert_header(bearer(&provider))
        .set_json(serde_json::json!({
            "title": "Instalação de chuveiro elétrico",
            "serviceFunction": "Eletricista",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Complete seu perfil: informe o telefone");
}

#[actix_web::test]
async fn malformed_cep_is_rejected() {
    let app = test_app!(empty_db());

    let req = test::TestRequest::get().uri("/api/cep/1234").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn provider_listing_is_created_pending_with_profile_details() {
    let provider = user(4, Roles::Provider);
    let created = ads::Model {
        title: "Reparo fio".to_string(),
        description: "Atendo toda a zona sul".to_string(),
        category: "Eletricista".to_string(),
        service_function: "Eletricista".to_string(),
        ..pending_ad(30, 4)
    };
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![provider.clone()]])
        .append_query_results([vec![complete_profile(4)]])
        .append_query_results([vec![created]])
        .into_connection();
    let log = db.clone();
    let app = test_app!(db);

    // Exactly the 10-character minimum, with a blank description.
    let req = test::TestRequest::post()
        .uri("/api/provider/ads")
        .insert_header(bearer(&provider))
        .set_json(serde_json::json!({
            "title": "Reparo fio",
            "serviceFunction": "Eletricista",
            "description": "   ",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["id"], 30);
    assert_eq!(body["status"], "Em Analise");

    let transactions = log.into_transaction_log();
    let insert = transactions
        .last()
        .expect("insert was issued")
        .statements()[0]
        .to_string();
    assert!(insert.starts_with(r#"INSERT INTO "provider_ads""#), "{insert}");
    assert!(insert.contains("'Em Analise'"), "{insert}");
    assert!(insert.contains("'Atendo toda a zona sul'"), "{insert}");
    assert!(insert.contains("'Eletricista'"), "{insert}");
    assert!(insert.contains("'São Paulo'"), "{insert}");
    assert!(insert.contains("'SP'"), "{insert}");
}

#[actix_web::test]
async fn admin_approves_pending_listing() {
    let admin = user(1, Roles::Admin);
    let approved = ads::Model {
        status: AdStatus::Postado,
        ..pending_ad(12, 9)
    };
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![admin.clone()]])
        .append_query_results([vec![pending_ad(12, 9)]])
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }])
        .append_query_results([vec![approved]])
        .into_connection();
    let app = test_app!(db);

    let req = test::TestRequest::put()
        .uri("/api/admin/ads/12/status")
        .insert_header(bearer(&admin))
        .set_json(serde_json::json!({ "status": "Postado" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "Postado");
}

#[actix_web::test]
async fn decided_listing_cannot_be_moderated_again() {
    let admin = user(1, Roles::Admin);
    // No exec result is queued: an UPDATE would fail the mock with a 500.
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![admin.clone()]])
        .append_query_results([vec![approved_ad(12, 9, -23.55, -46.63)]])
        .into_connection();
    let app = test_app!(db);

    let req = test::TestRequest::put()
        .uri("/api/admin/ads/12/status")
        .insert_header(bearer(&admin))
        .set_json(serde_json::json!({ "status": "Reprovado", "reason": "Fotos ilegíveis" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Apenas anúncios em análise podem ser moderados");
}

#[actix_web::test]
async fn moderation_lost_to_a_concurrent_decision_is_a_bad_request() {
    let admin = user(1, Roles::Admin);
    // The listing reads as pending, but the guarded UPDATE matches no row.
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![admin.clone()]])
        .append_query_results([vec![pending_ad(12, 9)]])
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();
    let app = test_app!(db);

    let req = test::TestRequest::put()
        .uri("/api/admin/ads/12/status")
        .insert_header(bearer(&admin))
        .set_json(serde_json::json!({ "status": "Postado" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
