use actix_web::{HttpResponse, web};
use sea_orm::DatabaseConnection;

use crate::auth::authorization::{require_role, verify_ad_owner};
use crate::auth::middleware::AuthenticatedUser;
use crate::cache::{ResponseCache, keys};
use crate::db::{ads as ad_db, profiles as profile_db};
use crate::errors::{AppError, AppResult};
use crate::geocoding::EnrichmentHandle;
use crate::models::ads::{CreateAd, NewAdRequest};
use crate::models::profiles::UpsertProfile;
use crate::models::users::Roles;
use crate::validation::cnpj::checked_cnpj;
use crate::validation::{checked_uf, clean_cep, cpf::checked_cpf, non_blank, profile_readiness};

/// POST /api/provider/ads: publish a listing for moderation.
///
/// The body is checked first, then the provider's profile. Location, category
/// and service radius come from the profile; coordinates are filled in later
/// by the enrichment worker.
pub async fn create_ad(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    enrichment: web::Data<EnrichmentHandle>,
    body: web::Json<NewAdRequest>,
) -> AppResult<HttpResponse> {
    require_role(&user.0, Roles::Provider)?;

    let input = body.into_inner();
    input.validate()?;

    let profile = profile_db::get_profile(db.get_ref(), user.0.id)
        .await?
        .ok_or_else(|| AppError::bad_request("Complete seu perfil antes de anunciar"))?;
    profile_readiness(&profile)?;

    let description = non_blank(input.description.as_deref())
        .or(non_blank(profile.bio.as_deref()))
        .unwrap_or_default()
        .to_string();

    let ad = ad_db::insert_ad(
        db.get_ref(),
        CreateAd {
            user_id: user.0.id,
            title: input.title.trim().to_string(),
            description,
            category: profile.category.clone().unwrap_or_default(),
            service_function: non_blank(input.service_function.as_deref())
                .unwrap_or_default()
                .to_string(),
            city: profile.city.clone(),
            state: profile.state.clone(),
            neighborhood: profile.neighborhood.clone(),
            cep: profile.cep.clone(),
            service_radius_km: profile.service_radius_km,
            payment_methods: input.payment_methods,
            photos: input.photos,
            has_warranty: input.has_warranty,
            attends_24h: input.attends_24h,
            own_equipment: input.own_equipment,
            specialized_team: input.specialized_team,
        },
    )
    .await?;

    tracing::info!(ad_id = ad.id, user_id = user.0.id, "listing submitted for review");
    enrichment.wake();

    Ok(HttpResponse::Created().json(ad))
}

/// GET /api/provider/ads: the caller's listings in every state.
pub async fn get_my_ads(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
) -> AppResult<HttpResponse> {
    require_role(&user.0, Roles::Provider)?;
    let ads = ad_db::get_ads_by_user(db.get_ref(), user.0.id).await?;
    Ok(HttpResponse::Ok().json(ads))
}

/// DELETE /api/provider/ads/{id}: owner only.
pub async fn delete_ad(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    cache: web::Data<ResponseCache>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    verify_ad_owner(db.get_ref(), id, user.0.id).await?;

    ad_db::delete_ad(db.get_ref(), id).await?;
    cache.invalidate(&keys::provider(user.0.id)).await;

    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/provider/profile
pub async fn get_profile(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
) -> AppResult<HttpResponse> {
    require_role(&user.0, Roles::Provider)?;

    let profile = profile_db::get_profile(db.get_ref(), user.0.id)
        .await?
        .ok_or_else(|| AppError::not_found("Perfil ainda não preenchido"))?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "name": user.0.name,
        "email": user.0.email,
        "profile": profile,
    })))
}

/// PUT /api/provider/profile: save the name and profile in one transaction.
pub async fn upsert_profile(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    cache: web::Data<ResponseCache>,
    body: web::Json<UpsertProfile>,
) -> AppResult<HttpResponse> {
    require_role(&user.0, Roles::Provider)?;

    let input = normalize_profile(body.into_inner())?;
    let name = input.name.trim().to_string();

    let profile = profile_db::upsert_profile(db.get_ref(), user.0.id, input).await?;
    cache.invalidate(&keys::provider(user.0.id)).await;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "name": name,
        "email": user.0.email,
        "profile": profile,
    })))
}

/// Validate, then store CPF and CNPJ formatted, CEP as bare digits, the state
/// as its UF code and blank text as null.
fn normalize_profile(mut input: UpsertProfile) -> Result<UpsertProfile, AppError> {
    input.validate()?;

    input.cpf = match non_blank(input.cpf.as_deref()) {
        Some(cpf) => checked_cpf(cpf),
        None => None,
    };
    input.cep = non_blank(input.cep.as_deref()).and_then(clean_cep);
    input.state = non_blank(input.state.as_deref()).and_then(checked_uf);
    input.cnpj = non_blank(input.cnpj.as_deref()).and_then(checked_cnpj);

    for field in [
        &mut input.address,
        &mut input.address_number,
        &mut input.complement,
        &mut input.neighborhood,
        &mut input.city,
        &mut input.category,
        &mut input.phone,
        &mut input.whatsapp,
        &mut input.bio,
    ] {
        *field = non_blank(field.as_deref()).map(str::to_string);
    }

    input.availability.retain(|slot| !slot.trim().is_empty());
    Ok(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_fields_are_canonicalized() {
        let input = UpsertProfile {
            name: "Carla Lima".into(),
            cpf: Some("11144477735".into()),
            cep: Some("30130-010".into()),
            state: Some("mg".into()),
            cnpj: Some("11222333000181".into()),
            complement: Some("   ".into()),
            availability: vec!["seg".into(), " ".into()],
            ..Default::default()
        };

        let out = normalize_profile(input).unwrap();
        assert_eq!(out.cpf.as_deref(), Some("111.444.777-35"));
        assert_eq!(out.cep.as_deref(), Some("30130010"));
        assert_eq!(out.state.as_deref(), Some("MG"));
        assert_eq!(out.cnpj.as_deref(), Some("11.222.333/0001-81"));
        assert_eq!(out.complement, None);
        assert_eq!(out.availability, vec!["seg".to_string()]);
    }

    #[test]
    fn invalid_profile_is_rejected_before_saving() {
        let input = UpsertProfile {
            name: "Carla Lima".into(),
            cep: Some("123".into()),
            ..Default::default()
        };
        assert!(matches!(normalize_profile(input), Err(AppError::BadRequest(_))));

        let spelled_out_state = UpsertProfile {
            name: "Carla Lima".into(),
            state: Some("Minas Gerais".into()),
            ..Default::default()
        };
        assert!(matches!(
            normalize_profile(spelled_out_state),
            Err(AppError::BadRequest(_))
        ));
    }
}
