use std::sync::Arc;

use actix_web::{HttpResponse, web};

use crate::errors::{AppError, AppResult};
use crate::geocoding::PostalLookup;
use crate::validation::clean_cep;

/// GET /api/cep/{cep}: address autofill for profile forms.
pub async fn lookup_cep(
    postal: web::Data<Arc<dyn PostalLookup>>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let cep = clean_cep(&path.into_inner()).ok_or_else(|| AppError::bad_request("CEP inválido"))?;

    let address = postal
        .lookup(&cep)
        .await
        .ok_or_else(|| AppError::not_found("CEP não encontrado"))?;

    Ok(HttpResponse::Ok().json(address))
}
