//! Rules a provider must satisfy before a listing is accepted.

use crate::errors::AppError;
use crate::models::ads::{MAX_PHOTOS, NewAdRequest, TITLE_MAX_CHARS, TITLE_MIN_CHARS};
use crate::models::profiles::{self, UpsertProfile};

use super::cnpj::checked_cnpj;
use super::{checked_uf, clean_cep, is_valid_cpf, non_blank};

impl NewAdRequest {
    /// Body-only checks; they run before any database access.
    pub fn validate(&self) -> Result<(), AppError> {
        let title_len = self.title.trim().chars().count();
        if !(TITLE_MIN_CHARS..=TITLE_MAX_CHARS).contains(&title_len) {
            return Err(AppError::bad_request(format!(
                "O título deve ter entre {TITLE_MIN_CHARS} e {TITLE_MAX_CHARS} caracteres"
            )));
        }

        if non_blank(self.service_function.as_deref()).is_none() {
            return Err(AppError::bad_request("Informe a função do serviço"));
        }

        if self.photos.len() > MAX_PHOTOS {
            return Err(AppError::bad_request(format!(
                "Envie no máximo {MAX_PHOTOS} fotos"
            )));
        }

        Ok(())
    }
}

/// A provider may only publish once their profile has everything a client
/// needs to reach them, plus a valid CPF.
pub fn profile_readiness(profile: &profiles::Model) -> Result<(), AppError> {
    let required = [
        (profile.address.as_deref(), "Complete seu perfil: informe o endereço"),
        (profile.address_number.as_deref(), "Complete seu perfil: informe o número do endereço"),
        (profile.category.as_deref(), "Complete seu perfil: informe a categoria"),
        (profile.phone.as_deref(), "Complete seu perfil: informe o telefone"),
        (profile.whatsapp.as_deref(), "Complete seu perfil: informe o WhatsApp"),
        (profile.city.as_deref(), "Complete seu perfil: informe a cidade"),
    ];

    for (value, message) in required {
        if non_blank(value).is_none() {
            return Err(AppError::bad_request(message));
        }
    }

    match profile.cpf.as_deref() {
        Some(cpf) if is_valid_cpf(cpf) => {}
        _ => return Err(AppError::bad_request("CPF inválido. Atualize seu perfil")),
    }

    if profile.service_type.is_none() {
        return Err(AppError::bad_request(
            "Complete seu perfil: informe o tipo de atendimento",
        ));
    }

    Ok(())
}

impl UpsertProfile {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().chars().count() < 2 {
            return Err(AppError::bad_request("Informe seu nome"));
        }
        if let Some(cpf) = non_blank(self.cpf.as_deref()) {
            if !is_valid_cpf(cpf) {
                return Err(AppError::bad_request("CPF inválido"));
            }
        }
        if let Some(cep) = non_blank(self.cep.as_deref()) {
            if clean_cep(cep).is_none() {
                return Err(AppError::bad_request("CEP inválido"));
            }
        }
        if let Some(state) = non_blank(self.state.as_deref()) {
            if checked_uf(state).is_none() {
                return Err(AppError::bad_request("Estado inválido: use a sigla da UF"));
            }
        }
        if let Some(cnpj) = non_blank(self.cnpj.as_deref()) {
            if checked_cnpj(cnpj).is_none() {
                return Err(AppError::bad_request("CNPJ inválido"));
            }
        }
        if let Some(radius) = self.service_radius_km {
            if radius <= 0 {
                return Err(AppError::bad_request("O raio de atendimento deve ser positivo"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::profiles::ServiceType;

    fn ad_with_title(title: &str) -> NewAdRequest {
        NewAdRequest {
            title: title.to_string(),
            service_function: Some("Instalação elétrica".to_string()),
            ..Default::default()
        }
    }

    fn complete_profile() -> profiles::Model {
        profiles::Model {
            user_id: 1,
            address: Some("Rua Augusta".into()),
            address_number: Some("1500".into()),
            complement: None,
            neighborhood: Some("Consolação".into()),
            cep: Some("01304001".into()),
            city: Some("São Paulo".into()),
            state: Some("SP".into()),
            category: Some("Eletricista".into()),
            phone: Some("11999990000".into()),
            whatsapp: Some("11999990000".into()),
            cpf: Some("529.982.247-25".into()),
            service_type: Some(ServiceType::Domicilio),
            service_radius_km: Some(20),
            issues_invoice: false,
            has_cnpj: false,
            cnpj: None,
            availability: serde_json::json!([]),
            bio: None,
            updated_at: None,
        }
    }

    #[test]
    fn title_length_boundaries() {
        assert!(ad_with_title("123456789").validate().is_err());
        assert!(ad_with_title("1234567890").validate().is_ok());
        assert!(ad_with_title(&"x".repeat(80)).validate().is_ok());
        assert!(ad_with_title(&"x".repeat(81)).validate().is_err());
    }

    #[test]
    fn title_is_counted_in_characters_after_trim() {
        assert!(ad_with_title("  ação rápida  ").validate().is_ok());
        assert!(ad_with_title("   123456789   ").validate().is_err());
    }

    #[test]
    fn service_function_is_required() {
        let mut ad = ad_with_title("Eletricista residencial");
        ad.service_function = Some("   ".into());
        assert!(matches!(ad.validate(), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn at_most_seven_photos() {
        let mut ad = ad_with_title("Eletricista residencial");
        ad.photos = vec!["https://cdn/p.jpg".to_string(); 7];
        assert!(ad.validate().is_ok());
        ad.photos.push("https://cdn/p.jpg".to_string());
        assert!(ad.validate().is_err());
    }

    #[test]
    fn complete_profile_is_ready() {
        assert!(profile_readiness(&complete_profile()).is_ok());
    }

    #[test]
    fn missing_phone_blocks_publishing() {
        let mut profile = complete_profile();
        profile.phone = None;
        match profile_readiness(&profile) {
            Err(AppError::BadRequest(msg)) => assert!(msg.contains("telefone")),
            other => panic!("expected BadRequest, got {other:?}"),
        }
    }

    #[test]
    fn invalid_cpf_blocks_publishing() {
        let mut profile = complete_profile();
        profile.cpf = Some("529.982.247-26".into());
        assert!(profile_readiness(&profile).is_err());
    }

    #[test]
    fn missing_service_type_blocks_publishing() {
        let mut profile = complete_profile();
        profile.service_type = None;
        assert!(profile_readiness(&profile).is_err());
    }

    #[test]
    fn profile_upsert_rejects_bad_cpf_and_cep() {
        let mut body = UpsertProfile {
            name: "Maria Souza".into(),
            cpf: Some("123.456.789-00".into()),
            ..Default::default()
        };
        assert!(body.validate().is_err());

        body.cpf = Some("123.456.789-09".into());
        body.cep = Some("0130".into());
        assert!(body.validate().is_err());

        body.cep = Some("01304-001".into());
        assert!(body.validate().is_ok());
    }

    #[test]
    fn profile_upsert_rejects_state_names_and_short_cnpj() {
        let mut body = UpsertProfile {
            name: "Maria Souza".into(),
            state: Some("São Paulo".into()),
            ..Default::default()
        };
        match body.validate() {
            Err(AppError::BadRequest(msg)) => assert!(msg.contains("UF")),
            other => panic!("expected BadRequest, got {other:?}"),
        }

        body.state = Some("sp".into());
        body.cnpj = Some("11.222.333/0001".into());
        assert!(matches!(body.validate(), Err(AppError::BadRequest(_))));

        body.cnpj = Some("11222333000181".into());
        assert!(body.validate().is_ok());
    }
}
