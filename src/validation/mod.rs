//! Pure validators shared by every handler. No I/O in here.

pub mod cep;
pub mod cnpj;
pub mod cpf;
pub mod geo;
pub mod listing;
pub mod text;
pub mod uf;

pub use cep::clean_cep;
pub use cpf::is_valid_cpf;
pub use geo::haversine_km;
pub use listing::profile_readiness;
pub use text::normalize_text;
pub use uf::checked_uf;

/// Keep only ASCII digits.
pub fn digits_only(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

/// `None` for missing or whitespace-only input, trimmed text otherwise.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
