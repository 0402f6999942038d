use super::digits_only;

/// Normalize a CEP (postal code) to its 8 bare digits.
pub fn clean_cep(value: &str) -> Option<String> {
    let digits = digits_only(value);
    (digits.len() == 8).then_some(digits)
}
