/// The 26 states plus the Federal District.
pub const UF_CODES: [&str; 27] = [
    "AC", "AL", "AM", "AP", "BA", "CE", "DF", "ES", "GO", "MA", "MG", "MS", "MT", "PA", "PB",
    "PE", "PI", "PR", "RJ", "RN", "RO", "RR", "RS", "SC", "SE", "SP", "TO",
];

/// Uppercased two-letter state code, `None` when it is not a known UF.
pub fn checked_uf(value: &str) -> Option<String> {
    let code = value.trim().to_uppercase();
    UF_CODES.contains(&code.as_str()).then_some(code)
}
