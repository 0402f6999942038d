use super::digits_only;

/// Validate a CPF (Brazilian individual taxpayer number).
///
/// Punctuation is ignored, so `"529.982.247-25"` and `"52998224725"` are the
/// same input. Rejects anything that does not clean to 11 digits and the
/// all-identical sequences (`"000.000.000-00"`, `"111..."`), which pass the
/// checksum but are never issued.
pub fn is_valid_cpf(value: &str) -> bool {
    let digits: Vec<u32> = digits_only(value)
        .chars()
        .filter_map(|c| c.to_digit(10))
        .collect();

    if digits.len() != 11 {
        return false;
    }
    if digits.iter().all(|d| *d == digits[0]) {
        return false;
    }

    check_digit(&digits[..9]) == digits[9] && check_digit(&digits[..10]) == digits[10]
}

/// Weighted sum mod 11 over `prefix`, weights counting down to 2.
/// Remainders 10 and 11 collapse to 0.
fn check_digit(prefix: &[u32]) -> u32 {
    let first_weight = prefix.len() as u32 + 1;
    let sum: u32 = prefix
        .iter()
        .enumerate()
        .map(|(i, d)| d * (first_weight - i as u32))
        .sum();

    let rest = (sum * 10) % 11;
    if rest >= 10 { 0 } else { rest }
}

/// Render as `000.000.000-00`; `None` when the input is not 11 digits.
pub fn format_cpf(value: &str) -> Option<String> {
    let d = digits_only(value);
    if d.len() != 11 {
        return None;
    }
    Some(format!("{}.{}.{}-{}", &d[0..3], &d[3..6], &d[6..9], &d[9..11]))
}

/// Formatted CPF when the checksum holds, `None` otherwise.
pub fn checked_cpf(value: &str) -> Option<String> {
    if is_valid_cpf(value) { format_cpf(value) } else { None }
}
