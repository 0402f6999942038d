use super::digits_only;

/// CNPJ (company taxpayer number) rendered as `00.000.000/0000-00`, or `None`
/// when the input does not clean to 14 digits.
pub fn checked_cnpj(value: &str) -> Option<String> {
    let d = digits_only(value);
    if d.len() != 14 {
        return None;
    }
    Some(format!(
        "{}.{}.{}/{}-{}",
        &d[0..2],
        &d[2..5],
        &d[5..8],
        &d[8..12],
        &d[12..14]
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_fourteen_digits() {
        assert_eq!(
            checked_cnpj("11222333000181").as_deref(),
            Some("11.222.333/0001-81")
        );
        assert_eq!(
            checked_cnpj("11.222.333/0001-81").as_deref(),
            Some("11.222.333/0001-81")
        );
    }

    #[test]
    fn rejects_other_lengths() {
        assert_eq!(checked_cnpj("1122233300018"), None);
        assert_eq!(checked_cnpj("11.222.333/0001-811"), None);
    }
}
