use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Lowercase, strip accents and collapse whitespace so that
/// `"  Eletricista   São  Paulo"` and `"eletricista sao paulo"` compare equal.
pub fn normalize_text(value: &str) -> String {
    if value.trim().is_empty() {
        return String::new();
    }

    let stripped: String = value
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect();

    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Accent- and case-insensitive substring test. An empty needle matches.
pub fn contains_normalized(haystack: &str, needle: &str) -> bool {
    normalize_text(haystack).contains(&normalize_text(needle))
}
