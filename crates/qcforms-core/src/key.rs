//! Business key normalization.

/// Keeps only ASCII digits, mirroring the digits-only inputs on the forms.
pub fn digits_only(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

/// Normalizes a search key typed by the user.
///
/// Surrounding whitespace is always dropped; numeric-only keys additionally
/// lose every non-digit character. An empty result means the key is missing.
pub fn normalize_search_key(raw: &str, numeric_only: bool) -> String {
    let trimmed = raw.trim();
    if numeric_only {
        digits_only(trimmed)
    } else {
        trimmed.to_string()
    }
}

/// Truncates to at most `max` characters.
pub(crate) fn truncate_chars(value: String, max: Option<usize>) -> String {
    match max {
        Some(max) if value.chars().count() > max => value.chars().take(max).collect(),
        _ => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digits_only() {
        assert_eq!(digits_only("PRO-00123 a"), "00123");
        assert_eq!(digits_only("abc"), "");
    }

    #[test]
    fn test_normalize_search_key() {
        assert_eq!(normalize_search_key("  12-34 ", true), "1234");
        assert_eq!(normalize_search_key("  VC-12 ", false), "VC-12");
        assert_eq!(normalize_search_key("   ", false), "");
        assert_eq!(normalize_search_key("x", true), "");
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("12345678901".into(), Some(10)), "1234567890");
        assert_eq!(truncate_chars("123".into(), Some(10)), "123");
        assert_eq!(truncate_chars("123".into(), None), "123");
    }
}
