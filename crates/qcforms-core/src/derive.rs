//! Derived fields: averages computed from sibling slots.

/// Parses a numeric form value. Non-finite values are rejected.
pub fn parse_number(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Returns `true` when the value is filled and does not parse as a number.
pub fn is_non_numeric(value: &str) -> bool {
    !value.trim().is_empty() && parse_number(value).is_none()
}

fn format_mean(values: &[f64]) -> String {
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    format!("{mean:.2}")
}

/// Average of a complete set of slots.
///
/// Every slot must be filled and numeric; otherwise the average is unset
/// (empty string).
pub fn complete_average<S: AsRef<str>>(slots: &[S]) -> String {
    let parsed: Option<Vec<f64>> = slots.iter().map(|s| parse_number(s.as_ref())).collect();
    match parsed {
        Some(values) if !values.is_empty() => format_mean(&values),
        _ => String::new(),
    }
}

/// Average over the filled slots only.
///
/// Empty slots are skipped. The average is unset when nothing is filled or
/// when any filled slot is not a number.
pub fn filled_average<S: AsRef<str>>(slots: &[S]) -> String {
    let filled: Vec<&str> = slots
        .iter()
        .map(|s| s.as_ref())
        .filter(|s| !s.trim().is_empty())
        .collect();
    if filled.is_empty() {
        return String::new();
    }
    let parsed: Option<Vec<f64>> = filled.iter().map(|s| parse_number(s)).collect();
    parsed.map(|values| format_mean(&values)).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_average() {
        assert_eq!(complete_average(&["108", "108", "110", "110"]), "109.00");
        assert_eq!(complete_average(&["4", "3", "3", "3"]), "3.25");
        assert_eq!(complete_average(&["0", "0", "0", "0"]), "0.00");
    }

    #[test]
    fn test_complete_average_requires_all_slots() {
        assert_eq!(complete_average(&["108", "108", "110", ""]), "");
        assert_eq!(complete_average(&["108", "x", "110", "110"]), "");
        assert_eq!(complete_average::<&str>(&[]), "");
    }

    #[test]
    fn test_filled_average() {
        assert_eq!(
            filled_average(&["10", "10", "10", "10", "10", "10"]),
            "10.00"
        );
        assert_eq!(filled_average(&["10", "", "11", "", "", ""]), "10.50");
        assert_eq!(filled_average(&["", "", ""]), "");
        assert_eq!(filled_average(&["10", "abc"]), "");
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number(" 12.5 "), Some(12.5));
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("NaN"), None);
        assert!(is_non_numeric("12a"));
        assert!(!is_non_numeric(""));
    }
}
