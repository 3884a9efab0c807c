//! Validation failures and the rule helpers shared by the three forms.

use std::fmt;

use serde::Serialize;

use crate::derive::is_non_numeric;
use crate::time::{parse_date, parse_time};

/// A single human-readable validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationFailure {
    /// Structural path of the offending field, e.g. `weight_measurements[2].weights`.
    pub field: String,
    pub message: String,
}

impl ValidationFailure {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Returns `true` if any failure carries exactly `message`.
pub fn has_message(failures: &[ValidationFailure], message: &str) -> bool {
    failures.iter().any(|f| f.message == message)
}

pub(crate) fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Accumulates failures in rule order.
#[derive(Debug, Default)]
pub(crate) struct Rules {
    failures: Vec<ValidationFailure>,
}

impl Rules {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.failures.push(ValidationFailure::new(field, message));
    }

    /// `"<label> is required"` when the value is blank.
    pub(crate) fn require(&mut self, field: &str, label: &str, value: &str) {
        if is_blank(value) {
            self.push(field, format!("{label} is required"));
        }
    }

    /// Filled values must parse as numbers.
    pub(crate) fn numeric(&mut self, field: impl Into<String>, label: &str, value: &str) {
        if is_non_numeric(value) {
            self.push(field, format!("{label} must be a valid number"));
        }
    }

    /// A filled business key must already be in the shape search looks up.
    pub(crate) fn normalized_key(
        &mut self,
        field: &str,
        label: &str,
        value: &str,
        normalized: &str,
    ) {
        if !is_blank(value) && value != normalized {
            self.push(field, format!("{label} must be entered as \"{normalized}\""));
        }
    }

    /// Filled values must parse as calendar dates.
    pub(crate) fn date(&mut self, field: &str, label: &str, value: &str) {
        if !is_blank(value) && parse_date(value).is_err() {
            self.push(field, format!("{label} is not a valid date"));
        }
    }

    /// Filled values must parse as clock times.
    pub(crate) fn time(&mut self, field: &str, label: &str, value: &str) {
        if !is_blank(value) && parse_time(value).is_err() {
            self.push(field, format!("{label} is not a valid time"));
        }
    }

    /// `later` must not precede `earlier`. Skipped unless both dates parse.
    pub(crate) fn date_not_before(&mut self, field: &str, earlier: &str, later: &str, message: &str) {
        if let (Ok(earlier), Ok(later)) = (parse_date(earlier), parse_date(later))
            && later < earlier
        {
            self.push(field, message);
        }
    }

    /// `end` must not precede `start`. Skipped unless both times parse.
    pub(crate) fn time_not_before(&mut self, field: &str, start: &str, end: &str, message: &str) {
        if let (Ok(start), Ok(end)) = (parse_time(start), parse_time(end))
            && end < start
        {
            self.push(field, message);
        }
    }

    /// When either half of a pair is filled, both halves must be.
    pub(crate) fn pair(
        &mut self,
        (first_field, first_value, first_message): (&str, &str, &str),
        (second_field, second_value, second_message): (&str, &str, &str),
    ) {
        if is_blank(first_value) && is_blank(second_value) {
            return;
        }
        if is_blank(first_value) {
            self.push(first_field, first_message);
        }
        if is_blank(second_value) {
            self.push(second_field, second_message);
        }
    }

    pub(crate) fn finish(self) -> Vec<ValidationFailure> {
        if !self.failures.is_empty() {
            tracing::debug!(failures = self.failures.len(), "Record failed validation");
        }
        self.failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_and_numeric() {
        let mut rules = Rules::new();
        rules.require("lot_number", "Lot Number", " ");
        rules.require("client", "Client", "ACME");
        rules.numeric("quantity", "Quantity", "12x");
        rules.numeric("quantity", "Quantity", "");
        let failures = rules.finish();
        assert_eq!(failures.len(), 2);
        assert!(has_message(&failures, "Lot Number is required"));
        assert!(has_message(&failures, "Quantity must be a valid number"));
    }

    #[test]
    fn test_normalized_key() {
        let mut rules = Rules::new();
        rules.normalized_key("order", "Order", "PRO-12", "12");
        rules.normalized_key("order", "Order", "12", "12");
        rules.normalized_key("order", "Order", "", "");
        let failures = rules.finish();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].message, "Order must be entered as \"12\"");
    }

    #[test]
    fn test_date_ordering_skips_empty() {
        let mut rules = Rules::new();
        rules.date_not_before("evaluation_date", "2024-05-02", "2024-05-01", "before");
        rules.date_not_before("evaluation_date", "", "2024-05-01", "skipped");
        rules.date_not_before("evaluation_date", "2024-05-01", "2024-05-01", "same day");
        let failures = rules.finish();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].message, "before");
    }

    #[test]
    fn test_time_ordering() {
        let mut rules = Rules::new();
        rules.time_not_before("filtering.timeEnded", "10:00", "09:59", "end before start");
        rules.time_not_before("sieving.timeEnded", "10:00", "10:00", "equal ok");
        let failures = rules.finish();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].field, "filtering.timeEnded");
    }

    #[test]
    fn test_pair() {
        let mut rules = Rules::new();
        rules.pair(
            ("checked_by", "Ana", "Checked by name is required"),
            ("checked_date", "", "Checked date is required"),
        );
        rules.pair(
            ("verified_by", "", "Verified by name is required"),
            ("verified_date", "", "Verified date is required"),
        );
        let failures = rules.finish();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].to_string(), "Checked date is required");
    }
}
