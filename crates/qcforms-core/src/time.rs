//! Calendar dates and clock times as entered on the forms.
//!
//! Dates use the `YYYY-MM-DD` layout of a date input; times use `HH:MM`
//! with optional seconds. Empty strings mean "not filled" and are handled by
//! callers before parsing.

use time::format_description::FormatItem;
use time::macros::format_description;
use time::{Date, Time};

use crate::error::{CoreError, Result};

const DATE_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");
const TIME_FORMAT: &[FormatItem<'static>] = format_description!("[hour]:[minute]");
const TIME_FORMAT_SECONDS: &[FormatItem<'static>] =
    format_description!("[hour]:[minute]:[second]");

/// Parses a form date (`YYYY-MM-DD`).
pub fn parse_date(value: &str) -> Result<Date> {
    Date::parse(value.trim(), DATE_FORMAT).map_err(|e| {
        CoreError::invalid_date(format!("Failed to parse date '{value}': {e}"))
    })
}

/// Parses a form time (`HH:MM` or `HH:MM:SS`).
pub fn parse_time(value: &str) -> Result<Time> {
    let trimmed = value.trim();
    Time::parse(trimmed, TIME_FORMAT)
        .or_else(|_| Time::parse(trimmed, TIME_FORMAT_SECONDS))
        .map_err(|e| CoreError::invalid_time(format!("Failed to parse time '{value}': {e}")))
}

/// Formats a date back into the form layout.
pub fn format_date(date: Date) -> String {
    date.format(DATE_FORMAT).unwrap_or_default()
}
