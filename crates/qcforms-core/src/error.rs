use thiserror::Error;

/// Core error types for QC form records
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid time: {0}")]
    InvalidTime(String),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid record data: {message}")]
    InvalidRecord { message: String },
}

impl CoreError {
    /// Create a new InvalidDate error
    pub fn invalid_date(value: impl Into<String>) -> Self {
        Self::InvalidDate(value.into())
    }

    /// Create a new InvalidTime error
    pub fn invalid_time(value: impl Into<String>) -> Self {
        Self::InvalidTime(value.into())
    }

    /// Create a new InvalidRecord error
    pub fn invalid_record(message: impl Into<String>) -> Self {
        Self::InvalidRecord {
            message: message.into(),
        }
    }
}

/// Errors raised when a field edit cannot be applied to a record.
///
/// A rejected edit never changes the record it was applied to.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("{sequence} has no row {index} (length {len})")]
    IndexOutOfRange {
        sequence: &'static str,
        index: usize,
        len: usize,
    },

    #[error("The last remaining row of {sequence} cannot be removed")]
    LastRow { sequence: &'static str },

    #[error("Please fill in all fields in the current {row} before adding a new one")]
    IncompleteRow {
        sequence: &'static str,
        row: &'static str,
    },

    #[error("{value} is not a tolerance option for \"{category}\"")]
    UnknownToleranceValue { category: &'static str, value: i64 },
}

impl EditError {
    pub(crate) fn out_of_range(sequence: &'static str, index: usize, len: usize) -> Self {
        Self::IndexOutOfRange {
            sequence,
            index,
            len,
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
