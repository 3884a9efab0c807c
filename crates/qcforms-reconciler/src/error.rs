//! Errors reported by the reconciler.

use std::fmt;

use qcforms_core::{EditError, ValidationFailure};
use qcforms_storage::StorageError;

/// Errors that can occur while reconciling a record with the store.
///
/// None of these are fatal: the in-memory record is left as it was before
/// the failed operation.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    /// The search key was empty after normalization.
    #[error("Please enter a {label} ID")]
    EmptyKey { label: &'static str },

    /// No stored record has this business key.
    #[error("No record found with this {label} ID: {key}")]
    NotFound { label: &'static str, key: String },

    /// Local validation failed; nothing was sent to the store.
    #[error("{}", join_failures(.0))]
    Invalid(Vec<ValidationFailure>),

    /// A record with the same business key or secondary unique column exists.
    #[error("{}", duplicate_message(.label.as_deref()))]
    Duplicate {
        column: Option<String>,
        label: Option<String>,
    },

    /// The stored row changed since it was loaded.
    #[error("This record was changed by someone else; search for it again before saving")]
    Stale,

    #[error(transparent)]
    Edit(#[from] EditError),

    /// A stored row could not be turned into a record, or vice versa.
    #[error("Malformed record: {message}")]
    MalformedRow { message: String },

    /// Any other store failure, surfaced verbatim.
    #[error(transparent)]
    Store(StorageError),

    /// Another operation on the same record is still in flight.
    #[error("Another operation on this record is in progress")]
    Busy,
}

fn join_failures(failures: &[ValidationFailure]) -> String {
    failures
        .iter()
        .map(|f| f.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

fn duplicate_message(label: Option<&str>) -> String {
    match label {
        Some(label) => format!("A record with this {label} already exists"),
        None => "A duplicate record already exists".to_string(),
    }
}

impl ReconcileError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedRow {
            message: message.into(),
        }
    }

    /// Validation failures carried by [`ReconcileError::Invalid`].
    pub fn failures(&self) -> &[ValidationFailure] {
        match self {
            Self::Invalid(failures) => failures,
            _ => &[],
        }
    }

    /// Returns the error category for reporting.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::EmptyKey { .. } | Self::Invalid(_) | Self::Edit(_) => ErrorCategory::Input,
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::Duplicate { .. } => ErrorCategory::Duplicate,
            Self::Stale => ErrorCategory::Conflict,
            Self::MalformedRow { .. } | Self::Store(_) => ErrorCategory::Remote,
            Self::Busy => ErrorCategory::Busy,
        }
    }
}

/// How a failed operation is reported to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Rejected before any remote call.
    Input,
    NotFound,
    Duplicate,
    /// Optimistic concurrency check failed.
    Conflict,
    /// Transport or backend failure.
    Remote,
    Busy,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Input => "input",
            Self::NotFound => "not_found",
            Self::Duplicate => "duplicate",
            Self::Conflict => "conflict",
            Self::Remote => "remote",
            Self::Busy => "busy",
        })
    }
}

/// Result type alias for reconciler operations.
pub type Result<T> = std::result::Result<T, ReconcileError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_message() {
        let err = ReconcileError::Duplicate {
            column: Some("lot_number".into()),
            label: Some("Lot Number".into()),
        };
        assert_eq!(err.to_string(), "A record with this Lot Number already exists");

        let err = ReconcileError::Duplicate {
            column: None,
            label: None,
        };
        assert_eq!(err.to_string(), "A duplicate record already exists");
    }

    #[test]
    fn test_invalid_joins_messages() {
        let err = ReconcileError::Invalid(vec![
            ValidationFailure::new("lot_number", "Lot Number is required"),
            ValidationFailure::new("date", "Date is required"),
        ]);
        assert_eq!(err.to_string(), "Lot Number is required; Date is required");
        assert_eq!(err.failures().len(), 2);
        assert_eq!(err.category(), ErrorCategory::Input);
    }

    #[test]
    fn test_categories() {
        assert_eq!(
            ReconcileError::EmptyKey { label: "Lot" }.category(),
            ErrorCategory::Input
        );
        assert_eq!(ReconcileError::Stale.category(), ErrorCategory::Conflict);
        assert_eq!(ReconcileError::Busy.category(), ErrorCategory::Busy);
        assert_eq!(
            ReconcileError::Store(StorageError::connection_error("refused")).category(),
            ErrorCategory::Remote
        );
        assert_eq!(ErrorCategory::NotFound.to_string(), "not_found");
    }

    #[test]
    fn test_store_error_is_verbatim() {
        let err = ReconcileError::Store(StorageError::connection_error("refused"));
        assert_eq!(err.to_string(), "Connection error: refused");
    }
}
