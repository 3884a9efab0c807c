//! Schema descriptors that parameterize the reconciler per form variant.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CoreError, EditError};
use crate::validation::ValidationFailure;

/// The three record variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormKind {
    Release,
    Sheet,
    Volume,
}

impl FormKind {
    pub const ALL: [FormKind; 3] = [FormKind::Release, FormKind::Sheet, FormKind::Volume];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Release => "release",
            Self::Sheet => "sheet",
            Self::Volume => "volume",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Release => "Production Release",
            Self::Sheet => "Production Sheet",
            Self::Volume => "Volume Control",
        }
    }
}

impl fmt::Display for FormKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "release" | "production-release" | "production_release" => Ok(Self::Release),
            "sheet" | "production-sheet" | "production_sheet" => Ok(Self::Sheet),
            "volume" | "volume-control" | "volume_control" => Ok(Self::Volume),
            other => Err(CoreError::invalid_record(format!("Unknown form: {other}"))),
        }
    }
}

/// A column the store keeps unique, with its user-facing label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniqueColumn {
    pub column: &'static str,
    pub label: &'static str,
}

/// Describes the remote table backing one variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSpec {
    pub name: &'static str,
    /// Column holding the business key.
    pub key_column: &'static str,
    /// Every unique column, business key first.
    pub unique_columns: &'static [UniqueColumn],
}

impl TableSpec {
    /// Label for a unique column, falling back to the column name.
    pub fn label_for<'a>(&self, column: &'a str) -> &'a str {
        self.unique_columns
            .iter()
            .find(|u| u.column == column)
            .map(|u| u.label)
            .unwrap_or(column)
    }

    pub fn is_unique(&self, column: &str) -> bool {
        self.unique_columns.iter().any(|u| u.column == column)
    }
}

/// Everything the reconciler needs to know about one record variant.
pub trait FormSchema: Send + Sync + 'static {
    type Record: Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static;
    type Edit: fmt::Debug + Send + 'static;

    const KIND: FormKind;
    const TABLE: TableSpec;
    /// Label of the business key, e.g. "Production Release Order".
    const KEY_LABEL: &'static str;
    /// Whether search keys are reduced to digits.
    const NUMERIC_KEY: bool;

    /// A record with every field at its default.
    fn initialize() -> Self::Record;

    fn business_key(record: &Self::Record) -> &str;

    /// Canonical form of a record: business key as search sees it and every
    /// derived field recomputed from its sources. Idempotent.
    fn normalize(record: Self::Record) -> Self::Record;

    /// Applies one edit, returning the next record. `record` is left untouched.
    fn apply(record: &Self::Record, edit: Self::Edit) -> Result<Self::Record, EditError>;

    fn validate(record: &Self::Record) -> Vec<ValidationFailure>;

    /// Serializes a record into its row shape.
    fn to_row(record: &Self::Record) -> Result<Value, CoreError> {
        Ok(serde_json::to_value(record)?)
    }

    /// Rebuilds a record from a stored row.
    fn from_row(row: Value) -> Result<Self::Record, CoreError> {
        Ok(serde_json::from_value(row)?)
    }
}
