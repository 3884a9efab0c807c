//! Row and identity types shared by all store backends.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

/// Store-assigned identity of a persisted row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StorageId(String);

impl StorageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh random identity.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StorageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Uuid> for StorageId {
    fn from(id: Uuid) -> Self {
        Self(id.to_string())
    }
}

/// A row as returned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRow {
    pub id: StorageId,
    /// Incremented on every write.
    pub version: i64,
    /// Row columns, without the meta columns above.
    pub data: Value,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl StoredRow {
    #[must_use]
    pub fn new(id: StorageId, data: Value) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id,
            version: 1,
            data,
            created_at: now,
            updated_at: now,
        }
    }

    /// Next version of this row with new content.
    #[must_use]
    pub fn next_version(&self, data: Value) -> Self {
        Self {
            id: self.id.clone(),
            version: self.version + 1,
            data,
            created_at: self.created_at,
            updated_at: OffsetDateTime::now_utc(),
        }
    }

    /// Version rendered the way `if_match` expects it.
    pub fn version_tag(&self) -> String {
        self.version.to_string()
    }

    pub fn text(&self, column: &str) -> Option<&str> {
        text_column(&self.data, column)
    }
}

/// Reads a text column from a row object.
pub fn text_column<'a>(row: &'a Value, column: &str) -> Option<&'a str> {
    row.get(column).and_then(Value::as_str)
}
