//! Row queries against the per-form tables.
//!
//! Rows travel as JSON objects. Reads project the table through `to_jsonb`
//! minus the meta columns; writes expand the object with
//! `jsonb_populate_record`, so column types come from the table itself.

use chrono::{DateTime, Utc};
use qcforms_core::TableSpec;
use qcforms_storage::{StorageError, StorageId, StoredRow};
use serde_json::Value;
use sqlx_core::query_as::query_as;
use sqlx_core::query_scalar::query_scalar;
use sqlx_postgres::PgPool;
use time::OffsetDateTime;
use tracing::instrument;
use uuid::Uuid;

use crate::error::map_query_error;

/// Columns managed by the store rather than the form.
pub const META_COLUMNS: [&str; 4] = ["id", "version", "created_at", "updated_at"];

type MetaRow = (String, i64, DateTime<Utc>, DateTime<Utc>);

fn chrono_to_time(dt: DateTime<Utc>) -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp(dt.timestamp()).unwrap_or(OffsetDateTime::UNIX_EPOCH)
        + time::Duration::nanoseconds(i64::from(dt.timestamp_subsec_nanos()))
}

fn stored_row((id, version, created_at, updated_at): MetaRow, data: Value) -> StoredRow {
    StoredRow {
        id: StorageId::new(id),
        version,
        data,
        created_at: chrono_to_time(created_at),
        updated_at: chrono_to_time(updated_at),
    }
}

fn is_identifier(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        && !name.starts_with(|c: char| c.is_ascii_digit())
}

/// Quoted column list of a row object, meta columns excluded.
pub fn column_list(row: &Value) -> Result<String, StorageError> {
    let object = row
        .as_object()
        .ok_or_else(|| StorageError::invalid_row("row must be a JSON object"))?;
    let mut columns = Vec::with_capacity(object.len());
    for name in object.keys() {
        if META_COLUMNS.contains(&name.as_str()) {
            continue;
        }
        if !is_identifier(name) {
            return Err(StorageError::invalid_row(format!("invalid column name: {name}")));
        }
        columns.push(format!("\"{name}\""));
    }
    if columns.is_empty() {
        return Err(StorageError::invalid_row("row has no columns"));
    }
    Ok(columns.join(", "))
}

fn select_sql(table: &TableSpec) -> String {
    let meta = META_COLUMNS
        .iter()
        .map(|c| format!("'{c}'"))
        .collect::<Vec<_>>()
        .join(" - ");
    format!(
        r#"SELECT t.id::text, t.version, t.created_at, t.updated_at, to_jsonb(t) - {meta}
           FROM "{table}" t
           WHERE t."{key}" = $1
           LIMIT 1"#,
        table = table.name,
        key = table.key_column,
    )
}

/// Reads the row whose business key equals `key`.
#[instrument(skip(pool, table), fields(table = table.name))]
pub async fn find_by_key(
    pool: &PgPool,
    table: &TableSpec,
    key: &str,
) -> Result<Option<StoredRow>, StorageError> {
    let sql = select_sql(table);
    let row: Option<(String, i64, DateTime<Utc>, DateTime<Utc>, Value)> = query_as(&sql)
        .bind(key)
        .fetch_optional(pool)
        .await
        .map_err(|e| map_query_error(table, "read row", e))?;

    Ok(row.map(|(id, version, created_at, updated_at, data)| {
        stored_row((id, version, created_at, updated_at), data)
    }))
}

/// Existence check projecting only the identity.
#[instrument(skip(pool, table), fields(table = table.name))]
pub async fn find_id_by_key(
    pool: &PgPool,
    table: &TableSpec,
    key: &str,
) -> Result<Option<StorageId>, StorageError> {
    let sql = format!(
        r#"SELECT id::text FROM "{table}" WHERE "{key}" = $1 LIMIT 1"#,
        table = table.name,
        key = table.key_column,
    );
    let id: Option<String> = query_scalar(&sql)
        .bind(key)
        .fetch_optional(pool)
        .await
        .map_err(|e| map_query_error(table, "check row", e))?;
    Ok(id.map(StorageId::new))
}

/// Inserts a full row.
#[instrument(skip(pool, table, row), fields(table = table.name))]
pub async fn insert(pool: &PgPool, table: &TableSpec, row: &Value) -> Result<StoredRow, StorageError> {
    let columns = column_list(row)?;
    let sql = format!(
        r#"INSERT INTO "{table}" ({columns})
           SELECT {columns} FROM jsonb_populate_record(NULL::"{table}", $1)
           RETURNING id::text, version, created_at, updated_at"#,
        table = table.name,
    );

    let meta: MetaRow = query_as(&sql)
        .bind(row)
        .fetch_one(pool)
        .await
        .map_err(|e| map_query_error(table, "insert row", e))?;

    Ok(stored_row(meta, row.clone()))
}

/// Replaces the row matched by `id`, optionally guarded by its version.
#[instrument(skip(pool, table, row), fields(table = table.name, id = %id))]
pub async fn update_by_id(
    pool: &PgPool,
    table: &TableSpec,
    id: &StorageId,
    row: &Value,
    if_match: Option<&str>,
) -> Result<StoredRow, StorageError> {
    let uuid = Uuid::parse_str(id.as_str())
        .map_err(|_| StorageError::not_found(table.name, id.as_str()))?;
    let expected = if_match
        .map(|tag| {
            tag.parse::<i64>()
                .map_err(|_| StorageError::version_conflict(tag, "a numeric version"))
        })
        .transpose()?;
    let columns = column_list(row)?;

    let sql = format!(
        r#"UPDATE "{table}" AS t
           SET ({columns}) = (SELECT {columns} FROM jsonb_populate_record(NULL::"{table}", $1)),
               version = t.version + 1,
               updated_at = now()
           WHERE t.id = $2 AND ($3::bigint IS NULL OR t.version = $3)
           RETURNING t.id::text, t.version, t.created_at, t.updated_at"#,
        table = table.name,
    );

    let meta: Option<MetaRow> = query_as(&sql)
        .bind(row)
        .bind(uuid)
        .bind(expected)
        .fetch_optional(pool)
        .await
        .map_err(|e| map_query_error(table, "update row", e))?;

    if let Some(meta) = meta {
        return Ok(stored_row(meta, row.clone()));
    }

    // Nothing updated: either the row is gone or its version moved on.
    let current: Option<i64> =
        query_scalar(&format!(r#"SELECT version FROM "{}" WHERE id = $1"#, table.name))
            .bind(uuid)
            .fetch_optional(pool)
            .await
            .map_err(|e| map_query_error(table, "read version", e))?;

    match (current, expected) {
        (Some(actual), Some(expected)) => Err(StorageError::version_conflict(
            expected.to_string(),
            actual.to_string(),
        )),
        _ => Err(StorageError::not_found(table.name, id.as_str())),
    }
}

/// All business keys of a table.
#[instrument(skip(pool, table), fields(table = table.name))]
pub async fn list_keys(pool: &PgPool, table: &TableSpec) -> Result<Vec<String>, StorageError> {
    let sql = format!(
        r#"SELECT "{key}" FROM "{table}""#,
        table = table.name,
        key = table.key_column,
    );
    query_scalar(&sql)
        .fetch_all(pool)
        .await
        .map_err(|e| map_query_error(table, "list keys", e))
}
