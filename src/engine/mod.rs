//! Embedded analytic engine boundary
//!
//! Wraps one read-only DuckDB attachment of one extract file. The engine and
//! its connection are scoped to the wrapper: dropping a [`HyperEngine`]
//! releases both, on every exit path.

mod types;

pub use types::{ColumnDef, NativeType, TableDefinition};

use crate::error::{Error, Result};
use crate::types::{JsonValue, EXTRACT_SCHEMA};
use duckdb::Connection;
use std::path::Path;

/// Alias the extract file is attached under
const ATTACH_ALIAS: &str = "extract_db";

/// Scoped engine handle for one extract file
#[derive(Debug)]
pub struct HyperEngine {
    /// In-memory DuckDB connection with the extract file attached
    conn: Connection,
    /// Attached file path (for error messages)
    path: String,
}

impl HyperEngine {
    /// Open the engine and attach the extract file read-only.
    ///
    /// Fails if the file is missing or is not a valid extract.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::file_not_found(path.display().to_string()));
        }
        let path_str = path.display().to_string();

        let conn = Connection::open_in_memory()
            .map_err(|e| Error::engine(format!("Failed to start engine: {e}")))?;

        let attach_sql = format!(
            "ATTACH '{}' AS {ATTACH_ALIAS} (READ_ONLY);",
            quote_literal_inner(&path_str)
        );
        conn.execute_batch(&attach_sql)
            .map_err(|e| Error::engine(format!("Failed to attach '{path_str}': {e}")))?;

        Ok(Self {
            conn,
            path: path_str,
        })
    }

    /// Attached file path
    pub fn path(&self) -> &str {
        &self.path
    }

    /// List every user table under the `Extract` schema, in name order.
    pub fn list_extract_tables(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT table_name FROM information_schema.tables
             WHERE table_catalog = ? AND table_schema = ?
             ORDER BY table_name",
        )?;

        let tables = stmt
            .query_map([ATTACH_ALIAS, EXTRACT_SCHEMA], |row| row.get(0))?
            .collect::<duckdb::Result<Vec<String>>>()?;

        Ok(tables)
    }

    /// Fetch the full definition (qualified name + typed columns) of a table.
    pub fn table_definition(&self, table: &str) -> Result<TableDefinition> {
        let mut stmt = self.conn.prepare(
            "SELECT column_name, data_type FROM information_schema.columns
             WHERE table_catalog = ? AND table_schema = ? AND table_name = ?
             ORDER BY ordinal_position",
        )?;

        let raw_columns = stmt
            .query_map([ATTACH_ALIAS, EXTRACT_SCHEMA, table], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<duckdb::Result<Vec<(String, String)>>>()?;

        if raw_columns.is_empty() {
            return Err(Error::engine(format!(
                "Table '{table}' not found in '{}'",
                self.path
            )));
        }

        let columns = raw_columns
            .into_iter()
            .map(|(name, data_type)| {
                let native_type = NativeType::parse(&name, &data_type)?;
                Ok(ColumnDef { name, native_type })
            })
            .collect::<Result<Vec<ColumnDef>>>()?;

        Ok(TableDefinition {
            qualified_name: format!(
                "{}.{}.{}",
                quote_ident(ATTACH_ALIAS),
                quote_ident(EXTRACT_SCHEMA),
                quote_ident(table)
            ),
            table: table.to_string(),
            columns,
        })
    }

    /// Fetch one batch of a table scan as raw engine values.
    ///
    /// When a bookmark is present the scan is filtered to rows whose
    /// replication-key value is `>=` the bookmark. When a replication key is
    /// configured the scan is ordered ascending by it; otherwise it falls
    /// back to the table's first column so OFFSET paging stays stable.
    pub fn scan_batch(
        &self,
        definition: &TableDefinition,
        replication_key: Option<&str>,
        bookmark: Option<&str>,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Vec<duckdb::types::Value>>> {
        let query = build_scan_query(definition, replication_key, bookmark);
        let paged = format!("{query} LIMIT {limit} OFFSET {offset}");

        tracing::debug!("Executing scan: {}", paged);

        let column_count = definition.columns.len();
        let mut stmt = self.conn.prepare(&paged)?;

        let rows = stmt
            .query_map([], |row| {
                (0..column_count)
                    .map(|i| row.get::<_, duckdb::types::Value>(i))
                    .collect::<duckdb::Result<Vec<duckdb::types::Value>>>()
            })?
            .collect::<duckdb::Result<Vec<Vec<duckdb::types::Value>>>>()?;

        Ok(rows)
    }
}

/// Build the ordered (and optionally bookmark-filtered) scan query.
fn build_scan_query(
    definition: &TableDefinition,
    replication_key: Option<&str>,
    bookmark: Option<&str>,
) -> String {
    let mut query = format!("SELECT * FROM {}", definition.qualified_name);

    if let (Some(key), Some(mark)) = (replication_key, bookmark) {
        query = format!(
            "{query} WHERE {} >= '{}'",
            quote_ident(key),
            quote_literal_inner(mark)
        );
    }

    let order_column = replication_key.unwrap_or_else(|| {
        definition
            .columns
            .first()
            .map_or("", |c| c.name.as_str())
    });
    if !order_column.is_empty() {
        query = format!("{query} ORDER BY {} ASC", quote_ident(order_column));
    }

    query
}

/// Quote an identifier per the engine's quoting rules
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Escape the inside of a single-quoted SQL literal
fn quote_literal_inner(value: &str) -> String {
    value.replace('\'', "''")
}

/// Convert an engine value to a JSON value.
///
/// Timestamps are converted from their native timezone-aware form to UTC and
/// serialized as ISO-8601 strings. Everything else passes through unchanged.
pub fn value_to_json(value: duckdb::types::Value) -> JsonValue {
    use duckdb::types::{TimeUnit, Value};

    match value {
        Value::Null => JsonValue::Null,
        Value::Boolean(b) => JsonValue::Bool(b),
        Value::TinyInt(i) => JsonValue::Number(i.into()),
        Value::SmallInt(i) => JsonValue::Number(i.into()),
        Value::Int(i) => JsonValue::Number(i.into()),
        Value::BigInt(i) => JsonValue::Number(i.into()),
        Value::Float(f) => {
            serde_json::Number::from_f64(f64::from(f)).map_or(JsonValue::Null, JsonValue::Number)
        }
        Value::Double(f) => serde_json::Number::from_f64(f).map_or(JsonValue::Null, JsonValue::Number),
        Value::Text(s) => JsonValue::String(s),
        Value::Timestamp(unit, t) => {
            let micros = match unit {
                TimeUnit::Second => t * 1_000_000,
                TimeUnit::Millisecond => t * 1_000,
                TimeUnit::Microsecond => t,
                TimeUnit::Nanosecond => t / 1_000,
            };
            let secs = micros.div_euclid(1_000_000);
            let nsecs = (micros.rem_euclid(1_000_000) * 1_000) as u32;
            chrono::DateTime::from_timestamp(secs, nsecs)
                .map(|dt| JsonValue::String(dt.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()))
                .unwrap_or(JsonValue::Number(t.into()))
        }
        other => JsonValue::String(format!("{other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use duckdb::types::{TimeUnit, Value};

    fn definition() -> TableDefinition {
        TableDefinition {
            qualified_name: "\"extract_db\".\"Extract\".\"orders_X\"".to_string(),
            table: "orders_X".to_string(),
            columns: vec![
                ColumnDef {
                    name: "_id".to_string(),
                    native_type: NativeType::BigInt,
                },
                ColumnDef {
                    name: "updated_at".to_string(),
                    native_type: NativeType::Timestamp,
                },
            ],
        }
    }

    #[test]
    fn test_build_scan_query_full_scan() {
        let query = build_scan_query(&definition(), None, None);
        assert_eq!(
            query,
            "SELECT * FROM \"extract_db\".\"Extract\".\"orders_X\" ORDER BY \"_id\" ASC"
        );
    }

    #[test]
    fn test_build_scan_query_with_replication_key() {
        let query = build_scan_query(&definition(), Some("updated_at"), None);
        assert!(query.ends_with("ORDER BY \"updated_at\" ASC"));
        assert!(!query.contains("WHERE"));
    }

    #[test]
    fn test_build_scan_query_with_bookmark() {
        let query = build_scan_query(&definition(), Some("updated_at"), Some("2023-01-01"));
        assert_eq!(
            query,
            "SELECT * FROM \"extract_db\".\"Extract\".\"orders_X\" \
             WHERE \"updated_at\" >= '2023-01-01' ORDER BY \"updated_at\" ASC"
        );
    }

    #[test]
    fn test_quote_ident_escapes_quotes() {
        assert_eq!(quote_ident("plain"), "\"plain\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn test_value_to_json_scalars() {
        assert_eq!(value_to_json(Value::Null), JsonValue::Null);
        assert_eq!(value_to_json(Value::Boolean(true)), JsonValue::Bool(true));
        assert_eq!(
            value_to_json(Value::BigInt(42)),
            JsonValue::Number(42.into())
        );
        assert_eq!(
            value_to_json(Value::Text("hello".to_string())),
            JsonValue::String("hello".to_string())
        );
    }

    #[test]
    fn test_value_to_json_timestamp_is_utc_iso8601() {
        // 2023-01-01T00:00:00 UTC in microseconds since epoch
        let micros = 1_672_531_200_000_000_i64;
        assert_eq!(
            value_to_json(Value::Timestamp(TimeUnit::Microsecond, micros)),
            JsonValue::String("2023-01-01T00:00:00.000000Z".to_string())
        );
        // Millisecond unit normalizes to the same instant
        assert_eq!(
            value_to_json(Value::Timestamp(TimeUnit::Millisecond, micros / 1_000)),
            JsonValue::String("2023-01-01T00:00:00.000000Z".to_string())
        );
    }

    #[test]
    fn test_open_missing_file() {
        let err = HyperEngine::open("/nonexistent/extract.hyper").unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }
}
