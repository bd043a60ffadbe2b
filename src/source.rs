//! Extraction units
//!
//! A [`TableSource`] is anything that can describe its schema and stream its
//! rows, optionally resuming from a bookmark. [`HyperTable`] is the concrete
//! adapter over one table inside one extract file.

use crate::engine::{self, HyperEngine, TableDefinition};
use crate::error::Result;
use crate::schema::TableSchema;
use crate::types::{JsonValue, Record};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

/// A data source exposing a schema and a restartable record stream.
pub trait TableSource {
    /// Entity name of this source
    fn name(&self) -> &str;

    /// Ordered column-name to portable-type schema
    fn schema(&self) -> TableSchema;

    /// Stream records, resuming at `bookmark` when one is supplied.
    ///
    /// With a replication key configured, records are emitted in ascending
    /// replication-key order and (given a bookmark) filtered to rows whose
    /// key is `>=` the bookmark.
    fn records(&self, bookmark: Option<&str>) -> Result<Records>;
}

/// One discovered table inside one extract file
#[derive(Debug, Clone)]
pub struct HyperTable {
    name: String,
    file_path: PathBuf,
    definition: TableDefinition,
    replication_key: Option<String>,
    batch_size: usize,
}

impl HyperTable {
    /// Create an extraction unit for a discovered table
    pub fn new(
        name: String,
        file_path: PathBuf,
        definition: TableDefinition,
        replication_key: Option<String>,
        batch_size: usize,
    ) -> Self {
        Self {
            name,
            file_path,
            definition,
            replication_key,
            batch_size,
        }
    }

    /// Path of the owning extract file
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Engine table definition
    pub fn definition(&self) -> &TableDefinition {
        &self.definition
    }

    /// Configured replication key, if any
    pub fn replication_key(&self) -> Option<&str> {
        self.replication_key.as_deref()
    }
}

impl TableSource for HyperTable {
    fn name(&self) -> &str {
        &self.name
    }

    fn schema(&self) -> TableSchema {
        TableSchema::from_definition(&self.definition)
    }

    fn records(&self, bookmark: Option<&str>) -> Result<Records> {
        // One engine lifetime per extraction call, owned by the iterator and
        // released when iteration completes, fails, or is abandoned.
        let engine = HyperEngine::open(&self.file_path)?;

        Ok(Records {
            engine,
            definition: self.definition.clone(),
            replication_key: self.replication_key.clone(),
            bookmark: bookmark.map(String::from),
            batch_size: self.batch_size,
            offset: 0,
            buffer: VecDeque::new(),
            exhausted: false,
            failed: false,
        })
    }
}

/// Finite, forward-only record iterator over one table scan.
///
/// Rows are pulled from the engine one batch at a time over a fixed ordered
/// scan, so memory is bounded by one batch rather than table size. The
/// iterator is restartable per call, not resumable mid-stream.
pub struct Records {
    engine: HyperEngine,
    definition: TableDefinition,
    replication_key: Option<String>,
    bookmark: Option<String>,
    batch_size: usize,
    offset: usize,
    buffer: VecDeque<Record>,
    exhausted: bool,
    failed: bool,
}

impl Records {
    /// Fetch the next batch into the buffer.
    fn fetch_batch(&mut self) -> Result<()> {
        let rows = self.engine.scan_batch(
            &self.definition,
            self.replication_key.as_deref(),
            self.bookmark.as_deref(),
            self.batch_size,
            self.offset,
        )?;

        if rows.len() < self.batch_size {
            self.exhausted = true;
        }
        self.offset += rows.len();

        for row in rows {
            // Zip positionally against the column list
            let mut record = Record::new();
            for (column, value) in self.definition.columns.iter().zip(row) {
                record.insert(column.name.clone(), engine::value_to_json(value));
            }
            self.buffer.push_back(record);
        }

        Ok(())
    }
}

impl Iterator for Records {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(record) = self.buffer.pop_front() {
                return Some(Ok(record));
            }
            if self.exhausted || self.failed {
                return None;
            }
            if let Err(e) = self.fetch_batch() {
                self.failed = true;
                return Some(Err(e));
            }
        }
    }
}

/// Extract the bookmark value of a record's replication-key field.
pub fn record_bookmark(record: &Record, replication_key: &str) -> Option<String> {
    match record.get(replication_key) {
        Some(JsonValue::String(s)) => Some(s.clone()),
        Some(JsonValue::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{ColumnDef, NativeType};
    use crate::schema::FieldType;

    fn unit() -> HyperTable {
        HyperTable::new(
            "orders".to_string(),
            PathBuf::from("/data/extract.hyper"),
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
            },
            Some("updated_at".to_string()),
            1000,
        )
    }

    #[test]
    fn test_schema_is_pure_and_ordered() {
        let unit = unit();
        let schema = unit.schema();
        assert_eq!(schema.len(), 2);
        assert_eq!(schema.fields[0].name, "_id");
        assert_eq!(schema.fields[0].field_type, FieldType::Integer);
        assert_eq!(schema.fields[1].field_type, FieldType::Timestamp);
    }

    #[test]
    fn test_records_fails_for_missing_file() {
        let unit = unit();
        assert!(unit.records(None).is_err());
    }

    #[test]
    fn test_record_bookmark_extraction() {
        let mut record = Record::new();
        record.insert(
            "updated_at".to_string(),
            JsonValue::String("2023-01-01T00:00:00.000000Z".to_string()),
        );
        record.insert("_id".to_string(), JsonValue::Number(7.into()));

        assert_eq!(
            record_bookmark(&record, "updated_at").as_deref(),
            Some("2023-01-01T00:00:00.000000Z")
        );
        assert_eq!(record_bookmark(&record, "_id").as_deref(), Some("7"));
        assert_eq!(record_bookmark(&record, "missing"), None);
    }
}
