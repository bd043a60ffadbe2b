//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::TapConfig;
use crate::discover::discover;
use crate::engine::HyperEngine;
use crate::error::Result;
use crate::source::{record_bookmark, HyperTable, TableSource};
use crate::state::StateManager;
use crate::types::{JsonValue, SyncMode, PRIMARY_KEY};
use serde_json::json;
use std::time::Instant;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Check { config_json } => self.check(config_json.as_deref()),
            Commands::Discover { config_json } => self.discover(config_json.as_deref()),
            Commands::Read {
                streams,
                config_json,
                max_records,
            } => self.read(streams.as_deref(), config_json.as_deref(), *max_records),
            Commands::Streams { config_json } => self.streams(config_json.as_deref()),
        }
    }

    /// Load and validate configuration
    fn load_config(&self, inline: Option<&str>) -> Result<TapConfig> {
        let config = TapConfig::load(self.cli.config.as_deref(), inline)?;
        config.validate()?;
        Ok(config)
    }

    /// Load state
    fn load_state(&self) -> Result<StateManager> {
        // Inline state takes precedence
        if let Some(state_json) = &self.cli.state_json {
            StateManager::from_json(state_json)
        } else if let Some(path) = &self.cli.state {
            StateManager::from_file(path)
        } else {
            Ok(StateManager::in_memory())
        }
    }

    /// Check that every candidate extract file can be opened
    fn check(&self, config_json: Option<&str>) -> Result<()> {
        let config = self.load_config(config_json)?;

        let mut table_count = 0usize;
        let mut failure: Option<String> = None;

        for file in config.source_files()? {
            match HyperEngine::open(&file).and_then(|engine| engine.list_extract_tables()) {
                Ok(tables) => table_count += tables.len(),
                Err(e) => {
                    failure = Some(format!("{}: {e}", file.display()));
                    break;
                }
            }
        }

        match failure {
            None => self.output_message(&json!({
                "type": "CONNECTION_STATUS",
                "connectionStatus": {
                    "status": "SUCCEEDED",
                    "message": format!("Connection successful. Found {table_count} tables.")
                }
            })),
            Some(message) => self.output_message(&json!({
                "type": "CONNECTION_STATUS",
                "connectionStatus": {
                    "status": "FAILED",
                    "message": format!("Connection check failed: {message}")
                }
            })),
        }

        Ok(())
    }

    /// Discover streams and emit a catalog
    fn discover(&self, config_json: Option<&str>) -> Result<()> {
        let config = self.load_config(config_json)?;
        let units = discover(&config)?;

        let streams: Vec<JsonValue> = units.iter().map(catalog_stream).collect();

        self.output_message(&json!({
            "type": "CATALOG",
            "catalog": {
                "streams": streams
            }
        }));

        Ok(())
    }

    /// Read data from streams
    fn read(
        &self,
        streams: Option<&str>,
        config_json: Option<&str>,
        max_records: Option<usize>,
    ) -> Result<()> {
        let sync_start = Instant::now();
        let config = self.load_config(config_json)?;
        let mut state = self.load_state()?;
        let units = discover(&config)?;

        // Parse streams filter
        let stream_filter: Option<Vec<&str>> = streams.map(|s| s.split(',').collect());

        let mut stream_results: Vec<JsonValue> = Vec::new();
        let mut total_records = 0usize;

        for unit in &units {
            if let Some(ref filter) = stream_filter {
                if !filter.contains(&unit.name()) {
                    continue;
                }
            }

            let stream_start = Instant::now();

            self.output_message(&json!({
                "type": "LOG",
                "log": {
                    "level": "INFO",
                    "message": format!("Starting sync for stream: {}", unit.name())
                }
            }));

            self.emit_schema(unit);

            let bookmark = state.bookmark(unit.name()).map(String::from);
            let sync_result = self.sync_unit(unit, bookmark.as_deref(), max_records);
            let stream_duration_ms = stream_start.elapsed().as_millis() as u64;

            match sync_result {
                Ok((record_count, new_bookmark)) => {
                    total_records += record_count;

                    if let Some(mark) = new_bookmark {
                        state.set_bookmark(unit.name(), mark);
                    }

                    stream_results.push(json!({
                        "stream": unit.name(),
                        "status": "SUCCESS",
                        "records_synced": record_count,
                        "duration_ms": stream_duration_ms
                    }));

                    self.output_message(&json!({
                        "type": "LOG",
                        "log": {
                            "level": "INFO",
                            "message": format!(
                                "Completed sync for {}: {} records",
                                unit.name(),
                                record_count
                            )
                        }
                    }));
                }
                Err(e) => {
                    stream_results.push(json!({
                        "stream": unit.name(),
                        "status": "FAILED",
                        "error": e.to_string(),
                        "records_synced": 0,
                        "duration_ms": stream_duration_ms
                    }));

                    self.output_message(&json!({
                        "type": "LOG",
                        "log": {
                            "level": "ERROR",
                            "message": format!("Failed to sync {}: {}", unit.name(), e)
                        }
                    }));
                }
            }
        }

        // Persist and emit final state
        if let Some(state_path) = &self.cli.state {
            state.save_to_file(state_path)?;
        }
        self.output_message(&json!({
            "type": "STATE",
            "state": serde_json::to_value(state.state())?
        }));

        // Emit sync summary for programmatic consumption
        let total_duration_ms = sync_start.elapsed().as_millis() as u64;
        let successful_streams = stream_results
            .iter()
            .filter(|r| r["status"] == "SUCCESS")
            .count();
        let failed_streams = stream_results
            .iter()
            .filter(|r| r["status"] == "FAILED")
            .count();

        self.output_message(&json!({
            "type": "SYNC_SUMMARY",
            "summary": {
                "status": if failed_streams == 0 { "SUCCEEDED" } else if successful_streams == 0 { "FAILED" } else { "PARTIAL" },
                "total_records": total_records,
                "total_streams": stream_results.len(),
                "successful_streams": successful_streams,
                "failed_streams": failed_streams,
                "duration_ms": total_duration_ms,
                "state_file": self.cli.state.as_ref().map(|p| p.to_string_lossy().to_string()),
                "streams": stream_results
            }
        }));

        Ok(())
    }

    /// Emit the SCHEMA message for one unit
    fn emit_schema(&self, unit: &HyperTable) {
        self.output_message(&json!({
            "type": "SCHEMA",
            "stream": unit.name(),
            "schema": unit.schema().to_json_schema(),
            "key_properties": [PRIMARY_KEY],
            "bookmark_properties": unit.replication_key().map(|k| vec![k])
        }));
    }

    /// Stream one unit's records, returning (count, last bookmark value)
    fn sync_unit(
        &self,
        unit: &HyperTable,
        bookmark: Option<&str>,
        max_records: Option<usize>,
    ) -> Result<(usize, Option<String>)> {
        let mut record_count = 0usize;
        let mut new_bookmark: Option<String> = None;
        let emitted_at = chrono::Utc::now().timestamp_millis();

        for record in unit.records(bookmark)? {
            let record = record?;

            if let Some(key) = unit.replication_key() {
                if let Some(mark) = record_bookmark(&record, key) {
                    new_bookmark = Some(mark);
                }
            }

            self.output_message(&json!({
                "type": "RECORD",
                "record": {
                    "stream": unit.name(),
                    "data": record,
                    "emitted_at": emitted_at
                }
            }));

            record_count += 1;
            if max_records.is_some_and(|max| record_count >= max) {
                break;
            }
        }

        Ok((record_count, new_bookmark))
    }

    /// List available streams (lightweight, no schemas)
    fn streams(&self, config_json: Option<&str>) -> Result<()> {
        let config = self.load_config(config_json)?;
        let units = discover(&config)?;

        let stream_names: Vec<&str> = units.iter().map(TableSource::name).collect();

        self.output_message(&json!({
            "type": "STREAMS",
            "streams": stream_names
        }));

        Ok(())
    }

    /// Output a message
    fn output_message(&self, msg: &JsonValue) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}

/// Build one catalog stream entry for a discovered unit.
fn catalog_stream(unit: &HyperTable) -> JsonValue {
    let cursor = unit.replication_key();
    let sync_modes = if cursor.is_some() {
        vec![SyncMode::FullRefresh, SyncMode::Incremental]
    } else {
        vec![SyncMode::FullRefresh]
    };

    json!({
        "name": unit.name(),
        "json_schema": unit.schema().to_json_schema(),
        "supported_sync_modes": sync_modes,
        "source_defined_cursor": cursor.is_some(),
        "default_cursor_field": cursor.map(|f| vec![f]),
        "source_defined_primary_key": [[PRIMARY_KEY]],
        "file_path": unit.file_path().display().to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{ColumnDef, NativeType, TableDefinition};
    use std::path::PathBuf;

    fn unit(replication_key: Option<&str>) -> HyperTable {
        HyperTable::new(
            "orders".to_string(),
            PathBuf::from("/data/extract.hyper"),
            TableDefinition {
                qualified_name: "\"extract_db\".\"Extract\".\"orders_X\"".to_string(),
                table: "orders_X".to_string(),
                columns: vec![ColumnDef {
                    name: "_id".to_string(),
                    native_type: NativeType::BigInt,
                }],
            },
            replication_key.map(String::from),
            1000,
        )
    }

    #[test]
    fn test_catalog_stream_with_cursor() {
        let entry = catalog_stream(&unit(Some("updated_at")));
        assert_eq!(entry["name"], "orders");
        assert_eq!(
            entry["supported_sync_modes"],
            json!(["full_refresh", "incremental"])
        );
        assert_eq!(entry["source_defined_cursor"], true);
        assert_eq!(entry["default_cursor_field"], json!(["updated_at"]));
        assert_eq!(entry["source_defined_primary_key"], json!([["_id"]]));
    }

    #[test]
    fn test_catalog_stream_without_cursor() {
        let entry = catalog_stream(&unit(None));
        assert_eq!(entry["supported_sync_modes"], json!(["full_refresh"]));
        assert_eq!(entry["source_defined_cursor"], false);
        assert!(entry["default_cursor_field"].is_null());
    }
}
