//! Table discovery
//!
//! Runs once at startup: enumerates candidate extract files, lists every
//! user table under the `Extract` schema of each, and derives a stable
//! entity name for it by stripping the opaque generated suffix from the raw
//! table name. One extraction unit is produced per discovered table.
//!
//! Discovery is all-or-nothing: an invalid extract file or a table name
//! outside the suffix convention aborts the pass.

use crate::config::TapConfig;
use crate::engine::HyperEngine;
use crate::error::{Error, Result};
use crate::source::HyperTable;
use once_cell::sync::Lazy;
use regex::Regex;

/// Trailing `_<32-char uppercase alphanumeric>` suffix on raw table names
static ENTITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+)_[A-Z0-9]{32}$").expect("valid entity pattern"));

/// Discover every table in the configured source, fresh each run.
pub fn discover(config: &TapConfig) -> Result<Vec<HyperTable>> {
    let mut units = Vec::new();

    for file in config.source_files()? {
        let engine = HyperEngine::open(&file)?;
        let tables = engine.list_extract_tables()?;

        tracing::debug!("Found {} tables in {}", tables.len(), file.display());

        for table in tables {
            let definition = engine.table_definition(&table)?;
            let entity = entity_from_qualified_name(&definition.qualified_name)?;
            units.push(HyperTable::new(
                entity,
                file.clone(),
                definition,
                config.replication_key.clone(),
                config.batch_size,
            ));
        }
    }

    tracing::info!("Discovered {} extraction units", units.len());

    Ok(units)
}

/// Derive the entity name from a fully-qualified table name.
///
/// The name is a dot/quote-delimited `"catalog"."schema"."table"` triple; the
/// table segment carries an opaque `_<32-char>` suffix that is stripped off.
/// A name outside that convention fails derivation.
pub fn entity_from_qualified_name(qualified: &str) -> Result<String> {
    let segments: Vec<&str> = qualified.split("\".\"").collect();
    if segments.len() != 3 {
        return Err(Error::naming(qualified.to_string()));
    }

    let table = segments[2].trim_end_matches('"');
    ENTITY_RE
        .captures(table)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| Error::naming(table.to_string()))
}
