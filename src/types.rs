//! Common types used throughout tap-hyper
//!
//! This module contains shared type definitions, type aliases,
//! and utility types used across multiple modules.

use serde::{Deserialize, Serialize};

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// One emitted record: an ordered field name to value mapping
pub type Record = serde_json::Map<String, JsonValue>;

// ============================================================================
// Sync Mode
// ============================================================================

/// Synchronization mode for streams
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    /// Full refresh - fetch all data every time
    #[default]
    FullRefresh,
    /// Incremental - only fetch new/updated data
    Incremental,
}

// ============================================================================
// Constants
// ============================================================================

/// The reserved primary-key field declared for every stream.
///
/// Presence in the actual column list is not validated.
pub const PRIMARY_KEY: &str = "_id";

/// Schema namespace inside an extract file that holds user tables
pub const EXTRACT_SCHEMA: &str = "Extract";
