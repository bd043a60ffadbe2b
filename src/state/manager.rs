//! State manager implementation
//!
//! Provides file-based state persistence with atomic writes.

use super::types::State;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// State manager for persisting and loading bookmark state
#[derive(Debug, Clone)]
pub struct StateManager {
    /// Path to the state file (empty in in-memory mode)
    path: PathBuf,
    /// Current state
    state: State,
}

impl StateManager {
    /// Create an in-memory state manager (no file persistence)
    pub fn in_memory() -> Self {
        Self {
            path: PathBuf::new(),
            state: State::new(),
        }
    }

    /// Create a state manager from a file, loading existing state if present
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let state = if path.exists() {
            let contents = std::fs::read_to_string(&path).map_err(|e| Error::State {
                message: format!("Failed to read state file: {e}"),
            })?;
            serde_json::from_str(&contents).map_err(|e| Error::State {
                message: format!("Failed to parse state file: {e}"),
            })?
        } else {
            State::new()
        };

        Ok(Self { path, state })
    }

    /// Create a state manager from inline JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let state: State = serde_json::from_str(json).map_err(|e| Error::State {
            message: format!("Failed to parse state JSON: {e}"),
        })?;

        Ok(Self {
            path: PathBuf::new(),
            state,
        })
    }

    /// Get the bookmark for a stream
    pub fn bookmark(&self, stream: &str) -> Option<&str> {
        self.state.bookmark(stream)
    }

    /// Set the bookmark for a stream
    pub fn set_bookmark(&mut self, stream: &str, bookmark: String) {
        self.state.set_bookmark(stream, bookmark);
    }

    /// Borrow the current state
    pub fn state(&self) -> &State {
        &self.state
    }

    /// Export state as JSON string
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(&self.state).map_err(|e| Error::State {
            message: format!("Failed to serialize state: {e}"),
        })
    }

    /// Save current state to the managed file, if any
    pub fn save(&self) -> Result<()> {
        if self.path.as_os_str().is_empty() {
            return Ok(()); // In-memory mode
        }
        self.save_to_file(&self.path)
    }

    /// Save state to a specific file path
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let contents = serde_json::to_string_pretty(&self.state).map_err(|e| Error::State {
            message: format!("Failed to serialize state: {e}"),
        })?;

        // Write to temp file first, then rename for atomicity
        let path = path.as_ref();
        let temp_path = path.with_extension("tmp");
        std::fs::write(&temp_path, &contents).map_err(|e| Error::State {
            message: format!("Failed to write state file: {e}"),
        })?;

        std::fs::rename(&temp_path, path).map_err(|e| Error::State {
            message: format!("Failed to rename state file: {e}"),
        })?;

        Ok(())
    }

    /// Get the state file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if using in-memory mode
    pub fn is_in_memory(&self) -> bool {
        self.path.as_os_str().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_manager() {
        let mut manager = StateManager::in_memory();
        assert!(manager.is_in_memory());
        assert!(manager.bookmark("orders").is_none());

        manager.set_bookmark("orders", "2024-01-01".to_string());
        assert_eq!(manager.bookmark("orders"), Some("2024-01-01"));

        // Saving in-memory state is a no-op, not an error
        manager.save().unwrap();
    }

    #[test]
    fn test_from_json() {
        let manager =
            StateManager::from_json(r#"{"streams":{"orders":{"bookmark":"b1"}}}"#).unwrap();
        assert_eq!(manager.bookmark("orders"), Some("b1"));
    }

    #[test]
    fn test_from_json_invalid() {
        assert!(StateManager::from_json("not json").is_err());
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let mut manager = StateManager::from_file(&path).unwrap();
        manager.set_bookmark("orders", "2024-06-01".to_string());
        manager.save().unwrap();

        let restored = StateManager::from_file(&path).unwrap();
        assert_eq!(restored.bookmark("orders"), Some("2024-06-01"));

        // Temp file was renamed away
        assert!(!path.with_extension("tmp").exists());
    }
}
