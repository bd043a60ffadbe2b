//! Tap configuration
//!
//! The tap reads either a single extract file or a directory of them. When a
//! directory is configured, every regular file within it (non-recursively) is
//! treated as a candidate extract file; anything that is not a valid extract
//! fails at attach time.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Tap configuration loaded from JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TapConfig {
    /// A single extract file or a directory of extract files
    pub path: PathBuf,

    /// Optional replication-key column for incremental extraction
    #[serde(default)]
    pub replication_key: Option<String>,

    /// Rows fetched per engine round trip
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_batch_size() -> usize {
    10_000
}

impl TapConfig {
    /// Create a config for a single path with defaults
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            replication_key: None,
            batch_size: default_batch_size(),
        }
    }

    /// Set the replication key
    #[must_use]
    pub fn with_replication_key(mut self, key: impl Into<String>) -> Self {
        self.replication_key = Some(key.into());
        self
    }

    /// Load configuration, inline JSON taking precedence over the file.
    pub fn load(file: Option<&Path>, inline: Option<&str>) -> Result<Self> {
        if let Some(json_str) = inline {
            return serde_json::from_str(json_str)
                .map_err(|e| Error::config(format!("Invalid config JSON: {e}")));
        }

        if let Some(path) = file {
            let content = std::fs::read_to_string(path)
                .map_err(|e| Error::config(format!("Failed to read config file: {e}")))?;
            return serde_json::from_str(&content)
                .map_err(|e| Error::config(format!("Invalid config JSON: {e}")));
        }

        Err(Error::config(
            "No configuration provided (use --config or --config-json)",
        ))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !self.path.exists() {
            return Err(Error::file_not_found(self.path.display().to_string()));
        }
        if self.batch_size == 0 {
            return Err(Error::config("batch_size must be greater than zero"));
        }
        Ok(())
    }

    /// Enumerate candidate extract files.
    ///
    /// A single file yields itself; a directory yields every regular file in
    /// it, unfiltered, in name order.
    pub fn source_files(&self) -> Result<Vec<PathBuf>> {
        if self.path.is_file() {
            return Ok(vec![self.path.clone()]);
        }

        if self.path.is_dir() {
            let mut files: Vec<PathBuf> = std::fs::read_dir(&self.path)?
                .collect::<std::io::Result<Vec<_>>>()?
                .into_iter()
                .map(|entry| entry.path())
                .filter(|p| p.is_file())
                .collect();
            files.sort();
            return Ok(files);
        }

        Err(Error::file_not_found(self.path.display().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let config: TapConfig =
            serde_json::from_str(r#"{ "path": "/data/extract.hyper" }"#).unwrap();
        assert_eq!(config.path, PathBuf::from("/data/extract.hyper"));
        assert!(config.replication_key.is_none());
        assert_eq!(config.batch_size, 10_000);
    }

    #[test]
    fn test_parse_full_config() {
        let config: TapConfig = serde_json::from_str(
            r#"{ "path": "/data", "replication_key": "updated_at", "batch_size": 500 }"#,
        )
        .unwrap();
        assert_eq!(config.replication_key.as_deref(), Some("updated_at"));
        assert_eq!(config.batch_size, 500);
    }

    #[test]
    fn test_load_inline_takes_precedence() {
        let config =
            TapConfig::load(Some(Path::new("/missing.json")), Some(r#"{ "path": "/x" }"#))
                .unwrap();
        assert_eq!(config.path, PathBuf::from("/x"));
    }

    #[test]
    fn test_load_requires_some_config() {
        let err = TapConfig::load(None, None).unwrap_err();
        assert!(err.to_string().contains("No configuration"));
    }

    #[test]
    fn test_validate_missing_path() {
        let config = TapConfig::new("/does/not/exist");
        assert!(matches!(
            config.validate().unwrap_err(),
            Error::FileNotFound { .. }
        ));
    }

    #[test]
    fn test_source_files_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.hyper"), b"x").unwrap();
        std::fs::write(dir.path().join("a.hyper"), b"x").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub/c.hyper"), b"x").unwrap();

        let config = TapConfig::new(dir.path());
        let files = config.source_files().unwrap();

        // Non-recursive, name order, directories excluded
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("a.hyper"));
        assert!(files[1].ends_with("b.hyper"));
    }

    #[test]
    fn test_source_files_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("one.hyper");
        std::fs::write(&file, b"x").unwrap();

        let config = TapConfig::new(&file);
        assert_eq!(config.source_files().unwrap(), vec![file]);
    }
}
