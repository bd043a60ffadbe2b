//! State types for tracking extraction progress
//!
//! These types are serialized to JSON and persisted between runs.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Complete state for a tap run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct State {
    /// Per-stream state
    #[serde(default)]
    pub streams: HashMap<String, StreamState>,
}

impl State {
    /// Create a new empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Get state for a stream
    pub fn get_stream(&self, stream: &str) -> Option<&StreamState> {
        self.streams.get(stream)
    }

    /// Get mutable state for a stream, creating if needed
    pub fn get_stream_mut(&mut self, stream: &str) -> &mut StreamState {
        self.streams.entry(stream.to_string()).or_default()
    }

    /// Get the bookmark for a stream
    pub fn bookmark(&self, stream: &str) -> Option<&str> {
        self.streams.get(stream)?.bookmark.as_deref()
    }

    /// Set the bookmark for a stream
    pub fn set_bookmark(&mut self, stream: &str, bookmark: String) {
        self.get_stream_mut(stream).bookmark = Some(bookmark);
    }
}

/// State for a single stream
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StreamState {
    /// Replication-key high-water mark
    #[serde(default)]
    pub bookmark: Option<String>,
}
