//! Bookmark state tracking
//!
//! Bookmarks are replication-key high-water marks persisted between runs,
//! keyed by stream (entity) name.

mod manager;
mod types;

pub use manager::StateManager;
pub use types::{State, StreamState};
