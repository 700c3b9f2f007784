//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::archive::SnapshotEntry;
use crate::model::{ArchiveSnapshot, SnapshotStatus};
use crate::storage::SnapshotSummary;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Snapshot not found: {0}")]
    SnapshotNotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// Snapshots are written once per crawl; writing an id again replaces the
/// earlier record.
pub trait Storage {
    // ===== Snapshots =====

    /// Stores a crawled snapshot with the hash of the configuration it ran with
    fn save_snapshot(&mut self, snapshot: &ArchiveSnapshot, config_hash: &str)
        -> StorageResult<()>;

    /// Loads the full tree of one snapshot
    fn load_snapshot(&self, snapshot_id: &str) -> StorageResult<ArchiveSnapshot>;

    /// Returns the stored status of a snapshot, if it was ever saved
    fn snapshot_status(&self, snapshot_id: &str) -> StorageResult<Option<SnapshotStatus>>;

    /// Lists every stored snapshot's metadata, oldest capture first
    fn list_snapshots(&self) -> StorageResult<Vec<SnapshotSummary>>;

    /// Loads every stored snapshot tree, oldest capture first
    fn load_all_snapshots(&self) -> StorageResult<Vec<ArchiveSnapshot>>;

    /// Counts stored snapshots
    fn count_snapshots(&self) -> StorageResult<u64>;

    // ===== Archive Index =====

    /// Records index entries for a host, ignoring ones already known
    fn upsert_index_entries(&mut self, host: &str, entries: &[SnapshotEntry])
        -> StorageResult<usize>;

    /// Loads the index entries of a host, oldest first
    fn load_index_entries(&self, host: &str) -> StorageResult<Vec<SnapshotEntry>>;
}
