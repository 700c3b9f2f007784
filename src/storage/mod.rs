//! Storage module for persisting crawl results
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - One stored document per crawled snapshot, with its counters
//! - The archive index entries discovered for each host

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use crate::model::SnapshotStatus;

/// Metadata of a stored snapshot, without its tree
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotSummary {
    pub snapshot_id: String,
    pub root_url: String,
    pub free_tv_url: Option<String>,
    pub status: SnapshotStatus,
    pub config_hash: String,
    pub started_at: String,
    pub duration_ms: u64,
    pub requests_issued: u64,
    pub region_count: u64,
    pub country_count: u64,
    pub failed_countries: u64,
    pub channel_count: u64,
    pub error_count: u64,
    pub error: Option<String>,
    pub saved_at: String,
}

impl SnapshotSummary {
    /// Successful countries over attempted countries
    pub fn success_ratio(&self) -> f64 {
        if self.country_count == 0 {
            return 0.0;
        }
        (self.country_count - self.failed_countries) as f64 / self.country_count as f64
    }

    pub fn needs_reprocessing(&self) -> bool {
        self.status != SnapshotStatus::Complete
    }
}
