//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::archive::SnapshotEntry;
use crate::model::{ArchiveSnapshot, SnapshotStatus};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::SnapshotSummary;
use crate::WaybackError;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

const SUMMARY_COLUMNS: &str = "snapshot_id, root_url, free_tv_url, status, config_hash, \
     started_at, duration_ms, requests_issued, region_count, country_count, failed_countries, \
     channel_count, error_count, error, saved_at";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file; parent directories are
    ///   created as needed
    pub fn new(path: &Path) -> Result<Self, WaybackError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // Configure SQLite for better performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> Result<Self, WaybackError> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn summary_from_row(row: &Row<'_>) -> rusqlite::Result<SnapshotSummary> {
    Ok(SnapshotSummary {
        snapshot_id: row.get(0)?,
        root_url: row.get(1)?,
        free_tv_url: row.get(2)?,
        status: SnapshotStatus::from_db_string(&row.get::<_, String>(3)?)
            .unwrap_or(SnapshotStatus::Partial),
        config_hash: row.get(4)?,
        started_at: row.get(5)?,
        duration_ms: row.get::<_, i64>(6)? as u64,
        requests_issued: row.get::<_, i64>(7)? as u64,
        region_count: row.get::<_, i64>(8)? as u64,
        country_count: row.get::<_, i64>(9)? as u64,
        failed_countries: row.get::<_, i64>(10)? as u64,
        channel_count: row.get::<_, i64>(11)? as u64,
        error_count: row.get::<_, i64>(12)? as u64,
        error: row.get(13)?,
        saved_at: row.get(14)?,
    })
}

impl Storage for SqliteStorage {
    // ===== Snapshots =====

    fn save_snapshot(
        &mut self,
        snapshot: &ArchiveSnapshot,
        config_hash: &str,
    ) -> StorageResult<()> {
        let document = serde_json::to_string(snapshot)?;
        let now = Utc::now().to_rfc3339();

        self.conn.execute(
            "INSERT OR REPLACE INTO snapshots (
                snapshot_id, root_url, free_tv_url, status, config_hash, started_at,
                duration_ms, requests_issued, region_count, country_count, failed_countries,
                channel_count, error_count, error, document, saved_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
            params![
                snapshot.snapshot_id,
                snapshot.root_url,
                snapshot.free_tv_url,
                snapshot.status().to_db_string(),
                config_hash,
                snapshot.started_at.to_rfc3339(),
                snapshot.duration_ms as i64,
                snapshot.counters.requests_issued as i64,
                snapshot.regions.len() as i64,
                snapshot.country_count() as i64,
                snapshot.failed_country_count() as i64,
                snapshot.channel_count() as i64,
                snapshot.counters.errors as i64,
                snapshot.error,
                document,
                now,
            ],
        )?;

        tracing::debug!("Saved snapshot {}", snapshot.snapshot_id);
        Ok(())
    }

    fn load_snapshot(&self, snapshot_id: &str) -> StorageResult<ArchiveSnapshot> {
        let document: String = self
            .conn
            .query_row(
                "SELECT document FROM snapshots WHERE snapshot_id = ?1",
                params![snapshot_id],
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(|| StorageError::SnapshotNotFound(snapshot_id.to_string()))?;

        Ok(serde_json::from_str(&document)?)
    }

    fn snapshot_status(&self, snapshot_id: &str) -> StorageResult<Option<SnapshotStatus>> {
        let status: Option<String> = self
            .conn
            .query_row(
                "SELECT status FROM snapshots WHERE snapshot_id = ?1",
                params![snapshot_id],
                |row| row.get(0),
            )
            .optional()?;

        status
            .map(|s| {
                SnapshotStatus::from_db_string(&s)
                    .ok_or_else(|| StorageError::Database(format!("Unknown snapshot status '{}'", s)))
            })
            .transpose()
    }

    fn list_snapshots(&self) -> StorageResult<Vec<SnapshotSummary>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM snapshots ORDER BY snapshot_id",
            SUMMARY_COLUMNS
        ))?;

        let summaries = stmt
            .query_map([], summary_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(summaries)
    }

    fn load_all_snapshots(&self) -> StorageResult<Vec<ArchiveSnapshot>> {
        let mut stmt = self
            .conn
            .prepare("SELECT document FROM snapshots ORDER BY snapshot_id")?;

        let documents = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        documents
            .iter()
            .map(|document| serde_json::from_str(document).map_err(StorageError::from))
            .collect()
    }

    fn count_snapshots(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM snapshots", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    // ===== Archive Index =====

    fn upsert_index_entries(
        &mut self,
        host: &str,
        entries: &[SnapshotEntry],
    ) -> StorageResult<usize> {
        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;
        let mut inserted = 0;

        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO snapshot_index (host, timestamp, original_url, discovered_at)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for entry in entries {
                inserted += stmt.execute(params![host, entry.timestamp, entry.original_url, now])?;
            }
        }

        tx.commit()?;
        Ok(inserted)
    }

    fn load_index_entries(&self, host: &str) -> StorageResult<Vec<SnapshotEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT timestamp, original_url FROM snapshot_index WHERE host = ?1 ORDER BY timestamp",
        )?;

        let entries = stmt
            .query_map(params![host], |row| {
                Ok(SnapshotEntry {
                    timestamp: row.get(0)?,
                    original_url: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entries)
    }
}
