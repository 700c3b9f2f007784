//! Database schema definitions and migrations
//!
//! This module contains all SQL schema definitions for the LyngSat Wayback database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per crawled snapshot; the full tree lives in `document`
CREATE TABLE IF NOT EXISTS snapshots (
    snapshot_id TEXT PRIMARY KEY,
    root_url TEXT NOT NULL,
    free_tv_url TEXT,
    status TEXT NOT NULL,
    config_hash TEXT NOT NULL,
    started_at TEXT NOT NULL,
    duration_ms INTEGER NOT NULL,
    requests_issued INTEGER NOT NULL DEFAULT 0,
    region_count INTEGER NOT NULL DEFAULT 0,
    country_count INTEGER NOT NULL DEFAULT 0,
    failed_countries INTEGER NOT NULL DEFAULT 0,
    channel_count INTEGER NOT NULL DEFAULT 0,
    error_count INTEGER NOT NULL DEFAULT 0,
    error TEXT,
    document TEXT NOT NULL,
    saved_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_snapshots_status ON snapshots(status);

-- Captures listed by the archive index, per host
CREATE TABLE IF NOT EXISTS snapshot_index (
    host TEXT NOT NULL,
    timestamp TEXT NOT NULL,
    original_url TEXT NOT NULL,
    discovered_at TEXT NOT NULL,
    PRIMARY KEY (host, timestamp)
);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    Ok(())
}

/// Current schema version, stored in SQLite's `user_version`
pub const SCHEMA_VERSION: u32 = 1;
