//! URL handling module for LyngSat Wayback
//!
//! This module provides archive URL parsing, visit-key normalization for the
//! per-run Visited-set, and link resolution against archived pages.

mod archive;
mod normalize;
mod resolve;

// Re-export main functions
pub use archive::{archive_url, original_url, snapshot_id, split_archive_url, ARCHIVE_HOST};
pub use normalize::normalize_visit_key;
pub use resolve::{is_channel_detail_url, resolve_href};
