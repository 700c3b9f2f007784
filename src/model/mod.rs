//! Catalog data model
//!
//! This module defines the tree one crawl produces for one archive snapshot.
//!
//! # Components
//!
//! - `Cell`: a table cell value, plain text or a hyperlink
//! - `ChannelRecord`: one logical channel row plus its merged detail page
//! - `CountryResult` / `RegionResult`: branches of the catalog tree, each able
//!   to carry its own local error
//! - `ArchiveSnapshot`: the root of one run, with aggregate counters

mod cell;
mod record;
mod snapshot;

// Re-export main types
pub use cell::{Cell, CELL_SEPARATOR};
pub use record::{ChannelRecord, DetailRow};
pub use snapshot::{
    ArchiveSnapshot, CountryResult, CrawlCounters, CrawlStage, RegionResult, SnapshotStatus,
};
