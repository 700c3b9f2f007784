//! HTML extraction for the archived site template
//!
//! This module turns fetched pages into catalog data:
//! - Link discovery (free TV index, region groups, country tables)
//! - Channel table row merging into logical channel records
//! - Channel detail table parsing
//!
//! Everything here is synchronous and works on an already-fetched document;
//! the crawler owns all network I/O.

mod detail;
mod dom;
mod links;
mod merge;
pub mod predicates;
mod table;

pub use detail::{parse_detail_page, DetailError};
pub use links::{find_country_links, find_free_tv_index, find_region_links, NavLink};
pub use merge::{extract_channel_table, ChannelTable, MergeOutcome, RowMerger};
pub use table::{ColumnSchema, RawCell, TableRow};
