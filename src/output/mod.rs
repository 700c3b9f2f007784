//! Output module for reports derived from stored snapshots
//!
//! This module handles:
//! - Flattening snapshot trees into a CSV channel table
//! - Markdown health summaries of stored snapshots
//! - Statistics printouts
//! - Per-snapshot JSON documents

pub mod csv;
mod error;
mod json;
mod markdown;
pub mod stats;

pub use csv::{export_csv, flatten_snapshots, write_csv, CsvTable};
pub use error::{OutputError, OutputResult};
pub use json::write_snapshot_json;
pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use stats::{load_statistics, print_statistics, CrawlStatistics};
