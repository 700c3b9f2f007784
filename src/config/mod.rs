//! Configuration module for LyngSat Wayback
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use lyngsat_wayback::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("wayback.toml")).unwrap();
//! println!("Crawler concurrency: {}", config.crawler.concurrency);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    ArchiveConfig, Config, CrawlerConfig, HttpConfig, OutputConfig, ProxyConfig, SiteProfile,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
