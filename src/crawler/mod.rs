//! Crawler module for walking archived snapshots
//!
//! This module contains the crawling logic, including:
//! - The fetch gateway (HTTP with retry, proxy routing and a shared limiter)
//! - Per-crawl shared state (visited set, counters, detail page cache)
//! - Detail page resolution
//! - Per-snapshot orchestration and the multi-snapshot driver

mod coordinator;
mod fetcher;
mod resolver;
mod run_state;

pub use coordinator::Coordinator;
pub use fetcher::{
    build_http_client, FetchError, FetchedPage, HttpGateway, PageSource, RetryPolicy,
};
pub use run_state::{CrawlRun, DetailCache, RunCounters, VisitedSet};

use crate::archive::resolve_roots;
use crate::config::Config;
use crate::model::SnapshotStatus;
use crate::output::write_snapshot_json;
use crate::storage::{SqliteStorage, Storage};
use crate::url::snapshot_id;
use crate::Result;
use std::path::Path;
use std::sync::Arc;

/// What a crawl run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlReport {
    /// Snapshots crawled and stored in this run
    pub crawled: usize,
    /// Snapshots skipped because they were already stored as complete
    pub skipped: usize,
    /// Ids of crawled snapshots that are not complete
    pub needs_reprocessing: Vec<String>,
}

/// Runs a complete crawl operation
///
/// This is the main entry point for a crawl. It will:
/// 1. Open the storage database
/// 2. Build the fetch gateway
/// 3. Resolve the snapshot roots (configuration, cache, database or archive index)
/// 4. Crawl every snapshot not already stored as complete (all of them when
///    `fresh` is set), one at a time
/// 5. Store each snapshot, and dump it as JSON when a JSON directory is set
///
/// # Example
///
/// ```no_run
/// use lyngsat_wayback::config::load_config_with_hash;
/// use lyngsat_wayback::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let (config, hash) = load_config_with_hash(Path::new("wayback.toml"))?;
/// let report = run_crawl(&config, &hash, false).await?;
/// println!("{} snapshots crawled", report.crawled);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: &Config, config_hash: &str, fresh: bool) -> Result<CrawlReport> {
    let mut storage = SqliteStorage::new(Path::new(&config.output.database_path))?;
    let gateway = HttpGateway::new(&config.http, config.proxy.as_ref())?;

    let (roots, source) = resolve_roots(config, &mut storage, gateway.client()).await?;
    tracing::info!("{} snapshot roots to consider ({:?})", roots.len(), source);

    let coordinator = Coordinator::new(
        Arc::new(gateway),
        config.crawler.clone(),
        config.site.clone(),
    );

    let mut report = CrawlReport::default();
    for root in &roots {
        let id = snapshot_id(root);
        if !fresh && storage.snapshot_status(&id)? == Some(SnapshotStatus::Complete) {
            tracing::debug!("Snapshot {} already complete, skipping", id);
            report.skipped += 1;
            continue;
        }

        let snapshot = coordinator.crawl_snapshot(root).await;
        storage.save_snapshot(&snapshot, config_hash)?;

        if let Some(dir) = &config.output.json_dir {
            write_snapshot_json(Path::new(dir), &snapshot)?;
        }

        if snapshot.needs_reprocessing() {
            report.needs_reprocessing.push(snapshot.snapshot_id.clone());
        }
        report.crawled += 1;
    }

    tracing::info!(
        "Crawl finished: {} crawled, {} skipped, {} need reprocessing",
        report.crawled,
        report.skipped,
        report.needs_reprocessing.len()
    );

    Ok(report)
}
