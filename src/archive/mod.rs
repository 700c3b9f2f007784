//! Web archive index access
//!
//! Before any crawl, the list of snapshot roots has to be known. It comes
//! from the configuration, from an earlier run (the index cache file or the
//! database), or from a fresh query to the archive's CDX index service.

mod cdx;

pub use cdx::{
    fetch_snapshot_index, load_index_cache, parse_cdx_response, save_index_cache, CdxQuery,
    SnapshotEntry,
};

use crate::config::Config;
use crate::storage::Storage;
use crate::Result;
use reqwest::Client;
use std::path::Path;

/// Where a crawl's snapshot roots came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootSource {
    Config,
    Cache,
    Database,
    Query,
}

/// Resolves the snapshot root URLs for a crawl, oldest capture first
///
/// # Resolution Order
///
/// 1. `archive.roots` from the configuration, used as given
/// 2. The index cache file, when configured and present
/// 3. Index entries stored in the database by an earlier run
/// 4. A CDX query, whose result is stored in the database and the cache file
pub async fn resolve_roots<S: Storage>(
    config: &Config,
    storage: &mut S,
    client: &Client,
) -> Result<(Vec<String>, RootSource)> {
    let archive = &config.archive;

    if !archive.roots.is_empty() {
        return Ok((archive.roots.clone(), RootSource::Config));
    }

    if let Some(cache) = &archive.index_cache {
        if let Some(entries) = load_index_cache(Path::new(cache))? {
            tracing::info!("Loaded {} snapshots from index cache {}", entries.len(), cache);
            return Ok((to_roots(&entries), RootSource::Cache));
        }
    }

    let stored = storage.load_index_entries(&archive.host)?;
    if !stored.is_empty() {
        tracing::info!("Loaded {} snapshots from the database", stored.len());
        return Ok((to_roots(&stored), RootSource::Database));
    }

    let query = CdxQuery {
        host: archive.host.clone(),
        from: archive.from.clone(),
        to: archive.to_date(),
    };
    let entries = fetch_snapshot_index(client, &archive.cdx_endpoint, &query).await?;
    tracing::info!("Archive index lists {} snapshots for {}", entries.len(), archive.host);

    storage.upsert_index_entries(&archive.host, &entries)?;
    if let Some(cache) = &archive.index_cache {
        save_index_cache(Path::new(cache), &entries)?;
    }

    Ok((to_roots(&entries), RootSource::Query))
}

fn to_roots(entries: &[SnapshotEntry]) -> Vec<String> {
    let mut entries = entries.to_vec();
    entries.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
    entries.iter().map(SnapshotEntry::archive_url).collect()
}
