//! Statistics over stored snapshots
//!
//! This module provides functionality for extracting and displaying
//! crawl statistics from the storage layer.

use crate::model::SnapshotStatus;
use crate::output::error::OutputResult;
use crate::storage::{SnapshotSummary, Storage};

/// Aggregate statistics over every stored snapshot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrawlStatistics {
    pub total_snapshots: u64,
    pub complete: u64,
    pub partial: u64,
    pub aborted: u64,

    /// Countries attempted across all snapshots
    pub total_countries: u64,
    pub failed_countries: u64,
    pub total_channels: u64,
    pub total_requests: u64,
    pub total_errors: u64,

    /// Snapshot ids whose status is not complete
    pub needs_reprocessing: Vec<String>,
}

impl CrawlStatistics {
    /// Builds statistics from snapshot metadata
    pub fn from_summaries(summaries: &[SnapshotSummary]) -> Self {
        let mut stats = Self::default();

        for summary in summaries {
            stats.total_snapshots += 1;
            match summary.status {
                SnapshotStatus::Complete => stats.complete += 1,
                SnapshotStatus::Partial => stats.partial += 1,
                SnapshotStatus::Aborted => stats.aborted += 1,
            }
            stats.total_countries += summary.country_count;
            stats.failed_countries += summary.failed_countries;
            stats.total_channels += summary.channel_count;
            stats.total_requests += summary.requests_issued;
            stats.total_errors += summary.error_count;

            if summary.needs_reprocessing() {
                stats.needs_reprocessing.push(summary.snapshot_id.clone());
            }
        }

        stats
    }

    /// Successful countries over attempted countries, as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.total_countries == 0 {
            return 0.0;
        }
        (self.total_countries - self.failed_countries) as f64 / self.total_countries as f64
            * 100.0
    }
}

/// Loads statistics from storage
pub fn load_statistics(storage: &dyn Storage) -> OutputResult<CrawlStatistics> {
    let summaries = storage.list_snapshots()?;
    Ok(CrawlStatistics::from_summaries(&summaries))
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Snapshots:");
    println!("  Total: {}", stats.total_snapshots);
    println!("  Complete: {}", stats.complete);
    println!("  Partial: {}", stats.partial);
    println!("  Aborted: {}", stats.aborted);
    println!();

    println!("Catalog:");
    println!("  Countries crawled: {}", stats.total_countries);
    println!("  Countries failed: {}", stats.failed_countries);
    println!("  Channels extracted: {}", stats.total_channels);
    println!("  Requests issued: {}", stats.total_requests);
    println!("  Errors: {}", stats.total_errors);
    println!();

    if !stats.needs_reprocessing.is_empty() {
        println!(
            "Needs Reprocessing ({}):",
            stats.needs_reprocessing.len()
        );
        for id in &stats.needs_reprocessing {
            println!("  - {}", id);
        }
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} / {} countries extracted)",
        stats.success_rate(),
        stats.total_countries - stats.failed_countries,
        stats.total_countries
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ArchiveSnapshot, CountryResult, RegionResult};
    use crate::storage::SqliteStorage;

    fn stored_snapshot(id: &str, failing: bool) -> ArchiveSnapshot {
        let mut region = RegionResult::new("Asia", "http://x/free/Asia.html");
        region
            .countries
            .push(CountryResult::new("Japan", "http://x/free/Japan.html"));
        if failing {
            region.countries.push(CountryResult::failed(
                "Korea",
                "http://x/free/Korea.html",
                "timeout".to_string(),
            ));
        }

        let mut snapshot = ArchiveSnapshot::new(id, "http://x/");
        snapshot.free_tv_url = Some("http://x/free/index.html".to_string());
        snapshot.regions.push(region);
        snapshot
    }

    #[test]
    fn test_load_statistics() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        storage
            .save_snapshot(&stored_snapshot("20150101000000", false), "hash")
            .unwrap();
        storage
            .save_snapshot(&stored_snapshot("20150201000000", true), "hash")
            .unwrap();
        storage
            .save_snapshot(&ArchiveSnapshot::new("20150301000000", "http://x/"), "hash")
            .unwrap();

        let stats = load_statistics(&storage).unwrap();
        assert_eq!(stats.total_snapshots, 3);
        assert_eq!(stats.complete, 1);
        assert_eq!(stats.partial, 1);
        assert_eq!(stats.aborted, 1);
        assert_eq!(stats.total_countries, 3);
        assert_eq!(stats.failed_countries, 1);
        assert_eq!(
            stats.needs_reprocessing,
            vec!["20150201000000", "20150301000000"]
        );
    }

    #[test]
    fn test_success_rate_zero_countries() {
        assert_eq!(CrawlStatistics::default().success_rate(), 0.0);
    }
}
