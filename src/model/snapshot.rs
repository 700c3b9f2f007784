use crate::model::record::ChannelRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Entry stages whose failure aborts a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrawlStage {
    /// The snapshot's root page
    Root,
    /// The free TV index page, listing regions
    FreeTvIndex,
}

impl fmt::Display for CrawlStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Root => "root",
            Self::FreeTvIndex => "free_tv_index",
        };
        f.write_str(name)
    }
}

/// Overall outcome of a snapshot crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnapshotStatus {
    /// Every attempted branch succeeded
    Complete,
    /// The snapshot ran but some branches failed or nothing was found
    Partial,
    /// No entry point was reachable
    Aborted,
}

impl SnapshotStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Complete => "complete",
            Self::Partial => "partial",
            Self::Aborted => "aborted",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "complete" => Some(Self::Complete),
            "partial" => Some(Self::Partial),
            "aborted" => Some(Self::Aborted),
            _ => None,
        }
    }
}

/// Aggregate counters for one snapshot run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlCounters {
    /// Page requests made by the crawl, one per page however many
    /// attempts the fetch gateway needed
    pub requests_issued: u64,
    pub regions_processed: u64,
    pub countries_processed: u64,
    pub channels_extracted: u64,
    pub detail_pages_merged: u64,
    /// Records dropped for lacking a name (soft errors)
    pub records_discarded: u64,
    /// Links skipped because their page was already visited
    pub duplicates_skipped: u64,
    /// Region, country and detail failures
    pub errors: u64,
}

/// Channels extracted from one country page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryResult {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub channels: Vec<ChannelRecord>,
    /// Records dropped for lacking a name
    #[serde(default)]
    pub discarded_records: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CountryResult {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            channels: Vec::new(),
            discarded_records: 0,
            error: None,
        }
    }

    /// Creates a result for a country whose channel table could not be extracted
    pub fn failed(name: impl Into<String>, url: impl Into<String>, error: String) -> Self {
        Self {
            error: Some(error),
            ..Self::new(name, url)
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Countries reached from one region page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionResult {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub countries: Vec<CountryResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RegionResult {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            countries: Vec::new(),
            error: None,
        }
    }

    /// Creates a result for a region whose country list could not be read
    pub fn failed(name: impl Into<String>, url: impl Into<String>, error: String) -> Self {
        Self {
            error: Some(error),
            ..Self::new(name, url)
        }
    }
}

/// The catalog tree extracted from one archive capture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveSnapshot {
    /// Capture timestamp (or host for non-archive roots)
    pub snapshot_id: String,
    pub root_url: String,
    /// `None` when no free TV index was reachable
    pub free_tv_url: Option<String>,
    #[serde(default)]
    pub regions: Vec<RegionResult>,
    #[serde(default)]
    pub counters: CrawlCounters,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_stage: Option<CrawlStage>,
}

impl ArchiveSnapshot {
    /// Creates an empty snapshot for a root URL
    pub fn new(snapshot_id: impl Into<String>, root_url: impl Into<String>) -> Self {
        Self {
            snapshot_id: snapshot_id.into(),
            root_url: root_url.into(),
            free_tv_url: None,
            regions: Vec::new(),
            counters: CrawlCounters::default(),
            started_at: Utc::now(),
            duration_ms: 0,
            error: None,
            failed_stage: None,
        }
    }

    /// Returns true if the run stopped before reaching any region
    pub fn is_aborted(&self) -> bool {
        self.free_tv_url.is_none()
    }

    /// Number of country branches attempted
    pub fn country_count(&self) -> usize {
        self.regions.iter().map(|r| r.countries.len()).sum()
    }

    /// Number of country branches that carry an error
    pub fn failed_country_count(&self) -> usize {
        self.regions
            .iter()
            .flat_map(|r| r.countries.iter())
            .filter(|c| !c.is_success())
            .count()
    }

    /// Number of region branches that carry an error
    pub fn failed_region_count(&self) -> usize {
        self.regions.iter().filter(|r| r.error.is_some()).count()
    }

    /// Number of channel records across the tree
    pub fn channel_count(&self) -> usize {
        self.regions
            .iter()
            .flat_map(|r| r.countries.iter())
            .map(|c| c.channels.len())
            .sum()
    }

    /// Share of attempted countries whose channel table was extracted
    ///
    /// Aborted snapshots and snapshots without any country score 0.
    pub fn success_ratio(&self) -> f64 {
        let attempted = self.country_count();
        if self.is_aborted() || attempted == 0 {
            return 0.0;
        }
        (attempted - self.failed_country_count()) as f64 / attempted as f64
    }

    pub fn status(&self) -> SnapshotStatus {
        if self.is_aborted() {
            SnapshotStatus::Aborted
        } else if self.counters.errors > 0
            || self.failed_region_count() > 0
            || self.failed_country_count() > 0
            || self.country_count() == 0
        {
            SnapshotStatus::Partial
        } else {
            SnapshotStatus::Complete
        }
    }

    /// Returns true if the snapshot should be crawled again
    pub fn needs_reprocessing(&self) -> bool {
        self.status() != SnapshotStatus::Complete
    }
}
