//! State shared by the tasks of one snapshot crawl
//!
//! Region, country and detail tasks run concurrently and all touch the same
//! visited set and counters. Each mutation is atomic; no ordering between
//! tasks is assumed.

use crate::extract::DetailError;
use crate::model::{CrawlCounters, DetailRow};
use crate::url::normalize_visit_key;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::OnceCell;

/// Normalized URLs already scheduled during one crawl
#[derive(Debug, Default)]
pub struct VisitedSet {
    keys: Mutex<HashSet<String>>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `url` visited, returning false if it already was
    ///
    /// A URL that cannot be normalized is keyed by its raw text.
    pub fn insert_if_absent(&self, url: &str) -> bool {
        let key = normalize_visit_key(url).unwrap_or_else(|_| url.to_string());
        self.keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key)
    }

    pub fn len(&self) -> usize {
        self.keys.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Running totals of one crawl, safe to bump from any task
#[derive(Debug, Default)]
pub struct RunCounters {
    requests_issued: AtomicU64,
    regions_processed: AtomicU64,
    countries_processed: AtomicU64,
    channels_extracted: AtomicU64,
    detail_pages_merged: AtomicU64,
    records_discarded: AtomicU64,
    duplicates_skipped: AtomicU64,
    errors: AtomicU64,
}

impl RunCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one page request; gateway retries are not counted again
    pub fn request(&self) {
        self.requests_issued.fetch_add(1, Ordering::Relaxed);
    }

    pub fn region_processed(&self) {
        self.regions_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn country_processed(&self) {
        self.countries_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn channels_extracted(&self, count: usize) {
        self.channels_extracted
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn detail_merged(&self) {
        self.detail_pages_merged.fetch_add(1, Ordering::Relaxed);
    }

    pub fn records_discarded(&self, count: usize) {
        self.records_discarded
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn duplicate_skipped(&self) {
        self.duplicates_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Copies the current totals
    pub fn snapshot(&self) -> CrawlCounters {
        CrawlCounters {
            requests_issued: self.requests_issued.load(Ordering::Relaxed),
            regions_processed: self.regions_processed.load(Ordering::Relaxed),
            countries_processed: self.countries_processed.load(Ordering::Relaxed),
            channels_extracted: self.channels_extracted.load(Ordering::Relaxed),
            detail_pages_merged: self.detail_pages_merged.load(Ordering::Relaxed),
            records_discarded: self.records_discarded.load(Ordering::Relaxed),
            duplicates_skipped: self.duplicates_skipped.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }
}

/// Outcome of resolving one detail page
pub type DetailOutcome = Result<Vec<DetailRow>, DetailError>;

/// Detail page results of one crawl, keyed by visit key
///
/// The first task to ask for a page fetches it; concurrent and later askers
/// wait for and share that one result.
#[derive(Debug, Default)]
pub struct DetailCache {
    cells: Mutex<HashMap<String, Arc<OnceCell<DetailOutcome>>>>,
}

impl DetailCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the slot for `url`, creating it if needed
    pub fn slot(&self, url: &str) -> Arc<OnceCell<DetailOutcome>> {
        let key = normalize_visit_key(url).unwrap_or_else(|_| url.to_string());
        self.cells
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(key)
            .or_default()
            .clone()
    }
}

/// Everything one snapshot crawl shares between its tasks
#[derive(Debug, Default)]
pub struct CrawlRun {
    pub visited: VisitedSet,
    pub counters: RunCounters,
    pub details: DetailCache,
}

impl CrawlRun {
    pub fn new() -> Self {
        Self::default()
    }
}
