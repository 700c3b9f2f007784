//! Crawl coordinator - per-snapshot crawl orchestration
//!
//! One `crawl_snapshot` call walks one archived capture through its stages:
//!
//! ```text
//! ROOT → FREE_TV_INDEX → REGION_LIST → COUNTRY_LIST → CHANNEL_TABLE (+ detail pages)
//! ```
//!
//! Regions are crawled concurrently up to the configured ceiling, and so are
//! the countries of each region. A failing region or country is recorded on
//! its own result and never aborts its siblings; only an unreachable entry
//! point aborts the snapshot.

use crate::config::{CrawlerConfig, SiteProfile};
use crate::crawler::fetcher::{FetchError, FetchedPage, PageSource};
use crate::crawler::resolver::DetailResolver;
use crate::crawler::run_state::CrawlRun;
use crate::extract::{
    extract_channel_table, find_country_links, find_free_tv_index, find_region_links, NavLink,
};
use crate::model::{ArchiveSnapshot, CountryResult, CrawlStage, RegionResult};
use crate::url::snapshot_id;
use crate::WaybackError;
use futures::stream::{self, StreamExt};
use scraper::Html;
use std::sync::Arc;
use std::time::Instant;
use url::Url;

/// Entry point reached on a snapshot: the free TV index and its regions
struct EntryPoint {
    free_tv_url: Url,
    regions: Vec<NavLink>,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    source: Arc<dyn PageSource>,
    config: CrawlerConfig,
    profile: SiteProfile,
}

impl Coordinator {
    /// Creates a coordinator fetching through `source`
    pub fn new(source: Arc<dyn PageSource>, config: CrawlerConfig, profile: SiteProfile) -> Self {
        Self {
            source,
            config,
            profile,
        }
    }

    /// Crawls one snapshot from its root URL
    ///
    /// Never fails: every branch failure is recorded in the returned tree,
    /// and an unreachable entry point leaves `free_tv_url` unset with the
    /// error and failed stage filled in.
    pub async fn crawl_snapshot(&self, root_url: &str) -> ArchiveSnapshot {
        let run = CrawlRun::new();
        let started = Instant::now();
        let mut snapshot = ArchiveSnapshot::new(snapshot_id(root_url), root_url);

        tracing::info!("Crawling snapshot {} from {}", snapshot.snapshot_id, root_url);

        match self.discover_entry(&run, root_url).await {
            Ok(entry) => {
                tracing::info!(
                    "Snapshot {}: {} regions under {}",
                    snapshot.snapshot_id,
                    entry.regions.len(),
                    entry.free_tv_url
                );
                snapshot.free_tv_url = Some(entry.free_tv_url.to_string());
                snapshot.regions = self.crawl_regions(&run, entry.regions).await;
            }
            Err((stage, e)) => {
                tracing::error!(
                    "Snapshot {} aborted at {}: {}",
                    snapshot.snapshot_id,
                    stage,
                    e
                );
                run.counters.error();
                snapshot.error = Some(e.to_string());
                snapshot.failed_stage = Some(stage);
            }
        }

        snapshot.counters = run.counters.snapshot();
        snapshot.duration_ms = started.elapsed().as_millis() as u64;

        tracing::info!(
            "Snapshot {} done in {} ms: {} countries, {} channels, {} errors",
            snapshot.snapshot_id,
            snapshot.duration_ms,
            snapshot.country_count(),
            snapshot.channel_count(),
            snapshot.counters.errors
        );

        snapshot
    }

    /// ROOT and FREE_TV_INDEX stages
    async fn discover_entry(
        &self,
        run: &CrawlRun,
        root_url: &str,
    ) -> Result<EntryPoint, (CrawlStage, WaybackError)> {
        let root =
            Url::parse(root_url).map_err(|e| (CrawlStage::Root, WaybackError::from(e)))?;
        run.visited.insert_if_absent(root.as_str());

        let page = self
            .fetch(run, &root)
            .await
            .map_err(|e| (CrawlStage::Root, WaybackError::from(e)))?;

        let free_tv_url = {
            let document = Html::parse_document(&page.body);
            find_free_tv_index(&document, &page.url, &self.profile)
        }
        .ok_or_else(|| {
            (
                CrawlStage::Root,
                WaybackError::NoEntryPoint {
                    url: page.url.to_string(),
                    message: "no free TV index link".to_string(),
                },
            )
        })?;

        run.visited.insert_if_absent(free_tv_url.as_str());
        let page = self
            .fetch(run, &free_tv_url)
            .await
            .map_err(|e| (CrawlStage::FreeTvIndex, WaybackError::from(e)))?;

        let regions = {
            let document = Html::parse_document(&page.body);
            find_region_links(&document, &page.url, &self.profile)
        };

        if regions.is_empty() {
            tracing::warn!("No region links found on {}", page.url);
        }

        Ok(EntryPoint {
            free_tv_url,
            regions,
        })
    }

    /// REGION_LIST stage fan-out
    async fn crawl_regions(&self, run: &CrawlRun, mut links: Vec<NavLink>) -> Vec<RegionResult> {
        if let Some(max) = self.config.max_regions {
            links.truncate(max);
        }

        stream::iter(links)
            .map(|link| self.crawl_region(run, link))
            .buffer_unordered(self.config.concurrency)
            .filter_map(|result| async move { result })
            .collect()
            .await
    }

    /// One region: fetch its page, then crawl its countries
    ///
    /// Returns `None` when the region page was already visited.
    async fn crawl_region(&self, run: &CrawlRun, link: NavLink) -> Option<RegionResult> {
        if !run.visited.insert_if_absent(link.url.as_str()) {
            tracing::debug!("Region {} already visited: {}", link.label, link.url);
            run.counters.duplicate_skipped();
            return None;
        }

        tracing::debug!("Crawling region {}", link.label);

        let page = match self.fetch(run, &link.url).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!("Region {} failed: {}", link.label, e);
                run.counters.error();
                return Some(RegionResult::failed(
                    link.label,
                    link.url.to_string(),
                    e.to_string(),
                ));
            }
        };

        let mut countries = {
            let document = Html::parse_document(&page.body);
            find_country_links(&document, &page.url, &self.profile)
        };
        if let Some(max) = self.config.max_countries_per_region {
            countries.truncate(max);
        }

        let mut region = RegionResult::new(link.label, link.url.to_string());
        region.countries = stream::iter(countries)
            .map(|country| self.crawl_country(run, country))
            .buffer_unordered(self.config.concurrency)
            .filter_map(|result| async move { result })
            .collect()
            .await;

        run.counters.region_processed();
        tracing::info!(
            "Region {}: {} countries crawled",
            region.name,
            region.countries.len()
        );

        Some(region)
    }

    /// One country: fetch its page, merge its channel table, resolve details
    ///
    /// Returns `None` when the country page was already visited.
    async fn crawl_country(&self, run: &CrawlRun, link: NavLink) -> Option<CountryResult> {
        if !run.visited.insert_if_absent(link.url.as_str()) {
            tracing::debug!("Country {} already visited: {}", link.label, link.url);
            run.counters.duplicate_skipped();
            return None;
        }

        let result = match self.crawl_channels(run, &link).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!("Country {} failed: {}", link.label, e);
                run.counters.error();
                CountryResult::failed(link.label, link.url.to_string(), e.to_string())
            }
        };

        run.counters.country_processed();
        Some(result)
    }

    /// COUNTRY_LIST and CHANNEL_TABLE stages for one country
    async fn crawl_channels(
        &self,
        run: &CrawlRun,
        link: &NavLink,
    ) -> Result<CountryResult, WaybackError> {
        let page = self.fetch(run, &link.url).await?;

        let table = {
            let document = Html::parse_document(&page.body);
            extract_channel_table(&document, &page.url, &self.profile)
        }?;

        let mut country = CountryResult::new(link.label.as_str(), link.url.as_str());
        let Some(table) = table else {
            tracing::debug!("No channel table for {}", link.label);
            return Ok(country);
        };

        for href in &table.unresolved_links {
            tracing::debug!("Unresolvable link on {}: {}", link.url, href);
        }
        if table.discarded > 0 {
            tracing::debug!(
                "{}: {} records without a channel name dropped",
                link.label,
                table.discarded
            );
        }

        let resolver = DetailResolver::new(
            self.source.as_ref(),
            &self.profile,
            run,
            self.config.detail_retries,
        );
        country.channels = stream::iter(table.records)
            .map(|record| resolver.attach(record))
            .buffered(self.config.concurrency)
            .collect()
            .await;
        country.discarded_records = table.discarded;

        run.counters.channels_extracted(country.channels.len());
        run.counters.records_discarded(table.discarded);

        Ok(country)
    }

    async fn fetch(&self, run: &CrawlRun, url: &Url) -> Result<FetchedPage, FetchError> {
        run.counters.request();
        self.source.fetch(url).await
    }
}
