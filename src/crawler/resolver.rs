//! Detail page resolution for channel records

use crate::config::SiteProfile;
use crate::crawler::fetcher::PageSource;
use crate::crawler::run_state::{CrawlRun, DetailOutcome};
use crate::extract::{parse_detail_page, DetailError};
use crate::model::ChannelRecord;
use scraper::Html;
use url::Url;

/// Fetches channel detail pages and merges them into their records
pub(crate) struct DetailResolver<'a> {
    source: &'a dyn PageSource,
    profile: &'a SiteProfile,
    run: &'a CrawlRun,
    retries: u32,
}

impl<'a> DetailResolver<'a> {
    pub(crate) fn new(
        source: &'a dyn PageSource,
        profile: &'a SiteProfile,
        run: &'a CrawlRun,
        retries: u32,
    ) -> Self {
        Self {
            source,
            profile,
            run,
            retries,
        }
    }

    /// Merges the record's detail page into it, if it links one
    ///
    /// On success the detail rows replace every summary column except name
    /// and logo. On failure the summary columns stay and the error is noted
    /// on the record.
    pub(crate) async fn attach(&self, mut record: ChannelRecord) -> ChannelRecord {
        let Some(url) = record.detail_page_url.clone() else {
            return record;
        };

        match self.resolve(&url).await {
            Ok(rows) => {
                let keep = [
                    self.profile.name_column.as_str(),
                    self.profile.logo_column.as_str(),
                ];
                if record.attach_details(rows, &keep) {
                    self.run.counters.detail_merged();
                }
            }
            Err(e) => {
                tracing::warn!("Detail page {} not merged: {}", url, e);
                self.run.counters.error();
                record.record_detail_failure(e.to_string());
            }
        }

        record
    }

    /// Resolves one detail page, fetching it at most once per crawl
    pub(crate) async fn resolve(&self, url: &str) -> DetailOutcome {
        let slot = self.run.details.slot(url);
        slot.get_or_init(|| self.fetch_and_parse(url)).await.clone()
    }

    async fn fetch_and_parse(&self, url: &str) -> DetailOutcome {
        let url = Url::parse(url).map_err(|e| DetailError::Fetch(e.to_string()))?;

        let mut attempt = 0;
        loop {
            self.run.counters.request();
            let page = self
                .source
                .fetch(&url)
                .await
                .map_err(|e| DetailError::Fetch(e.to_string()))?;

            let parsed = {
                let document = Html::parse_document(&page.body);
                parse_detail_page(&document, &page.url, self.profile)
            };

            match parsed {
                Err(e) if e.is_retryable() && attempt < self.retries => {
                    attempt += 1;
                    tracing::debug!(
                        "Detail page {} unusable ({}), retry {}/{}",
                        url,
                        e,
                        attempt,
                        self.retries
                    );
                }
                outcome => return outcome,
            }
        }
    }
}
