//! Channel table row merging
//!
//! The channel tables on the site carry no rowspans. A channel that has more
//! than one value for some trailing column (several beams, several encodings)
//! instead gets extra rows holding only those trailing cells. `RowMerger`
//! folds such continuation rows back into the channel they belong to.

use crate::config::SiteProfile;
use crate::extract::dom::{find_table, read_rows};
use crate::extract::predicates::{is_channel_table, is_noise_row};
use crate::extract::table::{ColumnSchema, RawCell, TableRow};
use crate::model::ChannelRecord;
use crate::url::{is_channel_detail_url, resolve_href};
use crate::WaybackError;
use scraper::Html;
use url::Url;

/// Records produced by one merge, with the soft errors met on the way
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeOutcome {
    /// Finalized records that have a name, in table order
    pub records: Vec<ChannelRecord>,
    /// Finalized records dropped for lacking a name
    pub discarded: usize,
    /// Link targets that could not be resolved and were kept as text
    pub unresolved_links: Vec<String>,
}

/// A located channel table and the records merged from it
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelTable {
    pub schema: ColumnSchema,
    pub records: Vec<ChannelRecord>,
    pub discarded: usize,
    pub unresolved_links: Vec<String>,
}

/// Folds a channel table's rows into logical channel records
///
/// # Example
///
/// ```
/// use lyngsat_wayback::config::SiteProfile;
/// use lyngsat_wayback::extract::{ColumnSchema, RawCell, RowMerger, TableRow};
/// use url::Url;
///
/// let profile = SiteProfile {
///     name_column: "A".to_string(),
///     ..SiteProfile::default()
/// };
/// let base = Url::parse("http://www.lyngsat.com/free/Japan.html").unwrap();
/// let schema = ColumnSchema::from_names(&["A", "B", "C"]);
///
/// let mut merger = RowMerger::new(schema, &base, &profile);
/// merger.push_row(&TableRow::from_cells(vec![
///     RawCell::text("1"),
///     RawCell::text("2"),
///     RawCell::text("3"),
/// ]));
/// merger.push_row(&TableRow::from_cells(vec![RawCell::text("4")]));
///
/// let outcome = merger.finish();
/// assert_eq!(outcome.records.len(), 1);
/// assert_eq!(outcome.records[0].get("C").unwrap().text(), "3, 4");
/// ```
pub struct RowMerger<'a> {
    schema: ColumnSchema,
    base_url: &'a Url,
    profile: &'a SiteProfile,
    current: ChannelRecord,
    finalized: Vec<ChannelRecord>,
    unresolved_links: Vec<String>,
}

impl<'a> RowMerger<'a> {
    pub fn new(schema: ColumnSchema, base_url: &'a Url, profile: &'a SiteProfile) -> Self {
        Self {
            schema,
            base_url,
            profile,
            current: ChannelRecord::new(),
            finalized: Vec::new(),
            unresolved_links: Vec::new(),
        }
    }

    /// Feeds the next data row, in document order
    pub fn push_row(&mut self, row: &TableRow) {
        if is_noise_row(&row.text, self.profile) {
            return;
        }

        let cell_count = row.cells.len();
        if cell_count < self.schema.len() {
            let offset = self.schema.continuation_offset(cell_count);
            for (index, cell) in row.cells.iter().enumerate() {
                self.map_cell(offset + index, cell);
            }
            return;
        }

        self.finish_current();
        // Cells beyond the schema have no column to land in
        for (index, cell) in row.cells.iter().take(self.schema.len()).enumerate() {
            self.map_cell(index, cell);
        }
    }

    /// Maps one cell into column `index` of the current record
    fn map_cell(&mut self, index: usize, cell: &RawCell) {
        let Some(column) = self.schema.name(index) else {
            return;
        };

        let href = cell
            .href
            .as_deref()
            .and_then(|href| match resolve_href(self.base_url, href) {
                Ok(url) => Some(url),
                Err(e) => {
                    tracing::debug!("Keeping '{}' as text, link {} unusable: {}", cell.text, href, e);
                    self.unresolved_links.push(href.to_string());
                    None
                }
            });

        if let Some(url) = &href {
            if column == self.profile.name_column
                && is_channel_detail_url(url, &self.profile.detail_path_prefix)
            {
                self.current.detail_page_url = Some(url.to_string());
            }
        }

        self.current
            .merge_cell(column, &cell.text, href.map(String::from));
    }

    /// Closes the in-progress record, if it holds anything
    fn finish_current(&mut self) {
        if !self.current.is_empty() {
            self.finalized.push(std::mem::take(&mut self.current));
        }
    }

    /// Closes the last record and drops every record without a name
    pub fn finish(mut self) -> MergeOutcome {
        self.finish_current();

        let name_column = self.profile.name_column.as_str();
        let total = self.finalized.len();
        let records: Vec<ChannelRecord> = self
            .finalized
            .into_iter()
            .filter(|record| record.name(name_column).is_some())
            .collect();

        MergeOutcome {
            discarded: total - records.len(),
            records,
            unresolved_links: self.unresolved_links,
        }
    }
}

/// Locates the channel table on a country page and merges its rows
///
/// Returns `Ok(None)` when the page has no channel table, and
/// `WaybackError::EmptySchema` when the table's header row names no columns.
pub fn extract_channel_table(
    document: &Html,
    base_url: &Url,
    profile: &SiteProfile,
) -> Result<Option<ChannelTable>, WaybackError> {
    let Some(table) = find_table(document, |text| is_channel_table(text, profile)) else {
        return Ok(None);
    };

    let mut rows = read_rows(table).into_iter();
    let header = rows.next().unwrap_or_default();
    let schema = ColumnSchema::from_header(&header.cells);
    if schema.is_empty() {
        return Err(WaybackError::EmptySchema {
            url: base_url.to_string(),
        });
    }

    let mut merger = RowMerger::new(schema.clone(), base_url, profile);
    for row in rows {
        merger.push_row(&row);
    }
    let outcome = merger.finish();

    Ok(Some(ChannelTable {
        schema,
        records: outcome.records,
        discarded: outcome.discarded,
        unresolved_links: outcome.unresolved_links,
    }))
}
