//! Flat CSV export of stored snapshots
//!
//! Every channel of every snapshot becomes one row. A fixed set of leading
//! columns identifies the channel; every other summary column and every
//! detail page key follows in the order first seen. A channel's detail rows
//! fold into its single CSV row, values joined per key.

use crate::config::SiteProfile;
use crate::model::{ArchiveSnapshot, Cell, ChannelRecord, CountryResult, RegionResult, CELL_SEPARATOR};
use crate::output::error::OutputResult;
use indexmap::{IndexMap, IndexSet};
use std::path::Path;

/// Leading CSV columns, always present and always in this order
pub const LEADING_HEADERS: [&str; 7] = [
    "Archived on",
    "Timestamp",
    "Region",
    "Country",
    "Channel Name",
    "Logo",
    "Channel Page",
];

const MONTHS: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

/// A flattened table ready to be written
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<IndexMap<String, String>>,
}

/// Formats a capture timestamp as `YYYY-MON`, e.g. `2015-JAN`
///
/// Ids that are not capture timestamps yield an empty string.
pub fn archived_on(timestamp: &str) -> String {
    let year = timestamp.get(0..4).filter(|y| y.chars().all(|c| c.is_ascii_digit()));
    let month = timestamp
        .get(4..6)
        .and_then(|m| m.parse::<usize>().ok())
        .and_then(|m| m.checked_sub(1))
        .and_then(|m| MONTHS.get(m));

    match (year, month) {
        (Some(year), Some(month)) => format!("{}-{}", year, month),
        _ => String::new(),
    }
}

/// Flattens snapshots into one row per channel
pub fn flatten_snapshots(snapshots: &[ArchiveSnapshot], profile: &SiteProfile) -> CsvTable {
    let mut headers: IndexSet<String> = LEADING_HEADERS.iter().map(|h| h.to_string()).collect();
    let mut rows = Vec::new();

    for snapshot in snapshots {
        for region in &snapshot.regions {
            for country in &region.countries {
                for channel in &country.channels {
                    let row = flatten_channel(snapshot, region, country, channel, profile);
                    for key in row.keys() {
                        if !headers.contains(key) {
                            headers.insert(key.clone());
                        }
                    }
                    rows.push(row);
                }
            }
        }
    }

    CsvTable {
        headers: headers.into_iter().collect(),
        rows,
    }
}

fn flatten_channel(
    snapshot: &ArchiveSnapshot,
    region: &RegionResult,
    country: &CountryResult,
    channel: &ChannelRecord,
    profile: &SiteProfile,
) -> IndexMap<String, String> {
    let mut row = IndexMap::new();
    row.insert("Archived on".to_string(), archived_on(&snapshot.snapshot_id));
    row.insert("Timestamp".to_string(), snapshot.snapshot_id.clone());
    row.insert("Region".to_string(), region.name.clone());
    row.insert("Country".to_string(), country.name.clone());
    row.insert(
        "Channel Name".to_string(),
        channel.name(&profile.name_column).unwrap_or_default().to_string(),
    );
    row.insert(
        "Logo".to_string(),
        channel.get(&profile.logo_column).map(logo_value).unwrap_or_default(),
    );
    row.insert(
        "Channel Page".to_string(),
        channel.detail_page_url.clone().unwrap_or_default(),
    );

    for (column, cell) in &channel.columns {
        if column == &profile.name_column || column == &profile.logo_column {
            continue;
        }
        row.entry(column.clone())
            .or_insert_with(|| cell.text().to_string());
    }

    for detail in &channel.detail_records {
        for (key, cell) in detail {
            let value = cell.text();
            match row.get_mut(key) {
                Some(existing) if !existing.is_empty() => {
                    if !value.is_empty() {
                        existing.push_str(CELL_SEPARATOR);
                        existing.push_str(value);
                    }
                }
                _ => {
                    row.insert(key.clone(), value.to_string());
                }
            }
        }
    }

    row
}

/// Logos are usually linked images without text; the link is the useful part
fn logo_value(cell: &Cell) -> String {
    match cell.href() {
        Some(href) if cell.text().is_empty() => href.to_string(),
        _ => cell.text().to_string(),
    }
}

/// Writes a flattened table, every field quoted
pub fn write_csv(table: &CsvTable, output_path: &Path) -> OutputResult<()> {
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = ::csv::WriterBuilder::new()
        .quote_style(::csv::QuoteStyle::Always)
        .from_path(output_path)?;

    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(
            table
                .headers
                .iter()
                .map(|header| row.get(header).map(String::as_str).unwrap_or("")),
        )?;
    }

    writer.flush()?;
    Ok(())
}

/// Flattens and writes snapshots, returning the number of data rows
pub fn export_csv(
    snapshots: &[ArchiveSnapshot],
    profile: &SiteProfile,
    output_path: &Path,
) -> OutputResult<usize> {
    let table = flatten_snapshots(snapshots, profile);
    write_csv(&table, output_path)?;
    Ok(table.rows.len())
}
