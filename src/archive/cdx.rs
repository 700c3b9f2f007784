//! CDX index service client

use crate::url::archive_url;
use crate::{Result, WaybackError};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use url::Url;

/// One capture listed by the archive index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    /// 14-digit capture timestamp (`YYYYMMDDhhmmss`)
    pub timestamp: String,
    /// The captured URL as the site served it
    pub original_url: String,
}

impl SnapshotEntry {
    /// The archive URL replaying this capture
    pub fn archive_url(&self) -> String {
        archive_url(&self.timestamp, &self.original_url)
    }
}

/// Host and date range of an index query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CdxQuery {
    pub host: String,
    /// Inclusive start date, `YYYYMMDD`
    pub from: String,
    /// Inclusive end date, `YYYYMMDD`
    pub to: String,
}

impl CdxQuery {
    /// Builds the request URL: successful captures only, one per month
    pub fn request_url(&self, endpoint: &str) -> Result<Url> {
        Ok(Url::parse_with_params(
            endpoint,
            &[
                ("url", self.host.as_str()),
                ("from", self.from.as_str()),
                ("to", self.to.as_str()),
                ("output", "json"),
                ("fl", "timestamp,original"),
                ("filter", "statuscode:200"),
                ("collapse", "timestamp:6"),
            ],
        )?)
    }
}

/// Queries the archive index for the captures of a host
pub async fn fetch_snapshot_index(
    client: &Client,
    endpoint: &str,
    query: &CdxQuery,
) -> Result<Vec<SnapshotEntry>> {
    let url = query.request_url(endpoint)?;
    tracing::info!("Querying archive index for {} ({} to {})", query.host, query.from, query.to);

    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(WaybackError::ArchiveIndex(format!(
            "index service answered HTTP {}",
            status.as_u16()
        )));
    }

    let body = response.text().await?;
    parse_cdx_response(&body)
}

/// Parses a JSON CDX response
///
/// The response is a table: the first row names the fields, every further
/// row is one capture. An empty body or a header-only table means no
/// captures.
///
/// # Example
///
/// ```
/// use lyngsat_wayback::archive::parse_cdx_response;
///
/// let body = r#"[["timestamp","original"],["20150102195325","http://www.lyngsat.com/"]]"#;
/// let entries = parse_cdx_response(body).unwrap();
/// assert_eq!(entries[0].timestamp, "20150102195325");
/// ```
pub fn parse_cdx_response(body: &str) -> Result<Vec<SnapshotEntry>> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }

    let rows: Vec<Vec<String>> = serde_json::from_str(body)?;
    let Some((header, captures)) = rows.split_first() else {
        return Ok(Vec::new());
    };

    let column = |name: &str| header.iter().position(|field| field == name);
    let (Some(timestamp_col), Some(original_col)) = (column("timestamp"), column("original"))
    else {
        return Err(WaybackError::ArchiveIndex(format!(
            "unexpected index header: {:?}",
            header
        )));
    };

    Ok(captures
        .iter()
        .filter_map(|row| {
            Some(SnapshotEntry {
                timestamp: row.get(timestamp_col)?.clone(),
                original_url: row.get(original_col)?.clone(),
            })
        })
        .collect())
}

/// Reads the index cache file, if it exists
///
/// The cache maps each capture timestamp to its archive URL.
pub fn load_index_cache(path: &Path) -> Result<Option<Vec<SnapshotEntry>>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)?;
    let cache: BTreeMap<String, String> = serde_json::from_str(&content)?;

    let entries = cache
        .into_iter()
        .map(|(timestamp, url)| {
            let original_url = crate::url::original_url(&url);
            SnapshotEntry {
                timestamp,
                original_url,
            }
        })
        .collect();

    Ok(Some(entries))
}

/// Writes the index cache file
pub fn save_index_cache(path: &Path, entries: &[SnapshotEntry]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let cache: BTreeMap<&str, String> = entries
        .iter()
        .map(|entry| (entry.timestamp.as_str(), entry.archive_url()))
        .collect();

    std::fs::write(path, serde_json::to_string_pretty(&cache)?)?;
    tracing::debug!("Saved {} index entries to {}", entries.len(), path.display());
    Ok(())
}
