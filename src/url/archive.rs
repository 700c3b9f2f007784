//! Web archive URL layout
//!
//! Archived pages live at `http://web.archive.org/web/<timestamp>[modifier]/<original>`,
//! where the timestamp is the 14-digit capture time (`YYYYMMDDhhmmss`).

use url::Url;

/// Host serving archived captures
pub const ARCHIVE_HOST: &str = "web.archive.org";

/// Number of digits in a capture timestamp
const TIMESTAMP_LEN: usize = 14;

/// Splits an archive URL into its capture timestamp and original URL
///
/// Returns `None` when `url` is not an archive capture URL.
///
/// # Examples
///
/// ```
/// use lyngsat_wayback::url::split_archive_url;
///
/// let (ts, original) = split_archive_url(
///     "http://web.archive.org/web/20150102195325/http://www.lyngsat.com/",
/// )
/// .unwrap();
/// assert_eq!(ts, "20150102195325");
/// assert_eq!(original, "http://www.lyngsat.com/");
/// ```
pub fn split_archive_url(url: &str) -> Option<(String, String)> {
    let rest = url
        .strip_prefix("http://")
        .or_else(|| url.strip_prefix("https://"))?;
    let rest = rest.strip_prefix(ARCHIVE_HOST)?;
    let rest = rest.strip_prefix("/web/")?;

    let (stamp, original) = rest.split_once('/')?;
    if original.is_empty() {
        return None;
    }

    // Captures may carry a replay modifier after the digits (e.g. `id_`)
    let digits = stamp.get(..TIMESTAMP_LEN)?;
    let modifier = &stamp[digits.len()..];
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if !modifier.chars().all(|c| c.is_ascii_alphabetic() || c == '_') {
        return None;
    }

    Some((digits.to_string(), original.to_string()))
}

/// Returns the original (pre-archive) URL of a capture, or `url` itself
pub fn original_url(url: &str) -> String {
    split_archive_url(url)
        .map(|(_, original)| original)
        .unwrap_or_else(|| url.to_string())
}

/// Builds the capture URL for an original URL at a timestamp
pub fn archive_url(timestamp: &str, original: &str) -> String {
    format!("http://{}/web/{}/{}", ARCHIVE_HOST, timestamp, original)
}

/// Derives the snapshot id for a crawl root
///
/// Archive captures are identified by their timestamp. Any other root (a live
/// site or a local mirror) falls back to its `host[:port]`.
pub fn snapshot_id(root_url: &str) -> String {
    if let Some((timestamp, _)) = split_archive_url(root_url) {
        return timestamp;
    }

    match Url::parse(root_url) {
        Ok(url) => match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            _ => root_url.to_string(),
        },
        Err(_) => root_url.to_string(),
    }
}
