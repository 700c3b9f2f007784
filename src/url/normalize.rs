use crate::url::archive::original_url;
use crate::UrlError;
use url::Url;

/// Marker that stands in for an empty path or a directory path
const INDEX_MARKER: &str = "index.html";

/// Normalizes a URL into the key used by the per-run Visited-set
///
/// # Normalization Steps
///
/// 1. Strip the web archive prefix (`web.archive.org/web/<timestamp>/`)
/// 2. Parse the remaining URL, assuming `http://` when the scheme is missing
/// 3. Drop the scheme, lowercase the host and remove a `www.` prefix
/// 4. Normalize the path:
///    - Remove dot segments (. and ..) and repeated slashes
///    - Empty path or trailing slash becomes `index.html`
/// 5. Drop the fragment, keep the query
///
/// Two captures of the same page taken at different timestamps map to the
/// same key, so a crawl never revisits a page just because the archive
/// redirected it to a neighbouring capture.
///
/// # Examples
///
/// ```
/// use lyngsat_wayback::url::normalize_visit_key;
///
/// let key = normalize_visit_key(
///     "http://web.archive.org/web/20150102195325/http://www.lyngsat.com/",
/// )
/// .unwrap();
/// assert_eq!(key, "lyngsat.com/index.html");
/// ```
pub fn normalize_visit_key(url_str: &str) -> Result<String, UrlError> {
    let original = original_url(url_str);
    let with_scheme = if original.contains("://") {
        original
    } else {
        format!("http://{}", original)
    };

    let url = Url::parse(&with_scheme).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    let host = url.host_str().ok_or(UrlError::MissingDomain)?.to_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host).to_string();

    let mut key = match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host,
    };
    key.push_str(&normalize_path(url.path()));

    if let Some(query) = url.query().filter(|q| !q.is_empty()) {
        key.push('?');
        key.push_str(query);
    }

    Ok(key)
}

/// Normalizes a URL path by removing dot segments and resolving directory paths
fn normalize_path(path: &str) -> String {
    let is_directory = path.is_empty() || path.ends_with('/');

    let mut normalized_segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                normalized_segments.pop();
            }
            _ => normalized_segments.push(segment),
        }
    }

    if is_directory {
        normalized_segments.push(INDEX_MARKER);
    }

    format!("/{}", normalized_segments.join("/"))
}
