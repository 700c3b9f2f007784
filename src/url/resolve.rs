use crate::url::archive::original_url;
use crate::{UrlError, UrlResult};
use url::Url;

/// Resolves a link href against the page it was found on
///
/// Returns an error if the link cannot be followed:
/// - empty hrefs and fragment-only anchors
/// - javascript:, mailto:, tel: and data: targets
/// - hrefs that do not parse against `base_url`
/// - non-HTTP(S) URLs after resolution
pub fn resolve_href(base_url: &Url, href: &str) -> UrlResult<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return Err(UrlError::Unusable(href.to_string()));
    }

    let lowered = href.to_ascii_lowercase();
    if lowered.starts_with("javascript:")
        || lowered.starts_with("mailto:")
        || lowered.starts_with("tel:")
        || lowered.starts_with("data:")
    {
        return Err(UrlError::Unusable(href.to_string()));
    }

    let absolute = base_url
        .join(href)
        .map_err(|e| UrlError::Parse(format!("{}: {}", href, e)))?;

    if absolute.scheme() != "http" && absolute.scheme() != "https" {
        return Err(UrlError::InvalidScheme(absolute.scheme().to_string()));
    }

    Ok(absolute)
}

/// Checks whether a resolved URL points at a channel detail page
///
/// The check runs on the original (archive-stripped) path, so it holds for
/// both archived captures and direct site URLs.
pub fn is_channel_detail_url(url: &Url, detail_prefix: &str) -> bool {
    let original = original_url(url.as_str());
    let with_scheme = if original.contains("://") {
        original
    } else {
        format!("http://{}", original)
    };

    match Url::parse(&with_scheme) {
        Ok(parsed) => parsed.path().starts_with(detail_prefix),
        Err(_) => with_scheme.contains(detail_prefix),
    }
}
