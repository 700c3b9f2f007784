//! Navigation link discovery
//!
//! The crawl descends root → free TV index → region page → country page. Each
//! step finds its next links with a heuristic over the fixed site template.
//! A page without a match yields an empty result, never an error.

use crate::config::SiteProfile;
use crate::extract::dom::{element_text, own_text, selector};
use crate::extract::predicates::{
    is_country_table, is_free_tv_link, is_region_group, TableFeatures,
};
use crate::url::resolve_href;
use scraper::{ElementRef, Html};
use url::Url;

/// A labelled link to the next level of the hierarchy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub label: String,
    pub url: Url,
}

/// Finds the free TV index link on a snapshot's root page
///
/// # Example
///
/// ```
/// use lyngsat_wayback::config::SiteProfile;
/// use lyngsat_wayback::extract::find_free_tv_index;
/// use scraper::Html;
/// use url::Url;
///
/// let html = r#"<a href="/free/index.html">Free TV Guide</a>"#;
/// let document = Html::parse_document(html);
/// let base = Url::parse("http://www.lyngsat.com/").unwrap();
/// let index = find_free_tv_index(&document, &base, &SiteProfile::default()).unwrap();
/// assert_eq!(index.as_str(), "http://www.lyngsat.com/free/index.html");
/// ```
pub fn find_free_tv_index(document: &Html, base_url: &Url, profile: &SiteProfile) -> Option<Url> {
    let anchor_selector = selector("a[href]")?;

    document.select(&anchor_selector).find_map(|anchor| {
        let href = anchor.value().attr("href")?;
        let text = element_text(anchor);
        if !is_free_tv_link(&text, href, profile) {
            return None;
        }

        match resolve_href(base_url, href) {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::debug!("Skipping free TV candidate {}: {}", href, e);
                None
            }
        }
    })
}

/// Finds the region links on the free TV index page
///
/// Bold elements head region groups when their own text or their first
/// anchor's text carries the region group marker. Every anchor of a group is a
/// region link, except a first anchor that itself carries the marker: that one
/// is the group's title.
pub fn find_region_links(document: &Html, base_url: &Url, profile: &SiteProfile) -> Vec<NavLink> {
    let (Some(bold_selector), Some(anchor_selector)) = (selector("b"), selector("a")) else {
        return Vec::new();
    };
    let marker = profile.region_group_marker.as_str();

    let mut links = Vec::new();
    for bold in document.select(&bold_selector) {
        let anchors: Vec<ElementRef<'_>> = bold.select(&anchor_selector).collect();
        let Some(first) = anchors.first() else {
            continue;
        };

        let first_text = element_text(*first);
        if !is_region_group(&own_text(bold), Some(&first_text), marker) {
            continue;
        }

        tracing::debug!("Found region group: {}", element_text(bold));
        let skip_first = first_text.contains(marker);

        for (index, anchor) in anchors.iter().enumerate() {
            if index == 0 && skip_first {
                continue;
            }
            if let Some(link) = nav_link(*anchor, base_url) {
                links.push(link);
            }
        }
    }

    links
}

/// Finds the country links on a region page
///
/// Tables are scanned from the end of the document; the first one that looks
/// like a country list (enough cells, no advertising, no italic notes, no
/// scripts) provides every labelled anchor it contains.
pub fn find_country_links(document: &Html, base_url: &Url, profile: &SiteProfile) -> Vec<NavLink> {
    let Some(table_selector) = selector("table") else {
        return Vec::new();
    };

    let tables: Vec<ElementRef<'_>> = document.select(&table_selector).collect();
    let Some(table) = tables
        .into_iter()
        .rev()
        .find(|table| is_country_table(&table_features(*table), profile))
    else {
        tracing::debug!("No country table found on {}", base_url);
        return Vec::new();
    };

    let Some(anchor_selector) = selector("a[href]") else {
        return Vec::new();
    };

    table
        .select(&anchor_selector)
        .filter_map(|anchor| nav_link(anchor, base_url))
        .collect()
}

/// Collects the traits `is_country_table` decides on
fn table_features(table: ElementRef<'_>) -> TableFeatures {
    let count = |css: &str| {
        selector(css)
            .map(|s| table.select(&s).count())
            .unwrap_or(0)
    };

    TableFeatures {
        cell_count: count("td"),
        text: table.text().collect(),
        has_advert_link: count("a[href*=\"advert\"]") > 0,
        has_italic: count("i") > 0,
        has_script: count("script") > 0,
    }
}

/// Turns an anchor into a labelled link, skipping unlabelled or unusable ones
fn nav_link(anchor: ElementRef<'_>, base_url: &Url) -> Option<NavLink> {
    let label = element_text(anchor);
    let href = anchor.value().attr("href")?;
    if label.is_empty() {
        return None;
    }

    match resolve_href(base_url, href) {
        Ok(url) => Some(NavLink { label, url }),
        Err(e) => {
            tracing::debug!("Skipping link '{}' ({}): {}", label, href, e);
            None
        }
    }
}
