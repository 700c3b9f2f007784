//! Recognizers for the site template's anchors, tables and rows
//!
//! Each predicate is a pure function of extracted text, so a template change
//! only needs the marker in `SiteProfile` or the one predicate updated.

use crate::config::SiteProfile;

/// Observable traits of a candidate country list table
#[derive(Debug, Clone, Default)]
pub struct TableFeatures {
    /// Number of `td` cells, nested ones included
    pub cell_count: usize,
    /// Full visible text
    pub text: String,
    /// An anchor target mentions advertising
    pub has_advert_link: bool,
    /// Contains an `<i>` element
    pub has_italic: bool,
    /// Contains a `<script>` element
    pub has_script: bool,
}

/// Minimum number of cells a country list table has
const MIN_COUNTRY_TABLE_CELLS: usize = 5;

/// Root page anchor leading to the free TV index
///
/// The visible text must contain the free TV marker and the target must
/// contain every index path fragment.
pub fn is_free_tv_link(text: &str, href: &str, profile: &SiteProfile) -> bool {
    text.contains(&profile.free_tv_marker)
        && profile
            .index_path_fragments
            .iter()
            .all(|fragment| href.contains(fragment.as_str()))
}

/// Bold element that heads a group of region links
///
/// `own_text` is the element's text without its child elements;
/// `first_anchor_text` is the text of its first anchor, if any.
pub fn is_region_group(own_text: &str, first_anchor_text: Option<&str>, marker: &str) -> bool {
    own_text.contains(marker) || first_anchor_text.is_some_and(|text| text.contains(marker))
}

/// Table listing the countries of a region
pub fn is_country_table(features: &TableFeatures, profile: &SiteProfile) -> bool {
    features.cell_count >= MIN_COUNTRY_TABLE_CELLS
        && !contains_any(&features.text, &profile.country_table_exclusions)
        && !features.has_advert_link
        && !features.has_italic
        && !features.has_script
}

/// Table listing the channels of a country
pub fn is_channel_table(text: &str, profile: &SiteProfile) -> bool {
    contains_all(text, &profile.channel_table_markers)
        && !contains_any(text, &profile.channel_table_exclusions)
}

/// Table on a channel detail page listing its transmissions
pub fn is_detail_table(text: &str, profile: &SiteProfile) -> bool {
    contains_all(text, &profile.detail_table_markers)
        && !contains_any(text, &profile.detail_table_exclusions)
}

/// Interstitial row carrying no channel data
pub fn is_noise_row(text: &str, profile: &SiteProfile) -> bool {
    text.trim() == profile.noise_row_marker
}

/// Detail table row used for decoration or legends
pub fn is_decorative_row(non_empty_cells: usize) -> bool {
    non_empty_cells <= 2
}

/// Footer row pointing back at the site itself
pub fn is_self_referential_row(text: &str, site_domain: &str) -> bool {
    text.to_lowercase().contains(&site_domain.to_lowercase())
}

fn contains_all(text: &str, markers: &[String]) -> bool {
    markers.iter().all(|marker| text.contains(marker.as_str()))
}

fn contains_any(text: &str, markers: &[String]) -> bool {
    markers.iter().any(|marker| text.contains(marker.as_str()))
}
