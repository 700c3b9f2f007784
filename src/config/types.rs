use crate::ConfigError;
use serde::Deserialize;

/// Main configuration structure for LyngSat Wayback
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub proxy: Option<ProxyConfig>,
    pub archive: ArchiveConfig,
    #[serde(default)]
    pub site: SiteProfile,
    pub output: OutputConfig,
}

/// Crawl pipeline configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Ceiling for concurrently scheduled region and country branches
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Only crawl the first N regions of a snapshot
    #[serde(default)]
    pub max_regions: Option<usize>,

    /// Only crawl the first N countries of each region
    #[serde(default)]
    pub max_countries_per_region: Option<usize>,

    /// Extra attempts for a detail page whose table is missing or empty
    #[serde(default = "default_detail_retries")]
    pub detail_retries: u32,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            max_regions: None,
            max_countries_per_region: None,
            detail_retries: default_detail_retries(),
        }
    }
}

/// Fetch Gateway configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct HttpConfig {
    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retries after a transport failure or HTTP 5xx
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay before the first retry (milliseconds), doubled on each attempt
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,

    /// Upper bound for the retry delay (milliseconds)
    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,

    /// Process-wide ceiling on outstanding fetches
    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
            max_concurrent_fetches: default_max_concurrent_fetches(),
        }
    }
}

/// Upstream proxy every request is routed through
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProxyConfig {
    /// Proxy URL, e.g. `http://proxy.example.net:9005`
    pub url: String,

    /// Basic auth user name
    #[serde(default)]
    pub username: Option<String>,

    /// Basic auth password
    #[serde(default)]
    pub password: Option<String>,

    /// Name of an environment variable holding the password
    #[serde(default)]
    pub password_env: Option<String>,
}

impl ProxyConfig {
    /// Returns the proxy password, reading `password-env` when no inline password is set
    pub fn resolve_password(&self) -> Result<Option<String>, ConfigError> {
        if let Some(password) = &self.password {
            return Ok(Some(password.clone()));
        }

        match &self.password_env {
            Some(var) => std::env::var(var)
                .map(Some)
                .map_err(|_| ConfigError::MissingEnv(var.clone())),
            None => Ok(None),
        }
    }
}

/// Archive index and snapshot selection
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ArchiveConfig {
    /// Site whose captures are crawled, e.g. `http://www.lyngsat.com`
    pub host: String,

    /// First capture date (YYYYMMDD)
    #[serde(default = "default_from")]
    pub from: String,

    /// Last capture date (YYYYMMDD), today when absent
    #[serde(default)]
    pub to: Option<String>,

    /// Archive index query endpoint
    #[serde(default = "default_cdx_endpoint")]
    pub cdx_endpoint: String,

    /// Explicit snapshot roots; the archive index is queried when empty
    #[serde(default)]
    pub roots: Vec<String>,

    /// JSON file caching the archive index result
    #[serde(default)]
    pub index_cache: Option<String>,
}

impl ArchiveConfig {
    /// Returns the last capture date, defaulting to today
    pub fn to_date(&self) -> String {
        self.to
            .clone()
            .unwrap_or_else(|| chrono::Utc::now().format("%Y%m%d").to_string())
    }
}

/// Text markers and column names of the target site's page template
///
/// Every heuristic that recognizes an anchor, a table or a row reads its
/// markers from here, so template drift is handled by configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SiteProfile {
    /// Visible text of the root page's link to the free TV index
    pub free_tv_marker: String,

    /// Substrings the free TV index link target must all contain
    pub index_path_fragments: Vec<String>,

    /// Marker identifying a bold region group header
    pub region_group_marker: String,

    /// Text a channel list table must contain
    pub channel_table_markers: Vec<String>,

    /// Text a channel list table must not contain
    pub channel_table_exclusions: Vec<String>,

    /// Text a channel detail table must contain
    pub detail_table_markers: Vec<String>,

    /// Text a channel detail table must not contain
    pub detail_table_exclusions: Vec<String>,

    /// Text a country list table must not contain
    pub country_table_exclusions: Vec<String>,

    /// Visible text of interstitial rows that carry no data
    pub noise_row_marker: String,

    /// Column holding the channel name and its detail page link
    pub name_column: String,

    /// Column holding the channel logo
    pub logo_column: String,

    /// The site's own domain, used to drop self-referential footer rows
    pub site_domain: String,

    /// Path prefix of channel detail pages
    pub detail_path_prefix: String,
}

impl Default for SiteProfile {
    fn default() -> Self {
        Self {
            free_tv_marker: "Free TV".to_string(),
            index_path_fragments: vec!["free".to_string(), "index".to_string()],
            region_group_marker: "Free".to_string(),
            channel_table_markers: vec!["Channel Name".to_string(), "Logo".to_string()],
            channel_table_exclusions: vec!["News at".to_string(), "Advertising".to_string()],
            detail_table_markers: vec!["Position".to_string(), "Satellite".to_string()],
            detail_table_exclusions: vec![
                "Colour legend".to_string(),
                "News at".to_string(),
                "Advertising".to_string(),
            ],
            country_table_exclusions: vec!["Advertisements".to_string(), "News at".to_string()],
            noise_row_marker: "LyngSat Stream".to_string(),
            name_column: "Channel Name".to_string(),
            logo_column: "Logo".to_string(),
            site_domain: "lyngsat.com".to_string(),
            detail_path_prefix: "/tvchannels/".to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Path to the SQLite database file
    pub database_path: String,

    /// Path of the flattened CSV report
    pub csv_path: String,

    /// Path to the markdown health summary
    pub summary_path: String,

    /// Directory receiving one JSON document per snapshot
    #[serde(default)]
    pub json_dir: Option<String>,
}

fn default_concurrency() -> usize {
    30
}

fn default_detail_retries() -> u32 {
    2
}

fn default_user_agent() -> String {
    format!("lyngsat-wayback/{}", env!("CARGO_PKG_VERSION"))
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    1000
}

fn default_retry_max_delay_ms() -> u64 {
    8000
}

fn default_max_concurrent_fetches() -> usize {
    10
}

fn default_from() -> String {
    "20000101".to_string()
}

fn default_cdx_endpoint() -> String {
    "http://web.archive.org/cdx/search/cdx".to_string()
}
