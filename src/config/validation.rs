use crate::config::types::{
    ArchiveConfig, Config, CrawlerConfig, HttpConfig, OutputConfig, ProxyConfig, SiteProfile,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_http_config(&config.http)?;
    if let Some(proxy) = &config.proxy {
        validate_proxy_config(proxy)?;
    }
    validate_archive_config(&config.archive)?;
    validate_site_profile(&config.site)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.concurrency < 1 || config.concurrency > 100 {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and 100, got {}",
            config.concurrency
        )));
    }

    if config.max_regions == Some(0) {
        return Err(ConfigError::Validation(
            "max_regions must be >= 1 when set".to_string(),
        ));
    }

    if config.max_countries_per_region == Some(0) {
        return Err(ConfigError::Validation(
            "max_countries_per_region must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates fetch gateway configuration
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.max_concurrent_fetches < 1 || config.max_concurrent_fetches > 100 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_fetches must be between 1 and 100, got {}",
            config.max_concurrent_fetches
        )));
    }

    if config.retry_max_delay_ms < config.retry_base_delay_ms {
        return Err(ConfigError::Validation(format!(
            "retry_max_delay_ms ({}) must be >= retry_base_delay_ms ({})",
            config.retry_max_delay_ms, config.retry_base_delay_ms
        )));
    }

    Ok(())
}

/// Validates proxy configuration
fn validate_proxy_config(config: &ProxyConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid proxy url: {}", e)))?;

    if !matches!(url.scheme(), "http" | "https" | "socks5" | "socks5h") {
        return Err(ConfigError::Validation(format!(
            "Proxy url '{}' must use http, https, socks5 or socks5h",
            config.url
        )));
    }

    if config.password.is_some() && config.password_env.is_some() {
        return Err(ConfigError::Validation(
            "Set either proxy password or password-env, not both".to_string(),
        ));
    }

    if config.username.is_none() && (config.password.is_some() || config.password_env.is_some())
    {
        return Err(ConfigError::Validation(
            "Proxy password given without a username".to_string(),
        ));
    }

    Ok(())
}

/// Validates archive configuration
fn validate_archive_config(config: &ArchiveConfig) -> Result<(), ConfigError> {
    let host = Url::parse(&config.host)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid archive host: {}", e)))?;
    if host.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "Archive host '{}' has no domain",
            config.host
        )));
    }

    Url::parse(&config.cdx_endpoint)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid cdx_endpoint: {}", e)))?;

    validate_date(&config.from, "from")?;
    let to = config.to_date();
    validate_date(&to, "to")?;

    // YYYYMMDD strings order the same way as the dates they encode
    if config.from > to {
        return Err(ConfigError::Validation(format!(
            "from ({}) must not be after to ({})",
            config.from, to
        )));
    }

    for root in &config.roots {
        let url = Url::parse(root)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid root URL '{}': {}", root, e)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::Validation(format!(
                "Root URL '{}' must use HTTP or HTTPS",
                root
            )));
        }
    }

    if matches!(&config.index_cache, Some(path) if path.is_empty()) {
        return Err(ConfigError::Validation(
            "index_cache cannot be empty when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates a YYYYMMDD date string
fn validate_date(date: &str, field: &str) -> Result<(), ConfigError> {
    chrono::NaiveDate::parse_from_str(date, "%Y%m%d").map_err(|_| {
        ConfigError::Validation(format!("{} must be a YYYYMMDD date, got '{}'", field, date))
    })?;
    Ok(())
}

/// Validates site profile markers
fn validate_site_profile(profile: &SiteProfile) -> Result<(), ConfigError> {
    let required = [
        ("free_tv_marker", &profile.free_tv_marker),
        ("region_group_marker", &profile.region_group_marker),
        ("name_column", &profile.name_column),
        ("logo_column", &profile.logo_column),
        ("site_domain", &profile.site_domain),
        ("detail_path_prefix", &profile.detail_path_prefix),
    ];

    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "site.{} cannot be empty",
                field
            )));
        }
    }

    if profile.channel_table_markers.is_empty() {
        return Err(ConfigError::Validation(
            "site.channel_table_markers needs at least one marker".to_string(),
        ));
    }

    if profile.detail_table_markers.is_empty() {
        return Err(ConfigError::Validation(
            "site.detail_table_markers needs at least one marker".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    if config.csv_path.is_empty() {
        return Err(ConfigError::Validation(
            "csv_path cannot be empty".to_string(),
        ));
    }

    if config.summary_path.is_empty() {
        return Err(ConfigError::Validation(
            "summary_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}
