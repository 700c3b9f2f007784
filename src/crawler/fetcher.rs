//! Fetch gateway
//!
//! This module owns all HTTP traffic of a crawl:
//! - Building the HTTP client (user agent, timeout, upstream proxy)
//! - A process-wide limiter on outstanding fetches
//! - Retry with capped exponential backoff for transient failures
//! - Error classification into transport and HTTP status failures

use crate::config::{HttpConfig, ProxyConfig};
use crate::WaybackError;
use async_trait::async_trait;
use reqwest::{Client, Proxy};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Semaphore;
use url::Url;

/// A fetched HTML page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects; relative links resolve against it
    pub url: Url,
    pub body: String,
}

/// Why a fetch failed
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// Network-level failure: connection, timeout, truncated body
    #[error("transport error fetching {url}: {message}")]
    Transport { url: String, message: String },

    /// The server answered with a non-success status
    #[error("HTTP {status} fetching {url}")]
    Http { url: String, status: u16 },
}

impl FetchError {
    /// Transport failures and server errors may go away on their own;
    /// client errors will not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { .. } => true,
            Self::Http { status, .. } => *status >= 500,
        }
    }
}

/// Anything that can hand the crawler an HTML page for a URL
///
/// `HttpGateway` is the production source; tests plug in fixtures.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError>;
}

/// Retry schedule for transient fetch failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &HttpConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: Duration::from_millis(config.retry_base_delay_ms),
            max_delay: Duration::from_millis(config.retry_max_delay_ms),
        }
    }

    /// Delay before retry number `attempt` (1-based): doubles each time, capped
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// Builds an HTTP client with proper configuration
///
/// When a proxy is configured every request is routed through it, with basic
/// credentials if a username is set.
///
/// # Example
///
/// ```
/// use lyngsat_wayback::config::HttpConfig;
/// use lyngsat_wayback::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default(), None).unwrap();
/// ```
pub fn build_http_client(
    config: &HttpConfig,
    proxy: Option<&ProxyConfig>,
) -> Result<Client, WaybackError> {
    let mut builder = Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.timeout_secs))
        .gzip(true)
        .brotli(true);

    if let Some(proxy_config) = proxy {
        let mut proxy = Proxy::all(proxy_config.url.as_str())?;
        if let Some(username) = &proxy_config.username {
            let password = proxy_config.resolve_password()?.unwrap_or_default();
            proxy = proxy.basic_auth(username, &password);
        }
        tracing::debug!("Routing requests through proxy {}", proxy_config.url);
        builder = builder.proxy(proxy);
    }

    Ok(builder.build()?)
}

/// Rate-limited, retrying HTTP page source
pub struct HttpGateway {
    client: Client,
    limiter: Arc<Semaphore>,
    retry: RetryPolicy,
}

impl HttpGateway {
    /// Creates a gateway from the `[http]` and `[proxy]` configuration
    pub fn new(config: &HttpConfig, proxy: Option<&ProxyConfig>) -> Result<Self, WaybackError> {
        Ok(Self::with_client(
            build_http_client(config, proxy)?,
            config.max_concurrent_fetches,
            RetryPolicy::from_config(config),
        ))
    }

    pub fn with_client(client: Client, max_concurrent: usize, retry: RetryPolicy) -> Self {
        Self {
            client,
            limiter: Arc::new(Semaphore::new(max_concurrent)),
            retry,
        }
    }

    /// The underlying client, for non-HTML requests such as the archive index
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// One GET without retries
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | HTTP 2xx | Success |
    /// | HTTP 4xx | Immediate failure |
    /// | HTTP 5xx | Retried by `fetch` |
    /// | Timeout / connection / body error | Retried by `fetch` |
    async fn fetch_once(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        let _permit = self
            .limiter
            .acquire()
            .await
            .map_err(|e| transport(url, e.to_string()))?;

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| transport(url, classify(&e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().clone();
        let body = response
            .text()
            .await
            .map_err(|e| transport(url, classify(&e)))?;

        Ok(FetchedPage {
            url: final_url,
            body,
        })
    }
}

#[async_trait]
impl PageSource for HttpGateway {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        let mut attempt = 0;
        loop {
            match self.fetch_once(url).await {
                Ok(page) => return Ok(page),
                Err(e) if e.is_retryable() && attempt < self.retry.max_retries => {
                    attempt += 1;
                    let delay = self.retry.delay_for(attempt);
                    tracing::debug!(
                        "Retry {}/{} for {} in {:?}: {}",
                        attempt,
                        self.retry.max_retries,
                        url,
                        delay,
                        e
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

fn transport(url: &Url, message: String) -> FetchError {
    FetchError::Transport {
        url: url.to_string(),
        message,
    }
}

fn classify(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "request timeout".to_string()
    } else if error.is_connect() {
        format!("connection failed: {}", error)
    } else {
        error.to_string()
    }
}
