//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler:
//! - Building the HTTP client with user agent and timeouts
//! - GET requests returning the page body
//! - Classifying transport and status failures
//!
//! There is no retry; a failed fetch is reported once to the caller.

use crate::config::{CrawlerConfig, UserAgentConfig};
use crate::FetchError;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Source of page markup (to allow mocking)
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches `url` and returns its body
    async fn fetch(&self, url: &Url) -> Result<String, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The user agent configuration
/// * `crawler` - Crawler settings providing the timeouts
///
/// # Example
///
/// ```no_run
/// use rep_roster::config::Config;
/// use rep_roster::crawler::build_http_client;
///
/// let config = Config::default();
/// let client = build_http_client(&config.user_agent, &config.crawler).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    crawler: &CrawlerConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(Duration::from_secs(crawler.request_timeout_secs))
        .connect_timeout(Duration::from_secs(crawler.connect_timeout_secs))
        .pool_max_idle_per_host(crawler.max_concurrent_fetches as usize)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetcher backed by a shared `reqwest::Client`
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Wraps an existing client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a client from configuration and wraps it
    pub fn from_config(
        user_agent: &UserAgentConfig,
        crawler: &CrawlerConfig,
    ) -> Result<Self, reqwest::Error> {
        build_http_client(user_agent, crawler).map(Self::new)
    }
}

#[async_trait::async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        let http_error = |source| FetchError::Http {
            url: url.to_string(),
            source,
        };

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(http_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(http_error)
    }
}
