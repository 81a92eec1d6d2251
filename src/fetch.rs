//! Page fetching.
//!
//! Every operation that touches the network takes a [`Fetcher`] argument.
//! There is no implicit default client; callers build an [`HttpFetcher`]
//! (or a fake in tests) and pass it down.

use crate::config::ScrapingConfig;
use crate::error::ScraperError;
use async_trait::async_trait;
use std::time::Duration;

/// Retrieves the raw body of a page.
///
/// Implementations report transport failures as [`ScraperError::HttpError`];
/// the parsers never retry, so any retry policy belongs here.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches `url` and returns the response body.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ScraperError>;
}

/// `reqwest`-backed fetcher with a fixed delay before each request.
pub struct HttpFetcher {
    client: reqwest::Client,
    config: ScrapingConfig,
}

impl HttpFetcher {
    /// Creates a fetcher from scraping settings.
    pub fn new(config: ScrapingConfig) -> Result<Self, ScraperError> {
        let client = create_http_client(&config)?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ScraperError> {
        rate_limit(self.config.delay_between_requests_sec).await;

        tracing::debug!(url, "fetching page");
        let response = self.client.get(url).send().await?.error_for_status()?;
        let body = response.bytes().await?;
        tracing::debug!(url, bytes = body.len(), "page fetched");

        Ok(body.to_vec())
    }
}

/// Common HTTP client configuration.
pub fn create_http_client(config: &ScrapingConfig) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .user_agent(config.user_agent.as_str())
        .cookie_store(true)
        .timeout(Duration::from_secs(config.timeout_sec))
        .build()
}

/// Applies rate limiting delay.
pub async fn rate_limit(delay_sec: f64) {
    if delay_sec > 0.0 {
        tokio::time::sleep(Duration::from_secs_f64(delay_sec)).await;
    }
}

/// Decodes a fetched body as text, replacing invalid UTF-8 sequences.
pub(crate) fn decode_body(body: &[u8]) -> String {
    String::from_utf8_lossy(body).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_client_from_defaults() {
        assert!(create_http_client(&ScrapingConfig::default()).is_ok());
    }

    #[test]
    fn test_decode_body_lossy() {
        assert_eq!(decode_body(b"plain"), "plain");
        assert_eq!(decode_body(&[b'a', 0xff, b'b']), "a\u{fffd}b");
    }

    #[tokio::test]
    async fn test_rate_limit_zero_returns_immediately() {
        let start = std::time::Instant::now();
        rate_limit(0.0).await;
        assert!(start.elapsed() < Duration::from_millis(50));
    }
}
