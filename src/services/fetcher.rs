// src/services/fetcher.rs

//! Page fetching.
//!
//! Fetch failures are data, not errors: every outcome is a
//! [`FetchResponse`] the orchestration loop turns into a page record.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{ErrorKind, Result};
use crate::models::{CrawlerConfig, FetchResponse};
use crate::services::robots::RobotsCache;
use crate::utils::http::create_async_client;

/// Per-request fetch settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    pub timeout: Duration,
    pub respect_robots: bool,
}

/// Anything that can retrieve a page.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str, options: &FetchOptions) -> FetchResponse;
}

/// Fetcher backed by `reqwest` with robots.txt compliance.
pub struct HttpFetcher {
    client: Client,
    robots: RobotsCache,
}

impl HttpFetcher {
    /// Create a fetcher from crawler settings.
    pub fn new(config: &CrawlerConfig) -> Result<Self> {
        let client = create_async_client(config)?;
        Ok(Self::with_client(client, &config.user_agent))
    }

    /// Create a fetcher around an existing client.
    pub fn with_client(client: Client, user_agent: &str) -> Self {
        Self {
            client,
            robots: RobotsCache::new(user_agent),
        }
    }

    /// robots.txt rules in use, for pre-seeding.
    pub fn robots(&self) -> &RobotsCache {
        &self.robots
    }
}

/// Map a transport error onto a page error kind.
fn classify(error: &reqwest::Error) -> ErrorKind {
    if error.is_timeout() {
        ErrorKind::Timeout
    } else {
        ErrorKind::NetworkFailure
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, options: &FetchOptions) -> FetchResponse {
        if options.respect_robots
            && !self
                .robots
                .allowed(&self.client, url, options.timeout)
                .await
        {
            log::info!("Skipping {} (disallowed by robots.txt)", url);
            return FetchResponse::failed(ErrorKind::RobotsDisallowed);
        }

        let response = match self.client.get(url).timeout(options.timeout).send().await {
            Ok(response) => response,
            Err(e) => {
                log::warn!("Failed to fetch {}: {}", url, e);
                return FetchResponse::failed(classify(&e));
            }
        };

        let status = response.status();
        if !status.is_success() {
            log::warn!("Failed to fetch {}: HTTP {}", url, status);
            return FetchResponse::status(status.as_u16());
        }

        match response.text().await {
            Ok(html) => FetchResponse::ok(status.as_u16(), html),
            Err(e) => {
                log::warn!("Failed to read body of {}: {}", url, e);
                FetchResponse {
                    status_code: Some(status.as_u16()),
                    html: String::new(),
                    error: Some(classify(&e)),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn robots_disallowed_url_is_not_fetched() {
        let fetcher = HttpFetcher::new(&CrawlerConfig::default()).unwrap();
        fetcher
            .robots()
            .insert("https://example.test", "User-agent: *\nDisallow: /\n")
            .await;

        let options = FetchOptions {
            timeout: Duration::from_secs(1),
            respect_robots: true,
        };
        let response = fetcher.fetch("https://example.test/page", &options).await;
        assert_eq!(response, FetchResponse::failed(ErrorKind::RobotsDisallowed));
    }

    #[tokio::test]
    async fn unreachable_host_is_network_failure() {
        let fetcher = HttpFetcher::new(&CrawlerConfig::default()).unwrap();
        let options = FetchOptions {
            timeout: Duration::from_secs(5),
            respect_robots: false,
        };
        // Port 9 on localhost (discard) is closed on test machines.
        let response = fetcher.fetch("http://127.0.0.1:9/", &options).await;
        assert_eq!(response.status_code, None);
        assert!(response.html.is_empty());
        assert!(matches!(
            response.error,
            Some(ErrorKind::NetworkFailure | ErrorKind::Timeout)
        ));
    }
}
