//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{CrawlRequest, PolicyKind};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP and crawling behavior settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Which links the crawl may follow
    #[serde(default)]
    pub domain: DomainConfig,

    /// Page cache settings
    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        if self.crawler.max_pages == 0 {
            return Err(AppError::validation("crawler.max_pages must be > 0"));
        }
        if self.crawler.max_workers == 0 {
            return Err(AppError::validation("crawler.max_workers must be > 0"));
        }
        if self.domain.policy == PolicyKind::AllowList && self.domain.allow_list.is_empty() {
            return Err(AppError::validation(
                "domain.allow_list is empty but domain.policy is allow-list",
            ));
        }
        if self.cache.enabled && self.cache.ttl_secs == 0 {
            return Err(AppError::validation("cache.ttl_secs must be > 0"));
        }
        Ok(())
    }

    /// Build a crawl request for `root_url` from the configured defaults.
    pub fn crawl_request(&self, root_url: impl Into<String>) -> CrawlRequest {
        CrawlRequest::new(root_url)
            .with_max_depth(self.crawler.max_depth)
            .with_max_pages(self.crawler.max_pages)
            .with_domain_policy(self.domain.policy.into_policy(&self.domain.allow_list))
            .with_timeout_secs(self.crawler.timeout_secs)
            .with_respect_robots(self.crawler.respect_robots)
            .with_max_workers(self.crawler.max_workers)
    }
}

/// HTTP client and crawling behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests and robots.txt matching
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Per-fetch timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    #[serde(default = "defaults::max_depth")]
    pub max_depth: usize,

    #[serde(default = "defaults::max_pages")]
    pub max_pages: usize,

    /// Concurrent fetches
    #[serde(default = "defaults::max_workers")]
    pub max_workers: usize,

    /// Delay after each live fetch in milliseconds
    #[serde(default = "defaults::request_delay")]
    pub request_delay_ms: u64,

    #[serde(default = "defaults::enabled")]
    pub respect_robots: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            max_depth: defaults::max_depth(),
            max_pages: defaults::max_pages(),
            max_workers: defaults::max_workers(),
            request_delay_ms: defaults::request_delay(),
            respect_robots: defaults::enabled(),
        }
    }
}

/// Domain restriction settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DomainConfig {
    #[serde(default)]
    pub policy: PolicyKind,

    /// Hosts for the allow-list policy
    #[serde(default)]
    pub allow_list: Vec<String>,
}

/// Disk cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "defaults::enabled")]
    pub enabled: bool,

    /// Cache directory, relative to the working directory
    #[serde(default = "defaults::cache_dir")]
    pub dir: PathBuf,

    /// Entry lifetime in seconds
    #[serde(default = "defaults::cache_ttl")]
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: defaults::enabled(),
            dir: defaults::cache_dir(),
            ttl_secs: defaults::cache_ttl(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; sitescope/0.1)".into()
    }
    pub fn timeout() -> u64 {
        10
    }
    pub fn max_depth() -> usize {
        1
    }
    pub fn max_pages() -> usize {
        20
    }
    pub fn max_workers() -> usize {
        5
    }
    pub fn request_delay() -> u64 {
        100
    }
    pub fn enabled() -> bool {
        true
    }
    pub fn cache_dir() -> PathBuf {
        PathBuf::from("cache")
    }
    pub fn cache_ttl() -> u64 {
        24 * 60 * 60
    }
    pub fn log_level() -> String {
        "info".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DomainPolicy;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_user_agent() {
        let mut config = Config::default();
        config.crawler.user_agent = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_workers() {
        let mut config = Config::default();
        config.crawler.max_workers = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_allow_list_without_domains() {
        let mut config = Config::default();
        config.domain.policy = PolicyKind::AllowList;
        assert!(config.validate().is_err());

        config.domain.allow_list = vec!["docs.example.test".to_string()];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [crawler]
            max_pages = 5

            [domain]
            policy = "allow-list"
            allow_list = ["a.test", "B.test"]
            "#,
        )
        .unwrap();

        assert_eq!(config.crawler.max_pages, 5);
        assert_eq!(config.crawler.timeout_secs, 10);
        assert_eq!(config.cache.ttl_secs, 86_400);
        assert!(config.crawler.respect_robots);

        let request = config.crawl_request("https://a.test/");
        assert_eq!(request.max_pages, 5);
        assert_eq!(
            request.domain_policy,
            DomainPolicy::allow_list(["a.test", "b.test"])
        );
    }

    #[test]
    fn load_or_default_falls_back_on_missing_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = Config::load_or_default(tmp.path().join("missing.toml"));
        assert_eq!(config.crawler.max_pages, 20);
    }
}
