// src/models/request.rs

//! Crawl request and domain policy.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};
use url::{Host, Url};

use crate::error::{AppError, Result};

/// Upper bounds accepted for a crawl request.
pub const MAX_DEPTH_LIMIT: usize = 10;
pub const MAX_PAGES_LIMIT: usize = 1000;
pub const MAX_TIMEOUT_SECS: u64 = 300;
pub const MAX_WORKERS_LIMIT: usize = 50;

/// Worker count above which target servers may be overwhelmed.
const HIGH_WORKER_COUNT: usize = 20;

static HOST_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-z0-9]([a-z0-9\-]{0,61}[a-z0-9])?(\.[a-z0-9]([a-z0-9\-]{0,61}[a-z0-9])?)*$",
    )
    .expect("host name pattern is valid")
});

/// Rule restricting which discovered links are eligible for crawling.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "domains", rename_all = "kebab-case")]
pub enum DomainPolicy {
    /// Only the root URL's exact host
    #[default]
    SameDomain,
    /// Every http(s) host
    AllowAll,
    /// Exact membership in the listed hosts
    AllowList(BTreeSet<String>),
}

impl DomainPolicy {
    /// Build an allow-list policy, lowercasing and trimming entries.
    pub fn allow_list<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::AllowList(
            domains
                .into_iter()
                .map(|d| d.as_ref().trim().to_lowercase())
                .filter(|d| !d.is_empty())
                .collect(),
        )
    }

    /// Stable textual form used when deriving cache keys.
    pub fn fingerprint(&self) -> String {
        match self {
            DomainPolicy::SameDomain => "same-domain".to_string(),
            DomainPolicy::AllowAll => "allow-all".to_string(),
            DomainPolicy::AllowList(domains) => {
                let joined: Vec<&str> = domains.iter().map(String::as_str).collect();
                format!("allow-list:{}", joined.join(","))
            }
        }
    }
}

/// Policy name without its payload, as written in config files and flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PolicyKind {
    #[default]
    SameDomain,
    AllowAll,
    AllowList,
}

impl PolicyKind {
    /// Attach the allow-list (ignored for other kinds).
    pub fn into_policy(self, allow_list: &[String]) -> DomainPolicy {
        match self {
            PolicyKind::SameDomain => DomainPolicy::SameDomain,
            PolicyKind::AllowAll => DomainPolicy::AllowAll,
            PolicyKind::AllowList => DomainPolicy::allow_list(allow_list),
        }
    }
}

impl FromStr for PolicyKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "same-domain" | "same_domain" => Ok(PolicyKind::SameDomain),
            "allow-all" | "allow_all" => Ok(PolicyKind::AllowAll),
            "allow-list" | "allow_list" => Ok(PolicyKind::AllowList),
            other => Err(AppError::config(format!(
                "unknown domain policy '{other}' (expected same-domain, allow-all or allow-list)"
            ))),
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PolicyKind::SameDomain => "same-domain",
            PolicyKind::AllowAll => "allow-all",
            PolicyKind::AllowList => "allow-list",
        })
    }
}

/// Everything the orchestration loop needs to run one crawl.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlRequest {
    /// URL the crawl starts from (depth 0)
    pub root_url: String,

    /// Maximum number of link hops from the root
    pub max_depth: usize,

    /// Maximum number of page records
    pub max_pages: usize,

    /// Which discovered links may enter the frontier
    pub domain_policy: DomainPolicy,

    /// Per-fetch timeout
    pub timeout_secs: u64,

    /// Skip URLs that robots.txt disallows
    pub respect_robots: bool,

    /// Number of concurrent fetches
    pub max_workers: usize,
}

impl CrawlRequest {
    /// Request with the source defaults: depth 1, 20 pages, same domain,
    /// 10 second timeout, robots respected, a single worker.
    pub fn new(root_url: impl Into<String>) -> Self {
        Self {
            root_url: root_url.into(),
            max_depth: 1,
            max_pages: 20,
            domain_policy: DomainPolicy::SameDomain,
            timeout_secs: 10,
            respect_robots: true,
            max_workers: 1,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn with_domain_policy(mut self, policy: DomainPolicy) -> Self {
        self.domain_policy = policy;
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn with_respect_robots(mut self, respect_robots: bool) -> Self {
        self.respect_robots = respect_robots;
        self
    }

    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers;
        self
    }

    /// Per-fetch timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Parse the root URL, dropping any fragment.
    pub fn root(&self) -> Result<Url> {
        let mut url = Url::parse(self.root_url.trim())?;
        url.set_fragment(None);
        Ok(url)
    }

    /// Check every field and collect all problems at once.
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        match self.root() {
            Ok(url) => {
                if !matches!(url.scheme(), "http" | "https") {
                    errors.push(format!(
                        "root_url scheme '{}' is not http or https",
                        url.scheme()
                    ));
                }
                if url.host_str().is_none_or(str::is_empty) {
                    errors.push("root_url has no host".to_string());
                }
            }
            Err(e) => errors.push(format!("root_url '{}' is invalid: {e}", self.root_url)),
        }

        if self.max_depth > MAX_DEPTH_LIMIT {
            errors.push(format!("max_depth must be <= {MAX_DEPTH_LIMIT}"));
        }
        if self.max_pages == 0 {
            errors.push("max_pages must be >= 1".to_string());
        }
        if self.max_pages > MAX_PAGES_LIMIT {
            errors.push(format!("max_pages must be <= {MAX_PAGES_LIMIT}"));
        }
        if self.timeout_secs == 0 {
            errors.push("timeout_secs must be >= 1".to_string());
        }
        if self.timeout_secs > MAX_TIMEOUT_SECS {
            errors.push(format!("timeout_secs must be <= {MAX_TIMEOUT_SECS}"));
        }
        if self.max_workers == 0 {
            errors.push("max_workers must be >= 1".to_string());
        }
        if self.max_workers > MAX_WORKERS_LIMIT {
            errors.push(format!("max_workers must be <= {MAX_WORKERS_LIMIT}"));
        }

        if let DomainPolicy::AllowList(domains) = &self.domain_policy {
            if domains.is_empty() {
                errors.push("allow-list policy needs at least one domain".to_string());
            }
            for domain in domains {
                if !HOST_NAME.is_match(domain) {
                    errors.push(format!("invalid domain in allow-list: {domain}"));
                }
            }
        }

        if !errors.is_empty() {
            return Err(AppError::InvalidRequest(errors));
        }
        for warning in self.warnings() {
            log::warn!("{}", warning);
        }
        Ok(())
    }

    /// Non-fatal concerns about an otherwise valid request.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if let Ok(url) = self.root() {
            if url.host().is_some_and(|host| is_local_host(&host)) {
                warnings.push(format!(
                    "root_url {} points to localhost or a private address",
                    url
                ));
            }
        }
        if self.max_depth > 3 && self.max_pages > 100 {
            warnings.push(format!(
                "depth {} with up to {} pages may result in a long crawl",
                self.max_depth, self.max_pages
            ));
        }
        if self.max_workers > HIGH_WORKER_COUNT {
            warnings.push(format!(
                "{} workers may overwhelm the target server",
                self.max_workers
            ));
        }

        warnings
    }
}

fn is_local_host(host: &Host<&str>) -> bool {
    match host {
        Host::Domain(domain) => domain.eq_ignore_ascii_case("localhost"),
        Host::Ipv4(ip) => ip.is_loopback() || ip.is_private() || ip.is_link_local(),
        Host::Ipv6(ip) => ip.is_loopback() || ip.is_unique_local() || ip.is_unicast_link_local(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_request_is_valid() {
        assert!(CrawlRequest::new("https://example.test/").validate().is_ok());
    }

    #[test]
    fn private_and_local_roots_are_valid_with_a_warning() {
        for root in [
            "http://192.168.1.10/",
            "http://10.0.0.5:8080/admin",
            "http://127.0.0.1/",
            "http://localhost:3000/",
            "http://[::1]/",
        ] {
            let request = CrawlRequest::new(root);
            assert!(request.validate().is_ok(), "{root}");
            let warnings = request.warnings();
            assert_eq!(warnings.len(), 1, "{root}");
            assert!(warnings[0].contains("private"), "{root}");
        }
    }

    #[test]
    fn public_root_has_no_warnings() {
        let request = CrawlRequest::new("https://example.test/");
        assert!(request.warnings().is_empty());
        assert!(CrawlRequest::new("http://172.32.0.1/").warnings().is_empty());
    }

    #[test]
    fn heavy_crawls_are_warned_about() {
        let request = CrawlRequest::new("https://example.test/")
            .with_max_depth(4)
            .with_max_pages(101)
            .with_max_workers(21);
        assert_eq!(request.warnings().len(), 2);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn rejects_zero_pages() {
        let request = CrawlRequest::new("https://example.test/").with_max_pages(0);
        let err = request.validate().unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(ref e) if e.len() == 1));
    }

    #[test]
    fn rejects_non_http_scheme() {
        let request = CrawlRequest::new("ftp://example.test/");
        assert!(request.validate().is_err());
        assert!(CrawlRequest::new("not a url").validate().is_err());
    }

    #[test]
    fn collects_every_problem() {
        let request = CrawlRequest::new("https://example.test/")
            .with_max_depth(11)
            .with_max_pages(1001)
            .with_timeout_secs(0)
            .with_max_workers(51);
        match request.validate() {
            Err(AppError::InvalidRequest(errors)) => assert_eq!(errors.len(), 4),
            other => panic!("expected InvalidRequest, got {other:?}"),
        }
    }

    #[test]
    fn allow_list_must_be_non_empty_and_well_formed() {
        let empty = CrawlRequest::new("https://example.test/")
            .with_domain_policy(DomainPolicy::allow_list(Vec::<String>::new()));
        assert!(empty.validate().is_err());

        let bad = CrawlRequest::new("https://example.test/")
            .with_domain_policy(DomainPolicy::allow_list(["exa mple.test"]));
        assert!(bad.validate().is_err());

        let good = CrawlRequest::new("https://example.test/")
            .with_domain_policy(DomainPolicy::allow_list([" Docs.Example.test "]));
        assert!(good.validate().is_ok());
    }

    #[test]
    fn fingerprint_is_order_independent() {
        let a = DomainPolicy::allow_list(["b.test", "a.test"]);
        let b = DomainPolicy::allow_list(["a.test", "b.test"]);
        assert_eq!(a.fingerprint(), "allow-list:a.test,b.test");
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(
            DomainPolicy::SameDomain.fingerprint(),
            DomainPolicy::AllowAll.fingerprint()
        );
    }

    #[test]
    fn policy_kind_parses_names() {
        assert_eq!("allow-all".parse::<PolicyKind>().unwrap(), PolicyKind::AllowAll);
        assert_eq!("Same_Domain".parse::<PolicyKind>().unwrap(), PolicyKind::SameDomain);
        assert!("everything".parse::<PolicyKind>().is_err());

        let policy = PolicyKind::AllowList.into_policy(&["x.test".to_string()]);
        assert_eq!(policy, DomainPolicy::allow_list(["x.test"]));
    }

    #[test]
    fn root_drops_fragment() {
        let request = CrawlRequest::new("https://example.test/page#top");
        assert_eq!(request.root().unwrap().as_str(), "https://example.test/page");
    }
}
