// src/crawl/domain.rs

//! Domain filter deciding which links may enter the frontier.
//!
//! Hosts are compared exactly and case-insensitively. Scheme and port are
//! ignored, and subdomains are distinct hosts: with a root of
//! `https://example.test/`, `http://example.test:8080/x` is allowed while
//! `https://www.example.test/` and `https://docs.example.test/` are not.

use url::Url;

use crate::models::DomainPolicy;

/// Pure predicate bound to a root host and a policy.
#[derive(Debug, Clone)]
pub struct DomainFilter {
    root_host: String,
    policy: DomainPolicy,
}

impl DomainFilter {
    pub fn new(root: &Url, policy: &DomainPolicy) -> Self {
        Self {
            root_host: root.host_str().unwrap_or_default().to_lowercase(),
            policy: policy.clone(),
        }
    }

    /// Whether `url` is eligible for crawling under the policy.
    pub fn allowed(&self, url: &str) -> bool {
        let Ok(parsed) = Url::parse(url) else {
            return false;
        };
        let Some(host) = parsed.host_str() else {
            return false;
        };
        let host = host.to_lowercase();

        match &self.policy {
            DomainPolicy::SameDomain => host == self.root_host,
            DomainPolicy::AllowAll => true,
            DomainPolicy::AllowList(domains) => domains.contains(&host),
        }
    }
}
