// src/models/mod.rs

//! Domain models for the crawler.
//!
//! This module contains all data structures used throughout the crate,
//! organized by their primary purpose.

mod config;
mod page;
mod request;
mod result;

// Re-export all public types
pub use config::{CacheConfig, Config, CrawlerConfig, DomainConfig, LoggingConfig};
pub use page::{FetchResponse, PageRecord};
pub use request::{
    CrawlRequest, DomainPolicy, MAX_DEPTH_LIMIT, MAX_PAGES_LIMIT, MAX_TIMEOUT_SECS,
    MAX_WORKERS_LIMIT, PolicyKind,
};
pub use result::{CrawlResult, CrawlState, CrawlStats};

/// A URL waiting in the frontier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FrontierEntry {
    pub url: String,
    pub depth: usize,
}
