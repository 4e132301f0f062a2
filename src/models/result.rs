// src/models/result.rs

//! Aggregate crawl result and loop state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{CrawlRequest, PageRecord};

/// State of the orchestration loop. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrawlState {
    Running,
    /// Stopped by the page budget, the depth limit or cancellation
    Truncated,
    /// Frontier exhausted
    Done,
}

impl CrawlState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, CrawlState::Running)
    }
}

/// Counters collected while crawling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlStats {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub cache_hits: usize,
    pub live_fetches: usize,
    pub failed_pages: usize,
}

impl CrawlStats {
    pub fn started(now: DateTime<Utc>) -> Self {
        Self {
            started_at: now,
            finished_at: now,
            cache_hits: 0,
            live_fetches: 0,
            failed_pages: 0,
        }
    }

    /// Wall-clock duration in milliseconds.
    pub fn elapsed_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}

/// Everything a finished crawl produced, owned by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlResult {
    pub request: CrawlRequest,

    /// Page records in fetch-completion order
    pub pages: Vec<PageRecord>,

    pub visited_count: usize,

    /// True when a budget limit or cancellation cut the crawl short
    pub truncated: bool,

    pub state: CrawlState,

    /// True when the caller cancelled the crawl
    pub cancelled: bool,

    pub stats: CrawlStats,
}

impl CrawlResult {
    /// Pages fetched without error.
    pub fn successful_pages(&self) -> impl Iterator<Item = &PageRecord> {
        self.pages.iter().filter(|p| p.is_success())
    }

    pub fn failed_pages(&self) -> impl Iterator<Item = &PageRecord> {
        self.pages.iter().filter(|p| !p.is_success())
    }

    /// Look up a record by URL.
    pub fn page(&self, url: &str) -> Option<&PageRecord> {
        self.pages.iter().find(|p| p.url == url)
    }
}
