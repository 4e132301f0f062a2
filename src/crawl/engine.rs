// src/crawl/engine.rs

//! Crawl orchestration loop.
//!
//! A single aggregating loop owns the frontier, the visited set and the page
//! list. Visits (cache lookup, fetch, link extraction) run as futures inside
//! that loop, at most `max_workers` at a time, so checking-and-marking a URL
//! and appending its record never race. A visit is only launched while
//! `pages + in_flight < max_pages`, which keeps the page budget exact.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::stream::{FuturesUnordered, StreamExt};
use tokio_util::sync::CancellationToken;

use crate::crawl::domain::DomainFilter;
use crate::crawl::frontier::{Frontier, PushOutcome};
use crate::crawl::links::extract_links;
use crate::error::{ErrorKind, Result};
use crate::models::{
    CrawlRequest, CrawlResult, CrawlState, CrawlStats, FetchResponse, FrontierEntry, PageRecord,
};
use crate::services::{FetchOptions, PageFetcher};
use crate::storage::{CacheLookup, PageCache, cache_key};

/// Result of visiting one frontier entry.
struct Visit {
    record: PageRecord,
    from_cache: bool,
}

/// Drives crawls with a fetcher and an optional page cache.
pub struct Crawler {
    fetcher: Arc<dyn PageFetcher>,
    cache: Option<PageCache>,
    request_delay: Duration,
}

impl Crawler {
    /// Create a crawler without cache or politeness delay.
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            fetcher,
            cache: None,
            request_delay: Duration::ZERO,
        }
    }

    /// Serve fresh pages from `cache` and store live fetches in it.
    pub fn with_cache(mut self, cache: PageCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Pause after every live fetch.
    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    /// Run a crawl to completion.
    pub async fn crawl(&self, request: CrawlRequest) -> Result<CrawlResult> {
        self.crawl_with_cancellation(request, CancellationToken::new())
            .await
    }

    /// Run a crawl that stops at the next frontier pop once `cancel` fires.
    ///
    /// The request is validated before anything is fetched. Per-page failures
    /// are recorded in the result and never end the crawl.
    pub async fn crawl_with_cancellation(
        &self,
        request: CrawlRequest,
        cancel: CancellationToken,
    ) -> Result<CrawlResult> {
        request.validate()?;
        let root = request.root()?;

        let filter = DomainFilter::new(&root, &request.domain_policy);
        let options = FetchOptions {
            timeout: request.timeout(),
            respect_robots: request.respect_robots,
        };
        let workers = request.max_workers.max(1);

        let mut frontier = Frontier::new(request.max_depth);
        frontier.push(root.as_str(), 0);

        let mut state = CrawlState::Running;
        let mut stats = CrawlStats::started(Utc::now());
        let mut pages: Vec<PageRecord> = Vec::new();
        let mut depth_limited = false;
        let mut cancelled = false;
        let mut in_flight = FuturesUnordered::new();

        log::info!(
            "Crawling {} (depth {}, max {} pages, {} worker(s))",
            root,
            request.max_depth,
            request.max_pages,
            workers
        );

        while !state.is_terminal() {
            // Fill free worker slots without exceeding the page budget.
            while !cancelled
                && in_flight.len() < workers
                && pages.len() + in_flight.len() < request.max_pages
            {
                if cancel.is_cancelled() {
                    log::info!("Crawl cancelled with {} page(s) recorded", pages.len());
                    cancelled = true;
                    break;
                }
                let Some(entry) = frontier.pop() else {
                    break;
                };
                log::debug!("Visiting [depth {}]: {}", entry.depth, entry.url);
                in_flight.push(self.visit(entry, &request, &options));
            }

            let Some(visit) = in_flight.next().await else {
                state = if cancelled
                    || depth_limited
                    || (pages.len() >= request.max_pages && frontier.has_pending())
                {
                    CrawlState::Truncated
                } else {
                    CrawlState::Done
                };
                continue;
            };

            let Visit { record, from_cache } = visit;
            if from_cache {
                stats.cache_hits += 1;
            } else {
                stats.live_fetches += 1;
            }

            match record.error {
                None => {
                    for link in &record.discovered_links {
                        if !filter.allowed(link) {
                            continue;
                        }
                        if frontier.push(link, record.depth + 1) == PushOutcome::BeyondDepth {
                            depth_limited = true;
                        }
                    }
                }
                Some(error) => {
                    stats.failed_pages += 1;
                    log::warn!("Recorded {} for {}", error, record.url);
                }
            }

            pages.push(record);
        }
        drop(in_flight);

        stats.finished_at = Utc::now();
        let truncated = state == CrawlState::Truncated;
        log::info!(
            "Crawl of {} finished: {} page(s), {} failed, {} from cache, truncated={}",
            root,
            pages.len(),
            stats.failed_pages,
            stats.cache_hits,
            truncated
        );

        Ok(CrawlResult {
            request,
            visited_count: frontier.visited_count(),
            pages,
            truncated,
            state,
            cancelled,
            stats,
        })
    }

    /// Cache lookup, then a live fetch bounded by the request timeout.
    async fn visit(
        &self,
        entry: FrontierEntry,
        request: &CrawlRequest,
        options: &FetchOptions,
    ) -> Visit {
        let FrontierEntry { url, depth } = entry;
        let key = cache_key(&url, depth, &request.domain_policy);

        if let Some(cache) = &self.cache {
            match cache.lookup(&key).await {
                CacheLookup::Hit(record) => {
                    log::debug!("Cache hit for {}", url);
                    return Visit {
                        record,
                        from_cache: true,
                    };
                }
                CacheLookup::Miss(reason) => log::debug!("Cache miss for {}: {:?}", url, reason),
            }
        }

        let fetch = self.fetcher.fetch(&url, options);
        let response = match tokio::time::timeout(options.timeout, fetch).await {
            Ok(response) => response,
            Err(_) => FetchResponse::failed(ErrorKind::Timeout),
        };

        let links = if response.is_success() {
            extract_links(&response.html, &url)
        } else {
            Vec::new()
        };
        let record = PageRecord::from_response(url, depth, response, links);

        if record.is_success() {
            if let Some(cache) = &self.cache {
                if let Err(e) = cache.put(&key, &record).await {
                    log::warn!("Could not cache {}: {}", record.url, e);
                }
            }
        }

        if !self.request_delay.is_zero() {
            tokio::time::sleep(self.request_delay).await;
        }

        Visit {
            record,
            from_cache: false,
        }
    }
}
