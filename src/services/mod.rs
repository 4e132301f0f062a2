//! Service layer for the crawler.
//!
//! - Page fetching (`PageFetcher`, `HttpFetcher`)
//! - robots.txt compliance (`RobotsCache`)

mod fetcher;
pub mod robots;

pub use fetcher::{FetchOptions, HttpFetcher, PageFetcher};
pub use robots::RobotsCache;
