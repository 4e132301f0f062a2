// src/crawl/mod.rs

//! Website crawling.
//!
//! - Breadth-first frontier with depth limit (`frontier`)
//! - Domain policy filter (`domain`)
//! - Link extraction from HTML (`links`)
//! - Orchestration loop with bounded worker pool and cancellation (`engine`)

pub mod domain;
pub mod engine;
pub mod frontier;
pub mod links;

pub use domain::DomainFilter;
pub use engine::Crawler;
pub use frontier::{Frontier, PushOutcome};
pub use links::extract_links;
