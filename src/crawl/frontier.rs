// src/crawl/frontier.rs

//! Breadth-first frontier with a visited set.
//!
//! Visiting is recorded when an entry is popped. Until then the URL is
//! tracked as queued, so it sits in the queue at most once.

use std::collections::{HashSet, VecDeque};

use crate::models::FrontierEntry;
use crate::utils::normalize;

/// What happened to a pushed URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    Queued,
    AlreadyQueued,
    AlreadyVisited,
    BeyondDepth,
}

/// FIFO queue of URLs still to visit, bounded by `max_depth`.
#[derive(Debug)]
pub struct Frontier {
    max_depth: usize,
    queue: VecDeque<FrontierEntry>,
    queued: HashSet<String>,
    visited: HashSet<String>,
}

impl Frontier {
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth,
            queue: VecDeque::new(),
            queued: HashSet::new(),
            visited: HashSet::new(),
        }
    }

    /// Enqueue `url` at `depth` unless it is known already or lies too deep.
    ///
    /// `BeyondDepth` is only reported for URLs that are neither visited nor
    /// queued, so it always means a page the crawl will miss.
    pub fn push(&mut self, url: &str, depth: usize) -> PushOutcome {
        let url = normalize(url);
        if self.visited.contains(&url) {
            return PushOutcome::AlreadyVisited;
        }
        if self.queued.contains(&url) {
            return PushOutcome::AlreadyQueued;
        }
        if depth > self.max_depth {
            return PushOutcome::BeyondDepth;
        }
        self.queued.insert(url.clone());
        self.queue.push_back(FrontierEntry { url, depth });
        PushOutcome::Queued
    }

    /// Next entry in FIFO order, marked visited as it leaves.
    pub fn pop(&mut self) -> Option<FrontierEntry> {
        let entry = self.queue.pop_front()?;
        self.queued.remove(&entry.url);
        self.visited.insert(entry.url.clone());
        Some(entry)
    }

    /// Whether any URL is still waiting to be visited.
    pub fn has_pending(&self) -> bool {
        !self.queue.is_empty()
    }

    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(&normalize(url))
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_in_fifo_order() {
        let mut frontier = Frontier::new(2);
        frontier.push("https://example.test/", 0);
        frontier.push("https://example.test/a", 1);
        frontier.push("https://example.test/b", 1);

        let order: Vec<String> = std::iter::from_fn(|| frontier.pop())
            .map(|e| e.url)
            .collect();
        assert_eq!(
            order,
            vec![
                "https://example.test/",
                "https://example.test/a",
                "https://example.test/b"
            ]
        );
    }

    #[test]
    fn rejects_entries_beyond_max_depth() {
        let mut frontier = Frontier::new(1);
        assert_eq!(frontier.push("https://example.test/a", 1), PushOutcome::Queued);
        assert_eq!(
            frontier.push("https://example.test/b", 2),
            PushOutcome::BeyondDepth
        );
        assert!(frontier.pop().is_some());
        assert!(frontier.pop().is_none());
    }

    #[test]
    fn marks_visited_on_pop_and_queues_once() {
        let mut frontier = Frontier::new(3);
        frontier.push("https://example.test/a", 1);
        assert_eq!(
            frontier.push("https://example.test/a#frag", 2),
            PushOutcome::AlreadyQueued
        );
        assert!(frontier.has_pending());
        assert!(!frontier.is_visited("https://example.test/a"));

        let first = frontier.pop().unwrap();
        assert_eq!(first.depth, 1);
        assert!(frontier.is_visited("https://example.test/a"));

        assert!(!frontier.has_pending());
        assert!(frontier.pop().is_none());
        assert_eq!(
            frontier.push("https://example.test/a", 1),
            PushOutcome::AlreadyVisited
        );
        assert_eq!(frontier.visited_count(), 1);
    }

    #[test]
    fn queued_sibling_is_not_reported_beyond_depth() {
        let mut frontier = Frontier::new(1);
        frontier.push("https://example.test/", 0);
        frontier.pop();
        frontier.push("https://example.test/a", 1);
        frontier.push("https://example.test/b", 1);
        frontier.pop();

        // /a links to /b, which waits in the queue at depth 1.
        assert_eq!(
            frontier.push("https://example.test/b", 2),
            PushOutcome::AlreadyQueued
        );
        assert_eq!(
            frontier.push("https://example.test/c", 2),
            PushOutcome::BeyondDepth
        );
    }
}
