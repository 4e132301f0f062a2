// src/services/robots.rs

//! robots.txt rules, cached per origin for the lifetime of a fetcher.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use texting_robots::Robot;
use tokio::sync::{Mutex, OnceCell};
use url::Url;

use crate::utils::url::origin_key;

/// Rules for one origin, resolved at most once. `None` allows everything.
type OriginRules = Arc<OnceCell<Option<Arc<Robot>>>>;

/// Per-origin robots.txt cache.
///
/// An origin whose robots.txt cannot be fetched, returns a non-success status
/// or cannot be parsed is treated as allowing everything. Each origin
/// resolves on its own cell; waiting on a slow robots.txt only blocks pages of
/// that origin.
pub struct RobotsCache {
    user_agent: String,
    rules: Mutex<HashMap<String, OriginRules>>,
}

impl RobotsCache {
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
            rules: Mutex::new(HashMap::new()),
        }
    }

    /// Whether `url` may be fetched by our user agent.
    pub async fn allowed(&self, client: &Client, url: &str, timeout: Duration) -> bool {
        let Ok(parsed) = Url::parse(url) else {
            return true;
        };
        let origin = origin_key(&parsed);

        let cell = Arc::clone(self.rules.lock().await.entry(origin).or_default());
        let robot = cell
            .get_or_init(|| self.fetch_rules(client, &parsed, timeout))
            .await;

        match robot {
            Some(robot) => robot.allowed(url),
            None => true,
        }
    }

    /// Install rules for an origin directly from robots.txt text.
    pub async fn insert(&self, origin: &str, robots_txt: &str) {
        let cell = OnceCell::new_with(Some(self.parse(robots_txt)));
        self.rules
            .lock()
            .await
            .insert(origin.to_string(), Arc::new(cell));
    }

    fn parse(&self, robots_txt: &str) -> Option<Arc<Robot>> {
        match Robot::new(&self.user_agent, robots_txt.as_bytes()) {
            Ok(robot) => Some(Arc::new(robot)),
            Err(e) => {
                log::warn!("Unparseable robots.txt, allowing all: {}", e);
                None
            }
        }
    }

    async fn fetch_rules(
        &self,
        client: &Client,
        url: &Url,
        timeout: Duration,
    ) -> Option<Arc<Robot>> {
        let robots_url = url.join("/robots.txt").ok()?;
        log::debug!("Fetching {}", robots_url);

        let response = match client.get(robots_url.as_str()).timeout(timeout).send().await {
            Ok(response) => response,
            Err(e) => {
                log::debug!("robots.txt unreachable at {}: {}", robots_url, e);
                return None;
            }
        };
        if !response.status().is_success() {
            log::debug!("robots.txt at {} returned {}", robots_url, response.status());
            return None;
        }

        let body = response.text().await.ok()?;
        self.parse(&body)
    }
}
