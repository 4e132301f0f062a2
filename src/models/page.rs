// src/models/page.rs

//! Per-page records produced by the crawl.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ErrorKind;

/// What a fetcher hands back for one URL.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FetchResponse {
    /// HTTP status, absent when no response was received
    pub status_code: Option<u16>,

    /// Response body, empty on failure
    pub html: String,

    pub error: Option<ErrorKind>,
}

impl FetchResponse {
    /// Successful response.
    pub fn ok(status_code: u16, html: impl Into<String>) -> Self {
        Self {
            status_code: Some(status_code),
            html: html.into(),
            error: None,
        }
    }

    /// Failure without any HTTP response (network, timeout, robots).
    pub fn failed(error: ErrorKind) -> Self {
        Self {
            status_code: None,
            html: String::new(),
            error: Some(error),
        }
    }

    /// Response with a non-2xx status; the body is discarded.
    pub fn status(status_code: u16) -> Self {
        Self {
            status_code: Some(status_code),
            html: String::new(),
            error: Some(ErrorKind::NonSuccessStatus),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// One fetch attempt. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    pub url: String,

    /// Link hops from the root URL
    pub depth: usize,

    pub status_code: Option<u16>,

    /// Raw HTML, empty whenever `error` is set
    pub html: String,

    /// Every http(s) link on the page, in document order, before domain filtering
    pub discovered_links: Vec<String>,

    pub fetched_at: DateTime<Utc>,

    pub error: Option<ErrorKind>,
}

impl PageRecord {
    /// Build a record from a fetch response and the links found in it.
    pub fn from_response(
        url: impl Into<String>,
        depth: usize,
        response: FetchResponse,
        discovered_links: Vec<String>,
    ) -> Self {
        let FetchResponse {
            status_code,
            html,
            error,
        } = response;

        // A failed fetch keeps neither body nor links.
        let (html, discovered_links) = if error.is_some() {
            (String::new(), Vec::new())
        } else {
            (html, discovered_links)
        };

        Self {
            url: url.into(),
            depth,
            status_code,
            html,
            discovered_links,
            fetched_at: Utc::now(),
            error,
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_response_drops_body_and_links() {
        let response = FetchResponse {
            status_code: Some(500),
            html: "<html>oops</html>".to_string(),
            error: Some(ErrorKind::NonSuccessStatus),
        };
        let record = PageRecord::from_response(
            "https://example.test/",
            0,
            response,
            vec!["https://example.test/a".to_string()],
        );

        assert_eq!(record.status_code, Some(500));
        assert!(record.html.is_empty());
        assert!(record.discovered_links.is_empty());
        assert!(!record.is_success());
    }

    #[test]
    fn constructors_set_expected_fields() {
        let ok = FetchResponse::ok(200, "<p>hi</p>");
        assert!(ok.is_success());
        assert_eq!(ok.status_code, Some(200));

        let timeout = FetchResponse::failed(ErrorKind::Timeout);
        assert_eq!(timeout.status_code, None);
        assert!(timeout.html.is_empty());

        let not_found = FetchResponse::status(404);
        assert_eq!(not_found.error, Some(ErrorKind::NonSuccessStatus));
    }
}
