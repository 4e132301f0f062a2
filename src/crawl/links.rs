// src/crawl/links.rs

//! Outbound link extraction from fetched HTML.

use std::collections::HashSet;

use scraper::{Html, Selector};
use url::Url;

use crate::utils::resolve_link;

/// Extract absolute http(s) links from `html`, resolved against `page_url`.
///
/// Order follows the document; repeats are dropped.
pub fn extract_links(html: &str, page_url: &str) -> Vec<String> {
    let Ok(base) = Url::parse(page_url) else {
        log::warn!("Cannot resolve links against invalid URL: {}", page_url);
        return Vec::new();
    };

    let (Ok(anchor), Ok(base_tag)) = (Selector::parse("a[href]"), Selector::parse("base[href]"))
    else {
        return Vec::new();
    };

    // A <base href> overrides the page URL for relative links.
    let document = Html::parse_document(html);
    let base = document
        .select(&base_tag)
        .next()
        .and_then(|b| b.value().attr("href"))
        .and_then(|href| base.join(href).ok())
        .unwrap_or(base);

    let mut seen = HashSet::new();
    document
        .select(&anchor)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| resolve_link(&base, href))
        .filter(|link| seen.insert(link.clone()))
        .collect()
}
