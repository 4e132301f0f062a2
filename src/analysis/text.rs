// src/analysis/text.rs

//! Plain-text extraction and per-page summaries.

use scraper::{Html, Selector};
use serde::Serialize;

use crate::models::PageRecord;

/// Elements whose text is never shown to a reader.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template", "title"];

/// Short description of one crawled page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageSummary {
    pub url: String,
    pub depth: usize,
    pub title: Option<String>,
    pub meta_description: Option<String>,
    pub heading_count: usize,
    pub word_count: usize,
    pub link_count: usize,
}

/// Visible text of `html` with whitespace collapsed to single spaces.
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    visible_text(&document)
}

fn visible_text(document: &Html) -> String {
    let mut words: Vec<&str> = Vec::new();
    for node in document.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| HIDDEN_ELEMENTS.contains(&el.name()))
        });
        if !hidden {
            words.extend(text.split_whitespace());
        }
    }
    words.join(" ")
}

/// Summarize a page record. Failed pages summarize to empty counts.
pub fn summarize_page(record: &PageRecord) -> PageSummary {
    let document = Html::parse_document(&record.html);

    let title = first_text(&document, "title");
    let meta_description = Selector::parse(r#"meta[name="description"]"#)
        .ok()
        .and_then(|sel| {
            document
                .select(&sel)
                .find_map(|el| el.value().attr("content"))
                .map(|content| content.trim().to_string())
        })
        .filter(|content| !content.is_empty());
    let heading_count = Selector::parse("h1, h2, h3, h4, h5, h6")
        .map(|sel| document.select(&sel).count())
        .unwrap_or(0);
    let word_count = visible_text(&document).split_whitespace().count();

    PageSummary {
        url: record.url.clone(),
        depth: record.depth,
        title,
        meta_description,
        heading_count,
        word_count,
        link_count: record.discovered_links.len(),
    }
}

fn first_text(document: &Html, css: &str) -> Option<String> {
    let Ok(selector) = Selector::parse(css) else {
        return None;
    };
    let element = document.select(&selector).next()?;
    let text = element.text().collect::<Vec<_>>().join(" ");
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    (!text.is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::models::FetchResponse;

    const PAGE: &str = r#"<html>
        <head>
            <title>  Example
                Domain </title>
            <meta name="description" content=" A page for tests ">
            <style>body { color: red; }</style>
        </head>
        <body>
            <h1>Welcome</h1>
            <p>Hello   <b>brave</b>
               new world.</p>
            <script>var hidden = "do not count";</script>
            <h2>More</h2>
        </body>
    </html>"#;

    fn record(html: &str) -> PageRecord {
        PageRecord::from_response(
            "https://example.test/".to_string(),
            0,
            FetchResponse::ok(200, html),
            vec!["https://example.test/a".to_string()],
        )
    }

    #[test]
    fn text_skips_scripts_and_styles() {
        let text = html_to_text(PAGE);
        assert_eq!(text, "Welcome Hello brave new world. More");
    }

    #[test]
    fn text_of_empty_document_is_empty() {
        assert_eq!(html_to_text(""), "");
    }

    #[test]
    fn summary_reads_title_description_and_counts() {
        let summary = summarize_page(&record(PAGE));
        assert_eq!(summary.title.as_deref(), Some("Example Domain"));
        assert_eq!(summary.meta_description.as_deref(), Some("A page for tests"));
        assert_eq!(summary.heading_count, 2);
        assert_eq!(summary.word_count, 6);
        assert_eq!(summary.link_count, 1);
        assert_eq!(summary.depth, 0);
    }

    #[test]
    fn failed_page_summarizes_to_nothing() {
        let failed = PageRecord::from_response(
            "https://example.test/x".to_string(),
            2,
            FetchResponse::failed(ErrorKind::NetworkFailure),
            Vec::new(),
        );
        let summary = summarize_page(&failed);
        assert_eq!(summary.title, None);
        assert_eq!(summary.meta_description, None);
        assert_eq!(summary.word_count, 0);
        assert_eq!(summary.link_count, 0);
    }
}
