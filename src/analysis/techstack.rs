// src/analysis/techstack.rs

//! Technology detection from a declarative signature table.
//!
//! Every signature is a case-insensitive regular expression applied to one
//! scope of the page: script sources, stylesheet hrefs or the raw markup. A
//! first capture group, when present and matched, is reported as the version.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use regex::{Regex, RegexBuilder};
use scraper::{Html, Selector};
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::models::CrawlResult;

use self::Category::{Analytics, CssFramework, Library};
use self::Scope::{Markup, ScriptSrc, StylesheetHref};

/// Kind of technology a signature identifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Library,
    CssFramework,
    Analytics,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Library => "library",
            Self::CssFramework => "css-framework",
            Self::Analytics => "analytics",
        };
        f.write_str(name)
    }
}

/// Part of the page a signature is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// `src` of every `<script src>`.
    ScriptSrc,
    /// `href` of every `<link rel="stylesheet">`.
    StylesheetHref,
    /// The whole HTML source.
    Markup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    pub label: &'static str,
    pub category: Category,
    pub scope: Scope,
    pub pattern: &'static str,
}

const fn sig(
    label: &'static str,
    category: Category,
    scope: Scope,
    pattern: &'static str,
) -> Signature {
    Signature {
        label,
        category,
        scope,
        pattern,
    }
}

/// Built-in signatures.
pub static SIGNATURES: &[Signature] = &[
    sig("jQuery", Library, ScriptSrc, r"jquery[.-](\d+(?:\.\d+)*)|jquery(?:\.min)?\.js"),
    sig("React", Library, ScriptSrc, r"react[.-](\d+(?:\.\d+)*)|react(?:\.min)?\.js"),
    sig("Vue", Library, ScriptSrc, r"vue[.-](\d+(?:\.\d+)*)|vue(?:\.min)?\.js"),
    sig("Angular", Library, ScriptSrc, r"angular[.-](\d+(?:\.\d+)*)|angular(?:\.min)?\.js"),
    sig("Lodash", Library, ScriptSrc, r"lodash[.-](\d+(?:\.\d+)*)|lodash(?:\.min)?\.js"),
    sig("Moment.js", Library, ScriptSrc, r"moment[.-](\d+(?:\.\d+)*)|moment(?:\.min)?\.js"),
    sig("D3.js", Library, ScriptSrc, r"\bd3[.-]v?(\d+(?:\.\d+)*)|\bd3(?:\.min)?\.js"),
    sig("Chart.js", Library, ScriptSrc, r"chart[.-](\d+(?:\.\d+)*)|chart(?:\.min)?\.js"),
    sig(
        "Bootstrap",
        CssFramework,
        StylesheetHref,
        r"bootstrap[.-](\d+(?:\.\d+)*)|bootstrap(?:\.min)?\.css",
    ),
    sig(
        "Bootstrap",
        CssFramework,
        ScriptSrc,
        r"bootstrap[.-](\d+(?:\.\d+)*)|bootstrap(?:\.bundle)?(?:\.min)?\.js",
    ),
    sig("Tailwind CSS", CssFramework, StylesheetHref, r"tailwind(?:css)?[.@-]?(\d+(?:\.\d+)*)?"),
    sig("Font Awesome", CssFramework, StylesheetHref, r"font-?awesome[-./@]?(\d+(?:\.\d+)*)?"),
    sig(
        "Google Analytics",
        Analytics,
        Markup,
        r"google-analytics\.com/analytics\.js|\bgtag\(|\bga\(",
    ),
    sig("Google Tag Manager", Analytics, Markup, r"googletagmanager\.com/gtm\.js|\bGTM-[A-Z0-9]+"),
    sig(
        "Facebook Pixel",
        Analytics,
        Markup,
        r"connect\.facebook\.net/[^\s]*?/fbevents\.js|\bfbq\(",
    ),
    sig("Hotjar", Analytics, Markup, r"static\.hotjar\.com/c/hotjar-|hjBootstrap"),
    sig("Mixpanel", Analytics, Markup, r"cdn\.mxpnl\.com/libs/mixpanel-|\bmixpanel\."),
    sig("Adobe Analytics", Analytics, Markup, r"omniture\.com|s_code\.js"),
];

/// A technology found on one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Detection {
    pub label: &'static str,
    pub category: Category,
    pub version: Option<String>,
    /// The attribute value or markup fragment that matched.
    pub evidence: String,
}

/// How many pages of a crawl use a technology.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TechUsage {
    pub label: &'static str,
    pub category: Category,
    pub pages: usize,
}

/// Compiled signature table.
#[derive(Debug, Clone)]
pub struct TechDetector {
    rules: Vec<(Signature, Regex)>,
}

impl TechDetector {
    /// Compile `signatures`, failing on the first invalid pattern.
    pub fn new(signatures: &[Signature]) -> Result<Self> {
        let rules = signatures
            .iter()
            .map(|signature| {
                RegexBuilder::new(signature.pattern)
                    .case_insensitive(true)
                    .build()
                    .map(|regex| (*signature, regex))
                    .map_err(|e| AppError::pattern(signature.pattern, e))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    /// Detector over the built-in [`SIGNATURES`].
    pub fn builtin() -> Result<Self> {
        Self::new(SIGNATURES)
    }

    /// Technologies used by one HTML document, at most one per label.
    pub fn detect(&self, html: &str) -> Vec<Detection> {
        let document = Html::parse_document(html);
        let scripts = attribute_values(&document, "script[src]", "src");
        let stylesheets = attribute_values(&document, r#"link[rel~="stylesheet"][href]"#, "href");

        let mut seen = HashSet::new();
        let mut detections = Vec::new();
        for (signature, regex) in &self.rules {
            if seen.contains(signature.label) {
                continue;
            }
            let found = match signature.scope {
                Scope::ScriptSrc => first_match(regex, &scripts, true),
                Scope::StylesheetHref => first_match(regex, &stylesheets, true),
                Scope::Markup => first_match(regex, &[html], false),
            };
            if let Some((version, evidence)) = found {
                seen.insert(signature.label);
                detections.push(Detection {
                    label: signature.label,
                    category: signature.category,
                    version,
                    evidence,
                });
            }
        }
        detections
    }

    /// Per-technology page counts over the successful pages of a crawl,
    /// most widely used first.
    pub fn detect_across(&self, result: &CrawlResult) -> Vec<TechUsage> {
        let mut counts: BTreeMap<&'static str, (Category, usize)> = BTreeMap::new();
        for page in result.successful_pages() {
            for detection in self.detect(&page.html) {
                counts
                    .entry(detection.label)
                    .or_insert((detection.category, 0))
                    .1 += 1;
            }
        }

        let mut usage: Vec<TechUsage> = counts
            .into_iter()
            .map(|(label, (category, pages))| TechUsage {
                label,
                category,
                pages,
            })
            .collect();
        usage.sort_by(|a, b| b.pages.cmp(&a.pages).then(a.label.cmp(b.label)));
        usage
    }
}

fn attribute_values<'a>(document: &'a Html, css: &str, attr: &str) -> Vec<&'a str> {
    let Ok(selector) = Selector::parse(css) else {
        return Vec::new();
    };
    document
        .select(&selector)
        .filter_map(|el| el.value().attr(attr))
        .collect()
}

/// Version and evidence of the first candidate `regex` matches.
///
/// Attribute candidates are reported whole; markup is reported as the
/// matched fragment only.
fn first_match(
    regex: &Regex,
    candidates: &[&str],
    whole: bool,
) -> Option<(Option<String>, String)> {
    candidates.iter().find_map(|candidate| {
        let captures = regex.captures(candidate)?;
        let version = captures.get(1).map(|m| m.as_str().to_string());
        let evidence = if whole {
            candidate.to_string()
        } else {
            captures.get(0)?.as_str().to_string()
        };
        Some((version, evidence))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CrawlRequest, CrawlState, CrawlStats, FetchResponse, PageRecord};
    use chrono::Utc;

    const PAGE: &str = r#"<html><head>
        <link rel="stylesheet" href="https://cdn.example.test/bootstrap-5.3.2.min.css">
        <script src="/static/jquery-3.6.0.min.js"></script>
        <script src="/static/bootstrap.bundle.min.js"></script>
        <script>gtag('config', 'G-XYZ');</script>
    </head><body><p>hi</p></body></html>"#;

    fn detector() -> TechDetector {
        TechDetector::builtin().unwrap()
    }

    #[test]
    fn builtin_table_compiles() {
        assert_eq!(detector().rules.len(), SIGNATURES.len());
    }

    #[test]
    fn detects_libraries_with_versions() {
        let detections = detector().detect(PAGE);
        let jquery = detections.iter().find(|d| d.label == "jQuery").unwrap();
        assert_eq!(jquery.version.as_deref(), Some("3.6.0"));
        assert_eq!(jquery.category, Category::Library);
        assert_eq!(jquery.evidence, "/static/jquery-3.6.0.min.js");
    }

    #[test]
    fn duplicate_labels_are_reported_once() {
        let detections = detector().detect(PAGE);
        let bootstrap: Vec<_> = detections.iter().filter(|d| d.label == "Bootstrap").collect();
        assert_eq!(bootstrap.len(), 1);
        assert_eq!(bootstrap[0].version.as_deref(), Some("5.3.2"));
    }

    #[test]
    fn markup_signatures_report_the_fragment() {
        let detections = detector().detect(PAGE);
        let ga = detections
            .iter()
            .find(|d| d.label == "Google Analytics")
            .unwrap();
        assert_eq!(ga.evidence, "gtag(");
        assert_eq!(ga.version, None);
    }

    #[test]
    fn plain_page_has_no_detections() {
        assert!(detector().detect("<p>Nothing to see</p>").is_empty());
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        let bad = [sig("Broken", Library, Markup, "(unclosed")];
        let err = TechDetector::new(&bad).unwrap_err();
        assert!(matches!(err, AppError::Pattern { .. }));
    }

    #[test]
    fn custom_table_is_used() {
        let table = [sig("Widget", Library, ScriptSrc, r"widget-(\d+)\.js")];
        let detector = TechDetector::new(&table).unwrap();
        let found = detector.detect(r#"<script src="/widget-7.js"></script>"#);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].version.as_deref(), Some("7"));
        assert!(detector.detect(PAGE).is_empty());
    }

    #[test]
    fn usage_counts_pages_per_label() {
        let page = |url: &str, html: &str| {
            PageRecord::from_response(url, 0, FetchResponse::ok(200, html), Vec::new())
        };
        let now = Utc::now();
        let result = CrawlResult {
            request: CrawlRequest::new("https://example.test/"),
            pages: vec![
                page("https://example.test/", PAGE),
                page(
                    "https://example.test/a",
                    r#"<script src="/jquery.min.js"></script>"#,
                ),
                page("https://example.test/b", "<p>plain</p>"),
            ],
            visited_count: 3,
            truncated: false,
            state: CrawlState::Done,
            cancelled: false,
            stats: CrawlStats::started(now),
        };

        let usage = detector().detect_across(&result);
        assert_eq!(usage[0].label, "jQuery");
        assert_eq!(usage[0].pages, 2);
        assert!(usage.iter().any(|u| u.label == "Bootstrap" && u.pages == 1));
        assert!(usage.iter().all(|u| u.label != "React"));
    }
}
