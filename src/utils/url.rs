// src/utils/url.rs

//! URL manipulation utilities.

use url::Url;

/// Resolve an `href` found on `base` to an absolute crawlable URL.
///
/// Fragments, `mailto:`, `tel:`, `javascript:` and `data:` links are skipped,
/// as is anything that does not resolve to http or https. The fragment of the
/// resolved URL is removed.
///
/// # Examples
/// ```
/// use sitescope::utils::url::resolve_link;
/// use url::Url;
///
/// let base = Url::parse("https://example.com/path/").unwrap();
/// assert_eq!(
///     resolve_link(&base, "page.html#top"),
///     Some("https://example.com/path/page.html".to_string())
/// );
/// ```
pub fn resolve_link(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if ["mailto:", "tel:", "javascript:", "data:"]
        .iter()
        .any(|prefix| lower.starts_with(prefix))
    {
        return None;
    }

    let mut url = base.join(href).ok()?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return None;
    }
    url.set_fragment(None);
    Some(url.to_string())
}

/// Normalize a URL string for visited-set comparison.
///
/// Parsing lowercases scheme and host and adds the root path; the fragment
/// is dropped. Unparseable input is returned trimmed.
pub fn normalize(url: &str) -> String {
    match Url::parse(url.trim()) {
        Ok(mut parsed) => {
            parsed.set_fragment(None);
            parsed.to_string()
        }
        Err(_) => url.trim().to_string(),
    }
}

/// Extract the lowercase host from a URL string.
///
/// # Examples
/// ```
/// use sitescope::utils::url::get_host;
///
/// assert_eq!(
///     get_host("https://Example.COM:8080/path"),
///     Some("example.com".to_string())
/// );
/// ```
pub fn get_host(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
}

/// Origin of a URL, used to key per-site state such as robots.txt.
pub fn origin_key(url: &Url) -> String {
    url.origin().ascii_serialization()
}
