// src/links/extract.rs
// =============================================================================
// This module extracts links from parsed HTML pages.
//
// How it works:
// 1. Find the page's base URL (a <base href> tag wins over the page URL)
// 2. Select every <a href> element
// 3. Resolve each href to an absolute URL
// 4. Normalize it and collect into a set (dedups within the page)
//
// Scope filtering is NOT done here - see validate.rs. Keeping the two apart
// means the extractor reports what the page links to, and the validator
// decides what the crawler follows.
// =============================================================================

use scraper::{Html, Selector};
use std::collections::BTreeSet;
use url::Url;

use super::normalize::normalize_parsed;

/// Extracts every hyperlink in `document` as a normalized absolute URL.
///
/// Relative links resolve against `base_url` (or the page's <base href>).
/// Anchors and non-navigational schemes (mailto:, tel:, javascript:, data:)
/// are skipped. Returns an empty set if `base_url` itself is invalid.
///
/// Example:
///   html = "<a href='/docs'>Docs</a><a href='/docs#intro'>Intro</a>"
///   base_url = "https://example.com/page"
///   result = {"https://example.com/docs"}
pub fn extract_links(base_url: &str, document: &Html) -> BTreeSet<String> {
    let mut links = BTreeSet::new();

    let page_base = match Url::parse(base_url) {
        Ok(url) => url,
        Err(e) => {
            tracing::debug!("invalid base URL {}: {}", base_url, e);
            return links;
        }
    };
    let base = document_base(&page_base, document);

    // Constant selector, known to be valid
    let selector = Selector::parse("a[href]").unwrap();

    for element in document.select(&selector) {
        if let Some(href) = element.value().attr("href") {
            if let Some(url) = resolve_link(&base, href) {
                links.insert(url);
            }
        }
    }

    links
}

// Honors <base href="..."> when present, otherwise the page URL
fn document_base(page_base: &Url, document: &Html) -> Url {
    let selector = Selector::parse("base[href]").unwrap();

    document
        .select(&selector)
        .next()
        .and_then(|element| element.value().attr("href"))
        .and_then(|href| page_base.join(href.trim()).ok())
        .unwrap_or_else(|| page_base.clone())
}

// Resolves a link (possibly relative) to a normalized absolute URL
fn resolve_link(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();

    // Skip blanks, anchors and special protocols
    if href.is_empty()
        || href.starts_with('#')
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("javascript:")
        || href.starts_with("data:")
    {
        return None;
    }

    let mut url = base.join(href).ok()?;
    normalize_parsed(&mut url);
    Some(url.to_string())
}
