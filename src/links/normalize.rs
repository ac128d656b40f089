// src/links/normalize.rs
// =============================================================================
// URL normalization.
//
// Two URLs are the same page iff their normalized strings are equal:
// - scheme and host lowercased, default port dropped (the url crate does this)
// - fragment stripped (#section is client-side only)
// - empty query ("?") dropped
// - trailing slash stripped on non-root paths ("/about/" == "/about")
// =============================================================================

use url::Url;

/// Normalizes a URL string into the form used for frontier dedup.
pub fn normalize_url(raw: &str) -> Result<String, url::ParseError> {
    let mut url = Url::parse(raw.trim())?;
    normalize_parsed(&mut url);
    Ok(url.to_string())
}

pub(crate) fn normalize_parsed(url: &mut Url) {
    url.set_fragment(None);

    if url.query() == Some("") {
        url.set_query(None);
    }

    let path = url.path();
    if path.len() > 1 && path.ends_with('/') {
        let trimmed = path.trim_end_matches('/').to_string();
        if trimmed.is_empty() {
            url.set_path("/");
        } else {
            url.set_path(&trimmed);
        }
    }
}

/// Host used for scope comparisons: lowercase, leading "www." removed.
///
/// Returns None for URLs without a host (mailto:, data:, ...).
pub fn host_key(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_ascii_lowercase();
    match host.strip_prefix("www.") {
        Some(rest) if !rest.is_empty() => Some(rest.to_string()),
        _ => Some(host),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_fragment() {
        let url = normalize_url("https://example.com/page#section").unwrap();
        assert_eq!(url, "https://example.com/page");
    }

    #[test]
    fn test_root_and_bare_host_are_equal() {
        assert_eq!(
            normalize_url("https://example.com").unwrap(),
            normalize_url("https://example.com/").unwrap()
        );
    }

    #[test]
    fn test_trailing_slash_on_path() {
        let url = normalize_url("https://example.com/about/").unwrap();
        assert_eq!(url, "https://example.com/about");
    }

    #[test]
    fn test_lowercases_host_and_drops_default_port() {
        let url = normalize_url("HTTPS://Example.COM:443/Docs?q=1").unwrap();
        assert_eq!(url, "https://example.com/Docs?q=1");
    }

    #[test]
    fn test_empty_query_dropped() {
        let url = normalize_url("https://example.com/search?").unwrap();
        assert_eq!(url, "https://example.com/search");
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(normalize_url("not a url").is_err());
        assert!(normalize_url("").is_err());
    }

    #[test]
    fn test_host_key_strips_www() {
        let url = Url::parse("https://WWW.Example.com/x").unwrap();
        assert_eq!(host_key(&url).as_deref(), Some("example.com"));

        let url = Url::parse("mailto:someone@example.com").unwrap();
        assert_eq!(host_key(&url), None);
    }
}
