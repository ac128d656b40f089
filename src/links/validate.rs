// src/links/validate.rs
// =============================================================================
// Decides whether a discovered link is crawlable for a given seed.
//
// A link is in scope only if ALL of these hold:
// - it parses as a URL and is not blank
// - its scheme is http or https
// - its host is the seed's host or a subdomain of it ("www." ignored)
// - it does not hit a blocked host (social networks)
// - it does not contain a blocked token (ads, login, utm_ tracking, ...)
// - it is not a binary media file (.jpg, .pdf, .zip, ...)
// - its path is not deeper than `max_path_depth` segments
//
// robots.txt is not consulted.
// =============================================================================

use url::Url;

use super::normalize::host_key;

/// Rules applied by `is_in_scope`.
#[derive(Debug, Clone)]
pub struct ScopeRules {
    /// Maximum number of non-empty path segments
    pub max_path_depth: usize,
    /// Tokens rejected anywhere in host, path or query.
    /// A pattern ending in '_' matches as a prefix ("utm_" matches "utm_source").
    pub blocked_patterns: Vec<String>,
    /// Hosts (and their subdomains) that are never crawled
    pub blocked_hosts: Vec<String>,
    /// Lowercase file extensions, including the dot
    pub blocked_extensions: Vec<String>,
}

impl Default for ScopeRules {
    fn default() -> Self {
        Self {
            max_path_depth: 5,
            blocked_patterns: to_strings(&["utm_", "ads", "login", "subscribe"]),
            blocked_hosts: to_strings(&["facebook.com", "twitter.com"]),
            blocked_extensions: to_strings(&[
                ".jpg", ".jpeg", ".png", ".gif", ".svg", ".webp", ".pdf", ".zip", ".mp3", ".mp4",
            ]),
        }
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl ScopeRules {
    pub fn is_in_scope(&self, scope_url: &str, candidate_url: &str) -> bool {
        let candidate_url = candidate_url.trim();
        if candidate_url.is_empty() {
            return false;
        }

        let (scope, candidate) = match (Url::parse(scope_url), Url::parse(candidate_url)) {
            (Ok(scope), Ok(candidate)) => (scope, candidate),
            _ => return false,
        };

        if !matches!(candidate.scheme(), "http" | "https") {
            return false;
        }

        let (scope_host, candidate_host) = match (host_key(&scope), host_key(&candidate)) {
            (Some(s), Some(c)) => (s, c),
            _ => return false,
        };

        is_same_site(&scope_host, &candidate_host)
            && !self.is_blocked_host(&candidate_host)
            && !self.has_blocked_token(&candidate)
            && !self.is_media_file(&candidate)
            && self.is_depth_valid(&candidate)
    }

    fn is_blocked_host(&self, host: &str) -> bool {
        self.blocked_hosts
            .iter()
            .any(|blocked| is_same_site(blocked, host))
    }

    fn has_blocked_token(&self, url: &Url) -> bool {
        let host = url.host_str().unwrap_or_default();
        let rest = format!("{}?{}", url.path(), url.query().unwrap_or_default());

        let blocked = tokens(host).chain(tokens(&rest)).any(|token| {
            let token = token.to_ascii_lowercase();
            self.blocked_patterns.iter().any(|pattern| {
                if pattern.ends_with('_') {
                    token.starts_with(pattern.as_str())
                } else {
                    token == *pattern
                }
            })
        });
        blocked
    }

    fn is_media_file(&self, url: &Url) -> bool {
        let path = url.path().to_ascii_lowercase();
        self.blocked_extensions.iter().any(|ext| path.ends_with(ext.as_str()))
    }

    fn is_depth_valid(&self, url: &Url) -> bool {
        let depth = url
            .path_segments()
            .map(|segments| segments.filter(|s| !s.is_empty()).count())
            .unwrap_or(0);
        depth <= self.max_path_depth
    }
}

// candidate is the scope host itself or one of its subdomains
fn is_same_site(scope_host: &str, candidate_host: &str) -> bool {
    candidate_host == scope_host
        || candidate_host
            .strip_suffix(scope_host)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

// Splits on everything except letters, digits and '_'
fn tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEED: &str = "https://example.com/";

    fn is_in_scope(scope_url: &str, candidate_url: &str) -> bool {
        ScopeRules::default().is_in_scope(scope_url, candidate_url)
    }

    #[test]
    fn test_same_host_is_in_scope() {
        assert!(is_in_scope(SEED, "https://example.com/about"));
        assert!(is_in_scope(SEED, "http://example.com/about"));
    }

    #[test]
    fn test_www_is_ignored_both_ways() {
        assert!(is_in_scope("https://www.example.com/", "https://example.com/about"));
        assert!(is_in_scope(SEED, "https://www.example.com/about"));
    }

    #[test]
    fn test_subdomain_is_in_scope() {
        assert!(is_in_scope(SEED, "https://blog.example.com/post"));
    }

    #[test]
    fn test_other_domains_are_out_of_scope() {
        assert!(!is_in_scope(SEED, "https://other.com/"));
        assert!(!is_in_scope(SEED, "https://notexample.com/"));
        assert!(!is_in_scope(SEED, "https://example.com.evil.net/"));
    }

    #[test]
    fn test_blank_and_garbage_rejected() {
        assert!(!is_in_scope(SEED, ""));
        assert!(!is_in_scope(SEED, "   "));
        assert!(!is_in_scope(SEED, "::not a url::"));
        assert!(!is_in_scope("not a seed", "https://example.com/about"));
    }

    #[test]
    fn test_disallowed_schemes_rejected() {
        assert!(!is_in_scope(SEED, "ftp://example.com/file"));
        assert!(!is_in_scope(SEED, "mailto:someone@example.com"));
    }

    #[test]
    fn test_blocked_patterns() {
        assert!(!is_in_scope("https://example.net/", "https://ads.example.net/track?x=1"));
        assert!(!is_in_scope(SEED, "https://example.com/login"));
        assert!(!is_in_scope(SEED, "https://example.com/news?utm_source=feed"));
        assert!(!is_in_scope(SEED, "https://example.com/user-subscribe"));
    }

    #[test]
    fn test_blocked_words_only_match_whole_tokens() {
        assert!(is_in_scope(SEED, "https://example.com/downloads"));
        assert!(is_in_scope(SEED, "https://example.com/threads/42"));
    }

    #[test]
    fn test_blocked_tokens_in_host_and_query() {
        let rules = ScopeRules::default();
        assert!(!rules.is_in_scope("https://example.net/", "https://ads.example.net/"));
        assert!(!rules.is_in_scope(SEED, "https://example.com/?ref=login"));
        assert!(rules.is_in_scope(SEED, "https://example.com/?ref=home"));
    }

    #[test]
    fn test_blocked_hosts() {
        assert!(!is_in_scope("https://facebook.com/", "https://m.facebook.com/page"));
    }

    #[test]
    fn test_media_files_rejected() {
        assert!(!is_in_scope(SEED, "https://example.com/logo.PNG"));
        assert!(!is_in_scope(SEED, "https://example.com/report.pdf"));
        assert!(is_in_scope(SEED, "https://example.com/report.html"));
    }

    #[test]
    fn test_path_depth_bound() {
        assert!(is_in_scope(SEED, "https://example.com/a/b/c/d/e"));
        assert!(!is_in_scope(SEED, "https://example.com/a/b/c/d/e/f"));

        let rules = ScopeRules {
            max_path_depth: 1,
            ..ScopeRules::default()
        };
        assert!(rules.is_in_scope(SEED, "https://example.com/a"));
        assert!(!rules.is_in_scope(SEED, "https://example.com/a/b"));
    }
}
