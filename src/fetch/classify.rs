// src/fetch/classify.rs
// =============================================================================
// Page dynamism heuristic.
//
// A page is treated as script-rendered (and re-fetched through the headless
// browser) if the lightweight response shows any of:
// - a <script> tag in the body
// - template placeholders: "{{" (Mustache/Vue/Handlebars) or "ng-" (Angular)
// - an X-Powered-By header advertising a server-side framework
//
// This is a string-sniffing heuristic. It lives alone in this file so a
// better classifier can replace it without touching the fetcher.
// =============================================================================

use reqwest::header::HeaderMap;

const SCRIPT_MARKERS: &[&str] = &["<script"];
const TEMPLATE_MARKERS: &[&str] = &["{{", "ng-"];
const FRAMEWORK_HEADERS: &[&str] = &["x-powered-by"];

/// True if the page probably needs a browser to show its final content.
pub fn is_dynamic(body: &str, headers: &HeaderMap) -> bool {
    let lowered = body.to_ascii_lowercase();

    let has_script = SCRIPT_MARKERS.iter().any(|m| lowered.contains(m));
    let has_placeholder = TEMPLATE_MARKERS.iter().any(|m| body.contains(m));
    let has_framework_header = FRAMEWORK_HEADERS.iter().any(|h| headers.contains_key(*h));

    has_script || has_placeholder || has_framework_header
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_plain_html_is_static() {
        let body = "<html><head><title>Hi</title></head><body><p>Hello</p></body></html>";
        assert!(!is_dynamic(body, &HeaderMap::new()));
    }

    #[test]
    fn test_script_tag_is_dynamic() {
        assert!(is_dynamic("<html><SCRIPT src='app.js'></SCRIPT></html>", &HeaderMap::new()));
    }

    #[test]
    fn test_template_placeholders_are_dynamic() {
        assert!(is_dynamic("<p>{{ user.name }}</p>", &HeaderMap::new()));
        assert!(is_dynamic("<div ng-app='shop'></div>", &HeaderMap::new()));
    }

    #[test]
    fn test_framework_header_is_dynamic() {
        let mut headers = HeaderMap::new();
        headers.insert("x-powered-by", HeaderValue::from_static("Next.js"));
        assert!(is_dynamic("<p>static looking</p>", &headers));
    }
}
