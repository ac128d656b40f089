// src/metadata/extract.rs
// =============================================================================
// Meta tag extraction.
//
// Every <meta> element with a non-empty name attribute becomes one entry:
//   <meta name="description" content="A page">  ->  "description" => "A page"
//
// Elements without a name (charset, http-equiv, og: property tags) are
// skipped. On duplicate names the later element wins.
// =============================================================================

use scraper::{Html, Selector};
use serde::Serialize;
use std::collections::BTreeMap;

/// Metadata of one successfully processed URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetadataRecord {
    pub url: String,
    pub fields: BTreeMap<String, String>,
}

/// Builds a name -> content map from the document's meta elements.
///
/// A BTreeMap keeps the output ordered, so the same document always gives
/// the same map.
pub fn extract_metadata(document: &Html) -> BTreeMap<String, String> {
    let mut metadata = BTreeMap::new();

    // Constant selector, known to be valid
    let selector = Selector::parse("meta").unwrap();

    for meta in document.select(&selector) {
        let element = meta.value();
        let name = element.attr("name").unwrap_or_default().trim();
        if name.is_empty() {
            continue;
        }

        let content = element.attr("content").unwrap_or_default();
        metadata.insert(name.to_string(), content.to_string());
    }

    metadata
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata_of(html: &str) -> BTreeMap<String, String> {
        extract_metadata(&Html::parse_document(html))
    }

    #[test]
    fn test_extracts_named_meta_tags() {
        let html = r#"
            <html><head>
              <meta charset="utf-8">
              <meta name="description" content="A test page">
              <meta name="keywords" content="rust, crawler">
            </head></html>
        "#;
        let metadata = metadata_of(html);

        assert_eq!(metadata.len(), 2);
        assert_eq!(metadata["description"], "A test page");
        assert_eq!(metadata["keywords"], "rust, crawler");
    }

    #[test]
    fn test_skips_empty_and_missing_names() {
        let html = r#"
            <meta name="" content="nope">
            <meta property="og:title" content="nope">
            <meta http-equiv="refresh" content="5">
        "#;
        assert!(metadata_of(html).is_empty());
    }

    #[test]
    fn test_missing_content_is_empty_string() {
        let metadata = metadata_of(r#"<meta name="robots">"#);
        assert_eq!(metadata["robots"], "");
    }

    #[test]
    fn test_last_write_wins() {
        let html = r#"
            <meta name="author" content="first">
            <meta name="author" content="second">
        "#;
        assert_eq!(metadata_of(html)["author"], "second");
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let document = Html::parse_document(
            r#"<meta name="a" content="1"><meta name="b" content="2"><meta name="a" content="3">"#,
        );
        assert_eq!(extract_metadata(&document), extract_metadata(&document));
    }
}
