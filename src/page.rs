// src/page.rs
// =============================================================================
// PageDocument: one fetched page, parsed once, read twice.
//
// A worker parses the fetched HTML into a PageDocument, pulls links and
// metadata out of it, and drops it. The parsed tree (scraper::Html) is not
// Send, so a PageDocument must never live across an .await - workers build
// and drop it inside one synchronous block.
// =============================================================================

use scraper::Html;
use std::collections::{BTreeMap, BTreeSet};

use crate::error::CrawlError;
use crate::fetch::FetchedPage;
use crate::links::extract_links;
use crate::metadata::extract_metadata;

pub struct PageDocument {
    url: String,
    html: Html,
}

impl PageDocument {
    /// Parses a fetched page. An empty body is a ParseFailed: there is
    /// nothing to extract and it usually means a broken response.
    pub fn parse(page: &FetchedPage) -> Result<Self, CrawlError> {
        if page.html.trim().is_empty() {
            return Err(CrawlError::ParseFailed {
                url: page.url.clone(),
                reason: "empty document".to_string(),
            });
        }

        Ok(Self {
            url: page.url.clone(),
            html: Html::parse_document(&page.html),
        })
    }

    pub fn links(&self) -> BTreeSet<String> {
        extract_links(&self.url, &self.html)
    }

    pub fn metadata(&self) -> BTreeMap<String, String> {
        extract_metadata(&self.html)
    }
}
