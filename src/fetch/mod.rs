// src/fetch/mod.rs
// =============================================================================
// This module retrieves page HTML.
//
// Submodules:
// - http: lightweight reqwest fetch, the default path for every URL
// - classify: pure "does this page need a browser?" heuristic
// - render: headless Chrome rendering for pages classified as dynamic
//
// The orchestrator only sees the PageFetcher trait, so tests can swap in an
// in-memory site without touching the network.
// =============================================================================

mod classify;
mod http;
mod render;

pub use http::HttpFetcher;
pub use render::build_renderer;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::CrawlError;

/// Which path produced the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    /// Body of the lightweight HTTP response
    Static,
    /// DOM taken from a headless browser after network idle
    Rendered,
}

/// The HTML of one fetched URL.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Where the document was actually served from, after redirects.
    /// Relative links resolve against this URL, so it is kept as served
    /// (trailing slash included) rather than normalized.
    pub url: String,
    pub html: String,
    pub mode: RenderMode,
}

#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches `url`. Network errors, timeouts and non-2xx statuses come
    /// back as `CrawlError::FetchFailed`.
    async fn fetch(&self, url: &str) -> Result<FetchedPage, CrawlError>;

    /// Releases anything the fetcher holds outside the process (a browser).
    async fn close(&self) {}
}
