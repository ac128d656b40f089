// src/fetch/http.rs
// =============================================================================
// Lightweight HTTP fetcher with a headless-render escalation.
//
// Key functionality:
// - Always issues one plain GET first
// - Classifies the response (see classify.rs)
// - Static page: the response body IS the document, no second request
// - Dynamic page: re-fetch through the Renderer, if one is configured
// - Maps reqwest failures (timeout, connect, non-2xx) to FetchFailed
// =============================================================================

use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use tracing::{debug, warn};

use super::classify::is_dynamic;
use super::render::Renderer;
use super::{FetchedPage, PageFetcher, RenderMode};
use crate::config::CrawlConfig;
use crate::error::CrawlError;

/// Fetches pages over HTTP, escalating to a `Renderer` for dynamic pages.
///
/// `Client` is cheap to clone (it is a reference counter internally), and
/// every task shares the same connection pool.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
    renderer: Option<Arc<dyn Renderer>>,
}

impl HttpFetcher {
    pub fn new(config: &CrawlConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(config.fetch_timeout)
            .user_agent(config.user_agent.clone())
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self {
            client,
            renderer: None,
        })
    }

    pub fn with_renderer(mut self, renderer: Option<Arc<dyn Renderer>>) -> Self {
        self.renderer = renderer;
        self
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, CrawlError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| categorize_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CrawlError::fetch(url, format!("HTTP {}", status.as_u16())));
        }

        // Redirects may have moved us; links resolve against where we landed
        let final_url = response.url().to_string();
        if final_url != url {
            debug!("{} redirected to {}", url, final_url);
        }

        let headers = response.headers().clone();
        let body = response.text().await.map_err(|e| categorize_error(url, e))?;

        if !is_dynamic(&body, &headers) {
            return Ok(FetchedPage {
                url: final_url,
                html: body,
                mode: RenderMode::Static,
            });
        }

        let Some(renderer) = &self.renderer else {
            debug!("{} looks dynamic but rendering is off, using static body", url);
            return Ok(FetchedPage {
                url: final_url,
                html: body,
                mode: RenderMode::Static,
            });
        };

        debug!("{} looks dynamic, rendering", final_url);
        match renderer.render(&final_url).await {
            Ok(html) => Ok(FetchedPage {
                url: final_url,
                html,
                mode: RenderMode::Rendered,
            }),
            Err(e) => {
                warn!("render failed for {}, using static body: {}", final_url, e);
                Ok(FetchedPage {
                    url: final_url,
                    html: body,
                    mode: RenderMode::Static,
                })
            }
        }
    }

    async fn close(&self) {
        if let Some(renderer) = &self.renderer {
            renderer.close().await;
        }
    }
}

// Turns a reqwest error into a FetchFailed with a readable cause
fn categorize_error(url: &str, error: reqwest::Error) -> CrawlError {
    let cause = if error.is_timeout() {
        "request timed out".to_string()
    } else if error.is_redirect() {
        "too many redirects".to_string()
    } else if error.is_connect() {
        format!("connection failed: {}", error)
    } else {
        error.to_string()
    };

    CrawlError::fetch(url, cause)
}
