// src/fetch/render.rs
// =============================================================================
// Headless rendering for script-driven pages.
//
// Each render:
// 1. Opens a fresh, isolated browser context (no shared cookies/cache)
// 2. Navigates to the URL
// 3. Waits for the main frame's "networkIdle" lifecycle event; steps 1-3
//    share one deadline (render_timeout)
// 4. Takes the current DOM - on timeout, whatever has rendered so far
// 5. Closes the page and disposes of the context
//
// The browser process is launched lazily on the first render and shared by
// every render afterwards. If it cannot be launched, every render fails fast
// and the fetcher falls back to the static body. close() shuts it down; the
// process is not reaped otherwise, because main() exits without dropping it.
// =============================================================================

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::CrawlConfig;
use crate::error::CrawlError;

#[async_trait]
pub trait Renderer: Send + Sync {
    /// Returns the fully rendered DOM of `url` as HTML.
    async fn render(&self, url: &str) -> Result<String, CrawlError>;

    /// Shuts down whatever backs the renderer. Safe to call when nothing
    /// was ever rendered.
    async fn close(&self) {}
}

/// Builds the renderer for this config, or None when rendering is off.
pub fn build_renderer(config: &CrawlConfig) -> Option<Arc<dyn Renderer>> {
    if !config.render {
        return None;
    }
    headless(config)
}

#[cfg(feature = "browser")]
fn headless(config: &CrawlConfig) -> Option<Arc<dyn Renderer>> {
    Some(Arc::new(browser::HeadlessRenderer::new(config.render_timeout)))
}

#[cfg(not(feature = "browser"))]
fn headless(_config: &CrawlConfig) -> Option<Arc<dyn Renderer>> {
    tracing::warn!("built without the 'browser' feature; dynamic pages will use static HTML");
    None
}

#[cfg(feature = "browser")]
mod browser {
    use async_trait::async_trait;
    use chromiumoxide::cdp::browser_protocol::browser::BrowserContextId;
    use chromiumoxide::cdp::browser_protocol::page::{
        EventLifecycleEvent, NavigateParams, SetLifecycleEventsEnabledParams,
    };
    use chromiumoxide::cdp::browser_protocol::target::{
        CreateBrowserContextParams, CreateTargetParams, DisposeBrowserContextParams,
    };
    use chromiumoxide::{Browser, BrowserConfig, Page};
    use futures::{Stream, StreamExt};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::{Mutex, OnceCell};
    use tokio::time::{timeout, timeout_at, Instant};
    use tracing::{debug, info, warn};

    use super::Renderer;
    use crate::error::CrawlError;

    const NETWORK_IDLE: &str = "networkIdle";

    // Upper bound for DOM capture and for cleanup, each
    const CAPTURE_TIMEOUT: Duration = Duration::from_secs(5);

    pub struct HeadlessRenderer {
        // None once a launch attempt has failed
        browser: OnceCell<Option<Arc<Mutex<Browser>>>>,
        timeout: Duration,
    }

    impl HeadlessRenderer {
        pub fn new(timeout: Duration) -> Self {
            Self {
                browser: OnceCell::new(),
                timeout,
            }
        }

        async fn browser(&self) -> Option<Arc<Mutex<Browser>>> {
            self.browser
                .get_or_init(|| async {
                    match launch().await {
                        Ok(browser) => Some(Arc::new(Mutex::new(browser))),
                        Err(e) => {
                            warn!("headless browser unavailable: {:#}", e);
                            None
                        }
                    }
                })
                .await
                .clone()
        }

        // A blank page inside a fresh browser context. The browser lock is
        // only held for this setup.
        async fn open_page(
            &self,
            browser: &Mutex<Browser>,
            url: &str,
        ) -> Result<(BrowserContextId, Page), CrawlError> {
            let browser = browser.lock().await;

            let context_id = browser
                .execute(CreateBrowserContextParams::default())
                .await
                .map_err(|e| CrawlError::fetch(url, e))?
                .result
                .browser_context_id;

            let page = match CreateTargetParams::builder()
                .url("about:blank")
                .browser_context_id(context_id.clone())
                .build()
            {
                Ok(target) => browser
                    .new_page(target)
                    .await
                    .map_err(|e| CrawlError::fetch(url, e)),
                Err(e) => Err(CrawlError::fetch(url, e)),
            };

            match page {
                Ok(page) => Ok((context_id, page)),
                Err(e) => {
                    let _ = browser
                        .execute(DisposeBrowserContextParams::new(context_id))
                        .await;
                    Err(e)
                }
            }
        }

        // Navigates and waits for network idle. Page cleanup is the caller's job.
        async fn render_page(
            &self,
            page: &Page,
            url: &str,
            deadline: Instant,
        ) -> Result<String, CrawlError> {
            page.execute(SetLifecycleEventsEnabledParams::new(true))
                .await
                .map_err(|e| CrawlError::fetch(url, e))?;

            // Subscribed before navigating so the idle event cannot be missed
            let lifecycle = page
                .event_listener::<EventLifecycleEvent>()
                .await
                .map_err(|e| CrawlError::fetch(url, e))?;

            match timeout_at(deadline, page.execute(NavigateParams::new(url))).await {
                Err(_) => warn!("navigation to {} timed out, taking current DOM", url),
                Ok(Err(e)) => return Err(CrawlError::fetch(url, e)),
                Ok(Ok(response)) => {
                    let navigation = response.result;
                    if let Some(error) = &navigation.error_text {
                        return Err(CrawlError::fetch(url, error));
                    }

                    // Only the idle event of this navigation's main-frame
                    // document counts: not iframes, not the about:blank load
                    let settled = wait_for_event(lifecycle, deadline, |event: &Arc<EventLifecycleEvent>| {
                        event.name == NETWORK_IDLE
                            && event.frame_id == navigation.frame_id
                            && navigation
                                .loader_id
                                .as_ref()
                                .map_or(true, |loader| event.loader_id == *loader)
                    })
                    .await;

                    if settled {
                        debug!("network idle on {}", url);
                    } else {
                        warn!(
                            "no network idle on {} after {:?}, taking current DOM",
                            url, self.timeout
                        );
                    }
                }
            }

            match timeout(CAPTURE_TIMEOUT, page.content()).await {
                Ok(Ok(html)) => Ok(html),
                Ok(Err(e)) => Err(CrawlError::fetch(url, e)),
                Err(_) => Err(CrawlError::fetch(url, "timed out reading the rendered DOM")),
            }
        }
    }

    #[async_trait]
    impl Renderer for HeadlessRenderer {
        async fn render(&self, url: &str) -> Result<String, CrawlError> {
            let browser = self
                .browser()
                .await
                .ok_or_else(|| CrawlError::fetch(url, "headless browser unavailable"))?;

            let deadline = Instant::now() + self.timeout;

            let (context_id, page) = timeout_at(deadline, self.open_page(&browser, url))
                .await
                .map_err(|_| CrawlError::fetch(url, "timed out opening a browser page"))??;

            let result = self.render_page(&page, url, deadline).await;

            let cleanup = async {
                let _ = page.close().await;
                browser
                    .lock()
                    .await
                    .execute(DisposeBrowserContextParams::new(context_id))
                    .await
            };
            match timeout(CAPTURE_TIMEOUT, cleanup).await {
                Ok(Ok(_)) => {}
                Ok(Err(e)) => debug!("failed to dispose browser context: {}", e),
                Err(_) => debug!("browser cleanup for {} timed out", url),
            }
            result
        }

        async fn close(&self) {
            let Some(Some(browser)) = self.browser.get() else {
                return;
            };

            let mut browser = browser.lock().await;
            if let Err(e) = browser.close().await {
                warn!("failed to close headless browser: {}", e);
            }
            match browser.wait().await {
                Ok(_) => info!("headless browser closed"),
                Err(e) => warn!("headless browser did not exit cleanly: {}", e),
            }
        }
    }

    // Waits until `events` yields an item matching `is_target`. False when
    // the deadline passes or the stream ends first.
    async fn wait_for_event<S, F>(events: S, deadline: Instant, mut is_target: F) -> bool
    where
        S: Stream,
        F: FnMut(&S::Item) -> bool,
    {
        let mut events = std::pin::pin!(events);
        let found = async {
            while let Some(event) = events.next().await {
                if is_target(&event) {
                    return true;
                }
            }
            false
        };
        timeout_at(deadline, found).await.unwrap_or(false)
    }

    async fn launch() -> anyhow::Result<Browser> {
        info!("launching headless browser");

        let config = BrowserConfig::builder()
            .arg("--disable-dev-shm-usage")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--no-sandbox")
            .arg("--disable-gpu")
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build browser config: {}", e))?;

        let (browser, mut handler) = Browser::launch(config).await?;

        // The CDP connection only makes progress while the handler is polled
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        Ok(browser)
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use futures::stream;

        fn soon(ms: u64) -> Instant {
            Instant::now() + Duration::from_millis(ms)
        }

        #[tokio::test]
        async fn test_idle_wait_gives_up_at_deadline() {
            let started = Instant::now();
            let settled =
                wait_for_event(stream::pending::<&str>(), soon(50), |e| *e == NETWORK_IDLE).await;

            assert!(!settled);
            assert!(started.elapsed() < Duration::from_secs(2));
        }

        #[tokio::test]
        async fn test_idle_wait_skips_other_events() {
            let events = stream::iter(["init", "load", NETWORK_IDLE]);
            assert!(wait_for_event(events, soon(1000), |e| *e == NETWORK_IDLE).await);
        }

        #[tokio::test]
        async fn test_idle_wait_fails_when_events_stop() {
            let events = stream::iter(["init", "load"]);
            assert!(!wait_for_event(events, soon(1000), |e| *e == NETWORK_IDLE).await);
        }

        #[tokio::test]
        async fn test_close_without_launch_is_a_no_op() {
            let renderer = HeadlessRenderer::new(Duration::from_secs(1));
            renderer.close().await;
            assert!(renderer.browser.get().is_none());
        }
    }
}
