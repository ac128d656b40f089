// src/error.rs
// =============================================================================
// Error types for the crawl engine.
//
// Errors fall into three groups:
// - Per-URL errors (FetchFailed, ParseFailed): caught at the task boundary,
//   logged, and the run keeps going
// - Scope errors (NotInitialized, InvalidSeed): end one seed's run
// - Pool errors (PoolSaturated, PoolUnavailable): end the whole run
//
// The application layer (main.rs, cli handlers) uses anyhow on top of this.
// =============================================================================

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CrawlError {
    /// Network error, timeout, or non-2xx status
    #[error("fetch failed for {url}: {cause}")]
    FetchFailed { url: String, cause: String },

    /// Document could not be turned into links/metadata
    #[error("parse failed for {url}: {reason}")]
    ParseFailed { url: String, reason: String },

    /// Frontier used before a scope was set
    #[error("frontier scope is not initialized")]
    NotInitialized,

    /// Seed URL that cannot anchor a crawl scope
    #[error("invalid seed '{url}': {reason}")]
    InvalidSeed { url: String, reason: String },

    /// Worker pool rejected a task because every worker is busy
    #[error("worker pool is saturated")]
    PoolSaturated,

    /// Worker pool has been shut down
    #[error("worker pool is unavailable")]
    PoolUnavailable,
}

impl CrawlError {
    pub fn fetch(url: impl Into<String>, cause: impl ToString) -> Self {
        CrawlError::FetchFailed {
            url: url.into(),
            cause: cause.to_string(),
        }
    }

    /// True when the whole run (every seed) must stop.
    pub fn is_fatal_to_run(&self) -> bool {
        matches!(self, CrawlError::PoolSaturated | CrawlError::PoolUnavailable)
    }

    /// True when the current seed's run must stop.
    pub fn is_fatal_to_scope(&self) -> bool {
        self.is_fatal_to_run()
            || matches!(self, CrawlError::NotInitialized | CrawlError::InvalidSeed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_per_url_errors_are_not_fatal() {
        let err = CrawlError::fetch("https://example.com/", "HTTP 500");
        assert!(!err.is_fatal_to_scope());
        assert!(!err.is_fatal_to_run());
        assert_eq!(err.to_string(), "fetch failed for https://example.com/: HTTP 500");
    }

    #[test]
    fn test_pool_errors_are_fatal_everywhere() {
        assert!(CrawlError::PoolUnavailable.is_fatal_to_run());
        assert!(CrawlError::PoolSaturated.is_fatal_to_scope());
        assert!(CrawlError::NotInitialized.is_fatal_to_scope());
        assert!(!CrawlError::NotInitialized.is_fatal_to_run());
    }
}
