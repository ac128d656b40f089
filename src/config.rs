// src/config.rs
// =============================================================================
// Runtime settings for a crawl run.
//
// CrawlConfig::default() gives a working setup; the CLI (cli.rs) overrides
// individual fields from command-line flags.
// =============================================================================

use clap::ValueEnum;
use std::time::Duration;

use crate::links::ScopeRules;

pub const DEFAULT_USER_AGENT: &str = concat!("meta-crawler/", env!("CARGO_PKG_VERSION"));

/// What the worker pool does when every worker is busy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SaturationPolicy {
    /// Run the task on the submitting coordinator instead
    #[default]
    CallerRuns,
    /// Wait until a worker frees up
    Block,
    /// Fail the run with PoolSaturated
    Reject,
}

#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Worker pool capacity (concurrent fetch+extract tasks)
    pub workers: usize,
    pub saturation: SaturationPolicy,
    /// Upper bound for one lightweight HTTP fetch
    pub fetch_timeout: Duration,
    /// Upper bound for waiting on network idle during headless rendering
    pub render_timeout: Duration,
    /// Re-fetch script-driven pages through a headless browser
    pub render: bool,
    pub user_agent: String,
    pub scope: ScopeRules,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            saturation: SaturationPolicy::default(),
            fetch_timeout: Duration::from_secs(10),
            render_timeout: Duration::from_secs(30),
            render: true,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            scope: ScopeRules::default(),
        }
    }
}

/// Crawling is I/O-bound, so the pool runs more workers than there are cores.
pub fn default_workers() -> usize {
    num_cpus::get() * 2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CrawlConfig::default();
        assert!(config.workers >= 2);
        assert_eq!(config.saturation, SaturationPolicy::CallerRuns);
        assert_eq!(config.fetch_timeout, Duration::from_secs(10));
        assert!(config.render);
        assert!(config.user_agent.starts_with("meta-crawler/"));
    }
}
