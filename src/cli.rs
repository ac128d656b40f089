// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Two subcommands, one per crawl mode:
// - crawl:    one seed, links + metadata in a single pass
// - discover: many seeds in parallel, links only
//
// Both share the same tuning flags (CrawlOptions), which map onto
// CrawlConfig.
// =============================================================================

use clap::{Args, Parser, Subcommand};
use std::time::Duration;

use crate::config::{default_workers, CrawlConfig, SaturationPolicy};

#[derive(Parser, Debug)]
#[command(
    name = "meta-crawler",
    version,
    about = "Crawl websites breadth-first and extract page metadata",
    long_about = "meta-crawler follows same-site links from one or more seed pages and \
                  collects each page's <meta> tags. Script-rendered pages are loaded in a \
                  headless browser so their final DOM is what gets parsed."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl a site and extract metadata from every page
    ///
    /// Example: meta-crawler crawl https://example.com --json
    Crawl {
        /// Seed URL; only links on the same site are followed
        seed_url: String,

        /// Print metadata records as JSON lines instead of log lines
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        options: CrawlOptions,
    },

    /// Discover same-site links for several seeds at once
    ///
    /// Example: meta-crawler discover https://a.com https://b.com
    Discover {
        /// One or more seed URLs
        #[arg(required = true)]
        seed_urls: Vec<String>,

        /// Output results in JSON format instead of a table
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        options: CrawlOptions,
    },
}

#[derive(Args, Debug, Clone)]
pub struct CrawlOptions {
    /// Concurrent fetch workers (default: 2x CPU cores)
    #[arg(long)]
    pub workers: Option<usize>,

    /// What to do when every worker is busy
    #[arg(long, value_enum, default_value_t = SaturationPolicy::CallerRuns)]
    pub saturation: SaturationPolicy,

    /// Timeout for one HTTP fetch, in seconds
    #[arg(long, default_value_t = 10)]
    pub timeout_secs: u64,

    /// How long to wait for network idle when rendering, in seconds
    #[arg(long, default_value_t = 30)]
    pub render_timeout_secs: u64,

    /// Never launch a headless browser; use static HTML for every page
    #[arg(long)]
    pub no_render: bool,

    /// Maximum number of path segments a followed link may have
    #[arg(long, default_value_t = 5)]
    pub max_path_depth: usize,
}

impl CrawlOptions {
    pub fn to_config(&self) -> CrawlConfig {
        let mut config = CrawlConfig {
            workers: self.workers.unwrap_or_else(default_workers),
            saturation: self.saturation,
            fetch_timeout: Duration::from_secs(self.timeout_secs),
            render_timeout: Duration::from_secs(self.render_timeout_secs),
            render: !self.no_render,
            ..CrawlConfig::default()
        };
        config.scope.max_path_depth = self.max_path_depth;
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crawl_defaults() {
        let cli = Cli::parse_from(["meta-crawler", "crawl", "https://example.com"]);
        let Commands::Crawl { seed_url, json, options } = cli.command else {
            panic!("expected crawl subcommand");
        };

        assert_eq!(seed_url, "https://example.com");
        assert!(!json);

        let config = options.to_config();
        assert_eq!(config.saturation, SaturationPolicy::CallerRuns);
        assert_eq!(config.fetch_timeout, Duration::from_secs(10));
        assert!(config.render);
        assert_eq!(config.scope.max_path_depth, 5);
    }

    #[test]
    fn test_discover_with_flags() {
        let cli = Cli::parse_from([
            "meta-crawler",
            "discover",
            "https://a.com",
            "https://b.com",
            "--workers",
            "3",
            "--saturation",
            "block",
            "--no-render",
            "--max-path-depth",
            "2",
            "--json",
        ]);
        let Commands::Discover { seed_urls, json, options } = cli.command else {
            panic!("expected discover subcommand");
        };

        assert_eq!(seed_urls, vec!["https://a.com", "https://b.com"]);
        assert!(json);

        let config = options.to_config();
        assert_eq!(config.workers, 3);
        assert_eq!(config.saturation, SaturationPolicy::Block);
        assert!(!config.render);
        assert_eq!(config.scope.max_path_depth, 2);
    }

    #[test]
    fn test_discover_requires_a_seed() {
        assert!(Cli::try_parse_from(["meta-crawler", "discover"]).is_err());
    }
}
