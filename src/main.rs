// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Set up logging (tracing, filtered by RUST_LOG, written to stderr)
// 2. Parse command-line arguments using clap
// 3. Build the fetcher, renderer and crawler from the options
// 4. Run the chosen crawl mode; Ctrl-C cancels it cleanly
// 5. Print results and exit (0 = clean, 1 = some pages failed, 2 = error)
// =============================================================================

mod cli;
mod config;
mod crawl;
mod error;
mod fetch;
mod frontier;
mod links;
mod metadata;
mod page;

use anyhow::{Context, Result};
use clap::Parser;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, CrawlOptions};
use crawl::{CrawlReport, Crawler};
use fetch::{build_renderer, HttpFetcher};
use metadata::{JsonLinesSink, LogSink, MetadataSink};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let code = match run().await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            2
        }
    };

    std::process::exit(code);
}

// Returns:
//   Ok(0) = run completed, every page processed
//   Ok(1) = run completed, some pages failed
//   Err   = fatal error (exit code 2)
async fn run() -> Result<i32> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Crawl {
            seed_url,
            json,
            options,
        } => handle_crawl(&seed_url, json, &options).await,
        Commands::Discover {
            seed_urls,
            json,
            options,
        } => handle_discover(&seed_urls, json, &options).await,
    }
}

fn build_crawler(options: &CrawlOptions) -> Result<Crawler> {
    let config = options.to_config();
    let fetcher = HttpFetcher::new(&config)
        .context("failed to build HTTP client")?
        .with_renderer(build_renderer(&config));

    let crawler = Crawler::new(Arc::new(fetcher), &config);

    // Ctrl-C: stop dispatching, let in-flight pages finish
    let token = crawler.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, finishing in-flight pages");
            token.cancel();
        }
    });

    Ok(crawler)
}

// Handles the 'crawl' subcommand: links + metadata for one seed
async fn handle_crawl(seed_url: &str, json: bool, options: &CrawlOptions) -> Result<i32> {
    info!("crawling {}", seed_url);

    let crawler = build_crawler(options)?;
    let sink: Arc<dyn MetadataSink> = if json {
        Arc::new(JsonLinesSink)
    } else {
        Arc::new(LogSink)
    };

    // Shut down (closing the browser) before looking at the result:
    // process::exit in main() skips destructors
    let result = crawler.crawl(seed_url, sink).await;
    crawler.shutdown().await;
    let report = result.with_context(|| format!("crawl of {} failed", seed_url))?;

    print_summary(&report);
    Ok(exit_code([&report]))
}

// Handles the 'discover' subcommand: links only, many seeds in parallel
async fn handle_discover(seed_urls: &[String], json: bool, options: &CrawlOptions) -> Result<i32> {
    info!("discovering links for {} seed(s)", seed_urls.len());

    let crawler = build_crawler(options)?;
    let result = crawler.crawl_parallel_reports(seed_urls).await;
    crawler.shutdown().await;
    let reports = result.context("parallel discovery failed")?;

    let code = exit_code(reports.values());
    let failed: usize = reports.values().map(|r| r.failures.len()).sum();
    let results: BTreeMap<String, Vec<String>> = reports
        .into_iter()
        .map(|(seed, report)| (seed, report.discovered))
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        print_table(&results);
    }

    if failed > 0 {
        warn!("{} page(s) failed across {} seed(s)", failed, results.len());
    }
    Ok(code)
}

// 0 when every page of every run succeeded, 1 otherwise
fn exit_code<'a>(reports: impl IntoIterator<Item = &'a CrawlReport>) -> i32 {
    if reports.into_iter().all(CrawlReport::is_clean) {
        0
    } else {
        1
    }
}

// Summary goes to stderr so --json output on stdout stays machine-readable
fn print_summary(report: &CrawlReport) {
    eprintln!();
    eprintln!("📊 Summary for {}:", report.seed);
    eprintln!("   🔗 Discovered: {}", report.discovered.len());
    eprintln!("   ✅ Fetched: {}", report.fetched);
    eprintln!("   🖥️  Rendered: {}", report.rendered);
    eprintln!("   ❌ Failed: {}", report.failures.len());
    if report.cancelled {
        eprintln!("   ⏹️  Cancelled before the frontier was exhausted");
    }

    for failure in &report.failures {
        eprintln!("      {} - {}", failure.url, failure.error);
    }
}

fn print_table(results: &BTreeMap<String, Vec<String>>) {
    for (seed, links) in results {
        println!("🌐 {} ({} link(s))", seed, links.len());
        println!("{}", "=".repeat(80));
        for link in links {
            println!("   {}", link);
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_is_one_when_any_seed_had_failures() {
        let clean = CrawlReport::new("https://a.test/");
        let broken = CrawlReport::skipped("https://b.test/", "HTTP 500");

        assert_eq!(exit_code([&clean]), 0);
        assert_eq!(exit_code([&clean, &broken]), 1);
        assert_eq!(exit_code(Vec::<&CrawlReport>::new()), 0);
    }
}
