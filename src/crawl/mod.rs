// src/crawl/mod.rs
// =============================================================================
// This module drives crawl runs.
//
// Submodules:
// - engine: the Crawler - BFS loop, RUNNING/DRAINING/DONE state machine,
//   single-seed, combined and multi-seed modes
// - pool: bounded worker pool with a saturation policy
// - report: per-run results, task outcomes and the phase enum
//
// Features:
// - Breadth-first crawling from a seed, same-site links only
// - Many pages fetched at once, each URL at most once
// - Per-URL failures are logged and skipped, never fatal
// - Cooperative cancellation (in-flight pages finish, nothing new starts)
// =============================================================================

mod engine;
mod pool;
mod report;

pub use engine::Crawler;
pub use report::CrawlReport;
