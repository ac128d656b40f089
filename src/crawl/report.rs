// src/crawl/report.rs
// =============================================================================
// Run state and results.
//
// - CrawlPhase: RUNNING -> DRAINING -> DONE state of one seed's run
// - TaskOutcome: what one worker task reports back to the orchestrator
// - CrawlReport: everything a finished run hands to its caller
// =============================================================================

use serde::Serialize;
use std::fmt;
use tracing::{debug, warn};

use crate::error::CrawlError;
use crate::fetch::RenderMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CrawlPhase {
    /// Dispatching URLs from the frontier
    Running,
    /// Frontier empty (or cancelled); waiting on in-flight tasks
    Draining,
    /// Terminal
    Done,
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CrawlPhase::Running => "RUNNING",
            CrawlPhase::Draining => "DRAINING",
            CrawlPhase::Done => "DONE",
        };
        f.write_str(name)
    }
}

/// A processed page.
#[derive(Debug, Clone)]
pub struct PageVisit {
    pub mode: RenderMode,
    pub links_found: usize,
    pub links_enqueued: usize,
}

/// Result of one CrawlTask.
#[derive(Debug)]
pub struct TaskOutcome {
    pub url: String,
    pub result: Result<PageVisit, CrawlError>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailedUrl {
    pub url: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    /// Normalized seed URL
    pub seed: String,
    /// In-scope URLs discovered from the seed (the seed itself excluded)
    pub discovered: Vec<String>,
    /// Pages fetched and processed successfully
    pub fetched: usize,
    /// How many of those needed the headless browser
    pub rendered: usize,
    pub failures: Vec<FailedUrl>,
    pub phase: CrawlPhase,
    pub cancelled: bool,
}

impl CrawlReport {
    pub fn new(seed: &str) -> Self {
        Self {
            seed: seed.to_string(),
            discovered: Vec::new(),
            fetched: 0,
            rendered: 0,
            failures: Vec::new(),
            phase: CrawlPhase::Running,
            cancelled: false,
        }
    }

    /// Report for a seed whose run produced nothing: an unusable seed, or a
    /// coordinator that died. The seed itself is listed as the failure.
    pub fn skipped(seed: &str, error: impl ToString) -> Self {
        let mut report = Self::new(seed);
        report.phase = CrawlPhase::Done;
        report.failures.push(FailedUrl {
            url: seed.to_string(),
            error: error.to_string(),
        });
        report
    }

    /// Folds one task outcome into the report.
    ///
    /// Per-URL errors are recorded and swallowed; scope-level errors are
    /// handed back so the orchestrator can end the run.
    pub fn record(&mut self, outcome: TaskOutcome) -> Result<(), CrawlError> {
        match outcome.result {
            Ok(visit) => {
                debug!(
                    url = %outcome.url,
                    mode = ?visit.mode,
                    links = visit.links_found,
                    enqueued = visit.links_enqueued,
                    "page processed"
                );
                self.fetched += 1;
                if visit.mode == RenderMode::Rendered {
                    self.rendered += 1;
                }
            }
            Err(e) if e.is_fatal_to_scope() => return Err(e),
            Err(e) => {
                warn!(url = %outcome.url, "skipping page: {}", e);
                self.failures.push(FailedUrl {
                    url: outcome.url,
                    error: e.to_string(),
                });
            }
        }
        Ok(())
    }

    /// True when every fetched URL succeeded.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}
