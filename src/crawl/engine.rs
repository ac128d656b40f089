// src/crawl/engine.rs
// =============================================================================
// The crawl orchestrator.
//
// How one seed's run works:
// 1. Build a Frontier for the seed and enqueue the seed itself
// 2. RUNNING: pop a URL, submit a task to the worker pool, repeat
// 3. Each task fetches its URL, parses the page once, pushes in-scope links
//    back into the Frontier, and (combined mode) delivers metadata
// 4. DRAINING: the Frontier is empty, but in-flight tasks may still add
//    links. Wait for the next task to finish (JoinSet::join_next is the
//    completion signal - no sleep/poll), then go back to RUNNING
// 5. DONE: Frontier empty AND no task in flight
//
// Per-URL failures are recorded in the report and never end the run. Only
// frontier (scope) errors and pool errors reach the caller.
//
// Multi-seed mode runs one coordinator task per seed, all sharing the same
// worker pool, and merges their results into one map.
// =============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::pool::{Submission, WorkerPool};
use super::report::{CrawlPhase, CrawlReport, PageVisit, TaskOutcome};
use crate::config::CrawlConfig;
use crate::error::CrawlError;
use crate::fetch::PageFetcher;
use crate::frontier::Frontier;
use crate::links::{normalize_url, ScopeRules};
use crate::metadata::{MetadataRecord, MetadataSink};
use crate::page::PageDocument;

/// Runs crawls. Cheap to clone: every clone shares the fetcher, the worker
/// pool and the cancellation token.
#[derive(Clone)]
pub struct Crawler {
    fetcher: Arc<dyn PageFetcher>,
    pool: Arc<WorkerPool>,
    rules: Arc<ScopeRules>,
    cancel: CancellationToken,
}

// Everything a CrawlTask needs, cloned into each task
#[derive(Clone)]
struct TaskContext {
    scope: String,
    frontier: Arc<Frontier>,
    fetcher: Arc<dyn PageFetcher>,
    rules: Arc<ScopeRules>,
    sink: Option<Arc<dyn MetadataSink>>,
}

impl Crawler {
    pub fn new(fetcher: Arc<dyn PageFetcher>, config: &CrawlConfig) -> Self {
        Self {
            fetcher,
            pool: Arc::new(WorkerPool::new(config.workers, config.saturation)),
            rules: Arc::new(config.scope.clone()),
            cancel: CancellationToken::new(),
        }
    }

    /// Token that cancels every run of this crawler. In-flight tasks finish;
    /// nothing new is dispatched.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Shuts the worker pool down and closes the fetcher (and any browser
    /// behind it). Later runs fail with PoolUnavailable.
    pub async fn shutdown(&self) {
        self.pool.shutdown();
        self.fetcher.close().await;
    }

    /// Combined mode: discover links and deliver each page's metadata to
    /// `sink` in the same pass.
    pub async fn crawl(
        &self,
        seed: &str,
        sink: Arc<dyn MetadataSink>,
    ) -> Result<CrawlReport, CrawlError> {
        self.run(seed, Some(sink)).await
    }

    /// Single-seed mode: link discovery only.
    pub async fn discover(&self, seed: &str) -> Result<CrawlReport, CrawlError> {
        self.run(seed, None).await
    }

    /// Multi-seed mode: discovers links for every seed concurrently.
    ///
    /// Keys are the seeds exactly as given. A seed whose own run fails (bad
    /// URL) maps to an empty list; a pool failure fails the whole call.
    pub async fn crawl_parallel(
        &self,
        seeds: &[String],
    ) -> Result<BTreeMap<String, Vec<String>>, CrawlError> {
        let reports = self.crawl_parallel_reports(seeds).await?;
        Ok(reports
            .into_iter()
            .map(|(seed, report)| (seed, report.discovered))
            .collect())
    }

    /// `crawl_parallel`, keeping each seed's full report (failures included).
    /// Every seed gets an entry, even one whose coordinator panicked.
    pub async fn crawl_parallel_reports(
        &self,
        seeds: &[String],
    ) -> Result<BTreeMap<String, CrawlReport>, CrawlError> {
        let mut runs = JoinSet::new();
        for seed in seeds {
            let crawler = self.clone();
            let seed = seed.clone();
            runs.spawn(async move {
                let result = crawler.discover(&seed).await;
                (seed, result)
            });
        }

        let mut results = BTreeMap::new();
        let mut fatal = None;

        while let Some(joined) = runs.join_next().await {
            match joined {
                Ok((seed, Ok(report))) => {
                    results.insert(seed, report);
                }
                Ok((seed, Err(e))) if e.is_fatal_to_run() => {
                    error!(seed = %seed, "run aborted: {}", e);
                    fatal.get_or_insert(e);
                }
                Ok((seed, Err(e))) => {
                    warn!(seed = %seed, "seed skipped: {}", e);
                    let report = CrawlReport::skipped(&seed, &e);
                    results.insert(seed, report);
                }
                Err(e) => error!("seed task failed: {}", e),
            }
        }

        if let Some(e) = fatal {
            return Err(e);
        }

        // A panicked coordinator never reported back
        for seed in seeds {
            results
                .entry(seed.clone())
                .or_insert_with(|| CrawlReport::skipped(seed, "seed task failed"));
        }
        Ok(results)
    }

    async fn run(
        &self,
        seed: &str,
        sink: Option<Arc<dyn MetadataSink>>,
    ) -> Result<CrawlReport, CrawlError> {
        let frontier = Arc::new(Frontier::for_scope(seed)?);
        let scope = frontier.scope()?;
        frontier.enqueue(&scope)?;

        let ctx = TaskContext {
            scope: scope.clone(),
            frontier: Arc::clone(&frontier),
            fetcher: Arc::clone(&self.fetcher),
            rules: Arc::clone(&self.rules),
            sink,
        };

        info!(seed = %scope, workers = self.pool.capacity(), "crawl started");

        let mut report = CrawlReport::new(&scope);
        let mut tasks = JoinSet::new();
        let mut phase = CrawlPhase::Running;

        while phase != CrawlPhase::Done {
            let step = match phase {
                CrawlPhase::Running => self.dispatch_next(&ctx, &mut tasks, &mut report).await,
                CrawlPhase::Draining => self.drain_one(&ctx, &mut tasks, &mut report).await,
                CrawlPhase::Done => Ok(CrawlPhase::Done),
            };

            let next = match step {
                Ok(next) => next,
                Err(e) => {
                    error!(seed = %scope, "crawl failed: {}", e);
                    finish_in_flight(&mut tasks).await;
                    return Err(e);
                }
            };

            if next != phase {
                debug!(seed = %scope, "{} -> {}", phase, next);
                phase = next;
            }
        }

        report.phase = CrawlPhase::Done;
        report.discovered = frontier
            .seen_urls()?
            .into_iter()
            .filter(|url| *url != scope)
            .collect();

        info!(
            seed = %scope,
            discovered = report.discovered.len(),
            fetched = report.fetched,
            rendered = report.rendered,
            failed = report.failures.len(),
            cancelled = report.cancelled,
            "crawl finished"
        );
        Ok(report)
    }

    // RUNNING: hand the next frontier URL to the pool
    async fn dispatch_next(
        &self,
        ctx: &TaskContext,
        tasks: &mut JoinSet<TaskOutcome>,
        report: &mut CrawlReport,
    ) -> Result<CrawlPhase, CrawlError> {
        if self.cancel.is_cancelled() {
            report.cancelled = true;
            return Ok(CrawlPhase::Draining);
        }

        let Some(url) = ctx.frontier.dequeue()? else {
            return Ok(CrawlPhase::Draining);
        };

        match self.pool.submit(tasks, process_url(ctx.clone(), url)).await? {
            Submission::Spawned => {}
            Submission::Inline(outcome) => report.record(outcome)?,
        }
        Ok(CrawlPhase::Running)
    }

    // DRAINING: wait for one in-flight task, then decide where to go
    async fn drain_one(
        &self,
        ctx: &TaskContext,
        tasks: &mut JoinSet<TaskOutcome>,
        report: &mut CrawlReport,
    ) -> Result<CrawlPhase, CrawlError> {
        let cancelled = self.cancel.is_cancelled();
        if cancelled {
            report.cancelled = true;
        }

        match tasks.join_next().await {
            Some(joined) => {
                record_joined(joined, report)?;
                if cancelled {
                    Ok(CrawlPhase::Draining)
                } else {
                    Ok(CrawlPhase::Running)
                }
            }
            None if !cancelled && ctx.frontier.has_pending()? => Ok(CrawlPhase::Running),
            None => Ok(CrawlPhase::Done),
        }
    }
}

fn record_joined(
    joined: Result<TaskOutcome, JoinError>,
    report: &mut CrawlReport,
) -> Result<(), CrawlError> {
    match joined {
        Ok(outcome) => report.record(outcome),
        Err(e) => {
            // A panicking task loses its URL; the rest of the run carries on
            error!("crawl task failed: {}", e);
            Ok(())
        }
    }
}

// Lets in-flight tasks complete without recording them
async fn finish_in_flight(tasks: &mut JoinSet<TaskOutcome>) {
    while tasks.join_next().await.is_some() {}
}

// One CrawlTask: never fails, every error ends up in the outcome
async fn process_url(ctx: TaskContext, url: String) -> TaskOutcome {
    let result = visit(&ctx, &url).await;
    TaskOutcome { url, result }
}

async fn visit(ctx: &TaskContext, url: &str) -> Result<PageVisit, CrawlError> {
    let fetched = ctx.fetcher.fetch(url).await?;
    ctx.frontier.mark_visited(url)?;

    // An in-scope redirect target has been visited too; never fetch it again
    if fetched.url != url {
        if let Ok(landed) = normalize_url(&fetched.url) {
            if landed != url && ctx.rules.is_in_scope(&ctx.scope, &landed) {
                ctx.frontier.mark_visited(&landed)?;
            }
        }
    }

    // PageDocument is not Send: parse, extract and drop it before any await
    let (links, metadata) = {
        let page = PageDocument::parse(&fetched)?;
        let metadata = ctx.sink.as_ref().map(|_| page.metadata());
        (page.links(), metadata)
    };

    let mut enqueued = 0;
    for link in &links {
        if ctx.rules.is_in_scope(&ctx.scope, link) && ctx.frontier.enqueue(link)? {
            enqueued += 1;
        }
    }

    if let (Some(sink), Some(fields)) = (&ctx.sink, metadata) {
        sink.deliver(MetadataRecord {
            url: url.to_string(),
            fields,
        });
    }

    Ok(PageVisit {
        mode: fetched.mode,
        links_found: links.len(),
        links_enqueued: enqueued,
    })
}
