// src/crawl/pool.rs
// =============================================================================
// Bounded worker pool for crawl tasks.
//
// How it works:
// - A Semaphore holds one permit per worker
// - submit() grabs a permit and spawns the task onto the caller's JoinSet;
//   the permit is released when the task finishes
// - When no permit is free, the SaturationPolicy decides:
//     CallerRuns -> run the task right here, on the submitting coordinator
//     Block      -> wait for a permit, then spawn
//     Reject     -> fail with PoolSaturated
// - shutdown() closes the semaphore; later submits fail with PoolUnavailable
//
// One pool is shared by every seed of a run, so the worker count is a global
// bound, not a per-seed one.
// =============================================================================

use std::future::Future;
use std::sync::Arc;
use tokio::sync::{Semaphore, TryAcquireError};
use tokio::task::JoinSet;

use crate::config::SaturationPolicy;
use crate::error::CrawlError;

/// Where a submitted task ran.
#[derive(Debug)]
pub enum Submission<T> {
    /// Spawned onto the JoinSet; its output arrives via join_next()
    Spawned,
    /// Ran inline on the caller (CallerRuns under saturation)
    Inline(T),
}

#[derive(Debug)]
pub struct WorkerPool {
    permits: Arc<Semaphore>,
    capacity: usize,
    policy: SaturationPolicy,
}

impl WorkerPool {
    pub fn new(capacity: usize, policy: SaturationPolicy) -> Self {
        let capacity = capacity.max(1);
        Self {
            permits: Arc::new(Semaphore::new(capacity)),
            capacity,
            policy,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub async fn submit<F>(
        &self,
        tasks: &mut JoinSet<F::Output>,
        task: F,
    ) -> Result<Submission<F::Output>, CrawlError>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let permit = match Arc::clone(&self.permits).try_acquire_owned() {
            Ok(permit) => permit,
            Err(TryAcquireError::Closed) => return Err(CrawlError::PoolUnavailable),
            Err(TryAcquireError::NoPermits) => match self.policy {
                SaturationPolicy::CallerRuns => return Ok(Submission::Inline(task.await)),
                SaturationPolicy::Reject => return Err(CrawlError::PoolSaturated),
                SaturationPolicy::Block => Arc::clone(&self.permits)
                    .acquire_owned()
                    .await
                    .map_err(|_| CrawlError::PoolUnavailable)?,
            },
        };

        tasks.spawn(async move {
            let _permit = permit;
            task.await
        });
        Ok(Submission::Spawned)
    }

    /// Stops accepting work. Tasks already running are not interrupted.
    pub fn shutdown(&self) {
        self.permits.close();
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why a Semaphore instead of a fixed set of worker threads?
//    - tokio already has worker threads; what we need to bound is how many
//      crawl tasks are in flight at once
//    - A permit is "one worker slot"; holding it = occupying a worker
//
// 2. Why does the spawned task hold `_permit`?
//    - OwnedSemaphorePermit gives the slot back when it is dropped
//    - Moving it into the task means the slot frees exactly when the task ends,
//      even if the task panics
//
// 3. Why is CallerRuns the default?
//    - Rejecting or dropping a task would lose discovered links
//    - Running it inline slows the coordinator down instead, which is
//      natural backpressure
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn test_spawns_while_permits_are_free() {
        let pool = WorkerPool::new(2, SaturationPolicy::Reject);
        let mut tasks = JoinSet::new();

        assert!(matches!(pool.submit(&mut tasks, async { 1 }).await, Ok(Submission::Spawned)));
        let output = tasks.join_next().await.unwrap().unwrap();
        assert_eq!(output, 1);
        assert_eq!(pool.permits.available_permits(), 2);
    }

    #[tokio::test]
    async fn test_reject_when_saturated() {
        let pool = WorkerPool::new(1, SaturationPolicy::Reject);
        let mut tasks = JoinSet::new();
        let (release, wait) = oneshot::channel::<()>();

        pool.submit(&mut tasks, async move {
            let _ = wait.await;
        })
        .await
        .unwrap();

        let second = pool.submit(&mut tasks, async {}).await;
        assert!(matches!(second, Err(CrawlError::PoolSaturated)));

        release.send(()).unwrap();
        tasks.join_next().await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_caller_runs_when_saturated() {
        let pool = WorkerPool::new(1, SaturationPolicy::CallerRuns);
        let mut tasks = JoinSet::new();
        let (release, wait) = oneshot::channel::<()>();

        pool.submit(&mut tasks, async move {
            let _ = wait.await;
            "spawned"
        })
        .await
        .unwrap();

        let second = pool.submit(&mut tasks, async { "inline" }).await.unwrap();
        assert!(matches!(second, Submission::Inline("inline")));

        release.send(()).unwrap();
        assert_eq!(tasks.join_next().await.unwrap().unwrap(), "spawned");
    }

    #[tokio::test]
    async fn test_block_waits_for_a_free_worker() {
        let pool = WorkerPool::new(1, SaturationPolicy::Block);
        let mut tasks = JoinSet::new();

        pool.submit(&mut tasks, async {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            1
        })
        .await
        .unwrap();

        // The first task finishes on its own, freeing its permit
        let second = pool.submit(&mut tasks, async { 2 }).await.unwrap();
        assert!(matches!(second, Submission::Spawned));

        let mut outputs = vec![
            tasks.join_next().await.unwrap().unwrap(),
            tasks.join_next().await.unwrap().unwrap(),
        ];
        outputs.sort();
        assert_eq!(outputs, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_shutdown_makes_pool_unavailable() {
        let pool = WorkerPool::new(4, SaturationPolicy::CallerRuns);
        pool.shutdown();

        let mut tasks = JoinSet::new();
        let result = pool.submit(&mut tasks, async {}).await;
        assert!(matches!(result, Err(CrawlError::PoolUnavailable)));
        assert!(tasks.is_empty());
    }
}
