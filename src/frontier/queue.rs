// src/frontier/queue.rs
// =============================================================================
// FIFO frontier with an atomic "enqueue if unseen".
//
// How it works:
// - A VecDeque holds pending URLs in discovery order (breadth-first)
// - A HashSet holds every URL that was ever enqueued or visited
// - Both live behind ONE mutex, so checking the seen-set and pushing onto
//   the queue happen in a single critical section. Two workers discovering
//   the same link at the same moment can never both enqueue it.
//
// The lock is a std Mutex: it is never held across an .await, so there is
// no need for an async-aware lock here.
// =============================================================================

use std::collections::{HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::CrawlError;
use crate::links::normalize_url;

struct FrontierState {
    scope: String,
    queue: VecDeque<String>,
    seen: HashSet<String>,
}

/// Pending + seen URLs for one crawl scope.
///
/// URLs are expected in normalized form (see `links::normalize_url`); the
/// frontier compares them as plain strings.
pub struct Frontier {
    state: Mutex<Option<FrontierState>>,
}

impl Default for Frontier {
    fn default() -> Self {
        Self::new()
    }
}

impl Frontier {
    /// Creates a frontier with no scope. Every operation fails with
    /// `NotInitialized` until `initialize` is called.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(None),
        }
    }

    /// Creates a frontier already initialized for `scope`.
    pub fn for_scope(scope: &str) -> Result<Self, CrawlError> {
        let frontier = Self::new();
        frontier.initialize(scope)?;
        Ok(frontier)
    }

    /// Sets the scope and resets the queue and seen-set.
    pub fn initialize(&self, scope: &str) -> Result<(), CrawlError> {
        let scope = normalize_url(scope).map_err(|e| CrawlError::InvalidSeed {
            url: scope.to_string(),
            reason: e.to_string(),
        })?;

        *self.lock() = Some(FrontierState {
            scope,
            queue: VecDeque::new(),
            seen: HashSet::new(),
        });
        Ok(())
    }

    /// The normalized scope URL.
    pub fn scope(&self) -> Result<String, CrawlError> {
        self.with_state(|state| state.scope.clone())
    }

    /// Queues `url` unless it was ever seen before.
    ///
    /// Returns true if the URL was newly queued.
    pub fn enqueue(&self, url: &str) -> Result<bool, CrawlError> {
        self.with_state(|state| {
            // insert() returns false if the URL was already present
            if state.seen.insert(url.to_string()) {
                state.queue.push_back(url.to_string());
                true
            } else {
                false
            }
        })
    }

    /// Pops the oldest pending URL, or None when the queue is empty.
    pub fn dequeue(&self) -> Result<Option<String>, CrawlError> {
        self.with_state(|state| state.queue.pop_front())
    }

    /// Whether anything is queued right now. Workers may enqueue right after
    /// this returns false, so it is a hint, not a termination signal.
    pub fn has_pending(&self) -> Result<bool, CrawlError> {
        self.with_state(|state| !state.queue.is_empty())
    }

    /// Adds `url` to the seen-set. Idempotent.
    pub fn mark_visited(&self, url: &str) -> Result<(), CrawlError> {
        self.with_state(|state| {
            state.seen.insert(url.to_string());
        })
    }

    /// Every seen URL, sorted.
    pub fn seen_urls(&self) -> Result<Vec<String>, CrawlError> {
        self.with_state(|state| {
            let mut urls: Vec<String> = state.seen.iter().cloned().collect();
            urls.sort();
            urls
        })
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut FrontierState) -> T) -> Result<T, CrawlError> {
        let mut guard = self.lock();
        let state = guard.as_mut().ok_or(CrawlError::NotInitialized)?;
        Ok(f(state))
    }

    // A panicking worker never leaves the queue/set half-updated (each
    // critical section is a single insert+push), so a poisoned lock is safe
    // to keep using.
    fn lock(&self) -> MutexGuard<'_, Option<FrontierState>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why one Mutex around both the queue and the set?
//    - With two separately locked structures, worker A can check the set,
//      worker B can check the set, and then both push the same URL
//    - One lock makes "check + insert + push" a single step
//
// 2. Why Mutex<Option<...>>?
//    - None means "no scope yet"; every method turns that into
//      CrawlError::NotInitialized instead of panicking
//
// 3. What does HashSet::insert return?
//    - true if the value was NOT already in the set
//    - That one call is both the "seen?" check and the "mark seen" update
// -----------------------------------------------------------------------------
