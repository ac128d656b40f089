// src/frontier/mod.rs
// =============================================================================
// This module holds the crawl frontier: the URLs waiting to be fetched plus
// every URL ever enqueued for one crawl scope.
//
// One Frontier value is created per seed and shared (via Arc) between the
// orchestrator and its workers. There is no process-wide registry of
// frontiers: when a seed's run ends, its Frontier is dropped with it.
// =============================================================================

mod queue;

pub use queue::Frontier;
