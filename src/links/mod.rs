// src/links/mod.rs
// =============================================================================
// This module turns fetched pages into crawlable links.
//
// Submodules:
// - normalize: canonical URL form used as the dedup key everywhere
// - extract: pulls <a href> links out of a parsed page
// - validate: decides whether a link stays inside a seed's scope
//
// Everything here is pure: no shared state, no I/O. Workers call these
// functions concurrently without any locking.
// =============================================================================

mod extract;
mod normalize;
mod validate;

pub use extract::extract_links;
pub use normalize::normalize_url;
pub use validate::ScopeRules;
