// src/metadata/mod.rs
// =============================================================================
// This module pulls page metadata out of parsed HTML and hands it downstream.
//
// Submodules:
// - extract: <meta name=... content=...> -> map
// - sink: where finished records go (log lines or JSON lines on stdout)
//
// The crawler never stores records itself; each one is delivered to the sink
// as soon as its page is processed.
// =============================================================================

mod extract;
mod sink;

pub use extract::{extract_metadata, MetadataRecord};
pub use sink::{JsonLinesSink, LogSink, MetadataSink};
