// src/metadata/sink.rs
// =============================================================================
// Downstream delivery of metadata records.
//
// Workers call `deliver` from many tasks at once, so sinks must be
// Send + Sync. Delivery is fire-and-forget: a sink that cannot write logs
// the problem instead of failing the crawl.
// =============================================================================

use std::io::Write;
use tracing::{info, warn};

use super::extract::MetadataRecord;

pub trait MetadataSink: Send + Sync {
    fn deliver(&self, record: MetadataRecord);
}

/// Logs every field of every record at info level.
#[derive(Debug, Default)]
pub struct LogSink;

impl MetadataSink for LogSink {
    fn deliver(&self, record: MetadataRecord) {
        info!(url = %record.url, fields = record.fields.len(), "metadata extracted");
        for (name, content) in &record.fields {
            info!(url = %record.url, "  {}: {}", name, content);
        }
    }
}

/// Writes one JSON object per record to stdout.
#[derive(Debug, Default)]
pub struct JsonLinesSink;

impl MetadataSink for JsonLinesSink {
    fn deliver(&self, record: MetadataRecord) {
        // Locking stdout keeps lines from concurrent workers whole
        let mut out = std::io::stdout().lock();
        let written = serde_json::to_writer(&mut out, &record)
            .map_err(std::io::Error::from)
            .and_then(|_| writeln!(out));

        if let Err(e) = written {
            warn!(url = %record.url, "failed to write metadata record: {}", e);
        }
    }
}
