//! Storage metrics collection.
//!
//! Provides functions for recording storage-related metrics.

use metrics::histogram;
use std::time::Instant;

/// Record the duration of a storage operation.
pub fn record_storage_duration(op: &'static str, key: &str, duration_secs: f64) {
    histogram!(
        "storage_operation_duration_seconds",
        "op" => op,
        "key" => key.to_string()
    )
    .record(duration_secs);
}

/// A helper to time storage operations and record metrics.
///
/// Usage:
/// ```ignore
/// let timer = StorageTimer::new("get", key);
/// let result = tokio::fs::read_to_string(path).await;
/// timer.record();
/// result
/// ```
pub struct StorageTimer {
    op: &'static str,
    key: String,
    start: Instant,
}

impl StorageTimer {
    pub fn new(op: &'static str, key: impl Into<String>) -> Self {
        Self {
            op,
            key: key.into(),
            start: Instant::now(),
        }
    }

    /// Record the elapsed duration to metrics.
    pub fn record(self) {
        let duration = self.start.elapsed().as_secs_f64();
        record_storage_duration(self.op, &self.key, duration);
    }
}
