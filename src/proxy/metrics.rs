//! Per-dispatcher call metrics.
//!
//! Counters are owned by the dispatcher instance and returned to callers
//! through [`ProxyMetrics::snapshot`]; there is no process-global state.
//! All increments are atomic, so concurrent calls never lose updates.

use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonically increasing counters for one dispatcher.
#[derive(Debug, Default)]
pub struct ProxyMetrics {
    calls: AtomicU64,
    input_chars: AtomicU64,
    output_chars: AtomicU64,
    discarded_prefix_chars: AtomicU64,
    discarded_suffix_chars: AtomicU64,
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Successful calls completed.
    pub calls: u64,
    /// Total characters sent to the transport.
    pub input_chars: u64,
    /// Total characters received from the transport.
    pub output_chars: u64,
    /// Characters discarded before extracted values.
    pub discarded_prefix_chars: u64,
    /// Characters discarded after extracted values.
    pub discarded_suffix_chars: u64,
}

impl ProxyMetrics {
    /// Fresh zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed call with its input and output sizes.
    pub fn record_call(&self, input_chars: u64, output_chars: u64) {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.input_chars.fetch_add(input_chars, Ordering::Relaxed);
        self.output_chars.fetch_add(output_chars, Ordering::Relaxed);
    }

    /// Record the prose trimmed from one reply.
    pub fn record_discards(&self, prefix_chars: u64, suffix_chars: u64) {
        self.discarded_prefix_chars
            .fetch_add(prefix_chars, Ordering::Relaxed);
        self.discarded_suffix_chars
            .fetch_add(suffix_chars, Ordering::Relaxed);
    }

    /// Copy the current counter values.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            calls: self.calls.load(Ordering::Relaxed),
            input_chars: self.input_chars.load(Ordering::Relaxed),
            output_chars: self.output_chars.load(Ordering::Relaxed),
            discarded_prefix_chars: self.discarded_prefix_chars.load(Ordering::Relaxed),
            discarded_suffix_chars: self.discarded_suffix_chars.load(Ordering::Relaxed),
        }
    }
}
