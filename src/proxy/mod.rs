//! Call orchestration: encoding, dispatch, and per-dispatcher metrics.

mod dispatcher;
mod encoder;
mod metrics;

pub use dispatcher::{DispatcherConfig, ProxyDispatcher, ProxyDispatcherBuilder};
pub use encoder::{Arguments, CallExample, ProxyRequest};
pub use metrics::{MetricsSnapshot, ProxyMetrics};
