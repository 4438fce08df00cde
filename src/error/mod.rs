//! Error Handling Module
//!
//! Typed, distinguishable failures for the proxy pipeline. Local recovery
//! is limited to the deserialization retry loop in the dispatcher; every
//! other failure propagates to the caller unchanged.

mod types;

pub use types::*;
