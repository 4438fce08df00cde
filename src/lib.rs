//! typecall
//!
//! A typed remote-call proxy: declare a strongly-typed method signature,
//! and each invocation is fulfilled by a chat-completion endpoint instead
//! of local code. The crate derives a compact schema for the return type,
//! encodes the call as a deterministic message sequence (system schema +
//! few-shot examples + current arguments), extracts the structured value
//! from the model's free-text reply, and deserializes it into the declared
//! return type with bounded, model-attributed retries.
//!
//! Transport (HTTP, pooling, provider auth) and moderation are external
//! collaborators behind the [`traits::ChatTransport`] and
//! [`traits::Moderation`] traits.
#![deny(unsafe_code)]

pub mod deserialize;
pub mod error;
pub mod extract;
pub mod proxy;
pub mod schema;
pub mod traits;
pub mod types;

pub use error::ProxyError;
pub use proxy::{CallExample, ProxyDispatcher, ProxyMetrics};
pub use schema::{Describe, MethodSignature, ParamSpec, TypeNode};

/// Common imports for callers of the proxy.
pub mod prelude {
    pub use crate::error::ProxyError;
    pub use crate::proxy::{Arguments, CallExample, ProxyDispatcher};
    pub use crate::schema::{Describe, MethodSignature, ParamSpec, SchemaOptions};
    pub use crate::traits::{ChatTransport, Moderation};
    pub use crate::types::{ChatMessage, MessageRole, ModelParams};
}
