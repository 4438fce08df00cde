//! External collaborator traits.
//!
//! The proxy core never talks to the network itself. Two capabilities are
//! injected behind object-safe async traits:
//!
//! - [`ChatTransport`] — sends the encoded message sequence and returns the
//!   model's raw text. Owns its own HTTP-level retry/backoff; any failure it
//!   surfaces is terminal for the current call.
//! - [`Moderation`] — pass/flag gate evaluated before the transport is
//!   invoked. A flagged payload fails the call fatally.
//!
//! Both traits are `Send + Sync` so a dispatcher can be shared across tasks
//! behind `Arc<dyn ...>`.

use async_trait::async_trait;

use crate::error::ProxyError;
use crate::types::{ChatMessage, ModelParams, ModerationRequest, ModerationResponse};

/// Sends an ordered message sequence to a chat-completion endpoint.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Submit `messages` with the given model parameters and return the raw
    /// assistant text.
    ///
    /// Implementations surface [`ProxyError::Transport`] once their own
    /// retry budget is exhausted; the dispatcher propagates it unchanged.
    async fn chat(
        &self,
        messages: Vec<ChatMessage>,
        params: &ModelParams,
    ) -> Result<String, ProxyError>;
}

/// Content-moderation precondition.
#[async_trait]
pub trait Moderation: Send + Sync {
    /// Classify the request text. A response with any flagged result causes
    /// the call to fail before the transport is invoked.
    async fn moderate(&self, request: ModerationRequest) -> Result<ModerationResponse, ProxyError>;
}
