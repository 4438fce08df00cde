//! Core type definitions shared across the proxy.

mod chat;
mod moderation;

pub use chat::{ChatMessage, MessageContent, MessageRole, ModelParams};
pub use moderation::{ModerationRequest, ModerationResponse, ModerationResult};
