//! Core error types for the proxy pipeline.

use thiserror::Error;

/// All failures the proxy can surface to a caller.
#[derive(Error, Debug)]
pub enum ProxyError {
    /// A type cannot be turned into a schema (unsupported member kind,
    /// signature misuse). Fatal, never retried.
    #[error("Schema error: {0}")]
    Schema(String),

    /// The moderation gate flagged the outgoing payload. Fatal; the
    /// transport is never invoked for a flagged call.
    #[error("Moderation flagged payload: {}", categories.join(", "))]
    ModerationFlagged {
        /// Categories the moderation collaborator reported as flagged.
        categories: Vec<String>,
    },

    /// Transport failure surfaced after the transport's own retry budget.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The raw reply contains no structural delimiters. The dispatcher
    /// downgrades this and still attempts deserialization of the raw text.
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// The extracted text failed to parse or validate against the declared
    /// return type. Attributed to the model's output, so the dispatcher
    /// retries with a fresh call.
    #[error("Deserialization error: {message}")]
    Deserialization {
        /// Parser or validator diagnostic.
        message: String,
        /// The raw reply the failure was observed on.
        raw: String,
    },

    /// The deserialization retry budget is exhausted. Terminal; carries the
    /// last raw reply for diagnostics.
    #[error("Deserialization retries exhausted after {attempts} attempts")]
    RetriesExhausted {
        /// Total transport calls made (initial call plus retries).
        attempts: u32,
        /// Raw reply from the final attempt.
        last_raw: String,
    },

    /// Dispatcher construction failed (e.g. no transport supplied).
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Coarse classification used for logging and caller-side policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Caller-side misuse: schema or configuration problems.
    Usage,
    /// Refused by the moderation precondition.
    Moderation,
    /// Network or provider failure.
    Transport,
    /// The model's reply could not be turned into a typed value.
    Response,
}

impl ProxyError {
    /// Shorthand for a deserialization failure on a given raw reply.
    pub fn deserialization(message: impl Into<String>, raw: impl Into<String>) -> Self {
        Self::Deserialization {
            message: message.into(),
            raw: raw.into(),
        }
    }

    /// Classify this error.
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Schema(_) | Self::InvalidConfig(_) => ErrorCategory::Usage,
            Self::ModerationFlagged { .. } => ErrorCategory::Moderation,
            Self::Transport(_) => ErrorCategory::Transport,
            Self::Extraction(_) | Self::Deserialization { .. } | Self::RetriesExhausted { .. } => {
                ErrorCategory::Response
            }
        }
    }

    /// Whether the dispatcher's retry loop may act on this error.
    ///
    /// Only deserialization failures are retryable: a malformed reply is
    /// attributed to the model, not to a transient bug on our side.
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Deserialization { .. })
    }

    /// The raw model reply attached to this error, if any.
    pub fn raw_reply(&self) -> Option<&str> {
        match self {
            Self::Deserialization { raw, .. } => Some(raw),
            Self::RetriesExhausted { last_raw, .. } => Some(last_raw),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ProxyError {
    fn from(err: serde_json::Error) -> Self {
        Self::Deserialization {
            message: err.to_string(),
            raw: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        assert_eq!(
            ProxyError::Schema("bad".into()).category(),
            ErrorCategory::Usage
        );
        assert_eq!(
            ProxyError::ModerationFlagged { categories: vec![] }.category(),
            ErrorCategory::Moderation
        );
        assert_eq!(
            ProxyError::Transport("down".into()).category(),
            ErrorCategory::Transport
        );
        assert_eq!(
            ProxyError::deserialization("bad", "raw").category(),
            ErrorCategory::Response
        );
    }

    #[test]
    fn test_only_deserialization_is_retryable() {
        assert!(ProxyError::deserialization("bad", "raw").is_retryable());
        assert!(!ProxyError::Transport("down".into()).is_retryable());
        assert!(!ProxyError::ModerationFlagged { categories: vec![] }.is_retryable());
        assert!(!ProxyError::RetriesExhausted {
            attempts: 3,
            last_raw: "x".into()
        }
        .is_retryable());
    }

    #[test]
    fn test_raw_reply_carried() {
        let err = ProxyError::RetriesExhausted {
            attempts: 4,
            last_raw: "not json".into(),
        };
        assert_eq!(err.raw_reply(), Some("not json"));
        assert_eq!(ProxyError::Transport("down".into()).raw_reply(), None);
    }
}
