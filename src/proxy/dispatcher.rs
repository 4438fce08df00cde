//! The dispatcher: encode → moderate → transport → extract → deserialize.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, PoisonError};

use lru::LruCache;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::encoder::{encode_call, moderation_payload, Arguments, CallExample, ProxyRequest};
use super::metrics::ProxyMetrics;
use crate::deserialize::deserialize_response;
use crate::error::ProxyError;
use crate::extract::{extract_structured, Extraction};
use crate::schema::{method_schema, Describe, DescribeContext, MethodSignature, SchemaOptions};
use crate::traits::{ChatTransport, Moderation};
use crate::types::{ModelParams, ModerationRequest};

/// Dispatcher tuning knobs.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Model parameters forwarded to the transport.
    pub params: ModelParams,
    /// How many fresh transport calls a deserialization failure may trigger
    /// beyond the first attempt.
    pub deserializer_retries: u32,
    /// Schema derivation options.
    pub schema: SchemaOptions,
    /// Validate reply shape against the declared return type before
    /// deserializing.
    pub validate_responses: bool,
    /// Capacity of the per-method schema-text cache.
    pub schema_cache_size: NonZeroUsize,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            params: ModelParams::default(),
            deserializer_retries: 3,
            schema: SchemaOptions::default(),
            validate_responses: false,
            schema_cache_size: NonZeroUsize::new(64).expect("64 is non-zero"),
        }
    }
}

/// Executes typed calls against a chat endpoint.
///
/// The dispatcher holds no call-scoped state outside each call's stack; the
/// only cross-call shared state is the atomic metrics and the schema-text
/// cache. It is safe to share behind `Arc` and call from many tasks. Each
/// call runs sequentially with no internal parallelism and no built-in
/// timeout; callers wanting either wrap the call or the transport.
pub struct ProxyDispatcher {
    transport: Arc<dyn ChatTransport>,
    moderation: Option<Arc<dyn Moderation>>,
    config: DispatcherConfig,
    metrics: ProxyMetrics,
    schema_cache: Mutex<LruCache<String, String>>,
}

impl std::fmt::Debug for ProxyDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyDispatcher")
            .field("moderation", &self.moderation.is_some())
            .field("config", &self.config)
            .field("metrics", &self.metrics)
            .finish_non_exhaustive()
    }
}

impl ProxyDispatcher {
    /// Start building a dispatcher.
    pub fn builder() -> ProxyDispatcherBuilder {
        ProxyDispatcherBuilder::new()
    }

    /// This dispatcher's metrics.
    pub fn metrics(&self) -> &ProxyMetrics {
        &self.metrics
    }

    /// Invoke `signature` with `arguments`, deserializing the reply as `R`.
    pub async fn call<R>(
        &self,
        signature: &MethodSignature,
        arguments: Arguments,
    ) -> Result<R, ProxyError>
    where
        R: Describe + DeserializeOwned,
    {
        self.call_with_examples(signature, arguments, &[]).await
    }

    /// Invoke `signature` with few-shot `examples` steering the reply
    /// format.
    ///
    /// Sequence: schema (cached) → encode → moderation gate → transport →
    /// extract → deserialize. A deserialization failure is attributed to
    /// the model and retried with a fresh transport call, up to the
    /// configured budget; the terminal error carries the last raw reply.
    pub async fn call_with_examples<R>(
        &self,
        signature: &MethodSignature,
        arguments: Arguments,
        examples: &[CallExample],
    ) -> Result<R, ProxyError>
    where
        R: Describe + DeserializeOwned,
    {
        let request = ProxyRequest {
            method: signature.name.clone(),
            schema: self.schema_for::<R>(signature),
            arguments,
        };
        let messages = encode_call(&request, examples);

        if let Some(moderation) = &self.moderation {
            let payload = moderation_payload(&messages);
            let response = moderation.moderate(ModerationRequest::new(payload)).await?;
            if response.flagged() {
                return Err(ProxyError::ModerationFlagged {
                    categories: response.flagged_categories(),
                });
            }
        }

        let input_chars: u64 = messages
            .iter()
            .map(|message| message.content_text().chars().count() as u64)
            .sum();
        let shape = self
            .config
            .validate_responses
            .then(|| DescribeContext::new(self.config.schema.max_depth).node_for::<R>());

        let attempts = self.config.deserializer_retries.saturating_add(1);
        let mut last_raw = String::new();
        for attempt in 1..=attempts {
            let raw = self
                .transport
                .chat(messages.clone(), &self.config.params)
                .await?;

            let extraction = match extract_structured(&raw) {
                Ok(extraction) => extraction,
                Err(err) => {
                    // Not fatal: feed the raw text to the deserializer and
                    // let it decide.
                    debug!(method = %request.method, error = %err, "reply has no structural delimiters");
                    Extraction::whole(&raw)
                }
            };
            self.metrics.record_discards(
                extraction.prefix.chars().count() as u64,
                extraction.suffix.chars().count() as u64,
            );

            match deserialize_response::<R>(&extraction.content, shape.as_ref()) {
                Ok(value) => {
                    self.metrics
                        .record_call(input_chars, raw.chars().count() as u64);
                    debug!(method = %request.method, attempt, "call completed");
                    return Ok(value);
                }
                Err(err) if err.is_retryable() => {
                    warn!(
                        method = %request.method,
                        attempt,
                        attempts,
                        error = %err,
                        "reply failed to deserialize"
                    );
                    last_raw = raw;
                }
                Err(err) => return Err(err),
            }
        }

        Err(ProxyError::RetriesExhausted { attempts, last_raw })
    }

    /// Cached schema text for a method, computed on first use.
    ///
    /// The key pairs the method name with the response type identity, so a
    /// signature reused under the same name with a different return type
    /// never picks up stale text.
    fn schema_for<R: Describe>(&self, signature: &MethodSignature) -> String {
        let response = crate::schema::response_type_name::<R>();
        let key = format!("{}->{response}", signature.name);
        let mut cache = self
            .schema_cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(text) = cache.get(&key) {
            debug!(method = %signature.name, "schema cache hit");
            return text.clone();
        }
        let text = method_schema::<R>(signature, &self.config.schema);
        debug!(
            method = %signature.name,
            response = %response,
            chars = text.len(),
            "schema derived"
        );
        cache.put(key, text.clone());
        text
    }
}

/// Builder for [`ProxyDispatcher`].
#[derive(Default)]
pub struct ProxyDispatcherBuilder {
    transport: Option<Arc<dyn ChatTransport>>,
    moderation: Option<Arc<dyn Moderation>>,
    config: DispatcherConfig,
}

impl ProxyDispatcherBuilder {
    /// Fresh builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the chat transport (required).
    pub fn with_transport(mut self, transport: impl ChatTransport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Set a shared chat transport (required).
    pub fn with_transport_arc(mut self, transport: Arc<dyn ChatTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Enable the moderation gate.
    pub fn with_moderation(mut self, moderation: impl Moderation + 'static) -> Self {
        self.moderation = Some(Arc::new(moderation));
        self
    }

    /// Set model parameters.
    pub fn with_params(mut self, params: ModelParams) -> Self {
        self.config.params = params;
        self
    }

    /// Set the deserialization retry budget.
    pub const fn with_deserializer_retries(mut self, retries: u32) -> Self {
        self.config.deserializer_retries = retries;
        self
    }

    /// Set schema derivation options.
    pub fn with_schema_options(mut self, options: SchemaOptions) -> Self {
        self.config.schema = options;
        self
    }

    /// Toggle reply shape validation.
    pub const fn with_validation(mut self, validate: bool) -> Self {
        self.config.validate_responses = validate;
        self
    }

    /// Build the dispatcher.
    pub fn build(self) -> Result<ProxyDispatcher, ProxyError> {
        let transport = self.transport.ok_or_else(|| {
            ProxyError::InvalidConfig("a chat transport is required".to_string())
        })?;
        let schema_cache = Mutex::new(LruCache::new(self.config.schema_cache_size));
        Ok(ProxyDispatcher {
            transport,
            moderation: self.moderation,
            config: self.config,
            metrics: ProxyMetrics::new(),
            schema_cache,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crate::types::ChatMessage;

    struct NullTransport;

    #[async_trait]
    impl ChatTransport for NullTransport {
        async fn chat(
            &self,
            _messages: Vec<ChatMessage>,
            _params: &ModelParams,
        ) -> Result<String, ProxyError> {
            Ok("{}".to_string())
        }
    }

    #[test]
    fn test_builder_requires_transport() {
        let err = ProxyDispatcher::builder().build().unwrap_err();
        assert!(matches!(err, ProxyError::InvalidConfig(_)));
    }

    #[test]
    fn test_builder_with_transport_succeeds() {
        let dispatcher = ProxyDispatcher::builder()
            .with_transport(NullTransport)
            .with_params(ModelParams::new("test-model"))
            .with_deserializer_retries(1)
            .build()
            .unwrap();
        assert_eq!(dispatcher.metrics().snapshot().calls, 0);
    }
}
