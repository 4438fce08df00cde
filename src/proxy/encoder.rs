//! Call encoding: the deterministic protocol message sequence.
//!
//! One call becomes: a system message (fixed preamble + schema text), the
//! few-shot example pairs, then the current call's argument map. Examples
//! and the current call share one literal-rendering rule, so the model sees
//! a consistent format throughout.

use serde_json::Value;

use crate::schema::write_json_string;
use crate::types::ChatMessage;

/// Fixed protocol preamble placed before the schema in the system message.
pub(crate) const SYSTEM_PREAMBLE: &str = "You fulfill typed remote procedure calls. \
Respond only with a single structured JSON value matching the response schema below. \
Do not add commentary, code fences, or explanations. \
All parameters are optional; when information is missing, fill it in plausibly.";

/// Insertion-ordered argument map for one call.
///
/// Argument order is part of the rendered literal, so it is preserved
/// rather than sorted.
#[derive(Debug, Clone, Default)]
pub struct Arguments(Vec<(String, Value)>);

impl Arguments {
    /// Empty argument map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an argument.
    pub fn arg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.push((name.into(), value.into()));
        self
    }

    /// Number of arguments.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no arguments are set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate arguments in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Render the map as a compact JSON object literal, keys in insertion
    /// order. This is the shared literal rule for examples and calls.
    pub fn render(&self) -> String {
        let mut out = String::from("{");
        for (index, (name, value)) in self.0.iter().enumerate() {
            if index > 0 {
                out.push(',');
            }
            write_json_string(&mut out, name);
            out.push(':');
            out.push_str(&value.to_string());
        }
        out.push('}');
        out
    }
}

/// A caller-supplied few-shot example: an argument map and the exact raw
/// text the model should have produced for it.
#[derive(Debug, Clone)]
pub struct CallExample {
    /// Example arguments.
    pub arguments: Arguments,
    /// Expected raw reply text.
    pub response: String,
}

impl CallExample {
    /// Pair an argument map with its expected reply.
    pub fn new(arguments: Arguments, response: impl Into<String>) -> Self {
        Self {
            arguments,
            response: response.into(),
        }
    }
}

/// One call's encoding inputs: method name, schema text, arguments.
/// Created fresh per call and discarded when the call completes.
#[derive(Debug, Clone)]
pub struct ProxyRequest {
    /// Target operation name.
    pub method: String,
    /// Schema text for the operation.
    pub schema: String,
    /// Current argument map.
    pub arguments: Arguments,
}

/// Assemble the ordered message sequence for a request.
pub(crate) fn encode_call(request: &ProxyRequest, examples: &[CallExample]) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(2 + examples.len() * 2);
    messages.push(ChatMessage::system(format!(
        "{SYSTEM_PREAMBLE}\n\nSchema:\n{}",
        request.schema
    )));
    for example in examples {
        messages.push(ChatMessage::user(example.arguments.render()));
        messages.push(ChatMessage::assistant(example.response.clone()));
    }
    messages.push(ChatMessage::user(request.arguments.render()));
    messages
}

/// The serialized payload submitted to the moderation gate: every message
/// text in protocol order.
pub(crate) fn moderation_payload(messages: &[ChatMessage]) -> String {
    messages
        .iter()
        .map(ChatMessage::content_text)
        .collect::<Vec<_>>()
        .join("\n")
}
