//! Result deserialization and optional shape validation.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ProxyError;
use crate::schema::TypeNode;

/// Parse `text` into `R`, optionally validating its top-level shape against
/// `shape` first.
///
/// Every structural mismatch surfaces as [`ProxyError::Deserialization`]
/// carrying the raw text, so the dispatcher's retry loop can attribute the
/// failure to the model and issue a fresh call.
pub fn deserialize_response<R: DeserializeOwned>(
    text: &str,
    shape: Option<&TypeNode>,
) -> Result<R, ProxyError> {
    let value: Value = serde_json::from_str(text)
        .map_err(|err| ProxyError::deserialization(err.to_string(), text))?;

    if let Some(shape) = shape {
        validate_shape(&value, shape).map_err(|message| ProxyError::deserialization(message, text))?;
    }

    serde_json::from_value(value).map_err(|err| ProxyError::deserialization(err.to_string(), text))
}

/// Check a parsed value against the declared top-level shape.
///
/// For object shapes: every required property must be present, and no key
/// outside the declared property set may appear. Nested members are left to
/// `serde`; the model's most common failure modes (invented wrapper keys,
/// dropped fields) are all top-level.
fn validate_shape(value: &Value, shape: &TypeNode) -> Result<(), String> {
    match shape {
        TypeNode::Object {
            class, properties, ..
        } => {
            let Value::Object(map) = value else {
                return Err(format!("expected a {class} object, got {}", kind_of(value)));
            };
            for property in properties {
                if property.required && !map.contains_key(&property.name) {
                    return Err(format!(
                        "missing required field \"{}\" for {class}",
                        property.name
                    ));
                }
            }
            for key in map.keys() {
                if !properties.iter().any(|p| &p.name == key) {
                    return Err(format!("unexpected field \"{key}\" for {class}"));
                }
            }
            Ok(())
        }
        TypeNode::Array { .. } => match value {
            Value::Array(_) => Ok(()),
            other => Err(format!("expected an array, got {}", kind_of(other))),
        },
        TypeNode::Map { .. } => match value {
            Value::Object(_) => Ok(()),
            other => Err(format!("expected a map, got {}", kind_of(other))),
        },
        // Primitive and opaque shapes carry nothing to check here; serde
        // does the real work.
        TypeNode::Primitive { .. } | TypeNode::Opaque { .. } => Ok(()),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
