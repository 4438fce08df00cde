//! Method signatures and per-method schema text.

use std::borrow::Cow;

use super::describe::{Describe, DescribeContext, DEFAULT_MAX_DEPTH};
use super::node::{write_json_string, TypeNode};

/// Function that produces a schema node for some type within a context.
///
/// Stored as a plain function pointer so [`ParamSpec`] stays non-generic
/// and signatures can be built once and shared.
pub type DescribeFn = fn(&mut DescribeContext) -> TypeNode;

/// One declared parameter of a proxied method.
#[derive(Debug, Clone)]
pub struct ParamSpec {
    /// Parameter name as rendered in argument maps.
    pub name: String,
    /// Free-text documentation attached to the parameter node.
    pub description: Option<String>,
    required: bool,
    describe: DescribeFn,
}

impl ParamSpec {
    /// Declare a parameter of type `T`.
    pub fn of<T: Describe>(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            required: T::required(),
            describe: T::describe,
        }
    }

    /// Attach free-text documentation.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    fn node(&self, ctx: &mut DescribeContext) -> TypeNode {
        (self.describe)(ctx)
    }
}

/// An immutable description of one proxied method: name, ordered
/// parameters, and optional documentation. The return type is supplied at
/// the call site as a generic parameter.
#[derive(Debug, Clone)]
pub struct MethodSignature {
    /// Operation name sent to the model.
    pub name: String,
    /// Free-text documentation for the operation.
    pub description: Option<String>,
    /// Parameters in declaration order.
    pub params: Vec<ParamSpec>,
}

impl MethodSignature {
    /// Start a signature for `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            params: Vec::new(),
        }
    }

    /// Attach free-text documentation.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Append a parameter.
    pub fn with_param(mut self, param: ParamSpec) -> Self {
        self.params.push(param);
        self
    }
}

/// Controls schema derivation for a method.
#[derive(Debug, Clone)]
pub struct SchemaOptions {
    /// Recursion depth budget per describe operation.
    pub max_depth: usize,
    /// Whether the operation descriptor (name, parameters) is included, or
    /// only the bare response schema.
    pub include_operations: bool,
}

impl Default for SchemaOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            include_operations: true,
        }
    }
}

/// Schema text for a bare type, outside any method context.
pub fn schema_text<T: Describe>(max_depth: usize) -> String {
    DescribeContext::new(max_depth)
        .node_for::<T>()
        .to_schema_text()
}

/// Render the schema text for one method with response type `R`.
///
/// One [`DescribeContext`] spans the whole render, so a type reached from
/// two parameters (or from a parameter and the response) expands only once.
/// Identical inputs always produce identical text; the dispatcher caches
/// the result keyed by method name.
pub fn method_schema<R: Describe>(signature: &MethodSignature, options: &SchemaOptions) -> String {
    let mut ctx = DescribeContext::new(options.max_depth);

    if !options.include_operations {
        return ctx.node_for::<R>().to_schema_text();
    }

    let mut out = String::new();
    out.push_str("{\"type\":\"object\",\"operations\":[{\"operation\":");
    write_json_string(&mut out, &signature.name);
    if let Some(description) = &signature.description {
        out.push_str(",\"description\":");
        write_json_string(&mut out, description);
    }
    out.push_str(",\"parameters\":{");
    for (index, param) in signature.params.iter().enumerate() {
        if index > 0 {
            out.push(',');
        }
        write_json_string(&mut out, &param.name);
        out.push(':');
        let node = param.node(&mut ctx);
        node.write_annotated(&mut out, param.description.as_deref(), param.required);
    }
    out.push_str("},\"response\":");
    out.push_str(&ctx.node_for::<R>().to_schema_text());
    out.push_str("}]}");
    out
}

/// Type identity helper for diagnostics.
pub(crate) fn response_type_name<R: Describe>() -> Cow<'static, str> {
    R::type_name()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impl_describe_object;

    #[allow(dead_code)]
    struct Verdict {
        label: String,
        score: f64,
    }

    impl_describe_object!(Verdict, "classification outcome", {
        label: String,
        score: f64 => "confidence in [0,1]",
    });

    fn sentiment_signature() -> MethodSignature {
        MethodSignature::new("classify_sentiment")
            .with_description("judge the polarity of a text")
            .with_param(ParamSpec::of::<String>("text").with_description("the text to judge"))
            .with_param(ParamSpec::of::<Option<String>>("language"))
    }

    #[test]
    fn test_method_schema_contains_operation_and_response() {
        let schema = method_schema::<Verdict>(&sentiment_signature(), &SchemaOptions::default());
        assert!(schema.starts_with(r#"{"type":"object","operations":[{"operation":"classify_sentiment""#));
        assert!(schema.contains(r#""description":"judge the polarity of a text""#));
        assert!(schema.contains(r#""text":{"type":"string","description":"the text to judge"}"#));
        assert!(schema.contains(r#""language":{"type":"string","required":false}"#));
        assert!(schema.contains(r#""response":{"type":"object","class":"Verdict""#));
        assert!(schema.ends_with("}]}"));
    }

    #[test]
    fn test_response_only_schema() {
        let options = SchemaOptions {
            include_operations: false,
            ..SchemaOptions::default()
        };
        let schema = method_schema::<Verdict>(&sentiment_signature(), &options);
        assert!(schema.starts_with(r#"{"type":"object","class":"Verdict""#));
        assert!(!schema.contains("operations"));
    }

    #[test]
    fn test_method_schema_is_deterministic() {
        let signature = sentiment_signature();
        let options = SchemaOptions::default();
        assert_eq!(
            method_schema::<Verdict>(&signature, &options),
            method_schema::<Verdict>(&signature, &options)
        );
    }

    #[test]
    fn test_shared_type_expands_once_per_schema() {
        let signature = MethodSignature::new("echo")
            .with_param(ParamSpec::of::<Verdict>("previous"));
        let schema = method_schema::<Verdict>(&signature, &SchemaOptions::default());
        // The parameter expands Verdict; the response node must be opaque.
        assert!(schema.contains(r#""response":{"type":"object","class":"Verdict"}"#));
        assert_eq!(schema.matches(r#""properties""#).count(), 1);
    }
}
