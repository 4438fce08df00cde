//! Recursive type description.
//!
//! Every type that can cross the proxy boundary provides a schema node via
//! the [`Describe`] trait. Nodes form a small recursive language (primitive,
//! object, array, map, opaque) rendered to deterministic compact JSON that
//! is embedded verbatim in prompts and used as a cache key.
//!
//! Recursion over cyclic type graphs is bounded by a per-describe-call
//! guard: the first expansion of a concrete object type wins, every later
//! occurrence (and anything past the depth limit) renders as an opaque
//! terminal node.

mod describe;
mod node;
mod signature;

pub use describe::{Describe, DescribeContext};
pub(crate) use node::write_json_string;
pub use node::{Property, TypeNode};
pub(crate) use signature::response_type_name;
pub use signature::{
    method_schema, schema_text, DescribeFn, MethodSignature, ParamSpec, SchemaOptions,
};
