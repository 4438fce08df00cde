//! Schema derivation properties over a realistic type graph.

use std::collections::HashMap;

use typecall::impl_describe_object;
use typecall::schema::{
    method_schema, schema_text, Describe, DescribeContext, MethodSignature, ParamSpec,
    SchemaOptions, TypeNode,
};

#[allow(dead_code)]
struct Address {
    street: String,
    city: String,
    country: Option<String>,
}

impl_describe_object!(Address {
    street: String,
    city: String,
    country: Option<String>,
});

#[allow(dead_code)]
struct Customer {
    id: uuid::Uuid,
    name: String,
    signed_up: chrono::NaiveDate,
    addresses: Vec<Address>,
    preferences: HashMap<String, String>,
    referred_by: Option<Box<Customer>>,
}

impl_describe_object!(Customer, "a registered customer", {
    id: uuid::Uuid,
    name: String => "display name",
    signed_up: chrono::NaiveDate,
    addresses: Vec<Address>,
    preferences: HashMap<String, String>,
    referred_by: Option<Box<Customer>>,
});

#[test]
fn primitives_describe_as_leaves() {
    let mut ctx = DescribeContext::default();
    assert!(ctx.node_for::<u8>().is_terminal());
    assert!(ctx.node_for::<i128>().is_terminal());
    assert!(ctx.node_for::<f32>().is_terminal());
    assert!(ctx.node_for::<char>().is_terminal());
    assert!(ctx.node_for::<chrono::NaiveTime>().is_terminal());
    assert!(ctx.node_for::<chrono::DateTime<chrono::Utc>>().is_terminal());
}

#[test]
fn cyclic_type_graph_terminates_with_opaque_node() {
    let node = DescribeContext::default().node_for::<Customer>();
    let TypeNode::Object { properties, .. } = &node else {
        panic!("expected object");
    };
    let referred_by = properties.last().unwrap();
    assert_eq!(referred_by.name, "referred_by");
    assert!(!referred_by.required);
    assert_eq!(referred_by.node, TypeNode::opaque("Customer"));
}

#[test]
fn nested_object_expands_exactly_once() {
    let text = schema_text::<Customer>(8);
    assert_eq!(text.matches(r#""class":"Address""#).count(), 1);
    // One full expansion with properties, the cycle back-reference opaque.
    assert_eq!(text.matches(r#""class":"Customer""#).count(), 2);
    assert_eq!(text.matches(r#""properties""#).count(), 2);
}

#[test]
fn collections_render_as_array_and_map_nodes() {
    let text = schema_text::<Customer>(8);
    assert!(text.contains(r#""addresses":{"type":"array","items":{"type":"object","class":"Address""#));
    assert!(text.contains(
        r#""preferences":{"type":"map","keys":{"type":"string"},"values":{"type":"string"}}"#
    ));
}

#[test]
fn depth_budget_abbreviates_deep_graphs() {
    // Depth 1 expands Customer itself but nothing nested.
    let text = schema_text::<Customer>(1);
    assert!(text.contains(r#""addresses":{"type":"array","items":{"type":"object","class":"Address"}}"#));
    assert!(!text.contains(r#""street""#));
}

#[test]
fn schema_text_is_stable_across_invocations() {
    assert_eq!(schema_text::<Customer>(6), schema_text::<Customer>(6));

    let signature = MethodSignature::new("lookup_customer")
        .with_param(ParamSpec::of::<String>("name"));
    let options = SchemaOptions::default();
    assert_eq!(
        method_schema::<Customer>(&signature, &options),
        method_schema::<Customer>(&signature, &options)
    );
}

#[test]
fn fresh_contexts_do_not_share_the_recursion_guard() {
    // A second describe in a new context expands the type again instead of
    // seeing it as already described.
    let first = DescribeContext::default().node_for::<Address>();
    let second = DescribeContext::default().node_for::<Address>();
    assert!(matches!(first, TypeNode::Object { .. }));
    assert_eq!(first, second);
}

#[test]
fn operation_descriptor_lists_parameters_in_order() {
    let signature = MethodSignature::new("register")
        .with_description("create a customer record")
        .with_param(ParamSpec::of::<String>("name").with_description("display name"))
        .with_param(ParamSpec::of::<Option<Address>>("address"));
    let schema = method_schema::<Customer>(&signature, &SchemaOptions::default());

    let name_at = schema.find(r#""name":{"type":"string""#).unwrap();
    let address_at = schema.find(r#""address":"#).unwrap();
    assert!(name_at < address_at);
    assert!(schema.contains(r#""operation":"register""#));
    assert!(schema.contains(r#""description":"create a customer record""#));
    // Optional parameter carries the optionality flag.
    assert!(schema.contains(r#""required":false"#));
}

#[test]
fn described_type_name_matches_struct_name() {
    assert_eq!(Customer::type_name(), "Customer");
    assert_eq!(<Vec<Address> as Describe>::type_name(), "array<Address>");
    assert_eq!(<Option<Customer> as Describe>::type_name(), "Customer");
}
