//! Schema node representation and its deterministic textual form.

/// A named member of an object node.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    /// Member name as it appears in the serialized value.
    pub name: String,
    /// Free-text documentation attached to the member.
    pub description: Option<String>,
    /// Whether a well-formed reply must include this member.
    pub required: bool,
    /// The member's own schema.
    pub node: TypeNode,
}

/// Recursive schema representation of a type.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeNode {
    /// Terminal node for a primitive type ("integer", "string", ...).
    Primitive {
        /// Lower-cased primitive name from the fixed table.
        name: &'static str,
    },
    /// A named type with ordered member properties.
    Object {
        /// Concrete type name.
        class: String,
        /// Free-text documentation for the type.
        description: Option<String>,
        /// Members in declaration order.
        properties: Vec<Property>,
    },
    /// A sequence; all elements share one item schema.
    Array {
        /// Element schema.
        items: Box<TypeNode>,
    },
    /// An associative collection.
    Map {
        /// Key schema.
        keys: Box<TypeNode>,
        /// Value schema.
        values: Box<TypeNode>,
    },
    /// Terminal stand-in for a type that was already expanded in this
    /// describe call or whose expansion would exceed the depth limit.
    Opaque {
        /// Concrete type name.
        class: String,
    },
}

/// Property metadata injected into a rendered node.
struct Annotation<'a> {
    description: Option<&'a str>,
    required: bool,
}

impl TypeNode {
    /// Terminal primitive node.
    pub const fn primitive(name: &'static str) -> Self {
        Self::Primitive { name }
    }

    /// Terminal opaque node for `class`.
    pub fn opaque(class: impl Into<String>) -> Self {
        Self::Opaque {
            class: class.into(),
        }
    }

    /// True for nodes that never carry children.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Primitive { .. } | Self::Opaque { .. })
    }

    /// Render this node as compact JSON.
    ///
    /// The writer walks the node directly instead of going through a JSON
    /// map type, so property order is declaration order and identical nodes
    /// always produce byte-identical text.
    pub fn to_schema_text(&self) -> String {
        let mut out = String::new();
        self.write(&mut out, None);
        out
    }

    fn write(&self, out: &mut String, annotation: Option<&Annotation<'_>>) {
        match self {
            Self::Primitive { name } => {
                out.push_str("{\"type\":\"");
                out.push_str(name);
                out.push('"');
                Self::write_annotation(out, annotation);
                out.push('}');
            }
            Self::Object {
                class,
                description,
                properties,
            } => {
                out.push_str("{\"type\":\"object\",\"class\":");
                write_json_string(out, class);
                if let Some(text) = description {
                    out.push_str(",\"description\":");
                    write_json_string(out, text);
                }
                Self::write_annotation(out, annotation);
                out.push_str(",\"properties\":{");
                for (index, property) in properties.iter().enumerate() {
                    if index > 0 {
                        out.push(',');
                    }
                    write_json_string(out, &property.name);
                    out.push(':');
                    property.node.write(
                        out,
                        Some(&Annotation {
                            description: property.description.as_deref(),
                            required: property.required,
                        }),
                    );
                }
                out.push_str("}}");
            }
            Self::Array { items } => {
                out.push_str("{\"type\":\"array\"");
                Self::write_annotation(out, annotation);
                out.push_str(",\"items\":");
                items.write(out, None);
                out.push('}');
            }
            Self::Map { keys, values } => {
                out.push_str("{\"type\":\"map\"");
                Self::write_annotation(out, annotation);
                out.push_str(",\"keys\":");
                keys.write(out, None);
                out.push_str(",\"values\":");
                values.write(out, None);
                out.push('}');
            }
            Self::Opaque { class } => {
                out.push_str("{\"type\":\"object\",\"class\":");
                write_json_string(out, class);
                Self::write_annotation(out, annotation);
                out.push('}');
            }
        }
    }

    fn write_annotation(out: &mut String, annotation: Option<&Annotation<'_>>) {
        if let Some(annotation) = annotation {
            if let Some(text) = annotation.description {
                out.push_str(",\"description\":");
                write_json_string(out, text);
            }
            // Optional-unless-required convention: the flag only appears
            // when a member may be omitted.
            if !annotation.required {
                out.push_str(",\"required\":false");
            }
        }
    }

    /// Render a property node with its annotations, outside an enclosing
    /// object (used for operation parameter lists).
    pub(crate) fn write_annotated(
        &self,
        out: &mut String,
        description: Option<&str>,
        required: bool,
    ) {
        self.write(
            out,
            Some(&Annotation {
                description,
                required,
            }),
        );
    }
}

/// Append `text` to `out` as a JSON string literal.
pub(crate) fn write_json_string(out: &mut String, text: &str) {
    out.push('"');
    for ch in text.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_rendering() {
        assert_eq!(
            TypeNode::primitive("integer").to_schema_text(),
            r#"{"type":"integer"}"#
        );
    }

    #[test]
    fn test_opaque_rendering() {
        assert_eq!(
            TypeNode::opaque("Person").to_schema_text(),
            r#"{"type":"object","class":"Person"}"#
        );
    }

    #[test]
    fn test_object_rendering_preserves_declaration_order() {
        let node = TypeNode::Object {
            class: "Person".into(),
            description: None,
            properties: vec![
                Property {
                    name: "zname".into(),
                    description: None,
                    required: true,
                    node: TypeNode::primitive("string"),
                },
                Property {
                    name: "age".into(),
                    description: Some("age in years".into()),
                    required: false,
                    node: TypeNode::primitive("integer"),
                },
            ],
        };
        assert_eq!(
            node.to_schema_text(),
            r#"{"type":"object","class":"Person","properties":{"zname":{"type":"string"},"age":{"type":"integer","description":"age in years","required":false}}}"#
        );
    }

    #[test]
    fn test_array_and_map_rendering() {
        let array = TypeNode::Array {
            items: Box::new(TypeNode::primitive("number")),
        };
        assert_eq!(
            array.to_schema_text(),
            r#"{"type":"array","items":{"type":"number"}}"#
        );

        let map = TypeNode::Map {
            keys: Box::new(TypeNode::primitive("string")),
            values: Box::new(TypeNode::primitive("boolean")),
        };
        assert_eq!(
            map.to_schema_text(),
            r#"{"type":"map","keys":{"type":"string"},"values":{"type":"boolean"}}"#
        );
    }

    #[test]
    fn test_json_string_escaping() {
        let mut out = String::new();
        write_json_string(&mut out, "a \"quoted\"\nline\t\\");
        assert_eq!(out, r#""a \"quoted\"\nline\t\\""#);
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let node = TypeNode::Object {
            class: "Wrapper".into(),
            description: Some("holds things".into()),
            properties: vec![Property {
                name: "values".into(),
                description: None,
                required: true,
                node: TypeNode::Array {
                    items: Box::new(TypeNode::primitive("string")),
                },
            }],
        };
        assert_eq!(node.to_schema_text(), node.to_schema_text());
    }
}
