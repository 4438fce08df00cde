//! The `Describe` trait, recursion guard, and built-in implementations.

use std::borrow::Cow;
use std::collections::HashSet;

use super::node::{Property, TypeNode};

/// Default recursion depth for schema derivation.
pub(crate) const DEFAULT_MAX_DEPTH: usize = 6;

/// A type that can describe its own schema.
///
/// Implementations are established at compile time: primitives and standard
/// containers are covered here, user structs register their members through
/// [`impl_describe_object!`](crate::impl_describe_object). There is no
/// runtime introspection.
pub trait Describe {
    /// Concrete type identity, used by the recursion guard and by opaque
    /// terminal nodes.
    fn type_name() -> Cow<'static, str>;

    /// Whether a member of this type must be present in a reply. `Option`
    /// overrides this to `false`; everything else is required.
    fn required() -> bool {
        true
    }

    /// Produce this type's schema node within `ctx`.
    fn describe(ctx: &mut DescribeContext) -> TypeNode;
}

/// State for one top-level describe operation.
///
/// Holds the depth budget and the set of object types already expanded
/// (the recursion guard). A context is created fresh per describe call and
/// must never be shared across concurrent calls; it is deliberately not
/// `Clone`.
#[derive(Debug)]
pub struct DescribeContext {
    max_depth: usize,
    depth: usize,
    described: HashSet<String>,
}

impl DescribeContext {
    /// Create a context with the given depth budget.
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth,
            depth: 0,
            described: HashSet::new(),
        }
    }

    /// Describe `T` within this context.
    pub fn node_for<T: Describe>(&mut self) -> TypeNode {
        T::describe(self)
    }

    /// Expand an object type, honoring the recursion guard and depth limit.
    ///
    /// The guard is consulted before `class` is inserted, so sibling members
    /// of a different type are never mistaken for a repeat; insertion
    /// happens before the member closure runs, so a self-reference inside
    /// the members sees the type as already expanded.
    pub fn describe_object<F>(
        &mut self,
        class: &str,
        description: Option<&str>,
        members: F,
    ) -> TypeNode
    where
        F: FnOnce(&mut Self) -> Vec<Property>,
    {
        if self.depth >= self.max_depth || self.described.contains(class) {
            return TypeNode::opaque(class);
        }
        self.described.insert(class.to_string());
        self.depth += 1;
        let properties = members(self);
        self.depth -= 1;
        TypeNode::Object {
            class: class.to_string(),
            description: description.map(str::to_string),
            properties,
        }
    }
}

impl Default for DescribeContext {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl Property {
    /// Build a member property for `T`, recursing within `ctx`.
    pub fn of<T: Describe>(
        ctx: &mut DescribeContext,
        name: &str,
        description: Option<&str>,
    ) -> Self {
        Self {
            name: name.to_string(),
            description: description.map(str::to_string),
            required: T::required(),
            node: T::describe(ctx),
        }
    }
}

macro_rules! impl_describe_primitive {
    ($($ty:ty => $name:expr),* $(,)?) => {
        $(
            impl Describe for $ty {
                fn type_name() -> Cow<'static, str> {
                    Cow::Borrowed($name)
                }

                fn describe(_ctx: &mut DescribeContext) -> TypeNode {
                    TypeNode::primitive($name)
                }
            }
        )*
    };
}

// The fixed, lower-cased primitive-name table. Primitives terminate
// recursion and never enter the guard.
impl_describe_primitive! {
    i8 => "integer",
    i16 => "integer",
    i32 => "integer",
    i64 => "integer",
    i128 => "integer",
    isize => "integer",
    u8 => "integer",
    u16 => "integer",
    u32 => "integer",
    u64 => "integer",
    u128 => "integer",
    usize => "integer",
    f32 => "number",
    f64 => "number",
    bool => "boolean",
    char => "string",
    String => "string",
    chrono::NaiveDate => "date",
    chrono::NaiveTime => "time",
    chrono::NaiveDateTime => "datetime",
    chrono::DateTime<chrono::Utc> => "datetime",
    chrono::DateTime<chrono::FixedOffset> => "datetime",
    uuid::Uuid => "uuid",
}

impl<T: Describe> Describe for Vec<T> {
    fn type_name() -> Cow<'static, str> {
        Cow::Owned(format!("array<{}>", T::type_name()))
    }

    fn describe(ctx: &mut DescribeContext) -> TypeNode {
        TypeNode::Array {
            items: Box::new(T::describe(ctx)),
        }
    }
}

impl<T: Describe, const N: usize> Describe for [T; N] {
    fn type_name() -> Cow<'static, str> {
        Cow::Owned(format!("array<{}>", T::type_name()))
    }

    fn describe(ctx: &mut DescribeContext) -> TypeNode {
        TypeNode::Array {
            items: Box::new(T::describe(ctx)),
        }
    }
}

impl<K: Describe, V: Describe, S> Describe for std::collections::HashMap<K, V, S> {
    fn type_name() -> Cow<'static, str> {
        Cow::Owned(format!("map<{},{}>", K::type_name(), V::type_name()))
    }

    fn describe(ctx: &mut DescribeContext) -> TypeNode {
        TypeNode::Map {
            keys: Box::new(K::describe(ctx)),
            values: Box::new(V::describe(ctx)),
        }
    }
}

impl<K: Describe, V: Describe> Describe for std::collections::BTreeMap<K, V> {
    fn type_name() -> Cow<'static, str> {
        Cow::Owned(format!("map<{},{}>", K::type_name(), V::type_name()))
    }

    fn describe(ctx: &mut DescribeContext) -> TypeNode {
        TypeNode::Map {
            keys: Box::new(K::describe(ctx)),
            values: Box::new(V::describe(ctx)),
        }
    }
}

// `Option` is transparent in the schema; it only flips the member's
// required flag.
impl<T: Describe> Describe for Option<T> {
    fn type_name() -> Cow<'static, str> {
        T::type_name()
    }

    fn required() -> bool {
        false
    }

    fn describe(ctx: &mut DescribeContext) -> TypeNode {
        T::describe(ctx)
    }
}

impl<T: Describe> Describe for Box<T> {
    fn type_name() -> Cow<'static, str> {
        T::type_name()
    }

    fn required() -> bool {
        T::required()
    }

    fn describe(ctx: &mut DescribeContext) -> TypeNode {
        T::describe(ctx)
    }
}

/// Register a struct's publicly visible members for schema description.
///
/// This is the explicit registration step replacing runtime reflection:
/// the struct itself stays an ordinary `serde` type, the macro provides its
/// [`Describe`] implementation. Field order in the macro is the property
/// order in the schema.
///
/// ```rust,ignore
/// use typecall::impl_describe_object;
///
/// #[derive(serde::Deserialize)]
/// struct Sentiment {
///     label: String,
///     confidence: f64,
/// }
///
/// impl_describe_object!(Sentiment, "polarity judgement for a text", {
///     label: String => "one of positive, negative, neutral",
///     confidence: f64,
/// });
/// ```
#[macro_export]
macro_rules! impl_describe_object {
    ($ty:ident { $($field:ident : $ftype:ty $(=> $fdesc:literal)?),* $(,)? }) => {
        $crate::impl_describe_object!(@impl $ty, None, { $($field : $ftype $(=> $fdesc)?),* });
    };
    ($ty:ident, $desc:literal, { $($field:ident : $ftype:ty $(=> $fdesc:literal)?),* $(,)? }) => {
        $crate::impl_describe_object!(@impl $ty, Some($desc), { $($field : $ftype $(=> $fdesc)?),* });
    };
    (@impl $ty:ident, $desc:expr, { $($field:ident : $ftype:ty $(=> $fdesc:literal)?),* }) => {
        impl $crate::schema::Describe for $ty {
            fn type_name() -> std::borrow::Cow<'static, str> {
                std::borrow::Cow::Borrowed(stringify!($ty))
            }

            fn describe(
                ctx: &mut $crate::schema::DescribeContext,
            ) -> $crate::schema::TypeNode {
                ctx.describe_object(stringify!($ty), $desc, |ctx| {
                    vec![
                        $(
                            $crate::schema::Property::of::<$ftype>(
                                ctx,
                                stringify!($field),
                                None $( .or(Some($fdesc)) )?,
                            ),
                        )*
                    ]
                })
            }
        }
    };
}
