//! Macros for building schemas with less ceremony.
//!
//! # Available Macros
//!
//! - [`object!`]: object schema from `key => schema` pairs
//! - [`any_of!`]: flat union of its arguments
//! - [`all_of!`]: flat intersection of its arguments
//!
//! # Examples
//!
//! ```
//! use nebula_schema::prelude::*;
//! use nebula_schema::{any_of, object};
//! use serde_json::json;
//!
//! let event = object! {
//!     "id" => any_of![string().uuid(), number().int().positive()],
//!     "at" => date().coerce(),
//! };
//! assert!(event.is(&json!({"id": 7, "at": "2024-01-15T10:30:00Z"}).into()));
//! ```

// ============================================================================
// OBJECT MACRO
// ============================================================================

/// Builds an [`ObjectSchema`](crate::ObjectSchema) from `key => schema`
/// pairs, in order. The result is still a builder.
///
/// ```
/// use nebula_schema::prelude::*;
///
/// let point = nebula_schema::object! { "x" => number(), "y" => number() }.strict();
/// assert_eq!(point.keys().collect::<Vec<_>>(), vec!["x", "y"]);
/// ```
#[macro_export]
macro_rules! object {
    () => {
        $crate::schema::object()
    };
    ($($key:expr => $schema:expr),+ $(,)?) => {
        $crate::schema::object()$(.field($key, $schema))+
    };
}

// ============================================================================
// ANY_OF MACRO
// ============================================================================

/// One union over all arguments, tried in order.
///
/// Unlike chained [`or`](crate::SchemaExt::or) calls, the union is flat:
/// a total mismatch reports one nested error group per argument.
///
/// ```
/// use nebula_schema::prelude::*;
///
/// let id = nebula_schema::any_of![literal("auto"), string().uuid(), number().int()];
/// let errors = id.validate(&Value::from(true)).unwrap_err();
/// assert_eq!(errors.first().nested.len(), 3);
/// ```
#[macro_export]
macro_rules! any_of {
    ($first:expr $(,)?) => {
        $crate::Schema::from($first)
    };
    ($first:expr, $($rest:expr),+ $(,)?) => {
        $crate::__private::union(
            $crate::Schema::from($first),
            ::std::vec![$($crate::Schema::from($rest)),+],
        )
    };
}

// ============================================================================
// ALL_OF MACRO
// ============================================================================

/// One intersection over all arguments.
///
/// ```
/// use nebula_schema::prelude::*;
/// use serde_json::json;
///
/// let entity = nebula_schema::all_of![
///     object().field("id", number()).passthrough(),
///     object().field("name", string()).passthrough(),
/// ];
/// assert!(entity.is(&json!({"id": 1, "name": "x"}).into()));
/// assert_eq!(entity.validate(&json!({}).into()).unwrap_err().len(), 2);
/// ```
#[macro_export]
macro_rules! all_of {
    ($first:expr $(,)?) => {
        $crate::Schema::from($first)
    };
    ($first:expr, $second:expr $(, $rest:expr)* $(,)?) => {
        $crate::__private::intersection(
            $crate::Schema::from($first),
            $crate::Schema::from($second),
            ::std::vec![$($crate::Schema::from($rest)),*],
        )
    };
}

#[doc(hidden)]
pub mod __private {
    use crate::combinators::{IntersectionSchema, UnionSchema};
    use crate::schema::Schema;

    #[must_use]
    pub fn union(first: Schema, rest: Vec<Schema>) -> Schema {
        UnionSchema::non_empty(first, rest).into()
    }

    #[must_use]
    pub fn intersection(first: Schema, second: Schema, rest: Vec<Schema>) -> Schema {
        IntersectionSchema::from_parts(first, second, rest).into()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use crate::foundation::{ErrorCode, Validate};
    use crate::schema::{SchemaExt, SchemaKind, literal, number, string};
    use crate::value::Value;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_object_macro_keeps_order() {
        let schema = object! {
            "b" => number(),
            "a" => string().optional(),
        };
        assert_eq!(schema.keys().collect::<Vec<_>>(), vec!["b", "a"]);
        assert!(schema.is(&json!({"b": 1}).into()));
    }

    #[test]
    fn test_any_of_single_is_passthrough() {
        let schema = any_of![number()];
        assert!(matches!(schema.kind(), SchemaKind::Number(_)));
    }

    #[test]
    fn test_any_of_is_flat() {
        let schema = any_of![literal(1), literal(2), literal(3)];
        let SchemaKind::Union(union) = schema.kind() else {
            panic!("expected a union");
        };
        assert_eq!(union.options().len(), 3);
        assert!(schema.is(&Value::from(3)));

        let errors = schema.validate(&Value::from(4)).unwrap_err();
        assert_eq!(errors.codes(), vec![ErrorCode::UnionNoMatch]);
        assert_eq!(errors.first().nested.len(), 3);
    }

    #[test]
    fn test_all_of_collects_every_member() {
        let schema = all_of![number().int(), number().positive(), number().lt(10.0)];
        assert!(schema.is(&Value::from(3)));
        assert_eq!(
            schema.validate(&Value::from(-1.5)).unwrap_err().codes(),
            vec![ErrorCode::NumberNotInteger, ErrorCode::NumberNotPositive]
        );
    }
}
