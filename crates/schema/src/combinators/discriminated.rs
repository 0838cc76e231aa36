//! DISCRIMINATED UNION combinator - dispatch on a tag field
//!
//! Every option is an object schema whose tag field is a literal (or an
//! enumeration of literals). The tag -> option table is built once, at
//! construction, so validation is a single lookup instead of trying each
//! option in turn.

use std::collections::HashMap;

use crate::combinators::object::object_gate;
use crate::foundation::{
    ErrorCode, SchemaError, Validate, ValidationContext, ValidationErrors, ValidationResult,
};
use crate::schema::{Schema, SchemaKind};
use crate::value::Value;

/// Tagged union of object schemas.
///
/// ```
/// use nebula_schema::prelude::*;
/// use serde_json::json;
///
/// let shape = discriminated_union("type", [
///     object().field("type", literal("circle")).field("radius", number()).into(),
///     object().field("type", literal("square")).field("side", number()).into(),
/// ])
/// .unwrap();
///
/// assert!(shape.is(&json!({"type": "circle", "radius": 1}).into()));
/// let errors = shape.validate(&json!({"type": "hexagon"}).into()).unwrap_err();
/// assert_eq!(errors.len(), 1);
/// assert_eq!(errors.first().path, "type");
/// ```
#[derive(Debug, Clone)]
pub struct DiscriminatedUnionSchema {
    key: String,
    options: Vec<Schema>,
    tags: Vec<Value>,
    lookup: HashMap<String, usize>,
}

fn tag_values(option: &Schema, index: usize, key: &str) -> Result<Vec<Value>, SchemaError> {
    let SchemaKind::Object(object) = option.kind() else {
        return Err(SchemaError::DiscriminatorNotObject { index });
    };
    let missing = || SchemaError::MissingDiscriminator {
        index,
        key: key.to_owned(),
    };
    let field = object.shape().get(key).ok_or_else(missing)?;
    let values = match field.kind() {
        SchemaKind::Literal(literal) => vec![literal.value().clone()],
        SchemaKind::Enum(enumeration) => enumeration.values().to_vec(),
        _ => return Err(missing()),
    };
    if values.iter().all(|v| v.literal_key().is_some()) {
        Ok(values)
    } else {
        Err(missing())
    }
}

impl DiscriminatedUnionSchema {
    /// # Errors
    ///
    /// - [`SchemaError::EmptyUnion`] without options
    /// - [`SchemaError::DiscriminatorNotObject`] for a non-object option
    /// - [`SchemaError::MissingDiscriminator`] when an option's tag field is
    ///   absent or not a literal
    /// - [`SchemaError::DuplicateDiscriminator`] when two options share a tag
    pub fn new<I>(key: impl Into<String>, options: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = Schema>,
    {
        let key = key.into();
        let options: Vec<Schema> = options.into_iter().collect();
        if options.is_empty() {
            return Err(SchemaError::EmptyUnion);
        }

        let mut lookup = HashMap::new();
        let mut tags = Vec::new();
        for (index, option) in options.iter().enumerate() {
            for tag in tag_values(option, index, &key)? {
                let Some(lookup_key) = tag.literal_key() else {
                    continue;
                };
                if lookup.insert(lookup_key, index).is_some() {
                    return Err(SchemaError::DuplicateDiscriminator {
                        value: tag.describe(),
                    });
                }
                tags.push(tag);
            }
        }

        tracing::debug!(
            key = %key,
            options = options.len(),
            tags = tags.len(),
            "built discriminator lookup"
        );

        Ok(Self {
            key,
            options,
            tags,
            lookup,
        })
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn options(&self) -> &[Schema] {
        &self.options
    }

    /// Picks the option for `value`'s tag, or reports why none applies.
    pub(crate) fn select(
        &self,
        value: &Value,
        ctx: &ValidationContext<'_>,
    ) -> Result<&Schema, ValidationErrors> {
        let input = object_gate(value, ctx)?;
        let at_key = ctx.key(&self.key);
        let tag = match input.get(&self.key) {
            Some(tag) if !tag.is_undefined() => tag,
            _ => {
                return Err(at_key
                    .error(ErrorCode::ObjectMissingKey, [("key", self.key.clone())])
                    .into());
            }
        };

        tag.literal_key()
            .and_then(|lookup_key| self.lookup.get(&lookup_key))
            .map(|&index| &self.options[index])
            .ok_or_else(|| {
                let expected = self
                    .tags
                    .iter()
                    .map(Value::describe)
                    .collect::<Vec<_>>()
                    .join(" | ");
                at_key
                    .error(ErrorCode::UnionNoMatch, [
                        ("discriminator", self.key.clone()),
                        ("expected", expected),
                        ("received", tag.describe()),
                    ])
                    .into()
            })
    }
}

impl Validate for DiscriminatedUnionSchema {
    fn validate_in(&self, value: &Value, ctx: &ValidationContext<'_>) -> ValidationResult {
        self.select(value, ctx)?.validate_in(value, ctx)
    }

    fn check_in(&self, value: &Value, ctx: &ValidationContext<'_>) -> bool {
        self.select(value, ctx)
            .is_ok_and(|option| option.check_in(value, ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{any, enumeration, literal, number, object, string};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn shapes() -> DiscriminatedUnionSchema {
        DiscriminatedUnionSchema::new("type", [
            object()
                .field("type", literal("a"))
                .field("x", number())
                .into(),
            object()
                .field("type", enumeration(["b", "bb"]).unwrap())
                .field("y", string())
                .into(),
        ])
        .unwrap()
    }

    #[test]
    fn test_dispatch() {
        let schema = shapes();
        assert!(schema.is(&json!({"type": "a", "x": 1}).into()));
        assert!(schema.is(&json!({"type": "bb", "y": "s"}).into()));

        let errors = schema
            .validate(&json!({"type": "a", "x": "nope"}).into())
            .unwrap_err();
        assert_eq!(errors.paths(), vec!["x"]);
    }

    #[test]
    fn test_unknown_tag_single_error() {
        let errors = shapes().validate(&json!({"type": "c"}).into()).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.first().code, ErrorCode::UnionNoMatch);
        assert_eq!(errors.first().path, "type");
        assert!(errors.first().nested.is_empty());
    }

    #[test]
    fn test_missing_tag() {
        let errors = shapes().validate(&json!({"x": 1}).into()).unwrap_err();
        assert_eq!(errors.codes(), vec![ErrorCode::ObjectMissingKey]);
        assert_eq!(errors.first().path, "type");
    }

    #[test]
    fn test_not_object() {
        let errors = shapes().validate(&Value::from(3)).unwrap_err();
        assert_eq!(errors.codes(), vec![ErrorCode::NotObject]);
    }

    #[test]
    fn test_construction_errors() {
        assert_eq!(
            DiscriminatedUnionSchema::new("type", [string().into()]).unwrap_err(),
            SchemaError::DiscriminatorNotObject { index: 0 }
        );
        assert_eq!(
            DiscriminatedUnionSchema::new("type", [object().field("type", any()).into()])
                .unwrap_err(),
            SchemaError::MissingDiscriminator {
                index: 0,
                key: "type".to_owned()
            }
        );
        assert!(matches!(
            DiscriminatedUnionSchema::new("type", [
                object().field("type", literal("a")).into(),
                object().field("type", literal("a")).into(),
            ]),
            Err(SchemaError::DuplicateDiscriminator { .. })
        ));
        assert_eq!(
            DiscriminatedUnionSchema::new("type", Vec::new()).unwrap_err(),
            SchemaError::EmptyUnion
        );
    }
}
