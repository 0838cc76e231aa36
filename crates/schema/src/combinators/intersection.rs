//! INTERSECTION combinator - every member must accept the value
//!
//! Members all validate the same input and all their errors are collected.
//! Successful outputs are combined: objects merge shallowly with later
//! members winning, identical values collapse to one, anything else is an
//! `INTERSECTION_CONFLICT`.

use crate::foundation::{
    ErrorCode, ErrorSink, SchemaError, Validate, ValidationContext, ValidationResult,
};
use crate::schema::Schema;
use crate::value::{Object, Value};

/// Combines member outputs.
pub(crate) fn merge_outputs(outputs: Vec<Value>, ctx: &ValidationContext<'_>) -> ValidationResult {
    if outputs.iter().all(|out| matches!(out, Value::Object(_))) {
        let mut merged = Object::new();
        for out in outputs {
            if let Value::Object(map) = out {
                merged.extend(map);
            }
        }
        return Ok(Value::Object(merged));
    }

    let mut outputs = outputs.into_iter();
    let first = outputs.next().unwrap_or_default();
    if outputs.all(|out| out == first) {
        Ok(first)
    } else {
        Err(ctx
            .error(ErrorCode::IntersectionConflict, [("received", first.type_name().to_owned())])
            .into())
    }
}

/// Two or more schemas that must all pass.
///
/// ```
/// use nebula_schema::prelude::*;
/// use serde_json::json;
///
/// let named = object().field("name", string()).passthrough();
/// let aged = object().field("age", number()).passthrough();
/// let person = named.and(aged);
///
/// assert_eq!(
///     person.validate(&json!({"name": "a", "age": 3}).into()).unwrap(),
///     Value::from(json!({"name": "a", "age": 3}))
/// );
/// ```
#[derive(Debug, Clone)]
pub struct IntersectionSchema {
    members: Vec<Schema>,
}

impl IntersectionSchema {
    /// # Errors
    ///
    /// [`SchemaError::IntersectionArity`] with fewer than two members.
    pub fn new<I>(members: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = Schema>,
    {
        let members: Vec<Schema> = members.into_iter().collect();
        if members.len() < 2 {
            return Err(SchemaError::IntersectionArity(members.len()));
        }
        Ok(Self { members })
    }

    pub(crate) fn pair(left: Schema, right: Schema) -> Self {
        Self::from_parts(left, right, std::iter::empty())
    }

    /// Two or more members, arity checked by the signature.
    pub(crate) fn from_parts(
        first: Schema,
        second: Schema,
        rest: impl IntoIterator<Item = Schema>,
    ) -> Self {
        let mut members = vec![first, second];
        members.extend(rest);
        Self { members }
    }

    #[must_use]
    pub fn members(&self) -> &[Schema] {
        &self.members
    }
}

impl Validate for IntersectionSchema {
    fn validate_in(&self, value: &Value, ctx: &ValidationContext<'_>) -> ValidationResult {
        let mut sink = ErrorSink::new(ctx.abort_early());
        let mut outputs = Vec::with_capacity(self.members.len());
        for member in &self.members {
            match member.validate_in(value, ctx) {
                Ok(out) => outputs.push(out),
                Err(errors) => {
                    sink.append(errors);
                    if sink.should_stop() {
                        break;
                    }
                }
            }
        }
        if sink.has_errors() {
            return sink.finish(Value::Undefined);
        }
        merge_outputs(outputs, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{SchemaExt, number, object, string};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_arity() {
        assert_eq!(
            IntersectionSchema::new([number().into()]).unwrap_err(),
            SchemaError::IntersectionArity(1)
        );
    }

    #[test]
    fn test_collects_errors_from_all_members() {
        let schema = IntersectionSchema::new([
            object().field("a", string()).into(),
            object().field("b", number()).into(),
        ])
        .unwrap();
        let errors = schema.validate(&json!({}).into()).unwrap_err();
        assert_eq!(errors.paths(), vec!["a", "b"]);
    }

    #[test]
    fn test_later_member_wins_on_merge() {
        let schema = IntersectionSchema::new([
            object().field("a", string()).into(),
            object().field("a", string().uppercase()).into(),
        ])
        .unwrap();
        assert_eq!(
            schema.validate(&json!({"a": "x"}).into()).unwrap(),
            Value::from(json!({"a": "X"}))
        );
    }

    #[test]
    fn test_scalar_members() {
        let schema = number().gte(0.0).and(number().lte(10.0));
        assert!(schema.is(&Value::from(5)));
        assert!(!schema.is(&Value::from(11)));
    }

    #[test]
    fn test_conflict() {
        let schema = IntersectionSchema::new([string().into(), string().trim().into()]).unwrap();
        assert!(schema.is(&Value::from("a")));
        let errors = schema.validate(&Value::from(" a")).unwrap_err();
        assert_eq!(errors.codes(), vec![ErrorCode::IntersectionConflict]);
    }
}
