//! UNION combinator - first matching alternative
//!
//! Options are tried in declaration order and the first success wins, so a
//! broad option listed early shadows narrower ones after it. When every
//! option fails the result is a single `UNION_NO_MATCH` error whose
//! `nested` groups hold each option's own errors, in option order.

use crate::foundation::{
    ErrorCode, SchemaError, Validate, ValidationContext, ValidationError, ValidationErrors,
    ValidationResult,
};
use crate::schema::Schema;
use crate::value::Value;

pub(crate) fn no_match(
    ctx: &ValidationContext<'_>,
    value: &Value,
    groups: Vec<ValidationErrors>,
) -> ValidationErrors {
    ValidationErrors::single(no_match_error(ctx, value, groups))
}

fn no_match_error(
    ctx: &ValidationContext<'_>,
    value: &Value,
    groups: Vec<ValidationErrors>,
) -> ValidationError {
    ctx.error(ErrorCode::UnionNoMatch, [
        ("options", groups.len().to_string()),
        ("received", value.type_name().to_owned()),
    ])
    .with_nested(groups)
}

pub(crate) fn validate_union<C: Validate>(
    options: &[C],
    value: &Value,
    ctx: &ValidationContext<'_>,
) -> ValidationResult {
    let mut groups = Vec::with_capacity(options.len());
    for option in options {
        match option.validate_in(value, ctx) {
            Ok(out) => return Ok(out),
            Err(errors) => groups.push(errors),
        }
    }
    Err(no_match(ctx, value, groups))
}

pub(crate) fn check_union<C: Validate>(
    options: &[C],
    value: &Value,
    ctx: &ValidationContext<'_>,
) -> bool {
    options.iter().any(|option| option.check_in(value, ctx))
}

/// Ordered alternatives; see the module docs.
///
/// ```
/// use nebula_schema::prelude::*;
///
/// let id = union([literal(1), number().into()]).unwrap();
/// let errors = id.validate(&Value::from("x")).unwrap_err();
/// assert_eq!(errors.first().code, ErrorCode::UnionNoMatch);
/// assert_eq!(errors.first().nested.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct UnionSchema {
    options: Vec<Schema>,
}

impl UnionSchema {
    /// # Errors
    ///
    /// [`SchemaError::EmptyUnion`] when `options` is empty.
    pub fn new<I>(options: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = Schema>,
    {
        let options: Vec<Schema> = options.into_iter().collect();
        if options.is_empty() {
            return Err(SchemaError::EmptyUnion);
        }
        Ok(Self { options })
    }

    /// Union of `first` and `rest`, which cannot be empty.
    pub(crate) fn non_empty(first: Schema, rest: impl IntoIterator<Item = Schema>) -> Self {
        let mut options = vec![first];
        options.extend(rest);
        Self { options }
    }

    #[must_use]
    pub fn options(&self) -> &[Schema] {
        &self.options
    }
}

impl Validate for UnionSchema {
    fn validate_in(&self, value: &Value, ctx: &ValidationContext<'_>) -> ValidationResult {
        validate_union(&self.options, value, ctx)
    }

    fn check_in(&self, value: &Value, ctx: &ValidationContext<'_>) -> bool {
        check_union(&self.options, value, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{literal, number, string};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_first_match_wins() {
        let schema = UnionSchema::new([string().trim().into(), string().into()]).unwrap();
        assert_eq!(schema.validate(&Value::from(" a ")).unwrap(), Value::from("a"));
    }

    #[test]
    fn test_no_match_groups() {
        let schema = UnionSchema::new([literal(1), number().into()]).unwrap();
        assert!(schema.is(&Value::from(1)));
        assert!(schema.is(&Value::from(2)));

        let errors = schema.validate(&Value::from("x")).unwrap_err();
        assert_eq!(errors.len(), 1);
        let error = errors.first();
        assert_eq!(error.code, ErrorCode::UnionNoMatch);
        assert_eq!(error.nested.len(), 2);
        assert_eq!(error.nested[0].codes(), vec![ErrorCode::LiteralMismatch]);
        assert_eq!(error.nested[1].codes(), vec![ErrorCode::NotNumber]);
        assert_eq!(error.total_error_count(), 3);
    }

    #[test]
    fn test_empty_union_rejected() {
        assert_eq!(
            UnionSchema::new(Vec::new()).unwrap_err(),
            SchemaError::EmptyUnion
        );
    }
}
