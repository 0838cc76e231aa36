//! TRANSFORM / PREPROCESS / PIPE modifiers
//!
//! User functions are fallible by signature; their `Err` becomes a
//! `TRANSFORM_FAILED` error at the current path.

use std::fmt;
use std::sync::Arc;

use crate::foundation::{ErrorCode, Validate, ValidationContext, ValidationErrors, ValidationResult};
use crate::schema::Schema;
use crate::value::Value;

/// Output rewrite run after successful validation.
pub type TransformFn = Arc<dyn Fn(Value) -> Result<Value, String> + Send + Sync>;

/// Input rewrite run before validation.
pub type PreprocessFn = Arc<dyn Fn(&Value) -> Result<Value, String> + Send + Sync>;

pub(crate) fn transform_failed(ctx: &ValidationContext<'_>, reason: String) -> ValidationErrors {
    ctx.error(ErrorCode::TransformFailed, [("reason", reason)]).into()
}

pub(crate) fn validate_transform<C: Validate>(
    inner: &C,
    transform: &TransformFn,
    value: &Value,
    ctx: &ValidationContext<'_>,
) -> ValidationResult {
    let out = inner.validate_in(value, ctx)?;
    transform(out).map_err(|reason| transform_failed(ctx, reason))
}

pub(crate) fn validate_preprocess<C: Validate>(
    preprocess: &PreprocessFn,
    inner: &C,
    value: &Value,
    ctx: &ValidationContext<'_>,
) -> ValidationResult {
    let prepared = preprocess(value).map_err(|reason| transform_failed(ctx, reason))?;
    inner.validate_in(&prepared, ctx)
}

pub(crate) fn validate_pipe<A: Validate, B: Validate>(
    first: &A,
    second: &B,
    value: &Value,
    ctx: &ValidationContext<'_>,
) -> ValidationResult {
    let mid = first.validate_in(value, ctx)?;
    second.validate_in(&mid, ctx)
}

// ============================================================================
// TRANSFORM
// ============================================================================

/// `inner`, then a rewrite of its output.
///
/// ```
/// use nebula_schema::prelude::*;
///
/// let length = string().transform(|v| {
///     v.as_str()
///         .map(|s| Value::from(s.chars().count() as u32))
///         .ok_or("not a string")
/// });
/// assert_eq!(length.validate(&Value::from("abc")).unwrap(), Value::from(3));
/// ```
#[derive(Clone)]
pub struct TransformSchema {
    inner: Schema,
    transform: TransformFn,
}

impl TransformSchema {
    pub fn new<F, E>(inner: Schema, transform: F) -> Self
    where
        F: Fn(Value) -> Result<Value, E> + Send + Sync + 'static,
        E: fmt::Display,
    {
        Self {
            inner,
            transform: Arc::new(move |value| transform(value).map_err(|e| e.to_string())),
        }
    }

    #[must_use]
    pub fn inner(&self) -> &Schema {
        &self.inner
    }

    pub(crate) fn function(&self) -> &TransformFn {
        &self.transform
    }
}

impl Validate for TransformSchema {
    fn validate_in(&self, value: &Value, ctx: &ValidationContext<'_>) -> ValidationResult {
        validate_transform(&self.inner, &self.transform, value, ctx)
    }
}

impl fmt::Debug for TransformSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformSchema")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// PREPROCESS
// ============================================================================

/// A rewrite of the raw input, then `inner`.
#[derive(Clone)]
pub struct PreprocessSchema {
    preprocess: PreprocessFn,
    inner: Schema,
}

impl PreprocessSchema {
    pub fn new<F, E>(preprocess: F, inner: Schema) -> Self
    where
        F: Fn(&Value) -> Result<Value, E> + Send + Sync + 'static,
        E: fmt::Display,
    {
        Self {
            preprocess: Arc::new(move |value| preprocess(value).map_err(|e| e.to_string())),
            inner,
        }
    }

    #[must_use]
    pub fn inner(&self) -> &Schema {
        &self.inner
    }

    pub(crate) fn function(&self) -> &PreprocessFn {
        &self.preprocess
    }
}

impl Validate for PreprocessSchema {
    fn validate_in(&self, value: &Value, ctx: &ValidationContext<'_>) -> ValidationResult {
        validate_preprocess(&self.preprocess, &self.inner, value, ctx)
    }
}

impl fmt::Debug for PreprocessSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreprocessSchema")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// PIPE
// ============================================================================

/// `first`'s output is `second`'s input.
#[derive(Debug, Clone)]
pub struct PipeSchema {
    first: Schema,
    second: Schema,
}

impl PipeSchema {
    #[must_use]
    pub fn new(first: Schema, second: Schema) -> Self {
        Self { first, second }
    }

    #[must_use]
    pub fn first(&self) -> &Schema {
        &self.first
    }

    #[must_use]
    pub fn second(&self) -> &Schema {
        &self.second
    }
}

impl Validate for PipeSchema {
    fn validate_in(&self, value: &Value, ctx: &ValidationContext<'_>) -> ValidationResult {
        validate_pipe(&self.first, &self.second, value, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{SchemaExt, number, preprocess, string};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_transform_error_becomes_validation_error() {
        let schema = string().transform(|v| match v.as_str() {
            Some("boom") => Err("exploded"),
            _ => Ok(v),
        });
        assert!(schema.is(&Value::from("fine")));
        let errors = schema.validate(&Value::from("boom")).unwrap_err();
        assert_eq!(errors.codes(), vec![ErrorCode::TransformFailed]);
        assert_eq!(errors.first().param("reason"), Some("exploded"));
    }

    #[test]
    fn test_preprocess_coerces_before_validation() {
        let schema = preprocess(
            |v: &Value| match v {
                Value::String(s) => s.parse::<f64>().map(Value::Number).map_err(|e| e.to_string()),
                other => Ok(other.clone()),
            },
            number().int(),
        );
        assert_eq!(schema.validate(&Value::from("42")).unwrap(), Value::from(42));
        assert_eq!(
            schema.validate(&Value::from("forty")).unwrap_err().codes(),
            vec![ErrorCode::TransformFailed]
        );
        assert_eq!(
            schema.validate(&Value::from("4.5")).unwrap_err().codes(),
            vec![ErrorCode::NumberNotInteger]
        );
    }

    #[test]
    fn test_pipe_short_circuits() {
        let schema = string().trim().pipe(string().min(2));
        assert_eq!(schema.validate(&Value::from(" ab ")).unwrap(), Value::from("ab"));
        assert_eq!(
            schema.validate(&Value::from(" a ")).unwrap_err().codes(),
            vec![ErrorCode::StringTooShort]
        );
        assert_eq!(
            schema.validate(&Value::from(1)).unwrap_err().codes(),
            vec![ErrorCode::NotString]
        );
    }
}
