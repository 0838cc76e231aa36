//! MESSAGE modifier - custom error messages
//!
//! Replaces the message of every error reported at the wrapped node's own
//! path. Errors from nested fields keep their own messages, so wrapping an
//! object does not flatten its field errors.

use std::borrow::Cow;

use crate::foundation::{Validate, ValidationContext, ValidationErrors, ValidationResult};
use crate::schema::Schema;
use crate::value::Value;

pub(crate) fn override_messages(
    mut errors: ValidationErrors,
    message: &Cow<'static, str>,
    ctx: &ValidationContext<'_>,
) -> ValidationErrors {
    let path = ctx.path();
    for error in errors.iter_mut().filter(|e| e.path == path) {
        error.message = message.clone();
    }
    errors
}

pub(crate) fn validate_with_message<C: Validate>(
    inner: &C,
    message: &Cow<'static, str>,
    value: &Value,
    ctx: &ValidationContext<'_>,
) -> ValidationResult {
    inner
        .validate_in(value, ctx)
        .map_err(|errors| override_messages(errors, message, ctx))
}

/// `inner` with its own errors re-worded.
///
/// ```
/// use nebula_schema::prelude::*;
///
/// let password = string().min(8).message("Password must be at least 8 characters");
/// let errors = password.validate(&Value::from("short")).unwrap_err();
/// assert_eq!(errors.first().message, "Password must be at least 8 characters");
/// ```
#[derive(Debug, Clone)]
pub struct WithMessage {
    inner: Schema,
    message: Cow<'static, str>,
}

impl WithMessage {
    pub fn new(inner: Schema, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            inner,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn inner(&self) -> &Schema {
        &self.inner
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    pub(crate) fn message_cow(&self) -> &Cow<'static, str> {
        &self.message
    }
}

impl Validate for WithMessage {
    fn validate_in(&self, value: &Value, ctx: &ValidationContext<'_>) -> ValidationResult {
        validate_with_message(&self.inner, &self.message, value, ctx)
    }

    fn check_in(&self, value: &Value, ctx: &ValidationContext<'_>) -> bool {
        self.inner.check_in(value, ctx)
    }
}
