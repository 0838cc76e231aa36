//! OPTIONAL / NULLABLE / NULLISH / DEFAULT modifiers
//!
//! The absence modifiers let `Undefined` and/or `Null` through unchanged
//! without consulting the inner schema. `default` replaces `Undefined`
//! before the inner schema runs, so the default value itself is validated.

use std::fmt;
use std::sync::Arc;

use crate::foundation::{Validate, ValidationContext, ValidationResult};
use crate::schema::Schema;
use crate::value::Value;

/// Which absent values skip the inner schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Absence {
    /// `Undefined` only (`optional`).
    Undefined,
    /// `Null` only (`nullable`).
    Null,
    /// Both (`nullish`).
    Either,
}

impl Absence {
    #[must_use]
    pub fn admits(self, value: &Value) -> bool {
        match self {
            Self::Undefined => value.is_undefined(),
            Self::Null => value.is_null(),
            Self::Either => value.is_undefined() || value.is_null(),
        }
    }
}

pub(crate) fn validate_optional<C: Validate>(
    absence: Absence,
    inner: &C,
    value: &Value,
    ctx: &ValidationContext<'_>,
) -> ValidationResult {
    if absence.admits(value) {
        Ok(value.clone())
    } else {
        inner.validate_in(value, ctx)
    }
}

/// `inner`, with absent values allowed.
#[derive(Debug, Clone)]
pub struct OptionalSchema {
    inner: Schema,
    absence: Absence,
}

impl OptionalSchema {
    #[must_use]
    pub fn new(inner: Schema, absence: Absence) -> Self {
        Self { inner, absence }
    }

    #[must_use]
    pub fn inner(&self) -> &Schema {
        &self.inner
    }

    #[must_use]
    pub fn absence(&self) -> Absence {
        self.absence
    }
}

impl Validate for OptionalSchema {
    fn validate_in(&self, value: &Value, ctx: &ValidationContext<'_>) -> ValidationResult {
        validate_optional(self.absence, &self.inner, value, ctx)
    }

    fn check_in(&self, value: &Value, ctx: &ValidationContext<'_>) -> bool {
        self.absence.admits(value) || self.inner.check_in(value, ctx)
    }
}

// ============================================================================
// DEFAULT
// ============================================================================

/// Source of a default value.
#[derive(Clone)]
pub enum DefaultValue {
    Value(Value),
    With(Arc<dyn Fn() -> Value + Send + Sync>),
}

impl DefaultValue {
    #[must_use]
    pub fn produce(&self) -> Value {
        match self {
            Self::Value(value) => value.clone(),
            Self::With(make) => make(),
        }
    }
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::With(_) => f.debug_tuple("With").field(&"<fn>").finish(),
        }
    }
}

pub(crate) fn validate_default<C: Validate>(
    default: &DefaultValue,
    inner: &C,
    value: &Value,
    ctx: &ValidationContext<'_>,
) -> ValidationResult {
    if value.is_undefined() {
        inner.validate_in(&default.produce(), ctx)
    } else {
        inner.validate_in(value, ctx)
    }
}

/// `inner`, with `Undefined` replaced by a default.
#[derive(Debug, Clone)]
pub struct DefaultSchema {
    inner: Schema,
    default: DefaultValue,
}

impl DefaultSchema {
    #[must_use]
    pub fn new(inner: Schema, default: DefaultValue) -> Self {
        Self { inner, default }
    }

    #[must_use]
    pub fn inner(&self) -> &Schema {
        &self.inner
    }

    #[must_use]
    pub fn default_value(&self) -> &DefaultValue {
        &self.default
    }
}

impl Validate for DefaultSchema {
    fn validate_in(&self, value: &Value, ctx: &ValidationContext<'_>) -> ValidationResult {
        validate_default(&self.default, &self.inner, value, ctx)
    }

    fn check_in(&self, value: &Value, ctx: &ValidationContext<'_>) -> bool {
        if value.is_undefined() {
            self.inner.check_in(&self.default.produce(), ctx)
        } else {
            self.inner.check_in(value, ctx)
        }
    }
}
