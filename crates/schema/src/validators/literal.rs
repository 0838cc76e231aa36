//! Literal and null schemas

use crate::foundation::{ErrorCode, Validate, ValidationContext, ValidationResult};
use crate::value::Value;

/// Accepts exactly one value, compared by deep equality.
#[derive(Debug, Clone, PartialEq)]
pub struct LiteralSchema {
    expected: Value,
}

impl LiteralSchema {
    pub fn new(expected: impl Into<Value>) -> Self {
        Self {
            expected: expected.into(),
        }
    }

    #[must_use]
    pub fn value(&self) -> &Value {
        &self.expected
    }
}

impl Validate for LiteralSchema {
    fn validate_in(&self, value: &Value, ctx: &ValidationContext<'_>) -> ValidationResult {
        if *value == self.expected {
            Ok(value.clone())
        } else {
            Err(ctx
                .error(ErrorCode::LiteralMismatch, [
                    ("expected", self.expected.describe()),
                    ("received", value.describe()),
                ])
                .into())
        }
    }

    fn check_in(&self, value: &Value, _ctx: &ValidationContext<'_>) -> bool {
        *value == self.expected
    }
}

/// Accepts only `null`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSchema;

impl Validate for NullSchema {
    fn validate_in(&self, value: &Value, ctx: &ValidationContext<'_>) -> ValidationResult {
        if value.is_null() {
            Ok(Value::Null)
        } else {
            Err(ctx
                .error(ErrorCode::NotNull, [("received", value.type_name().to_owned())])
                .into())
        }
    }

    fn check_in(&self, value: &Value, _ctx: &ValidationContext<'_>) -> bool {
        value.is_null()
    }
}
