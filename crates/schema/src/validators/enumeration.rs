//! Enumeration schema

use crate::foundation::{ErrorCode, SchemaError, Validate, ValidationContext, ValidationResult};
use crate::value::Value;

/// Accepts any of a fixed, non-empty list of values.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumSchema {
    values: Vec<Value>,
}

impl EnumSchema {
    /// # Errors
    ///
    /// [`SchemaError::EmptyEnum`] when `values` is empty.
    pub fn new<I, V>(values: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            return Err(SchemaError::EmptyEnum);
        }
        Ok(Self { values })
    }

    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    fn options(&self) -> String {
        self.values
            .iter()
            .map(Value::describe)
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

impl Validate for EnumSchema {
    fn validate_in(&self, value: &Value, ctx: &ValidationContext<'_>) -> ValidationResult {
        if self.values.contains(value) {
            Ok(value.clone())
        } else {
            Err(ctx
                .error(ErrorCode::EnumMismatch, [
                    ("options", self.options()),
                    ("received", value.describe()),
                ])
                .into())
        }
    }

    fn check_in(&self, value: &Value, _ctx: &ValidationContext<'_>) -> bool {
        self.values.contains(value)
    }
}
