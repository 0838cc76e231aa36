//! Catch-all schemas: `any`/`unknown` accept everything, `never` nothing.

use crate::foundation::{ErrorCode, Validate, ValidationContext, ValidationResult};
use crate::value::Value;

/// Accepts every value, including `Undefined`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnySchema;

impl Validate for AnySchema {
    fn validate_in(&self, value: &Value, _ctx: &ValidationContext<'_>) -> ValidationResult {
        Ok(value.clone())
    }

    fn check_in(&self, _value: &Value, _ctx: &ValidationContext<'_>) -> bool {
        true
    }
}

/// Rejects every value.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverSchema;

impl Validate for NeverSchema {
    fn validate_in(&self, value: &Value, ctx: &ValidationContext<'_>) -> ValidationResult {
        Err(ctx
            .error(ErrorCode::Never, [("received", value.type_name().to_owned())])
            .into())
    }

    fn check_in(&self, _value: &Value, _ctx: &ValidationContext<'_>) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any_and_never() {
        for value in [Value::Undefined, Value::Null, Value::from(1), Value::from("x")] {
            assert_eq!(AnySchema.validate(&value), Ok(value.clone()));
            assert_eq!(
                NeverSchema.validate(&value).unwrap_err().codes(),
                vec![ErrorCode::Never]
            );
        }
    }
}
