//! Boolean schema

use crate::foundation::{ErrorCode, Validate, ValidationContext, ValidationResult};
use crate::value::Value;

/// Accepts `true` and `false`, nothing else.
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanSchema;

impl Validate for BooleanSchema {
    fn validate_in(&self, value: &Value, ctx: &ValidationContext<'_>) -> ValidationResult {
        match value {
            Value::Bool(_) => Ok(value.clone()),
            other => Err(ctx
                .error(ErrorCode::NotBoolean, [("received", other.type_name().to_owned())])
                .into()),
        }
    }

    fn check_in(&self, value: &Value, _ctx: &ValidationContext<'_>) -> bool {
        matches!(value, Value::Bool(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boolean() {
        assert!(BooleanSchema.is(&Value::Bool(false)));
        let errors = BooleanSchema.validate(&Value::from("true")).unwrap_err();
        assert_eq!(errors.codes(), vec![ErrorCode::NotBoolean]);
        assert_eq!(errors.first().message, "Expected boolean, received string");
    }
}
