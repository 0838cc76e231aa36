//! ARRAY combinator - homogeneous sequences
//!
//! Order of checks: length bounds, then each element at `[i]`, then
//! uniqueness over the raw inputs.

use crate::foundation::{
    ErrorCode, ErrorSink, Validate, ValidationContext, ValidationErrors, ValidationResult,
};
use crate::schema::Schema;
use crate::value::Value;

/// Length and uniqueness constraints of an array.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArrayBounds {
    pub min: Option<usize>,
    pub max: Option<usize>,
    pub unique: bool,
}

impl ArrayBounds {
    pub(crate) fn length_errors(self, len: usize, ctx: &ValidationContext<'_>, sink: &mut ErrorSink) {
        if let Some(min) = self.min.filter(|min| len < *min) {
            sink.push(ctx.error(ErrorCode::ArrayTooShort, [
                ("min", min.to_string()),
                ("actual", len.to_string()),
            ]));
        }
        if sink.should_stop() {
            return;
        }
        if let Some(max) = self.max.filter(|max| len > *max) {
            sink.push(ctx.error(ErrorCode::ArrayTooLong, [
                ("max", max.to_string()),
                ("actual", len.to_string()),
            ]));
        }
    }

    fn length_ok(self, len: usize) -> bool {
        self.min.is_none_or(|min| len >= min) && self.max.is_none_or(|max| len <= max)
    }

    pub(crate) fn unique_error(
        self,
        items: &[Value],
        ctx: &ValidationContext<'_>,
        sink: &mut ErrorSink,
    ) {
        if !self.unique {
            return;
        }
        if let Some(index) = first_duplicate(items) {
            sink.push(
                ctx.index(index)
                    .error(ErrorCode::ArrayNotUnique, [("index", index.to_string())]),
            );
        }
    }
}

/// Index of the first element deep-equal to an earlier one.
pub(crate) fn first_duplicate(items: &[Value]) -> Option<usize> {
    (1..items.len()).find(|&j| items[..j].contains(&items[j]))
}

/// Type gate plus depth guard for sequence validators.
pub(crate) fn array_gate<'v>(
    value: &'v Value,
    ctx: &ValidationContext<'_>,
) -> Result<&'v [Value], ValidationErrors> {
    let Value::Array(items) = value else {
        return Err(ctx
            .error(ErrorCode::NotArray, [("received", value.type_name().to_owned())])
            .into());
    };
    match ctx.depth_exceeded() {
        Some(error) => Err(error.into()),
        None => Ok(items),
    }
}

pub(crate) fn validate_array<C: Validate>(
    element: &C,
    bounds: ArrayBounds,
    value: &Value,
    ctx: &ValidationContext<'_>,
) -> ValidationResult {
    let items = array_gate(value, ctx)?;
    let mut sink = ErrorSink::new(ctx.abort_early());

    bounds.length_errors(items.len(), ctx, &mut sink);
    if sink.should_stop() {
        return sink.finish(Value::Undefined);
    }

    let mut output = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        match element.validate_in(item, &ctx.index(i)) {
            Ok(out) => output.push(out),
            Err(errors) => {
                sink.append(errors);
                if sink.should_stop() {
                    return sink.finish(Value::Undefined);
                }
            }
        }
    }

    bounds.unique_error(items, ctx, &mut sink);
    sink.finish(Value::Array(output))
}

pub(crate) fn check_array<C: Validate>(
    element: &C,
    bounds: ArrayBounds,
    value: &Value,
    ctx: &ValidationContext<'_>,
) -> bool {
    let Value::Array(items) = value else {
        return false;
    };
    ctx.within_depth()
        && bounds.length_ok(items.len())
        && items
            .iter()
            .enumerate()
            .all(|(i, item)| element.check_in(item, &ctx.index(i)))
        && !(bounds.unique && first_duplicate(items).is_some())
}

/// Builder and validator for arrays.
///
/// ```
/// use nebula_schema::prelude::*;
/// use serde_json::json;
///
/// let ids = array(number()).unique();
/// let errors = ids.validate(&json!([1, 2, 3, 2]).into()).unwrap_err();
/// assert_eq!(errors.first().code, ErrorCode::ArrayNotUnique);
/// assert_eq!(errors.first().path, "[3]");
/// ```
#[derive(Debug, Clone)]
pub struct ArraySchema {
    element: Schema,
    bounds: ArrayBounds,
}

impl ArraySchema {
    pub fn new(element: impl Into<Schema>) -> Self {
        Self {
            element: element.into(),
            bounds: ArrayBounds::default(),
        }
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn min(mut self, min: usize) -> Self {
        self.bounds.min = Some(min);
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn max(mut self, max: usize) -> Self {
        self.bounds.max = Some(max);
        self
    }

    /// Exactly `len` elements.
    #[must_use = "builder methods must be chained or built"]
    pub fn length(mut self, len: usize) -> Self {
        self.bounds.min = Some(len);
        self.bounds.max = Some(len);
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn non_empty(self) -> Self {
        self.min(1)
    }

    /// Rejects deep-equal duplicates.
    #[must_use = "builder methods must be chained or built"]
    pub fn unique(mut self) -> Self {
        self.bounds.unique = true;
        self
    }

    #[must_use]
    pub fn element(&self) -> &Schema {
        &self.element
    }

    #[must_use]
    pub fn bounds(&self) -> ArrayBounds {
        self.bounds
    }
}

impl Validate for ArraySchema {
    fn validate_in(&self, value: &Value, ctx: &ValidationContext<'_>) -> ValidationResult {
        validate_array(&self.element, self.bounds, value, ctx)
    }

    fn check_in(&self, value: &Value, ctx: &ValidationContext<'_>) -> bool {
        check_array(&self.element, self.bounds, value, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::ValidationOptions;
    use crate::schema::{number, string};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn v(json: serde_json::Value) -> Value {
        json.into()
    }

    #[test]
    fn test_elements_validated_with_index_paths() {
        let errors = ArraySchema::new(number())
            .validate(&v(json!([1, "a", 2, "b"])))
            .unwrap_err();
        assert_eq!(errors.paths(), vec!["[1]", "[3]"]);
    }

    #[test]
    fn test_length_bounds() {
        let schema = ArraySchema::new(number()).min(2).max(3);
        assert_eq!(
            schema.validate(&v(json!([1]))).unwrap_err().codes(),
            vec![ErrorCode::ArrayTooShort]
        );
        assert_eq!(
            schema.validate(&v(json!([1, 2, 3, 4]))).unwrap_err().codes(),
            vec![ErrorCode::ArrayTooLong]
        );
        assert!(schema.is(&v(json!([1, 2]))));
    }

    #[test]
    fn test_exact_length_single_error() {
        let schema = ArraySchema::new(number()).length(2);
        assert_eq!(
            schema.validate(&v(json!([]))).unwrap_err().codes(),
            vec![ErrorCode::ArrayTooShort]
        );
    }

    #[test]
    fn test_unique_reports_first_duplicate() {
        let errors = ArraySchema::new(number())
            .unique()
            .validate(&v(json!([1, 2, 3, 2])))
            .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.first().code, ErrorCode::ArrayNotUnique);
        assert_eq!(errors.first().path, "[3]");
    }

    #[test]
    fn test_unique_uses_deep_equality() {
        let schema = ArraySchema::new(crate::schema::any()).unique();
        assert!(!schema.is(&v(json!([{"a": 1}, {"a": 1}]))));
        assert!(schema.is(&v(json!([{"a": 1}, {"a": 2}]))));
    }

    #[test]
    fn test_transformed_elements_in_output() {
        let schema = ArraySchema::new(string().trim());
        assert_eq!(
            schema.validate(&v(json!([" a ", "b "]))).unwrap(),
            v(json!(["a", "b"]))
        );
    }

    #[test]
    fn test_abort_early_skips_elements_after_length() {
        let options = ValidationOptions::default().with_abort_early(true);
        let errors = ArraySchema::new(number())
            .min(5)
            .validate_with(&v(json!(["x"])), &options)
            .unwrap_err();
        assert_eq!(errors.codes(), vec![ErrorCode::ArrayTooShort]);
    }

    #[test]
    fn test_depth_guard() {
        let schema = ArraySchema::new(ArraySchema::new(ArraySchema::new(number())));
        let options = ValidationOptions::default().with_max_depth(1);
        let errors = schema
            .validate_with(&v(json!([[[1]]])), &options)
            .unwrap_err();
        assert_eq!(errors.codes(), vec![ErrorCode::MaxDepthExceeded]);
        assert_eq!(errors.first().path, "[0][0]");
        assert!(schema.validate(&v(json!([[[1]]]))).is_ok());
    }
}
