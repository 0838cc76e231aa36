//! TUPLE combinator - positional element schemas

use crate::combinators::array::array_gate;
use crate::foundation::{ErrorCode, ErrorSink, Validate, ValidationContext, ValidationResult};
use crate::schema::Schema;
use crate::value::Value;

/// Input slot `i`, or `Undefined` past the end.
fn slot(items: &[Value], i: usize) -> &Value {
    items.get(i).unwrap_or(&Value::Undefined)
}

/// Drops `Undefined` outputs of slots past the end of the input. Missing
/// slots before a filled one keep their place.
pub(crate) fn trim_missing(output: &mut Vec<Value>, input_len: usize) {
    while output.len() > input_len && output.last().is_some_and(Value::is_undefined) {
        output.pop();
    }
}

pub(crate) fn validate_tuple<C: Validate>(
    positions: &[C],
    rest: Option<&C>,
    value: &Value,
    ctx: &ValidationContext<'_>,
) -> ValidationResult {
    let items = array_gate(value, ctx)?;
    let mut sink = ErrorSink::new(ctx.abort_early());
    let mut output = Vec::with_capacity(items.len().max(positions.len()));

    for (i, schema) in positions.iter().enumerate() {
        match schema.validate_in(slot(items, i), &ctx.index(i)) {
            Ok(out) => output.push(out),
            Err(errors) => {
                sink.append(errors);
                if sink.should_stop() {
                    return sink.finish(Value::Undefined);
                }
            }
        }
    }
    trim_missing(&mut output, items.len());

    if items.len() > positions.len() {
        match rest {
            Some(rest) => {
                for (i, item) in items.iter().enumerate().skip(positions.len()) {
                    match rest.validate_in(item, &ctx.index(i)) {
                        Ok(out) => output.push(out),
                        Err(errors) => {
                            sink.append(errors);
                            if sink.should_stop() {
                                break;
                            }
                        }
                    }
                }
            }
            None => sink.push(ctx.error(ErrorCode::ArrayTooLong, [
                ("max", positions.len().to_string()),
                ("actual", items.len().to_string()),
            ])),
        }
    }

    sink.finish(Value::Array(output))
}

pub(crate) fn check_tuple<C: Validate>(
    positions: &[C],
    rest: Option<&C>,
    value: &Value,
    ctx: &ValidationContext<'_>,
) -> bool {
    let Value::Array(items) = value else {
        return false;
    };
    if !ctx.within_depth() {
        return false;
    }
    let fixed_ok = positions
        .iter()
        .enumerate()
        .all(|(i, schema)| schema.check_in(slot(items, i), &ctx.index(i)));
    fixed_ok
        && match rest {
            Some(rest) => items
                .iter()
                .enumerate()
                .skip(positions.len())
                .all(|(i, item)| rest.check_in(item, &ctx.index(i))),
            None => items.len() <= positions.len(),
        }
}

/// Fixed-arity sequence, optionally followed by a homogeneous rest.
///
/// ```
/// use nebula_schema::prelude::*;
/// use serde_json::json;
///
/// let point = tuple([number().into(), number().into(), number().optional()]);
/// assert!(point.is(&json!([1, 2]).into()));
/// assert!(point.is(&json!([1, 2, 3]).into()));
/// assert!(!point.is(&json!([1, 2, 3, 4]).into()));
/// ```
#[derive(Debug, Clone, Default)]
pub struct TupleSchema {
    positions: Vec<Schema>,
    rest: Option<Schema>,
}

impl TupleSchema {
    pub fn new<I>(positions: I) -> Self
    where
        I: IntoIterator<Item = Schema>,
    {
        Self {
            positions: positions.into_iter().collect(),
            rest: None,
        }
    }

    /// Schema for every element past the fixed positions.
    #[must_use = "builder methods must be chained or built"]
    pub fn rest(mut self, schema: impl Into<Schema>) -> Self {
        self.rest = Some(schema.into());
        self
    }

    #[must_use]
    pub fn positions(&self) -> &[Schema] {
        &self.positions
    }

    #[must_use]
    pub fn rest_schema(&self) -> Option<&Schema> {
        self.rest.as_ref()
    }
}

impl Validate for TupleSchema {
    fn validate_in(&self, value: &Value, ctx: &ValidationContext<'_>) -> ValidationResult {
        validate_tuple(&self.positions, self.rest.as_ref(), value, ctx)
    }

    fn check_in(&self, value: &Value, ctx: &ValidationContext<'_>) -> bool {
        check_tuple(&self.positions, self.rest.as_ref(), value, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{SchemaExt, boolean, number, string};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn pair() -> TupleSchema {
        TupleSchema::new([string().into(), number().into()])
    }

    #[test]
    fn test_positions() {
        assert!(pair().is(&json!(["a", 1]).into()));
        let errors = pair().validate(&json!([1, "a"]).into()).unwrap_err();
        assert_eq!(errors.paths(), vec!["[0]", "[1]"]);
    }

    #[test]
    fn test_missing_slot_validates_as_undefined() {
        let errors = pair().validate(&json!(["a"]).into()).unwrap_err();
        assert_eq!(errors.codes(), vec![ErrorCode::NotNumber]);
        assert_eq!(errors.first().param("received"), Some("undefined"));
    }

    #[test]
    fn test_optional_trailing_slot() {
        let schema = TupleSchema::new([string().into(), number().optional()]);
        assert_eq!(
            schema.validate(&json!(["a"]).into()).unwrap(),
            Value::from(json!(["a"]))
        );
    }

    #[test]
    fn test_filled_slot_after_missing_keeps_position() {
        let schema = TupleSchema::new([number().optional(), number().default(5)]);
        let out = schema.validate(&json!([]).into()).unwrap();
        assert_eq!(out, Value::Array(vec![Value::Undefined, Value::from(5)]));
        assert_eq!(schema.validate(&out), Ok(out.clone()));

        let schema = TupleSchema::new([
            string().into(),
            number().optional(),
            number().optional(),
        ]);
        assert_eq!(
            schema.validate(&json!(["a"]).into()).unwrap(),
            Value::from(json!(["a"]))
        );
    }

    #[test]
    fn test_extra_without_rest() {
        let errors = pair().validate(&json!(["a", 1, true, false]).into()).unwrap_err();
        assert_eq!(errors.codes(), vec![ErrorCode::ArrayTooLong]);
        assert_eq!(errors.first().param("max"), Some("2"));
    }

    #[test]
    fn test_rest() {
        let schema = pair().rest(boolean());
        assert!(schema.is(&json!(["a", 1, true, false]).into()));
        let errors = schema.validate(&json!(["a", 1, true, 0]).into()).unwrap_err();
        assert_eq!(errors.paths(), vec!["[3]"]);
    }
}
