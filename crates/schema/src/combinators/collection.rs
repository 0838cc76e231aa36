//! MAP and SET combinators - host collections
//!
//! Entries are addressed by iteration index, so every error lands at `[i]`.

use crate::foundation::{
    ErrorCode, ErrorSink, Validate, ValidationContext, ValidationErrors, ValidationResult,
};
use crate::schema::Schema;
use crate::value::Value;

fn depth_checked(ctx: &ValidationContext<'_>) -> Result<(), ValidationErrors> {
    match ctx.depth_exceeded() {
        Some(error) => Err(error.into()),
        None => Ok(()),
    }
}

// ============================================================================
// MAP
// ============================================================================

/// Key/value collection with arbitrary keys.
#[derive(Debug, Clone)]
pub struct MapSchema {
    key: Schema,
    value: Schema,
}

impl MapSchema {
    pub fn new(key: impl Into<Schema>, value: impl Into<Schema>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    #[must_use]
    pub fn key_schema(&self) -> &Schema {
        &self.key
    }

    #[must_use]
    pub fn value_schema(&self) -> &Schema {
        &self.value
    }

    pub(crate) fn entries<'v>(
        value: &'v Value,
        ctx: &ValidationContext<'_>,
    ) -> Result<&'v [(Value, Value)], ValidationErrors> {
        let Value::Map(entries) = value else {
            return Err(ctx
                .error(ErrorCode::NotMap, [("received", value.type_name().to_owned())])
                .into());
        };
        depth_checked(ctx)?;
        Ok(entries)
    }
}

impl Validate for MapSchema {
    fn validate_in(&self, value: &Value, ctx: &ValidationContext<'_>) -> ValidationResult {
        let entries = Self::entries(value, ctx)?;
        let mut sink = ErrorSink::new(ctx.abort_early());
        let mut output = Vec::with_capacity(entries.len());

        for (i, (k, v)) in entries.iter().enumerate() {
            let at = ctx.index(i);
            let key = match self.key.validate_in(k, &at) {
                Ok(key) => Some(key),
                Err(errors) => {
                    sink.append(errors);
                    None
                }
            };
            if sink.should_stop() {
                break;
            }
            match self.value.validate_in(v, &at) {
                Ok(v) => {
                    if let Some(key) = key {
                        output.push((key, v));
                    }
                }
                Err(errors) => sink.append(errors),
            }
            if sink.should_stop() {
                break;
            }
        }

        sink.finish(Value::Map(output))
    }
}

// ============================================================================
// SET
// ============================================================================

/// Collection of distinct elements.
///
/// The output drops elements whose validated form equals an earlier one.
#[derive(Debug, Clone)]
pub struct SetSchema {
    element: Schema,
    min: Option<usize>,
    max: Option<usize>,
}

impl SetSchema {
    pub fn new(element: impl Into<Schema>) -> Self {
        Self {
            element: element.into(),
            min: None,
            max: None,
        }
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn min(mut self, min: usize) -> Self {
        self.min = Some(min);
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn max(mut self, max: usize) -> Self {
        self.max = Some(max);
        self
    }

    #[must_use]
    pub fn element(&self) -> &Schema {
        &self.element
    }

    pub(crate) fn elements<'v>(
        value: &'v Value,
        ctx: &ValidationContext<'_>,
    ) -> Result<&'v [Value], ValidationErrors> {
        let Value::Set(items) = value else {
            return Err(ctx
                .error(ErrorCode::NotSet, [("received", value.type_name().to_owned())])
                .into());
        };
        depth_checked(ctx)?;
        Ok(items)
    }

    pub(crate) fn size_errors(&self, len: usize, ctx: &ValidationContext<'_>, sink: &mut ErrorSink) {
        if let Some(min) = self.min.filter(|min| len < *min) {
            sink.push(ctx.error(ErrorCode::SetTooSmall, [
                ("min", min.to_string()),
                ("actual", len.to_string()),
            ]));
        }
        if sink.should_stop() {
            return;
        }
        if let Some(max) = self.max.filter(|max| len > *max) {
            sink.push(ctx.error(ErrorCode::SetTooBig, [
                ("max", max.to_string()),
                ("actual", len.to_string()),
            ]));
        }
    }
}

/// Appends `item` unless an equal element is already present.
pub(crate) fn push_distinct(output: &mut Vec<Value>, item: Value) {
    if !output.contains(&item) {
        output.push(item);
    }
}

impl Validate for SetSchema {
    fn validate_in(&self, value: &Value, ctx: &ValidationContext<'_>) -> ValidationResult {
        let items = Self::elements(value, ctx)?;
        let mut sink = ErrorSink::new(ctx.abort_early());
        self.size_errors(items.len(), ctx, &mut sink);
        if sink.should_stop() {
            return sink.finish(Value::Undefined);
        }

        let mut output = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            match self.element.validate_in(item, &ctx.index(i)) {
                Ok(out) => push_distinct(&mut output, out),
                Err(errors) => {
                    sink.append(errors);
                    if sink.should_stop() {
                        break;
                    }
                }
            }
        }

        sink.finish(Value::Set(output))
    }
}
