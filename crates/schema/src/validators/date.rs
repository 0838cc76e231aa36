//! Date schema

use chrono::{DateTime, SecondsFormat, Utc};

use crate::foundation::{ErrorCode, ErrorSink, Validate, ValidationContext, ValidationResult};
use crate::value::Value;

/// Builder and validator for points in time.
///
/// Accepts [`Value::Date`]. With [`coerce`](Self::coerce) RFC 3339 strings
/// are parsed too, and the output is always a `Value::Date`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateSchema {
    min: Option<DateTime<Utc>>,
    max: Option<DateTime<Utc>>,
    coerce: bool,
}

impl DateSchema {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Earliest accepted instant, inclusive.
    #[must_use = "builder methods must be chained or built"]
    pub fn min(mut self, min: DateTime<Utc>) -> Self {
        self.min = Some(min);
        self
    }

    /// Latest accepted instant, inclusive.
    #[must_use = "builder methods must be chained or built"]
    pub fn max(mut self, max: DateTime<Utc>) -> Self {
        self.max = Some(max);
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn coerce(mut self) -> Self {
        self.coerce = true;
        self
    }

    fn read(&self, value: &Value) -> Option<DateTime<Utc>> {
        match value {
            Value::Date(at) => Some(*at),
            Value::String(s) if self.coerce => DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|at| at.with_timezone(&Utc)),
            _ => None,
        }
    }

    fn in_range(&self, at: DateTime<Utc>) -> bool {
        self.min.is_none_or(|min| at >= min) && self.max.is_none_or(|max| at <= max)
    }
}

fn render(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

impl Validate for DateSchema {
    fn validate_in(&self, value: &Value, ctx: &ValidationContext<'_>) -> ValidationResult {
        let Some(at) = self.read(value) else {
            return Err(ctx
                .error(ErrorCode::NotDate, [("received", value.type_name().to_owned())])
                .into());
        };

        let mut sink = ErrorSink::new(ctx.fail_fast());
        if let Some(min) = self.min.filter(|min| at < *min) {
            sink.push(ctx.error(ErrorCode::DateTooEarly, [
                ("min", render(min)),
                ("received", render(at)),
            ]));
        }
        if !sink.should_stop() {
            if let Some(max) = self.max.filter(|max| at > *max) {
                sink.push(ctx.error(ErrorCode::DateTooLate, [
                    ("max", render(max)),
                    ("received", render(at)),
                ]));
            }
        }
        sink.finish(Value::Date(at))
    }

    fn check_in(&self, value: &Value, _ctx: &ValidationContext<'_>) -> bool {
        self.read(value).is_some_and(|at| self.in_range(at))
    }
}
