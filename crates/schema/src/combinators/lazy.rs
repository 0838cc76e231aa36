//! LAZY combinator - deferred schema construction
//!
//! The getter runs on first use and its schema is memoized, which is what
//! makes self-referencing and mutually recursive schemas expressible.

use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::foundation::{Validate, ValidationContext, ValidationResult};
use crate::schema::Schema;
use crate::value::Value;

type Getter = dyn Fn() -> Schema + Send + Sync;

struct LazyInner {
    getter: Box<Getter>,
    resolved: OnceLock<Schema>,
}

/// Schema built on first use.
///
/// ```
/// use nebula_schema::prelude::*;
/// use serde_json::json;
///
/// fn tree() -> Schema {
///     object()
///         .field("value", number())
///         .field("children", array(lazy(tree)).optional())
///         .into()
/// }
///
/// let root = tree();
/// let errors = root
///     .validate(&json!({"value": 1, "children": [{"value": "x"}]}).into())
///     .unwrap_err();
/// assert_eq!(errors.first().path, "children[0].value");
/// ```
#[derive(Clone)]
pub struct LazySchema {
    inner: Arc<LazyInner>,
}

impl LazySchema {
    pub fn new<F>(getter: F) -> Self
    where
        F: Fn() -> Schema + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(LazyInner {
                getter: Box::new(getter),
                resolved: OnceLock::new(),
            }),
        }
    }

    /// The target schema, building it on first call.
    pub fn resolve(&self) -> &Schema {
        self.inner.resolved.get_or_init(|| {
            tracing::trace!("resolving lazy schema");
            (self.inner.getter)()
        })
    }

    /// Returns true once the getter has run.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.inner.resolved.get().is_some()
    }
}

impl Validate for LazySchema {
    fn validate_in(&self, value: &Value, ctx: &ValidationContext<'_>) -> ValidationResult {
        self.resolve().validate_in(value, ctx)
    }

    fn check_in(&self, value: &Value, ctx: &ValidationContext<'_>) -> bool {
        self.resolve().check_in(value, ctx)
    }
}

// Manual Debug impl: the getter is opaque and the target may be recursive
impl fmt::Debug for LazySchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazySchema")
            .field("resolved", &self.is_resolved())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::ErrorCode;
    use crate::schema::{SchemaExt, array, number, object};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_lazy_not_resolved_before_use() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        let schema = LazySchema::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            number().into()
        });

        assert!(!schema.is_resolved());
        assert_eq!(count.load(Ordering::SeqCst), 0);

        assert!(schema.is(&Value::from(1)));
        assert!(schema.validate(&Value::from("x")).is_err());
        assert!(schema.is_resolved());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    fn node() -> Schema {
        object()
            .field("value", number())
            .field("next", LazySchema::new(node).optional())
            .into()
    }

    #[test]
    fn test_self_reference() {
        let list: Value = serde_json::json!({
            "value": 1,
            "next": {"value": 2, "next": {"value": "three"}}
        })
        .into();
        let errors = node().validate(&list).unwrap_err();
        assert_eq!(errors.codes(), vec![ErrorCode::NotNumber]);
        assert_eq!(errors.first().path, "next.next.value");
    }

    #[test]
    fn test_clones_share_memo() {
        let schema = LazySchema::new(|| array(number()).into());
        let copy = schema.clone();
        let _ = schema.resolve();
        assert!(copy.is_resolved());
    }
}
