//! Validation options and the per-call validation context.
//!
//! [`ValidationOptions`] is the caller-facing configuration; it is plain data
//! (serde-deserializable) so it can live in a service's config file.
//! [`ValidationContext`] is what validators see while they run: the options
//! plus the path of the value currently being validated.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::foundation::error::{ErrorCode, ErrorParams, ValidationError};
use crate::foundation::path::{PathSegment, render_path};
use crate::messages::{MessageTable, resolve_message};

/// Default limit on nested container levels.
pub const DEFAULT_MAX_DEPTH: usize = 64;

// ============================================================================
// OPTIONS
// ============================================================================

/// Per-call / per-compile validation policy.
///
/// # Examples
///
/// ```
/// use nebula_schema::ValidationOptions;
///
/// let options = ValidationOptions::default()
///     .with_abort_early(true)
///     .with_max_depth(16);
/// assert_eq!(options.abort_early, Some(true));
///
/// let from_config: ValidationOptions =
///     serde_json::from_str(r#"{ "strip_unknown": true }"#).unwrap();
/// assert!(from_config.strip_unknown);
/// assert_eq!(from_config.max_depth, 64);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationOptions {
    /// Stop at the first error instead of collecting all of them.
    ///
    /// Unset, each node uses its own default: primitive checks stop at the
    /// first failure, containers collect every child's errors.
    pub abort_early: Option<bool>,
    /// Drop unknown object keys regardless of each object's own policy.
    pub strip_unknown: bool,
    /// Emit a `tracing` event for every compiled validation call.
    pub debug: bool,
    /// Validate array elements and object fields concurrently in
    /// `validate_async`.
    pub parallel: bool,
    /// Maximum number of nested container levels in the input.
    pub max_depth: usize,
    /// Message templates merged over the English defaults.
    #[serde(skip)]
    pub messages: Option<Arc<MessageTable>>,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            abort_early: None,
            strip_unknown: false,
            debug: false,
            parallel: false,
            max_depth: DEFAULT_MAX_DEPTH,
            messages: None,
        }
    }
}

impl ValidationOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn with_abort_early(mut self, abort_early: bool) -> Self {
        self.abort_early = Some(abort_early);
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn with_strip_unknown(mut self, strip_unknown: bool) -> Self {
        self.strip_unknown = strip_unknown;
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn with_messages(mut self, messages: MessageTable) -> Self {
        self.messages = Some(Arc::new(messages));
        self
    }
}

// ============================================================================
// CONTEXT
// ============================================================================

/// Where a validator is, and under which options it runs.
///
/// Contexts form a chain of stack frames: [`ValidationContext::key`] and
/// [`ValidationContext::index`] borrow the parent and add one path segment,
/// so entering a child never allocates. The rendered path is only built when
/// an error is reported.
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext<'a> {
    options: &'a ValidationOptions,
    parent: Option<&'a ValidationContext<'a>>,
    segment: Option<PathSegment<'a>>,
    depth: usize,
}

impl<'a> ValidationContext<'a> {
    /// Context for the root value.
    #[must_use]
    pub fn root(options: &'a ValidationOptions) -> Self {
        Self {
            options,
            parent: None,
            segment: None,
            depth: 0,
        }
    }

    /// Child context for an object or record key.
    #[must_use]
    pub fn key<'b>(&'b self, key: &'b str) -> ValidationContext<'b> {
        self.child(PathSegment::Key(key))
    }

    /// Child context for a sequence position.
    #[must_use]
    pub fn index<'b>(&'b self, index: usize) -> ValidationContext<'b> {
        self.child(PathSegment::Index(index))
    }

    fn child<'b>(&'b self, segment: PathSegment<'b>) -> ValidationContext<'b> {
        ValidationContext {
            options: self.options,
            parent: Some(self),
            segment: Some(segment),
            depth: self.depth + 1,
        }
    }

    /// Same position, different options.
    ///
    /// Used by compiled validators, which always run under the options they
    /// were compiled with.
    #[must_use]
    pub fn with_options<'b>(&'b self, options: &'b ValidationOptions) -> ValidationContext<'b> {
        ValidationContext {
            options,
            parent: self.parent,
            segment: self.segment,
            depth: self.depth,
        }
    }

    #[must_use]
    pub fn options(&self) -> &'a ValidationOptions {
        self.options
    }

    /// Whether containers stop after the first failing child.
    #[must_use]
    pub fn abort_early(&self) -> bool {
        self.options.abort_early.unwrap_or(false)
    }

    /// Whether a primitive stops at its first failing check.
    #[must_use]
    pub fn fail_fast(&self) -> bool {
        self.options.abort_early.unwrap_or(true)
    }

    /// Number of path segments above this value.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Path segments, root first.
    #[must_use]
    pub fn segments(&self) -> Vec<PathSegment<'a>> {
        let mut segments = Vec::with_capacity(self.depth);
        let mut current = Some(self);
        while let Some(frame) = current {
            if let Some(segment) = frame.segment {
                segments.push(segment);
            }
            current = frame.parent;
        }
        segments.reverse();
        segments
    }

    /// Rendered path of the current value.
    #[must_use]
    pub fn path(&self) -> String {
        render_path(&self.segments())
    }

    /// Builds an error at the current path, resolving its message.
    pub fn error<I>(&self, code: ErrorCode, params: I) -> ValidationError
    where
        I: IntoIterator<Item = (&'static str, String)>,
    {
        let params: ErrorParams = params
            .into_iter()
            .map(|(k, v)| (std::borrow::Cow::Borrowed(k), v))
            .collect();
        let message = resolve_message(code, &params, self.options.messages.as_deref());
        ValidationError {
            code,
            message,
            path: self.path(),
            params,
            nested: Vec::new(),
        }
    }

    /// Error for a container entered deeper than `max_depth`, if it was.
    #[must_use]
    pub fn depth_exceeded(&self) -> Option<ValidationError> {
        (self.depth > self.options.max_depth).then(|| {
            self.error(
                ErrorCode::MaxDepthExceeded,
                [("max_depth", self.options.max_depth.to_string())],
            )
        })
    }

    /// `true` when a container at this position may be entered.
    #[must_use]
    pub fn within_depth(&self) -> bool {
        self.depth <= self.options.max_depth
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_field_path() {
        let options = ValidationOptions::default();
        let root = ValidationContext::root(&options);
        let user = root.key("user");
        let items = user.key("items");
        let second = items.index(2);
        let id = second.key("id");

        assert_eq!(root.path(), "");
        assert_eq!(id.path(), "user.items[2].id");
        assert_eq!(id.depth(), 4);
        // siblings do not see each other
        assert_eq!(user.key("name").path(), "user.name");
    }

    #[test]
    fn test_error_carries_path_and_message() {
        let options = ValidationOptions::default();
        let root = ValidationContext::root(&options);
        let child = root.index(3);
        let error = child.error(ErrorCode::ArrayNotUnique, [("index", "3".to_owned())]);

        assert_eq!(error.path, "[3]");
        assert_eq!(error.code, ErrorCode::ArrayNotUnique);
        assert_eq!(error.param("index"), Some("3"));
        assert!(!error.message.is_empty());
    }

    #[test]
    fn test_depth_guard() {
        let options = ValidationOptions::default().with_max_depth(1);
        let root = ValidationContext::root(&options);
        let one = root.index(0);
        let two = one.index(0);

        assert!(root.depth_exceeded().is_none());
        assert!(one.depth_exceeded().is_none());
        let error = two.depth_exceeded().unwrap();
        assert_eq!(error.code, ErrorCode::MaxDepthExceeded);
        assert_eq!(error.path, "[0][0]");
    }

    #[test]
    fn test_with_options_keeps_position() {
        let loose = ValidationOptions::default();
        let strict = ValidationOptions::default().with_abort_early(true);
        let root = ValidationContext::root(&loose);
        let child = root.key("a");
        let rebound = child.with_options(&strict);

        assert_eq!(rebound.path(), "a");
        assert!(rebound.abort_early());
        assert!(!child.abort_early());
    }

    #[test]
    fn test_abort_early_defaults_per_node_kind() {
        let unset = ValidationOptions::default();
        let ctx = ValidationContext::root(&unset);
        assert!(ctx.fail_fast());
        assert!(!ctx.abort_early());

        let collect = ValidationOptions::default().with_abort_early(false);
        let ctx = ValidationContext::root(&collect);
        assert!(!ctx.fail_fast());
        assert!(!ctx.abort_early());

        let stop = ValidationOptions::default().with_abort_early(true);
        let ctx = ValidationContext::root(&stop);
        assert!(ctx.fail_fast());
        assert!(ctx.abort_early());
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let options: ValidationOptions =
            serde_json::from_str(r#"{"abort_early": true, "parallel": true}"#).unwrap();
        assert_eq!(options.abort_early, Some(true));
        assert!(options.parallel);
        assert!(!options.strip_unknown);
        assert_eq!(options.max_depth, DEFAULT_MAX_DEPTH);
        assert!(options.messages.is_none());
    }
}
