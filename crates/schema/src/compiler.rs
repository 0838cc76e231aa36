//! Schema compiler.
//!
//! [`compile`] walks a schema tree once and produces a tree of closures.
//! Configuration is read at compile time: primitive closures capture only
//! the checks that are configured, and containers capture their already
//! compiled children. Composites run through the same generic traversal
//! helpers as the interpreted schemas, instantiated with compiled children,
//! so both paths produce identical results.
//!
//! Kinds without a specialised closure (lazy, discriminated union,
//! intersection, map, set, custom, async refinement, user validators) are
//! wrapped as-is and run interpreted.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::combinators::array::validate_array;
use crate::combinators::message::validate_with_message;
use crate::combinators::object::validate_object;
use crate::combinators::optional::{validate_default, validate_optional};
use crate::combinators::record::validate_record;
use crate::combinators::refine::validate_refine;
use crate::combinators::transform::{validate_pipe, validate_preprocess, validate_transform};
use crate::combinators::tuple::validate_tuple;
use crate::combinators::union::validate_union;
use crate::foundation::{
    Validate, ValidationContext, ValidationErrors, ValidationOptions, ValidationResult,
};
use crate::schema::{Schema, SchemaKind};
use crate::validators::number::{number_gate, run_number_checks};
use crate::validators::string::{string_gate, validate_string};
use crate::value::Value;

type NodeFn = dyn Fn(&Value, &ValidationContext<'_>) -> ValidationResult + Send + Sync;

/// One compiled schema node.
#[derive(Clone)]
pub(crate) struct Node(Arc<NodeFn>);

impl Node {
    fn new<F>(f: F) -> Self
    where
        F: Fn(&Value, &ValidationContext<'_>) -> ValidationResult + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }
}

impl Validate for Node {
    fn validate_in(&self, value: &Value, ctx: &ValidationContext<'_>) -> ValidationResult {
        (self.0)(value, ctx)
    }
}

// ============================================================================
// COMPILER
// ============================================================================

#[derive(Default)]
struct Compiler {
    nodes: usize,
    interpreted: usize,
}

impl Compiler {
    fn compile(&mut self, schema: &Schema) -> Node {
        self.nodes += 1;
        match schema.kind() {
            SchemaKind::String(string) => {
                let transforms = string.transforms();
                let checks = string.checks().to_vec();
                if checks.is_empty() && transforms.is_identity() {
                    Node::new(|value, ctx| string_gate(value, ctx).map(|_| value.clone()))
                } else {
                    Node::new(move |value, ctx| validate_string(transforms, &checks, value, ctx))
                }
            }
            SchemaKind::Number(number) => {
                let checks = number.checks().to_vec();
                if checks.is_empty() {
                    Node::new(|value, ctx| number_gate(value, ctx).map(|_| value.clone()))
                } else {
                    Node::new(move |value, ctx| {
                        let n = number_gate(value, ctx)?;
                        run_number_checks(&checks, n, ctx)?;
                        Ok(value.clone())
                    })
                }
            }
            SchemaKind::Boolean(leaf) => Self::leaf(leaf.clone()),
            SchemaKind::Date(leaf) => Self::leaf(leaf.clone()),
            SchemaKind::Null(leaf) => Self::leaf(leaf.clone()),
            SchemaKind::Literal(leaf) => Self::leaf(leaf.clone()),
            SchemaKind::Enum(leaf) => Self::leaf(leaf.clone()),
            SchemaKind::Any(leaf) => Self::leaf(leaf.clone()),
            SchemaKind::Never(leaf) => Self::leaf(leaf.clone()),
            SchemaKind::Object(object) => {
                let shape: IndexMap<String, Node> = object
                    .shape()
                    .iter()
                    .map(|(key, field)| (key.clone(), self.compile(field)))
                    .collect();
                let catchall = object.catchall_schema().map(|c| self.compile(c));
                let policy = object.policy();
                Node::new(move |value, ctx| {
                    validate_object(&shape, policy, catchall.as_ref(), value, ctx)
                })
            }
            SchemaKind::Array(array) => {
                let element = self.compile(array.element());
                let bounds = array.bounds();
                Node::new(move |value, ctx| validate_array(&element, bounds, value, ctx))
            }
            SchemaKind::Tuple(tuple) => {
                let positions: Vec<Node> = tuple.positions().iter().map(|p| self.compile(p)).collect();
                let rest = tuple.rest_schema().map(|r| self.compile(r));
                Node::new(move |value, ctx| validate_tuple(&positions, rest.as_ref(), value, ctx))
            }
            SchemaKind::Union(union) => {
                let options: Vec<Node> = union.options().iter().map(|o| self.compile(o)).collect();
                Node::new(move |value, ctx| validate_union(&options, value, ctx))
            }
            SchemaKind::Record(record) => {
                let key = record.key_schema().map(|k| self.compile(k));
                let item = self.compile(record.value_schema());
                Node::new(move |value, ctx| validate_record(key.as_ref(), &item, value, ctx))
            }
            SchemaKind::Optional(optional) => {
                let inner = self.compile(optional.inner());
                let absence = optional.absence();
                Node::new(move |value, ctx| validate_optional(absence, &inner, value, ctx))
            }
            SchemaKind::Default(default) => {
                let inner = self.compile(default.inner());
                let fallback = default.default_value().clone();
                Node::new(move |value, ctx| validate_default(&fallback, &inner, value, ctx))
            }
            SchemaKind::Refine(refine) => {
                let inner = self.compile(refine.inner());
                let predicate = Arc::clone(refine.predicate());
                let message = refine.message_cow().clone();
                Node::new(move |value, ctx| validate_refine(&inner, &predicate, &message, value, ctx))
            }
            SchemaKind::Transform(transform) => {
                let inner = self.compile(transform.inner());
                let f = Arc::clone(transform.function());
                Node::new(move |value, ctx| validate_transform(&inner, &f, value, ctx))
            }
            SchemaKind::Preprocess(preprocess) => {
                let f = Arc::clone(preprocess.function());
                let inner = self.compile(preprocess.inner());
                Node::new(move |value, ctx| validate_preprocess(&f, &inner, value, ctx))
            }
            SchemaKind::Pipe(pipe) => {
                let first = self.compile(pipe.first());
                let second = self.compile(pipe.second());
                Node::new(move |value, ctx| validate_pipe(&first, &second, value, ctx))
            }
            SchemaKind::Message(with) => {
                let inner = self.compile(with.inner());
                let message = with.message_cow().clone();
                Node::new(move |value, ctx| validate_with_message(&inner, &message, value, ctx))
            }
            _ => {
                self.interpreted += 1;
                Self::leaf(schema.clone())
            }
        }
    }

    fn leaf<V: Validate + 'static>(validator: V) -> Node {
        Node::new(move |value, ctx| validator.validate_in(value, ctx))
    }
}

// ============================================================================
// COMPILED VALIDATOR
// ============================================================================

/// A schema compiled together with its validation options.
///
/// Cloning is cheap and clones share the closure tree. Every call runs with
/// the options given to [`compile`]; the options passed to
/// [`Validate::validate_with`] are ignored.
///
/// ```
/// use nebula_schema::prelude::*;
/// use serde_json::json;
///
/// let schema: Schema = object()
///     .field("id", number().int().positive())
///     .field("email", string().email())
///     .into();
/// let fast = schema.compile(ValidationOptions::default().with_abort_early(true));
///
/// let input: Value = json!({"id": -1.5, "email": "nope"}).into();
/// assert_eq!(fast.validate(&input).unwrap_err().len(), 1);
/// assert_eq!(schema.validate(&input).unwrap_err().len(), 2);
///
/// let every_check = ValidationOptions::default().with_abort_early(false);
/// assert_eq!(schema.validate_with(&input, &every_check).unwrap_err().len(), 3);
/// ```
#[derive(Clone)]
pub struct CompiledValidator {
    root: Node,
    options: Arc<ValidationOptions>,
    source: Schema,
}

impl CompiledValidator {
    #[must_use]
    pub fn options(&self) -> &ValidationOptions {
        &self.options
    }

    /// The schema this validator was compiled from.
    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.source
    }
}

impl Validate for CompiledValidator {
    fn validate_in(&self, value: &Value, ctx: &ValidationContext<'_>) -> ValidationResult {
        let ctx = ctx.with_options(&self.options);
        let result = self.root.validate_in(value, &ctx);
        let errors = result.as_ref().err().map_or(0, ValidationErrors::len);
        if self.options.debug {
            tracing::debug!(
                kind = self.source.kind_name(),
                ok = result.is_ok(),
                errors,
                "compiled validation"
            );
        } else {
            tracing::trace!(ok = result.is_ok(), errors, "compiled validation");
        }
        result
    }
}

impl fmt::Debug for CompiledValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledValidator")
            .field("kind", &self.source.kind_name())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Compiles `schema` with `options`.
#[must_use]
pub fn compile(schema: &Schema, options: ValidationOptions) -> CompiledValidator {
    tracing::debug!(kind = schema.kind_name(), "compiling schema");
    let mut compiler = Compiler::default();
    let root = compiler.compile(schema);
    tracing::debug!(
        kind = schema.kind_name(),
        nodes = compiler.nodes,
        interpreted = compiler.interpreted,
        "schema compiled"
    );
    CompiledValidator {
        root,
        options: Arc::new(options),
        source: schema.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::ErrorCode;
    use crate::messages::MessageTable;
    use crate::schema::{
        SchemaExt, any, array, boolean, discriminated_union, literal, number, object, record,
        string, tuple, union,
    };
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    fn user() -> Schema {
        object()
            .field("name", string().trim().min(2).max(10))
            .field("age", number().int().nonnegative().optional())
            .field("tags", array(string().lowercase()).max(3).unique())
            .field("point", tuple([number().into(), number().into()]).rest(boolean()))
            .field("meta", record(any()).keys(string().min(1)))
            .field("role", union([literal("admin"), literal("member")]).unwrap().default("member"))
            .strict()
            .into()
    }

    #[rstest]
    #[case::valid(json!({"name": " alice ", "tags": ["A"], "point": [1, 2], "meta": {}}))]
    #[case::all_wrong(json!({"name": 1, "age": -1.5, "tags": ["a", "A", 3, "b"], "point": [1], "meta": {"": 1}, "role": "x", "extra": 0}))]
    #[case::not_object(json!([1, 2]))]
    #[case::empty(json!({}))]
    fn test_compiled_matches_interpreted(#[case] input: serde_json::Value) {
        let schema = user();
        let input: Value = input.into();
        for options in [
            ValidationOptions::default(),
            ValidationOptions::default().with_abort_early(true),
            ValidationOptions::default().with_abort_early(false),
            ValidationOptions::default().with_strip_unknown(true),
        ] {
            let compiled = schema.compile(options.clone());
            assert_eq!(compiled.validate(&input), schema.validate_with(&input, &options));
            assert_eq!(compiled.is(&input), compiled.validate(&input).is_ok());
        }
    }

    #[test]
    fn test_options_are_bound_at_compile_time() {
        let schema: Schema = object().field("a", string()).field("b", string()).into();
        let compiled = schema.compile(ValidationOptions::default().with_abort_early(true));
        let input: Value = json!({}).into();
        // the per-call options are ignored
        let errors = compiled
            .validate_with(&input, &ValidationOptions::default())
            .unwrap_err();
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_message_overrides_apply() {
        let messages = MessageTable::new().with_text(ErrorCode::NotString, "text please");
        let compiled = Schema::from(string()).compile(ValidationOptions::default().with_messages(messages));
        let errors = compiled.validate(&Value::from(1)).unwrap_err();
        assert_eq!(errors.first().message, "text please");
    }

    #[test]
    fn test_interpreted_fallback() {
        let schema = discriminated_union("kind", [
            object().field("kind", literal("a")).field("n", number()).into(),
            object().field("kind", literal("b")).into(),
        ])
        .unwrap();
        let compiled = schema.compile(ValidationOptions::default().with_debug(true));
        let input: Value = json!({"kind": "a", "n": "x"}).into();
        assert_eq!(compiled.validate(&input), schema.validate(&input));
        assert!(compiled.is(&json!({"kind": "b"}).into()));
    }

    #[test]
    fn test_clones_share_tree() {
        let compiled = user().compile(ValidationOptions::default());
        let copy = compiled.clone();
        assert!(Arc::ptr_eq(&compiled.root.0, &copy.root.0));
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CompiledValidator>();
    }
}
