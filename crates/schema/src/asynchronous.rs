//! Async validation walk.
//!
//! Mirrors the synchronous traversal of every composite, awaiting
//! [`AsyncRefineSchema`](crate::combinators::AsyncRefineSchema) predicates
//! where the sync path can only report `ASYNC_REQUIRED`. Leaves reuse the
//! sync validators.
//!
//! With `parallel` set, children of one container are started together and
//! awaited with `join_all`; their results are still folded in index order,
//! so both modes report the same errors in the same order.

use std::collections::HashSet;
use std::ops::ControlFlow;

use futures::future::{BoxFuture, join_all};

use crate::combinators::array::array_gate;
use crate::combinators::collection::push_distinct;
use crate::combinators::intersection::merge_outputs;
use crate::combinators::object::{UnknownKeyAction, key_error, object_gate, unknown_key_action};
use crate::combinators::record::{claim_key, rewrite_key};
use crate::combinators::transform::transform_failed;
use crate::combinators::tuple::trim_missing;
use crate::combinators::union::no_match;
use crate::combinators::{
    ArraySchema, IntersectionSchema, MapSchema, ObjectSchema, RecordSchema, SetSchema, TupleSchema,
    UnionSchema,
};
use crate::foundation::{ErrorCode, ErrorSink, Validate, ValidationContext, ValidationResult};
use crate::schema::{Schema, SchemaKind};
use crate::security::{is_dangerous_key, sanitize};
use crate::value::{Object, Value};

type Job<'a> = BoxFuture<'a, ValidationResult>;

/// Awaits `jobs` and hands each result to `fold` in order until it breaks.
///
/// Sequential mode never polls a job after `fold` breaks.
async fn drive<'a, F>(jobs: Vec<Job<'a>>, parallel: bool, mut fold: F)
where
    F: FnMut(usize, ValidationResult) -> ControlFlow<()> + Send,
{
    if parallel {
        for (i, result) in join_all(jobs).await.into_iter().enumerate() {
            if fold(i, result).is_break() {
                break;
            }
        }
    } else {
        for (i, job) in jobs.into_iter().enumerate() {
            if fold(i, job.await).is_break() {
                break;
            }
        }
    }
}

fn ready<'a>(result: ValidationResult) -> Job<'a> {
    Box::pin(futures::future::ready(result))
}

fn stop_if(sink: &ErrorSink) -> ControlFlow<()> {
    if sink.should_stop() {
        ControlFlow::Break(())
    } else {
        ControlFlow::Continue(())
    }
}

/// Validates `value` against `schema`, awaiting async refinements.
pub(crate) fn validate_node<'a>(
    schema: &'a Schema,
    value: &'a Value,
    ctx: &'a ValidationContext<'a>,
) -> BoxFuture<'a, ValidationResult> {
    Box::pin(async move {
        match schema.kind() {
            SchemaKind::Object(object) => validate_object(object, value, ctx).await,
            SchemaKind::Array(array) => validate_array(array, value, ctx).await,
            SchemaKind::Tuple(tuple) => validate_tuple(tuple, value, ctx).await,
            SchemaKind::Union(union) => validate_union(union, value, ctx).await,
            SchemaKind::DiscriminatedUnion(du) => {
                let option = du.select(value, ctx)?;
                validate_node(option, value, ctx).await
            }
            SchemaKind::Intersection(all) => validate_intersection(all, value, ctx).await,
            SchemaKind::Record(record) => validate_record(record, value, ctx).await,
            SchemaKind::Map(map) => validate_map(map, value, ctx).await,
            SchemaKind::Set(set) => validate_set(set, value, ctx).await,
            SchemaKind::Lazy(lazy) => validate_node(lazy.resolve(), value, ctx).await,
            SchemaKind::Optional(optional) => {
                if optional.absence().admits(value) {
                    Ok(value.clone())
                } else {
                    validate_node(optional.inner(), value, ctx).await
                }
            }
            SchemaKind::Default(default) => {
                if value.is_undefined() {
                    let filled = default.default_value().produce();
                    validate_node(default.inner(), &filled, ctx).await
                } else {
                    validate_node(default.inner(), value, ctx).await
                }
            }
            SchemaKind::Refine(refine) => {
                let out = validate_node(refine.inner(), value, ctx).await?;
                crate::combinators::refine::refine_output(
                    out,
                    refine.predicate(),
                    refine.message_cow(),
                    ctx,
                )
            }
            SchemaKind::RefineAsync(refine) => {
                let out = validate_node(refine.inner(), value, ctx).await?;
                refine.refine(out, ctx).await
            }
            SchemaKind::Transform(transform) => {
                let out = validate_node(transform.inner(), value, ctx).await?;
                (transform.function())(out).map_err(|reason| transform_failed(ctx, reason))
            }
            SchemaKind::Preprocess(preprocess) => {
                let prepared =
                    (preprocess.function())(value).map_err(|reason| transform_failed(ctx, reason))?;
                validate_node(preprocess.inner(), &prepared, ctx).await
            }
            SchemaKind::Pipe(pipe) => {
                let mid = validate_node(pipe.first(), value, ctx).await?;
                validate_node(pipe.second(), &mid, ctx).await
            }
            SchemaKind::Message(with) => validate_node(with.inner(), value, ctx)
                .await
                .map_err(|errors| {
                    crate::combinators::message::override_messages(errors, with.message_cow(), ctx)
                }),
            _ => schema.validate_in(value, ctx),
        }
    })
}

// ============================================================================
// CONTAINERS
// ============================================================================

async fn validate_object(
    object: &ObjectSchema,
    value: &Value,
    ctx: &ValidationContext<'_>,
) -> ValidationResult {
    let input = object_gate(value, ctx)?;
    let parallel = ctx.options().parallel;
    let shape = object.shape();
    let mut sink = ErrorSink::new(ctx.abort_early());
    let mut output = Object::with_capacity(shape.len());

    let field_ctx: Vec<_> = shape.keys().map(|key| ctx.key(key)).collect();
    let jobs = shape
        .iter()
        .zip(&field_ctx)
        .map(|((key, field), at)| {
            validate_node(field, input.get(key).unwrap_or(&Value::Undefined), at)
        })
        .collect();
    let keys: Vec<&String> = shape.keys().collect();
    drive(jobs, parallel, |i, result| {
        match result {
            Ok(out) if out.is_undefined() => {}
            Ok(out) => {
                output.insert(keys[i].clone(), out);
            }
            Err(errors) => sink.append(errors),
        }
        stop_if(&sink)
    })
    .await;
    if sink.should_stop() {
        return sink.finish(Value::Undefined);
    }

    // unknown keys, in input order
    let catchall = object.catchall_schema();
    let unknown: Vec<(&String, &Value, UnknownKeyAction)> = input
        .iter()
        .filter(|(key, _)| !shape.contains_key(key.as_str()))
        .map(|(key, raw)| {
            let action = unknown_key_action(key, object.policy(), catchall.is_some(), ctx);
            (key, raw, action)
        })
        .filter(|(_, _, action)| *action != UnknownKeyAction::Drop)
        .collect();
    let unknown_ctx: Vec<_> = unknown.iter().map(|(key, _, _)| ctx.key(key)).collect();
    let jobs = unknown
        .iter()
        .zip(&unknown_ctx)
        .map(|(&(key, raw, action), at)| match (action, catchall) {
            (UnknownKeyAction::Catchall, Some(catchall)) => validate_node(catchall, raw, at),
            (UnknownKeyAction::Reject(code), _) => ready(Err(key_error(ctx, key, code))),
            _ => ready(Ok(sanitize(raw.clone()))),
        })
        .collect();
    drive(jobs, parallel, |i, result| {
        let (key, _, action) = unknown[i];
        match result {
            Ok(out) if action == UnknownKeyAction::Catchall && out.is_undefined() => {}
            Ok(out) => {
                output.insert(key.clone(), out);
            }
            Err(errors) => sink.append(errors),
        }
        stop_if(&sink)
    })
    .await;

    sink.finish(Value::Object(output))
}

async fn validate_array(
    array: &ArraySchema,
    value: &Value,
    ctx: &ValidationContext<'_>,
) -> ValidationResult {
    let items = array_gate(value, ctx)?;
    let bounds = array.bounds();
    let mut sink = ErrorSink::new(ctx.abort_early());
    bounds.length_errors(items.len(), ctx, &mut sink);
    if sink.should_stop() {
        return sink.finish(Value::Undefined);
    }

    let item_ctx: Vec<_> = (0..items.len()).map(|i| ctx.index(i)).collect();
    let jobs = items
        .iter()
        .zip(&item_ctx)
        .map(|(item, at)| validate_node(array.element(), item, at))
        .collect();
    let mut output = Vec::with_capacity(items.len());
    drive(jobs, ctx.options().parallel, |_, result| {
        match result {
            Ok(out) => output.push(out),
            Err(errors) => sink.append(errors),
        }
        stop_if(&sink)
    })
    .await;
    if sink.should_stop() {
        return sink.finish(Value::Undefined);
    }

    bounds.unique_error(items, ctx, &mut sink);
    sink.finish(Value::Array(output))
}

async fn validate_tuple(
    tuple: &TupleSchema,
    value: &Value,
    ctx: &ValidationContext<'_>,
) -> ValidationResult {
    let items = array_gate(value, ctx)?;
    let positions = tuple.positions();
    let mut sink = ErrorSink::new(ctx.abort_early());
    let mut output = Vec::with_capacity(items.len().max(positions.len()));

    let slot_ctx: Vec<_> = (0..positions.len()).map(|i| ctx.index(i)).collect();
    let jobs = positions
        .iter()
        .zip(&slot_ctx)
        .enumerate()
        .map(|(i, (schema, at))| {
            validate_node(schema, items.get(i).unwrap_or(&Value::Undefined), at)
        })
        .collect();
    drive(jobs, ctx.options().parallel, |_, result| {
        match result {
            Ok(out) => output.push(out),
            Err(errors) => sink.append(errors),
        }
        stop_if(&sink)
    })
    .await;
    if sink.should_stop() {
        return sink.finish(Value::Undefined);
    }
    trim_missing(&mut output, items.len());

    if items.len() > positions.len() {
        match tuple.rest_schema() {
            Some(rest) => {
                let rest_ctx: Vec<_> = (positions.len()..items.len()).map(|i| ctx.index(i)).collect();
                let jobs = items[positions.len()..]
                    .iter()
                    .zip(&rest_ctx)
                    .map(|(item, at)| validate_node(rest, item, at))
                    .collect();
                drive(jobs, ctx.options().parallel, |_, result| {
                    match result {
                        Ok(out) => output.push(out),
                        Err(errors) => sink.append(errors),
                    }
                    stop_if(&sink)
                })
                .await;
            }
            None => sink.push(ctx.error(ErrorCode::ArrayTooLong, [
                ("max", positions.len().to_string()),
                ("actual", items.len().to_string()),
            ])),
        }
    }

    sink.finish(Value::Array(output))
}

async fn validate_union(
    union: &UnionSchema,
    value: &Value,
    ctx: &ValidationContext<'_>,
) -> ValidationResult {
    let mut groups = Vec::with_capacity(union.options().len());
    for option in union.options() {
        match validate_node(option, value, ctx).await {
            Ok(out) => return Ok(out),
            Err(errors) => groups.push(errors),
        }
    }
    Err(no_match(ctx, value, groups))
}

async fn validate_intersection(
    all: &IntersectionSchema,
    value: &Value,
    ctx: &ValidationContext<'_>,
) -> ValidationResult {
    let jobs = all
        .members()
        .iter()
        .map(|member| validate_node(member, value, ctx))
        .collect();
    let mut sink = ErrorSink::new(ctx.abort_early());
    let mut outputs = Vec::with_capacity(all.members().len());
    drive(jobs, ctx.options().parallel, |_, result| {
        match result {
            Ok(out) => outputs.push(out),
            Err(errors) => sink.append(errors),
        }
        stop_if(&sink)
    })
    .await;
    if sink.has_errors() {
        return sink.finish(Value::Undefined);
    }
    merge_outputs(outputs, ctx)
}

async fn validate_record(
    record: &RecordSchema,
    value: &Value,
    ctx: &ValidationContext<'_>,
) -> ValidationResult {
    let input = object_gate(value, ctx)?;
    let mut sink = ErrorSink::new(ctx.abort_early());
    let mut output = Object::with_capacity(input.len());
    let mut seen = HashSet::with_capacity(input.len());

    for (key, raw) in input {
        if is_dangerous_key(key) {
            sink.append(key_error(ctx, key, ErrorCode::ObjectForbiddenKey));
            if sink.should_stop() {
                break;
            }
            continue;
        }

        let at_key = ctx.key(key);
        let out_key = match record.key_schema() {
            None => Some(key.clone()),
            Some(key_schema) => {
                let raw_key = Value::String(key.clone());
                match validate_node(key_schema, &raw_key, &at_key).await {
                    Ok(validated) => Some(rewrite_key(validated, key)),
                    Err(errors) => {
                        sink.append(errors);
                        None
                    }
                }
            }
        };
        if let Some(claimed) = &out_key
            && let Err(errors) = claim_key(claimed, &at_key, &mut seen)
        {
            sink.append(errors);
            if sink.should_stop() {
                break;
            }
            continue;
        }
        if sink.should_stop() {
            break;
        }

        match validate_node(record.value_schema(), raw, &at_key).await {
            Ok(out) => {
                if let Some(out_key) = out_key.filter(|_| !out.is_undefined()) {
                    output.insert(out_key, out);
                }
            }
            Err(errors) => sink.append(errors),
        }
        if sink.should_stop() {
            break;
        }
    }

    sink.finish(Value::Object(output))
}

async fn validate_map(map: &MapSchema, value: &Value, ctx: &ValidationContext<'_>) -> ValidationResult {
    let entries = MapSchema::entries(value, ctx)?;
    let mut sink = ErrorSink::new(ctx.abort_early());
    let mut output = Vec::with_capacity(entries.len());

    for (i, (k, v)) in entries.iter().enumerate() {
        let at = ctx.index(i);
        let key = match validate_node(map.key_schema(), k, &at).await {
            Ok(key) => Some(key),
            Err(errors) => {
                sink.append(errors);
                None
            }
        };
        if sink.should_stop() {
            break;
        }
        match validate_node(map.value_schema(), v, &at).await {
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

async fn validate_set(set: &SetSchema, value: &Value, ctx: &ValidationContext<'_>) -> ValidationResult {
    let items = SetSchema::elements(value, ctx)?;
    let mut sink = ErrorSink::new(ctx.abort_early());
    set.size_errors(items.len(), ctx, &mut sink);
    if sink.should_stop() {
        return sink.finish(Value::Undefined);
    }

    let item_ctx: Vec<_> = (0..items.len()).map(|i| ctx.index(i)).collect();
    let jobs = items
        .iter()
        .zip(&item_ctx)
        .map(|(item, at)| validate_node(set.element(), item, at))
        .collect();
    let mut output = Vec::with_capacity(items.len());
    drive(jobs, ctx.options().parallel, |_, result| {
        match result {
            Ok(out) => push_distinct(&mut output, out),
            Err(errors) => sink.append(errors),
        }
        stop_if(&sink)
    })
    .await;

    sink.finish(Value::Set(output))
}
