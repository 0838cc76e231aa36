//! Property-based tests for nebula-schema.

use nebula_schema::prelude::*;
use nebula_schema::{any_of, is_dangerous_key};
use proptest::prelude::*;

// ============================================================================
// GENERATORS
// ============================================================================

fn arb_key() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => "[a-z]{1,3}",
        2 => Just("name".to_owned()),
        2 => Just("tags".to_owned()),
        1 => Just("__proto__".to_owned()),
        1 => Just("constructor".to_owned()),
        1 => Just("__PROTO__".to_owned()),
        1 => Just("Name".to_owned()),
    ]
}

fn arb_json() -> impl Strategy<Value = serde_json::Value> {
    let leaf = prop_oneof![
        Just(serde_json::Value::Null),
        proptest::prelude::any::<bool>().prop_map(serde_json::Value::from),
        (-1000i64..1000).prop_map(serde_json::Value::from),
        (-1000.0f64..1000.0).prop_map(serde_json::Value::from),
        "[ a-z@.]{0,10}".prop_map(serde_json::Value::from),
    ];
    leaf.prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(serde_json::Value::Array),
            prop::collection::btree_map(arb_key(), inner, 0..6)
                .prop_map(|map| serde_json::Value::Object(map.into_iter().collect())),
        ]
    })
}

fn arb_value() -> impl Strategy<Value = Value> {
    arb_json().prop_map(Value::from)
}

// ============================================================================
// SCHEMAS UNDER TEST
// ============================================================================

fn profile() -> Schema {
    object()
        .field("name", string().trim().min(1).max(8).optional())
        .field("tags", array(string().max(4)).max(4).unique().optional())
        .field("n", number().int().gte(0.0).nullable().default(0))
        .into()
}

fn json_tree() -> Schema {
    any_of![
        null(),
        boolean(),
        number().finite(),
        string(),
        array(lazy(json_tree)),
        record(lazy(json_tree)),
    ]
}

fn schemas() -> Vec<Schema> {
    vec![
        profile(),
        object()
            .field("name", string().email().or(string().url()))
            .strict()
            .into(),
        object().field("name", any()).passthrough().into(),
        object().catchall(number().nonnegative()).into(),
        array(number().multiple_of(3.0).transform(|v| {
            Ok::<_, String>(Value::from(v.as_f64().unwrap_or(0.0) / 3.0))
        }))
        .into(),
        tuple([string().into(), number().into()]).rest(any()).into(),
        record(string().lowercase().min(1)).into(),
        json_tree(),
        any_of![literal(1), number().int(), string().uuid(), array(any()).min(1)],
        profile().refine(|v| v.get("name").is_some(), "name required"),
    ]
}

fn collect_keys(value: &Value, keys: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                keys.push(key.clone());
                collect_keys(child, keys);
            }
        }
        Value::Array(items) | Value::Set(items) => {
            for item in items {
                collect_keys(item, keys);
            }
        }
        _ => {}
    }
}

// ============================================================================
// CONSISTENCY: is, parse and validate agree
// ============================================================================

proptest! {
    #[test]
    fn is_matches_validate(value in arb_value()) {
        for schema in schemas() {
            prop_assert_eq!(schema.is(&value), schema.validate(&value).is_ok());
        }
    }

    #[test]
    fn parse_matches_validate(value in arb_value()) {
        for schema in schemas() {
            match (schema.validate(&value), schema.parse(&value)) {
                (Ok(validated), Ok(parsed)) => prop_assert_eq!(validated, parsed),
                (Err(errors), Err(err)) => prop_assert_eq!(err.errors(), Some(&errors)),
                (validated, parsed) => prop_assert!(
                    false,
                    "validate {:?} disagrees with parse {:?}",
                    validated,
                    parsed
                ),
            }
        }
    }

    #[test]
    fn validation_is_idempotent(value in arb_value()) {
        for schema in schemas() {
            prop_assert_eq!(schema.validate(&value), schema.validate(&value));
        }
    }
}

// ============================================================================
// COMPILATION: compiled == interpreted
// ============================================================================

proptest! {
    #[test]
    fn compiled_matches_interpreted(value in arb_value(), abort_early in proptest::prelude::any::<bool>()) {
        let options = ValidationOptions::new().with_abort_early(abort_early);
        for schema in schemas() {
            let compiled = schema.compile(options.clone());
            prop_assert_eq!(compiled.validate(&value), schema.validate_with(&value, &options));
            prop_assert_eq!(compiled.is(&value), schema.validate_with(&value, &options).is_ok());
        }
    }

    #[test]
    fn compiled_matches_interpreted_when_stripping(value in arb_value()) {
        let options = ValidationOptions::new().with_strip_unknown(true);
        for schema in schemas() {
            let compiled = schema.compile(options.clone());
            prop_assert_eq!(compiled.validate(&value), schema.validate_with(&value, &options));
        }
    }
}

// ============================================================================
// SECURITY: dangerous keys never reach output
// ============================================================================

proptest! {
    #[test]
    fn dangerous_keys_never_reach_output(value in arb_value()) {
        let guarded = [
            profile(),
            json_tree(),
            object().passthrough().into(),
            object().catchall(json_tree()).into(),
            record(json_tree()).into(),
            record(json_tree()).keys(string().lowercase()).into(),
        ];
        for schema in guarded {
            if let Ok(out) = schema.validate(&value) {
                let mut keys = Vec::new();
                collect_keys(&out, &mut keys);
                prop_assert!(keys.iter().all(|key| !is_dangerous_key(key)), "leaked in {:?}", out);
            }
        }
    }

    #[test]
    fn abort_early_reports_prefix(value in arb_value()) {
        let options = ValidationOptions::new().with_abort_early(true);
        for schema in schemas() {
            match (schema.validate(&value), schema.validate_with(&value, &options)) {
                (Ok(_), Ok(_)) => {}
                (Err(all), Err(first)) => {
                    prop_assert_eq!(first.len(), 1);
                    prop_assert_eq!(first.first().code, all.first().code);
                    prop_assert_eq!(&first.first().path, &all.first().path);
                }
                (all, first) => prop_assert!(false, "{:?} vs {:?}", all, first),
            }
        }
    }
}
