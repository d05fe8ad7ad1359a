//! Property-based tests for case generation invariants using proptest.
//!
//! Invariants tested:
//! - Every composite case carries the endpoint's path and method
//! - Every composite axis value validates against its axis schema
//! - Values for `oneOf`, fractional `multipleOf`, `const`/`enum` with
//!   siblings and closed `allOf` parts validate against their schema
//! - Each declaring axis yields exactly one example case holding the example
//! - Bound tests execute example cases before any random draw

#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

use std::cell::RefCell;

use casegen_core::{
    bind, build_composite_source, collect, Axis, Case, Endpoint, HttpMethod,
    JsonSchemaGenerator, RunSettings, SchemaGenerator,
};
use proptest::prelude::*;
use serde_json::{json, Value};
use strum::IntoEnumIterator;

/// Config for properties that build and draw whole cases.
fn case_config() -> ProptestConfig {
    ProptestConfig {
        cases: 32,
        max_shrink_iters: 128,
        ..ProptestConfig::default()
    }
}

/// Fast config for properties that run a bound test per case.
fn fast_config() -> ProptestConfig {
    ProptestConfig {
        cases: 16,
        max_shrink_iters: 64,
        ..ProptestConfig::default()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// STRATEGIES FOR GENERATING TEST DATA
// ═══════════════════════════════════════════════════════════════════════════

fn method_strategy() -> impl Strategy<Value = HttpMethod> {
    proptest::sample::select(HttpMethod::iter().collect::<Vec<_>>())
}

fn path_strategy() -> impl Strategy<Value = String> {
    proptest::collection::vec("[a-z]{1,8}|\\{[a-z_]{1,8}\\}", 0..4)
        .prop_map(|segments| format!("/{}", segments.join("/")))
}

/// One realistic schema per axis, all within the supported keyword set.
fn realistic_schemas() -> [(Axis, Value); 6] {
    [
        (
            Axis::PathParameters,
            json!({
                "type": "object",
                "properties": {"id": {"type": "integer", "minimum": 1, "maximum": 1000}},
                "required": ["id"],
                "additionalProperties": false
            }),
        ),
        (
            Axis::Headers,
            json!({
                "type": "object",
                "properties": {"x-request-id": {"type": "string", "pattern": "^[a-f0-9]{8}$"}},
                "required": ["x-request-id"]
            }),
        ),
        (
            Axis::Cookies,
            json!({
                "type": "object",
                "additionalProperties": {"type": "string", "maxLength": 5},
                "maxProperties": 2
            }),
        ),
        (
            Axis::Query,
            json!({
                "type": "object",
                "properties": {
                    "limit": {"type": "integer", "minimum": 1, "maximum": 50},
                    "tags": {
                        "type": "array",
                        "items": {"enum": ["a", "b", "c"]},
                        "uniqueItems": true,
                        "maxItems": 3
                    }
                },
                "additionalProperties": false
            }),
        ),
        (
            Axis::Body,
            json!({
                "type": "object",
                "properties": {
                    "name": {"type": "string", "minLength": 1, "maxLength": 10},
                    "price": {"type": "number", "minimum": 0, "exclusiveMaximum": 100},
                    "kind": {"anyOf": [
                        {"const": "x"},
                        {"type": "integer", "minimum": -1000, "maximum": 1000, "multipleOf": 5}
                    ]},
                    "tags": {"type": ["array", "null"], "items": {"type": "boolean"}}
                },
                "required": ["name", "price"]
            }),
        ),
        (
            Axis::FormData,
            json!({
                "allOf": [
                    {"type": "object", "properties": {"note": {"type": "string"}}},
                    {"required": ["note"]}
                ]
            }),
        ),
    ]
}

/// Schemas whose keywords interact: overlapping `oneOf` branches, fractional
/// `multipleOf`, `const`/`enum` next to other keywords, closed `allOf` parts.
fn keyword_interaction_schemas() -> Vec<Value> {
    vec![
        json!({"oneOf": [{"type": "integer"}, {"type": "number"}]}),
        json!({"oneOf": [
            {"type": "integer", "minimum": 0, "maximum": 20},
            {"type": "integer", "minimum": 10, "maximum": 30}
        ]}),
        json!({"oneOf": [
            {"type": "object", "properties": {"kind": {"const": "a"}}, "required": ["kind"]},
            {"type": "object", "properties": {"kind": {"const": "b"}}, "required": ["kind"]}
        ]}),
        json!({"type": "number", "minimum": 0, "maximum": 10, "multipleOf": 0.01}),
        json!({"type": "number", "minimum": -5, "maximum": 5, "multipleOf": 0.25}),
        json!({"type": "number", "exclusiveMinimum": 0, "maximum": 3, "multipleOf": 0.1}),
        json!({"type": "string", "enum": ["a", 1, "b", null]}),
        json!({"type": ["integer", "string"], "enum": [1, "x", 2.5, true]}),
        json!({"const": 4, "type": "integer", "minimum": 0}),
        json!({"allOf": [
            {
                "type": "object",
                "properties": {"a": {"type": "integer"}, "b": {"type": "string"}},
                "additionalProperties": false
            },
            {"properties": {"a": {"minimum": 0}, "c": {"type": "boolean"}}, "required": ["a"]}
        ]}),
        json!({"allOf": [
            {
                "type": "object",
                "properties": {"id": {"type": "integer"}},
                "additionalProperties": {"type": "string"}
            },
            {"properties": {"name": {}}, "required": ["name"]}
        ]}),
    ]
}

fn realistic_endpoint(path: &str, method: HttpMethod) -> Endpoint {
    realistic_schemas()
        .into_iter()
        .fold(Endpoint::builder(path, method), |builder, (axis, schema)| {
            builder.schema(axis, schema)
        })
        .build()
        .unwrap()
}

/// Example values declared on a random subset of axes.
fn declared_examples_strategy() -> impl Strategy<Value = Vec<(Axis, Value)>> {
    let example = prop_oneof![
        Just(json!({"k": "v"})),
        Just(json!({})),
        Just(json!({"id": 7, "flag": true})),
    ];
    proptest::collection::vec(proptest::option::of(example), 6).prop_map(|slots| {
        Axis::ALL
            .into_iter()
            .zip(slots)
            .filter_map(|(axis, example)| example.map(|example| (axis, example)))
            .collect()
    })
}

fn endpoint_with_examples(examples: &[(Axis, Value)]) -> Endpoint {
    examples
        .iter()
        .fold(
            Endpoint::builder("/things/{id}", HttpMethod::Patch),
            |builder, (axis, example)| {
                builder.schema(*axis, json!({"type": "object", "example": example}))
            },
        )
        .build()
        .unwrap()
}

// ═══════════════════════════════════════════════════════════════════════════
// COMPOSITE SOURCE PROPERTIES
// ═══════════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(case_config())]

    #[test]
    fn prop_composite_cases_keep_path_and_method(
        path in path_strategy(),
        method in method_strategy(),
        seed in any::<u64>(),
    ) {
        let endpoint = realistic_endpoint(&path, method);
        let source = build_composite_source(&endpoint, &JsonSchemaGenerator::default()).unwrap();
        let runner = RunSettings::default().seed(seed).runner();

        for case in source.draws(runner).take(8) {
            let case = case.unwrap();
            prop_assert_eq!(case.path.as_str(), path.as_str());
            prop_assert_eq!(case.method, method);
        }
    }

    #[test]
    fn prop_composite_values_validate_against_schemas(seed in any::<u64>()) {
        let endpoint = realistic_endpoint("/orders/{id}", HttpMethod::Post);
        let source = build_composite_source(&endpoint, &JsonSchemaGenerator::default()).unwrap();
        let validators: Vec<(Axis, jsonschema::Validator)> = realistic_schemas()
            .iter()
            .map(|(axis, schema)| (*axis, jsonschema::validator_for(schema).unwrap()))
            .collect();
        let runner = RunSettings::default().seed(seed).runner();

        for case in source.draws(runner).take(8) {
            let case = case.unwrap();
            for (axis, validator) in &validators {
                let value = case.get(*axis);
                prop_assert!(
                    validator.is_valid(value),
                    "{} value {} violates its schema",
                    axis,
                    value
                );
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// KEYWORD INTERACTION PROPERTIES
// ═══════════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(case_config())]

    #[test]
    fn prop_keyword_interactions_validate(
        schema in proptest::sample::select(keyword_interaction_schemas()),
        seed in any::<u64>(),
    ) {
        let endpoint = Endpoint::builder("/shapes", HttpMethod::Post)
            .schema(Axis::Body, schema.clone())
            .build()
            .unwrap();
        let source = build_composite_source(&endpoint, &JsonSchemaGenerator::default()).unwrap();
        let validator = jsonschema::validator_for(&schema).unwrap();
        let runner = RunSettings::default().seed(seed).runner();

        for case in source.draws(runner).take(16) {
            let case = case.unwrap();
            prop_assert!(
                validator.is_valid(&case.body),
                "body {} violates {}",
                case.body,
                schema
            );
        }
    }

    #[test]
    fn prop_fill_in_values_validate(schema in proptest::sample::select(keyword_interaction_schemas())) {
        let value = JsonSchemaGenerator::default().one_example(&schema).unwrap();
        let validator = jsonschema::validator_for(&schema).unwrap();
        prop_assert!(validator.is_valid(&value), "{} violates {}", value, schema);
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// EXAMPLE COLLECTION PROPERTIES
// ═══════════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(case_config())]

    #[test]
    fn prop_each_declaring_axis_yields_one_case(examples in declared_examples_strategy()) {
        let endpoint = endpoint_with_examples(&examples);
        let generator = JsonSchemaGenerator::default();
        let cases: Vec<Case> = collect(&endpoint, &generator)
            .collect::<casegen_core::Result<_>>()
            .unwrap();

        prop_assert_eq!(cases.len(), examples.len());
        for (case, (axis, example)) in cases.iter().zip(&examples) {
            prop_assert_eq!(case.get(*axis), example);
            prop_assert_eq!(case.path.as_str(), "/things/{id}");
            prop_assert_eq!(case.method, HttpMethod::Patch);
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// BINDING PROPERTIES
// ═══════════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(fast_config())]

    #[test]
    fn prop_examples_execute_before_random_draws(
        examples in declared_examples_strategy(),
        max_examples in 1..12_u32,
    ) {
        let endpoint = endpoint_with_examples(&examples);
        let seen = RefCell::new(Vec::new());
        let bound = bind(
            |case: &Case| {
                seen.borrow_mut().push(case.clone());
                Ok(())
            },
            &endpoint,
            &JsonSchemaGenerator::default(),
            Some(RunSettings::default().max_examples(max_examples).derandomize(true)),
        )
        .unwrap();

        let report = bound.run().unwrap();
        let seen = seen.take();
        prop_assert_eq!(report.examples_executed, examples.len());
        prop_assert_eq!(report.random_executions, u64::from(max_examples));
        prop_assert_eq!(seen.len(), examples.len() + max_examples as usize);
        prop_assert_eq!(&seen[..examples.len()], bound.example_cases());
    }
}
