//! JSON Schema to `proptest` strategy translation.

use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};

use proptest::{
    prelude::*,
    strategy::{BoxedStrategy, Just, Union},
    test_runner::{RngAlgorithm, TestRng, TestRunner},
};
use serde_json::{Map, Number, Value};

use super::{
    keywords::{
        count_range, declared_types, inferred_types, is_trivially_true, lower_bound,
        merge_all_of, merge_schema_into, number_keyword, upper_bound, Bound, JsonType, SchemaMap,
    },
    validation::compile,
    GenerationLimits,
};
use crate::{Error, Result};

type ValueStrategy = BoxedStrategy<Value>;

/// Names drawn for undeclared object properties.
const EXTRA_KEY_PATTERN: &str = "[a-z][a-z0-9_]{0,7}";

/// Half-width of the range drawn for numbers without bounds.
const DEFAULT_NUMBER_SPAN: f64 = 1.0e6;

/// Rejections tolerated when checking a filtered strategy can draw at all.
const DRAWABLE_REJECTS: u32 = 512;

const MAX_DECIMAL_PLACES: usize = 15;

pub(super) fn translate(schema: &Value, limits: &GenerationLimits) -> Result<ValueStrategy> {
    match schema {
        Value::Bool(true) => Ok(any_value(limits)),
        Value::Bool(false) => Err(Error::unsatisfiable("schema `false` admits no values")),
        Value::Object(map) => translate_map(map, limits),
        other => Err(Error::invalid_schema(format!(
            "schema must be an object or a boolean, got {other}"
        ))),
    }
}

fn translate_map(map: &SchemaMap, limits: &GenerationLimits) -> Result<ValueStrategy> {
    if let Some(reference) = map.get("$ref") {
        return Err(Error::invalid_schema(format!(
            "unresolved reference {reference}; references must be resolved before generation"
        )));
    }
    if let Some(parts) = map.get("allOf") {
        return translate_map(&merge_all_of(map, parts)?, limits);
    }
    if let Some(negated) = map.get("not") {
        return if is_trivially_true(negated) {
            Err(Error::unsatisfiable("`not` excludes every value"))
        } else {
            Err(Error::invalid_schema("only `not: {}` is supported"))
        };
    }

    let base = if map.contains_key("const") || map.contains_key("enum") {
        literal_strategy(map)?
    } else if let Some(branches) = map.get("anyOf") {
        union_strategy(map, branches, limits)?
    } else if let Some(branches) = map.get("oneOf") {
        exclusive_union_strategy(map, branches, limits)?
    } else {
        typed_strategy(map, limits)?
    };

    if map.get("nullable").and_then(Value::as_bool).unwrap_or(false) {
        Ok(prop_oneof![Just(Value::Null), base].boxed())
    } else {
        Ok(base)
    }
}

fn one_of(mut strategies: Vec<ValueStrategy>) -> ValueStrategy {
    if strategies.len() == 1 {
        strategies.remove(0)
    } else {
        Union::new(strategies).boxed()
    }
}

/// Keep satisfiable alternatives; fail only when none remain.
fn satisfiable_alternatives(
    candidates: impl Iterator<Item = Result<ValueStrategy>>,
    context: &str,
) -> Result<ValueStrategy> {
    let mut strategies = Vec::new();
    let mut last_reason = None;
    for candidate in candidates {
        match candidate {
            Ok(strategy) => strategies.push(strategy),
            Err(Error::UnsatisfiableSchema { reason, .. }) => last_reason = Some(reason),
            Err(other) => return Err(other),
        }
    }
    if strategies.is_empty() {
        let reason = last_reason.unwrap_or_else(|| "no alternatives".to_string());
        return Err(Error::unsatisfiable(format!("{context}: {reason}")));
    }
    Ok(one_of(strategies))
}

/// `const`/`enum` candidates that also satisfy every sibling keyword.
fn literal_strategy(map: &SchemaMap) -> Result<ValueStrategy> {
    let mut candidates = match (map.get("const"), map.get("enum")) {
        (Some(value), None) => vec![value.clone()],
        (constant, Some(Value::Array(values))) => values
            .iter()
            .filter(|value| constant.map_or(true, |constant| constant == *value))
            .cloned()
            .collect(),
        (_, Some(other)) => {
            return Err(Error::invalid_schema(format!(
                "`enum` must be an array, got {other}"
            )))
        }
        (None, None) => Vec::new(),
    };

    let nullable = map.get("nullable").and_then(Value::as_bool).unwrap_or(false);
    let mut rest = map.clone();
    for keyword in ["const", "enum", "nullable"] {
        rest.remove(keyword);
    }
    let rest = Value::Object(rest);
    if !is_trivially_true(&rest) {
        let validator = compile(&rest)?;
        candidates.retain(|value| (nullable && value.is_null()) || validator.is_valid(value));
    }

    if candidates.is_empty() {
        return Err(Error::unsatisfiable(
            "no `const`/`enum` value satisfies the rest of the schema",
        ));
    }
    Ok(proptest::sample::select(candidates).boxed())
}

fn union_strategy(map: &SchemaMap, branches: &Value, limits: &GenerationLimits) -> Result<ValueStrategy> {
    let branches = branches
        .as_array()
        .ok_or_else(|| Error::invalid_schema("`anyOf` must be an array"))?;
    let mut siblings = map.clone();
    siblings.remove("anyOf");
    let candidates = branches.iter().map(|branch| {
        let mut merged = siblings.clone();
        merge_schema_into(&mut merged, branch)?;
        translate_map(&merged, limits)
    });
    satisfiable_alternatives(candidates, "every `anyOf` branch is unsatisfiable")
}

/// `oneOf`: each branch keeps only values no other branch accepts.
fn exclusive_union_strategy(
    map: &SchemaMap,
    branches: &Value,
    limits: &GenerationLimits,
) -> Result<ValueStrategy> {
    let branches = branches
        .as_array()
        .ok_or_else(|| Error::invalid_schema("`oneOf` must be an array"))?;
    let validators = Arc::new(branches.iter().map(compile).collect::<Result<Vec<_>>>()?);
    let mut siblings = map.clone();
    siblings.remove("oneOf");
    let candidates = branches.iter().enumerate().map(|(index, branch)| {
        let mut merged = siblings.clone();
        merge_schema_into(&mut merged, branch)?;
        let validators = Arc::clone(&validators);
        let exclusive = translate_map(&merged, limits)?
            .prop_filter("value must match exactly one `oneOf` branch", move |value| {
                validators
                    .iter()
                    .enumerate()
                    .all(|(other, validator)| other == index || !validator.is_valid(value))
            })
            .boxed();
        ensure_drawable(exclusive, "branch only yields values other branches also match")
    });
    satisfiable_alternatives(candidates, "no `oneOf` branch admits a value of its own")
}

/// Draw once from a filtered strategy under a small rejection budget.
///
/// A filter that rejects every attempt means the schema is unsatisfiable in
/// practice; this surfaces it while building instead of on every draw.
fn ensure_drawable(strategy: ValueStrategy, context: &str) -> Result<ValueStrategy> {
    let config = ProptestConfig {
        max_local_rejects: DRAWABLE_REJECTS,
        failure_persistence: None,
        ..ProptestConfig::default()
    };
    let mut runner =
        TestRunner::new_with_rng(config, TestRng::deterministic_rng(RngAlgorithm::ChaCha));
    match strategy.new_tree(&mut runner) {
        Ok(_) => Ok(strategy),
        Err(reason) => Err(Error::unsatisfiable(format!("{context}: {reason}"))),
    }
}

fn typed_strategy(map: &SchemaMap, limits: &GenerationLimits) -> Result<ValueStrategy> {
    let declared = declared_types(map)?;
    let types = if declared.is_empty() && !map.contains_key("type") {
        inferred_types(map)
    } else {
        declared
    };
    if types.is_empty() {
        return if map.contains_key("type") {
            Err(Error::unsatisfiable("`type` lists no types"))
        } else {
            Ok(any_value(limits))
        };
    }
    let candidates = types.into_iter().map(|ty| match ty {
        JsonType::Null => Ok(Just(Value::Null).boxed()),
        JsonType::Boolean => Ok(any::<bool>().prop_map(Value::Bool).boxed()),
        JsonType::Integer => integer_strategy(map),
        JsonType::Number => number_strategy(map),
        JsonType::String => string_strategy(map, limits),
        JsonType::Array => array_strategy(map, limits),
        JsonType::Object => object_strategy(map, limits),
    });
    satisfiable_alternatives(candidates, "no listed type can be satisfied")
}

#[allow(clippy::cast_possible_truncation)]
fn integer_strategy(map: &SchemaMap) -> Result<ValueStrategy> {
    // Float-to-int `as` casts saturate, which clamps open-ended bounds.
    let lo = match lower_bound(map)? {
        Some(Bound::Inclusive(x)) => x.ceil() as i64,
        Some(Bound::Exclusive(x)) => (x.floor() as i64).saturating_add(1),
        None => i64::MIN,
    };
    let hi = match upper_bound(map)? {
        Some(Bound::Inclusive(x)) => x.floor() as i64,
        Some(Bound::Exclusive(x)) => (x.ceil() as i64).saturating_sub(1),
        None => i64::MAX,
    };
    if lo > hi {
        return Err(Error::unsatisfiable(format!(
            "no integer lies between {lo} and {hi}"
        )));
    }
    match number_keyword(map, "multipleOf")? {
        None => Ok((lo..=hi).prop_map(Value::from).boxed()),
        Some(step) if step >= 1.0 && step.fract() == 0.0 => {
            let step = step as i64;
            let first = lo.div_euclid(step) + i64::from(lo.rem_euclid(step) != 0);
            let last = hi.div_euclid(step);
            if first > last {
                return Err(Error::unsatisfiable(format!(
                    "no multiple of {step} lies between {lo} and {hi}"
                )));
            }
            Ok((first..=last).prop_map(move |k| Value::from(k * step)).boxed())
        }
        Some(step) => Err(Error::invalid_schema(format!(
            "integer `multipleOf` must be a positive whole number, got {step}"
        ))),
    }
}

fn number_strategy(map: &SchemaMap) -> Result<ValueStrategy> {
    let lo = lower_bound(map)?.map(|bound| match bound {
        Bound::Inclusive(x) => x,
        Bound::Exclusive(x) => step_above(x),
    });
    let hi = upper_bound(map)?.map(|bound| match bound {
        Bound::Inclusive(x) => x,
        Bound::Exclusive(x) => -step_above(-x),
    });
    let (lo, hi) = match (lo, hi) {
        (Some(lo), Some(hi)) => (lo, hi),
        (Some(lo), None) => (lo, lo + DEFAULT_NUMBER_SPAN),
        (None, Some(hi)) => (hi - DEFAULT_NUMBER_SPAN, hi),
        (None, None) => (-DEFAULT_NUMBER_SPAN, DEFAULT_NUMBER_SPAN),
    };
    if lo > hi {
        return Err(Error::unsatisfiable(format!(
            "no number lies between {lo} and {hi}"
        )));
    }
    match number_keyword(map, "multipleOf")? {
        None => Ok((lo..=hi)
            .prop_filter_map("number must be finite", |x| {
                Number::from_f64(x).map(Value::Number)
            })
            .boxed()),
        Some(step) if step > 0.0 => multiple_of_number(lo, hi, step),
        Some(step) => Err(Error::invalid_schema(format!(
            "`multipleOf` must be positive, got {step}"
        ))),
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn multiple_of_number(lo: f64, hi: f64, step: f64) -> Result<ValueStrategy> {
    let first = (lo / step).ceil() as i64;
    let last = (hi / step).floor() as i64;
    if first > last {
        return Err(Error::unsatisfiable(format!(
            "no multiple of {step} lies between {lo} and {hi}"
        )));
    }
    // k * 0.01 drifts off the decimal grid; k * 1 / 100 lands on the nearest float.
    let scale = 10_f64.powi(decimal_places(step));
    let (units, scale) = match (step * scale).round() {
        units if units > 0.0 => (units, scale),
        _ => (step, 1.0),
    };
    let multiples = (first..=last)
        .prop_map(move |k| k as f64 * units / scale)
        .prop_filter("value must divide evenly by `multipleOf`", move |x| {
            is_multiple(*x, step)
        })
        .prop_filter_map("number must be finite", |x| {
            Number::from_f64(x).map(Value::Number)
        })
        .boxed();
    ensure_drawable(
        multiples,
        &format!("no multiple of {step} between {lo} and {hi} divides evenly as a float"),
    )
}

/// Decimal places of `step` as written, at most 15.
fn decimal_places(step: f64) -> i32 {
    let written = step.to_string();
    let places = written
        .split_once('.')
        .map_or(0, |(_, fraction)| fraction.len().min(MAX_DECIMAL_PLACES));
    i32::try_from(places).unwrap_or(0)
}

/// Float division check matching how validators test `multipleOf`.
fn is_multiple(x: f64, step: f64) -> bool {
    ((x / step) % 1.0).abs() < f64::EPSILON
}

/// Smallest float strictly above `x`, or close to it.
fn step_above(x: f64) -> f64 {
    x + x.abs().max(1.0) * f64::EPSILON
}

fn string_strategy(map: &SchemaMap, limits: &GenerationLimits) -> Result<ValueStrategy> {
    let (min, max) = count_range(map, "minLength", "maxLength")?;
    let pattern = match map.get("pattern") {
        None => map
            .get("format")
            .and_then(Value::as_str)
            .and_then(format_pattern)
            .map(str::to_string),
        Some(Value::String(pattern)) => Some(pattern.clone()),
        Some(other) => {
            return Err(Error::invalid_schema(format!(
                "`pattern` must be a string, got {other}"
            )))
        }
    };

    match pattern {
        Some(pattern) => {
            let regex = proptest::string::string_regex(strip_anchors(&pattern)).map_err(|e| {
                Error::invalid_schema(format!("pattern `{pattern}` cannot be generated: {e}"))
            })?;
            Ok(regex
                .prop_filter("string length outside minLength/maxLength", move |s| {
                    let length = s.chars().count();
                    length >= min && max.map_or(true, |max| length <= max)
                })
                .prop_map(Value::String)
                .boxed())
        }
        None => {
            let upper = max.unwrap_or(min + limits.max_string_length);
            Ok(proptest::collection::vec(any::<char>(), min..=upper)
                .prop_map(|chars| Value::String(chars.into_iter().collect()))
                .boxed())
        }
    }
}

/// Generation patterns for the `format` values worth honouring.
///
/// Other formats are annotations and generate plain strings.
fn format_pattern(format: &str) -> Option<&'static str> {
    const DATE: &str = "[0-9]{4}-(0[1-9]|1[0-2])-(0[1-9]|1[0-9]|2[0-8])";
    match format {
        "date" => Some(DATE),
        "date-time" => Some(
            "[0-9]{4}-(0[1-9]|1[0-2])-(0[1-9]|1[0-9]|2[0-8])T([01][0-9]|2[0-3]):[0-5][0-9]:[0-5][0-9]Z",
        ),
        "email" => Some("[a-z0-9]{1,12}@[a-z]{1,12}\\.(com|org|net)"),
        "uuid" => Some("[0-9a-f]{8}-[0-9a-f]{4}-4[0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}"),
        "ipv4" => Some("(25[0-5]|2[0-4][0-9]|1[0-9]{2}|[1-9]?[0-9])(\\.(25[0-5]|2[0-4][0-9]|1[0-9]{2}|[1-9]?[0-9])){3}"),
        _ => None,
    }
}

/// Drop `^`/`$` anchors; generated strings always match the whole pattern.
fn strip_anchors(pattern: &str) -> &str {
    let pattern = pattern.strip_prefix('^').unwrap_or(pattern);
    match pattern.strip_suffix('$') {
        Some(rest) if !rest.ends_with('\\') => rest,
        _ => pattern,
    }
}

fn array_strategy(map: &SchemaMap, limits: &GenerationLimits) -> Result<ValueStrategy> {
    let (min, max) = count_range(map, "minItems", "maxItems")?;
    let unique = map
        .get("uniqueItems")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    if let Some(Value::Array(positions)) = map.get("items") {
        if positions.len() < min || max.is_some_and(|max| positions.len() > max) {
            return Err(Error::invalid_schema(format!(
                "{} positional `items` conflict with minItems/maxItems",
                positions.len()
            )));
        }
        let items = positions
            .iter()
            .map(|schema| translate(schema, limits))
            .collect::<Result<Vec<_>>>()?;
        return Ok(items
            .prop_filter("array items must be unique", move |items| {
                !unique || all_distinct(items)
            })
            .prop_map(Value::Array)
            .boxed());
    }

    let item = match map.get("items") {
        None => any_value(limits),
        Some(schema) => match translate(schema, limits) {
            Ok(item) => item,
            // Only the empty array remains.
            Err(Error::UnsatisfiableSchema { .. }) if min == 0 => {
                return Ok(Just(Value::Array(Vec::new())).boxed())
            }
            Err(other) => return Err(other),
        },
    };
    let upper = max.unwrap_or(min + limits.max_items);
    Ok(proptest::collection::vec(item, min..=upper)
        .prop_filter("array items must be unique", move |items| {
            !unique || all_distinct(items)
        })
        .prop_map(Value::Array)
        .boxed())
}

fn all_distinct(items: &[Value]) -> bool {
    items
        .iter()
        .enumerate()
        .all(|(index, item)| !items[..index].contains(item))
}

/// Where undeclared properties may come from
enum Extra {
    Forbidden,
    Any,
    Schema(Value),
}

fn object_strategy(map: &SchemaMap, limits: &GenerationLimits) -> Result<ValueStrategy> {
    let properties = match map.get("properties") {
        None => SchemaMap::new(),
        Some(Value::Object(properties)) => properties.clone(),
        Some(other) => {
            return Err(Error::invalid_schema(format!(
                "`properties` must be an object, got {other}"
            )))
        }
    };
    let required = required_names(map)?;
    let extra = match map.get("additionalProperties") {
        None | Some(Value::Bool(true)) => Extra::Any,
        Some(Value::Bool(false)) => Extra::Forbidden,
        Some(schema) => Extra::Schema(schema.clone()),
    };
    let (min_properties, max_properties) = count_range(map, "minProperties", "maxProperties")?;
    if max_properties.is_some_and(|max| required.len() > max) {
        return Err(Error::unsatisfiable(format!(
            "{} required properties exceed `maxProperties`",
            required.len()
        )));
    }

    let mut fields: Vec<BoxedStrategy<Option<(String, Value)>>> = Vec::new();
    for (name, schema) in &properties {
        let is_required = required.contains(name);
        match translate(schema, limits) {
            Ok(strategy) => fields.push(field_strategy(name.clone(), strategy, is_required)),
            // An optional property that admits no value is simply never present.
            Err(Error::UnsatisfiableSchema { .. }) if !is_required => {}
            Err(Error::UnsatisfiableSchema { reason, .. }) => {
                return Err(Error::unsatisfiable(format!(
                    "required property `{name}`: {reason}"
                )))
            }
            Err(other) => return Err(other),
        }
    }

    let extra_values = match &extra {
        Extra::Forbidden => None,
        Extra::Any => Some(any_value(limits)),
        Extra::Schema(schema) => match translate(schema, limits) {
            Ok(strategy) => Some(strategy),
            Err(Error::UnsatisfiableSchema { .. }) => None,
            Err(other) => return Err(other),
        },
    };

    for name in required.iter().filter(|name| !properties.contains_key(*name)) {
        let strategy = extra_values.clone().ok_or_else(|| {
            Error::unsatisfiable(format!(
                "required property `{name}` is forbidden by `additionalProperties`"
            ))
        })?;
        fields.push(field_strategy(name.clone(), strategy, true));
    }

    let known: BTreeSet<String> = properties.keys().chain(required.iter()).cloned().collect();
    // Undeclared keys could collide with `patternProperties` constraints.
    let extras: BoxedStrategy<BTreeMap<String, Value>> = match extra_values {
        Some(values) if !map.contains_key("patternProperties") => proptest::collection::btree_map(
            EXTRA_KEY_PATTERN,
            values,
            0..=limits.max_extra_properties.max(min_properties),
        )
        .boxed(),
        _ => Just(BTreeMap::new()).boxed(),
    };

    Ok((fields, extras)
        .prop_map(move |(fields, extras)| {
            let mut object: Map<String, Value> = fields.into_iter().flatten().collect();
            for (name, value) in extras {
                if !known.contains(&name) {
                    object.entry(name).or_insert(value);
                }
            }
            object
        })
        .prop_filter(
            "property count outside minProperties/maxProperties",
            move |object| {
                object.len() >= min_properties
                    && max_properties.map_or(true, |max| object.len() <= max)
            },
        )
        .prop_map(Value::Object)
        .boxed())
}

fn required_names(map: &SchemaMap) -> Result<Vec<String>> {
    match map.get("required") {
        None => Ok(Vec::new()),
        Some(Value::Array(names)) => names
            .iter()
            .map(|name| {
                name.as_str().map(str::to_string).ok_or_else(|| {
                    Error::invalid_schema(format!("`required` entries must be strings, got {name}"))
                })
            })
            .collect(),
        Some(other) => Err(Error::invalid_schema(format!(
            "`required` must be an array, got {other}"
        ))),
    }
}

fn field_strategy(
    name: String,
    strategy: ValueStrategy,
    required: bool,
) -> BoxedStrategy<Option<(String, Value)>> {
    if required {
        strategy
            .prop_map(move |value| Some((name.clone(), value)))
            .boxed()
    } else {
        proptest::option::of(strategy)
            .prop_map(move |value| value.map(|value| (name.clone(), value)))
            .boxed()
    }
}

/// Any JSON value, nested at most `limits.any_value_depth` levels.
pub(super) fn any_value(limits: &GenerationLimits) -> ValueStrategy {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        (-DEFAULT_NUMBER_SPAN..DEFAULT_NUMBER_SPAN)
            .prop_filter_map("number must be finite", |x| Number::from_f64(x).map(Value::Number)),
        "[ -~]{0,16}".prop_map(Value::String),
    ];
    leaf.prop_recursive(limits.any_value_depth, 32, 4, |inner| {
        prop_oneof![
            proptest::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            proptest::collection::btree_map(EXTRA_KEY_PATTERN, inner, 0..4)
                .prop_map(|entries| Value::Object(entries.into_iter().collect())),
        ]
    })
    .boxed()
}

#[cfg(test)]
mod tests {
    use proptest::test_runner::TestRunner;
    use serde_json::json;

    use super::*;

    fn draw(schema: &Value) -> Value {
        let strategy = translate(schema, &GenerationLimits::default()).unwrap();
        let mut runner = TestRunner::deterministic();
        strategy.new_tree(&mut runner).unwrap().current()
    }

    fn draws(schema: &Value, count: usize) -> Vec<Value> {
        let strategy = translate(schema, &GenerationLimits::default()).unwrap();
        let mut runner = TestRunner::deterministic();
        (0..count)
            .map(|_| strategy.new_tree(&mut runner).unwrap().current())
            .collect()
    }

    fn translate_err(schema: &Value) -> Error {
        match translate(schema, &GenerationLimits::default()) {
            Ok(_) => panic!("expected {schema} to be rejected"),
            Err(err) => err,
        }
    }

    #[test]
    fn test_contradictory_integer_range_is_unsatisfiable() {
        let err = translate_err(&json!({"type": "integer", "minimum": 10, "maximum": 5}));
        assert!(matches!(err, Error::UnsatisfiableSchema { .. }));
    }

    #[test]
    fn test_false_schema_and_empty_enum_are_unsatisfiable() {
        assert!(matches!(
            translate_err(&json!(false)),
            Error::UnsatisfiableSchema { .. }
        ));
        assert!(matches!(
            translate_err(&json!({"enum": []})),
            Error::UnsatisfiableSchema { .. }
        ));
        assert!(matches!(
            translate_err(&json!({"not": {}})),
            Error::UnsatisfiableSchema { .. }
        ));
    }

    #[test]
    fn test_unresolved_reference_is_invalid() {
        let err = translate_err(&json!({"$ref": "#/components/schemas/User"}));
        assert!(matches!(err, Error::InvalidSchema { .. }));
    }

    #[test]
    fn test_const_and_enum_draw_listed_values() {
        assert_eq!(draw(&json!({"const": "fixed"})), json!("fixed"));
        for value in draws(&json!({"enum": [1, "two", null]}), 20) {
            assert!([json!(1), json!("two"), Value::Null].contains(&value));
        }
    }

    #[test]
    fn test_integer_bounds_and_multiples() {
        for value in draws(
            &json!({"type": "integer", "exclusiveMinimum": 3, "maximum": 30, "multipleOf": 4}),
            50,
        ) {
            let n = value.as_i64().unwrap();
            assert!(n > 3 && n <= 30 && n % 4 == 0, "{n}");
        }
    }

    #[test]
    fn test_exclusive_integer_range_without_members_is_unsatisfiable() {
        let err = translate_err(&json!({
            "type": "integer", "minimum": 5, "exclusiveMinimum": true,
            "maximum": 6, "exclusiveMaximum": true
        }));
        assert!(matches!(err, Error::UnsatisfiableSchema { .. }));
    }

    #[test]
    fn test_number_respects_exclusive_bounds() {
        for value in draws(
            &json!({"type": "number", "exclusiveMinimum": 0.5, "exclusiveMaximum": 0.75}),
            50,
        ) {
            let x = value.as_f64().unwrap();
            assert!(x > 0.5 && x < 0.75, "{x}");
        }
    }

    #[test]
    fn test_string_lengths_and_patterns() {
        for value in draws(&json!({"type": "string", "minLength": 2, "maxLength": 4}), 50) {
            let length = value.as_str().unwrap().chars().count();
            assert!((2..=4).contains(&length));
        }
        for value in draws(&json!({"type": "string", "pattern": "^[A-Z]{3}-[0-9]{2}$"}), 30) {
            let text = value.as_str().unwrap();
            assert_eq!(text.len(), 6);
            assert!(text.chars().take(3).all(|c| c.is_ascii_uppercase()));
            assert_eq!(&text[3..4], "-");
        }
    }

    #[test]
    fn test_inverted_string_lengths_are_unsatisfiable() {
        let err = translate_err(&json!({"type": "string", "minLength": 5, "maxLength": 1}));
        assert!(matches!(err, Error::UnsatisfiableSchema { .. }));
    }

    #[test]
    fn test_uuid_format_generates_uuids() {
        let value = draw(&json!({"type": "string", "format": "uuid"}));
        let text = value.as_str().unwrap();
        assert_eq!(text.len(), 36);
        assert_eq!(text.matches('-').count(), 4);
    }

    #[test]
    fn test_array_sizes_and_uniqueness() {
        for value in draws(
            &json!({"type": "array", "items": {"type": "integer", "minimum": 0, "maximum": 9},
                    "minItems": 2, "maxItems": 5, "uniqueItems": true}),
            30,
        ) {
            let items = value.as_array().unwrap();
            assert!((2..=5).contains(&items.len()));
            assert!(all_distinct(items));
        }
    }

    #[test]
    fn test_array_of_unsatisfiable_items_collapses_to_empty() {
        assert_eq!(
            draw(&json!({"type": "array", "items": false})),
            json!([])
        );
        let err = translate_err(&json!({"type": "array", "items": false, "minItems": 1}));
        assert!(matches!(err, Error::UnsatisfiableSchema { .. }));
    }

    #[test]
    fn test_object_required_and_closed_properties() {
        let schema = json!({
            "type": "object",
            "properties": {"id": {"type": "integer"}, "tag": {"type": "string"}},
            "required": ["id"],
            "additionalProperties": false
        });
        for value in draws(&schema, 40) {
            let object = value.as_object().unwrap();
            assert!(object["id"].is_i64());
            assert!(object.keys().all(|key| key == "id" || key == "tag"));
        }
    }

    #[test]
    fn test_required_property_forbidden_by_additional_properties() {
        let err = translate_err(&json!({
            "type": "object", "required": ["token"], "additionalProperties": false
        }));
        assert!(matches!(err, Error::UnsatisfiableSchema { .. }));
    }

    #[test]
    fn test_unsatisfiable_required_property_names_the_property() {
        let err = translate_err(&json!({
            "type": "object",
            "properties": {"age": {"type": "integer", "minimum": 10, "maximum": 5}},
            "required": ["age"]
        }));
        assert!(err.to_string().contains("`age`"));
    }

    #[test]
    fn test_any_of_skips_unsatisfiable_branches() {
        let schema = json!({"anyOf": [{"type": "integer", "minimum": 3, "maximum": 1}, {"type": "boolean"}]});
        for value in draws(&schema, 20) {
            assert!(value.is_boolean());
        }
    }

    #[test]
    fn test_all_of_intersects_constraints() {
        let schema = json!({
            "allOf": [
                {"type": "integer", "minimum": 0},
                {"maximum": 3}
            ]
        });
        for value in draws(&schema, 30) {
            let n = value.as_i64().unwrap();
            assert!((0..=3).contains(&n));
        }
    }

    fn validator(schema: &Value) -> jsonschema::Validator {
        jsonschema::validator_for(schema).unwrap()
    }

    #[test]
    fn test_one_of_keeps_values_matching_a_single_branch() {
        let schema = json!({"oneOf": [{"type": "integer"}, {"type": "number"}]});
        let check = validator(&schema);
        for value in draws(&schema, 40) {
            assert!(check.is_valid(&value), "{value}");
            assert!(!validator(&json!({"type": "integer"})).is_valid(&value));
        }
    }

    #[test]
    fn test_one_of_with_overlapping_ranges() {
        let schema = json!({"oneOf": [
            {"type": "integer", "minimum": 0, "maximum": 20},
            {"type": "integer", "minimum": 10, "maximum": 30}
        ]});
        for value in draws(&schema, 60) {
            let n = value.as_i64().unwrap();
            assert!((0..10).contains(&n) || (21..=30).contains(&n), "{n}");
        }
    }

    #[test]
    fn test_one_of_with_identical_branches_is_unsatisfiable() {
        let err = translate_err(&json!({"oneOf": [{"type": "boolean"}, {"type": "boolean"}]}));
        assert!(matches!(err, Error::UnsatisfiableSchema { .. }));
    }

    #[test]
    fn test_any_of_and_one_of_apply_together() {
        let schema = json!({
            "anyOf": [{"type": "integer", "minimum": 0, "maximum": 50}],
            "oneOf": [{"maximum": 10}, {"minimum": 5}]
        });
        for value in draws(&schema, 60) {
            let n = value.as_i64().unwrap();
            assert!((0..5).contains(&n) || (11..=50).contains(&n), "{n}");
        }
    }

    #[test]
    fn test_fractional_multiple_of_validates() {
        let schema = json!({"type": "number", "minimum": 0, "maximum": 10, "multipleOf": 0.01});
        let check = validator(&schema);
        for value in draws(&schema, 200) {
            assert!(check.is_valid(&value), "{value}");
        }
        let quarters = json!({"type": "number", "minimum": -5, "maximum": 5, "multipleOf": 0.25});
        let check = validator(&quarters);
        for value in draws(&quarters, 100) {
            assert!(check.is_valid(&value), "{value}");
        }
    }

    #[test]
    fn test_decimal_places() {
        assert_eq!(decimal_places(0.01), 2);
        assert_eq!(decimal_places(5.0), 0);
        assert_eq!(decimal_places(0.125), 3);
    }

    #[test]
    fn test_enum_values_must_satisfy_siblings() {
        for value in draws(&json!({"type": "string", "enum": ["a", 1, "b", null]}), 30) {
            assert!(value == json!("a") || value == json!("b"), "{value}");
        }
        for value in draws(&json!({"enum": [1, 5, 9], "minimum": 4}), 30) {
            assert!(value == json!(5) || value == json!(9), "{value}");
        }
        let values = draws(&json!({"type": "string", "enum": ["a", null], "nullable": true}), 40);
        assert!(values.contains(&Value::Null));
    }

    #[test]
    fn test_const_conflicting_with_siblings_is_unsatisfiable() {
        let err = translate_err(&json!({"const": 5, "type": "string"}));
        assert!(matches!(err, Error::UnsatisfiableSchema { .. }));
        let err = translate_err(&json!({"enum": ["x", "y"], "minLength": 3}));
        assert!(matches!(err, Error::UnsatisfiableSchema { .. }));
        assert_eq!(draw(&json!({"const": 4, "type": "integer", "minimum": 0})), json!(4));
    }

    #[test]
    fn test_nullable_adds_null() {
        let values = draws(&json!({"type": "boolean", "nullable": true}), 60);
        assert!(values.iter().all(|v| v.is_null() || v.is_boolean()));
        assert!(values.iter().any(Value::is_null));
    }

    #[test]
    fn test_strip_anchors_keeps_escaped_dollar() {
        assert_eq!(strip_anchors("^ab$"), "ab");
        assert_eq!(strip_anchors("cost\\$"), "cost\\$");
    }
}
