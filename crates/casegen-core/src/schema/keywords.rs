//! Keyword readers and `allOf` merging over raw schema maps.

use std::{collections::BTreeSet, str::FromStr};

use serde_json::{json, Map, Value};
use strum::{Display, EnumString};

use crate::{Error, Result};

pub(super) type SchemaMap = Map<String, Value>;

/// Instance types named by the `type` keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub(super) enum JsonType {
    Null,
    Boolean,
    Integer,
    Number,
    String,
    Array,
    Object,
}

const OBJECT_KEYWORDS: &[&str] = &[
    "properties",
    "required",
    "additionalProperties",
    "patternProperties",
    "minProperties",
    "maxProperties",
];
const ARRAY_KEYWORDS: &[&str] = &["items", "minItems", "maxItems", "uniqueItems"];
const STRING_KEYWORDS: &[&str] = &["minLength", "maxLength", "pattern", "format"];
const NUMBER_KEYWORDS: &[&str] = &[
    "minimum",
    "maximum",
    "exclusiveMinimum",
    "exclusiveMaximum",
    "multipleOf",
];

/// Types listed by `type`, in declaration order.
pub(super) fn declared_types(map: &SchemaMap) -> Result<Vec<JsonType>> {
    let parse = |name: &Value| {
        name.as_str()
            .and_then(|name| JsonType::from_str(name).ok())
            .ok_or_else(|| Error::invalid_schema(format!("unknown type {name}")))
    };
    match map.get("type") {
        None => Ok(Vec::new()),
        Some(Value::Array(names)) => names.iter().map(parse).collect(),
        Some(name) => parse(name).map(|ty| vec![ty]),
    }
}

/// Types implied by the validation keywords present, for untyped schemas.
pub(super) fn inferred_types(map: &SchemaMap) -> Vec<JsonType> {
    [
        (OBJECT_KEYWORDS, JsonType::Object),
        (ARRAY_KEYWORDS, JsonType::Array),
        (STRING_KEYWORDS, JsonType::String),
        (NUMBER_KEYWORDS, JsonType::Number),
    ]
    .into_iter()
    .filter(|(keywords, _)| keywords.iter().any(|keyword| map.contains_key(*keyword)))
    .map(|(_, ty)| ty)
    .collect()
}

pub(super) fn number_keyword(map: &SchemaMap, key: &str) -> Result<Option<f64>> {
    match map.get(key) {
        None => Ok(None),
        Some(value) => value
            .as_f64()
            .map(Some)
            .ok_or_else(|| Error::invalid_schema(format!("`{key}` must be a number, got {value}"))),
    }
}

pub(super) fn count_keyword(map: &SchemaMap, key: &str) -> Result<Option<usize>> {
    match map.get(key) {
        None => Ok(None),
        Some(value) => value
            .as_u64()
            .and_then(|count| usize::try_from(count).ok())
            .map(Some)
            .ok_or_else(|| {
                Error::invalid_schema(format!(
                    "`{key}` must be a non-negative integer, got {value}"
                ))
            }),
    }
}

/// A `[min, max]` count range where `max` may be open.
pub(super) fn count_range(map: &SchemaMap, min_key: &str, max_key: &str) -> Result<(usize, Option<usize>)> {
    let min = count_keyword(map, min_key)?.unwrap_or(0);
    let max = count_keyword(map, max_key)?;
    match max {
        Some(max) if min > max => Err(Error::unsatisfiable(format!(
            "`{min_key}` {min} exceeds `{max_key}` {max}"
        ))),
        _ => Ok((min, max)),
    }
}

/// One side of a numeric range
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) enum Bound {
    Inclusive(f64),
    Exclusive(f64),
}

pub(super) fn lower_bound(map: &SchemaMap) -> Result<Option<Bound>> {
    bound(map, "minimum", "exclusiveMinimum", |inclusive, exclusive| inclusive > exclusive)
}

pub(super) fn upper_bound(map: &SchemaMap) -> Result<Option<Bound>> {
    bound(map, "maximum", "exclusiveMaximum", |inclusive, exclusive| inclusive < exclusive)
}

fn bound(
    map: &SchemaMap,
    inclusive_key: &str,
    exclusive_key: &str,
    inclusive_is_tighter: impl Fn(f64, f64) -> bool,
) -> Result<Option<Bound>> {
    let inclusive = number_keyword(map, inclusive_key)?;
    match map.get(exclusive_key) {
        None | Some(Value::Bool(false)) => Ok(inclusive.map(Bound::Inclusive)),
        Some(Value::Bool(true)) => Ok(inclusive.map(Bound::Exclusive)),
        Some(Value::Number(exclusive)) => {
            let exclusive = exclusive.as_f64().ok_or_else(|| {
                Error::invalid_schema(format!("`{exclusive_key}` is not representable"))
            })?;
            Ok(Some(match inclusive {
                Some(inclusive) if inclusive_is_tighter(inclusive, exclusive) => {
                    Bound::Inclusive(inclusive)
                }
                _ => Bound::Exclusive(exclusive),
            }))
        }
        Some(other) => Err(Error::invalid_schema(format!(
            "`{exclusive_key}` must be a number or a boolean, got {other}"
        ))),
    }
}

pub(super) fn is_trivially_true(schema: &Value) -> bool {
    match schema {
        Value::Bool(accepts) => *accepts,
        Value::Object(map) => map.keys().all(|key| is_annotation(key)),
        _ => false,
    }
}

fn is_annotation(key: &str) -> bool {
    matches!(
        key,
        "example" | "examples" | "description" | "title" | "default" | "$comment" | "deprecated"
    )
}

/// Fold the `allOf` parts of `map` into one schema map.
pub(super) fn merge_all_of(map: &SchemaMap, parts: &Value) -> Result<SchemaMap> {
    let parts = parts
        .as_array()
        .ok_or_else(|| Error::invalid_schema("`allOf` must be an array"))?;
    let mut base = map.clone();
    base.remove("allOf");
    let mut merged = base.clone();
    for part in parts {
        merge_schema_into(&mut merged, part)?;
    }

    let closures: Vec<Closure> = std::iter::once(&base)
        .chain(parts.iter().filter_map(Value::as_object))
        .filter_map(closure)
        .collect();
    restrict_properties(&mut merged, &closures)?;
    Ok(merged)
}

/// Property names one `allOf` part declares, and the `additionalProperties`
/// it applies to every other name.
type Closure = (BTreeSet<String>, Value);

fn closure(part: &SchemaMap) -> Option<Closure> {
    let extra = part.get("additionalProperties")?;
    if is_trivially_true(extra) {
        return None;
    }
    let declared = part
        .get("properties")
        .and_then(Value::as_object)
        .map(|properties| properties.keys().cloned().collect())
        .unwrap_or_default();
    Some((declared, extra.clone()))
}

/// Apply each part's `additionalProperties` to properties other parts
/// introduced: dropped when the part forbids extras, constrained otherwise.
fn restrict_properties(merged: &mut SchemaMap, closures: &[Closure]) -> Result<()> {
    let required: Vec<String> = merged
        .get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).map(str::to_string).collect())
        .unwrap_or_default();
    let Some(Value::Object(properties)) = merged.get_mut("properties") else {
        return Ok(());
    };
    for (declared, extra) in closures {
        let undeclared: Vec<String> = properties
            .keys()
            .filter(|name| !declared.contains(*name))
            .cloned()
            .collect();
        for name in undeclared {
            if extra == &Value::Bool(false) {
                if required.contains(&name) {
                    return Err(Error::unsatisfiable(format!(
                        "required property `{name}` is forbidden by `additionalProperties: false` in `allOf`"
                    )));
                }
                properties.remove(&name);
            } else if let Some(schema) = properties.get_mut(&name) {
                *schema = json!({"allOf": [schema.clone(), extra]});
            }
        }
    }
    Ok(())
}

/// Intersect `part` into `target`, keyword by keyword.
pub(super) fn merge_schema_into(target: &mut SchemaMap, part: &Value) -> Result<()> {
    let part = match part {
        Value::Bool(true) => return Ok(()),
        Value::Bool(false) => return Err(Error::unsatisfiable("subschema `false` admits no values")),
        Value::Object(part) => part,
        other => {
            return Err(Error::invalid_schema(format!(
                "subschema must be an object or a boolean, got {other}"
            )))
        }
    };
    for (key, value) in part {
        let combined = match target.get(key) {
            None => value.clone(),
            Some(existing) => merge_keyword(key, existing, value)?,
        };
        target.insert(key.clone(), combined);
    }
    Ok(())
}

fn merge_keyword(key: &str, existing: &Value, incoming: &Value) -> Result<Value> {
    if existing == incoming || is_annotation(key) {
        return Ok(existing.clone());
    }
    match (key, existing, incoming) {
        (
            "minimum" | "exclusiveMinimum" | "minLength" | "minItems" | "minProperties",
            Value::Number(a),
            Value::Number(b),
        ) => Ok(if b.as_f64() > a.as_f64() { incoming } else { existing }.clone()),
        (
            "maximum" | "exclusiveMaximum" | "maxLength" | "maxItems" | "maxProperties",
            Value::Number(a),
            Value::Number(b),
        ) => Ok(if b.as_f64() < a.as_f64() { incoming } else { existing }.clone()),
        ("exclusiveMinimum" | "exclusiveMaximum" | "uniqueItems" | "nullable", Value::Bool(a), Value::Bool(b)) => {
            // `nullable` only survives when every part allows null.
            Ok(Value::Bool(if key == "nullable" { *a && *b } else { *a || *b }))
        }
        ("required", Value::Array(a), Value::Array(b)) => {
            let mut names = a.clone();
            names.extend(b.iter().filter(|name| !a.contains(name)).cloned());
            Ok(Value::Array(names))
        }
        ("allOf", Value::Array(a), Value::Array(b)) => {
            Ok(Value::Array(a.iter().chain(b.iter()).cloned().collect()))
        }
        ("properties", Value::Object(a), Value::Object(b)) => {
            let mut properties = a.clone();
            for (name, schema) in b {
                let combined = match a.get(name) {
                    Some(current) => json!({"allOf": [current, schema]}),
                    None => schema.clone(),
                };
                properties.insert(name.clone(), combined);
            }
            Ok(Value::Object(properties))
        }
        ("items" | "additionalProperties", a, b) if !a.is_array() && !b.is_array() => {
            Ok(json!({"allOf": [a, b]}))
        }
        ("type", a, b) => merge_types(a, b),
        ("enum", Value::Array(a), Value::Array(b)) => Ok(Value::Array(
            a.iter().filter(|value| b.contains(value)).cloned().collect(),
        )),
        _ => Err(Error::invalid_schema(format!(
            "conflicting values for `{key}` in `allOf`: {existing} and {incoming}"
        ))),
    }
}

fn merge_types(existing: &Value, incoming: &Value) -> Result<Value> {
    let as_set = |value: &Value| -> Result<BTreeSet<JsonType>> {
        let mut single = SchemaMap::new();
        single.insert("type".to_string(), value.clone());
        Ok(declared_types(&single)?.into_iter().collect())
    };
    let (a, b) = (as_set(existing)?, as_set(incoming)?);
    let mut common: BTreeSet<JsonType> = a.intersection(&b).copied().collect();
    // `integer` is a subset of `number`.
    if (a.contains(&JsonType::Integer) && b.contains(&JsonType::Number))
        || (a.contains(&JsonType::Number) && b.contains(&JsonType::Integer))
    {
        common.insert(JsonType::Integer);
    }
    let mut names: Vec<Value> = common
        .into_iter()
        .map(|ty| Value::String(ty.to_string()))
        .collect();
    match names.len() {
        0 => Err(Error::unsatisfiable(format!(
            "types {existing} and {incoming} have no common instance"
        ))),
        1 => Ok(names.remove(0)),
        _ => Ok(Value::Array(names)),
    }
}
