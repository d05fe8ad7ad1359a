//! Schema-to-generator translation.
//!
//! [`SchemaGenerator`] is the seam between case assembly and value
//! generation: given one JSON Schema it hands out a lazy, restartable
//! `proptest` strategy, and can draw a single value on demand without touching
//! the random stream of the test runner.
//!
//! [`JsonSchemaGenerator`] is the default implementation. It covers the
//! JSON Schema subset found in API descriptions:
//!
//! - **Literals**: `const`, `enum`, boolean schemas, OpenAPI `nullable`
//! - **Numbers**: `minimum`, `maximum`, `exclusiveMinimum`, `exclusiveMaximum`,
//!   `multipleOf` (numeric and draft-4 boolean exclusive forms)
//! - **Strings**: `minLength`, `maxLength`, `pattern`, common `format`s
//! - **Arrays**: `items` (schema or tuple), `minItems`, `maxItems`, `uniqueItems`
//! - **Objects**: `properties`, `required`, `additionalProperties`,
//!   `minProperties`, `maxProperties`
//! - **Combinators**: `anyOf`, `oneOf`, `allOf`, trivial `not`
//!
//! Contradictions that can be seen in the schema itself fail with
//! [`Error::UnsatisfiableSchema`] when the strategy is built. Constructs that
//! cannot be generated (unresolved `$ref`, invalid patterns) fail with
//! [`Error::InvalidSchema`].

mod keywords;
mod translate;
mod validation;

use proptest::{
    strategy::{BoxedStrategy, Strategy, ValueTree},
    test_runner::TestRunner,
};
use serde_json::Value;

use crate::{Error, Result};

/// A source of schema-valid values
pub trait SchemaGenerator {
    /// Lazy, restartable source of independent schema-valid values.
    fn value_source(&self, schema: &Value) -> Result<BoxedStrategy<Value>>;

    /// Draw one schema-valid value now.
    ///
    /// The draw uses its own deterministic runner, so repeated calls with the
    /// same schema return the same value and never advance the randomized
    /// stream used by test execution.
    fn one_example(&self, schema: &Value) -> Result<Value> {
        let source = self.value_source(schema)?;
        let mut runner = TestRunner::deterministic();
        source
            .new_tree(&mut runner)
            .map(|tree| tree.current())
            .map_err(|reason| Error::unsatisfiable(format!("no value could be drawn: {reason}")))
    }
}

/// Size caps applied where a schema leaves sizes open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationLimits {
    /// Characters added above `minLength` when `maxLength` is absent
    pub max_string_length: usize,
    /// Items added above `minItems` when `maxItems` is absent
    pub max_items: usize,
    /// Undeclared properties generated when `additionalProperties` allows them
    pub max_extra_properties: usize,
    /// Nesting depth of values drawn for unconstrained schemas
    pub any_value_depth: u32,
}

impl Default for GenerationLimits {
    fn default() -> Self {
        Self {
            max_string_length: 24,
            max_items: 6,
            max_extra_properties: 2,
            any_value_depth: 3,
        }
    }
}

/// Default [`SchemaGenerator`] for JSON Schema documents
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSchemaGenerator {
    limits: GenerationLimits,
}

impl JsonSchemaGenerator {
    #[must_use]
    pub const fn new(limits: GenerationLimits) -> Self {
        Self { limits }
    }

    #[must_use]
    pub const fn limits(&self) -> &GenerationLimits {
        &self.limits
    }
}

impl SchemaGenerator for JsonSchemaGenerator {
    fn value_source(&self, schema: &Value) -> Result<BoxedStrategy<Value>> {
        translate::translate(schema, &self.limits)
    }
}
