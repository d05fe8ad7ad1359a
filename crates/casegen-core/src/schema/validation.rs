//! Compiled schema checks for filtering generated candidates.

use jsonschema::{Draft, Validator};
use serde_json::Value;

use crate::{Error, Result};

/// Compile `schema` for instance checks.
///
/// Schemas using the draft-4 boolean `exclusiveMinimum`/`exclusiveMaximum`
/// forms do not compile under the default draft and are retried as draft 4.
pub(super) fn compile(schema: &Value) -> Result<Validator> {
    jsonschema::validator_for(schema)
        .or_else(|_| jsonschema::options().with_draft(Draft::Draft4).build(schema))
        .map_err(|e| Error::invalid_schema(format!("schema cannot be compiled: {e}")))
}
