//! Endpoint descriptors.
//!
//! An [`Endpoint`] is read-only once built: a path, an HTTP method, and one
//! JSON Schema per [`Axis`]. An axis without constraints holds the always-true
//! schema `{}`; axes are never absent.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use strum::{Display, EnumIter, EnumString};

use crate::{
    axis::{Axis, AxisMap},
    Error, Result,
};

/// HTTP verb of an endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, EnumIter)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
    Trace,
}

impl<'de> Deserialize<'de> for HttpMethod {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s)
            .map_err(|_| serde::de::Error::custom(format!("Invalid HTTP method: {s}")))
    }
}

/// The schema that admits any value.
#[must_use]
pub fn any_schema() -> Value {
    json!({})
}

/// Immutable descriptor of one API operation
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    path: String,
    method: HttpMethod,
    schemas: AxisMap<Value>,
}

impl Endpoint {
    /// Create an endpoint from all six axis schemas.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidSchema` if a schema is neither an object nor a
    /// boolean.
    pub fn new(path: impl Into<String>, method: HttpMethod, schemas: AxisMap<Value>) -> Result<Self> {
        schemas
            .iter()
            .try_for_each(|(axis, schema)| check_schema_shape(axis, schema))?;
        Ok(Self {
            path: path.into(),
            method,
            schemas,
        })
    }

    /// Start building an endpoint; axes left unset hold `{}`.
    pub fn builder(path: impl Into<String>, method: HttpMethod) -> EndpointBuilder {
        EndpointBuilder::new(path, method)
    }

    /// Parse an endpoint from its JSON document form.
    ///
    /// ```json
    /// {"path": "/users/{id}", "method": "GET", "path_parameters": {"type": "object"}}
    /// ```
    pub fn from_json_str(input: &str) -> Result<Self> {
        serde_json::from_str(input).map_err(|e| Error::invalid_schema(e.to_string()))
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub const fn method(&self) -> HttpMethod {
        self.method
    }

    /// Schema of one axis.
    #[must_use]
    pub fn schema(&self, axis: Axis) -> &Value {
        self.schemas.get(axis)
    }

    /// All axis schemas.
    #[must_use]
    pub const fn schemas(&self) -> &AxisMap<Value> {
        &self.schemas
    }

    /// The example declared directly on an axis schema, if any.
    ///
    /// Presence of the `"example"` key is authoritative: an explicit `null`
    /// example is still a declared example.
    #[must_use]
    pub fn declared_example(&self, axis: Axis) -> Option<&Value> {
        self.schema(axis).as_object()?.get("example")
    }
}

fn check_schema_shape(axis: Axis, schema: &Value) -> Result<()> {
    match schema {
        Value::Object(_) | Value::Bool(_) => Ok(()),
        other => Err(Error::invalid_schema(format!(
            "schema must be an object or a boolean, got {other}"
        ))
        .for_axis(axis)),
    }
}

/// Builder for [`Endpoint`]
#[derive(Debug, Clone)]
pub struct EndpointBuilder {
    path: String,
    method: HttpMethod,
    schemas: AxisMap<Value>,
}

impl EndpointBuilder {
    /// Create a builder with every axis set to `{}`.
    pub fn new(path: impl Into<String>, method: HttpMethod) -> Self {
        Self {
            path: path.into(),
            method,
            schemas: AxisMap::from_fn(|_| any_schema()),
        }
    }

    /// Set the schema of one axis.
    pub fn schema(mut self, axis: Axis, schema: Value) -> Self {
        self.schemas.replace(axis, schema);
        self
    }

    /// Build the endpoint.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidSchema` if a schema is neither an object nor a
    /// boolean.
    pub fn build(self) -> Result<Endpoint> {
        Endpoint::new(self.path, self.method, self.schemas)
    }
}

/// Document form of an endpoint; missing axes default to `{}`.
#[derive(Serialize, Deserialize)]
struct EndpointDocument {
    path: String,
    method: HttpMethod,
    #[serde(default = "any_schema")]
    path_parameters: Value,
    #[serde(default = "any_schema")]
    headers: Value,
    #[serde(default = "any_schema")]
    cookies: Value,
    #[serde(default = "any_schema")]
    query: Value,
    #[serde(default = "any_schema")]
    body: Value,
    #[serde(default = "any_schema")]
    form_data: Value,
}

impl Serialize for Endpoint {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let [path_parameters, headers, cookies, query, body, form_data] =
            self.schemas.clone().into_array();
        EndpointDocument {
            path: self.path.clone(),
            method: self.method,
            path_parameters,
            headers,
            cookies,
            query,
            body,
            form_data,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Endpoint {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let doc = EndpointDocument::deserialize(deserializer)?;
        let schemas = AxisMap::from_fn(|axis| match axis {
            Axis::PathParameters => doc.path_parameters.clone(),
            Axis::Headers => doc.headers.clone(),
            Axis::Cookies => doc.cookies.clone(),
            Axis::Query => doc.query.clone(),
            Axis::Body => doc.body.clone(),
            Axis::FormData => doc.form_data.clone(),
        });
        Self::new(doc.path, doc.method, schemas).map_err(serde::de::Error::custom)
    }
}
