//! Concrete test cases.

use std::fmt;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    axis::{Axis, AxisMap},
    endpoint::{Endpoint, HttpMethod},
};

/// A single fully-resolved test input
///
/// `path` and `method` are copied from the endpoint; every other field holds
/// one concrete value for the axis of the same name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
    pub path: String,
    pub method: HttpMethod,
    pub path_parameters: Value,
    pub headers: Value,
    pub cookies: Value,
    pub query: Value,
    pub body: Value,
    pub form_data: Value,
}

impl Case {
    /// Assemble a case from one value per axis.
    pub fn new(path: impl Into<String>, method: HttpMethod, values: AxisMap<Value>) -> Self {
        let [path_parameters, headers, cookies, query, body, form_data] = values.into_array();
        Self {
            path: path.into(),
            method,
            path_parameters,
            headers,
            cookies,
            query,
            body,
            form_data,
        }
    }

    /// Assemble a case for `endpoint`, copying its path and method.
    pub fn for_endpoint(endpoint: &Endpoint, values: AxisMap<Value>) -> Self {
        Self::new(endpoint.path(), endpoint.method(), values)
    }

    /// Value of one axis.
    #[must_use]
    pub const fn get(&self, axis: Axis) -> &Value {
        match axis {
            Axis::PathParameters => &self.path_parameters,
            Axis::Headers => &self.headers,
            Axis::Cookies => &self.cookies,
            Axis::Query => &self.query,
            Axis::Body => &self.body,
            Axis::FormData => &self.form_data,
        }
    }
}

impl fmt::Display for Case {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let axes = Axis::ALL
            .iter()
            .map(|axis| format!("{axis}={}", self.get(*axis)))
            .join(" ");
        write!(f, "{} {} {axes}", self.method, self.path)
    }
}
