//! Example collection.
//!
//! Every axis schema carrying an `"example"` value yields one concrete case:
//! that axis holds the example as-is, and every other axis is filled with a
//! single sampled value. Axes are visited in [`Axis::ALL`] order, so the
//! collected cases come out in the same order on every run.

use serde_json::Value;

use crate::{
    axis::{Axis, AxisMap},
    case::Case,
    endpoint::Endpoint,
    schema::SchemaGenerator,
    Error, Result,
};

/// The `(axis, example)` pairs declared by `endpoint`, in axis order.
pub fn declared_examples(endpoint: &Endpoint) -> Vec<(Axis, &Value)> {
    Axis::ALL
        .into_iter()
        .filter_map(|axis| endpoint.declared_example(axis).map(|example| (axis, example)))
        .collect()
}

/// Lazily collect one case per axis that declares an example.
///
/// The iterator is finite and cheap to clone; a clone restarts collection
/// from the first pending axis.
pub fn collect<'a, G>(endpoint: &'a Endpoint, generator: &'a G) -> ExampleCases<'a, G>
where
    G: SchemaGenerator + ?Sized,
{
    ExampleCases {
        endpoint,
        generator,
        next_axis: 0,
    }
}

/// Build one case holding `axis` fixed to `example`.
///
/// The other five axes are filled with [`SchemaGenerator::one_example`].
///
/// # Errors
///
/// - `Error::MalformedExample` if `axis` needs a mapping and `example` is
///   neither an object nor `null`
/// - `Error::UnsatisfiableSchema` if a fill-in axis admits no value
pub fn merge_example<G>(axis: Axis, example: &Value, endpoint: &Endpoint, generator: &G) -> Result<Case>
where
    G: SchemaGenerator + ?Sized,
{
    if axis.requires_mapping() && !matches!(example, Value::Object(_) | Value::Null) {
        return Err(Error::MalformedExample {
            axis,
            reason: format!("expected a mapping, got {example}"),
        });
    }
    let values = AxisMap::try_from_fn(|other| {
        if other == axis {
            Ok(example.clone())
        } else {
            generator
                .one_example(endpoint.schema(other))
                .map_err(|e| e.for_axis(other))
        }
    })?;
    Ok(Case::for_endpoint(endpoint, values))
}

/// Iterator over the example cases of one endpoint
pub struct ExampleCases<'a, G: ?Sized> {
    endpoint: &'a Endpoint,
    generator: &'a G,
    /// Index into [`Axis::ALL`] of the next axis to inspect
    next_axis: usize,
}

impl<G: ?Sized> Clone for ExampleCases<'_, G> {
    fn clone(&self) -> Self {
        Self {
            endpoint: self.endpoint,
            generator: self.generator,
            next_axis: self.next_axis,
        }
    }
}

impl<G> Iterator for ExampleCases<'_, G>
where
    G: SchemaGenerator + ?Sized,
{
    type Item = Result<Case>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(&axis) = Axis::ALL.get(self.next_axis) {
            self.next_axis += 1;
            if let Some(example) = self.endpoint.declared_example(axis) {
                tracing::debug!("Collecting example case for {axis} of {}", self.endpoint.path());
                return Some(merge_example(axis, example, self.endpoint, self.generator));
            }
        }
        None
    }
}
