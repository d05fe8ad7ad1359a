//! Composite case sources.
//!
//! A [`CompositeSource`] draws complete [`Case`]s: each draw performs one
//! independent draw per axis and pairs the results with the endpoint's fixed
//! path and method. It is an ordinary `proptest` strategy, so it can be handed
//! straight to a `TestRunner` or drawn by hand through [`CompositeSource::draws`].

use proptest::{
    strategy::{BoxedStrategy, NewTree, Strategy, ValueTree},
    test_runner::TestRunner,
};

use crate::{
    axis::{Axis, AxisMap},
    case::Case,
    endpoint::{Endpoint, HttpMethod},
    schema::SchemaGenerator,
    Error, Result,
};

/// Restartable source of complete cases for one endpoint
#[derive(Debug, Clone)]
pub struct CompositeSource {
    path: String,
    method: HttpMethod,
    cases: BoxedStrategy<Case>,
}

/// Build the composite source for `endpoint`.
///
/// Schema errors from `generator` propagate unchanged, tagged with the axis
/// whose schema raised them.
pub fn build_composite_source<G>(endpoint: &Endpoint, generator: &G) -> Result<CompositeSource>
where
    G: SchemaGenerator + ?Sized,
{
    let sources = AxisMap::try_from_fn(|axis| {
        generator
            .value_source(endpoint.schema(axis))
            .map_err(|e| e.for_axis(axis))
    })?;
    let [path_parameters, headers, cookies, query, body, form_data] = sources.into_array();

    let path = endpoint.path().to_string();
    let method = endpoint.method();
    let cases = {
        let path = path.clone();
        (path_parameters, headers, cookies, query, body, form_data)
            .prop_map(
                move |(path_parameters, headers, cookies, query, body, form_data)| Case {
                    path: path.clone(),
                    method,
                    path_parameters,
                    headers,
                    cookies,
                    query,
                    body,
                    form_data,
                },
            )
            .boxed()
    };

    tracing::debug!(
        "Built composite source for {method} {path} over {} axes",
        Axis::ALL.len()
    );
    Ok(CompositeSource {
        path,
        method,
        cases,
    })
}

impl CompositeSource {
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub const fn method(&self) -> HttpMethod {
        self.method
    }

    /// Draw one case with `runner`'s random stream.
    pub fn draw(&self, runner: &mut TestRunner) -> Result<Case> {
        self.new_tree(runner)
            .map(|tree| tree.current())
            .map_err(|reason| Error::unsatisfiable(format!("no case could be drawn: {reason}")))
    }

    /// Endless iterator of independent draws driven by `runner`.
    pub fn draws(&self, runner: TestRunner) -> Draws<'_> {
        Draws {
            source: self,
            runner,
        }
    }
}

impl Strategy for CompositeSource {
    type Tree = Box<dyn ValueTree<Value = Case>>;
    type Value = Case;

    fn new_tree(&self, runner: &mut TestRunner) -> NewTree<Self> {
        self.cases.new_tree(runner)
    }
}

/// Iterator over draws from a [`CompositeSource`]
#[derive(Debug)]
pub struct Draws<'a> {
    source: &'a CompositeSource,
    runner: TestRunner,
}

impl Iterator for Draws<'_> {
    type Item = Result<Case>;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.source.draw(&mut self.runner))
    }
}
