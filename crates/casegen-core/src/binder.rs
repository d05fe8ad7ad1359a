//! Binding test procedures to endpoints.
//!
//! A [`BoundTest`] runs every collected example case first, in axis order,
//! and then hands the composite source to a `proptest` runner for randomized
//! exploration. Failures carry the case that produced them.

use std::{
    cell::Cell,
    time::{Duration, Instant},
};

use proptest::test_runner::{TestCaseError, TestCaseResult, TestError};

use crate::{
    assembler::{build_composite_source, CompositeSource},
    case::Case,
    collector::collect,
    config::RunSettings,
    endpoint::Endpoint,
    schema::SchemaGenerator,
    Error, Result,
};

/// Counters from one [`BoundTest::run`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Example cases the test accepted
    pub examples_executed: usize,
    /// Example cases the test rejected
    pub examples_skipped: usize,
    /// Random executions, shrinking re-runs included
    pub random_executions: u64,
}

/// A test procedure bound to one endpoint's cases
pub struct BoundTest<F> {
    test: F,
    source: CompositeSource,
    examples: Vec<Case>,
    settings: RunSettings,
}

/// Bind `test` to the cases of `endpoint`.
///
/// `settings` defaults to [`RunSettings::default`].
///
/// # Errors
///
/// - Any schema error from building the composite source
/// - `Error::MalformedExample` / `Error::UnsatisfiableSchema` from example
///   collection
/// - `Error::InvalidConfig` if `settings` fail validation
pub fn bind<F, G>(
    test: F,
    endpoint: &Endpoint,
    generator: &G,
    settings: Option<RunSettings>,
) -> Result<BoundTest<F>>
where
    F: Fn(&Case) -> TestCaseResult,
    G: SchemaGenerator + ?Sized,
{
    let settings = settings.unwrap_or_default();
    settings.validate()?;

    let source = build_composite_source(endpoint, generator)?;
    let examples = collect(endpoint, generator).collect::<Result<Vec<_>>>()?;
    tracing::debug!(
        "Bound test to {} {} with {} example cases",
        endpoint.method(),
        endpoint.path(),
        examples.len()
    );

    Ok(BoundTest {
        test,
        source,
        examples,
        settings,
    })
}

impl<F> BoundTest<F>
where
    F: Fn(&Case) -> TestCaseResult,
{
    /// Run the example cases, then the randomized exploration.
    ///
    /// # Errors
    ///
    /// - `Error::TestFailure` with the failing case (shrunk for random draws)
    /// - `Error::FlakyTest` if a failing case passes when re-executed
    /// - `Error::UnsatisfiableSchema` if the runner gives up on rejections
    pub fn run(&self) -> Result<RunReport> {
        let mut report = RunReport::default();

        for case in &self.examples {
            tracing::debug!("Executing example case {case}");
            match self.execute(case) {
                Ok(()) => report.examples_executed += 1,
                Err(TestCaseError::Reject(reason)) => {
                    tracing::debug!("Example case rejected: {reason}");
                    report.examples_skipped += 1;
                }
                Err(TestCaseError::Fail(reason)) => {
                    return Err(self.confirm_failure(case.clone(), reason.to_string()));
                }
            }
        }

        let executions = Cell::new(0_u64);
        let mut runner = self.settings.runner();
        let outcome = runner.run(&self.source, |case| {
            executions.set(executions.get() + 1);
            self.execute(&case)
        });
        report.random_executions = executions.get();

        match outcome {
            Ok(()) => {
                tracing::info!(
                    "{} {}: {} examples executed, {} skipped, {} random executions",
                    self.source.method(),
                    self.source.path(),
                    report.examples_executed,
                    report.examples_skipped,
                    report.random_executions
                );
                Ok(report)
            }
            Err(TestError::Fail(reason, case)) => Err(self.confirm_failure(case, reason.to_string())),
            Err(TestError::Abort(reason)) => Err(Error::unsatisfiable(format!(
                "gave up drawing cases for {} {}: {reason}",
                self.source.method(),
                self.source.path()
            ))),
        }
    }

    #[must_use]
    pub fn example_cases(&self) -> &[Case] {
        &self.examples
    }

    #[must_use]
    pub const fn source(&self) -> &CompositeSource {
        &self.source
    }

    #[must_use]
    pub const fn settings(&self) -> &RunSettings {
        &self.settings
    }

    /// One execution of the test, with the deadline applied.
    fn execute(&self, case: &Case) -> TestCaseResult {
        let started = Instant::now();
        (self.test)(case)?;
        match self.settings.deadline_duration() {
            Some(deadline) => check_deadline(started.elapsed(), deadline),
            None => Ok(()),
        }
    }

    /// Turn a failure into an error, re-executing the case once unless
    /// flaky retries are suppressed.
    fn confirm_failure(&self, case: Case, reason: String) -> Error {
        if !self.settings.suppress_flaky_retries && self.execute(&case).is_ok() {
            tracing::warn!("Flaky test: {case} failed, then passed on re-execution");
            return Error::FlakyTest {
                case: Box::new(case),
                reason,
            };
        }
        Error::TestFailure {
            case: Box::new(case),
            reason,
        }
    }
}

fn check_deadline(elapsed: Duration, deadline: Duration) -> TestCaseResult {
    if elapsed > deadline {
        Err(TestCaseError::fail(format!(
            "deadline exceeded: took {elapsed:?}, limit {deadline:?}"
        )))
    } else {
        Ok(())
    }
}
