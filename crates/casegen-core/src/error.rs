//! Error types for casegen-core

use thiserror::Error;

use crate::{axis::Axis, case::Case};

/// Core error type for case generation and test execution
#[derive(Debug, Error)]
pub enum Error {
    /// An axis schema admits no valid values
    #[error("Unsatisfiable schema{}: {reason}", axis_label(.axis))]
    UnsatisfiableSchema { axis: Option<Axis>, reason: String },

    /// An axis schema uses a construct that cannot be turned into a generator
    #[error("Invalid schema{}: {reason}", axis_label(.axis))]
    InvalidSchema { axis: Option<Axis>, reason: String },

    /// A declared example cannot be used as a fixed case value
    #[error("Malformed example for {axis}: {reason}")]
    MalformedExample { axis: Axis, reason: String },

    /// The test procedure failed for a case
    #[error("Test failed for {case}: {reason}")]
    TestFailure { case: Box<Case>, reason: String },

    /// The test procedure failed for a case, then passed when re-executed
    #[error("Flaky test for {case}: {reason}")]
    FlakyTest { case: Box<Case>, reason: String },

    /// Invalid run settings
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO errors while loading settings
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn axis_label(axis: &Option<Axis>) -> String {
    axis.map(|axis| format!(" for {axis}")).unwrap_or_default()
}

impl Error {
    /// Create an unsatisfiable-schema error not yet tied to an axis.
    pub fn unsatisfiable(reason: impl Into<String>) -> Self {
        Self::UnsatisfiableSchema {
            axis: None,
            reason: reason.into(),
        }
    }

    /// Create an invalid-schema error not yet tied to an axis.
    pub fn invalid_schema(reason: impl Into<String>) -> Self {
        Self::InvalidSchema {
            axis: None,
            reason: reason.into(),
        }
    }

    /// Attach the axis a schema error came from.
    ///
    /// Errors that already name an axis, and errors unrelated to schemas,
    /// are returned unchanged.
    #[must_use]
    pub fn for_axis(self, axis: Axis) -> Self {
        match self {
            Self::UnsatisfiableSchema { axis: None, reason } => Self::UnsatisfiableSchema {
                axis: Some(axis),
                reason,
            },
            Self::InvalidSchema { axis: None, reason } => Self::InvalidSchema {
                axis: Some(axis),
                reason,
            },
            other => other,
        }
    }

    /// The case attached to a test failure, if any.
    #[must_use]
    pub fn failing_case(&self) -> Option<&Case> {
        match self {
            Self::TestFailure { case, .. } | Self::FlakyTest { case, .. } => Some(case),
            _ => None,
        }
    }
}

/// Result type alias for casegen-core operations
pub type Result<T> = std::result::Result<T, Error>;
