use equivalency_path::PathError;
use thiserror::Error;

use crate::reporter::Mismatch;

/// The caller broke the API contract. Raised before any traversal starts and
/// never recorded as a mismatch.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UsageError {
    #[error("invalid member path {path:?}: {source}")]
    InvalidPath {
        path: String,
        #[source]
        source: PathError,
    },
    #[error("member name must not be empty")]
    EmptyMemberName,
    #[error("type name must not be empty")]
    EmptyTypeName,
    #[error("maximum recursion depth must be at least 1")]
    ZeroRecursionDepth,
    #[error("cannot verify {assertion} against a <null> collection")]
    NullExpectation { assertion: &'static str },
    #[error("cannot verify {assertion} against {found}, which is not a collection")]
    NotACollection {
        assertion: &'static str,
        found: String,
    },
    #[error("cannot verify {assertion} against an empty collection")]
    EmptyExpectation { assertion: &'static str },
    #[error("cannot order {left} and {right} without a comparer")]
    NotComparable { left: String, right: String },
}

/// One aggregated assertion failure listing every discovered difference.
#[derive(Debug, Error, Clone)]
#[error("{message}")]
pub struct AssertionFailure {
    message: String,
    mismatches: Vec<Mismatch>,
}

impl AssertionFailure {
    pub(crate) fn new(message: String, mismatches: Vec<Mismatch>) -> Self {
        Self {
            message,
            mismatches,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn mismatches(&self) -> &[Mismatch] {
        &self.mismatches
    }
}

#[derive(Debug, Error)]
pub enum EquivalencyError {
    #[error(transparent)]
    Usage(#[from] UsageError),
    #[error(transparent)]
    Failed(#[from] AssertionFailure),
}

impl EquivalencyError {
    /// The assertion failure, if this is one.
    pub fn failure(&self) -> Option<&AssertionFailure> {
        match self {
            EquivalencyError::Failed(f) => Some(f),
            EquivalencyError::Usage(_) => None,
        }
    }
}

/// Raised by a caller-supplied comparer. Reported as a mismatch at the node
/// the comparer was applied to.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ComparerError(String);

impl ComparerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}
