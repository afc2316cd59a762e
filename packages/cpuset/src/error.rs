use std::collections::TryReserveError;
use std::io;

use thiserror::Error;

use crate::MAX_CPU_INDEX_EXCLUSIVE;

/// Errors that can occur when building, parsing or sizing CPU sets.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The caller provided a supposed CPU set expression but it did not match the expected format.
    #[error("invalid CPU set syntax: '{invalid_value}' is invalid: {problem}")]
    InvalidSyntax {
        /// The specific value that was invalid. This may either be the entire expression
        /// or a single token of it, depending on the problem.
        invalid_value: String,

        /// A human-readable description of the problem.
        problem: String,
    },

    /// A CPU index was at or above the highest index any supported kernel can address.
    #[error("CPU index {index} is out of range, the maximum supported index is {}", MAX_CPU_INDEX_EXCLUSIVE - 1)]
    IndexOutOfRange {
        /// The index that was rejected.
        index: u32,
    },

    /// Memory for the backing storage of a set or mask could not be allocated.
    #[error("failed to allocate storage: {0}")]
    Allocation(#[from] TryReserveError),

    /// The operating system rejected an affinity query for a reason other than the
    /// buffer being too small.
    #[error("host affinity query failed: {0}")]
    HostQuery(#[source] io::Error),
}

impl Error {
    pub(crate) fn invalid_syntax(invalid_value: impl Into<String>, problem: impl Into<String>) -> Self {
        Self::InvalidSyntax {
            invalid_value: invalid_value.into(),
            problem: problem.into(),
        }
    }
}

/// A specialized `Result` type for CPU set operations, returning the crate's
/// [`Error`] type as the error value.
pub(crate) type Result<T> = std::result::Result<T, Error>;
