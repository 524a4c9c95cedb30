//! Errors raised while running operations

use crate::provenance::ProvenanceError;
use thiserror::Error;

/// Errors from running an operation (or a whole pipeline, which is one).
///
/// A pipeline propagates the errors of its steps unmodified.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("operation '{operation}' expects {expected} input port(s), got {actual}")]
    InputArity {
        operation: String,
        expected: usize,
        actual: usize,
    },

    #[error("operation '{operation}' declared {expected} output port(s) but returned {actual}")]
    OutputArity {
        operation: String,
        expected: usize,
        actual: usize,
    },

    #[error("provenance error: {0}")]
    Provenance(#[from] ProvenanceError),

    #[error("operation error: {0}")]
    Internal(String),
}

/// Result type for operation runs
pub type OperationResult<T> = Result<T, OperationError>;
