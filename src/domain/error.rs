//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent violations of the dataset and taxonomy model.
/// The mining engine itself never fails; these only surface while building inputs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("cycle detected in taxonomy: {child} -> {parent}")]
    CycleDetected { child: String, parent: String },

    #[error("empty name in {context}")]
    EmptyName { context: &'static str },
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
