//! Errors raised by records and analytics inputs.

use thiserror::Error;

/// Result type used across the records and analytics layers.
pub type DomainResult<T> = Result<T, DomainError>;

/// Deterministic input failures. Fetch and backend failures belong to the
/// reader layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Bad request input: nil tenant, zero-length window, non-positive capacity.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Records that contradict each other, e.g. an entry nested under the wrong project.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// Identifier text that does not parse.
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A record referenced by id does not exist for the tenant.
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn not_found(kind: &'static str, id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_failure() {
        assert_eq!(
            DomainError::validation("tenant id is required").to_string(),
            "validation failed: tenant id is required"
        );
        assert_eq!(
            DomainError::not_found("project", 42).to_string(),
            "project 42 not found"
        );
    }
}
