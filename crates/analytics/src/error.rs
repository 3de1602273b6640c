use thiserror::Error;

use billable_core::DomainError;

use crate::reader::ReadError;

pub type AnalyticsResult<T> = Result<T, AnalyticsError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AnalyticsError {
    /// Rejected input (nil tenant, invalid window, bad configuration).
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Snapshot fetch failed; the reader's error is passed through as-is.
    #[error(transparent)]
    Read(#[from] ReadError),

    /// The reader returned a record owned by another tenant.
    #[error("tenant isolation violation: {0}")]
    TenantIsolation(String),
}
