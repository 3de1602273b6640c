//! `billable-core`: identifiers, errors and entity traits shared by every crate.
//!
//! Pure domain primitives only (no IO, no storage concerns).

pub mod entity;
pub mod error;
pub mod id;

pub use entity::{Entity, TenantOwned};
pub use error::{DomainError, DomainResult};
pub use id::{CompanyId, InvoiceId, InvoiceItemId, ProjectId, TenantId, TimeEntryId};
