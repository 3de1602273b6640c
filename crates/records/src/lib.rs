//! Record snapshots for the freelance business domain.
//!
//! These are read-only views of what the CRUD layer persists. The analytics
//! engine receives them fully populated and never mutates them.

pub mod company;
pub mod invoice;
pub mod project;
pub mod time_entry;

pub use company::{Company, CompanyKind};
pub use invoice::{Invoice, InvoiceItem, InvoiceStatus};
pub use project::{Project, ProjectRef};
pub use time_entry::{InvoiceLink, TimeEntry, TimeEntryStatus, TrackedTime, hours_to_amount};
