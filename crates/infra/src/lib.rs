//! `billable-infra`: storage adapters for the analytics engine.
//!
//! Only an in-memory backend ships here; it serves tests, the CLI and local
//! development. Persistent backends implement the same `AnalyticsReader`.

pub mod read_model;

pub use read_model::{
    InMemoryRecordStore, InMemoryTenantStore, RecordSnapshot, StoreError, TenantStore,
};
