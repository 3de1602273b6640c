//! Tenant-isolated record storage backing the analytics reader.

pub mod record_store;
pub mod tenant_store;

pub use record_store::{InMemoryRecordStore, RecordSnapshot};
pub use tenant_store::{InMemoryTenantStore, StoreError, TenantStore};
