//! Data-access boundary: where record snapshots come from.
//!
//! The analytics crate stays storage-agnostic; callers (infra) provide a reader.

use std::sync::Arc;

use chrono::NaiveDate;
use thiserror::Error;

use billable_core::{CompanyId, TenantId};
use billable_records::{Invoice, Project, TrackedTime};

/// Failure raised while fetching a snapshot. Surfaced to callers unchanged.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReadError {
    #[error("record store unavailable: {0}")]
    Unavailable(String),

    #[error("not authorized to read tenant records")]
    Unauthorized,

    #[error("record store failure: {0}")]
    Backend(String),
}

/// Tenant-scoped read operations over persisted records.
pub trait AnalyticsReader: Send + Sync {
    /// Invoices of `tenant_id` with companies and items populated, optionally
    /// restricted to those associated with `contractor`.
    fn list_invoices(
        &self,
        tenant_id: TenantId,
        contractor: Option<CompanyId>,
    ) -> Result<Vec<Invoice>, ReadError>;

    /// Time entries on projects of `tenant_id`, optionally restricted to
    /// projects associated with `contractor` and entries dated on/after `since`.
    fn list_time_entries(
        &self,
        tenant_id: TenantId,
        contractor: Option<CompanyId>,
        since: Option<NaiveDate>,
    ) -> Result<Vec<TrackedTime>, ReadError>;

    /// Projects of `tenant_id` with companies and all time entries populated.
    fn list_projects(&self, tenant_id: TenantId) -> Result<Vec<Project>, ReadError>;
}

impl<R> AnalyticsReader for Arc<R>
where
    R: AnalyticsReader + ?Sized,
{
    fn list_invoices(
        &self,
        tenant_id: TenantId,
        contractor: Option<CompanyId>,
    ) -> Result<Vec<Invoice>, ReadError> {
        (**self).list_invoices(tenant_id, contractor)
    }

    fn list_time_entries(
        &self,
        tenant_id: TenantId,
        contractor: Option<CompanyId>,
        since: Option<NaiveDate>,
    ) -> Result<Vec<TrackedTime>, ReadError> {
        (**self).list_time_entries(tenant_id, contractor, since)
    }

    fn list_projects(&self, tenant_id: TenantId) -> Result<Vec<Project>, ReadError> {
        (**self).list_projects(tenant_id)
    }
}
