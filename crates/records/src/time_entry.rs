use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use billable_core::{
    Entity, InvoiceId, InvoiceItemId, ProjectId, TenantId, TenantOwned, TimeEntryId,
};

use crate::invoice::InvoiceStatus;
use crate::project::ProjectRef;

/// Convert `hours` at `rate` (smallest currency unit per hour) into an amount.
///
/// Rounded to the nearest unit. Negative, NaN or infinite products yield 0.
pub fn hours_to_amount(hours: f64, rate: u64) -> u64 {
    let amount = hours * rate as f64;
    if amount.is_finite() && amount > 0.0 {
        amount.round() as u64
    } else {
        0
    }
}

/// Time entry workflow status (informational; analytics do not branch on it).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeEntryStatus {
    Draft,
    Submitted,
    Approved,
}

/// Invoice item an entry was billed through, with the parent invoice status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceLink {
    pub invoice_item_id: InvoiceItemId,
    pub invoice_id: InvoiceId,
    /// Readers refresh this from the stored invoice on every fetch.
    pub invoice_status: InvoiceStatus,
}

/// Logged work on a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeEntry {
    pub id: TimeEntryId,
    pub project_id: ProjectId,
    pub date: NaiveDate,
    /// Hours that determine invoiced amounts.
    pub billed_hours: f64,
    /// Hours actually worked; may differ from `billed_hours`.
    #[serde(default)]
    pub shadow_hours: Option<f64>,
    /// Smallest currency unit per hour.
    pub hourly_rate: u64,
    pub status: TimeEntryStatus,
    #[serde(default)]
    pub invoice_link: Option<InvoiceLink>,
}

impl TimeEntry {
    /// Shadow hours, 0 when absent.
    pub fn worked_hours(&self) -> f64 {
        self.shadow_hours.unwrap_or(0.0)
    }

    pub fn is_invoiced(&self) -> bool {
        self.invoice_link.is_some()
    }

    /// Paid iff the linked invoice is paid.
    pub fn is_paid(&self) -> bool {
        self.invoice_link
            .is_some_and(|link| link.invoice_status.is_paid())
    }

    /// `worked_hours * hourly_rate`, regardless of payment state.
    pub fn worked_amount(&self) -> u64 {
        hours_to_amount(self.worked_hours(), self.hourly_rate)
    }

    /// `billed_hours * hourly_rate`, regardless of payment state.
    pub fn billed_amount(&self) -> u64 {
        hours_to_amount(self.billed_hours, self.hourly_rate)
    }
}

impl Entity for TimeEntry {
    type Id = TimeEntryId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

/// A time entry together with the project it was logged against.
///
/// Shape returned by the time-entry listing, where the project is needed for
/// tenant scoping, contractor filtering and grouping by project name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedTime {
    pub entry: TimeEntry,
    pub project: ProjectRef,
}

impl Entity for TrackedTime {
    type Id = TimeEntryId;

    fn id(&self) -> Self::Id {
        self.entry.id
    }
}

impl TenantOwned for TrackedTime {
    fn tenant_id(&self) -> TenantId {
        self.project.tenant_id
    }
}
