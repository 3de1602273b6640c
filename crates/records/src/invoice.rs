use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use billable_core::{
    CompanyId, Entity, InvoiceId, InvoiceItemId, TenantId, TenantOwned, TimeEntryId,
};

use crate::company::{Company, CompanyKind};
use crate::time_entry::hours_to_amount;

/// Invoice status lifecycle.
///
/// Variant order is the lifecycle order. Status breakdowns list statuses in
/// order of first appearance, not in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Draft,
    Sent,
    Paid,
    Overdue,
}

impl InvoiceStatus {
    pub const ALL: [InvoiceStatus; 4] = [
        InvoiceStatus::Draft,
        InvoiceStatus::Sent,
        InvoiceStatus::Paid,
        InvoiceStatus::Overdue,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Sent => "sent",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Overdue => "overdue",
        }
    }

    pub fn is_paid(self) -> bool {
        self == InvoiceStatus::Paid
    }
}

impl core::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Invoice line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceItem {
    pub id: InvoiceItemId,
    pub invoice_id: InvoiceId,
    pub name: String,
    pub quantity: f64,
    /// Price in smallest currency unit (e.g., cents).
    pub unit_price: u64,
    /// Time entry this line was generated from, if any.
    #[serde(default)]
    pub time_entry_id: Option<TimeEntryId>,
}

impl InvoiceItem {
    /// `quantity * unit_price`, rounded to the nearest cent.
    pub fn line_total(&self) -> u64 {
        hours_to_amount(self.quantity, self.unit_price)
    }
}

/// Invoice snapshot with its companies and items populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,
    pub tenant_id: TenantId,
    pub status: InvoiceStatus,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    /// Amounts in smallest currency unit.
    pub subtotal_amount: u64,
    /// Tax percentage (e.g. `19.0` for 19%).
    pub tax_rate: f64,
    pub total_amount: u64,
    #[serde(default)]
    pub companies: Vec<Company>,
    #[serde(default)]
    pub items: Vec<InvoiceItem>,
}

impl Invoice {
    pub fn is_paid(&self) -> bool {
        self.status.is_paid()
    }

    /// Whether `company_id` is associated with this invoice in any role.
    pub fn involves(&self, company_id: CompanyId) -> bool {
        self.companies.iter().any(|c| c.id == company_id)
    }

    pub fn contractor(&self) -> Option<&Company> {
        self.companies.iter().find(|c| c.has_kind(CompanyKind::Contractor))
    }

    pub fn customer(&self) -> Option<&Company> {
        self.companies.iter().find(|c| c.has_kind(CompanyKind::Customer))
    }

    /// Σ item line totals.
    pub fn items_subtotal(&self) -> u64 {
        self.items
            .iter()
            .fold(0u64, |acc, item| acc.saturating_add(item.line_total()))
    }

    /// `subtotal_amount * (1 + tax_rate / 100)`, rounded to the nearest cent.
    pub fn expected_total(&self) -> u64 {
        let total = self.subtotal_amount as f64 * (1.0 + self.tax_rate / 100.0);
        if total.is_finite() && total > 0.0 {
            total.round() as u64
        } else {
            0
        }
    }

    /// Both amount invariants hold (items sum to subtotal, subtotal plus tax is total).
    pub fn is_consistent(&self) -> bool {
        self.items_subtotal() == self.subtotal_amount && self.expected_total() == self.total_amount
    }
}

impl Entity for Invoice {
    type Id = InvoiceId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

impl TenantOwned for Invoice {
    fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }
}
