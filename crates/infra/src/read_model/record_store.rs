//! In-memory record store serving tenant-scoped analytics snapshots.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use billable_analytics::{AnalyticsReader, ReadError};
use billable_core::{
    CompanyId, DomainError, Entity, InvoiceId, ProjectId, TenantId, TenantOwned, TimeEntryId,
};
use billable_records::{Invoice, InvoiceStatus, Project, TimeEntry, TrackedTime};

use super::tenant_store::{InMemoryTenantStore, StoreError, TenantStore};

/// Serialized export of persisted records, as produced by the CRUD layer.
///
/// Projects nest their time entries; the store splits them on load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordSnapshot {
    #[serde(default)]
    pub invoices: Vec<Invoice>,
    #[serde(default)]
    pub projects: Vec<Project>,
}

/// Invoices, projects and time entries held per tenant.
///
/// Projects are stored without their entries; entries live in their own map
/// and are reattached when projects are read.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    invoices: InMemoryTenantStore<InvoiceId, Invoice>,
    projects: InMemoryTenantStore<ProjectId, Project>,
    time_entries: InMemoryTenantStore<TimeEntryId, TimeEntry>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a snapshot. Invoices and projects keep their own tenant ids.
    pub fn from_snapshot(snapshot: RecordSnapshot) -> Result<Self, StoreError> {
        let store = Self::new();
        let (invoices, projects) = (snapshot.invoices.len(), snapshot.projects.len());
        for invoice in snapshot.invoices {
            store.upsert_invoice(invoice)?;
        }
        for project in snapshot.projects {
            store.upsert_project(project)?;
        }
        info!(invoices, projects, "record snapshot loaded");
        Ok(store)
    }

    pub fn upsert_invoice(&self, invoice: Invoice) -> Result<(), StoreError> {
        self.invoices.upsert(invoice.tenant_id(), invoice.id(), invoice)
    }

    /// Insert or replace a project. Its nested entries replace any entries
    /// previously stored for it.
    pub fn upsert_project(&self, mut project: Project) -> Result<(), StoreError> {
        if let Some(stray) = project.time_entries.iter().find(|e| e.project_id != project.id) {
            return Err(DomainError::invariant(format!(
                "time entry {} references project {}, nested under {}",
                stray.id, stray.project_id, project.id
            ))
            .into());
        }

        let tenant_id = project.tenant_id;
        let project_id = project.id;
        let entries = std::mem::take(&mut project.time_entries);

        self.projects.upsert(tenant_id, project_id, project)?;
        self.time_entries
            .retain(tenant_id, &|e: &TimeEntry| e.project_id != project_id)?;
        for entry in entries {
            self.time_entries.upsert(tenant_id, entry.id, entry)?;
        }
        Ok(())
    }

    /// Attach a time entry to an existing project of `tenant_id`.
    pub fn upsert_time_entry(
        &self,
        tenant_id: TenantId,
        entry: TimeEntry,
    ) -> Result<(), StoreError> {
        if self.projects.get(tenant_id, &entry.project_id)?.is_none() {
            return Err(DomainError::not_found("project", entry.project_id).into());
        }
        self.time_entries.upsert(tenant_id, entry.id, entry)
    }

    pub fn clear_tenant(&self, tenant_id: TenantId) -> Result<(), StoreError> {
        self.invoices.clear_tenant(tenant_id)?;
        self.time_entries.clear_tenant(tenant_id)?;
        self.projects.clear_tenant(tenant_id)?;
        debug!(tenant = %tenant_id, "tenant records cleared");
        Ok(())
    }

    fn projects_by_id(
        &self,
        tenant_id: TenantId,
    ) -> Result<HashMap<ProjectId, Project>, StoreError> {
        Ok(self
            .projects
            .list(tenant_id)?
            .into_iter()
            .map(|p| (p.id, p))
            .collect())
    }

    /// Overwrite each entry's linked invoice status with the stored invoice's
    /// current status. Links to invoices the tenant does not have are dropped,
    /// so such entries count as uninvoiced.
    fn resolve_invoice_links(
        &self,
        tenant_id: TenantId,
        entries: &mut [TimeEntry],
    ) -> Result<(), StoreError> {
        let statuses: HashMap<InvoiceId, InvoiceStatus> = self
            .invoices
            .list(tenant_id)?
            .into_iter()
            .map(|inv| (inv.id, inv.status))
            .collect();

        for entry in entries.iter_mut() {
            let Some(link) = entry.invoice_link.as_mut() else {
                continue;
            };
            match statuses.get(&link.invoice_id) {
                Some(status) => link.invoice_status = *status,
                None => {
                    debug!(
                        tenant = %tenant_id,
                        entry = %entry.id,
                        invoice = %link.invoice_id,
                        "dropping link to unknown invoice"
                    );
                    entry.invoice_link = None;
                }
            }
        }
        Ok(())
    }
}

impl AnalyticsReader for InMemoryRecordStore {
    fn list_invoices(
        &self,
        tenant_id: TenantId,
        contractor: Option<CompanyId>,
    ) -> Result<Vec<Invoice>, ReadError> {
        let mut invoices: Vec<Invoice> = self
            .invoices
            .list(tenant_id)?
            .into_iter()
            .filter(|inv| contractor.is_none_or(|c| inv.involves(c)))
            .collect();
        invoices.sort_by_key(|inv| (inv.issue_date, inv.id));
        Ok(invoices)
    }

    fn list_time_entries(
        &self,
        tenant_id: TenantId,
        contractor: Option<CompanyId>,
        since: Option<NaiveDate>,
    ) -> Result<Vec<TrackedTime>, ReadError> {
        let projects = self.projects_by_id(tenant_id)?;
        let mut entries = self.time_entries.list(tenant_id)?;
        self.resolve_invoice_links(tenant_id, &mut entries)?;

        let mut tracked: Vec<TrackedTime> = entries
            .into_iter()
            .filter(|e| since.is_none_or(|s| e.date >= s))
            .filter_map(|entry| {
                let project = projects.get(&entry.project_id)?;
                if contractor.is_some_and(|c| !project.has_company(c)) {
                    return None;
                }
                Some(TrackedTime {
                    entry,
                    project: project.to_ref(),
                })
            })
            .collect();
        tracked.sort_by_key(|t| (t.entry.date, t.entry.id));
        Ok(tracked)
    }

    fn list_projects(&self, tenant_id: TenantId) -> Result<Vec<Project>, ReadError> {
        let mut projects = self.projects_by_id(tenant_id)?;
        let mut entries = self.time_entries.list(tenant_id)?;
        self.resolve_invoice_links(tenant_id, &mut entries)?;
        for entry in entries {
            if let Some(project) = projects.get_mut(&entry.project_id) {
                project.time_entries.push(entry);
            }
        }

        let mut projects: Vec<Project> = projects.into_values().collect();
        for project in &mut projects {
            project.time_entries.sort_by_key(|e| (e.date, e.id));
        }
        projects.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(projects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use billable_core::InvoiceItemId;
    use billable_records::{Company, CompanyKind, InvoiceLink, TimeEntryStatus};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn company(tenant_id: TenantId, name: &str, kind: CompanyKind) -> Company {
        Company::new(tenant_id, name, [kind])
    }

    fn invoice(tenant_id: TenantId, issued: NaiveDate, companies: Vec<Company>) -> Invoice {
        Invoice {
            id: InvoiceId::new(),
            tenant_id,
            status: InvoiceStatus::Sent,
            issue_date: issued,
            due_date: issued,
            subtotal_amount: 100,
            tax_rate: 0.0,
            total_amount: 100,
            companies,
            items: Vec::new(),
        }
    }

    fn entry(project_id: ProjectId, on: NaiveDate) -> TimeEntry {
        TimeEntry {
            id: TimeEntryId::new(),
            project_id,
            date: on,
            billed_hours: 1.0,
            shadow_hours: None,
            hourly_rate: 100,
            status: TimeEntryStatus::Approved,
            invoice_link: None,
        }
    }

    fn project(tenant_id: TenantId, name: &str, companies: Vec<Company>) -> Project {
        Project {
            id: ProjectId::new(),
            tenant_id,
            name: name.to_string(),
            currency: "USD".to_string(),
            companies,
            time_entries: Vec::new(),
        }
    }

    #[test]
    fn invoices_are_filtered_by_contractor_and_ordered_by_date() {
        let tenant = TenantId::new();
        let acme = company(tenant, "Acme", CompanyKind::Contractor);
        let other = company(tenant, "Other", CompanyKind::Contractor);
        let store = InMemoryRecordStore::new();

        let late = invoice(tenant, date(2024, 5, 1), vec![acme.clone()]);
        let early = invoice(tenant, date(2024, 2, 1), vec![acme.clone()]);
        store.upsert_invoice(late.clone()).unwrap();
        store.upsert_invoice(early.clone()).unwrap();
        store
            .upsert_invoice(invoice(tenant, date(2024, 3, 1), vec![other]))
            .unwrap();

        let all = store.list_invoices(tenant, None).unwrap();
        assert_eq!(all.len(), 3);
        assert!(all.windows(2).all(|w| w[0].issue_date <= w[1].issue_date));

        let acme_only = store.list_invoices(tenant, Some(acme.id)).unwrap();
        assert_eq!(
            acme_only.iter().map(|i| i.id).collect::<Vec<_>>(),
            vec![early.id, late.id]
        );
    }

    #[test]
    fn tenants_do_not_see_each_other() {
        let a = TenantId::new();
        let b = TenantId::new();
        let store = InMemoryRecordStore::new();
        store.upsert_invoice(invoice(a, date(2024, 1, 1), Vec::new())).unwrap();
        store.upsert_project(project(a, "A", Vec::new())).unwrap();

        assert!(store.list_invoices(b, None).unwrap().is_empty());
        assert!(store.list_projects(b).unwrap().is_empty());
        assert_eq!(store.list_projects(a).unwrap().len(), 1);
    }

    #[test]
    fn time_entries_honor_since_and_contractor() {
        let tenant = TenantId::new();
        let acme = company(tenant, "Acme", CompanyKind::Customer);
        let store = InMemoryRecordStore::new();

        let mut with_acme = project(tenant, "Site", vec![acme.clone()]);
        with_acme.time_entries = vec![
            entry(with_acme.id, date(2023, 12, 31)),
            entry(with_acme.id, date(2024, 1, 1)),
        ];
        let mut solo = project(tenant, "Solo", Vec::new());
        solo.time_entries = vec![entry(solo.id, date(2024, 2, 1))];
        store.upsert_project(with_acme.clone()).unwrap();
        store.upsert_project(solo).unwrap();

        let since = store
            .list_time_entries(tenant, None, Some(date(2024, 1, 1)))
            .unwrap();
        assert_eq!(since.len(), 2);
        assert_eq!(since[0].entry.date, date(2024, 1, 1));

        let acme_only = store.list_time_entries(tenant, Some(acme.id), None).unwrap();
        assert_eq!(acme_only.len(), 2);
        assert!(acme_only.iter().all(|t| t.project.id == with_acme.id));
        assert_eq!(acme_only[0].project.name, "Site");
    }

    #[test]
    fn projects_reassemble_nested_entries() {
        let tenant = TenantId::new();
        let store = InMemoryRecordStore::new();
        let p = project(tenant, "Site", Vec::new());
        store.upsert_project(p.clone()).unwrap();

        store.upsert_time_entry(tenant, entry(p.id, date(2024, 3, 2))).unwrap();
        store.upsert_time_entry(tenant, entry(p.id, date(2024, 3, 1))).unwrap();

        let projects = store.list_projects(tenant).unwrap();
        assert_eq!(projects[0].time_entries.len(), 2);
        assert_eq!(projects[0].time_entries[0].date, date(2024, 3, 1));
    }

    #[test]
    fn re_upserting_a_project_replaces_its_entries() {
        let tenant = TenantId::new();
        let store = InMemoryRecordStore::new();
        let mut p = project(tenant, "Site", Vec::new());
        p.time_entries = vec![entry(p.id, date(2024, 3, 1)), entry(p.id, date(2024, 3, 2))];
        store.upsert_project(p.clone()).unwrap();

        p.time_entries.truncate(1);
        store.upsert_project(p).unwrap();

        assert_eq!(store.list_time_entries(tenant, None, None).unwrap().len(), 1);
    }

    fn linked_entry(
        project_id: ProjectId,
        invoice_id: InvoiceId,
        copied: InvoiceStatus,
    ) -> TimeEntry {
        let mut e = entry(project_id, date(2024, 3, 1));
        e.invoice_link = Some(InvoiceLink {
            invoice_item_id: InvoiceItemId::new(),
            invoice_id,
            invoice_status: copied,
        });
        e
    }

    fn linked_status(
        store: &InMemoryRecordStore,
        tenant: TenantId,
    ) -> Vec<Option<InvoiceStatus>> {
        let from_entries = store.list_time_entries(tenant, None, None).unwrap();
        let from_projects = store.list_projects(tenant).unwrap();
        from_entries
            .iter()
            .map(|t| &t.entry)
            .chain(from_projects.iter().flat_map(|p| &p.time_entries))
            .map(|e| e.invoice_link.map(|l| l.invoice_status))
            .collect()
    }

    #[test]
    fn linked_status_follows_the_stored_invoice() {
        let tenant = TenantId::new();
        let store = InMemoryRecordStore::new();
        let mut inv = invoice(tenant, date(2024, 3, 5), Vec::new());
        store.upsert_invoice(inv.clone()).unwrap();

        let mut p = project(tenant, "Site", Vec::new());
        p.time_entries = vec![linked_entry(p.id, inv.id, InvoiceStatus::Paid)];
        store.upsert_project(p).unwrap();

        assert_eq!(
            linked_status(&store, tenant),
            vec![Some(InvoiceStatus::Sent), Some(InvoiceStatus::Sent)]
        );

        inv.status = InvoiceStatus::Paid;
        store.upsert_invoice(inv.clone()).unwrap();
        assert_eq!(
            linked_status(&store, tenant),
            vec![Some(InvoiceStatus::Paid), Some(InvoiceStatus::Paid)]
        );

        inv.status = InvoiceStatus::Overdue;
        store.upsert_invoice(inv).unwrap();
        let tracked = store.list_time_entries(tenant, None, None).unwrap();
        assert!(!tracked[0].entry.is_paid());
    }

    #[test]
    fn links_to_unknown_invoices_are_dropped() {
        let tenant = TenantId::new();
        let store = InMemoryRecordStore::new();
        let mut p = project(tenant, "Site", Vec::new());
        p.time_entries = vec![linked_entry(p.id, InvoiceId::new(), InvoiceStatus::Paid)];
        store.upsert_project(p).unwrap();

        assert_eq!(linked_status(&store, tenant), vec![None, None]);
    }

    #[test]
    fn links_do_not_resolve_across_tenants() {
        let tenant = TenantId::new();
        let other = TenantId::new();
        let store = InMemoryRecordStore::new();
        let mut foreign = invoice(other, date(2024, 3, 5), Vec::new());
        foreign.status = InvoiceStatus::Paid;
        store.upsert_invoice(foreign.clone()).unwrap();

        let mut p = project(tenant, "Site", Vec::new());
        p.time_entries = vec![linked_entry(p.id, foreign.id, InvoiceStatus::Paid)];
        store.upsert_project(p).unwrap();

        assert_eq!(linked_status(&store, tenant), vec![None, None]);
    }

    #[test]
    fn time_entry_requires_a_known_project() {
        let tenant = TenantId::new();
        let store = InMemoryRecordStore::new();
        let missing = ProjectId::new();
        let err = store
            .upsert_time_entry(tenant, entry(missing, date(2024, 1, 1)))
            .unwrap_err();
        assert_eq!(err, StoreError::Domain(DomainError::not_found("project", missing)));
        assert_eq!(
            ReadError::from(err),
            ReadError::Backend(format!("project {missing} not found"))
        );
    }

    #[test]
    fn mismatched_nested_entry_is_rejected() {
        let tenant = TenantId::new();
        let store = InMemoryRecordStore::new();
        let mut p = project(tenant, "Site", Vec::new());
        p.time_entries = vec![entry(ProjectId::new(), date(2024, 1, 1))];

        let err = store.upsert_project(p).unwrap_err();
        assert!(matches!(err, StoreError::Domain(DomainError::InvariantViolation(_))));
    }

    #[test]
    fn clear_tenant_removes_everything() {
        let tenant = TenantId::new();
        let store = InMemoryRecordStore::new();
        let mut p = project(tenant, "Site", Vec::new());
        p.time_entries = vec![entry(p.id, date(2024, 1, 1))];
        store.upsert_project(p).unwrap();
        store.upsert_invoice(invoice(tenant, date(2024, 1, 1), Vec::new())).unwrap();

        store.clear_tenant(tenant).unwrap();

        assert!(store.list_invoices(tenant, None).unwrap().is_empty());
        assert!(store.list_projects(tenant).unwrap().is_empty());
        assert!(store.list_time_entries(tenant, None, None).unwrap().is_empty());
    }

    #[test]
    fn snapshot_json_loads_into_store() {
        let tenant = TenantId::new();
        let mut p = project(tenant, "Site", Vec::new());
        p.time_entries = vec![entry(p.id, date(2024, 1, 1))];
        let mut inv = invoice(tenant, date(2024, 1, 5), Vec::new());
        inv.items.push(billable_records::InvoiceItem {
            id: InvoiceItemId::new(),
            invoice_id: inv.id,
            name: "Work".into(),
            quantity: 1.0,
            unit_price: 100,
            time_entry_id: Some(p.time_entries[0].id),
        });
        let snapshot = RecordSnapshot {
            invoices: vec![inv],
            projects: vec![p],
        };

        let json = serde_json::to_string(&snapshot).unwrap();
        let parsed: RecordSnapshot = serde_json::from_str(&json).unwrap();
        let store = InMemoryRecordStore::from_snapshot(parsed).unwrap();

        assert_eq!(store.list_invoices(tenant, None).unwrap()[0].items.len(), 1);
        assert_eq!(store.list_projects(tenant).unwrap()[0].time_entries.len(), 1);
    }

    #[test]
    fn empty_snapshot_sections_default() {
        let parsed: RecordSnapshot = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed, RecordSnapshot::default());
    }
}
