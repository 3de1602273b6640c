use serde::{Deserialize, Serialize};

use billable_core::{CompanyId, Entity, ProjectId, TenantId, TenantOwned};

use crate::company::Company;
use crate::time_entry::{TimeEntry, TrackedTime};

/// Project snapshot with its companies and every time entry logged against it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub tenant_id: TenantId,
    pub name: String,
    /// ISO 4217 code; informational only (no conversion).
    pub currency: String,
    #[serde(default)]
    pub companies: Vec<Company>,
    #[serde(default)]
    pub time_entries: Vec<TimeEntry>,
}

impl Project {
    pub fn has_company(&self, company_id: CompanyId) -> bool {
        self.companies.iter().any(|c| c.id == company_id)
    }

    /// Lightweight reference carried alongside listed time entries.
    pub fn to_ref(&self) -> ProjectRef {
        ProjectRef {
            id: self.id,
            tenant_id: self.tenant_id,
            name: self.name.clone(),
            company_ids: self.companies.iter().map(|c| c.id).collect(),
        }
    }

    /// Flatten nested entries into `TrackedTime` rows.
    pub fn tracked_time(&self) -> Vec<TrackedTime> {
        let project = self.to_ref();
        self.time_entries
            .iter()
            .map(|entry| TrackedTime {
                entry: entry.clone(),
                project: project.clone(),
            })
            .collect()
    }
}

impl Entity for Project {
    type Id = ProjectId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

impl TenantOwned for Project {
    fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }
}

/// Project identity as seen from a time entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRef {
    pub id: ProjectId,
    pub tenant_id: TenantId,
    pub name: String,
    #[serde(default)]
    pub company_ids: Vec<CompanyId>,
}

impl ProjectRef {
    pub fn has_company(&self, company_id: CompanyId) -> bool {
        self.company_ids.contains(&company_id)
    }
}
