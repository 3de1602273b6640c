use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use billable_core::{CompanyId, Entity, TenantId, TenantOwned};

/// Role tag carried by a company. A company may hold both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompanyKind {
    Contractor,
    Customer,
}

/// Company snapshot (contractor, customer, or both).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub id: CompanyId,
    pub tenant_id: TenantId,
    pub name: String,
    pub kinds: BTreeSet<CompanyKind>,
}

impl Company {
    pub fn new(
        tenant_id: TenantId,
        name: impl Into<String>,
        kinds: impl IntoIterator<Item = CompanyKind>,
    ) -> Self {
        Self {
            id: CompanyId::new(),
            tenant_id,
            name: name.into(),
            kinds: kinds.into_iter().collect(),
        }
    }

    pub fn has_kind(&self, kind: CompanyKind) -> bool {
        self.kinds.contains(&kind)
    }

    pub fn is_contractor(&self) -> bool {
        self.has_kind(CompanyKind::Contractor)
    }

    pub fn is_customer(&self) -> bool {
        self.has_kind(CompanyKind::Customer)
    }
}

impl Entity for Company {
    type Id = CompanyId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

impl TenantOwned for Company {
    fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn company_can_hold_both_tags() {
        let c = Company::new(
            TenantId::new(),
            "Acme",
            [CompanyKind::Contractor, CompanyKind::Customer],
        );
        assert!(c.is_contractor());
        assert!(c.is_customer());
    }

    #[test]
    fn duplicate_tags_collapse() {
        let c = Company::new(
            TenantId::new(),
            "Solo",
            [CompanyKind::Contractor, CompanyKind::Contractor],
        );
        assert_eq!(c.kinds.len(), 1);
        assert!(!c.is_customer());
    }

    #[test]
    fn kinds_serialize_lowercase() {
        let c = Company::new(TenantId::new(), "Acme", [CompanyKind::Customer]);
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["kinds"], serde_json::json!(["customer"]));
    }
}
