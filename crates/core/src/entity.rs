//! Entity traits: identity and tenant ownership of record snapshots.

use crate::id::TenantId;

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> Self::Id;
}

/// A record that belongs to exactly one tenant.
///
/// Stores key records by `(tenant_id, id)` and the analytics service uses this
/// to verify that a fetched snapshot never crosses the tenant boundary.
pub trait TenantOwned: Entity {
    fn tenant_id(&self) -> TenantId;

    fn belongs_to(&self, tenant_id: TenantId) -> bool {
        self.tenant_id() == tenant_id
    }
}
