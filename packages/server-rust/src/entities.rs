//! Persisted-entity declarations and the application catalog.
//!
//! Every persisted entity is declared here and nowhere else; the guardrail
//! checks run against [`catalog`], so an entity that skips this file also
//! skips review of its tenancy posture.

use tenantfence_core::{Capabilities, EntityCatalog, EntityDef};

/// The tenant registry itself. Intentionally global: rows are the tenants,
/// so they cannot be scoped to one. Allow-listed in the guardrails.
pub static TENANTS: EntityDef = EntityDef::new("tenants", Capabilities::NONE);

/// User accounts, owned by a tenant, soft-deleted and audited.
pub static USERS: EntityDef = EntityDef::new(
    "users",
    Capabilities::NONE
        .with_tenant_aware()
        .with_soft_delete()
        .with_versioned_audit(),
);

/// Tenant documents, the primary workload entity.
pub static DOCUMENTS: EntityDef = EntityDef::new(
    "documents",
    Capabilities::NONE.with_tenant_aware().with_soft_delete(),
);

/// Append-only audit trail, scoped per tenant, never soft-deleted.
pub static AUDIT_EVENTS: EntityDef = EntityDef::new(
    "audit_events",
    Capabilities::NONE.with_tenant_aware().with_versioned_audit(),
);

/// The complete catalog of persisted entities.
#[must_use]
pub fn catalog() -> EntityCatalog {
    EntityCatalog::new(vec![&TENANTS, &USERS, &DOCUMENTS, &AUDIT_EVENTS])
}
