//! Entity capability tags and the persisted-entity catalog.
//!
//! Capabilities are declared once per persisted-entity type as plain data
//! (no trait-hierarchy inspection): the classifier and the filter injector
//! read them at statement-build time. An entity without the tenant-aware
//! capability is an intentionally-global entity and must appear in the
//! server's explicit allow-list, which the guardrail checks enforce.

use serde::{Deserialize, Serialize};

/// Marker capabilities attached to a persisted-entity definition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// Rows are scoped to a single tenant via the tenant id column.
    pub tenant_aware: bool,
    /// Rows are deleted by stamping a deletion timestamp, not removed.
    pub soft_deletable: bool,
    /// Rows carry versioned audit columns. Not filter-relevant; consumed
    /// by audit tooling, carried here so declarations stay in one place.
    pub versioned_audit: bool,
}

impl Capabilities {
    /// No capabilities: an intentionally-global, hard-deleted entity.
    pub const NONE: Self = Self {
        tenant_aware: false,
        soft_deletable: false,
        versioned_audit: false,
    };

    /// Adds the tenant-aware capability.
    #[must_use]
    pub const fn with_tenant_aware(self) -> Self {
        Self {
            tenant_aware: true,
            soft_deletable: self.soft_deletable,
            versioned_audit: self.versioned_audit,
        }
    }

    /// Adds the soft-deletable capability.
    #[must_use]
    pub const fn with_soft_delete(self) -> Self {
        Self {
            tenant_aware: self.tenant_aware,
            soft_deletable: true,
            versioned_audit: self.versioned_audit,
        }
    }

    /// Adds the versioned-audit capability.
    #[must_use]
    pub const fn with_versioned_audit(self) -> Self {
        Self {
            tenant_aware: self.tenant_aware,
            soft_deletable: self.soft_deletable,
            versioned_audit: true,
        }
    }
}

/// Declaration-time definition of a persisted-entity type.
///
/// Declared as `static` items and referenced by statements; read-only for
/// the lifetime of the process.
#[derive(Debug, PartialEq, Eq)]
pub struct EntityDef {
    /// Table/collection name.
    pub name: &'static str,
    /// Capability tags consulted by the classifier and injector.
    pub capabilities: Capabilities,
    /// Column holding the owning tenant id.
    pub tenant_column: &'static str,
    /// Column holding the soft-deletion timestamp.
    pub deleted_column: &'static str,
}

impl EntityDef {
    /// Defines an entity with the conventional `tenant_id` / `deleted_at`
    /// column names.
    #[must_use]
    pub const fn new(name: &'static str, capabilities: Capabilities) -> Self {
        Self {
            name,
            capabilities,
            tenant_column: "tenant_id",
            deleted_column: "deleted_at",
        }
    }
}

/// Explicit list of every persisted entity known to an application.
///
/// Built once at startup and handed to the guardrail checks; there is no
/// implicit global registration.
#[derive(Debug, Default)]
pub struct EntityCatalog {
    entities: Vec<&'static EntityDef>,
}

impl EntityCatalog {
    /// Creates a catalog from the given entity definitions.
    #[must_use]
    pub fn new(entities: Vec<&'static EntityDef>) -> Self {
        Self { entities }
    }

    /// Iterates over all catalogued entities.
    pub fn iter(&self) -> impl Iterator<Item = &'static EntityDef> + '_ {
        self.entities.iter().copied()
    }

    /// Looks up an entity by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&'static EntityDef> {
        self.entities.iter().copied().find(|e| e.name == name)
    }

    /// Number of catalogued entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
