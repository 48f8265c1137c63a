//! Statement classification: which entities a statement targets, and
//! whether any of them carry filter-relevant capabilities.
//!
//! Resolution is always from the statement's selected-from metadata
//! ([`Statement::sources`]), never from its selected columns. Aggregate
//! statements (`count(*)`, `sum(...)`) have no column-level entity binding
//! at all; a column-based classifier would silently leave them unprotected.

use crate::entity::EntityDef;
use crate::statement::Statement;

/// Whether the statement targets at least one tenant-aware entity.
///
/// Joins count: a statement joining a tenant-aware entity into an
/// otherwise-global query still requires tenant scoping.
#[must_use]
pub fn targets_tenant_entities(statement: &Statement) -> bool {
    !tenant_targets(statement).is_empty()
}

/// Whether the statement targets at least one soft-deletable entity.
#[must_use]
pub fn targets_soft_deletable_entities(statement: &Statement) -> bool {
    !soft_delete_targets(statement).is_empty()
}

/// The tenant-aware subset of the statement's source entities.
///
/// Each entity is filtered independently by its own capability tags: a
/// mixed join returns exactly the tenant-aware sources, so the injector
/// can scope those and leave intentionally-global sources alone.
#[must_use]
pub fn tenant_targets(statement: &Statement) -> Vec<&'static EntityDef> {
    statement
        .sources()
        .iter()
        .copied()
        .filter(|entity| entity.capabilities.tenant_aware)
        .collect()
}

/// The soft-deletable subset of the statement's source entities.
#[must_use]
pub fn soft_delete_targets(statement: &Statement) -> Vec<&'static EntityDef> {
    statement
        .sources()
        .iter()
        .copied()
        .filter(|entity| entity.capabilities.soft_deletable)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Capabilities;

    static DOCUMENTS: EntityDef =
        EntityDef::new("documents", Capabilities::NONE.with_tenant_aware().with_soft_delete());
    static USERS: EntityDef =
        EntityDef::new("users", Capabilities::NONE.with_tenant_aware());
    static SETTINGS: EntityDef = EntityDef::new("settings", Capabilities::NONE);
    static DRAFTS: EntityDef =
        EntityDef::new("drafts", Capabilities::NONE.with_soft_delete());

    #[test]
    fn simple_select_on_tenant_entity() {
        let stmt = Statement::select(&DOCUMENTS);
        assert!(targets_tenant_entities(&stmt));
        assert!(targets_soft_deletable_entities(&stmt));
    }

    #[test]
    fn writes_classify_like_reads() {
        assert!(targets_tenant_entities(&Statement::insert(&USERS)));
        assert!(targets_tenant_entities(&Statement::update(&USERS)));
        assert!(targets_tenant_entities(&Statement::delete(&USERS)));
    }

    #[test]
    fn aggregate_count_resolves_from_sources() {
        // The critical edge case: count(*) selects no columns, so target
        // resolution must come from the from-clause metadata.
        let stmt = Statement::count(&DOCUMENTS);
        assert!(targets_tenant_entities(&stmt));
        assert!(targets_soft_deletable_entities(&stmt));
    }

    #[test]
    fn aggregate_sum_resolves_from_sources() {
        let stmt = Statement::sum(&DOCUMENTS, "size_bytes");
        assert!(targets_tenant_entities(&stmt));
    }

    #[test]
    fn global_entity_statement_is_untargeted() {
        let stmt = Statement::count(&SETTINGS);
        assert!(!targets_tenant_entities(&stmt));
        assert!(!targets_soft_deletable_entities(&stmt));
    }

    #[test]
    fn join_targets_if_any_source_is_tagged() {
        let stmt = Statement::select(&SETTINGS).join(&DOCUMENTS);
        assert!(targets_tenant_entities(&stmt));
    }

    #[test]
    fn mixed_join_resolves_per_entity() {
        let stmt = Statement::select(&DOCUMENTS).join(&SETTINGS).join(&DRAFTS);

        let tenant: Vec<_> = tenant_targets(&stmt).iter().map(|e| e.name).collect();
        assert_eq!(tenant, vec!["documents"]);

        let soft: Vec<_> = soft_delete_targets(&stmt).iter().map(|e| e.name).collect();
        assert_eq!(soft, vec!["documents", "drafts"]);
    }
}
