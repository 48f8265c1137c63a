//! Filter injection: the before-execute chokepoint every statement passes
//! through.
//!
//! [`ScopeFilter`] consults the classifier and the ambient context and
//! either rewrites the statement (tenant predicate per tenant-aware source,
//! not-deleted predicate per soft-deletable source, tenant stamp on
//! inserts), passes it through untouched (untagged statements, global
//! access), or rejects it before any I/O happens. Rejection is a hard
//! failure: this is a security boundary, not a convenience filter.
//!
//! Schema setup/teardown and migrations do not pass through interceptors;
//! they use the engine's administrative path directly.

use crate::classify;
use crate::context;
use crate::entity::EntityDef;
use crate::error::ScopeError;
use crate::statement::{Predicate, Statement, StatementKind, Value};

/// A synchronous statement interceptor invoked immediately before a
/// statement is handed to the execution engine.
///
/// Implementations must not perform I/O and must not retain context state:
/// the ambient context is read per call, never cached across suspension
/// points.
pub trait StatementInterceptor: Send + Sync {
    /// Inspects and possibly rewrites `statement`.
    ///
    /// # Errors
    ///
    /// Returns a [`ScopeError`] when the statement must not execute under
    /// the ambient context. The engine propagates the error unchanged.
    fn before_execute(&self, statement: Statement) -> Result<Statement, ScopeError>;
}

/// The tenancy and soft-delete filter injector.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScopeFilter;

impl ScopeFilter {
    /// Creates the filter. Stateless; all state lives in the ambient
    /// context.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl StatementInterceptor for ScopeFilter {
    fn before_execute(&self, mut statement: Statement) -> Result<Statement, ScopeError> {
        let tenant_targets = classify::tenant_targets(&statement);
        let soft_delete_targets = classify::soft_delete_targets(&statement);
        if tenant_targets.is_empty() && soft_delete_targets.is_empty() {
            return Ok(statement);
        }

        let ctx = context::current();

        if !tenant_targets.is_empty() {
            if ctx.allow_global_access {
                tracing::debug!(
                    entity = statement.primary().name,
                    "global access: tenant predicate bypassed"
                );
            } else if let Some(tenant_id) = ctx.tenant_id.clone() {
                for entity in &tenant_targets {
                    scope_to_tenant(&mut statement, entity, &tenant_id)?;
                }
            } else {
                let entity = tenant_targets[0].name;
                tracing::warn!(
                    entity,
                    kind = ?statement.kind(),
                    "rejecting unscoped statement against tenant-aware entity"
                );
                return Err(ScopeError::MissingTenantContext { entity });
            }
        }

        // Soft-delete visibility is independent of the tenant decision.
        // Inserts create live rows; the predicate only applies to
        // statements that match existing rows.
        if !ctx.include_deleted && statement.kind() != StatementKind::Insert {
            for entity in &soft_delete_targets {
                statement.push_predicate(Predicate::is_null(entity.name, entity.deleted_column));
            }
        }

        Ok(statement)
    }
}

/// Scopes one tenant-aware source entity to `tenant_id`: a predicate for
/// reads/updates/deletes, a stamped assignment for inserts.
fn scope_to_tenant(
    statement: &mut Statement,
    entity: &'static EntityDef,
    tenant_id: &str,
) -> Result<(), ScopeError> {
    if statement.kind() == StatementKind::Insert {
        match statement.assignment(entity.tenant_column) {
            Some(Value::String(found)) if found == tenant_id => Ok(()),
            Some(found) => Err(ScopeError::TenantMismatch {
                entity: entity.name,
                expected: tenant_id.to_owned(),
                found: match found {
                    Value::String(s) => s.clone(),
                    other => format!("{other:?}"),
                },
            }),
            None => {
                statement.set_assignment(entity.tenant_column, tenant_id);
                Ok(())
            }
        }
    } else {
        statement.push_predicate(Predicate::eq(entity.name, entity.tenant_column, tenant_id));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Capabilities;
    use crate::scope::{include_soft_deleted_scope, system_scope, tenant_scope};
    use crate::statement::Comparison;

    static DOCUMENTS: EntityDef =
        EntityDef::new("documents", Capabilities::NONE.with_tenant_aware().with_soft_delete());
    static USERS: EntityDef =
        EntityDef::new("users", Capabilities::NONE.with_tenant_aware());
    static SETTINGS: EntityDef = EntityDef::new("settings", Capabilities::NONE);
    static DRAFTS: EntityDef =
        EntityDef::new("drafts", Capabilities::NONE.with_soft_delete());

    fn tenant_predicates<'a>(stmt: &'a Statement, entity: &str) -> Vec<&'a Predicate> {
        stmt.predicates()
            .iter()
            .filter(|p| p.entity == entity && p.column == "tenant_id")
            .collect()
    }

    fn deleted_predicates<'a>(stmt: &'a Statement, entity: &str) -> Vec<&'a Predicate> {
        stmt.predicates()
            .iter()
            .filter(|p| p.entity == entity && p.column == "deleted_at")
            .collect()
    }

    #[test]
    fn untagged_statement_passes_unmodified() {
        let stmt = Statement::select(&SETTINGS);
        let rewritten = ScopeFilter.before_execute(stmt.clone()).unwrap();
        assert_eq!(rewritten, stmt);
    }

    #[test]
    fn missing_context_rejects_before_execution() {
        // No binding at all: the ambient context is the empty default.
        let err = ScopeFilter
            .before_execute(Statement::select(&DOCUMENTS))
            .unwrap_err();
        assert_eq!(err, ScopeError::MissingTenantContext { entity: "documents" });
    }

    #[test]
    fn count_without_context_rejects_like_a_select() {
        let err = ScopeFilter
            .before_execute(Statement::count(&DOCUMENTS))
            .unwrap_err();
        assert_eq!(err, ScopeError::MissingTenantContext { entity: "documents" });
    }

    #[test]
    fn tenant_scope_injects_tenant_and_deleted_predicates() {
        context::bind_sync(|| {
            let _scope = tenant_scope("tenant-123", None).unwrap();
            let stmt = ScopeFilter
                .before_execute(Statement::count(&DOCUMENTS))
                .unwrap();

            let tenant = tenant_predicates(&stmt, "documents");
            assert_eq!(tenant.len(), 1);
            assert_eq!(tenant[0].comparison, Comparison::Eq);
            assert_eq!(tenant[0].value, Value::from("tenant-123"));

            let deleted = deleted_predicates(&stmt, "documents");
            assert_eq!(deleted.len(), 1);
            assert_eq!(deleted[0].comparison, Comparison::IsNull);
        });
    }

    #[test]
    fn system_scope_bypasses_tenant_but_not_soft_delete() {
        context::bind_sync(|| {
            let _scope = system_scope(Some("system")).unwrap();
            let stmt = ScopeFilter
                .before_execute(Statement::select(&DOCUMENTS))
                .unwrap();

            assert!(tenant_predicates(&stmt, "documents").is_empty());
            assert_eq!(deleted_predicates(&stmt, "documents").len(), 1);
        });
    }

    #[test]
    fn inclusion_scope_skips_the_deleted_predicate() {
        context::bind_sync(|| {
            let _tenant = tenant_scope("tenant-1", None).unwrap();
            let _inclusive = include_soft_deleted_scope().unwrap();
            let stmt = ScopeFilter
                .before_execute(Statement::select(&DOCUMENTS))
                .unwrap();

            assert_eq!(tenant_predicates(&stmt, "documents").len(), 1);
            assert!(deleted_predicates(&stmt, "documents").is_empty());
        });
    }

    #[test]
    fn soft_deletable_global_entity_filters_without_tenant_context() {
        // No tenant context needed: drafts is not tenant-aware, but its
        // soft-deleted rows must still be hidden.
        let stmt = ScopeFilter
            .before_execute(Statement::select(&DRAFTS))
            .unwrap();
        assert_eq!(deleted_predicates(&stmt, "drafts").len(), 1);
    }

    #[test]
    fn mixed_join_scopes_each_entity_by_its_own_tags() {
        context::bind_sync(|| {
            let _scope = tenant_scope("tenant-1", None).unwrap();
            let stmt = ScopeFilter
                .before_execute(
                    Statement::select(&DOCUMENTS).join(&SETTINGS).join(&USERS),
                )
                .unwrap();

            assert_eq!(tenant_predicates(&stmt, "documents").len(), 1);
            assert_eq!(tenant_predicates(&stmt, "users").len(), 1);
            assert!(tenant_predicates(&stmt, "settings").is_empty());

            assert_eq!(deleted_predicates(&stmt, "documents").len(), 1);
            assert!(deleted_predicates(&stmt, "users").is_empty());
            assert!(deleted_predicates(&stmt, "settings").is_empty());
        });
    }

    #[test]
    fn update_and_delete_are_scoped_like_selects() {
        context::bind_sync(|| {
            let _scope = tenant_scope("tenant-1", None).unwrap();

            let update = ScopeFilter
                .before_execute(Statement::update(&DOCUMENTS).set("title", "x"))
                .unwrap();
            assert_eq!(tenant_predicates(&update, "documents").len(), 1);
            assert_eq!(deleted_predicates(&update, "documents").len(), 1);

            let delete = ScopeFilter
                .before_execute(Statement::delete(&DOCUMENTS))
                .unwrap();
            assert_eq!(tenant_predicates(&delete, "documents").len(), 1);
        });
    }

    #[test]
    fn insert_is_stamped_with_the_ambient_tenant() {
        context::bind_sync(|| {
            let _scope = tenant_scope("tenant-1", None).unwrap();
            let stmt = ScopeFilter
                .before_execute(Statement::insert(&DOCUMENTS).set("title", "x"))
                .unwrap();

            assert_eq!(stmt.assignment("tenant_id"), Some(&Value::from("tenant-1")));
            // Inserts never receive the deleted_at predicate.
            assert!(deleted_predicates(&stmt, "documents").is_empty());
        });
    }

    #[test]
    fn insert_with_matching_tenant_is_accepted() {
        context::bind_sync(|| {
            let _scope = tenant_scope("tenant-1", None).unwrap();
            let stmt = ScopeFilter
                .before_execute(
                    Statement::insert(&DOCUMENTS).set("tenant_id", "tenant-1"),
                )
                .unwrap();
            assert_eq!(stmt.assignment("tenant_id"), Some(&Value::from("tenant-1")));
        });
    }

    #[test]
    fn insert_with_foreign_tenant_is_rejected() {
        context::bind_sync(|| {
            let _scope = tenant_scope("tenant-1", None).unwrap();
            let err = ScopeFilter
                .before_execute(
                    Statement::insert(&DOCUMENTS).set("tenant_id", "tenant-2"),
                )
                .unwrap_err();
            assert_eq!(
                err,
                ScopeError::TenantMismatch {
                    entity: "documents",
                    expected: "tenant-1".to_owned(),
                    found: "tenant-2".to_owned(),
                }
            );
        });
    }

    #[test]
    fn insert_without_context_is_rejected() {
        let err = ScopeFilter
            .before_execute(Statement::insert(&DOCUMENTS).set("title", "x"))
            .unwrap_err();
        assert_eq!(err, ScopeError::MissingTenantContext { entity: "documents" });
    }
}
