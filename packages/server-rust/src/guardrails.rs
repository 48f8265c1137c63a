//! Standing tenancy guardrails.
//!
//! Not hot-path logic: these checks exist to catch silent regressions
//! where a new entity or route lands without tenant enforcement. They run
//! as tests on every build and as assertions at server startup. Both
//! allow-lists are deliberately short and every addition is a review
//! event.

use anyhow::bail;
use tenantfence_core::EntityCatalog;

use crate::network::routes::{RouteAccess, RouteDef};

/// Entities allowed to exist without the tenant-aware capability.
pub const GLOBAL_ENTITY_ALLOWLIST: &[&str] = &["tenants"];

/// Path prefixes allowed to be served without a tenant scope.
pub const PUBLIC_ROUTE_PREFIXES: &[&str] = &[
    "/healthz",
    "/livez",
    "/readyz",
    "/api/info",
    "/api/branding",
];

/// Checks that every catalogued entity is tenant-aware unless allow-listed.
///
/// # Errors
///
/// Returns one human-readable violation per offending entity.
pub fn verify_entity_catalog(catalog: &EntityCatalog) -> Result<(), Vec<String>> {
    let violations: Vec<String> = catalog
        .iter()
        .filter(|entity| {
            !entity.capabilities.tenant_aware && !GLOBAL_ENTITY_ALLOWLIST.contains(&entity.name)
        })
        .map(|entity| {
            format!(
                "entity `{}` is not tenant-aware and is not in the global entity allow-list",
                entity.name
            )
        })
        .collect();
    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

/// Checks that every route is tenant-scoped unless its path prefix is
/// allow-listed as public.
///
/// # Errors
///
/// Returns one human-readable violation per offending route.
pub fn verify_route_table(routes: &[RouteDef]) -> Result<(), Vec<String>> {
    let violations: Vec<String> = routes
        .iter()
        .filter(|route| {
            matches!(route.access, RouteAccess::Public)
                && !PUBLIC_ROUTE_PREFIXES
                    .iter()
                    .any(|prefix| route.path.starts_with(prefix))
        })
        .map(|route| {
            format!(
                "route `{} {}` is public but its path prefix is not allow-listed",
                route.method, route.path
            )
        })
        .collect();
    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

/// Runs both guardrails; the server refuses to start on any violation.
///
/// # Errors
///
/// Returns an error listing every violation found.
pub fn enforce_at_startup(catalog: &EntityCatalog, routes: &[RouteDef]) -> anyhow::Result<()> {
    let mut violations = Vec::new();
    if let Err(mut v) = verify_entity_catalog(catalog) {
        violations.append(&mut v);
    }
    if let Err(mut v) = verify_route_table(routes) {
        violations.append(&mut v);
    }
    if violations.is_empty() {
        Ok(())
    } else {
        bail!("tenancy guardrail violations:\n  {}", violations.join("\n  "));
    }
}
