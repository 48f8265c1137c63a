//! Scoped context entry: tenant, system, and soft-delete-inclusion scopes.
//!
//! Each helper installs a derived context and returns a [`ScopeGuard`] whose
//! `Drop` restores the prior value. Drop runs on every exit path: normal
//! return, early return, unwinding, and future cancellation (a cancelled
//! task drops its future, which drops any live guards while the task-local
//! slot is still accessible).

use crate::context::{self, RequestContext, Token};
use crate::error::ScopeError;

/// RAII guard for an entered context scope.
///
/// Exiting happens strictly in reverse entry order; dropping guards out of
/// order trips the depth check in [`context::restore`] and panics.
#[derive(Debug)]
#[must_use = "the scope is exited as soon as the guard is dropped"]
pub struct ScopeGuard {
    token: Option<Token>,
}

impl ScopeGuard {
    fn enter(ctx: RequestContext) -> Result<Self, ScopeError> {
        let token = context::replace(ctx)?;
        Ok(Self { token: Some(token) })
    }
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        if let Some(token) = self.token.take() {
            context::restore(token);
        }
    }
}

/// Enters a tenant scope: statements against tenant-aware entities are
/// filtered to `tenant_id` until the guard is dropped.
///
/// Clears any ambient global access (tenant and system scope are mutually
/// exclusive authorization sources) and inherits the ambient soft-delete
/// inclusion flag, so nesting inside [`include_soft_deleted_scope`]
/// composes.
///
/// # Errors
///
/// Returns [`ScopeError::ContextNotBound`] outside a bound execution unit.
pub fn tenant_scope(
    tenant_id: impl Into<String>,
    user_id: Option<&str>,
) -> Result<ScopeGuard, ScopeError> {
    let mut ctx = context::current();
    ctx.tenant_id = Some(tenant_id.into());
    ctx.user_id = user_id.map(str::to_owned);
    ctx.allow_global_access = false;
    ScopeGuard::enter(ctx)
}

/// Enters an elevated system scope: tenant filtering is bypassed entirely
/// for administrative or cross-tenant work.
///
/// The tenant id is cleared rather than wildcarded; global access is a
/// distinct authorization source, not a tenant of "any".
///
/// # Errors
///
/// Returns [`ScopeError::ContextNotBound`] outside a bound execution unit.
pub fn system_scope(user_id: Option<&str>) -> Result<ScopeGuard, ScopeError> {
    let mut ctx = context::current();
    ctx.tenant_id = None;
    ctx.user_id = user_id.map(str::to_owned);
    ctx.allow_global_access = true;
    ScopeGuard::enter(ctx)
}

/// Makes soft-deleted rows visible until the guard is dropped, preserving
/// whatever tenant/system state is currently ambient.
///
/// # Errors
///
/// Returns [`ScopeError::ContextNotBound`] outside a bound execution unit.
pub fn include_soft_deleted_scope() -> Result<ScopeGuard, ScopeError> {
    let mut ctx = context::current();
    ctx.include_deleted = true;
    ScopeGuard::enter(ctx)
}
