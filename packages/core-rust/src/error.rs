//! Error taxonomy for the tenancy enforcement core.
//!
//! Every variant here is a hard failure: the filter injector rejects the
//! statement before any I/O happens, so a `ScopeError` never carries
//! partial side effects. Out-of-order scope exits are a programming error
//! and panic instead (see [`crate::context::restore`]).

/// Errors raised by the context store and the filter injector.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScopeError {
    /// A statement targeting a tenant-aware entity was about to execute
    /// with no ambient tenant id and no global access. This is the
    /// security boundary; it is never downgraded to a warning.
    #[error(
        "no tenant context: statement targets tenant-aware entity `{entity}` \
         with no ambient tenant id and no global access"
    )]
    MissingTenantContext {
        /// First tenant-aware entity targeted by the rejected statement.
        entity: &'static str,
    },

    /// An insert carried an explicit tenant id that differs from the
    /// ambient tenant. Writing rows into another tenant's partition is
    /// rejected outright rather than silently re-stamped.
    #[error("tenant mismatch on `{entity}`: ambient tenant is `{expected}`, statement carries `{found}`")]
    TenantMismatch {
        /// Entity the insert targets.
        entity: &'static str,
        /// Tenant id of the ambient context.
        expected: String,
        /// Tenant id found in the statement's assignments.
        found: String,
    },

    /// The ambient context slot was never bound for this execution unit.
    /// Scope guards can only be entered inside [`crate::context::bind`] or
    /// [`crate::context::bind_sync`].
    #[error("ambient context is not bound for this execution unit")]
    ContextNotBound,
}
