//! `TenantFence` Core: ambient request context, scope guards, statement
//! classification, and tenant/soft-delete filter injection.
//!
//! The enforcement model in one paragraph: request middleware establishes a
//! [`RequestContext`] in an execution-unit-local slot ([`context::bind`] +
//! the scope guards in [`scope`]); every statement the application builds
//! passes through a [`StatementInterceptor`] before it reaches the
//! execution engine; [`ScopeFilter`] classifies the statement's source
//! entities by their [`Capabilities`] and injects a tenant predicate and a
//! not-deleted predicate, bypasses filtering under system scope, or rejects
//! the statement outright when no tenant context is ambient.

pub mod classify;
pub mod context;
pub mod entity;
pub mod error;
pub mod filter;
pub mod scope;
pub mod statement;

pub use context::{RequestContext, Token};
pub use entity::{Capabilities, EntityCatalog, EntityDef};
pub use error::ScopeError;
pub use filter::{ScopeFilter, StatementInterceptor};
pub use scope::{include_soft_deleted_scope, system_scope, tenant_scope, ScopeGuard};
pub use statement::{
    Aggregate, Comparison, Predicate, Projection, Statement, StatementKind, Value,
};
