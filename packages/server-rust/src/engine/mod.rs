//! Statement execution: the engine trait, the guarded wrapper that runs
//! every statement through the interceptor chokepoint, and the in-memory
//! engine used for development and tests.
//!
//! The real production engine (connection pool, SQL driver, retries) is an
//! external collaborator; this module owns only the seam it plugs into.

pub mod guarded;
pub mod memory;

use std::collections::BTreeMap;

use async_trait::async_trait;
use tenantfence_core::{ScopeError, Statement, Value};

pub use guarded::GuardedEngine;
pub use memory::MemoryEngine;

/// A stored or returned row: column name to value.
pub type Row = BTreeMap<String, Value>;

/// Result of executing a statement.
#[derive(Debug, Clone, PartialEq)]
pub enum StatementOutcome {
    /// Rows matched by a select.
    Rows(Vec<Row>),
    /// Result of a count aggregate.
    Count(u64),
    /// Result of a sum aggregate.
    Sum(f64),
    /// Number of rows touched by an update or delete.
    Affected(u64),
    /// The insert completed.
    Inserted,
}

/// Errors from statement execution.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The filter injector refused the statement. Raised synchronously,
    /// before any I/O, so it carries no partial side effects.
    #[error(transparent)]
    Scope(#[from] ScopeError),
    /// The statement references an entity with no backing table.
    #[error("unknown entity `{0}`")]
    UnknownEntity(&'static str),
    /// The in-memory engine executes single-entity statements only.
    #[error("join execution is not supported by this engine")]
    JoinUnsupported,
    /// Sum aggregate over a column holding non-numeric values.
    #[error("sum over non-numeric column `{column}`")]
    NonNumericColumn {
        /// Column the aggregate targeted.
        column: String,
    },
}

/// An async statement execution engine.
///
/// Accessed through [`GuardedEngine`], statements arrive already rewritten
/// by the interceptor chain. Direct access is the administrative path
/// (schema setup/teardown, seeding, migrations) and bypasses filtering.
#[async_trait]
pub trait StatementEngine: Send + Sync {
    /// Executes a statement.
    ///
    /// # Errors
    ///
    /// Returns an [`EngineError`] when the statement cannot execute; a
    /// [`ScopeError`] wrapped in [`EngineError::Scope`] when the filter
    /// injector rejected it.
    async fn execute(&self, statement: Statement) -> Result<StatementOutcome, EngineError>;
}
