//! TenantFence server: a guarded statement engine behind an axum API.
//!
//! The core crate decides what a statement is allowed to do; this crate
//! hosts an engine that obeys those decisions, an entity catalog, standing
//! tenancy guardrails, and the HTTP surface that binds a request context
//! around every handler.

pub mod engine;
pub mod entities;
pub mod guardrails;
pub mod network;

pub use engine::{EngineError, GuardedEngine, MemoryEngine, Row, StatementEngine, StatementOutcome};

#[cfg(test)]
mod tests {
    #[test]
    fn crate_loads() {
        assert!(!crate::guardrails::GLOBAL_ENTITY_ALLOWLIST.is_empty());
    }
}
