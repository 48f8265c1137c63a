//! [`GuardedEngine`]: the single chokepoint between statement builders and
//! the execution engine.
//!
//! Every statement passes the interceptor chain synchronously before the
//! inner engine sees it. The chain defaults to the core [`ScopeFilter`];
//! additional interceptors (audit stamping, query logging) append after it.

use std::sync::Arc;

use async_trait::async_trait;
use tenantfence_core::{ScopeFilter, Statement, StatementInterceptor};

use super::{EngineError, StatementEngine, StatementOutcome};

/// Wraps an engine so that no statement reaches it without passing the
/// interceptor chain.
pub struct GuardedEngine<E> {
    inner: E,
    interceptors: Vec<Arc<dyn StatementInterceptor>>,
}

impl<E: StatementEngine> GuardedEngine<E> {
    /// Guards `inner` with the default chain: the tenancy/soft-delete
    /// [`ScopeFilter`].
    #[must_use]
    pub fn new(inner: E) -> Self {
        Self {
            inner,
            interceptors: vec![Arc::new(ScopeFilter::new())],
        }
    }

    /// Appends an interceptor to the chain. Interceptors run in insertion
    /// order; each receives the previous one's rewritten statement.
    #[must_use]
    pub fn with_interceptor(mut self, interceptor: Arc<dyn StatementInterceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    /// Administrative access to the inner engine, bypassing the chain.
    ///
    /// For schema setup/teardown, seeding, and migrations only. Request
    /// handlers must never touch this.
    #[must_use]
    pub fn raw(&self) -> &E {
        &self.inner
    }
}

#[async_trait]
impl<E: StatementEngine> StatementEngine for GuardedEngine<E> {
    async fn execute(&self, statement: Statement) -> Result<StatementOutcome, EngineError> {
        let mut statement = statement;
        // Synchronous rewriting happens entirely before the first await:
        // the ambient context cannot change underneath the chain.
        for interceptor in &self.interceptors {
            statement = interceptor.before_execute(statement)?;
        }
        self.inner.execute(statement).await
    }
}
