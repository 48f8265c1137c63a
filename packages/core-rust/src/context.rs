//! Ambient request context and its execution-unit-local store.
//!
//! The context slot is a tokio task-local: each spawned task (and each
//! [`bind`]-wrapped future) owns an independent slot that follows the task
//! when the runtime moves it between worker threads and stays stable across
//! suspension points. Two concurrently active requests can never observe or
//! mutate each other's tenant identity.
//!
//! Mutation is stack-disciplined: [`replace`] swaps in a new value and hands
//! back a [`Token`] capturing the prior one, [`restore`] reinstates it. The
//! scope guards in [`crate::scope`] are the only intended callers.

use std::cell::RefCell;
use std::future::Future;

use crate::error::ScopeError;

/// Per-request context carrying tenant identity and filter flags.
///
/// Immutable per scope: scope entry installs a new value and scope exit
/// restores the previous one; the value itself is never mutated in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    /// Tenant the current request is scoped to. `None` outside any tenant
    /// scope; statements against tenant-aware entities then require global
    /// access or are rejected.
    pub tenant_id: Option<String>,
    /// Acting user, if known. Carried for audit stamping; never consulted
    /// by the filter injector.
    pub user_id: Option<String>,
    /// When true, soft-deleted rows are visible to queries.
    pub include_deleted: bool,
    /// Elevated system/global mode: bypasses the tenant predicate entirely
    /// rather than matching "any tenant".
    pub allow_global_access: bool,
}

impl RequestContext {
    /// The empty default context: no identity, no flags.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether this is the empty default context.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Mutable slot state: the current context plus a depth stamp used to
/// detect out-of-order scope exits.
#[derive(Debug, Default)]
struct Slot {
    ctx: RequestContext,
    depth: u64,
}

tokio::task_local! {
    static AMBIENT: RefCell<Slot>;
}

/// Opaque handle capturing the context value that was ambient before a
/// [`replace`] call, plus the nesting depth it must be restored at.
#[derive(Debug)]
#[must_use = "a replaced context must be restored, or the ambient slot stays corrupted"]
pub struct Token {
    prev: RequestContext,
    depth: u64,
}

/// Binds a fresh ambient slot to `future` for its entire lifetime.
///
/// This is the per-request entry point: middleware wraps each request's
/// handler future in `bind` so the request owns its own slot. Nested binds
/// shadow the outer slot for the inner future.
pub fn bind<F: Future>(future: F) -> impl Future<Output = F::Output> {
    AMBIENT.scope(RefCell::new(Slot::default()), future)
}

/// Synchronous variant of [`bind`] for non-async callers and tests.
pub fn bind_sync<R>(f: impl FnOnce() -> R) -> R {
    AMBIENT.sync_scope(RefCell::new(Slot::default()), f)
}

/// Returns the ambient context for the calling execution unit.
///
/// Defaults to the empty context when no slot is bound, so read paths
/// never fail; enforcement happens in the filter injector.
#[must_use]
pub fn current() -> RequestContext {
    AMBIENT
        .try_with(|slot| slot.borrow().ctx.clone())
        .unwrap_or_default()
}

/// Atomically replaces the ambient context, returning a [`Token`] that
/// captures the prior value.
///
/// # Errors
///
/// Returns [`ScopeError::ContextNotBound`] when the calling execution unit
/// has no bound slot (code running outside [`bind`] / [`bind_sync`]).
pub fn replace(ctx: RequestContext) -> Result<Token, ScopeError> {
    AMBIENT
        .try_with(|slot| {
            let mut slot = slot.borrow_mut();
            slot.depth += 1;
            Token {
                prev: std::mem::replace(&mut slot.ctx, ctx),
                depth: slot.depth,
            }
        })
        .map_err(|_| ScopeError::ContextNotBound)
}

/// Reinstates the context captured by `token`.
///
/// # Panics
///
/// Panics when the token's depth does not match the ambient depth (a scope
/// exit without a matching entry, or exits in the wrong order) or when the
/// slot is no longer bound. Both indicate a programming error in the
/// caller; continuing with corrupted ambient state would be worse than
/// failing loudly. The panic is suppressed while the thread is already
/// unwinding so guard drops during a panic cannot abort the process.
pub fn restore(token: Token) {
    let expected_depth = token.depth;
    let outcome = AMBIENT.try_with(move |slot| {
        let mut slot = slot.borrow_mut();
        let mismatched = slot.depth != expected_depth;
        slot.ctx = token.prev;
        slot.depth = expected_depth.saturating_sub(1);
        mismatched
    });
    match outcome {
        Ok(false) => {}
        Ok(true) => {
            if !std::thread::panicking() {
                panic!("context scope exited out of order (depth {expected_depth})");
            }
        }
        Err(_) => {
            if !std::thread::panicking() {
                panic!("context restored outside its execution-unit binding");
            }
        }
    }
}

/// Forces the ambient slot back to the empty default. Test/debug use only;
/// production code exits scopes through their guards.
pub fn reset() {
    let _ = AMBIENT.try_with(|slot| {
        let mut slot = slot.borrow_mut();
        slot.ctx = RequestContext::default();
        slot.depth = 0;
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tenant_ctx(tenant: &str) -> RequestContext {
        RequestContext {
            tenant_id: Some(tenant.to_string()),
            ..RequestContext::default()
        }
    }

    #[test]
    fn current_defaults_to_empty_when_unbound() {
        let ctx = current();
        assert!(ctx.is_empty());
    }

    #[test]
    fn replace_fails_when_unbound() {
        let err = replace(tenant_ctx("t1")).unwrap_err();
        assert_eq!(err, ScopeError::ContextNotBound);
    }

    #[test]
    fn replace_and_restore_round_trip() {
        bind_sync(|| {
            assert!(current().is_empty());

            let token = replace(tenant_ctx("t1")).unwrap();
            assert_eq!(current().tenant_id.as_deref(), Some("t1"));

            restore(token);
            assert!(current().is_empty());
        });
    }

    #[test]
    fn restore_reinstates_exactly_the_prior_value() {
        bind_sync(|| {
            let outer = replace(tenant_ctx("outer")).unwrap();
            let snapshot = current();

            let inner = replace(tenant_ctx("inner")).unwrap();
            restore(inner);

            assert_eq!(current(), snapshot);
            restore(outer);
        });
    }

    #[test]
    #[should_panic(expected = "out of order")]
    fn out_of_order_restore_panics() {
        bind_sync(|| {
            let first = replace(tenant_ctx("a")).unwrap();
            let _second = replace(tenant_ctx("b")).unwrap();
            // Exiting the outer scope while the inner one is still active.
            restore(first);
        });
    }

    #[test]
    fn reset_forces_empty_default() {
        bind_sync(|| {
            let _token = replace(tenant_ctx("t1")).unwrap();
            reset();
            assert!(current().is_empty());
        });
    }

    #[test]
    fn bind_sync_slots_are_independent() {
        bind_sync(|| {
            let _token = replace(tenant_ctx("outer")).unwrap();
            bind_sync(|| {
                // Inner binding shadows the outer slot entirely.
                assert!(current().is_empty());
            });
            assert_eq!(current().tenant_id.as_deref(), Some("outer"));
        });
    }

    #[tokio::test]
    async fn context_is_stable_across_suspension_points() {
        bind(async {
            let token = replace(tenant_ctx("t1")).unwrap();
            tokio::task::yield_now().await;
            assert_eq!(current().tenant_id.as_deref(), Some("t1"));
            restore(token);
        })
        .await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_tasks_never_observe_each_other() {
        let mut handles = Vec::new();
        for i in 0..16 {
            handles.push(tokio::spawn(bind(async move {
                let tenant = format!("tenant-{i}");
                let token = replace(tenant_ctx(&tenant)).unwrap();
                for _ in 0..50 {
                    tokio::task::yield_now().await;
                    assert_eq!(current().tenant_id.as_deref(), Some(tenant.as_str()));
                }
                restore(token);
            })));
        }
        for handle in handles {
            handle.await.unwrap();
        }
    }
}
