//! Context-establishing middleware.
//!
//! Wraps every request's handler future in a fresh execution-unit-local
//! context binding, then enters a tenant scope from the identity headers
//! when present. Requests without a tenant header run with the empty
//! default context; whether that is acceptable is decided per statement by
//! the filter injector, not here.

use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tenantfence_core::{context, tenant_scope};

/// Header carrying the authenticated tenant id. Populated by the edge
/// proxy after authentication; never trusted from the open internet.
pub const TENANT_HEADER: &str = "x-tenant-id";

/// Header carrying the authenticated user id.
pub const USER_HEADER: &str = "x-user-id";

fn header_string(request: &Request, name: &str) -> Option<String> {
    request
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
}

/// Binds a per-request context slot and enters a tenant scope from the
/// identity headers.
pub async fn context_middleware(request: Request, next: Next) -> Response {
    let tenant_id = header_string(&request, TENANT_HEADER);
    let user_id = header_string(&request, USER_HEADER);

    context::bind(async move {
        match tenant_id {
            Some(tenant_id) => match tenant_scope(tenant_id, user_id.as_deref()) {
                Ok(_scope) => next.run(request).await,
                Err(err) => {
                    tracing::error!(error = %err, "failed to enter tenant scope");
                    StatusCode::INTERNAL_SERVER_ERROR.into_response()
                }
            },
            None => next.run(request).await,
        }
    })
    .await
}
