//! HTTP endpoint handlers.
//!
//! Health, info, and branding are thin reads of settings. The document
//! handlers drive statements through the guarded engine, so tenant and
//! soft-delete enforcement happens in the core, not here.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tenantfence_core::{ScopeError, Statement};

use super::settings::AppSettings;
use crate::engine::{EngineError, GuardedEngine, MemoryEngine, Row, StatementEngine, StatementOutcome};
use crate::entities::DOCUMENTS;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    /// Application settings served by info/branding.
    pub settings: Arc<AppSettings>,
    /// The guarded statement engine. Handlers have no raw engine access.
    pub engine: Arc<GuardedEngine<MemoryEngine>>,
    /// Server start time, for uptime reporting.
    pub start_time: Instant,
}

impl AppState {
    /// Builds the state from settings and a guarded engine.
    #[must_use]
    pub fn new(settings: AppSettings, engine: GuardedEngine<MemoryEngine>) -> Self {
        Self {
            settings: Arc::new(settings),
            engine: Arc::new(engine),
            start_time: Instant::now(),
        }
    }
}

/// Engine error mapped to an HTTP response.
///
/// Scope rejections are the caller's fault (403); everything else is a
/// server-side failure. The error kind stays distinguishable in the body.
#[derive(Debug)]
pub struct ApiError(EngineError);

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            EngineError::Scope(
                ScopeError::MissingTenantContext { .. } | ScopeError::TenantMismatch { .. },
            ) => StatusCode::FORBIDDEN,
            EngineError::Scope(ScopeError::ContextNotBound)
            | EngineError::UnknownEntity(_)
            | EngineError::JoinUnsupported
            | EngineError::NonNumericColumn { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

/// Returns service health and uptime as JSON. Always 200; monitoring reads
/// the body.
pub async fn health_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "uptime_secs": state.start_time.elapsed().as_secs(),
    }))
}

/// Liveness probe: the process is up and serving.
pub async fn livez_handler() -> StatusCode {
    StatusCode::OK
}

/// Readiness probe. The engine is in-process with no external
/// dependencies, so readiness follows liveness.
pub async fn readyz_handler() -> StatusCode {
    StatusCode::OK
}

/// Returns application name, version, and environment.
pub async fn info_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "name": state.settings.app_name,
        "version": state.settings.version,
        "environment": state.settings.environment,
    }))
}

/// Returns the branding settings verbatim.
pub async fn branding_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!(state.settings.branding))
}

/// Lists the current tenant's live documents.
pub async fn list_documents(State(state): State<AppState>) -> Result<Json<Vec<Row>>, ApiError> {
    match state.engine.execute(Statement::select(&DOCUMENTS)).await? {
        StatementOutcome::Rows(rows) => Ok(Json(rows)),
        other => {
            tracing::error!(?other, "select returned a non-row outcome");
            Err(EngineError::UnknownEntity(DOCUMENTS.name).into())
        }
    }
}

/// Counts the current tenant's live documents.
pub async fn count_documents(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    match state.engine.execute(Statement::count(&DOCUMENTS)).await? {
        StatementOutcome::Count(count) => Ok(Json(json!({ "count": count }))),
        other => {
            tracing::error!(?other, "count returned a non-count outcome");
            Err(EngineError::UnknownEntity(DOCUMENTS.name).into())
        }
    }
}

/// Body for document creation.
#[derive(Debug, Deserialize)]
pub struct CreateDocument {
    /// Document title.
    pub title: String,
}

/// Creates a document for the current tenant. The tenant id is stamped by
/// the filter injector, never taken from the body.
pub async fn create_document(
    State(state): State<AppState>,
    Json(body): Json<CreateDocument>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let id = uuid::Uuid::new_v4().to_string();
    state
        .engine
        .execute(
            Statement::insert(&DOCUMENTS)
                .set("id", id.as_str())
                .set("title", body.title),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}
