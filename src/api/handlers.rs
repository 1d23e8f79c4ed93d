use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::alert::{Event, Handler};
use crate::config::Config;
use crate::registry::RegistryError;
use crate::service::{HandlerConfig, Service, ServiceError, TestOptions};

/// Application state shared across handlers
pub struct AppState {
    pub service: Arc<Service>,
}

// ============================================================================
// Health Check
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ============================================================================
// Workspaces & Config
// ============================================================================

#[derive(Serialize)]
pub struct WorkspacesResponse {
    pub workspaces: Vec<String>,
}

pub async fn list_workspaces(State(state): State<Arc<AppState>>) -> Json<WorkspacesResponse> {
    Json(WorkspacesResponse {
        workspaces: state.service.registry().workspace_ids(),
    })
}

#[derive(Deserialize)]
pub struct WorkspaceQuery {
    #[serde(default)]
    pub workspace: String,
}

pub async fn get_config(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WorkspaceQuery>,
) -> Result<Json<Config>, ApiError> {
    let config = state.service.config(&query.workspace)?;
    Ok(Json(config.redacted()))
}

#[derive(Serialize)]
pub struct UpdateResponse {
    pub applied: usize,
    pub workspaces: usize,
}

pub async fn update_config(
    State(state): State<Arc<AppState>>,
    Json(configs): Json<Vec<serde_json::Value>>,
) -> Result<Json<UpdateResponse>, ApiError> {
    let applied = configs.len();
    state.service.update(configs)?;

    Ok(Json(UpdateResponse {
        applied,
        workspaces: state.service.registry().len(),
    }))
}

// ============================================================================
// Alerts & Events
// ============================================================================

#[derive(Deserialize)]
pub struct AlertRequest {
    #[serde(default)]
    pub workspace: String,
    #[serde(default)]
    pub workflow: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct SentResponse {
    pub sent: bool,
}

pub async fn send_alert(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AlertRequest>,
) -> Result<Json<SentResponse>, ApiError> {
    state
        .service
        .send_alert(&request.workspace, &request.workflow, &request.message)
        .await?;

    Ok(Json(SentResponse { sent: true }))
}

#[derive(Deserialize)]
pub struct EventRequest {
    #[serde(flatten)]
    pub handler: HandlerConfig,
    pub event: Event,
}

/// Hand the event to a handler in the background and return immediately
pub async fn handle_event(
    State(state): State<Arc<AppState>>,
    Json(request): Json<EventRequest>,
) -> StatusCode {
    let EventRequest { handler, event } = request;
    let handler = state.service.handler(handler, [("alert", event.id.clone())]);

    tokio::spawn(async move {
        handler.handle(&event).await;
    });

    StatusCode::ACCEPTED
}

// ============================================================================
// Self Test
// ============================================================================

pub async fn test_options(State(state): State<Arc<AppState>>) -> Json<TestOptions> {
    Json(state.service.test_options())
}

/// Run a connectivity test; an empty body uses the canned options
pub async fn run_test(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<SentResponse>, ApiError> {
    let options: TestOptions = if body.is_empty() {
        state.service.test_options()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::BadRequest(format!("invalid test options: {}", e)))?
    };
    state.service.test(&options).await?;

    Ok(Json(SentResponse { sent: true }))
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Upstream(String),
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        let message = e.to_string();
        match e {
            ServiceError::Registry(RegistryError::Invalid(_)) | ServiceError::TypeMismatch(_) => {
                ApiError::BadRequest(message)
            }
            ServiceError::Registry(_) => ApiError::NotFound(message),
            ServiceError::Disabled => ApiError::Conflict(message),
            ServiceError::Transport(_) | ServiceError::UnexpectedStatus(_) => {
                ApiError::Upstream(message)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Upstream(msg) => (StatusCode::BAD_GATEWAY, msg),
        };

        let body = serde_json::json!({
            "error": message
        });

        (status, Json(body)).into_response()
    }
}
