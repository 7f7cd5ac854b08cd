pub mod activity;
pub mod auth;
pub mod notifications;
pub mod pages;
pub mod registrations;
pub mod rooms;
pub mod students;
pub mod tenants;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::access::AccessError;
use crate::models::NewActivity;
use crate::tenancy::SlugError;

/// Shared limit query for log listings.
/// Default limit=100, max 1000.
#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    #[serde(default = "default_limit")]
    pub limit: i32,
}

impl LimitQuery {
    pub fn sanitize(&self) -> i32 {
        self.limit.clamp(1, 1000)
    }
}

fn default_limit() -> i32 {
    100
}

/// Error response body: `{"error": "message"}`, plus a stable code where
/// clients need to branch on the failure kind
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: None,
        }
    }
}

/// API error type
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    code: Option<&'static str>,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            code: None,
        }
    }

    pub fn with_code(mut self, code: &'static str) -> Self {
        self.code = Some(code);
        self
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }

    pub fn not_found(resource: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, format!("{} not found", resource))
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, msg)
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, msg)
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, msg)
    }

    pub fn too_many_requests(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::TOO_MANY_REQUESTS, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
                code: self.code,
            }),
        )
            .into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        // Check for typed errors first (no fragile string matching)
        if let Some(nf) = err.downcast_ref::<crate::db::NotFoundError>() {
            return Self::not_found(&nf.resource);
        }
        if let Some(c) = err.downcast_ref::<crate::db::ConflictError>() {
            return Self::conflict(c.message.clone());
        }
        tracing::error!("Internal error: {:#}", err);
        Self::internal("internal server error")
    }
}

/// Unknown email and wrong password share one status, message and code
impl From<AccessError> for ApiError {
    fn from(err: AccessError) -> Self {
        let message = err.to_string();
        match err {
            AccessError::InvalidCredentials => Self::unauthorized(message).with_code("invalid_credentials"),
            AccessError::TenantNotFound => Self::new(StatusCode::NOT_FOUND, message).with_code("tenant_not_found"),
            AccessError::TenantSuspended => Self::forbidden(message).with_code("tenant_suspended"),
            AccessError::TenantMismatch => Self::forbidden(message).with_code("tenant_mismatch"),
            AccessError::RateLimited => Self::too_many_requests(message).with_code("rate_limited"),
            AccessError::Internal(e) => Self::from(e),
        }
    }
}

impl From<SlugError> for ApiError {
    fn from(err: SlugError) -> Self {
        Self::bad_request(err.to_string()).with_code("invalid_subdomain")
    }
}

/// Message response for simple status messages
#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(msg: impl Into<String>) -> Json<Self> {
        Json(Self { message: msg.into() })
    }
}

/// Response helper: return 201 Created with JSON body
pub fn created<T: Serialize>(item: T) -> (StatusCode, Json<T>) {
    (StatusCode::CREATED, Json(item))
}

/// Healthcheck endpoint: returns 200 OK with status
pub async fn healthcheck() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "hostel-gateway",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Helper to write an activity entry with error logging; audit failures
/// never fail the request
pub async fn record_activity(state: &std::sync::Arc<crate::AppState>, entry: NewActivity) {
    if let Err(e) = state.store.log_activity(&entry).await {
        tracing::warn!("Failed to record activity {}: {}", entry.action, e);
    }
}
