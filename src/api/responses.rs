//! API response structures

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    error::CommandError,
    state::DotGrid,
    timer::{Preview, TimerConfig, TimerSnapshot},
};

/// API response structure for timer command endpoints
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub timer: TimerSnapshot,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(message: String, timer: TimerSnapshot) -> Self {
        Self {
            status: "ok".to_string(),
            message,
            timestamp: Utc::now(),
            timer,
        }
    }
}

/// Response for a successfully resolved configuration
#[derive(Debug, Clone, Serialize)]
pub struct ConfigResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub config: TimerConfig,
}

impl ConfigResponse {
    pub fn ok(config: TimerConfig) -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            config,
        }
    }
}

/// Response for the input preview endpoint
#[derive(Debug, Clone, Serialize)]
pub struct PreviewResponse {
    pub timestamp: DateTime<Utc>,
    pub preview: Preview,
}

/// Error body returned for rejected commands
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub status: String,
    pub error: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    pub fn new(error: &str, message: String) -> Self {
        Self {
            status: "error".to_string(),
            error: error.to_string(),
            message,
            timestamp: Utc::now(),
        }
    }
}

impl IntoResponse for CommandError {
    fn into_response(self) -> Response {
        let (code, kind) = match &self {
            CommandError::Config(e) => (StatusCode::BAD_REQUEST, e.kind()),
            CommandError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
            CommandError::Lock(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        };
        (code, Json(ErrorResponse::new(kind, self.to_string()))).into_response()
    }
}

/// Status response with the engine snapshot and rendered grid
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub timer: TimerSnapshot,
    pub grid: DotGrid,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
