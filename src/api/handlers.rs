//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    body::Bytes,
    extract::State,
    response::Json,
};
use chrono::Utc;
use tracing::{error, info, warn};

use crate::{
    error::CommandError,
    state::{AppState, Phase, StartOutcome},
    timer::RawInputs,
};
use super::responses::{
    ApiResponse, ConfigResponse, HealthResponse, PreviewResponse, StatusResponse,
};

/// Parse a JSON body of raw inputs; an empty body means "no inputs"
fn parse_inputs(body: &Bytes) -> Result<Option<RawInputs>, CommandError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(body)
        .map(Some)
        .map_err(|e| CommandError::InvalidRequest(e.to_string()))
}

/// Parse a JSON body of raw inputs, falling back to defaults when empty
fn parse_inputs_or_default(body: &Bytes) -> Result<RawInputs, CommandError> {
    Ok(parse_inputs(body)?.unwrap_or_default())
}

/// Handle POST /preview - Describe the grid a set of inputs would produce
pub async fn preview_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<PreviewResponse>, CommandError> {
    let raw = parse_inputs_or_default(&body)?;
    Ok(Json(PreviewResponse {
        timestamp: Utc::now(),
        preview: state.preview(&raw),
    }))
}

/// Handle POST /configure - Validate inputs without starting
pub async fn configure_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<ConfigResponse>, CommandError> {
    let raw = parse_inputs_or_default(&body)?;
    let config = state.configure(&raw)?;
    Ok(Json(ConfigResponse::ok(config)))
}

/// Handle POST /start - Start a run with the given or current configuration
pub async fn start_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<ApiResponse>, CommandError> {
    let raw = parse_inputs(&body)?;
    match state.start(raw.as_ref()) {
        Ok(StartOutcome::Started(snapshot)) => {
            info!("Start endpoint called - {} dots", snapshot.dot_count);
            Ok(Json(ApiResponse::new("Timer running".to_string(), snapshot)))
        }
        Ok(StartOutcome::AlreadyRunning(snapshot)) => {
            info!("Start endpoint called - timer already running, request ignored");
            Ok(Json(ApiResponse::new("Timer already running".to_string(), snapshot)))
        }
        Err(e) => {
            warn!("Failed to start timer: {}", e);
            Err(e)
        }
    }
}

/// Handle POST /pause - Pause a running timer or resume a paused one
pub async fn pause_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse>, CommandError> {
    match state.pause_or_resume() {
        Ok(snapshot) => {
            let message = match snapshot.phase {
                Phase::Paused => "Timer paused",
                Phase::Running => "Timer resumed",
                Phase::Idle => "Timer has not been started",
                Phase::Completed => "Timer already completed",
            };
            info!("Pause endpoint called - {}", message);
            Ok(Json(ApiResponse::new(message.to_string(), snapshot)))
        }
        Err(e) => {
            error!("Failed to toggle pause: {}", e);
            Err(e)
        }
    }
}

/// Handle POST /reset - Return the timer to idle
pub async fn reset_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse>, CommandError> {
    match state.reset() {
        Ok(snapshot) => {
            info!("Reset endpoint called - timer idle");
            Ok(Json(ApiResponse::new("Timer reset".to_string(), snapshot)))
        }
        Err(e) => {
            error!("Failed to reset timer: {}", e);
            Err(e)
        }
    }
}

/// Handle GET /status - Return current timer status and grid
pub async fn status_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatusResponse>, CommandError> {
    let timer = match state.get_snapshot() {
        Ok(t) => t,
        Err(e) => {
            error!("Failed to get timer snapshot: {}", e);
            return Err(e);
        }
    };

    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        timer,
        grid: state.get_grid(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
