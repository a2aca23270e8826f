//! Dot Timer - A wall-clock countdown timer rendered as a grid of interval dots
//! 
//! This is the main entry point for the dot-timer application.

use std::sync::Arc;
use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

use dot_timer::{
    config::Config,
    state::AppState,
    api::create_router,
    services::TokioScheduler,
    tasks::{grid_renderer_task, tick_driver_task},
    timer::resolve,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("dot_timer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting dot-timer server v{}", env!("CARGO_PKG_VERSION"));

    let timer_config = resolve(&config.raw_inputs())
        .context("Invalid timer configuration")?;
    info!("Configuration: host={}, port={}, total={}s, interval={}s, dots={}",
          config.host, config.port, timer_config.total_seconds(),
          timer_config.interval_seconds(), timer_config.dot_count());

    // Create application state around a tokio-driven tick scheduler
    let (scheduler, tick_rx) = TokioScheduler::new();
    let state = Arc::new(AppState::new(
        config.port,
        config.host.clone(),
        timer_config,
        Box::new(scheduler),
    ));

    // Subscribe before any command can emit events
    let events = state.event_tx.subscribe();
    let renderer_state = Arc::clone(&state);
    let console = !config.quiet;
    tokio::spawn(async move {
        grid_renderer_task(renderer_state, events, console).await;
    });

    let tick_state = Arc::clone(&state);
    tokio::spawn(async move {
        tick_driver_task(tick_state, tick_rx).await;
    });

    if config.start {
        let outcome = state.start(None)?;
        info!("Timer started from command line: {} dots", outcome.snapshot().dot_count);
    }

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /preview    - Preview the grid for a set of inputs");
    info!("  POST /configure  - Validate inputs");
    info!("  POST /start      - Start the timer");
    info!("  POST /pause      - Pause or resume");
    info!("  POST /reset      - Reset to idle");
    info!("  GET  /status     - Current timer and grid");
    info!("  GET  /health     - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    if let Err(e) = state.reset() {
        tracing::warn!("Failed to stop timer on shutdown: {}", e);
    }
    info!("Server shutdown complete");
    Ok(())
}
