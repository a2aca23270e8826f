//! Tick driver background task

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::{services::TickHandle, state::AppState};

/// Background task that routes scheduler ticks into the timer engine
pub async fn tick_driver_task(state: Arc<AppState>, mut tick_rx: mpsc::UnboundedReceiver<TickHandle>) {
    info!("Starting tick driver task");

    while let Some(handle) = tick_rx.recv().await {
        if let Err(e) = state.tick(handle) {
            error!("Failed to deliver tick {:?}: {}", handle, e);
        }
    }

    info!("Tick channel closed, tick driver stopping");
}
