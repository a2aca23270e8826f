//! Grid renderer background task

use std::sync::Arc;
use chrono::Local;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, error, info, warn};

use crate::{
    state::{AppState, DotGrid},
    timer::TimerEvent,
};

/// Background task that folds engine events into the dot grid.
///
/// The grid is published on the state's watch channel after every event.
/// With `console` set, a line is printed whenever the rendered text changes.
pub async fn grid_renderer_task(
    state: Arc<AppState>,
    mut events: broadcast::Receiver<TimerEvent>,
    console: bool,
) {
    info!("Starting grid renderer task");

    let mut grid = state.get_grid();
    let mut last_line = String::new();
    if console {
        print_line(&grid, &mut last_line);
    }

    loop {
        match events.recv().await {
            Ok(event) => {
                debug!("Renderer received event: {:?}", event);
                grid.apply(&event);
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!("Renderer lagged by {} events, resyncing from engine", skipped);
                match state.get_snapshot() {
                    Ok(snapshot) => grid = DotGrid::from_snapshot(&snapshot),
                    Err(e) => {
                        error!("Failed to resync grid: {}", e);
                        continue;
                    }
                }
            }
            Err(RecvError::Closed) => {
                info!("Event channel closed, grid renderer stopping");
                break;
            }
        }

        if console {
            print_line(&grid, &mut last_line);
        }
        state.publish_grid(grid.clone());
    }
}

fn print_line(grid: &DotGrid, last_line: &mut String) {
    let line = grid.render_line();
    if line != *last_line {
        println!("[{}] {}", Local::now().format("%H:%M:%S"), line);
        *last_line = line;
    }
}
