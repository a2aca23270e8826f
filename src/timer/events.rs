//! Events emitted by the timer engine to its renderer

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

use crate::state::Phase;

/// State delta published by the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TimerEvent {
    /// Remaining time text changed (or was re-sent on a poll)
    RemainingChanged { text: String },
    /// Number of finished intervals changed
    ProgressChanged { completed: u32, total: u32 },
    /// The dot that should carry the "current" indicator. `None` clears it.
    ActiveDotChanged { index: Option<u32> },
    PhaseChanged { phase: Phase },
}

/// Receiver of engine events
pub trait EventSink: Send {
    fn emit(&mut self, event: TimerEvent);
}

impl EventSink for broadcast::Sender<TimerEvent> {
    fn emit(&mut self, event: TimerEvent) {
        if let Err(e) = self.send(event) {
            debug!("No subscribers for timer event: {:?}", e.0);
        }
    }
}
