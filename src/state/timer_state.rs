//! Timer run-state structure and management

use serde::{Deserialize, Serialize};

/// Lifecycle phase of a timer run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Running,
    Paused,
    Completed,
}

/// Mutable run-state for a single timer session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerState {
    pub phase: Phase,
    /// Wall-clock second the current run segment began, shifted back by any
    /// time already banked so that `elapsed = now - start_epoch` always holds
    /// while running. `None` until the first start.
    pub start_epoch: Option<i64>,
    /// Elapsed seconds banked at the moment of pausing
    pub paused_elapsed_seconds: i64,
    /// Last completed-interval count sent to the renderer
    pub last_completed_intervals: Option<u32>,
}

impl TimerState {
    /// Create an idle state with nothing started
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            start_epoch: None,
            paused_elapsed_seconds: 0,
            last_completed_intervals: None,
        }
    }

    /// Create a running state whose segment starts at `now`
    pub fn started(now: i64) -> Self {
        Self {
            phase: Phase::Running,
            start_epoch: Some(now),
            paused_elapsed_seconds: 0,
            last_completed_intervals: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    /// Seconds since the (adjusted) start, never negative
    pub fn elapsed_since_start(&self, now: i64) -> i64 {
        self.start_epoch
            .map(|start| now.saturating_sub(start).max(0))
            .unwrap_or(0)
    }
}

impl Default for TimerState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_is_zero_before_start() {
        assert_eq!(TimerState::new().elapsed_since_start(1_000), 0);
    }

    #[test]
    fn elapsed_never_negative() {
        let state = TimerState::started(1_000);
        assert_eq!(state.elapsed_since_start(990), 0);
        assert_eq!(state.elapsed_since_start(1_065), 65);
    }
}
