//! State management module
//! 
//! This module contains all state-related structures and their management logic.

pub mod app_state;
pub mod grid_state;
pub mod timer_state;

// Re-export main types
pub use app_state::{AppState, StartOutcome};
pub use grid_state::{DotGrid, DotState};
pub use timer_state::{Phase, TimerState};
