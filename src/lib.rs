//! Dot Timer - A wall-clock countdown timer rendered as a grid of interval dots
//! 
//! A total duration is split into fixed-length intervals, one dot each. The
//! timer engine derives progress from the wall clock and publishes events that
//! a renderer folds into the grid. Commands arrive over a small HTTP API.

pub mod config;
pub mod error;
pub mod timer;
pub mod state;
pub mod api;
pub mod services;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use error::{CommandError, ConfigError};
pub use state::AppState;
pub use timer::{TimerConfig, TimerEngine, TimerEvent};
pub use api::create_router;
pub use utils::signals::shutdown_signal;
