//! Timer core module
//! 
//! This module contains the configuration resolver, the countdown engine and
//! the events the engine publishes.

pub mod engine;
pub mod events;
pub mod format;
pub mod resolver;

// Re-export main types
pub use engine::{TimerEngine, TimerSnapshot, POLL_INTERVAL};
pub use events::{EventSink, TimerEvent};
pub use format::{format_duration, DONE_LABEL};
pub use resolver::{
    preview, resolve, IntervalInput, IntervalUnit, Preview, RawInputs, TimerConfig, TotalInput,
    TotalPreset, TotalUnit, MAX_DOTS,
};
