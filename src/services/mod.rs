//! External collaborators module
//! 
//! This module contains the wall-clock provider and the repeating tick
//! scheduler the timer engine is driven by.

pub mod clock;
pub mod scheduler;

// Re-export main types
pub use clock::{Clock, SystemClock};
pub use scheduler::{Scheduler, TickHandle, TokioScheduler};
