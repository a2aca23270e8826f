//! Wall-clock provider

use chrono::Utc;

/// Source of the current time in whole seconds since the Unix epoch.
///
/// Readings are expected to be non-decreasing.
pub trait Clock: Send {
    fn now(&self) -> i64;
}

/// Clock backed by the system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        Utc::now().timestamp()
    }
}
