//! Configuration resolver: raw duration inputs to a validated timer configuration

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use super::format::format_duration;

/// Upper bound on the number of dots a grid may hold
pub const MAX_DOTS: u32 = 300;

/// Presets at or below this length suggest a one-minute interval
const SHORT_PRESET_SECONDS: i64 = 900;

/// Preset total durations offered to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum TotalPreset {
    #[serde(rename = "5m")]
    #[value(name = "5m")]
    FiveMinutes,
    #[serde(rename = "10m")]
    #[value(name = "10m")]
    TenMinutes,
    #[serde(rename = "15m")]
    #[value(name = "15m")]
    FifteenMinutes,
    #[serde(rename = "20m")]
    #[value(name = "20m")]
    TwentyMinutes,
    #[serde(rename = "25m")]
    #[value(name = "25m")]
    TwentyFiveMinutes,
    #[serde(rename = "30m")]
    #[value(name = "30m")]
    ThirtyMinutes,
    #[serde(rename = "45m")]
    #[value(name = "45m")]
    FortyFiveMinutes,
    #[serde(rename = "1h")]
    #[value(name = "1h")]
    OneHour,
    #[serde(rename = "2h")]
    #[value(name = "2h")]
    TwoHours,
}

impl TotalPreset {
    pub fn seconds(&self) -> i64 {
        match self {
            TotalPreset::FiveMinutes => 5 * 60,
            TotalPreset::TenMinutes => 10 * 60,
            TotalPreset::FifteenMinutes => 15 * 60,
            TotalPreset::TwentyMinutes => 20 * 60,
            TotalPreset::TwentyFiveMinutes => 25 * 60,
            TotalPreset::ThirtyMinutes => 30 * 60,
            TotalPreset::FortyFiveMinutes => 45 * 60,
            TotalPreset::OneHour => 3600,
            TotalPreset::TwoHours => 2 * 3600,
        }
    }

    /// Interval to pre-fill when this preset is picked, if any.
    ///
    /// Short presets default to one dot per minute.
    pub fn suggested_interval(&self) -> Option<IntervalInput> {
        if self.seconds() <= SHORT_PRESET_SECONDS {
            Some(IntervalInput {
                quantity: Some(60),
                unit: IntervalUnit::Seconds,
            })
        } else {
            None
        }
    }
}

/// Unit for a custom total duration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TotalUnit {
    Minutes,
    Hours,
}

/// Unit for the interval length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum IntervalUnit {
    Seconds,
    Minutes,
}

/// Total duration as entered: a preset or a custom quantity and unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TotalInput {
    Preset { preset: TotalPreset },
    Custom {
        #[serde(default)]
        quantity: Option<i64>,
        unit: TotalUnit,
    },
}

impl TotalInput {
    /// Total in seconds, with a custom quantity clamped to at least 1
    pub fn seconds(&self) -> i64 {
        match *self {
            TotalInput::Preset { preset } => preset.seconds(),
            TotalInput::Custom { quantity, unit } => {
                let qty = clamp_quantity(quantity);
                match unit {
                    TotalUnit::Minutes => qty.saturating_mul(60),
                    TotalUnit::Hours => qty.saturating_mul(3600),
                }
            }
        }
    }
}

impl Default for TotalInput {
    fn default() -> Self {
        TotalInput::Preset {
            preset: TotalPreset::FiveMinutes,
        }
    }
}

/// Interval length as entered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalInput {
    #[serde(default)]
    pub quantity: Option<i64>,
    pub unit: IntervalUnit,
}

impl IntervalInput {
    /// Interval in seconds, with the quantity clamped to at least 1
    pub fn seconds(&self) -> i64 {
        let qty = clamp_quantity(self.quantity);
        match self.unit {
            IntervalUnit::Seconds => qty,
            IntervalUnit::Minutes => qty.saturating_mul(60),
        }
    }
}

impl Default for IntervalInput {
    fn default() -> Self {
        Self {
            quantity: Some(60),
            unit: IntervalUnit::Seconds,
        }
    }
}

/// Raw user inputs for one timer run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawInputs {
    #[serde(default)]
    pub total: TotalInput,
    #[serde(default)]
    pub interval: IntervalInput,
}

/// Validated timer parameters, immutable for the duration of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimerConfig {
    total_seconds: i64,
    interval_seconds: i64,
    dot_count: u32,
}

impl TimerConfig {
    /// Validate a total/interval pair given in seconds
    pub fn new(total_seconds: i64, interval_seconds: i64) -> Result<Self, ConfigError> {
        if total_seconds <= 0 {
            return Err(ConfigError::InvalidTotal);
        }
        if interval_seconds <= 0 {
            return Err(ConfigError::InvalidInterval);
        }
        if interval_seconds > total_seconds {
            return Err(ConfigError::IntervalExceedsTotal);
        }

        let dots = div_ceil(total_seconds, interval_seconds);
        if dots > i64::from(MAX_DOTS) {
            return Err(ConfigError::TooManyIntervals);
        }

        Ok(Self {
            total_seconds,
            interval_seconds,
            dot_count: dots as u32,
        })
    }

    pub fn total_seconds(&self) -> i64 {
        self.total_seconds
    }

    pub fn interval_seconds(&self) -> i64 {
        self.interval_seconds
    }

    pub fn dot_count(&self) -> u32 {
        self.dot_count
    }
}

/// Non-committing summary of what a set of inputs would produce
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Preview {
    pub total_seconds: i64,
    pub interval_seconds: i64,
    pub dot_count: i64,
    pub total_label: String,
    pub interval_label: String,
    pub summary: String,
    pub suggested_interval: Option<IntervalInput>,
}

/// Resolve raw inputs into a validated configuration
pub fn resolve(raw: &RawInputs) -> Result<TimerConfig, ConfigError> {
    TimerConfig::new(raw.total.seconds(), raw.interval.seconds())
}

/// Compute dot count and labels for display without validating.
///
/// Safe to call on every input change; never fails.
pub fn preview(raw: &RawInputs) -> Preview {
    let total_seconds = raw.total.seconds();
    let interval_seconds = raw.interval.seconds();
    let dot_count = div_ceil(total_seconds, interval_seconds);
    let total_label = format_duration(total_seconds);
    let interval_label = format_duration(interval_seconds);

    let suggested_interval = match raw.total {
        TotalInput::Preset { preset } => preset.suggested_interval(),
        TotalInput::Custom { .. } => None,
    };

    Preview {
        summary: format!("{} dots of {} for {}", dot_count, interval_label, total_label),
        total_seconds,
        interval_seconds,
        dot_count,
        total_label,
        interval_label,
        suggested_interval,
    }
}

fn clamp_quantity(quantity: Option<i64>) -> i64 {
    quantity.unwrap_or(0).max(1)
}

/// Ceiling division for a non-negative numerator and positive divisor
fn div_ceil(numerator: i64, divisor: i64) -> i64 {
    numerator / divisor + i64::from(numerator % divisor != 0)
}
