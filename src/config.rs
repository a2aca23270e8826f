//! Configuration and CLI argument handling

use clap::Parser;

use crate::timer::{IntervalInput, IntervalUnit, RawInputs, TotalInput, TotalPreset, TotalUnit};

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "dot-timer")]
#[command(about = "A countdown timer that splits a duration into a grid of interval dots")]
#[command(version = "1.0.0")]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Preset total duration
    #[arg(short, long, value_enum, default_value = "5m")]
    pub total: TotalPreset,

    /// Custom total duration, overrides the preset
    #[arg(long)]
    pub custom_total: Option<i64>,

    /// Unit of the custom total duration
    #[arg(long, value_enum, default_value = "minutes")]
    pub custom_unit: TotalUnit,

    /// Length of one interval (one dot)
    #[arg(short, long, default_value = "60", allow_negative_numbers = true)]
    pub interval: i64,

    /// Unit of the interval length
    #[arg(long, value_enum, default_value = "seconds")]
    pub interval_unit: IntervalUnit,

    /// Start the timer immediately
    #[arg(short, long)]
    pub start: bool,

    /// Do not print the grid to the console
    #[arg(short, long)]
    pub quiet: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Timer inputs described by the command line
    pub fn raw_inputs(&self) -> RawInputs {
        let total = match self.custom_total {
            Some(quantity) => TotalInput::Custom {
                quantity: Some(quantity),
                unit: self.custom_unit,
            },
            None => TotalInput::Preset { preset: self.total },
        };

        RawInputs {
            total,
            interval: IntervalInput {
                quantity: Some(self.interval),
                unit: self.interval_unit,
            },
        }
    }
}
