//! Main application state management

use std::{
    sync::{Arc, Mutex},
    time::Instant,
};
use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, watch};
use tracing::{info, warn};

use crate::{
    error::{CommandError, ConfigError},
    services::{Clock, Scheduler, SystemClock, TickHandle},
    timer::{self, format_duration, Preview, RawInputs, TimerConfig, TimerEngine, TimerEvent, TimerSnapshot},
};
use super::{DotGrid, Phase};

/// Result of a start command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    /// A fresh run began with the resolved configuration
    Started(TimerSnapshot),
    /// A run was already in progress and was left untouched
    AlreadyRunning(TimerSnapshot),
}

impl StartOutcome {
    pub fn snapshot(&self) -> &TimerSnapshot {
        match self {
            StartOutcome::Started(snapshot) | StartOutcome::AlreadyRunning(snapshot) => snapshot,
        }
    }

    pub fn started(&self) -> bool {
        matches!(self, StartOutcome::Started(_))
    }
}

/// Main application state that owns the timer engine and its channels
pub struct AppState {
    /// The single timer engine; every mutation happens under this lock
    pub engine: Arc<Mutex<TimerEngine>>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
    /// Engine events, consumed by the grid renderer
    pub event_tx: broadcast::Sender<TimerEvent>,
    /// Latest rendered grid
    pub grid_tx: watch::Sender<DotGrid>,
    /// Keep the receiver alive to prevent channel closure
    pub _grid_rx: watch::Receiver<DotGrid>,
}

impl AppState {
    /// Create a new AppState reading the system clock
    pub fn new(port: u16, host: String, config: TimerConfig, scheduler: Box<dyn Scheduler>) -> Self {
        Self::with_clock(port, host, config, Box::new(SystemClock), scheduler)
    }

    /// Create a new AppState with an explicit clock
    pub fn with_clock(
        port: u16,
        host: String,
        config: TimerConfig,
        clock: Box<dyn Clock>,
        scheduler: Box<dyn Scheduler>,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(256);
        let grid = DotGrid::new(config.dot_count(), format_duration(config.total_seconds()));
        let (grid_tx, grid_rx) = watch::channel(grid);
        let engine = TimerEngine::new(config, clock, scheduler, Box::new(event_tx.clone()));

        Self {
            engine: Arc::new(Mutex::new(engine)),
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
            event_tx,
            grid_tx,
            _grid_rx: grid_rx,
        }
    }

    /// Run a closure against the locked engine
    fn with_engine<T, F>(&self, f: F) -> Result<T, CommandError>
    where
        F: FnOnce(&mut TimerEngine) -> T,
    {
        let mut engine = self.engine.lock()
            .map_err(|e| CommandError::Lock(format!("timer engine: {}", e)))?;
        Ok(f(&mut *engine))
    }

    fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Validate raw inputs without touching the engine
    pub fn configure(&self, raw: &RawInputs) -> Result<TimerConfig, ConfigError> {
        let result = timer::resolve(raw);
        match &result {
            Ok(config) => info!(
                "Configuration resolved: total={}s interval={}s dots={}",
                config.total_seconds(),
                config.interval_seconds(),
                config.dot_count()
            ),
            Err(e) => warn!("Configuration rejected: {}", e),
        }
        result
    }

    /// Describe what a set of inputs would produce
    pub fn preview(&self, raw: &RawInputs) -> Preview {
        timer::preview(raw)
    }

    /// Start a run, resolving `raw` first when given or reusing the current
    /// configuration otherwise. A running timer keeps its current run.
    pub fn start(&self, raw: Option<&RawInputs>) -> Result<StartOutcome, CommandError> {
        let config = match raw {
            Some(raw) => Some(self.configure(raw)?),
            None => None,
        };

        let outcome = self.with_engine(|engine| {
            let config = config.unwrap_or(*engine.config());
            if engine.start(config) {
                StartOutcome::Started(engine.snapshot())
            } else {
                info!("Start requested while running, keeping current run");
                StartOutcome::AlreadyRunning(engine.snapshot())
            }
        })?;

        if outcome.started() {
            self.record_action("start");
        }
        Ok(outcome)
    }

    /// Toggle between paused and running
    pub fn pause_or_resume(&self) -> Result<TimerSnapshot, CommandError> {
        let snapshot = self.with_engine(|engine| {
            engine.pause_or_resume();
            engine.snapshot()
        })?;

        self.record_action(match snapshot.phase {
            Phase::Paused => "pause",
            Phase::Running => "resume",
            Phase::Idle | Phase::Completed => "pause-or-resume",
        });
        Ok(snapshot)
    }

    /// Return the timer to idle
    pub fn reset(&self) -> Result<TimerSnapshot, CommandError> {
        let snapshot = self.with_engine(|engine| {
            engine.reset();
            engine.snapshot()
        })?;

        self.record_action("reset");
        Ok(snapshot)
    }

    /// Deliver a scheduler tick to the engine
    pub fn tick(&self, handle: TickHandle) -> Result<(), CommandError> {
        self.with_engine(|engine| engine.tick(handle))
    }

    /// Get current engine snapshot
    pub fn get_snapshot(&self) -> Result<TimerSnapshot, CommandError> {
        self.with_engine(|engine| engine.snapshot())
    }

    /// Get the most recently rendered grid
    pub fn get_grid(&self) -> DotGrid {
        self.grid_tx.borrow().clone()
    }

    /// Publish a freshly rendered grid
    pub fn publish_grid(&self, grid: DotGrid) {
        if let Err(e) = self.grid_tx.send(grid) {
            warn!("Failed to publish grid update: {}", e);
        }
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}
