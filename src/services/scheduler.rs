//! Repeating tick scheduler

use std::{collections::HashMap, time::Duration};
use serde::Serialize;
use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{interval, MissedTickBehavior},
};
use tracing::debug;

/// Identifies one scheduled repeating tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TickHandle(u64);

impl TickHandle {
    pub fn from_raw(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Installs and cancels repeating ticks
pub trait Scheduler: Send {
    /// Start a repeating tick with the given period
    fn schedule(&mut self, period: Duration) -> TickHandle;

    /// Stop a tick. Cancelling an unknown handle does nothing.
    fn cancel(&mut self, handle: TickHandle);
}

/// Scheduler that runs each tick as a tokio interval task.
///
/// Every tick sends its handle down an mpsc channel; the receiving side
/// routes it back into the engine.
#[derive(Debug)]
pub struct TokioScheduler {
    tick_tx: mpsc::UnboundedSender<TickHandle>,
    tasks: HashMap<TickHandle, JoinHandle<()>>,
    next_id: u64,
}

impl TokioScheduler {
    /// Create a scheduler and the receiver its ticks are delivered on
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TickHandle>) {
        let (tick_tx, tick_rx) = mpsc::unbounded_channel();
        let scheduler = Self {
            tick_tx,
            tasks: HashMap::new(),
            next_id: 1,
        };
        (scheduler, tick_rx)
    }

    /// Number of tick tasks currently installed
    pub fn live_handles(&self) -> usize {
        self.tasks.len()
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&mut self, period: Duration) -> TickHandle {
        let handle = TickHandle(self.next_id);
        self.next_id += 1;

        let tick_tx = self.tick_tx.clone();
        let task = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                if tick_tx.send(handle).is_err() {
                    break;
                }
            }
        });

        debug!("Scheduled tick {:?} every {:?}", handle, period);
        self.tasks.insert(handle, task);
        handle
    }

    fn cancel(&mut self, handle: TickHandle) {
        if let Some(task) = self.tasks.remove(&handle) {
            task.abort();
            debug!("Cancelled tick {:?}", handle);
        }
    }
}
