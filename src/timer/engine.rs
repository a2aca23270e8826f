//! Timer engine: the wall-clock countdown state machine
//!
//! Elapsed and remaining time are always derived from `now - start_epoch`,
//! never from counting ticks, so poll jitter or a suspended process cannot
//! make the timer drift.
//!
//! ```text
//! Idle -> Running <-> Paused
//!            |
//!            v
//!        Completed          (reset returns any phase to Idle)
//! ```

use std::time::Duration;
use serde::Serialize;
use tracing::{debug, info};

use crate::{
    services::{Clock, Scheduler, TickHandle},
    state::{Phase, TimerState},
};
use super::{
    events::{EventSink, TimerEvent},
    format::{format_duration, DONE_LABEL},
    resolver::TimerConfig,
};

/// Cadence at which a running timer samples the clock
pub const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Point-in-time view of the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimerSnapshot {
    pub phase: Phase,
    pub total_seconds: i64,
    pub interval_seconds: i64,
    pub dot_count: u32,
    pub elapsed_seconds: i64,
    pub remaining_seconds: i64,
    pub remaining_text: String,
    pub completed_intervals: u32,
    pub active_index: Option<u32>,
}

/// Countdown state machine driven by a clock and a repeating tick
pub struct TimerEngine {
    config: TimerConfig,
    state: TimerState,
    poll: Option<TickHandle>,
    clock: Box<dyn Clock>,
    scheduler: Box<dyn Scheduler>,
    sink: Box<dyn EventSink>,
}

impl TimerEngine {
    /// Create an idle engine showing the given configuration
    pub fn new(
        config: TimerConfig,
        clock: Box<dyn Clock>,
        scheduler: Box<dyn Scheduler>,
        sink: Box<dyn EventSink>,
    ) -> Self {
        Self {
            config,
            state: TimerState::new(),
            poll: None,
            clock,
            scheduler,
            sink,
        }
    }

    pub fn config(&self) -> &TimerConfig {
        &self.config
    }

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    /// Handle of the currently installed poll, if any
    pub fn poll_handle(&self) -> Option<TickHandle> {
        self.poll
    }

    /// Begin a fresh run with `config`.
    ///
    /// Ignored while already running. Returns whether a run was started.
    pub fn start(&mut self, config: TimerConfig) -> bool {
        if self.state.is_running() {
            debug!("Start ignored, timer already running");
            return false;
        }

        self.cancel_poll();
        self.config = config;
        let now = self.clock.now();
        self.state = TimerState::started(now);

        info!(
            "Timer started: total={}s interval={}s dots={}",
            config.total_seconds(),
            config.interval_seconds(),
            config.dot_count()
        );
        self.emit(TimerEvent::PhaseChanged { phase: Phase::Running });
        self.install_poll();
        self.sample(now);
        true
    }

    /// Freeze elapsed time. Only valid while running.
    pub fn pause(&mut self) -> bool {
        if !self.state.is_running() {
            return false;
        }

        self.cancel_poll();
        let now = self.clock.now();
        let elapsed = self
            .state
            .elapsed_since_start(now)
            .min(self.config.total_seconds());
        self.state.paused_elapsed_seconds = elapsed;
        self.state.phase = Phase::Paused;

        info!("Timer paused at {}s elapsed", elapsed);
        self.emit(TimerEvent::PhaseChanged { phase: Phase::Paused });
        true
    }

    /// Continue a paused run from the banked elapsed time.
    ///
    /// Does nothing if the engine was never started or is not paused.
    pub fn resume(&mut self) -> bool {
        if self.state.start_epoch.is_none() {
            debug!("Resume ignored, timer never started");
            return false;
        }
        if self.state.phase != Phase::Paused {
            return false;
        }

        let now = self.clock.now();
        self.state.start_epoch = Some(now - self.state.paused_elapsed_seconds);
        self.state.phase = Phase::Running;

        info!("Timer resumed at {}s elapsed", self.state.paused_elapsed_seconds);
        self.emit(TimerEvent::PhaseChanged { phase: Phase::Running });
        self.install_poll();
        self.sample(now);
        true
    }

    /// Pause when running, resume when paused. Returns the resulting phase.
    pub fn pause_or_resume(&mut self) -> Phase {
        if self.state.is_running() {
            self.pause();
        } else {
            self.resume();
        }
        self.state.phase
    }

    /// Drop all run-state and return to idle. The configuration is kept.
    pub fn reset(&mut self) {
        self.cancel_poll();
        self.state = TimerState::new();

        info!("Timer reset");
        let total = self.config.dot_count();
        self.emit(TimerEvent::RemainingChanged {
            text: format_duration(self.config.total_seconds()),
        });
        self.emit(TimerEvent::ProgressChanged { completed: 0, total });
        self.emit(TimerEvent::ActiveDotChanged { index: None });
        self.emit(TimerEvent::PhaseChanged { phase: Phase::Idle });
    }

    /// Handle one scheduled tick. Ticks from a cancelled poll are dropped.
    pub fn tick(&mut self, handle: TickHandle) {
        if self.poll != Some(handle) {
            debug!("Dropping stale tick {:?}", handle);
            return;
        }
        if !self.state.is_running() {
            return;
        }

        let now = self.clock.now();
        self.sample(now);
    }

    /// Current view of the engine at the clock's present time
    pub fn snapshot(&self) -> TimerSnapshot {
        let total = self.config.total_seconds();
        let dots = self.config.dot_count();

        let elapsed = match self.state.phase {
            Phase::Idle => 0,
            Phase::Running => self.state.elapsed_since_start(self.clock.now()).min(total),
            Phase::Paused => self.state.paused_elapsed_seconds,
            Phase::Completed => total,
        };
        let remaining = (total - elapsed).max(0);
        let completed = self.completed_intervals(elapsed);

        let (remaining_text, active_index) = match self.state.phase {
            Phase::Idle => (format_duration(remaining), None),
            Phase::Completed => (DONE_LABEL.to_string(), None),
            // A done dot is never active
            Phase::Running | Phase::Paused => (
                format_duration(remaining),
                (completed < dots).then_some(completed),
            ),
        };

        TimerSnapshot {
            phase: self.state.phase,
            total_seconds: total,
            interval_seconds: self.config.interval_seconds(),
            dot_count: dots,
            elapsed_seconds: elapsed,
            remaining_seconds: remaining,
            remaining_text,
            completed_intervals: if self.state.phase == Phase::Completed { dots } else { completed },
            active_index,
        }
    }

    fn sample(&mut self, now: i64) {
        let total = self.config.total_seconds();
        let dots = self.config.dot_count();

        let elapsed = self.state.elapsed_since_start(now);
        let remaining = (total - elapsed).max(0);
        self.emit(TimerEvent::RemainingChanged {
            text: format_duration(remaining),
        });

        let completed = self.completed_intervals(elapsed);
        if self.state.last_completed_intervals != Some(completed) {
            debug!("Completed intervals: {}/{}", completed, dots);
            self.emit(TimerEvent::ProgressChanged { completed, total: dots });
            self.state.last_completed_intervals = Some(completed);
        }

        let active = completed.min(dots.saturating_sub(1));
        self.emit(TimerEvent::ActiveDotChanged { index: Some(active) });

        if remaining <= 0 {
            self.complete();
        }
    }

    fn complete(&mut self) {
        self.cancel_poll();
        let dots = self.config.dot_count();
        self.state.phase = Phase::Completed;
        self.state.paused_elapsed_seconds = self.config.total_seconds();
        self.state.last_completed_intervals = Some(dots);

        info!("Timer completed after {}s", self.config.total_seconds());
        self.emit(TimerEvent::ProgressChanged { completed: dots, total: dots });
        self.emit(TimerEvent::ActiveDotChanged { index: None });
        self.emit(TimerEvent::RemainingChanged {
            text: DONE_LABEL.to_string(),
        });
        self.emit(TimerEvent::PhaseChanged { phase: Phase::Completed });
    }

    /// Finished intervals for an elapsed time, clamped to the dot count
    fn completed_intervals(&self, elapsed: i64) -> u32 {
        let finished = (elapsed / self.config.interval_seconds()).max(0);
        finished.min(i64::from(self.config.dot_count())) as u32
    }

    fn install_poll(&mut self) {
        self.cancel_poll();
        self.poll = Some(self.scheduler.schedule(POLL_INTERVAL));
    }

    fn cancel_poll(&mut self) {
        if let Some(handle) = self.poll.take() {
            self.scheduler.cancel(handle);
        }
    }

    fn emit(&mut self, event: TimerEvent) {
        self.sink.emit(event);
    }
}

impl Drop for TimerEngine {
    fn drop(&mut self) {
        self.cancel_poll();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        collections::HashSet,
        sync::{
            atomic::{AtomicI64, Ordering},
            Arc, Mutex,
        },
    };

    const T0: i64 = 1_700_000_000;

    #[derive(Clone)]
    struct ManualClock(Arc<AtomicI64>);

    impl ManualClock {
        fn set(&self, now: i64) {
            self.0.store(now, Ordering::SeqCst);
        }

        fn advance(&self, seconds: i64) {
            self.0.fetch_add(seconds, Ordering::SeqCst);
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> i64 {
            self.0.load(Ordering::SeqCst)
        }
    }

    #[derive(Default)]
    struct SchedulerLog {
        live: HashSet<TickHandle>,
        next_id: u64,
        max_live: usize,
        scheduled: usize,
    }

    #[derive(Clone, Default)]
    struct FakeScheduler(Arc<Mutex<SchedulerLog>>);

    impl Scheduler for FakeScheduler {
        fn schedule(&mut self, _period: Duration) -> TickHandle {
            let mut log = self.0.lock().unwrap();
            log.next_id += 1;
            let handle = TickHandle::from_raw(log.next_id);
            log.live.insert(handle);
            log.scheduled += 1;
            log.max_live = log.max_live.max(log.live.len());
            handle
        }

        fn cancel(&mut self, handle: TickHandle) {
            self.0.lock().unwrap().live.remove(&handle);
        }
    }

    #[derive(Clone, Default)]
    struct RecordingSink(Arc<Mutex<Vec<TimerEvent>>>);

    impl RecordingSink {
        fn take(&self) -> Vec<TimerEvent> {
            std::mem::take(&mut *self.0.lock().unwrap())
        }
    }

    impl EventSink for RecordingSink {
        fn emit(&mut self, event: TimerEvent) {
            self.0.lock().unwrap().push(event);
        }
    }

    struct Harness {
        engine: TimerEngine,
        clock: ManualClock,
        scheduler: FakeScheduler,
        events: RecordingSink,
    }

    impl Harness {
        fn new(total: i64, interval: i64) -> Self {
            let clock = ManualClock(Arc::new(AtomicI64::new(T0)));
            let scheduler = FakeScheduler::default();
            let events = RecordingSink::default();
            let engine = TimerEngine::new(
                TimerConfig::new(total, interval).unwrap(),
                Box::new(clock.clone()),
                Box::new(scheduler.clone()),
                Box::new(events.clone()),
            );
            Self {
                engine,
                clock,
                scheduler,
                events,
            }
        }

        fn start(&mut self) {
            let config = *self.engine.config();
            assert!(self.engine.start(config));
        }

        fn tick(&mut self) {
            let handle = self.engine.poll_handle().expect("poll installed");
            self.engine.tick(handle);
        }

        fn live_handles(&self) -> usize {
            self.scheduler.0.lock().unwrap().live.len()
        }

        fn max_live_handles(&self) -> usize {
            self.scheduler.0.lock().unwrap().max_live
        }
    }

    #[test]
    fn start_emits_initial_sample() {
        let mut h = Harness::new(300, 60);
        h.start();

        assert_eq!(h.engine.phase(), Phase::Running);
        assert_eq!(
            h.events.take(),
            vec![
                TimerEvent::PhaseChanged { phase: Phase::Running },
                TimerEvent::RemainingChanged { text: "05:00".to_string() },
                TimerEvent::ProgressChanged { completed: 0, total: 5 },
                TimerEvent::ActiveDotChanged { index: Some(0) },
            ]
        );
        assert_eq!(h.live_handles(), 1);
    }

    #[test]
    fn progress_at_sixty_five_seconds() {
        let mut h = Harness::new(300, 60);
        h.start();
        h.events.take();

        h.clock.set(T0 + 65);
        h.tick();

        assert_eq!(
            h.events.take(),
            vec![
                TimerEvent::RemainingChanged { text: "03:55".to_string() },
                TimerEvent::ProgressChanged { completed: 1, total: 5 },
                TimerEvent::ActiveDotChanged { index: Some(1) },
            ]
        );

        let snapshot = h.engine.snapshot();
        assert_eq!(snapshot.completed_intervals, 1);
        assert_eq!(snapshot.active_index, Some(1));
        assert_eq!(snapshot.remaining_seconds, 235);
        assert_eq!(snapshot.remaining_text, "03:55");
    }

    #[test]
    fn unchanged_progress_is_not_re_emitted() {
        let mut h = Harness::new(300, 60);
        h.start();
        h.events.take();

        h.clock.advance(1);
        h.tick();
        let events = h.events.take();
        assert!(!events
            .iter()
            .any(|e| matches!(e, TimerEvent::ProgressChanged { .. })));
        assert!(events.contains(&TimerEvent::ActiveDotChanged { index: Some(0) }));
    }

    #[test]
    fn pause_freezes_elapsed_across_gap() {
        let mut h = Harness::new(300, 60);
        h.start();
        h.clock.set(T0 + 65);
        h.tick();

        assert!(h.engine.pause());
        assert_eq!(h.engine.phase(), Phase::Paused);
        assert_eq!(h.engine.state().paused_elapsed_seconds, 65);
        assert_eq!(h.live_handles(), 0);

        h.clock.advance(500);
        assert_eq!(h.engine.snapshot().elapsed_seconds, 65);

        assert!(h.engine.resume());
        assert_eq!(h.engine.snapshot().elapsed_seconds, 65);
        assert_eq!(h.engine.snapshot().remaining_text, "03:55");

        h.clock.advance(10);
        h.tick();
        assert_eq!(h.engine.snapshot().elapsed_seconds, 75);
    }

    #[test]
    fn pause_or_resume_toggles() {
        let mut h = Harness::new(300, 60);
        h.start();
        assert_eq!(h.engine.pause_or_resume(), Phase::Paused);
        assert_eq!(h.engine.pause_or_resume(), Phase::Running);
    }

    #[test]
    fn resume_without_start_is_ignored() {
        let mut h = Harness::new(300, 60);
        assert!(!h.engine.resume());
        assert_eq!(h.engine.pause_or_resume(), Phase::Idle);
        assert_eq!(h.engine.state(), &TimerState::new());
        assert!(h.events.take().is_empty());
        assert_eq!(h.live_handles(), 0);
    }

    #[test]
    fn run_to_completion() {
        let mut h = Harness::new(120, 30);
        h.start();
        for _ in 0..4 {
            h.clock.advance(30);
            if h.engine.phase() == Phase::Running {
                h.tick();
            }
        }

        assert_eq!(h.engine.phase(), Phase::Completed);
        assert_eq!(h.engine.poll_handle(), None);
        assert_eq!(h.live_handles(), 0);

        let snapshot = h.engine.snapshot();
        assert_eq!(snapshot.completed_intervals, 4);
        assert_eq!(snapshot.dot_count, 4);
        assert_eq!(snapshot.remaining_seconds, 0);
        assert_eq!(snapshot.remaining_text, DONE_LABEL);
        assert_eq!(snapshot.active_index, None);

        let events = h.events.take();
        let tail = &events[events.len() - 4..];
        assert_eq!(
            tail,
            &[
                TimerEvent::ProgressChanged { completed: 4, total: 4 },
                TimerEvent::ActiveDotChanged { index: None },
                TimerEvent::RemainingChanged { text: DONE_LABEL.to_string() },
                TimerEvent::PhaseChanged { phase: Phase::Completed },
            ]
        );
    }

    #[test]
    fn late_poll_completes_with_full_progress() {
        // Last dot is shorter than the interval: 100s split into 30s dots
        let mut h = Harness::new(100, 30);
        h.start();
        h.events.take();

        h.clock.advance(1_000);
        h.tick();

        assert_eq!(h.engine.phase(), Phase::Completed);
        let events = h.events.take();
        assert!(events.contains(&TimerEvent::RemainingChanged { text: "00:00".to_string() }));
        assert!(events.contains(&TimerEvent::ProgressChanged { completed: 4, total: 4 }));
    }

    #[test]
    fn reset_twice_is_identical() {
        let mut h = Harness::new(300, 60);
        h.start();
        h.clock.set(T0 + 65);
        h.tick();

        h.engine.reset();
        let first_state = h.engine.state().clone();
        let first_events = h.events.take();
        let first_events = first_events[first_events.len() - 4..].to_vec();

        h.engine.reset();
        assert_eq!(h.engine.state(), &first_state);
        assert_eq!(h.events.take(), first_events);

        assert_eq!(first_state, TimerState::new());
        assert_eq!(h.engine.phase(), Phase::Idle);
        assert_eq!(h.engine.config().dot_count(), 5);
        assert_eq!(h.live_handles(), 0);
        assert_eq!(
            first_events,
            vec![
                TimerEvent::RemainingChanged { text: "05:00".to_string() },
                TimerEvent::ProgressChanged { completed: 0, total: 5 },
                TimerEvent::ActiveDotChanged { index: None },
                TimerEvent::PhaseChanged { phase: Phase::Idle },
            ]
        );
    }

    #[test]
    fn resume_after_reset_is_ignored() {
        let mut h = Harness::new(300, 60);
        h.start();
        h.engine.pause();
        h.engine.reset();
        assert!(!h.engine.resume());
        assert_eq!(h.engine.phase(), Phase::Idle);
    }

    #[test]
    fn start_while_running_is_ignored() {
        let mut h = Harness::new(300, 60);
        h.start();
        let handle = h.engine.poll_handle();

        let other = TimerConfig::new(60, 10).unwrap();
        assert!(!h.engine.start(other));
        assert_eq!(h.engine.config().dot_count(), 5);
        assert_eq!(h.engine.poll_handle(), handle);
    }

    #[test]
    fn restart_after_completion_uses_new_config() {
        let mut h = Harness::new(60, 60);
        h.start();
        h.clock.advance(60);
        h.tick();
        assert_eq!(h.engine.phase(), Phase::Completed);

        assert!(h.engine.start(TimerConfig::new(120, 30).unwrap()));
        assert_eq!(h.engine.phase(), Phase::Running);
        assert_eq!(h.engine.snapshot().dot_count, 4);
        assert_eq!(h.engine.snapshot().elapsed_seconds, 0);
    }

    #[test]
    fn stale_tick_is_dropped() {
        let mut h = Harness::new(300, 60);
        h.start();
        let old = h.engine.poll_handle().unwrap();
        h.engine.pause();
        h.engine.resume();
        h.events.take();

        h.clock.advance(120);
        h.engine.tick(old);
        assert!(h.events.take().is_empty());
        assert_eq!(h.engine.state().last_completed_intervals, Some(0));
    }

    #[test]
    fn never_more_than_one_poll_handle() {
        let mut h = Harness::new(300, 60);
        h.start();
        for _ in 0..5 {
            h.engine.pause_or_resume();
            h.engine.pause_or_resume();
        }
        h.engine.reset();
        h.start();
        h.engine.reset();

        assert_eq!(h.max_live_handles(), 1);
        assert_eq!(h.live_handles(), 0);
        assert!(h.scheduler.0.lock().unwrap().scheduled > 1);
    }

    #[test]
    fn overrun_before_tick_has_no_active_dot() {
        let mut h = Harness::new(120, 30);
        h.start();
        h.clock.advance(200);

        let snapshot = h.engine.snapshot();
        assert_eq!(snapshot.phase, Phase::Running);
        assert_eq!(snapshot.completed_intervals, 4);
        assert_eq!(snapshot.active_index, None);
    }

    #[test]
    fn clock_going_backwards_clamps_elapsed() {
        let mut h = Harness::new(300, 60);
        h.start();
        h.clock.set(T0 - 30);
        h.tick();
        let snapshot = h.engine.snapshot();
        assert_eq!(snapshot.elapsed_seconds, 0);
        assert_eq!(snapshot.remaining_text, "05:00");
    }

    #[test]
    fn pause_after_overrun_banks_total() {
        let mut h = Harness::new(60, 30);
        h.start();
        h.clock.advance(90);
        assert!(h.engine.pause());
        assert_eq!(h.engine.state().paused_elapsed_seconds, 60);

        let snapshot = h.engine.snapshot();
        assert_eq!(snapshot.phase, Phase::Paused);
        assert_eq!(snapshot.completed_intervals, 2);
        assert_eq!(snapshot.active_index, None);

        h.engine.resume();
        assert_eq!(h.engine.phase(), Phase::Completed);
    }
}
