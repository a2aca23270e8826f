//! Dot grid model maintained from timer events

use serde::Serialize;

use crate::timer::{TimerEvent, TimerSnapshot};
use super::Phase;

/// Visual state of one dot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DotState {
    Pending,
    Active,
    Done,
}

impl DotState {
    pub fn glyph(&self) -> char {
        match self {
            DotState::Pending => '○',
            DotState::Active => '◉',
            DotState::Done => '●',
        }
    }
}

/// Renderer-side view of the timer: one cell per interval plus the
/// remaining-time text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DotGrid {
    pub cells: Vec<DotState>,
    pub remaining: String,
    pub phase: Phase,
}

impl DotGrid {
    /// Create a grid of pending dots
    pub fn new(dot_count: u32, remaining: String) -> Self {
        Self {
            cells: vec![DotState::Pending; dot_count as usize],
            remaining,
            phase: Phase::Idle,
        }
    }

    /// Rebuild the grid from an engine snapshot
    pub fn from_snapshot(snapshot: &TimerSnapshot) -> Self {
        let mut grid = Self::new(snapshot.dot_count, snapshot.remaining_text.clone());
        grid.phase = snapshot.phase;
        grid.mark_done(snapshot.completed_intervals);
        grid.mark_active(snapshot.active_index);
        grid
    }

    /// Fold one engine event into the grid
    pub fn apply(&mut self, event: &TimerEvent) {
        match event {
            TimerEvent::RemainingChanged { text } => {
                self.remaining = text.clone();
            }
            TimerEvent::ProgressChanged { completed, total } => {
                if self.cells.len() != *total as usize {
                    self.cells = vec![DotState::Pending; *total as usize];
                }
                self.mark_done(*completed);
            }
            TimerEvent::ActiveDotChanged { index } => {
                self.mark_active(*index);
            }
            TimerEvent::PhaseChanged { phase } => {
                self.phase = *phase;
                if *phase == Phase::Completed {
                    self.mark_active(None);
                }
            }
        }
    }

    pub fn dot_count(&self) -> usize {
        self.cells.len()
    }

    pub fn done_count(&self) -> usize {
        self.cells.iter().filter(|c| **c == DotState::Done).count()
    }

    pub fn active_index(&self) -> Option<usize> {
        self.cells.iter().position(|c| *c == DotState::Active)
    }

    /// Tooltip-style label for a cell, e.g. `Interval 2/5`
    pub fn cell_label(&self, index: usize) -> Option<String> {
        (index < self.cells.len())
            .then(|| format!("Interval {}/{}", index + 1, self.cells.len()))
    }

    /// One-line text rendering: remaining time followed by the dots
    pub fn render_line(&self) -> String {
        let dots: String = self.cells.iter().map(DotState::glyph).collect();
        format!("{} {}", self.remaining, dots)
    }

    fn mark_done(&mut self, completed: u32) {
        for (i, cell) in self.cells.iter_mut().enumerate() {
            if i < completed as usize {
                *cell = DotState::Done;
            } else if *cell == DotState::Done {
                *cell = DotState::Pending;
            }
        }
    }

    /// A done dot never shows the active indicator
    fn mark_active(&mut self, index: Option<u32>) {
        let target = index.map(|i| i as usize);
        for (i, cell) in self.cells.iter_mut().enumerate() {
            if Some(i) == target && *cell != DotState::Done {
                *cell = DotState::Active;
            } else if *cell == DotState::Active {
                *cell = DotState::Pending;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progress(completed: u32, total: u32) -> TimerEvent {
        TimerEvent::ProgressChanged { completed, total }
    }

    fn active(index: u32) -> TimerEvent {
        TimerEvent::ActiveDotChanged { index: Some(index) }
    }

    #[test]
    fn progress_marks_leading_dots_done() {
        let mut grid = DotGrid::new(5, "05:00".to_string());
        grid.apply(&progress(2, 5));
        grid.apply(&active(2));

        assert_eq!(
            grid.cells,
            vec![
                DotState::Done,
                DotState::Done,
                DotState::Active,
                DotState::Pending,
                DotState::Pending
            ]
        );
        assert_eq!(grid.active_index(), Some(2));
    }

    #[test]
    fn active_moves_forward() {
        let mut grid = DotGrid::new(3, String::new());
        grid.apply(&progress(0, 3));
        grid.apply(&active(0));
        grid.apply(&progress(1, 3));
        grid.apply(&active(1));

        assert_eq!(grid.active_index(), Some(1));
        assert_eq!(grid.done_count(), 1);
    }

    #[test]
    fn done_dot_is_never_active() {
        let mut grid = DotGrid::new(4, String::new());
        grid.apply(&progress(4, 4));
        grid.apply(&active(3));

        assert_eq!(grid.active_index(), None);
        assert_eq!(grid.done_count(), 4);
    }

    #[test]
    fn completion_clears_active_indicator() {
        let mut grid = DotGrid::new(2, String::new());
        grid.apply(&active(1));
        grid.apply(&TimerEvent::PhaseChanged { phase: Phase::Completed });

        assert_eq!(grid.active_index(), None);
        assert_eq!(grid.phase, Phase::Completed);
    }

    #[test]
    fn progress_with_new_total_resizes() {
        let mut grid = DotGrid::new(5, String::new());
        grid.apply(&progress(1, 8));
        assert_eq!(grid.dot_count(), 8);
        assert_eq!(grid.done_count(), 1);
    }

    #[test]
    fn progress_back_to_zero_clears_done() {
        let mut grid = DotGrid::new(3, String::new());
        grid.apply(&progress(3, 3));
        grid.apply(&progress(0, 3));
        assert_eq!(grid.done_count(), 0);
    }

    fn snapshot(phase: Phase, dots: u32, completed: u32, active: Option<u32>) -> TimerSnapshot {
        TimerSnapshot {
            phase,
            total_seconds: i64::from(dots) * 60,
            interval_seconds: 60,
            dot_count: dots,
            elapsed_seconds: i64::from(completed) * 60,
            remaining_seconds: i64::from(dots - completed) * 60,
            remaining_text: "00:00".to_string(),
            completed_intervals: completed,
            active_index: active,
        }
    }

    #[test]
    fn rebuilds_running_grid_from_snapshot() {
        let grid = DotGrid::from_snapshot(&snapshot(Phase::Running, 5, 2, Some(2)));
        assert_eq!(grid.phase, Phase::Running);
        assert_eq!(grid.dot_count(), 5);
        assert_eq!(grid.done_count(), 2);
        assert_eq!(grid.active_index(), Some(2));
    }

    #[test]
    fn rebuilds_paused_grid_from_snapshot() {
        let grid = DotGrid::from_snapshot(&snapshot(Phase::Paused, 4, 1, Some(1)));
        assert_eq!(grid.phase, Phase::Paused);
        assert_eq!(grid.done_count(), 1);
        assert_eq!(grid.active_index(), Some(1));

        // Paused with the whole duration elapsed: every dot is done
        let grid = DotGrid::from_snapshot(&snapshot(Phase::Paused, 2, 2, Some(1)));
        assert_eq!(grid.done_count(), 2);
        assert_eq!(grid.active_index(), None);
    }

    #[test]
    fn rebuilds_completed_grid_from_snapshot() {
        let mut completed = snapshot(Phase::Completed, 3, 3, None);
        completed.remaining_text = "Done".to_string();

        let grid = DotGrid::from_snapshot(&completed);
        assert_eq!(grid.phase, Phase::Completed);
        assert_eq!(grid.done_count(), 3);
        assert_eq!(grid.active_index(), None);
        assert_eq!(grid.render_line(), "Done ●●●");
    }

    #[test]
    fn renders_line_and_labels() {
        let mut grid = DotGrid::new(3, String::new());
        grid.apply(&TimerEvent::RemainingChanged { text: "01:30".to_string() });
        grid.apply(&progress(1, 3));
        grid.apply(&active(1));

        assert_eq!(grid.render_line(), "01:30 ●◉○");
        assert_eq!(grid.cell_label(0).as_deref(), Some("Interval 1/3"));
        assert_eq!(grid.cell_label(3), None);
    }
}
