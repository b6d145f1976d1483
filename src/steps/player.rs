use crate::steps::model::{StepDurations, StepKey, STEP_COUNT};
use std::time::Duration;
use tracing::{debug, info};

const LOG_TARGET: &str = "lectio_player::steps";

/// Outward contract of the step player.
pub trait StepObserver: Send {
    fn on_step_change(&mut self, step: StepKey);
    /// Fired once when the last step is left.
    fn on_complete(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepPhase {
    /// Counting down the current step.
    Running { remaining: Duration },
    /// Current step expired; `next` starts when the delay runs out.
    Transition { remaining: Duration, next: usize },
    Complete,
}

/// Timer-paced walk through the fixed steps. Time only moves through `tick`.
pub struct StepPlayer {
    durations: StepDurations,
    transition_delay: Duration,
    current: usize,
    phase: StepPhase,
    completed: [bool; STEP_COUNT],
    paused: bool,
    complete_notified: bool,
    observer: Box<dyn StepObserver>,
}

impl StepPlayer {
    /// Creates a player on the first step. Nothing is announced until [`StepPlayer::start`].
    pub fn new(durations: StepDurations, transition_delay: Duration, observer: Box<dyn StepObserver>) -> Self {
        Self {
            durations,
            transition_delay,
            current: 0,
            phase: StepPhase::Running { remaining: durations.for_step(StepKey::ALL[0]) },
            completed: [false; STEP_COUNT],
            paused: false,
            complete_notified: false,
            observer,
        }
    }

    pub fn start(&mut self) {
        self.enter(0);
    }

    pub fn current_step(&self) -> StepKey {
        StepKey::ALL[self.current]
    }

    pub fn phase(&self) -> StepPhase {
        self.phase
    }

    /// Countdown left on the current step; zero once it expired.
    pub fn remaining(&self) -> Duration {
        match self.phase {
            StepPhase::Running { remaining } => remaining,
            StepPhase::Transition { .. } | StepPhase::Complete => Duration::ZERO,
        }
    }

    pub fn is_completed(&self, step: StepKey) -> bool {
        self.completed[step.index()]
    }

    pub fn completed_steps(&self) -> Vec<StepKey> {
        StepKey::ALL.iter().copied().filter(|s| self.is_completed(*s)).collect()
    }

    pub fn is_complete(&self) -> bool {
        self.phase == StepPhase::Complete
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn pause(&mut self) {
        if !self.is_complete() {
            self.paused = true;
        }
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Advances the clock by `elapsed`. A paused or finished player ignores it.
    pub fn tick(&mut self, elapsed: Duration) {
        if self.paused {
            return;
        }
        match self.phase {
            StepPhase::Running { remaining } => {
                let remaining = remaining.saturating_sub(elapsed);
                if !remaining.is_zero() {
                    self.phase = StepPhase::Running { remaining };
                    return;
                }
                debug!(target: LOG_TARGET, step = %self.current_step(), "Countdown expired");
                self.mark_current_completed();
                match self.following() {
                    None => self.complete(),
                    Some(next) if self.transition_delay.is_zero() => self.enter(next),
                    Some(next) => self.phase = StepPhase::Transition { remaining: self.transition_delay, next },
                }
            }
            StepPhase::Transition { remaining, next } => {
                let remaining = remaining.saturating_sub(elapsed);
                if remaining.is_zero() {
                    self.enter(next);
                } else {
                    self.phase = StepPhase::Transition { remaining, next };
                }
            }
            StepPhase::Complete => {}
        }
    }

    /// Leaves the current step now, marking it completed.
    pub fn next(&mut self) {
        match self.phase {
            StepPhase::Complete => {}
            StepPhase::Transition { next, .. } => self.enter(next),
            StepPhase::Running { .. } => {
                self.mark_current_completed();
                match self.following() {
                    Some(next) => self.enter(next),
                    None => self.complete(),
                }
            }
        }
    }

    /// Back one step; the step being left is not marked completed.
    pub fn previous(&mut self) {
        if self.is_complete() || self.current == 0 {
            return;
        }
        self.enter(self.current - 1);
    }

    /// Back to the first step with every completion mark cleared.
    pub fn restart(&mut self) {
        info!(target: LOG_TARGET, "Restarting guided session");
        self.completed = [false; STEP_COUNT];
        self.complete_notified = false;
        self.paused = false;
        self.enter(0);
    }

    fn following(&self) -> Option<usize> {
        (self.current + 1 < STEP_COUNT).then_some(self.current + 1)
    }

    fn mark_current_completed(&mut self) {
        self.completed[self.current] = true;
    }

    fn enter(&mut self, index: usize) {
        self.current = index;
        let step = StepKey::ALL[index];
        self.phase = StepPhase::Running { remaining: self.durations.for_step(step) };
        debug!(target: LOG_TARGET, %step, "Entering step");
        self.observer.on_step_change(step);
    }

    fn complete(&mut self) {
        self.phase = StepPhase::Complete;
        self.paused = false;
        if !self.complete_notified {
            self.complete_notified = true;
            info!(target: LOG_TARGET, "Guided session complete");
            self.observer.on_complete();
        }
    }
}
