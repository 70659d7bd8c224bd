//! Frame scheduling for the state machine.
//!
//! At most one physics step is pending at a time; the owner re-schedules it
//! after every step that leaves the projectile flying and cancels it on any
//! state exit. One-shot timers cover the retry and settle delays and are
//! advanced by the frame time handed to [`Scheduler::advance`].

use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerKind {
    /// Put the projectile back on the anchor after a miss.
    Retry,
    /// Start a fresh turn after a swap resolved.
    Settle,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Timer {
    kind: TimerKind,
    remaining: Duration,
}

#[derive(Clone, Debug, Default)]
pub struct Scheduler {
    step_pending: bool,
    timers: Vec<Timer>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule_step(&mut self) {
        self.step_pending = true;
    }

    pub fn cancel_step(&mut self) {
        self.step_pending = false;
    }

    pub fn step_pending(&self) -> bool {
        self.step_pending
    }

    /// Consume the pending step, if any.
    pub fn take_step(&mut self) -> bool {
        std::mem::take(&mut self.step_pending)
    }

    /// Arm a timer, replacing any armed timer of the same kind.
    pub fn arm(&mut self, kind: TimerKind, delay: Duration) {
        self.timers.retain(|t| t.kind != kind);
        self.timers.push(Timer { kind, remaining: delay });
    }

    pub fn is_armed(&self, kind: TimerKind) -> bool {
        self.timers.iter().any(|t| t.kind == kind)
    }

    /// Advance all timers by `dt` and return the ones that fired, in arm order.
    pub fn advance(&mut self, dt: Duration) -> Vec<TimerKind> {
        let mut fired = Vec::new();
        self.timers.retain_mut(|t| {
            t.remaining = t.remaining.saturating_sub(dt);
            if t.remaining.is_zero() {
                fired.push(t.kind);
                false
            } else {
                true
            }
        });
        fired
    }

    /// Teardown: drop the pending step and every timer.
    pub fn clear(&mut self) {
        self.step_pending = false;
        self.timers.clear();
    }
}
