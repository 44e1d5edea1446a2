use std::time::Duration;
use tokio::time::Instant;

/// Represents the state of a timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    /// Never started, stopped, or expired.
    Idle,
    /// Counting down.
    Running,
    /// Active but frozen until resumed.
    Paused,
}

/// Diagnostic statistics for a timer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimerStatistics {
    /// Number of runs that expired without being paused or stopped.
    pub expiry_count: usize,
    /// Number of pauses that froze a running countdown.
    pub pause_count: usize,
    /// When the countdown was last frozen.
    pub last_paused_at: Option<Instant>,
}

/// What the owner of a [`Countdown`] must do with the pending expiry
/// callback after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Directive {
    /// Cancel any pending callback and arm a new one for the duration.
    Arm(Duration),
    /// Cancel any pending callback.
    Disarm,
    /// Leave the pending callback as it is.
    Unchanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Running { armed: Duration, armed_at: Instant },
    Paused { remaining: Duration },
}

/// The countdown state machine.
///
/// Every operation is a transition over this value and the current time;
/// no clock is read here. While running, the remaining time is derived
/// from the armed duration and the arm instant. While paused, the frozen
/// remaining time is the source of truth.
#[derive(Debug, Clone)]
pub(crate) struct Countdown {
    phase: Phase,
    /// Duration handed to the most recent `start`; `reset` returns here.
    initial: Duration,
    statistics: TimerStatistics,
}

impl Countdown {
    pub(crate) fn new() -> Self {
        Countdown {
            phase: Phase::Idle,
            initial: Duration::ZERO,
            statistics: TimerStatistics::default(),
        }
    }

    /// Replaces any previous run with a fresh one of `duration`.
    pub(crate) fn start(&mut self, duration: Duration, now: Instant) -> Directive {
        self.initial = duration;
        self.phase = Phase::Running {
            armed: duration,
            armed_at: now,
        };
        Directive::Arm(duration)
    }

    pub(crate) fn stop(&mut self) -> Directive {
        self.phase = Phase::Idle;
        Directive::Disarm
    }

    /// Re-arms an active countdown with the duration given to the most
    /// recent `start`, not the narrower one a `resume` continued with.
    pub(crate) fn reset(&mut self, now: Instant) -> Directive {
        match self.phase {
            Phase::Idle => Directive::Unchanged,
            Phase::Running { .. } | Phase::Paused { .. } => {
                self.phase = Phase::Running {
                    armed: self.initial,
                    armed_at: now,
                };
                Directive::Arm(self.initial)
            }
        }
    }

    pub(crate) fn pause(&mut self, now: Instant) -> Directive {
        match self.phase {
            Phase::Running { .. } => {
                let remaining = self.remaining(now);
                self.phase = Phase::Paused { remaining };
                self.statistics.pause_count += 1;
                self.statistics.last_paused_at = Some(now);
                Directive::Disarm
            }
            Phase::Idle | Phase::Paused { .. } => Directive::Unchanged,
        }
    }

    /// Continues from the frozen remaining time.
    pub(crate) fn resume(&mut self, now: Instant) -> Directive {
        match self.phase {
            Phase::Paused { remaining } => {
                self.phase = Phase::Running {
                    armed: remaining,
                    armed_at: now,
                };
                Directive::Arm(remaining)
            }
            Phase::Idle | Phase::Running { .. } => Directive::Unchanged,
        }
    }

    /// Applies a natural expiry. Returns false when the countdown was not
    /// running, in which case nothing changes.
    pub(crate) fn expire(&mut self) -> bool {
        match self.phase {
            Phase::Running { .. } => {
                self.phase = Phase::Idle;
                self.statistics.expiry_count += 1;
                true
            }
            Phase::Idle | Phase::Paused { .. } => false,
        }
    }

    pub(crate) fn remaining(&self, now: Instant) -> Duration {
        match self.phase {
            Phase::Idle => Duration::ZERO,
            Phase::Paused { remaining } => remaining,
            Phase::Running { armed, armed_at } => {
                armed.saturating_sub(now.saturating_duration_since(armed_at))
            }
        }
    }

    pub(crate) fn state(&self) -> TimerState {
        match self.phase {
            Phase::Idle => TimerState::Idle,
            Phase::Running { .. } => TimerState::Running,
            Phase::Paused { .. } => TimerState::Paused,
        }
    }

    pub(crate) fn statistics(&self) -> &TimerStatistics {
        &self.statistics
    }
}
