use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::time::Instant;
#[cfg(feature = "logging")]
use log::debug;

use crate::errors::TimerError;
use crate::scheduler::{self, PendingExpiry};
use crate::timer::{Countdown, Directive, TimerState, TimerStatistics};

struct Inner {
    countdown: Countdown,
    pending: Option<PendingExpiry>,
    next_epoch: u64,
}

impl Inner {
    fn cancel_pending(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.cancel();
        }
    }

    fn on_expiry(&mut self, epoch: u64) {
        if self.pending.as_ref().map(PendingExpiry::epoch) != Some(epoch) {
            return;
        }
        self.pending = None;
        if self.countdown.expire() {
            #[cfg(feature = "logging")]
            debug!("Timer expired.");
        }
    }
}

/// A single pausable countdown.
///
/// State and the pending expiry callback share one lock, so an operation
/// racing the callback either cancels it or sees its effect. At most one
/// callback is ever pending.
///
/// Nothing here listens to host lifecycle events; callers that want to
/// pause while in the background call [`pause`](Self::pause) and
/// [`resume`](Self::resume) themselves.
pub struct TimerEngine {
    inner: Arc<Mutex<Inner>>,
    runtime: Handle,
}

impl TimerEngine {
    /// Creates an idle engine bound to the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside of a tokio runtime. Use
    /// [`with_handle`](Self::with_handle) to bind to a runtime explicitly.
    pub fn new() -> Self {
        Self::with_handle(Handle::current())
    }

    /// Creates an idle engine whose expiry callbacks run on `runtime`.
    pub fn with_handle(runtime: Handle) -> Self {
        TimerEngine {
            inner: Arc::new(Mutex::new(Inner {
                countdown: Countdown::new(),
                pending: None,
                next_epoch: 0,
            })),
            runtime,
        }
    }

    /// Starts a countdown of `duration`, replacing any previous run.
    pub fn start(&self, duration: Duration) {
        #[cfg(feature = "logging")]
        debug!("Starting timer for {:?}.", duration);
        self.transition(|countdown, now| countdown.start(duration, now));
    }

    /// Starts a countdown from a millisecond count supplied by a host.
    ///
    /// Negative, NaN and infinite values are rejected and leave the engine
    /// untouched.
    pub fn start_millis(&self, millis: f64) -> Result<(), TimerError> {
        if !millis.is_finite() || millis < 0.0 {
            return Err(TimerError::InvalidArgument(format!(
                "Duration must be a non-negative number of milliseconds, got {millis}."
            )));
        }

        // Float-to-int casts saturate; sub-microsecond digits are dropped.
        let micros = (millis * 1000.0) as u64;
        self.start(Duration::from_micros(micros));
        Ok(())
    }

    /// Stops the countdown. Safe to call in any state.
    pub fn stop(&self) {
        #[cfg(feature = "logging")]
        debug!("Stopping timer.");
        self.transition(|countdown, _| countdown.stop());
    }

    /// Restarts an active countdown with the duration given to the most
    /// recent [`start`](Self::start).
    ///
    /// The duration a [`resume`](Self::resume) continues with does not
    /// replace it. Does nothing when the timer is idle.
    pub fn reset(&self) {
        self.transition(|countdown, now| countdown.reset(now));
    }

    /// Freezes a running countdown. Does nothing otherwise.
    pub fn pause(&self) {
        self.transition(|countdown, now| countdown.pause(now));
    }

    /// Continues a paused countdown from where it was frozen. Does nothing
    /// otherwise.
    pub fn resume(&self) {
        self.transition(|countdown, now| countdown.resume(now));
    }

    /// Gets the time left, computed fresh on every call.
    pub fn get_remaining_time(&self) -> Duration {
        self.lock().countdown.remaining(Instant::now())
    }

    /// Returns true only while the countdown is ticking. A paused timer is
    /// not reported as active.
    pub fn is_timer_active(&self) -> bool {
        self.get_state() == TimerState::Running
    }

    /// Gets the current state of the timer.
    pub fn get_state(&self) -> TimerState {
        self.lock().countdown.state()
    }

    /// Gets the timer's statistics.
    pub fn get_statistics(&self) -> TimerStatistics {
        self.lock().countdown.statistics().clone()
    }

    fn transition<F>(&self, apply: F)
    where
        F: FnOnce(&mut Countdown, Instant) -> Directive,
    {
        let mut inner = self.lock();
        let now = Instant::now();

        match apply(&mut inner.countdown, now) {
            Directive::Unchanged => {}
            Directive::Disarm => inner.cancel_pending(),
            Directive::Arm(delay) => {
                inner.cancel_pending();
                let epoch = inner.next_epoch;
                inner.next_epoch = inner.next_epoch.wrapping_add(1);

                let weak = Arc::downgrade(&self.inner);
                inner.pending = Some(scheduler::schedule(
                    &self.runtime,
                    now,
                    delay,
                    epoch,
                    move || fire(&weak, epoch),
                ));
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        lock(&self.inner)
    }
}

impl Default for TimerEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TimerEngine {
    fn drop(&mut self) {
        self.lock().cancel_pending();
    }
}

fn fire(inner: &Weak<Mutex<Inner>>, epoch: u64) {
    if let Some(inner) = inner.upgrade() {
        lock(&inner).on_expiry(epoch);
    }
}

// Every transition leaves the state consistent, so a poisoned lock is
// still safe to use.
fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}
