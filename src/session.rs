//! Session-timeout monitoring on top of [`TimerEngine`].
//!
//! A [`SessionMonitor`] polls its engine, raises a one-shot warning as the
//! deadline approaches and reports the timeout to a [`SessionHandler`].
//! Host lifecycle changes are forwarded explicitly through
//! [`SessionMonitor::handle_host_state`].

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use async_trait::async_trait;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
#[cfg(feature = "logging")]
use log::{debug, error};

use crate::config::SessionConfig;
use crate::engine::TimerEngine;
use crate::errors::TimerError;

/// Receives session notifications.
#[async_trait]
pub trait SessionHandler: Send + Sync {
    /// Called once when the session runs out.
    async fn on_timeout(&self) -> Result<(), TimerError>;

    /// Called once per run when the remaining time enters the warning
    /// window.
    async fn on_warning(&self, _remaining: Duration) -> Result<(), TimerError> {
        Ok(())
    }
}

/// Foreground state of the embedding host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostState {
    Active,
    Inactive,
    Background,
}

impl HostState {
    fn is_foreground(self) -> bool {
        self == HostState::Active
    }
}

/// Snapshot of a session as of the last poll or operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionState {
    pub is_warning: bool,
    pub remaining: Duration,
    pub is_active: bool,
}

#[derive(Debug)]
struct Shared {
    state: SessionState,
    warning_triggered: bool,
}

#[derive(Debug, PartialEq, Eq)]
enum Tick {
    Quiet,
    Warning(Duration),
    Timeout,
}

impl Shared {
    fn rearm(&mut self, remaining: Duration, is_active: bool) {
        self.state = SessionState {
            is_warning: false,
            remaining,
            is_active,
        };
        self.warning_triggered = false;
    }

    fn observe(&mut self, remaining: Duration, warning_duration: Duration) -> Tick {
        self.state.remaining = remaining;

        if remaining.is_zero() {
            self.state.is_warning = false;
            self.state.is_active = false;
            return Tick::Timeout;
        }

        if remaining <= warning_duration && !self.warning_triggered {
            self.warning_triggered = true;
            self.state.is_warning = true;
            return Tick::Warning(remaining);
        }

        Tick::Quiet
    }
}

/// Drives a session timeout: polls the engine, raises warnings and
/// reports the timeout.
pub struct SessionMonitor {
    engine: Arc<TimerEngine>,
    config: SessionConfig,
    handler: Arc<dyn SessionHandler>,
    shared: Arc<Mutex<Shared>>,
    poller: Option<JoinHandle<()>>,
    host: HostState,
    runtime: Handle,
}

impl SessionMonitor {
    /// Creates a monitor with its own engine on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside of a tokio runtime. Use
    /// [`with_handle`](Self::with_handle) to bind to a runtime explicitly.
    pub fn new<H>(config: SessionConfig, handler: H) -> Result<Self, TimerError>
    where
        H: SessionHandler + 'static,
    {
        Self::with_handle(config, handler, Handle::current())
    }

    /// Creates a monitor whose engine callbacks and poller run on `runtime`.
    pub fn with_handle<H>(
        config: SessionConfig,
        handler: H,
        runtime: Handle,
    ) -> Result<Self, TimerError>
    where
        H: SessionHandler + 'static,
    {
        config.validate()?;

        Ok(SessionMonitor {
            engine: Arc::new(TimerEngine::with_handle(runtime.clone())),
            shared: Arc::new(Mutex::new(Shared {
                state: SessionState {
                    is_warning: false,
                    remaining: config.timeout,
                    is_active: config.enabled,
                },
                warning_triggered: false,
            })),
            config,
            handler: Arc::new(handler),
            poller: None,
            host: HostState::Active,
            runtime,
        })
    }

    /// Starts a session, or parks the engine when the monitor is disabled.
    pub fn start(&mut self) {
        if !self.config.enabled {
            self.engine.pause();
            self.shared().state.is_active = false;
            return;
        }

        #[cfg(feature = "logging")]
        debug!("Starting session of {:?}.", self.config.timeout);

        self.engine.start(self.config.timeout);
        self.shared().rearm(self.config.timeout, true);
        self.stop_polling();
        self.ensure_polling();
    }

    /// Restarts the countdown after user activity.
    pub fn record_activity(&mut self) {
        self.reset();
    }

    /// Restarts the countdown with the full timeout and clears a raised
    /// warning. Does nothing to an idle engine.
    pub fn reset(&mut self) {
        // Held across the engine reset so a poll cannot observe the old run
        // after the warning latch is cleared.
        let ticking = {
            let mut shared = self.shared();
            self.engine.reset();
            let ticking = self.engine.is_timer_active();
            if ticking {
                shared.rearm(self.engine.get_remaining_time(), true);
            }
            ticking
        };

        if ticking {
            self.ensure_polling();
        }
    }

    /// Pauses the countdown and stops polling.
    pub fn pause(&mut self) {
        self.engine.pause();
        self.stop_polling();
        let mut shared = self.shared();
        shared.state.is_active = false;
        shared.state.remaining = self.engine.get_remaining_time();
    }

    /// Resumes the countdown and polling.
    pub fn resume(&mut self) {
        self.engine.resume();
        if self.engine.is_timer_active() {
            self.shared().state.is_active = true;
            self.ensure_polling();
        }
    }

    /// Ends the session without reporting a timeout.
    pub fn stop(&mut self) {
        self.stop_polling();
        self.engine.stop();
        let mut shared = self.shared();
        shared.state.is_active = false;
        shared.state.is_warning = false;
        shared.state.remaining = Duration::ZERO;
    }

    /// Forwards a host lifecycle transition. With `pause_on_background`
    /// set, leaving the foreground pauses and returning to it resumes.
    pub fn handle_host_state(&mut self, next: HostState) {
        let previous = std::mem::replace(&mut self.host, next);
        if !self.config.pause_on_background {
            return;
        }

        match (previous.is_foreground(), next.is_foreground()) {
            (false, true) => self.resume(),
            (true, false) => self.pause(),
            _ => {}
        }
    }

    /// Gets the session state as of the last poll or operation.
    pub fn state(&self) -> SessionState {
        self.shared().state
    }

    pub fn engine(&self) -> &TimerEngine {
        &self.engine
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    fn ensure_polling(&mut self) {
        if self.poller.as_ref().is_some_and(|poller| !poller.is_finished()) {
            return;
        }

        self.poller = Some(self.runtime.spawn(poll_session(
            Arc::downgrade(&self.engine),
            Arc::clone(&self.shared),
            Arc::clone(&self.handler),
            self.config.warning_duration,
            self.config.poll_interval,
        )));
    }

    fn stop_polling(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.abort();
        }
    }

    fn shared(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for SessionMonitor {
    fn drop(&mut self) {
        self.stop_polling();
        self.engine.stop();
    }
}

async fn poll_session(
    engine: Weak<TimerEngine>,
    shared: Arc<Mutex<Shared>>,
    handler: Arc<dyn SessionHandler>,
    warning_duration: Duration,
    poll_interval: Duration,
) {
    let mut ticker = time::interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;

        let Some(timer) = engine.upgrade() else {
            break;
        };

        let tick = poll_once(&timer, &shared, warning_duration);
        drop(timer);

        match tick {
            Tick::Quiet => {}
            Tick::Warning(remaining) => {
                #[cfg(feature = "logging")]
                debug!("Session warning, {:?} remaining.", remaining);
                if let Err(_e) = handler.on_warning(remaining).await {
                    #[cfg(feature = "logging")]
                    error!("Warning handler error: {}", _e);
                }
            }
            Tick::Timeout => {
                #[cfg(feature = "logging")]
                debug!("Session timed out.");
                if let Err(_e) = handler.on_timeout().await {
                    #[cfg(feature = "logging")]
                    error!("Timeout handler error: {}", _e);
                }
                break;
            }
        }
    }
}

// The engine is read under the session lock so a concurrent reset cannot
// land between the read and the update.
fn poll_once(timer: &TimerEngine, shared: &Mutex<Shared>, warning_duration: Duration) -> Tick {
    let mut shared = shared.lock().unwrap_or_else(PoisonError::into_inner);
    shared.observe(timer.get_remaining_time(), warning_duration)
}
