//! # SessionTimer
//! A pausable countdown timer with session-timeout semantics.
//!
//! [`TimerEngine`] is the countdown itself: start, stop, reset, pause,
//! resume and remaining-time queries, with a single one-shot expiry
//! scheduled on tokio. [`SessionMonitor`] builds inactivity timeouts on
//! top of it.

pub mod config;
pub mod engine;
pub mod errors;
mod scheduler;
pub mod session;
pub mod timer;

pub use config::{SessionConfig, SessionConfigBuilder};
pub use engine::TimerEngine;
pub use errors::TimerError;
pub use session::{HostState, SessionHandler, SessionMonitor, SessionState};
pub use timer::{TimerState, TimerStatistics};
