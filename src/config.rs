//! Configuration for session monitoring.

use std::time::Duration;

use crate::errors::TimerError;

/// Default window before expiry in which a warning is raised.
pub const DEFAULT_WARNING_DURATION: Duration = Duration::from_secs(60);

/// Default interval between remaining-time polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Settings for a [`SessionMonitor`](crate::SessionMonitor).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Length of a session without activity.
    pub timeout: Duration,
    /// A warning is raised once per run when the remaining time drops to
    /// this window.
    pub warning_duration: Duration,
    /// When false, starting the monitor does not arm the timer.
    pub enabled: bool,
    /// Pause while the host is inactive or in the background.
    pub pause_on_background: bool,
    /// How often the remaining time is polled.
    pub poll_interval: Duration,
}

impl SessionConfig {
    /// Starts building a configuration for sessions of `timeout`.
    pub fn builder(timeout: Duration) -> SessionConfigBuilder {
        SessionConfigBuilder {
            config: SessionConfig {
                timeout,
                warning_duration: DEFAULT_WARNING_DURATION.min(timeout),
                enabled: true,
                pause_on_background: false,
                poll_interval: DEFAULT_POLL_INTERVAL,
            },
        }
    }

    /// Checks the settings for consistency.
    pub fn validate(&self) -> Result<(), TimerError> {
        if self.poll_interval.is_zero() {
            return Err(TimerError::InvalidArgument(
                "Poll interval must be greater than zero.".into(),
            ));
        }
        if self.warning_duration > self.timeout {
            return Err(TimerError::InvalidArgument(format!(
                "Warning duration {:?} exceeds timeout {:?}.",
                self.warning_duration, self.timeout
            )));
        }
        Ok(())
    }
}

/// Builder for [`SessionConfig`].
#[derive(Debug, Clone)]
pub struct SessionConfigBuilder {
    config: SessionConfig,
}

impl SessionConfigBuilder {
    pub fn warning_duration(mut self, warning_duration: Duration) -> Self {
        self.config.warning_duration = warning_duration;
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.config.enabled = enabled;
        self
    }

    pub fn pause_on_background(mut self, pause_on_background: bool) -> Self {
        self.config.pause_on_background = pause_on_background;
        self
    }

    pub fn poll_interval(mut self, poll_interval: Duration) -> Self {
        self.config.poll_interval = poll_interval;
        self
    }

    /// Validates and returns the configuration.
    pub fn build(self) -> Result<SessionConfig, TimerError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
