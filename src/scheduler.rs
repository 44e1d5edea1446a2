//! One-shot delayed execution on a tokio runtime.

use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};

/// Ownership handle for a scheduled expiry callback.
///
/// The `epoch` identifies the arming that produced it. A callback that
/// wakes up must confirm that its epoch is still the pending one before
/// acting, which keeps cancellation effective even when the task has
/// already left its sleep and is waiting on the owner's lock.
#[derive(Debug)]
pub(crate) struct PendingExpiry {
    epoch: u64,
    handle: JoinHandle<()>,
}

impl PendingExpiry {
    pub(crate) fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Cancels the callback if it has not run yet.
    pub(crate) fn cancel(self) {
        self.handle.abort();
    }
}

/// Runs `on_fire` once, `delay` after `armed_at`, on the given runtime.
///
/// The deadline is fixed here rather than when the task is first polled,
/// so the callback lines up with remaining-time queries measured from
/// `armed_at`.
pub(crate) fn schedule<F>(
    runtime: &Handle,
    armed_at: Instant,
    delay: Duration,
    epoch: u64,
    on_fire: F,
) -> PendingExpiry
where
    F: FnOnce() + Send + 'static,
{
    let deadline = armed_at.checked_add(delay);

    let handle = runtime.spawn(async move {
        match deadline {
            Some(deadline) => time::sleep_until(deadline).await,
            None => time::sleep(delay).await,
        }
        on_fire();
    });

    PendingExpiry { epoch, handle }
}
