//! Single-slot reconnect timer.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;

/// Holds at most one scheduled reconnect.
///
/// Scheduling always aborts the previous timer first, so attempts never pile up.
/// Dropping the timer cancels whatever is pending.
#[derive(Debug, Default)]
pub struct ReconnectTimer {
    pending: Option<JoinHandle<()>>,
}

impl ReconnectTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `task` after `delay`, replacing any timer already scheduled.
    pub fn schedule<F>(&mut self, delay: Duration, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
        }));
    }

    /// Abort the pending timer. Returns whether one was still waiting.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(handle) => {
                let waiting = !handle.is_finished();
                handle.abort();
                waiting
            }
            None => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for ReconnectTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
