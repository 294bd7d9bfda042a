//! Restartable background work with cooperative cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

/// Shared cancellation flag observed by long-running operations.
///
/// Cancellation is cooperative: the running job polls [`CancelToken::is_cancelled`] at
/// its checkpoints and winds down with [`crate::Error::Cancelled`].
#[derive(Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create an uncancelled token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the token; every clone observes it.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Checkpoint helper: error out when cancelled.
    ///
    /// # Errors
    /// [`crate::Error::Cancelled`] when the token was flipped.
    pub fn check(&self) -> crate::Result<()> {
        if self.is_cancelled() {
            Err(crate::Error::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// One restartable background worker slot.
///
/// Each long-running operation kind (ingestion, phantom synthesis, export) owns one
/// slot; submitting new work cancels whatever was running. The replaced job keeps its
/// thread until it observes its token, so submit never blocks.
pub struct TaskSlot {
    name: &'static str,
    current: Option<(CancelToken, JoinHandle<()>)>,
}

impl TaskSlot {
    /// Create an idle slot; `name` shows up in logs.
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            current: None,
        }
    }

    /// Cancel any running job and start `job` on a fresh thread with a fresh token.
    pub fn submit<F>(&mut self, job: F)
    where
        F: FnOnce(CancelToken) + Send + 'static,
    {
        self.cancel();
        let token = CancelToken::new();
        let worker = token.clone();
        let handle = std::thread::spawn(move || job(worker));
        log::debug!("task slot '{}' started a new job", self.name);
        self.current = Some((token, handle));
    }

    /// Request cancellation of the running job, if any, without waiting for it.
    pub fn cancel(&mut self) {
        if let Some((token, _)) = &self.current {
            if !token.is_cancelled() {
                log::debug!("task slot '{}' cancelling current job", self.name);
                token.cancel();
            }
        }
    }

    /// Wait for the current job to finish. Used by tests and orderly shutdown.
    pub fn join(&mut self) {
        if let Some((_, handle)) = self.current.take() {
            if handle.join().is_err() {
                log::error!("task slot '{}' job panicked", self.name);
            }
        }
    }

    /// Whether a job is still running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|(_, handle)| !handle.is_finished())
    }
}

impl Drop for TaskSlot {
    fn drop(&mut self) {
        self.cancel();
    }
}
