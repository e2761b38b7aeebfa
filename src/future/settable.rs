// src/future/settable.rs

//! A single-assignment, blocking-readable result cell.
//!
//! The first call to [`SettableFuture::resolve`], [`SettableFuture::fail`] or
//! [`SettableFuture::cancel`] wins; every later call is logged and ignored.
//! Cancellation only marks the cell. Nothing that is already running is
//! interrupted; dependents simply observe a cancelled dependency.

use std::fmt;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::Notify;
use tracing::{debug, info, warn};

use crate::errors::{SharedError, WaitError};

#[derive(Debug)]
enum FutureState<T> {
    Pending,
    Success(T),
    Failure(SharedError),
    Cancelled,
}

impl<T> FutureState<T> {
    fn is_terminal(&self) -> bool {
        !matches!(self, FutureState::Pending)
    }

    fn kind(&self) -> &'static str {
        match self {
            FutureState::Pending => "pending",
            FutureState::Success(_) => "success",
            FutureState::Failure(_) => "failure",
            FutureState::Cancelled => "cancelled",
        }
    }
}

struct Inner<T> {
    name: String,
    state: Mutex<FutureState<T>>,
    /// Wakes blocking readers in [`SettableFuture::wait`].
    cond: Condvar,
    /// Wakes async readers in [`SettableFuture::until_done`].
    notify: Notify,
}

/// Shared handle to a single-assignment result cell.
///
/// Cloning is cheap; all clones observe the same state.
pub struct SettableFuture<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for SettableFuture<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for SettableFuture<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self
            .inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("SettableFuture")
            .field("name", &self.inner.name)
            .field("state", &state.kind())
            .finish()
    }
}

impl<T: Clone + Send + 'static> SettableFuture<T> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Inner {
                name: name.into(),
                state: Mutex::new(FutureState::Pending),
                cond: Condvar::new(),
                notify: Notify::new(),
            }),
        }
    }

    /// Diagnostic label given at construction.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Transition `Pending -> Success(value)`.
    ///
    /// Returns `false` (and logs) if the future was already terminal.
    pub fn resolve(&self, value: T) -> bool {
        match self.complete(FutureState::Success(value)) {
            Ok(()) => {
                info!(future = %self.name(), "future resolved");
                true
            }
            Err(existing) => {
                warn!(
                    future = %self.name(),
                    existing,
                    "multiple completions; ignoring new value"
                );
                false
            }
        }
    }

    /// Transition `Pending -> Failure(error)`.
    ///
    /// Returns `false` (and logs) if the future was already terminal.
    pub fn fail(&self, error: impl Into<anyhow::Error>) -> bool {
        let cause: SharedError = Arc::new(error.into());
        match self.complete(FutureState::Failure(Arc::clone(&cause))) {
            Ok(()) => {
                warn!(
                    future = %self.name(),
                    error = %cause,
                    "future failed"
                );
                true
            }
            Err(existing) => {
                warn!(
                    future = %self.name(),
                    existing,
                    error = %cause,
                    "discarding late failure"
                );
                false
            }
        }
    }

    /// Transition `Pending -> Cancelled`.
    ///
    /// Work that would have resolved this future keeps running; only readers
    /// are affected.
    pub fn cancel(&self) -> bool {
        match self.complete(FutureState::Cancelled) {
            Ok(()) => {
                info!(future = %self.name(), "future cancelled");
                true
            }
            Err(existing) => {
                debug!(
                    future = %self.name(),
                    existing,
                    "cancel ignored; future already terminal"
                );
                false
            }
        }
    }

    /// Non-blocking: `true` once the future holds a success, failure or
    /// cancellation.
    pub fn is_done(&self) -> bool {
        self.lock().is_terminal()
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(*self.lock(), FutureState::Cancelled)
    }

    /// Non-blocking read: `None` while pending.
    pub fn outcome(&self) -> Option<Result<T, WaitError>> {
        let state = self.lock();
        self.read(&state)
    }

    /// Block the calling thread until the future is terminal.
    ///
    /// `None` waits indefinitely. A timeout is reported as
    /// [`WaitError::TimedOut`], distinct from a stored failure.
    pub fn wait(&self, timeout: Option<Duration>) -> Result<T, WaitError> {
        let guard = self.lock();
        let guard = match timeout {
            None => self
                .inner
                .cond
                .wait_while(guard, |s| !s.is_terminal())
                .unwrap_or_else(PoisonError::into_inner),
            Some(limit) => {
                let (guard, _) = self
                    .inner
                    .cond
                    .wait_timeout_while(guard, limit, |s| !s.is_terminal())
                    .unwrap_or_else(PoisonError::into_inner);
                guard
            }
        };

        self.read(&guard)
            .unwrap_or_else(|| Err(self.timed_out(timeout.unwrap_or_default())))
    }

    /// Async counterpart of [`wait`](Self::wait), used by the executor.
    pub async fn wait_async(&self, timeout: Option<Duration>) -> Result<T, WaitError> {
        match timeout {
            None => self.until_done().await,
            Some(limit) => {
                if tokio::time::timeout(limit, self.until_done()).await.is_err() {
                    return Err(self.timed_out(limit));
                }
            }
        }

        self.outcome()
            .unwrap_or_else(|| Err(self.timed_out(timeout.unwrap_or_default())))
    }

    /// Resolves once the future is terminal, without reading the value.
    pub async fn until_done(&self) {
        loop {
            let notified = self.inner.notify.notified();
            tokio::pin!(notified);
            // Register before checking so a transition in between is not lost.
            notified.as_mut().enable();

            if self.is_done() {
                return;
            }
            notified.await;
        }
    }

    /// Non-blocking status without cloning the value.
    pub(crate) fn status(&self) -> Option<Result<(), WaitError>> {
        match &*self.lock() {
            FutureState::Pending => None,
            FutureState::Success(_) => Some(Ok(())),
            FutureState::Failure(cause) => Some(Err(WaitError::Failed {
                future: self.inner.name.clone(),
                cause: Arc::clone(cause),
            })),
            FutureState::Cancelled => Some(Err(WaitError::Cancelled {
                future: self.inner.name.clone(),
            })),
        }
    }

    fn complete(&self, next: FutureState<T>) -> Result<(), &'static str> {
        let mut state = self.lock();
        if state.is_terminal() {
            return Err(state.kind());
        }
        *state = next;
        drop(state);

        self.inner.cond.notify_all();
        self.inner.notify.notify_waiters();
        Ok(())
    }

    fn read(&self, state: &FutureState<T>) -> Option<Result<T, WaitError>> {
        match state {
            FutureState::Pending => None,
            FutureState::Success(value) => Some(Ok(value.clone())),
            FutureState::Failure(cause) => Some(Err(WaitError::Failed {
                future: self.inner.name.clone(),
                cause: Arc::clone(cause),
            })),
            FutureState::Cancelled => Some(Err(WaitError::Cancelled {
                future: self.inner.name.clone(),
            })),
        }
    }

    fn timed_out(&self, timeout: Duration) -> WaitError {
        WaitError::TimedOut {
            future: self.inner.name.clone(),
            timeout,
        }
    }

    fn lock(&self) -> MutexGuard<'_, FutureState<T>> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
