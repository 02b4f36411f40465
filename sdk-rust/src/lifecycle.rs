use std::{
    fmt::Display,
    future::Future,
    sync::{Mutex, MutexGuard, PoisonError},
};
use tracing::{debug, info_span};
use tracing_futures::Instrument;

/// Observable state of the calls made through one [`CallLifecycle`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallState {
    pub loading: bool,
    pub error: Option<String>,
}

/// Tracks `loading`/`error` around asynchronous calls.
///
/// The state belongs to the instance, not to a call: concurrent calls on the
/// same instance overwrite each other and the last transition applied wins.
/// Use one instance per view that needs its own indicator.
#[derive(Debug, Default)]
pub struct CallLifecycle {
    state: Mutex<CallState>,
}

impl CallLifecycle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> CallState {
        self.lock().clone()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.lock().loading
    }

    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.lock().error.clone()
    }

    pub fn set_error(&self, error: Option<String>) {
        self.lock().error = error;
    }

    pub fn clear_error(&self) {
        self.set_error(None);
    }

    /// Run `operation`, marking the instance as loading until it resolves.
    ///
    /// On failure the error's message is recorded and the error itself is
    /// returned to the caller unchanged. `loading` is cleared exactly once,
    /// also when the returned future is dropped before completion.
    pub async fn run<F, Fut, T, E>(&self, operation: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let mut in_flight = InFlight::start(self);

        let result = operation()
            .instrument(info_span!("risk_sdk.call"))
            .await;

        if let Err(error) = &result {
            debug!(%error, "call failed");
            in_flight.fail(error.to_string());
        }

        in_flight.finish();
        result
    }

    fn lock(&self) -> MutexGuard<'_, CallState> {
        // The state is plain data, so a poisoned lock is still consistent.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Holds `loading` for the duration of one call.
struct InFlight<'a> {
    lifecycle: &'a CallLifecycle,
    error: Option<String>,
    finished: bool,
}

impl<'a> InFlight<'a> {
    fn start(lifecycle: &'a CallLifecycle) -> Self {
        *lifecycle.lock() = CallState {
            loading: true,
            error: None,
        };
        Self {
            lifecycle,
            error: None,
            finished: false,
        }
    }

    fn fail(&mut self, message: String) {
        self.error = Some(message);
    }

    fn finish(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        *self.lifecycle.lock() = CallState {
            loading: false,
            error: self.error.take(),
        };
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.finish();
    }
}
