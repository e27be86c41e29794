//! Async action flow machine
//!
//! Short-lived state machine guarding one user-triggered async action
//! (order placement, payment submission, reservation):
//!
//! ```text
//! Idle -> Confirming -> InFlight -> Succeeded | Failed
//! ```
//!
//! While an action is in flight, re-entrant triggers are rejected
//! instead of firing a second request. The in-flight phase hands out a
//! [`FlowGuard`]; dropping it without settling records a failure, so
//! no exit path can leave the processing flag stuck. Each begin bumps
//! an epoch and a guard from a superseded epoch settles into nothing,
//! which suppresses responses that arrive after the user moved on.

use parking_lot::Mutex;
use std::sync::Arc;
use thiserror::Error;

/// Phase of one async action
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FlowState {
    #[default]
    Idle,
    /// Waiting on a user confirmation popup
    Confirming,
    /// Request running; triggers are rejected
    InFlight,
    Succeeded,
    Failed(String),
}

/// Flow errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FlowError {
    #[error("Action already in flight")]
    Busy,
}

#[derive(Debug)]
struct Inner {
    state: FlowState,
    epoch: u64,
}

/// Re-entrancy guard for one async action
#[derive(Clone)]
pub struct ActionFlow {
    inner: Arc<Mutex<Inner>>,
}

impl Default for ActionFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl ActionFlow {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                state: FlowState::Idle,
                epoch: 0,
            })),
        }
    }

    pub fn state(&self) -> FlowState {
        self.inner.lock().state.clone()
    }

    pub fn is_in_flight(&self) -> bool {
        self.inner.lock().state == FlowState::InFlight
    }

    /// Enter the confirmation phase (e.g. a confirm popup opened)
    pub fn request_confirmation(&self) -> Result<(), FlowError> {
        let mut inner = self.inner.lock();
        if inner.state == FlowState::InFlight {
            return Err(FlowError::Busy);
        }
        inner.state = FlowState::Confirming;
        Ok(())
    }

    /// Back out of the confirmation phase
    pub fn cancel(&self) {
        let mut inner = self.inner.lock();
        if inner.state == FlowState::Confirming {
            inner.state = FlowState::Idle;
        }
    }

    /// Start the in-flight phase
    ///
    /// Rejects when a request is already running. The returned guard
    /// must be settled with [`FlowGuard::succeed`] or
    /// [`FlowGuard::fail`]; dropping it unsettled records a failure.
    pub fn begin(&self) -> Result<FlowGuard, FlowError> {
        let mut inner = self.inner.lock();
        if inner.state == FlowState::InFlight {
            return Err(FlowError::Busy);
        }
        inner.epoch += 1;
        inner.state = FlowState::InFlight;
        Ok(FlowGuard {
            inner: self.inner.clone(),
            epoch: inner.epoch,
            settled: false,
        })
    }

    /// Abandon the flow (e.g. the owning view went away)
    ///
    /// Bumps the epoch so an outstanding guard's late settle lands in
    /// nothing instead of resurrecting a dead action.
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        inner.epoch += 1;
        inner.state = FlowState::Idle;
    }
}

/// Settles the in-flight phase; must not outlive its action
#[derive(Debug)]
pub struct FlowGuard {
    inner: Arc<Mutex<Inner>>,
    epoch: u64,
    settled: bool,
}

impl FlowGuard {
    fn settle(&mut self, state: FlowState) {
        self.settled = true;
        let mut inner = self.inner.lock();
        // A guard from a superseded epoch is a stale response
        if inner.epoch == self.epoch {
            inner.state = state;
        }
    }

    pub fn succeed(mut self) {
        self.settle(FlowState::Succeeded);
    }

    pub fn fail(mut self, message: impl Into<String>) {
        self.settle(FlowState::Failed(message.into()));
    }
}

impl Drop for FlowGuard {
    fn drop(&mut self) {
        if !self.settled {
            self.settle(FlowState::Failed("aborted".to_string()));
        }
    }
}
