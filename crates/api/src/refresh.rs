//! Single-flight session refresh.
//!
//! When several requests hit a 401 at the same time only one of them performs
//! the refresh exchange; the rest park until it completes and share its
//! outcome. A generation counter is bumped after every attempt so a request
//! whose 401 arrives after a refresh already finished reuses that result
//! instead of starting another one.

use std::future::Future;
use std::sync::Mutex;

use tokio::sync::{broadcast, oneshot};
use tracing::{debug, warn};

use crate::ApiError;

pub type RefreshOutcome = Result<(), ApiError>;

/// Session-level notifications for whoever manages sign-in state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    /// The session could not be renewed; the user must sign in again.
    AuthenticationFailed { reason: String },
}

#[derive(Debug, Default)]
struct RefreshState {
    in_progress: bool,
    waiters: Vec<oneshot::Sender<RefreshOutcome>>,
    generation: u64,
    last_outcome: Option<RefreshOutcome>,
}

enum Role {
    Leader,
    Waiter(oneshot::Receiver<RefreshOutcome>),
    Finished(RefreshOutcome),
}

#[derive(Debug)]
pub struct RefreshCoordinator {
    state: Mutex<RefreshState>,
    events: broadcast::Sender<AuthEvent>,
}

impl Default for RefreshCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl RefreshCoordinator {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            state: Mutex::new(RefreshState::default()),
            events,
        }
    }

    /// Number of refresh attempts completed so far.
    pub fn generation(&self) -> u64 {
        self.state.lock().expect("refresh lock poisoned").generation
    }

    pub fn is_refreshing(&self) -> bool {
        self.state.lock().expect("refresh lock poisoned").in_progress
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    #[cfg(test)]
    fn parked(&self) -> usize {
        self.state.lock().expect("refresh lock poisoned").waiters.len()
    }

    /// Run `refresh` unless an attempt is already running or finished after
    /// `observed_generation`; in both of those cases the existing attempt's
    /// outcome is returned.
    pub async fn run_exclusive<F, Fut>(&self, observed_generation: u64, refresh: F) -> RefreshOutcome
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = RefreshOutcome>,
    {
        let mut refresh = Some(refresh);
        loop {
            let role = {
                let mut state = self.state.lock().expect("refresh lock poisoned");
                if state.in_progress {
                    let (sender, receiver) = oneshot::channel();
                    state.waiters.push(sender);
                    Role::Waiter(receiver)
                } else if state.generation > observed_generation {
                    Role::Finished(state.last_outcome.clone().unwrap_or(Ok(())))
                } else {
                    state.in_progress = true;
                    Role::Leader
                }
            };

            match role {
                Role::Finished(outcome) => return outcome,
                Role::Waiter(receiver) => {
                    debug!("waiting for in-flight session refresh");
                    match receiver.await {
                        Ok(outcome) => return outcome,
                        // The leader went away before finishing; compete again.
                        Err(_) => debug!("session refresh abandoned by its leader; retrying"),
                    }
                }
                Role::Leader => {
                    let Some(refresh) = refresh.take() else {
                        self.abandon();
                        return Err(ApiError::RefreshFailed("refresh already attempted".into()));
                    };
                    debug!(generation = observed_generation, "session refresh started");
                    let mut guard = LeaderGuard {
                        coordinator: self,
                        completed: false,
                    };
                    let outcome = refresh().await;
                    guard.complete(outcome.clone());
                    return outcome;
                }
            }
        }
    }

    /// Give up leadership without an outcome. Parked waiters are woken and
    /// race for a fresh attempt; the generation and auth events are untouched.
    fn abandon(&self) {
        let waiters = {
            let mut state = self.state.lock().expect("refresh lock poisoned");
            state.in_progress = false;
            std::mem::take(&mut state.waiters)
        };
        debug!(waiters = waiters.len(), "session refresh cancelled");
        drop(waiters);
    }

    fn complete(&self, outcome: RefreshOutcome) {
        let waiters = {
            let mut state = self.state.lock().expect("refresh lock poisoned");
            state.generation += 1;
            state.last_outcome = Some(outcome.clone());
            state.in_progress = false;
            std::mem::take(&mut state.waiters)
        };
        debug!(waiters = waiters.len(), success = outcome.is_ok(), "session refresh finished");

        for waiter in waiters {
            let _ = waiter.send(outcome.clone());
        }

        if let Err(error) = outcome {
            warn!(error = %error, "session refresh failed; sign-in required");
            let _ = self.events.send(AuthEvent::AuthenticationFailed {
                reason: error.to_string(),
            });
        }
    }
}

/// Hands leadership back if the leader's future is dropped mid-refresh.
struct LeaderGuard<'a> {
    coordinator: &'a RefreshCoordinator,
    completed: bool,
}

impl LeaderGuard<'_> {
    fn complete(&mut self, outcome: RefreshOutcome) {
        self.completed = true;
        self.coordinator.complete(outcome);
    }
}

impl Drop for LeaderGuard<'_> {
    fn drop(&mut self) {
        if !self.completed {
            self.coordinator.abandon();
        }
    }
}
