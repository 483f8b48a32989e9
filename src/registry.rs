//! The guard registry: who, if anyone, gets asked before a navigation
//! commits.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::GuardError;
use crate::navigation::{GuardDecision, NavigationAttempt};

type GuardFn = dyn FnMut(&NavigationAttempt) -> Result<GuardDecision, GuardError>;

/// A guard callback, invoked once per distinct navigation attempt.
///
/// Guards must tolerate being invoked multiple times over their lifetime; the
/// interceptor never invokes the same guard re-entrantly (a re-entrant
/// invocation is refused and treated as a block).
#[derive(Clone)]
pub struct NavigationGuard {
    callback: Rc<RefCell<GuardFn>>,
}

impl NavigationGuard {
    /// Wrap an infallible guard callback.
    pub fn new(mut guard: impl FnMut(&NavigationAttempt) -> GuardDecision + 'static) -> Self {
        Self::fallible(move |attempt| Ok(guard(attempt)))
    }

    /// Wrap a guard callback that can fail. A returned error is treated as a
    /// blocking decision and forwarded to the provider's error channel.
    pub fn fallible(
        guard: impl FnMut(&NavigationAttempt) -> Result<GuardDecision, GuardError> + 'static,
    ) -> Self {
        Self {
            callback: Rc::new(RefCell::new(guard)),
        }
    }

    pub(crate) fn invoke(&self, attempt: &NavigationAttempt) -> Result<GuardDecision, GuardError> {
        match self.callback.try_borrow_mut() {
            Ok(mut callback) => callback(attempt),
            Err(_) => Err(GuardError::Invocation(
                "guard invoked re-entrantly from within its own invocation".to_string(),
            )),
        }
    }
}

/// Identifies one registration. Unregistering with a stale token is a no-op.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GuardToken(usize);

#[derive(Default)]
struct RegistryState {
    guards: Vec<(GuardToken, NavigationGuard)>,
    next_token: usize,
}

/// Holds the currently active guard.
///
/// Guards form an ordered set: the most recent registration takes precedence,
/// and unregistering it restores the one below. In practice a well-behaved
/// app has at most one guard mounted at a time; registering a second one
/// logs a warning.
#[derive(Clone, Default)]
pub struct GuardRegistry {
    state: Rc<RefCell<RegistryState>>,
}

impl GuardRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `guard` as the active guard and return its token.
    pub fn register(&self, guard: NavigationGuard) -> GuardToken {
        let mut state = self.state.borrow_mut();
        if !state.guards.is_empty() {
            tracing::warn!(
                "a navigation guard is already registered; the newest registration takes precedence"
            );
        }
        let token = GuardToken(state.next_token);
        state.next_token += 1;
        state.guards.push((token, guard));
        token
    }

    /// Remove the guard registered under `token`. Idempotent: a missing or
    /// already-removed token is tolerated silently, so this is safe to call
    /// during teardown even if registration never completed.
    pub fn unregister(&self, token: GuardToken) {
        self.state
            .borrow_mut()
            .guards
            .retain(|(registered, _)| *registered != token);
    }

    /// Whether any guard is currently registered.
    pub fn is_guarded(&self) -> bool {
        !self.state.borrow().guards.is_empty()
    }

    pub(crate) fn active(&self) -> Option<(GuardToken, NavigationGuard)> {
        self.state.borrow().guards.last().cloned()
    }
}
