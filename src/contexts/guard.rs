use dioxus_lib::prelude::*;

use crate::interceptor::NavigationInterceptor;
use crate::navigation::NavigationAttempt;
use crate::registry::{GuardToken, NavigationGuard};

/// The context established by a `NavigationGuardProvider`.
///
/// Carries the interceptor and the pending-attempt signal for a provider
/// subtree. The hooks consume this; hosts that need imperative access (e.g.
/// registering a guard outside a component lifecycle) can consume it
/// directly.
#[derive(Clone)]
pub struct GuardContext {
    interceptor: NavigationInterceptor,
    pending: Signal<Option<NavigationAttempt>>,
}

impl GuardContext {
    pub(crate) fn new(
        interceptor: NavigationInterceptor,
        pending: Signal<Option<NavigationAttempt>>,
    ) -> Self {
        Self {
            interceptor,
            pending,
        }
    }

    pub(crate) fn interceptor(&self) -> &NavigationInterceptor {
        &self.interceptor
    }

    /// Register `guard` as the active guard.
    pub fn register(&self, guard: NavigationGuard) -> GuardToken {
        self.interceptor.register(guard)
    }

    /// Unregister `token`, resolving its outstanding decision (if any) as
    /// "allow". Idempotent.
    pub fn release(&self, token: GuardToken) {
        self.interceptor.release(token)
    }

    /// Settle the outstanding decision: `true` commits the deferred
    /// navigation, `false` drops it. A no-op when nothing is pending.
    pub fn resolve(&self, allow: bool) {
        self.interceptor.resolve(allow)
    }

    /// The attempt currently awaiting confirmation, if any. Reading this from
    /// a component subscribes it to pending-state changes.
    pub fn pending(&self) -> Option<NavigationAttempt> {
        self.pending.cloned()
    }

    /// Whether a confirmation is currently pending.
    pub fn is_pending(&self) -> bool {
        self.pending.read().is_some()
    }
}
