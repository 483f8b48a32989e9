//! The navigation interceptor: observes every attempted transition and
//! enforces the registry's decision before it commits.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use dioxus_history::History;

use crate::error::GuardError;
use crate::navigation::{GuardDecision, NavigationAttempt, NavigationKind};
use crate::registry::{GuardRegistry, GuardToken, NavigationGuard};

struct PendingTransition {
    token: GuardToken,
    seq: u64,
    attempt: NavigationAttempt,
    commit: Box<dyn FnOnce()>,
}

#[derive(Default)]
struct InterceptorState {
    pending: Option<PendingTransition>,
    attempt_seq: u64,
    last_committed: String,
    on_pending_change: Option<Rc<dyn Fn(Option<NavigationAttempt>)>>,
    on_error: Option<Rc<dyn Fn(GuardError)>>,
    router_updater: Option<Arc<dyn Fn() + Send + Sync>>,
}

/// Consults the [`GuardRegistry`] on every navigation attempt and blocks,
/// allows, or defers the transition accordingly.
///
/// The interceptor holds at most one pending decision at a time; attempts
/// made while a decision is outstanding are ignored rather than re-invoking
/// the guard. All state lives behind `Rc<RefCell<_>>` and is only touched
/// from the UI thread.
#[derive(Clone)]
pub struct NavigationInterceptor {
    registry: GuardRegistry,
    inner: Rc<dyn History>,
    state: Rc<RefCell<InterceptorState>>,
}

impl NavigationInterceptor {
    /// Create an interceptor enforcing decisions in front of `inner`.
    pub fn new(inner: Rc<dyn History>) -> Self {
        let state = InterceptorState {
            last_committed: inner.current_route(),
            ..Default::default()
        };
        Self {
            registry: GuardRegistry::new(),
            inner,
            state: Rc::new(RefCell::new(state)),
        }
    }

    /// The registry this interceptor consults.
    pub fn registry(&self) -> &GuardRegistry {
        &self.registry
    }

    /// Register `guard` as the active guard.
    pub fn register(&self, guard: NavigationGuard) -> GuardToken {
        self.registry.register(guard)
    }

    /// Unregister `token` and, if that guard owns the outstanding decision,
    /// resolve it as "allow" so teardown never leaves the user trapped on a
    /// page whose guard no longer exists.
    pub fn release(&self, token: GuardToken) {
        self.registry.unregister(token);
        let owns_pending = self
            .state
            .borrow()
            .pending
            .as_ref()
            .map(|pending| pending.token == token)
            .unwrap_or(false);
        if owns_pending {
            self.resolve(true);
        }
    }

    /// Settle the outstanding decision. `allow` re-issues the deferred
    /// transition; `false` drops it and the user stays put. A no-op when no
    /// decision is pending, so resolving twice is harmless.
    pub fn resolve(&self, allow: bool) {
        let Some(transition) = self.state.borrow_mut().pending.take() else {
            return;
        };
        self.notify_pending(None);
        if allow {
            self.commit(transition.commit);
            let updater = self.state.borrow().router_updater.clone();
            if let Some(updater) = updater {
                updater();
            }
        } else {
            tracing::debug!(kind = ?transition.attempt.kind, "deferred navigation rejected");
        }
    }

    /// The attempt currently awaiting a decision, if any.
    pub fn pending_attempt(&self) -> Option<NavigationAttempt> {
        self.state
            .borrow()
            .pending
            .as_ref()
            .map(|pending| pending.attempt.clone())
    }

    /// Decision procedure for one attempted transition. `commit` performs the
    /// transition against the wrapped history when it is allowed.
    pub(crate) fn intercept(&self, attempt: NavigationAttempt, commit: Box<dyn FnOnce()>) {
        if self.state.borrow().pending.is_some() {
            tracing::debug!(
                kind = ?attempt.kind,
                "navigation attempt ignored while a guard decision is pending"
            );
            return;
        }

        let Some((token, guard)) = self.registry.active() else {
            self.commit(commit);
            return;
        };

        let seq = self.next_attempt_seq();
        match guard.invoke(&attempt) {
            Ok(GuardDecision::Allow) => self.commit(commit),
            Ok(GuardDecision::Block) => {
                tracing::debug!(kind = ?attempt.kind, "navigation blocked by guard");
            }
            Ok(GuardDecision::Pending) => {
                self.state.borrow_mut().pending = Some(PendingTransition {
                    token,
                    seq,
                    attempt: attempt.clone(),
                    commit,
                });
                self.notify_pending(Some(attempt));
            }
            Err(error) => self.report(error),
        }
    }

    /// Called when the host environment reports that the history already
    /// moved underneath us (the browser's own back/forward controls). The
    /// move cannot be prevented after the fact, so a blocking decision
    /// re-pushes the last committed route to hold the user in place.
    pub fn intercept_traversal(&self) {
        let current = self.inner.current_route();
        let committed = self.state.borrow().last_committed.clone();
        if current == committed {
            return;
        }

        if self.state.borrow().pending.is_some() {
            // Hold position until the outstanding decision settles.
            self.inner.push(committed);
            return;
        }

        let attempt = NavigationAttempt {
            source: committed.clone(),
            target: Some(current.clone()),
            kind: NavigationKind::Traverse,
        };

        let Some((token, guard)) = self.registry.active() else {
            self.state.borrow_mut().last_committed = current;
            return;
        };

        let seq = self.next_attempt_seq();
        match guard.invoke(&attempt) {
            Ok(GuardDecision::Allow) => {
                self.state.borrow_mut().last_committed = current;
            }
            Ok(GuardDecision::Block) => {
                tracing::debug!("history traversal blocked by guard");
                self.inner.push(committed);
            }
            Ok(GuardDecision::Pending) => {
                self.inner.push(committed);
                let inner = self.inner.clone();
                self.state.borrow_mut().pending = Some(PendingTransition {
                    token,
                    seq,
                    attempt: attempt.clone(),
                    commit: Box::new(move || inner.push(current)),
                });
                self.notify_pending(Some(attempt));
            }
            Err(error) => {
                self.inner.push(committed);
                self.report(error);
            }
        }
    }

    /// Unload-kind decision: only a synchronous block is possible, so both
    /// `Block` and `Pending` (and guard errors) request the browser's native
    /// confirmation prompt. Returns `false` when leaving is fine.
    pub fn wants_unload_prompt(&self) -> bool {
        if self.state.borrow().pending.is_some() {
            return true;
        }
        let Some((_, guard)) = self.registry.active() else {
            return false;
        };
        let attempt = NavigationAttempt {
            source: self.inner.current_route(),
            target: None,
            kind: NavigationKind::Unload,
        };
        match guard.invoke(&attempt) {
            Ok(GuardDecision::Allow) => false,
            Ok(GuardDecision::Block) | Ok(GuardDecision::Pending) => true,
            Err(error) => {
                self.report(error);
                true
            }
        }
    }

    /// Sequence number of the consultation currently (or most recently) in
    /// progress. A guard deferring its decision captures this and presents it
    /// to [`resolve_deferred`](Self::resolve_deferred).
    pub(crate) fn deferral_seq(&self) -> u64 {
        self.state.borrow().attempt_seq
    }

    /// Settle the outstanding decision only if it still belongs to the
    /// consultation identified by `seq`. An answer computed for an attempt
    /// that was already settled (and possibly superseded) is discarded.
    pub(crate) fn resolve_deferred(&self, seq: u64, allow: bool) {
        let current = self.state.borrow().pending.as_ref().map(|pending| pending.seq);
        if current == Some(seq) {
            self.resolve(allow);
        } else {
            tracing::debug!("stale deferred decision ignored");
        }
    }

    fn next_attempt_seq(&self) -> u64 {
        let mut state = self.state.borrow_mut();
        state.attempt_seq += 1;
        state.attempt_seq
    }

    pub(crate) fn inner(&self) -> Rc<dyn History> {
        self.inner.clone()
    }

    /// Observe pending-state changes; the provider uses this to mirror the
    /// pending attempt into a signal.
    pub(crate) fn on_pending_change(&self, callback: impl Fn(Option<NavigationAttempt>) + 'static) {
        self.state.borrow_mut().on_pending_change = Some(Rc::new(callback));
    }

    /// Route guard failures to a host-supplied channel instead of only the
    /// log.
    pub(crate) fn set_error_handler(&self, handler: impl Fn(GuardError) + 'static) {
        self.state.borrow_mut().on_error = Some(Rc::new(handler));
    }

    pub(crate) fn set_router_updater(&self, updater: Arc<dyn Fn() + Send + Sync>) {
        self.state.borrow_mut().router_updater = Some(updater);
    }

    fn commit(&self, commit: Box<dyn FnOnce()>) {
        commit();
        self.state.borrow_mut().last_committed = self.inner.current_route();
    }

    fn notify_pending(&self, attempt: Option<NavigationAttempt>) {
        let callback = self.state.borrow().on_pending_change.clone();
        if let Some(callback) = callback {
            callback(attempt);
        }
    }

    fn report(&self, error: GuardError) {
        tracing::error!("navigation guard failed, blocking navigation: {error}");
        let handler = self.state.borrow().on_error.clone();
        if let Some(handler) = handler {
            handler(error);
        }
    }
}
