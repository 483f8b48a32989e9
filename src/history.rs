//! A [`History`] decorator that funnels every mutation through the
//! [`NavigationInterceptor`].

use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;

use dioxus_history::History;

use crate::interceptor::NavigationInterceptor;
use crate::navigation::{NavigationAttempt, NavigationKind};

/// Wraps the ambient history so the router's transitions are run past the
/// active guard before they commit.
///
/// Reads delegate straight to the wrapped history; mutations are deferred,
/// dropped, or committed according to the guard's decision. The provider
/// installs one of these in place of the platform history, so the host router
/// never needs to know guards exist.
pub struct GuardedHistory {
    interceptor: NavigationInterceptor,
}

impl GuardedHistory {
    /// Wrap the interceptor's inner history.
    pub fn new(interceptor: NavigationInterceptor) -> Self {
        Self { interceptor }
    }

    /// The interceptor enforcing decisions for this history.
    pub fn interceptor(&self) -> &NavigationInterceptor {
        &self.interceptor
    }

    fn attempt(&self, target: Option<String>, kind: NavigationKind) -> NavigationAttempt {
        NavigationAttempt {
            source: self.interceptor.inner().current_route(),
            target,
            kind,
        }
    }
}

impl History for GuardedHistory {
    fn current_route(&self) -> String {
        self.interceptor.inner().current_route()
    }

    fn current_prefix(&self) -> Option<String> {
        self.interceptor.inner().current_prefix()
    }

    fn can_go_back(&self) -> bool {
        self.interceptor.inner().can_go_back()
    }

    fn can_go_forward(&self) -> bool {
        self.interceptor.inner().can_go_forward()
    }

    fn go_back(&self) {
        let inner = self.interceptor.inner();
        let attempt = self.attempt(None, NavigationKind::Traverse);
        self.interceptor
            .intercept(attempt, Box::new(move || inner.go_back()));
    }

    fn go_forward(&self) {
        let inner = self.interceptor.inner();
        let attempt = self.attempt(None, NavigationKind::Traverse);
        self.interceptor
            .intercept(attempt, Box::new(move || inner.go_forward()));
    }

    fn push(&self, route: String) {
        let inner = self.interceptor.inner();
        let attempt = self.attempt(Some(route.clone()), NavigationKind::Push);
        self.interceptor
            .intercept(attempt, Box::new(move || inner.push(route)));
    }

    fn replace(&self, path: String) {
        let inner = self.interceptor.inner();
        let attempt = self.attempt(Some(path.clone()), NavigationKind::Replace);
        self.interceptor
            .intercept(attempt, Box::new(move || inner.replace(path)));
    }

    fn external(&self, url: String) -> bool {
        let inner = self.interceptor.inner();
        let attempt = self.attempt(Some(url.clone()), NavigationKind::External);
        // A blocked or deferred external navigation is still "handled": the
        // router must not fall back to its own external handling.
        let handled = Rc::new(Cell::new(true));
        let result = handled.clone();
        self.interceptor.intercept(
            attempt,
            Box::new(move || result.set(inner.external(url))),
        );
        handled.get()
    }

    fn updater(&self, callback: Arc<dyn Fn() + Send + Sync>) {
        // Keep a copy so deferred commits can wake the router once they land.
        self.interceptor.set_router_updater(callback.clone());
        self.interceptor.inner().updater(callback);
    }
}
