use std::future::Future;

use dioxus_lib::prelude::*;

use crate::contexts::GuardContext;
use crate::navigation::{GuardDecision, NavigationAttempt, NavigationKind};
use crate::registry::{GuardToken, NavigationGuard};

/// Access the [`GuardContext`] established by the nearest
/// `NavigationGuardProvider`.
#[must_use]
pub fn use_guard_context() -> GuardContext {
    use_hook(|| {
        try_consume_context::<GuardContext>()
            .expect("must be called in a descendant of a NavigationGuardProvider component")
    })
}

/// Registration handle returned by the guard hooks.
///
/// Exposes the pending-confirmation state plus the imperative actions that
/// settle it. Reading [`is_pending`](Self::is_pending) (or
/// [`pending`](Self::pending)) from a component subscribes it to changes, so
/// a confirmation dialog rendered from it shows and hides itself.
#[derive(Clone)]
pub struct NavigationGuardHandle {
    context: GuardContext,
    token: GuardToken,
}

impl NavigationGuardHandle {
    /// The attempt currently awaiting confirmation, if any.
    pub fn pending(&self) -> Option<NavigationAttempt> {
        self.context.pending()
    }

    /// Whether a navigation is currently held for confirmation.
    pub fn is_pending(&self) -> bool {
        self.context.is_pending()
    }

    /// Let the held navigation proceed.
    pub fn accept(&self) {
        self.context.resolve(true);
    }

    /// Drop the held navigation; the user stays on the current page.
    pub fn reject(&self) {
        self.context.resolve(false);
    }

    /// The token identifying this registration.
    pub fn token(&self) -> GuardToken {
        self.token
    }
}

/// Register a navigation guard for the lifetime of this component.
///
/// The guard is invoked once per navigation attempt and decides whether the
/// transition proceeds. It is captured on first render and unregistered when
/// the component unmounts; if a deferred decision is still outstanding at
/// that point it resolves as "allow", so unmounting never leaves the user
/// stuck.
///
/// ```rust, no_run
/// use dioxus::prelude::*;
/// use dioxus_navigation_guard::prelude::*;
///
/// #[component]
/// fn Editor() -> Element {
///     let mut dirty = use_signal(|| false);
///     let guard = use_navigation_guard(move |_| {
///         if dirty() { GuardDecision::Pending } else { GuardDecision::Allow }
///     });
///
///     let stay = guard.clone();
///     rsx! {
///         if guard.is_pending() {
///             button { onclick: move |_| guard.accept(), "Leave" }
///             button { onclick: move |_| stay.reject(), "Stay" }
///         }
///     }
/// }
/// ```
#[must_use]
pub fn use_navigation_guard(
    guard: impl FnMut(&NavigationAttempt) -> GuardDecision + 'static,
) -> NavigationGuardHandle {
    let context = use_guard_context();
    register_for_lifetime(context, NavigationGuard::new(guard))
}

/// Register a guard whose decision is computed asynchronously.
///
/// Any attempt the future is spawned for is blocked immediately; the deferred
/// decision settles when the future completes (`true` commits the navigation,
/// `false` drops it). An answer that arrives after its attempt was already
/// settled through the handle is discarded, so a slow decision can never
/// commit a later navigation. Page unload cannot await a future, so `Unload`
/// attempts are answered with a synchronous block, which requests the
/// browser's native prompt instead.
#[must_use]
pub fn use_async_navigation_guard<F>(
    mut guard: impl FnMut(NavigationAttempt) -> F + 'static,
) -> NavigationGuardHandle
where
    F: Future<Output = bool> + 'static,
{
    let context = use_guard_context();
    // Window listeners invoke guards from outside any component scope, so the
    // decision future is spawned on this hook's own scope.
    let (runtime, scope) = use_hook(|| {
        (
            Runtime::current()
                .expect("use_async_navigation_guard must be called from within a component"),
            current_scope_id()
                .expect("use_async_navigation_guard must be called from within a component"),
        )
    });
    let interceptor = context.interceptor().clone();
    register_for_lifetime(
        context,
        NavigationGuard::new(move |attempt| {
            if attempt.kind == NavigationKind::Unload {
                return GuardDecision::Block;
            }
            let decide = guard(attempt.clone());
            let interceptor = interceptor.clone();
            let seq = interceptor.deferral_seq();
            runtime.on_scope(scope, || {
                spawn(async move {
                    interceptor.resolve_deferred(seq, decide.await);
                });
            });
            GuardDecision::Pending
        }),
    )
}

fn register_for_lifetime(context: GuardContext, guard: NavigationGuard) -> NavigationGuardHandle {
    let token = use_hook(|| context.register(guard));
    use_drop({
        let context = context.clone();
        move || context.release(token)
    });
    NavigationGuardHandle { context, token }
}
