use std::rc::Rc;

use dioxus_history::{History, MemoryHistory};
use dioxus_lib::prelude::*;

use crate::contexts::GuardContext;
use crate::error::GuardError;
use crate::history::GuardedHistory;
use crate::interceptor::NavigationInterceptor;
use crate::navigation::NavigationAttempt;

/// Establishes navigation guarding for a subtree.
///
/// On mount the provider wraps the ambient history in a [`GuardedHistory`]
/// and installs it at the root context, so the router and every descendant
/// observe guarded navigation. Descendants register guards through
/// `use_navigation_guard` and friends.
///
/// Place it above your `Router`:
///
/// ```rust, no_run
/// use dioxus::prelude::*;
/// use dioxus_navigation_guard::prelude::*;
///
/// fn app() -> Element {
///     rsx! {
///         NavigationGuardProvider {
///             // Router { .. }
///         }
///     }
/// }
/// ```
///
/// Guard failures are forwarded to `onerror` when supplied, and always
/// logged.
#[component]
pub fn NavigationGuardProvider(
    children: Element,
    onerror: Option<EventHandler<GuardError>>,
) -> Element {
    let pending = use_signal(|| None::<NavigationAttempt>);

    let _guard_context = use_hook(|| {
        let inner = try_consume_context::<Rc<dyn History>>().unwrap_or_else(|| {
            tracing::warn!(
                "no history provider found; navigation guards will only observe in-memory navigation"
            );
            Rc::new(MemoryHistory::default())
        });

        let interceptor = NavigationInterceptor::new(inner);
        interceptor.on_pending_change(move |attempt| {
            let mut pending = pending;
            pending.set(attempt)
        });
        if let Some(onerror) = onerror {
            interceptor.set_error_handler(move |error| onerror.call(error));
        }

        let guarded: Rc<dyn History> = Rc::new(GuardedHistory::new(interceptor.clone()));
        ScopeId::ROOT.provide_context(guarded);

        provide_context(GuardContext::new(interceptor, pending))
    });

    // Window listeners live for the provider's lifetime; dropping the hook
    // value on unmount detaches them.
    #[cfg(feature = "web")]
    use_hook(|| {
        Rc::new(
            match crate::web::WindowListeners::attach(_guard_context.interceptor()) {
                Ok(listeners) => Some(listeners),
                Err(error) => {
                    tracing::warn!("navigation guards cannot observe the window: {error}");
                    None
                }
            },
        )
    });

    rsx! {
        {children}
    }
}
