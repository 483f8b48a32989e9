//! Browser integration: the page-unload prompt and back/forward detection.

use gloo::events::EventListener;
use wasm_bindgen::JsCast;
use web_sys::BeforeUnloadEvent;

use crate::error::GuardError;
use crate::interceptor::NavigationInterceptor;

/// Window-level listeners attached for the provider's lifetime. Dropping
/// this detaches them; no interception happens afterwards.
pub(crate) struct WindowListeners {
    _beforeunload: EventListener,
    _popstate: EventListener,
}

impl WindowListeners {
    pub(crate) fn attach(interceptor: &NavigationInterceptor) -> Result<Self, GuardError> {
        let window = web_sys::window()
            .ok_or_else(|| GuardError::Attach("no window object available".to_string()))?;

        let beforeunload = {
            let interceptor = interceptor.clone();
            EventListener::new(&window, "beforeunload", move |event| {
                // Unload cannot await custom confirmation: a non-allowing
                // decision requests the browser's native prompt instead.
                if interceptor.wants_unload_prompt() {
                    if let Some(event) = event.dyn_ref::<BeforeUnloadEvent>() {
                        event.prevent_default();
                        event.set_return_value("");
                    }
                }
            })
        };

        let popstate = {
            let interceptor = interceptor.clone();
            EventListener::new(&window, "popstate", move |_| {
                interceptor.intercept_traversal();
            })
        };

        Ok(Self {
            _beforeunload: beforeunload,
            _popstate: popstate,
        })
    }
}
