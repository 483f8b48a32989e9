#![allow(non_snake_case)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use dioxus::dioxus_core::NoOpMutations;
use dioxus::prelude::*;
use dioxus_history::{History, MemoryHistory};
use dioxus_navigation_guard::prelude::*;

thread_local! {
    static HANDLE: RefCell<Option<NavigationGuardHandle>> = RefCell::new(None);
    static CONTEXT: RefCell<Option<GuardContext>> = RefCell::new(None);
    static ERROR_SEEN: Cell<bool> = Cell::new(false);
}

/// Drive tasks and renders until `settled` holds or the timeout elapses.
async fn drive_until(dom: &mut VirtualDom, mut settled: impl FnMut(&VirtualDom) -> bool) {
    let _ = tokio::time::timeout(Duration::from_millis(500), async {
        while !settled(dom) {
            dom.wait_for_work().await;
            dom.render_immediate(&mut NoOpMutations);
        }
    })
    .await;
}

/// Mount `app` with a fresh in-memory history installed at the root, the way
/// a platform renderer would.
fn mount(app: fn() -> Element) -> (Rc<MemoryHistory>, VirtualDom) {
    let history = Rc::new(MemoryHistory::with_initial_path("/"));
    let mut dom = VirtualDom::new(app);
    let platform: Rc<dyn History> = history.clone();
    dom.in_runtime(|| {
        ScopeId::ROOT.provide_context(platform);
    });
    dom.rebuild_in_place();
    (history, dom)
}

fn guarded_history(dom: &VirtualDom) -> Rc<dyn History> {
    dom.in_runtime(|| ScopeId::ROOT.consume_context::<Rc<dyn History>>())
        .expect("provider installs a history at the root")
}

#[component]
fn Blocker() -> Element {
    let _guard = use_navigation_guard(|_| GuardDecision::Block);
    VNode::empty()
}

#[component]
fn Deferrer() -> Element {
    let guard = use_navigation_guard(|_| GuardDecision::Pending);
    HANDLE.with(|slot| *slot.borrow_mut() = Some(guard.clone()));
    VNode::empty()
}

#[component]
fn Navigate(to: String) -> Element {
    let history = use_context::<Rc<dyn History>>();
    use_hook(move || history.push(to));
    VNode::empty()
}

#[test]
fn blocking_guard_keeps_the_user_on_the_current_page() {
    fn app() -> Element {
        rsx! {
            NavigationGuardProvider {
                Blocker {}
                Navigate { to: "/away" }
            }
        }
    }

    let (history, _dom) = mount(app);
    assert_eq!(history.current_route(), "/");
}

#[test]
fn allowing_guard_lets_navigation_complete() {
    #[component]
    fn Allower() -> Element {
        let _guard = use_navigation_guard(|_| GuardDecision::Allow);
        VNode::empty()
    }

    fn app() -> Element {
        rsx! {
            NavigationGuardProvider {
                Allower {}
                Navigate { to: "/away" }
            }
        }
    }

    let (history, _dom) = mount(app);
    assert_eq!(history.current_route(), "/away");
}

#[test]
fn navigation_without_a_guard_is_a_passthrough() {
    fn app() -> Element {
        rsx! {
            NavigationGuardProvider {
                Navigate { to: "/away" }
            }
        }
    }

    let (history, _dom) = mount(app);
    assert_eq!(history.current_route(), "/away");
}

#[test]
fn unmounting_the_guard_stops_interception() {
    fn app() -> Element {
        let visible = generation() == 0;
        rsx! {
            NavigationGuardProvider {
                if visible {
                    Blocker {}
                }
            }
        }
    }

    let (history, mut dom) = mount(app);
    let guarded = guarded_history(&dom);

    dom.in_runtime(|| guarded.push("/away".to_string()));
    assert_eq!(history.current_route(), "/");

    dom.mark_dirty(ScopeId::APP);
    dom.render_immediate(&mut NoOpMutations);

    dom.in_runtime(|| guarded.push("/away".to_string()));
    assert_eq!(history.current_route(), "/away");
}

#[test]
fn unmounting_during_a_pending_decision_resolves_allow() {
    fn app() -> Element {
        let visible = generation() == 0;
        rsx! {
            NavigationGuardProvider {
                if visible {
                    Deferrer {}
                }
            }
        }
    }

    let (history, mut dom) = mount(app);
    let guarded = guarded_history(&dom);

    dom.in_runtime(|| guarded.push("/away".to_string()));
    assert_eq!(history.current_route(), "/");

    // The guard unmounts with its decision still outstanding: the held
    // navigation must complete rather than trapping the user.
    dom.mark_dirty(ScopeId::APP);
    dom.render_immediate(&mut NoOpMutations);
    assert_eq!(history.current_route(), "/away");
}

#[test]
fn accept_commits_the_held_navigation() {
    fn app() -> Element {
        rsx! {
            NavigationGuardProvider {
                Deferrer {}
            }
        }
    }

    let (history, dom) = mount(app);
    let guarded = guarded_history(&dom);

    dom.in_runtime(|| guarded.push("/away".to_string()));
    assert_eq!(history.current_route(), "/");

    let handle = HANDLE.with(|slot| slot.borrow().clone()).unwrap();
    dom.in_runtime(|| {
        assert!(handle.is_pending());
        assert_eq!(
            handle.pending().unwrap().target.as_deref(),
            Some("/away")
        );
        handle.accept();
        assert!(!handle.is_pending());
    });
    assert_eq!(history.current_route(), "/away");
}

#[test]
fn reject_keeps_the_user_in_place() {
    fn app() -> Element {
        rsx! {
            NavigationGuardProvider {
                Deferrer {}
            }
        }
    }

    let (history, dom) = mount(app);
    let guarded = guarded_history(&dom);

    dom.in_runtime(|| guarded.push("/away".to_string()));
    let handle = HANDLE.with(|slot| slot.borrow().clone()).unwrap();
    dom.in_runtime(|| {
        handle.reject();
        assert!(!handle.is_pending());
        // Settling twice has no further effect.
        handle.accept();
    });
    assert_eq!(history.current_route(), "/");
}

#[tokio::test]
async fn async_guard_blocks_immediately_then_commits() {
    #[component]
    fn AsyncEditor() -> Element {
        let guard = use_async_navigation_guard(|_| async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            true
        });
        // Subscribe to the pending state so resolution re-renders us.
        let _pending = guard.is_pending();
        VNode::empty()
    }

    fn app() -> Element {
        rsx! {
            NavigationGuardProvider {
                AsyncEditor {}
                Navigate { to: "/away" }
            }
        }
    }

    let (history, mut dom) = mount(app);
    assert_eq!(history.current_route(), "/");

    drive_until(&mut dom, |_| history.current_route() != "/").await;
    assert_eq!(history.current_route(), "/away");
}

#[tokio::test]
async fn late_async_decision_cannot_settle_a_newer_attempt() {
    #[component]
    fn SlowSelectiveGuard() -> Element {
        let guard = use_async_navigation_guard(|attempt: NavigationAttempt| {
            let allow = attempt.target.as_deref() == Some("/a");
            async move {
                tokio::time::sleep(Duration::from_millis(10)).await;
                allow
            }
        });
        HANDLE.with(|slot| *slot.borrow_mut() = Some(guard.clone()));
        VNode::empty()
    }

    fn app() -> Element {
        rsx! {
            NavigationGuardProvider {
                SlowSelectiveGuard {}
            }
        }
    }

    let (history, mut dom) = mount(app);
    let guarded = guarded_history(&dom);

    // The user rejects /a through the handle while its decision is still
    // being computed, then heads for /b instead.
    dom.in_runtime(|| guarded.push("/a".to_string()));
    let handle = HANDLE.with(|slot| slot.borrow().clone()).unwrap();
    dom.in_runtime(|| handle.reject());
    dom.in_runtime(|| guarded.push("/b".to_string()));

    // Let both decisions land: the late "allow /a" answer must not commit
    // /b, and /b's own answer drops it.
    drive_until(&mut dom, |dom| dom.in_runtime(|| !handle.is_pending())).await;
    assert_eq!(history.current_route(), "/");

    dom.in_runtime(|| guarded.push("/a".to_string()));
    drive_until(&mut dom, |_| history.current_route() != "/").await;
    assert_eq!(history.current_route(), "/a");
}

#[test]
fn guard_failures_reach_the_error_channel() {
    #[component]
    fn FailingGuard() -> Element {
        let context = use_guard_context();
        use_hook(move || {
            context.register(NavigationGuard::fallible(|_| {
                Err(GuardError::Invocation("guard lost its state".to_string()))
            }))
        });
        VNode::empty()
    }

    fn app() -> Element {
        rsx! {
            NavigationGuardProvider {
                onerror: move |_| ERROR_SEEN.with(|seen| seen.set(true)),
                FailingGuard {}
                Navigate { to: "/away" }
            }
        }
    }

    let (history, _dom) = mount(app);
    assert_eq!(history.current_route(), "/");
    assert!(ERROR_SEEN.with(|seen| seen.get()));
}

#[test]
fn guard_can_be_released_imperatively_by_token() {
    #[component]
    fn TokenBlocker() -> Element {
        let context = use_guard_context();
        let guard = use_navigation_guard(|_| GuardDecision::Block);
        CONTEXT.with(|slot| *slot.borrow_mut() = Some(context));
        HANDLE.with(|slot| *slot.borrow_mut() = Some(guard));
        VNode::empty()
    }

    fn app() -> Element {
        rsx! {
            NavigationGuardProvider {
                TokenBlocker {}
            }
        }
    }

    let (history, dom) = mount(app);
    let guarded = guarded_history(&dom);

    dom.in_runtime(|| guarded.push("/away".to_string()));
    assert_eq!(history.current_route(), "/");

    let context = CONTEXT.with(|slot| slot.borrow().clone()).unwrap();
    let handle = HANDLE.with(|slot| slot.borrow().clone()).unwrap();
    dom.in_runtime(|| context.release(handle.token()));

    dom.in_runtime(|| guarded.push("/away".to_string()));
    assert_eq!(history.current_route(), "/away");
}

#[test]
fn provider_renders_its_children() {
    fn app() -> Element {
        rsx! {
            NavigationGuardProvider {
                div { "guarded content" }
            }
        }
    }

    let mut dom = VirtualDom::new(app);
    dom.rebuild_in_place();
    assert!(dioxus_ssr::render(&dom).contains("guarded content"));
}
