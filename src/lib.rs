#![doc = include_str!("../README.md")]
#![deny(missing_docs)]
#![allow(non_snake_case)]

mod error;
pub use error::GuardError;

mod navigation;
pub use navigation::{GuardDecision, NavigationAttempt, NavigationKind};

mod registry;
pub use registry::{GuardRegistry, GuardToken, NavigationGuard};

mod interceptor;
pub use interceptor::NavigationInterceptor;

mod history;
pub use history::GuardedHistory;

#[cfg(feature = "web")]
mod web;

/// Components establishing navigation guarding for a subtree.
pub mod components {
    mod provider;
    pub use provider::*;
}

mod contexts {
    pub(crate) mod guard;
    pub use guard::*;
}

/// Hooks for registering guards and driving confirmation UI.
pub mod hooks {
    mod use_navigation_guard;
    pub use use_navigation_guard::*;
}

/// A collection of useful items most applications might need.
pub mod prelude {
    pub use crate::components::*;
    pub use crate::contexts::*;
    pub use crate::hooks::*;
    pub use crate::navigation::*;
    pub use crate::registry::{GuardToken, NavigationGuard};
    pub use crate::GuardError;
}
