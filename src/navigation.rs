//! Types describing a single navigation attempt and the guard's verdict.

/// What kind of transition triggered a [`NavigationAttempt`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavigationKind {
    /// A new route was pushed onto the history (e.g. a link click).
    Push,
    /// The current route was replaced in place.
    Replace,
    /// The history moved backwards or forwards (in-app buttons or the
    /// browser's own back/forward controls).
    Traverse,
    /// Navigation to a URL outside the app.
    External,
    /// The page is about to unload (tab close, reload, address bar).
    Unload,
}

impl NavigationKind {
    /// Whether the transition stays within the current document.
    ///
    /// [`External`](Self::External) and [`Unload`](Self::Unload) tear the
    /// document down; everything else is handled by the in-app router.
    pub fn is_same_document(&self) -> bool {
        !matches!(self, Self::External | Self::Unload)
    }
}

/// A single attempted transition, passed to the active guard.
///
/// Attempts are ephemeral: one is built per navigation event and dropped once
/// the decision settles.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavigationAttempt {
    /// The route the app is currently on.
    pub source: String,
    /// The route or URL being navigated to, when known. History traversal
    /// and unload cannot name their destination.
    pub target: Option<String>,
    /// The trigger for this attempt.
    pub kind: NavigationKind,
}

/// A guard's verdict on a [`NavigationAttempt`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    /// Let the transition proceed.
    Allow,
    /// Drop the transition; the user stays on the current page.
    Block,
    /// Block the transition for now and settle later, either through the
    /// handle's `accept`/`reject` actions or an async guard resolving.
    Pending,
}

impl From<bool> for GuardDecision {
    fn from(allow: bool) -> Self {
        if allow {
            Self::Allow
        } else {
            Self::Block
        }
    }
}
