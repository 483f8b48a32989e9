use thiserror::Error;

/// Errors surfaced by the guard machinery.
///
/// None of these are fatal to the host application: a failed guard blocks the
/// transition it was asked about, and a failed attach leaves navigation
/// unguarded (with a logged warning) rather than broken.
#[derive(Clone, Debug, Error)]
pub enum GuardError {
    /// The registered guard callback failed. Treated as a blocking decision
    /// so a buggy guard cannot cause accidental data loss.
    #[error("navigation guard failed: {0}")]
    Invocation(String),

    /// The interceptor could not attach to the host environment's navigation
    /// signals (e.g. no `window` object).
    #[error("could not attach to navigation events: {0}")]
    Attach(String),
}
