//! Failure conditions of the resolution pipeline.

use thiserror::Error;

/// Boxed error used by builders and hooks to report their own failures.
///
/// The resolver never inspects or replaces these: whatever a builder or hook
/// returns is what the triggering field read fails with.
pub type BoxError = Box<dyn std::error::Error>;

/// Errors surfaced while resolving a field of an [`Instance`](crate::Instance).
#[derive(Debug, Error)]
pub enum ResolveError {
    /// A field was read while its own builder was still running on the same
    /// instance. The path lists the in-flight fields from the outermost read
    /// down to the repeated one, e.g. `["a", "b", "a"]`.
    #[error("cyclic resolution: {}", .path.join(" -> "))]
    Cycle { path: Vec<String> },

    /// A field with no registered builder was required.
    #[error("no builder registered for `{0}`")]
    Unknown(String),

    /// A builder or hook reported a failure of its own.
    #[error("{0}")]
    Failed(#[from] BoxError),
}

impl ResolveError {
    /// Wrap a builder- or hook-level failure.
    ///
    /// Accepts anything convertible into a [`BoxError`], including plain
    /// message strings.
    pub fn failed(reason: impl Into<BoxError>) -> Self {
        Self::Failed(reason.into())
    }
}

/// Result alias used throughout the crate.
pub type Result<T, E = ResolveError> = std::result::Result<T, E>;
