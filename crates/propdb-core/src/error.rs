//! Core error types.

use thiserror::Error;

/// Core database errors.
///
/// An unknown entity or attribute is not an error: lookups return empty
/// maps or `None` so callers can treat "no matches" as ordinary data.
#[derive(Debug, Error)]
pub enum Error {
    /// A required argument was invalid; raised before any I/O.
    #[error("invalid argument: {0}")]
    Validation(String),

    /// A spatial query was attempted but locations were never embedded.
    #[error("fragment locations have not been embedded")]
    FeatureUnavailable,

    /// Backing store failure, propagated unmodified.
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// Operation attempted on a released handle; raised before any I/O.
    #[error("store handle has been released")]
    Released,

    /// The parent chain of an entity loops back on itself.
    #[error("parent pointer cycle through entity {0}")]
    ParentCycle(i64),
}
