//! Error types.

use thiserror::Error;

/// Errors produced by the fallible variant accessors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum AlternativeError {
    /// The requested alternative is not the active one.
    #[error("alternative {requested} requested but alternative {active} is active")]
    Mismatch {
        /// Position of the requested type in the type list.
        requested: usize,
        /// Position of the active type in the type list.
        active: usize,
    },
}
