//! Error types for place operations.
//!
//! This module defines structured error types for the place tree, providing
//! context for listener registration failures and other misuses of the place
//! API. Structural inconsistencies that the tree tolerates (removing a place
//! that is not a child, appending a place to itself) are reported through
//! `tracing` warnings instead and are not represented here.

use thiserror::Error;

/// Structured error types for place operations.
#[non_exhaustive]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlaceError {
    /// A listener was built with no reactions at all
    #[error("listener carries no reactions: supply at least one of create, change, remove")]
    NoReactions,
}

impl PlaceError {
    /// Check if this error is related to listener registration
    pub fn is_listener_error(&self) -> bool {
        matches!(self, PlaceError::NoReactions)
    }
}

// Conversion from PlaceError to the main Error type
impl From<PlaceError> for crate::Error {
    fn from(err: PlaceError) -> Self {
        crate::Error::Place(err)
    }
}
