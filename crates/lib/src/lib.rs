//!
//! Placetree: a client-side mirror of a server-controlled hierarchical value.
//!
//! A tree of named [`Place`]s holds the last value replicated from the server
//! side and notifies registered listeners of create, change and remove
//! transitions as new values arrive.
//!
//! ## Core Concepts
//!
//! * **Places (`place::Place`)**: Nodes of the mirror tree. Each place holds the
//!   slice of the server value that was last replicated to it, or nothing if the
//!   slice is currently absent.
//! * **Replication (`Place::replicate`)**: The single state-transition entry
//!   point. An incoming value (or the absent marker, `None`) is diffed against
//!   the held replica, listeners are notified, and the value is propagated into
//!   child places by field name.
//! * **Listeners (`place::Listener`)**: Observer records carrying any subset of
//!   create/change/remove reactions. Late registrations replay the current
//!   state so every listener starts from a known value.
//! * **Command queue**: All structural mutation (`listen`, `forget`, `append`,
//!   `remove`, `replicate`) is requested through a per-place queue so that a
//!   listener reacting mid-replication cannot re-enter the pass it is being
//!   notified from.
//! * **Watch channels (`Place::watch`)**: A `tokio::sync::watch` adapter that
//!   replays the latest value to every new subscriber.
//!
//! Values are JSON-like ([`serde_json::Value`], re-exported as [`Value`]).
//! Absence is expressed as `Option::None`, which is distinct from a present
//! `Value::Null`.
//!
//! The tree is single-threaded: `Place` is an `Rc`-based handle and is neither
//! `Send` nor `Sync`.

pub mod path;
pub mod place;
mod watch;

/// Re-export of the `Place` handle for easier access.
pub use place::{Listener, ListenerBuilder, Place};

/// The JSON-like value type replicated through the tree.
///
/// Re-exported from `serde_json` so client code doesn't need to add it as a
/// separate dependency.
pub use serde_json::Value;

/// Result type used throughout the placetree library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the placetree library.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Structured place errors from the place module
    #[error(transparent)]
    Place(place::PlaceError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Place(_) => "place",
        }
    }

    /// Check if this error indicates a listener without any reactions.
    pub fn is_listener_error(&self) -> bool {
        match self {
            Error::Place(place_err) => place_err.is_listener_error(),
        }
    }
}
