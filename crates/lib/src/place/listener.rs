//! Listener records and notification dispatch.
//!
//! A [`Listener`] carries any subset of three reactions:
//!
//! - **create**: the place's replica transitioned from absent to present
//! - **change**: the replica was present and received a different value
//! - **remove**: the replica transitioned from present to absent
//!
//! Reactions a listener does not carry are silently skipped during dispatch.
//! Listeners are built through [`ListenerBuilder`], which rejects a record
//! with no reactions at all, and registered with [`Place::listen`] as
//! `Rc<Listener>`. Listener identity is `Rc` pointer identity: the same
//! `Rc<Listener>` can be registered at several places independently and
//! [`Place::forget`] removes exactly the registrations sharing that pointer.
//!
//! [`Place::listen`]: super::Place::listen
//! [`Place::forget`]: super::Place::forget

use std::{fmt, rc::Rc};

use super::Place;
use crate::{Value, place::PlaceError};

type CreateReaction = Box<dyn Fn(&Value, &Place)>;
type ChangeReaction = Box<dyn Fn(&Value, &Value, &Place)>;
type RemoveReaction = Box<dyn Fn(Option<&Value>, &Place)>;

/// An observer of one place's create/change/remove transitions.
///
/// Reactions run synchronously during the replication pass (or the `listen`
/// replay) that triggers them. A reaction may call back into the tree; such
/// requests are queued per place and executed after the triggering pass has
/// fully unwound. A panicking reaction unwinds through the dispatch loop and
/// aborts notification of the remaining listeners for that event.
pub struct Listener {
    on_create: Option<CreateReaction>,
    on_change: Option<ChangeReaction>,
    on_remove: Option<RemoveReaction>,
}

impl Listener {
    /// Start building a listener.
    pub fn builder() -> ListenerBuilder {
        ListenerBuilder::default()
    }

    /// True if this listener reacts to create transitions.
    pub fn reacts_to_create(&self) -> bool {
        self.on_create.is_some()
    }

    /// True if this listener reacts to change transitions.
    pub fn reacts_to_change(&self) -> bool {
        self.on_change.is_some()
    }

    /// True if this listener reacts to remove transitions.
    pub fn reacts_to_remove(&self) -> bool {
        self.on_remove.is_some()
    }

    pub(crate) fn emit_create(&self, created: &Value, place: &Place) {
        if let Some(reaction) = &self.on_create {
            reaction(created, place);
        }
    }

    pub(crate) fn emit_change(&self, after: &Value, before: &Value, place: &Place) {
        if let Some(reaction) = &self.on_change {
            reaction(after, before, place);
        }
    }

    pub(crate) fn emit_remove(&self, removed: Option<&Value>, place: &Place) {
        if let Some(reaction) = &self.on_remove {
            reaction(removed, place);
        }
    }
}

// Manual Debug impl required because boxed reactions are not Debug.
impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("create", &self.on_create.is_some())
            .field("change", &self.on_change.is_some())
            .field("remove", &self.on_remove.is_some())
            .finish()
    }
}

/// Builder for [`Listener`].
///
/// ```
/// use placetree::{Listener, Place, Value};
///
/// let listener = Listener::builder()
///     .on_create(|created: &Value, _place: &Place| println!("created: {created}"))
///     .on_remove(|_removed, _place| println!("removed"))
///     .build()
///     .unwrap();
/// ```
#[derive(Default)]
pub struct ListenerBuilder {
    on_create: Option<CreateReaction>,
    on_change: Option<ChangeReaction>,
    on_remove: Option<RemoveReaction>,
}

impl ListenerBuilder {
    /// React to the replica appearing, with the created value.
    pub fn on_create(mut self, reaction: impl Fn(&Value, &Place) + 'static) -> Self {
        self.on_create = Some(Box::new(reaction));
        self
    }

    /// React to the replica changing, with the value after and before.
    pub fn on_change(mut self, reaction: impl Fn(&Value, &Value, &Place) + 'static) -> Self {
        self.on_change = Some(Box::new(reaction));
        self
    }

    /// React to the replica disappearing, with the departing value.
    ///
    /// The value is `None` when the place was never populated, which happens
    /// when the listener registers on an absent place with no removal history.
    pub fn on_remove(mut self, reaction: impl Fn(Option<&Value>, &Place) + 'static) -> Self {
        self.on_remove = Some(Box::new(reaction));
        self
    }

    /// Finish the listener.
    ///
    /// # Errors
    /// Returns [`PlaceError::NoReactions`] if no reaction was supplied.
    pub fn build(self) -> crate::Result<Rc<Listener>> {
        if self.on_create.is_none() && self.on_change.is_none() && self.on_remove.is_none() {
            return Err(PlaceError::NoReactions.into());
        }
        Ok(Rc::new(Listener {
            on_create: self.on_create,
            on_change: self.on_change,
            on_remove: self.on_remove,
        }))
    }
}

impl fmt::Debug for ListenerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerBuilder")
            .field("create", &self.on_create.is_some())
            .field("change", &self.on_change.is_some())
            .field("remove", &self.on_remove.is_some())
            .finish()
    }
}
