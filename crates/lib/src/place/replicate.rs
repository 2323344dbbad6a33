//! The replication engine: diffing an incoming value against the held replica.
//!
//! Replication is the single state-transition path for a place's replica.
//! Each pass classifies the transition (create, change, remove or no-op),
//! notifies the place's listeners, and recurses into children with their
//! slice of the new value. Passes run to completion synchronously; requests
//! issued from listener reactions mid-pass are queued per place and executed
//! afterwards.
//!
//! Change detection is shallow by design: scalars compare with `==`, while a
//! composite (object or array) on either side always counts as changed.
//! Detecting meaningful changes *inside* a composite is the responsibility of
//! child places recursing into their own slice.

use tracing::debug;

use super::Place;
use crate::Value;

/// Shallow change policy: scalars by equality, composites always differ.
fn value_changed(before: &Value, after: &Value) -> bool {
    if before.is_object() || before.is_array() || after.is_object() || after.is_array() {
        return true;
    }
    before != after
}

impl Place {
    /// Execute a replication pass with the given value or absent marker.
    pub(crate) fn run_replicate(&self, value: Option<Value>) {
        match value {
            None => self.run_replicate_absent(),
            Some(value) => self.run_replicate_present(value),
        }
    }

    /// Transition to absent: remember the departing value, notify, cascade.
    fn run_replicate_absent(&self) {
        let (departed, listeners, children) = {
            let mut inner = self.inner.borrow_mut();
            let Some(departed) = inner.replica.take() else {
                // Already absent, nothing to do.
                return;
            };
            inner.removed_replica = Some(departed.clone());
            (departed, inner.listeners.clone(), inner.children.clone())
        };
        debug!(place = ?self.name(), "replica removed");

        for listener in &listeners {
            listener.emit_remove(Some(&departed), self);
        }
        // Removal propagates into the whole subtree unconditionally.
        for child in &children {
            child.replicate(None);
        }
    }

    /// Transition to present: classify create/change, notify, recurse.
    fn run_replicate_present(&self, value: Value) {
        let (before, listeners) = {
            let inner = self.inner.borrow();
            (inner.replica.clone(), inner.listeners.clone())
        };

        match &before {
            None => {
                debug!(place = ?self.name(), "replica created");
                for listener in &listeners {
                    listener.emit_create(&value, self);
                }
            }
            Some(before) if value_changed(before, &value) => {
                debug!(place = ?self.name(), "replica changed");
                for listener in &listeners {
                    listener.emit_change(&value, before, self);
                }
            }
            Some(_) => {}
        }

        let children = {
            let mut inner = self.inner.borrow_mut();
            inner.replica = Some(value.clone());
            inner.children.clone()
        };

        // Fields with no attached place are simply not mirrored. Indexing a
        // non-object value (or a missing field) yields the absent marker,
        // which forces a remove transition on a previously present child.
        for child in &children {
            let slice = child
                .name()
                .and_then(|name| value.get(&name).cloned());
            child.replicate(slice);
        }
    }
}
