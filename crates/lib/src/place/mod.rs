//! The place tree: named nodes mirroring slices of a server-side value.
//!
//! A [`Place`] is one node of a client-side tree that mirrors a hierarchical
//! server-controlled value. Each place holds the slice of that value which was
//! last replicated to it (its *replica*, absent until first populated), a set
//! of listeners observing create/change/remove transitions, and children that
//! mirror the named fields of its own slice.
//!
//! `Place` is a cheap `Rc`-based handle; cloning it clones the handle, not the
//! node. The tree is single-threaded and the handle is neither `Send` nor
//! `Sync`. Structural mutation goes through a per-place command queue so that
//! listener reactions triggered inside a replication pass cannot re-enter it.
//!
//! # Usage
//!
//! ```
//! use placetree::{Listener, Place};
//! use serde_json::json;
//!
//! let root = Place::root();
//! let listener = Listener::builder()
//!     .on_change(|after, before, _place| println!("{before} -> {after}"))
//!     .build()
//!     .unwrap();
//! root.listen(&listener, Some("user.name"));
//!
//! root.replicate(json!({ "user": { "name": "Alice" } }));
//! root.replicate(json!({ "user": { "name": "Bob" } })); // prints "Alice" -> "Bob"
//! ```

use std::{cell::RefCell, collections::VecDeque, fmt, rc::Rc};

use tracing::warn;

use crate::{Value, path};

mod command;
pub mod errors;
mod listener;
mod replicate;

pub use errors::PlaceError;
pub use listener::{Listener, ListenerBuilder};

use command::{Command, QueueState};

/// Interior state of one tree node, shared behind `Rc<RefCell<..>>`.
struct PlaceInner {
    /// Name within the parent's slice; `None` only for a root
    name: Option<String>,
    /// Last value replicated to this place, `None` while absent
    replica: Option<Value>,
    /// Value held immediately before the replica last became absent
    removed_replica: Option<Value>,
    /// Child places; membership significant, order not
    children: Vec<Place>,
    /// Registered observers, in registration order
    listeners: Vec<Rc<Listener>>,
    /// Drain status of the command queue
    state: QueueState,
    /// Pending mutation requests, FIFO
    postponed: VecDeque<Command>,
}

/// Handle to one node of the mirror tree.
///
/// All mutating operations (`replicate`, `append`, `remove`, `listen`,
/// `forget`) are requests: they execute immediately when the place is idle
/// and are queued behind an in-progress pass otherwise, so a request issued
/// from within a listener reaction runs exactly once, after the triggering
/// pass completes. [`resolve`](Place::resolve) and the accessors are plain
/// queries and always execute immediately.
#[derive(Clone)]
pub struct Place {
    inner: Rc<RefCell<PlaceInner>>,
}

impl Place {
    /// Create an unnamed root place with no replica.
    pub fn root() -> Self {
        Self::construct(None, None)
    }

    /// Create a named place with no replica.
    pub fn new(name: impl Into<String>) -> Self {
        Self::construct(Some(name.into()), None)
    }

    /// Create a named place holding an initial replica.
    ///
    /// The initial value is installed without notification; it represents
    /// state the caller already knows rather than a replication event.
    pub fn with_replica(name: impl Into<String>, replica: Value) -> Self {
        Self::construct(Some(name.into()), Some(replica))
    }

    fn construct(name: Option<String>, replica: Option<Value>) -> Self {
        Place {
            inner: Rc::new(RefCell::new(PlaceInner {
                name,
                replica,
                removed_replica: None,
                children: Vec::new(),
                listeners: Vec::new(),
                state: QueueState::Idle,
                postponed: VecDeque::new(),
            })),
        }
    }

    /// This place's name within its parent's slice, `None` for a root.
    pub fn name(&self) -> Option<String> {
        self.inner.borrow().name.clone()
    }

    /// Snapshot of the current replica, `None` while absent.
    pub fn replica(&self) -> Option<Value> {
        self.inner.borrow().replica.clone()
    }

    /// Snapshot of the value held immediately before the replica last became
    /// absent, `None` if the place was never populated.
    pub fn removed_replica(&self) -> Option<Value> {
        self.inner.borrow().removed_replica.clone()
    }

    /// True when both handles refer to the same node.
    pub fn same(&self, other: &Place) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Get the descendant under `path`, creating missing intermediate places.
    ///
    /// `None` (or a path with no segments, such as `""` or `"."`) names this
    /// place itself. Each dot-separated segment is looked up among the current
    /// place's children by name; when several children share a name the first
    /// one in insertion order wins. A missing segment creates a new child
    /// whose initial replica is the parent's replica indexed by the segment
    /// name — this implicit creation is structural and fires no notification.
    ///
    /// Resolving the same path twice from the same place returns the same
    /// node.
    pub fn resolve(&self, resolve_path: Option<&str>) -> Place {
        let Some(resolve_path) = resolve_path else {
            return self.clone();
        };

        let mut place = self.clone();
        for segment in path::segments(resolve_path) {
            place = match place.child_by_name(segment) {
                Some(existing) => existing,
                None => {
                    let child = Place::new(segment);
                    let mut inner = place.inner.borrow_mut();
                    // The created place isn't user defined, so pass the
                    // existing slice along instead of replicating into it.
                    child.inner.borrow_mut().replica = inner
                        .replica
                        .as_ref()
                        .and_then(|replica| replica.get(segment))
                        .cloned();
                    inner.children.push(child.clone());
                    drop(inner);
                    child
                }
            };
        }
        place
    }

    /// Request replication of a new value (or `None`, the absent marker)
    /// into this place.
    ///
    /// An absent marker on a present place fires a remove with the departing
    /// value and cascades absence into every child. A value on an absent
    /// place fires a create; on a present place it fires a change when the
    /// value differs (composites always count as differing — meaningful inner
    /// changes are detected by child places). Either way the value is then
    /// propagated into every child, indexed by the child's name; a missing
    /// field or a non-object value propagates the absent marker.
    pub fn replicate(&self, value: impl Into<Option<Value>>) {
        self.postpone(Command::Replicate {
            value: value.into(),
        });
    }

    /// Request appending `child` under the place at `path`.
    ///
    /// Once linked, the child is immediately replicated from the target's
    /// current replica indexed by the child's name.
    pub fn append(&self, child: &Place, append_path: Option<&str>) {
        self.postpone(Command::Append {
            child: child.clone(),
            path: append_path.map(str::to_owned),
        });
    }

    /// Request unlinking `child` from the place at `path`.
    ///
    /// The detached subtree keeps its children and listeners and stays valid
    /// through any handle still referencing it; nothing is notified. Removing
    /// a place that is not among the target's children is a warned no-op.
    pub fn remove(&self, child: &Place, remove_path: Option<&str>) {
        self.postpone(Command::Remove {
            child: child.clone(),
            path: remove_path.map(str::to_owned),
        });
    }

    /// Request registering `listener` at the place under `path`.
    ///
    /// On registration the listener receives a synthetic notification of the
    /// current state: a create carrying the replica if it is present, or a
    /// remove carrying the last removed value (possibly `None`) if it is
    /// absent. Every listener therefore starts from a known state regardless
    /// of timing. A panicking reaction unwinds; it is not isolated.
    pub fn listen(&self, listener: &Rc<Listener>, listen_path: Option<&str>) {
        self.postpone(Command::Listen {
            listener: Rc::clone(listener),
            path: listen_path.map(str::to_owned),
        });
    }

    /// Request removing every registration of `listener` (by pointer
    /// identity) from the place under `path`.
    pub fn forget(&self, listener: &Rc<Listener>, forget_path: Option<&str>) {
        self.postpone(Command::Forget {
            listener: Rc::clone(listener),
            path: forget_path.map(str::to_owned),
        });
    }

    /// First child with the given name, in insertion order.
    fn child_by_name(&self, name: &str) -> Option<Place> {
        self.inner
            .borrow()
            .children
            .iter()
            .find(|candidate| {
                candidate
                    .inner
                    .borrow()
                    .name
                    .as_deref()
                    .is_some_and(|candidate_name| candidate_name == name)
            })
            .cloned()
    }

    pub(crate) fn run_listen(&self, listener: Rc<Listener>, listen_path: Option<&str>) {
        let target = self.resolve(listen_path);
        let (replica, removed) = {
            let mut inner = target.inner.borrow_mut();
            inner.listeners.push(Rc::clone(&listener));
            (inner.replica.clone(), inner.removed_replica.clone())
        };
        // Replay current state so the listener starts from a known value.
        match replica {
            Some(value) => listener.emit_create(&value, &target),
            None => listener.emit_remove(removed.as_ref(), &target),
        }
    }

    pub(crate) fn run_forget(&self, listener: &Rc<Listener>, forget_path: Option<&str>) {
        let target = self.resolve(forget_path);
        target
            .inner
            .borrow_mut()
            .listeners
            .retain(|registered| !Rc::ptr_eq(registered, listener));
    }

    pub(crate) fn run_append(&self, child: Place, append_path: Option<&str>) {
        let target = self.resolve(append_path);
        if target.same(&child) {
            warn!(name = ?child.name(), "append: place cannot be appended to itself");
            return;
        }
        let child_name = child.name();
        let initial = {
            let mut inner = target.inner.borrow_mut();
            inner.children.push(child.clone());
            inner
                .replica
                .as_ref()
                .zip(child_name.as_deref())
                .and_then(|(replica, name)| replica.get(name))
                .cloned()
        };
        child.replicate(initial);
    }

    pub(crate) fn run_remove(&self, child: &Place, remove_path: Option<&str>) {
        let target = self.resolve(remove_path);
        let unlinked = {
            let mut inner = target.inner.borrow_mut();
            let index = inner.children.iter().position(|linked| linked.same(child));
            if let Some(index) = index {
                inner.children.swap_remove(index);
            }
            index.is_some()
        };
        if !unlinked {
            warn!(name = ?child.name(), "remove: place not enlisted within parent's children");
        }
    }
}

impl fmt::Debug for Place {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Place")
            .field("name", &inner.name)
            .field("replica", &inner.replica)
            .field("children", &inner.children.len())
            .field("listeners", &inner.listeners.len())
            .field("state", &inner.state)
            .finish()
    }
}
