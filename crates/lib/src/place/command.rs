//! Per-place command queue.
//!
//! Every operation that mutates shared tree structure — `listen`, `forget`,
//! `remove`, `append`, `replicate` — is requested by enqueuing a [`Command`]
//! onto the target place's queue rather than executed directly. A place is
//! either [`Idle`] or [`Draining`]: requests against an idle place flip it to
//! draining and are executed immediately; requests against a draining place
//! (issued, for example, by a listener reaction running inside a replication
//! pass) stay queued until the current pass has fully unwound.
//!
//! Draining pops and fully executes one command at a time, re-checking the
//! queue each iteration so commands enqueued mid-drain are picked up within
//! the same pass, and returns the place to idle once the queue is empty. The
//! queue is scoped per place, not globally: activity on unrelated places
//! proceeds immediately.
//!
//! [`Idle`]: QueueState::Idle
//! [`Draining`]: QueueState::Draining

use std::{fmt, rc::Rc};

use tracing::trace;

use super::{Listener, Place};
use crate::Value;

/// A postponed mutation request against one place.
///
/// The set of commands is closed and dispatch is an exhaustive match, so an
/// inconsistent command protocol is unrepresentable.
pub(crate) enum Command {
    /// Register a listener at `path` and replay the current state to it
    Listen {
        listener: Rc<Listener>,
        path: Option<String>,
    },
    /// Drop every registration of this listener at `path`
    Forget {
        listener: Rc<Listener>,
        path: Option<String>,
    },
    /// Unlink a child from the place at `path`
    Remove { child: Place, path: Option<String> },
    /// Link a child under the place at `path` and replicate its slice into it
    Append { child: Place, path: Option<String> },
    /// Diff a new value (or the absent marker) against the held replica
    Replicate { value: Option<Value> },
}

// Manual Debug impl keeps replica payloads out of trace logs; values can be
// large and command identity is what matters when reading a drain.
impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Listen { listener, path } => f
                .debug_struct("Listen")
                .field("listener", listener)
                .field("path", path)
                .finish(),
            Self::Forget { path, .. } => f.debug_struct("Forget").field("path", path).finish(),
            Self::Remove { child, path } => f
                .debug_struct("Remove")
                .field("child", &child.name())
                .field("path", path)
                .finish(),
            Self::Append { child, path } => f
                .debug_struct("Append")
                .field("child", &child.name())
                .field("path", path)
                .finish(),
            Self::Replicate { value } => f
                .debug_struct("Replicate")
                .field("present", &value.is_some())
                .finish(),
        }
    }
}

/// Drain status of one place's command queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum QueueState {
    /// No pass in progress; the next request drains the queue
    Idle,
    /// A pass is executing on this place; requests enqueue until it unwinds
    Draining,
}

impl Place {
    /// Enqueue a command and drain the queue unless a pass is already running.
    pub(crate) fn postpone(&self, command: Command) {
        let drain_now = {
            let mut inner = self.inner.borrow_mut();
            inner.postponed.push_back(command);
            match inner.state {
                QueueState::Draining => false,
                QueueState::Idle => {
                    inner.state = QueueState::Draining;
                    true
                }
            }
        };
        if drain_now {
            self.drain();
        }
    }

    /// Execute queued commands in arrival order until the queue is empty.
    ///
    /// The queue is re-read each iteration rather than snapshotted: executing
    /// a command may enqueue further commands on this place, and those run
    /// within the same pass. No borrow is held while a command executes.
    fn drain(&self) {
        loop {
            let command = {
                let mut inner = self.inner.borrow_mut();
                match inner.postponed.pop_front() {
                    Some(command) => command,
                    None => {
                        inner.state = QueueState::Idle;
                        return;
                    }
                }
            };
            trace!(place = ?self.name(), ?command, "draining postponed command");
            self.execute(command);
        }
    }

    fn execute(&self, command: Command) {
        match command {
            Command::Listen { listener, path } => self.run_listen(listener, path.as_deref()),
            Command::Forget { listener, path } => self.run_forget(&listener, path.as_deref()),
            Command::Remove { child, path } => self.run_remove(&child, path.as_deref()),
            Command::Append { child, path } => self.run_append(child, path.as_deref()),
            Command::Replicate { value } => self.run_replicate(value),
        }
    }
}
