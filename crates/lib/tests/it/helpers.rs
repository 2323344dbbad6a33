//! Shared helpers for placetree integration tests.

use std::{cell::RefCell, rc::Rc};

use placetree::{Listener, Place, Value};

/// One observed transition, in dispatch order.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Create(Value),
    Change { after: Value, before: Value },
    Remove(Option<Value>),
}

/// Build a listener with all three reactions recording into a shared log.
pub fn recording_listener() -> (Rc<Listener>, Rc<RefCell<Vec<Event>>>) {
    let log = Rc::new(RefCell::new(Vec::new()));
    let listener = Listener::builder()
        .on_create({
            let log = Rc::clone(&log);
            move |created: &Value, _place: &Place| {
                log.borrow_mut().push(Event::Create(created.clone()));
            }
        })
        .on_change({
            let log = Rc::clone(&log);
            move |after: &Value, before: &Value, _place: &Place| {
                log.borrow_mut().push(Event::Change {
                    after: after.clone(),
                    before: before.clone(),
                });
            }
        })
        .on_remove({
            let log = Rc::clone(&log);
            move |removed: Option<&Value>, _place: &Place| {
                log.borrow_mut().push(Event::Remove(removed.cloned()));
            }
        })
        .build()
        .expect("recording listener has reactions");
    (listener, log)
}

/// Register a recording listener under `path` and discard the replay entry.
///
/// The place keeps its own handle to the listener, so dropping ours here is
/// fine; only `forget` unregisters.
pub fn listen_quietly(place: &Place, path: Option<&str>) -> Rc<RefCell<Vec<Event>>> {
    let (listener, log) = recording_listener();
    place.listen(&listener, path);
    log.borrow_mut().clear();
    log
}
