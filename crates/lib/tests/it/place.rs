//! End-to-end tests for the place tree: replication, listeners, structure.

use std::{cell::RefCell, rc::Rc};

use placetree::{Listener, Place, Value};
use serde_json::json;

use crate::helpers::{Event, listen_quietly, recording_listener};

#[test]
fn test_server_session_lifecycle() {
    // A root mirroring a session object: login, profile edits, logout.
    let root = Place::root();
    let name_log = listen_quietly(&root, Some("user.name"));
    let status_log = listen_quietly(&root, Some("status"));

    root.replicate(json!({ "user": { "name": "Alice" }, "status": "online" }));
    root.replicate(json!({ "user": { "name": "Alice" }, "status": "away" }));
    root.replicate(json!({ "user": { "name": "Bob" }, "status": "away" }));
    root.replicate(None);

    assert_eq!(
        name_log.borrow().as_slice(),
        [
            Event::Create(json!("Alice")),
            Event::Change {
                after: json!("Bob"),
                before: json!("Alice"),
            },
            Event::Remove(Some(json!("Bob"))),
        ]
    );
    assert_eq!(
        status_log.borrow().as_slice(),
        [
            Event::Create(json!("online")),
            Event::Change {
                after: json!("away"),
                before: json!("online"),
            },
            Event::Remove(Some(json!("away"))),
        ]
    );
}

#[test]
fn test_field_disappearing_from_server_value() {
    let root = Place::root();
    let log = listen_quietly(&root, Some("session.token"));

    root.replicate(json!({ "session": { "token": "abc" } }));
    // The server drops the whole session object; the token place must see
    // its slice degrade to absent, not crash on the mismatched shape.
    root.replicate(json!({ "session": 0 }));

    assert_eq!(
        log.borrow().as_slice(),
        [
            Event::Create(json!("abc")),
            Event::Remove(Some(json!("abc"))),
        ]
    );
}

#[test]
fn test_replay_then_live_updates_are_contiguous() {
    let root = Place::root();
    root.replicate(json!({ "count": 1 }));

    let (listener, log) = recording_listener();
    root.listen(&listener, Some("count"));
    root.replicate(json!({ "count": 2 }));

    assert_eq!(
        log.borrow().as_slice(),
        [
            Event::Create(json!(1)),
            Event::Change {
                after: json!(2),
                before: json!(1),
            },
        ]
    );
}

#[test]
fn test_unrelated_subtrees_are_independent() {
    let root = Place::root();
    let left = root.resolve(Some("left"));
    let right = root.resolve(Some("right"));

    // A listener on `left` that pushes values into `right` mid-pass: `right`
    // is idle from `left`'s point of view, so the request runs immediately.
    let listener = Listener::builder()
        .on_create({
            let right = right.clone();
            move |created: &Value, _place: &Place| {
                right.replicate(created.clone());
            }
        })
        .build()
        .unwrap();
    left.listen(&listener, None);

    left.replicate(json!("mirrored"));
    assert_eq!(right.replica(), Some(json!("mirrored")));
}

#[test]
fn test_reentrant_remove_detaches_after_the_pass() {
    let root = Place::root();
    root.replicate(json!({ "a": 1 }));
    let a = root.resolve(Some("a"));

    // A listener that detaches its own place on the first change it sees.
    let listener = Listener::builder()
        .on_change({
            let root = root.clone();
            let a = a.clone();
            move |_after: &Value, _before: &Value, _place: &Place| {
                root.remove(&a, None);
            }
        })
        .build()
        .unwrap();
    a.listen(&listener, None);

    root.replicate(json!({ "a": 2 }));
    // The change was delivered, then the postponed remove detached `a`.
    assert_eq!(a.replica(), Some(json!(2)));
    assert!(!root.resolve(Some("a")).same(&a));

    // Later replications no longer reach the detached place.
    root.replicate(json!({ "a": 3 }));
    assert_eq!(a.replica(), Some(json!(2)));
}

#[test]
fn test_commands_issued_mid_pass_run_in_request_order() {
    let root = Place::root();
    let order = Rc::new(RefCell::new(Vec::new()));

    let first = Place::new("first");
    let second = Place::new("second");
    let listener = Listener::builder()
        .on_create({
            let root = root.clone();
            let first = first.clone();
            let second = second.clone();
            let order = Rc::clone(&order);
            move |_created: &Value, _place: &Place| {
                root.append(&first, None);
                root.append(&second, None);
                order.borrow_mut().push("requested");
            }
        })
        .build()
        .unwrap();
    root.listen(&listener, None);

    let watch_append = |place: &Place, tag: &'static str| {
        let order = Rc::clone(&order);
        let listener = Listener::builder()
            .on_create(move |_created: &Value, _place: &Place| {
                order.borrow_mut().push(tag);
            })
            .build()
            .unwrap();
        place.listen(&listener, None);
    };
    watch_append(&first, "first");
    watch_append(&second, "second");

    root.replicate(json!({ "first": 1, "second": 2 }));
    assert_eq!(order.borrow().as_slice(), ["requested", "first", "second"]);
}

#[test]
fn test_deep_path_resolution_and_update() {
    let root = Place::root();
    let log = listen_quietly(&root, Some("a.b.c.d"));

    root.replicate(json!({ "a": { "b": { "c": { "d": "deep" } } } }));
    root.replicate(json!({ "a": { "b": { "c": { "d": "deeper" } } } }));

    assert_eq!(
        log.borrow().as_slice(),
        [
            Event::Create(json!("deep")),
            Event::Change {
                after: json!("deeper"),
                before: json!("deep"),
            },
        ]
    );
}

#[test]
fn test_detached_subtree_can_be_reattached() {
    let root = Place::root();
    root.replicate(json!({ "panel": { "visible": true } }));
    let panel = root.resolve(Some("panel"));
    let log = listen_quietly(&panel, None);

    root.remove(&panel, None);
    root.replicate(json!({ "panel": { "visible": false } }));
    assert!(log.borrow().is_empty());

    root.append(&panel, None);
    // Reattachment replicates the current slice back into the subtree.
    assert_eq!(
        log.borrow().as_slice(),
        [Event::Change {
            after: json!({ "visible": false }),
            before: json!({ "visible": true }),
        }]
    );
}

#[test]
fn test_forget_under_a_path() {
    let root = Place::root();
    let (listener, log) = recording_listener();
    root.listen(&listener, Some("a.b"));
    root.forget(&listener, Some("a.b"));
    log.borrow_mut().clear();

    root.replicate(json!({ "a": { "b": 1 } }));
    assert!(log.borrow().is_empty());
}

#[test]
fn test_user_defined_place_composes_with_resolved_tree() {
    let root = Place::root();
    root.replicate(json!({ "widgets": { "clock": { "hour": 11 } } }));

    // A component owns its own place and grafts it into the mirror.
    let clock = Place::new("clock");
    let log = listen_quietly(&clock, Some("hour"));
    root.append(&clock, Some("widgets"));

    assert_eq!(log.borrow().as_slice(), [Event::Create(json!(11))]);

    root.replicate(json!({ "widgets": { "clock": { "hour": 12 } } }));
    assert_eq!(
        log.borrow().as_slice(),
        [
            Event::Create(json!(11)),
            Event::Change {
                after: json!(12),
                before: json!(11),
            },
        ]
    );
}
