//! Tests for the watch-channel adapter.

use placetree::Place;
use serde_json::json;

#[test]
fn test_watch_seeds_from_current_state() {
    let root = Place::root();
    root.replicate(json!({ "user": { "name": "Alice" } }));

    let names = root.watch(Some("user.name")).unwrap();
    assert_eq!(*names.borrow(), Some(json!("Alice")));
}

#[test]
fn test_watch_on_virgin_place_starts_absent() {
    let root = Place::root();
    let receiver = root.watch(Some("missing")).unwrap();
    assert_eq!(*receiver.borrow(), None);
}

#[test]
fn test_watch_follows_create_change_remove() {
    let root = Place::root();
    let counts = root.watch(Some("count")).unwrap();

    root.replicate(json!({ "count": 1 }));
    assert_eq!(*counts.borrow(), Some(json!(1)));

    root.replicate(json!({ "count": 2 }));
    assert_eq!(*counts.borrow(), Some(json!(2)));

    root.replicate(None);
    assert_eq!(*counts.borrow(), None);
}

#[test]
fn test_watch_replays_latest_to_cloned_receivers() {
    let root = Place::root();
    let first = root.watch(Some("v")).unwrap();
    root.replicate(json!({ "v": "latest" }));

    // A subscriber arriving after the update still observes the last value.
    let second = first.clone();
    assert_eq!(*second.borrow(), Some(json!("latest")));
}

#[test]
fn test_watch_marks_receiver_changed() {
    let root = Place::root();
    let mut receiver = root.watch(Some("v")).unwrap();
    // Consume the initial seed.
    let _ = receiver.borrow_and_update();

    root.replicate(json!({ "v": 1 }));
    assert!(receiver.has_changed().unwrap());
    assert_eq!(*receiver.borrow_and_update(), Some(json!(1)));
    assert!(!receiver.has_changed().unwrap());
}
